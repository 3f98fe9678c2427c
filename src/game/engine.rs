use super::{
    action::Direction,
    animation::{AnimationOp, MERGE_FADE_OPACITY},
    state::{Grid, Position},
};

/// Two tiles combined into one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeNotice {
    /// Cell the consumed tile came from
    pub source: Position,
    /// Cell holding the combined tile
    pub destination: Position,
    /// Value of the combined tile
    pub value: u32,
}

/// Result of resolving one directional move
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveOutcome {
    /// Whether any line produced a slide or a merge
    pub moved: bool,
    /// Transitions needed to visualize the move, in the order they arose
    pub ops: Vec<AnimationOp>,
    /// Every merge performed, in the order it happened
    pub merges: Vec<MergeNotice>,
}

/// Applies the slide/merge rules to a grid
#[derive(Debug, Clone, Copy)]
pub struct MoveResolver {
    spacing: u16,
}

impl MoveResolver {
    /// `spacing` is the inter-cell gap carried on every slide op
    pub fn new(spacing: u16) -> Self {
        Self { spacing }
    }

    /// Slide and merge every line of `grid` toward the edge `direction` points at.
    ///
    /// `on_merge` runs as each merge happens, with the grid in its
    /// partially-resolved state. Each destination cell merges at most once.
    pub fn resolve<F>(&self, grid: &mut Grid, direction: Direction, mut on_merge: F) -> MoveOutcome
    where
        F: FnMut(&Grid, &MergeNotice),
    {
        let mut outcome = MoveOutcome::default();
        for start in Self::line_starts(grid, direction) {
            self.resolve_line(grid, start, direction, &mut outcome, &mut on_merge);
        }
        outcome
    }

    /// Would `direction` change `grid`
    pub fn can_move(&self, grid: &Grid, direction: Direction) -> bool {
        let mut trial = grid.clone();
        self.resolve(&mut trial, direction, |_, _| {}).moved
    }

    /// First cell of every line, on the edge the tiles travel toward
    fn line_starts(grid: &Grid, direction: Direction) -> Vec<Position> {
        let (rows, cols) = (grid.rows(), grid.cols());
        match direction {
            Direction::Up => (0..cols).map(|col| Position::new(0, col)).collect(),
            Direction::Down => (0..cols).map(|col| Position::new(rows - 1, col)).collect(),
            Direction::Left => (0..rows).map(|row| Position::new(row, 0)).collect(),
            Direction::Right => (0..rows).map(|row| Position::new(row, cols - 1)).collect(),
        }
    }

    fn resolve_line<F>(
        &self,
        grid: &mut Grid,
        start: Position,
        direction: Direction,
        outcome: &mut MoveOutcome,
        on_merge: &mut F,
    ) where
        F: FnMut(&Grid, &MergeNotice),
    {
        let step = direction.trailing_delta();
        let mut dest = Some(start);

        while let Some(at) = dest {
            let Some(next) = Self::next_occupied(grid, at, step) else {
                break;
            };
            let current = grid.get(at);

            if current == 0 {
                // pull the tile in and look again from the same cell
                grid.swap(at, next);
                outcome.ops.push(self.slide(next, at, None));
                outcome.moved = true;
                continue;
            }

            // a pair whose sum does not fit in a cell stays put
            let doubled = (current == grid.get(next))
                .then(|| current.checked_mul(2))
                .flatten();
            if let Some(value) = doubled {
                grid.set(at, value);
                grid.set(next, 0);
                outcome
                    .ops
                    .push(self.slide(next, at, Some(MERGE_FADE_OPACITY)));
                outcome.ops.push(AnimationOp::Pop { target: at });
                outcome.moved = true;

                let notice = MergeNotice {
                    source: next,
                    destination: at,
                    value,
                };
                on_merge(grid, &notice);
                outcome.merges.push(notice);
            }

            dest = grid.neighbor(at, step);
        }
    }

    /// Nearest non-empty cell past `from` along `step`
    fn next_occupied(grid: &Grid, from: Position, step: (isize, isize)) -> Option<Position> {
        let mut cursor = grid.neighbor(from, step);
        while let Some(pos) = cursor {
            if grid.get(pos) != 0 {
                return Some(pos);
            }
            cursor = grid.neighbor(pos, step);
        }
        None
    }

    fn slide(&self, from: Position, to: Position, fade_to: Option<f32>) -> AnimationOp {
        AnimationOp::Slide {
            target: from,
            delta: (
                to.row as isize - from.row as isize,
                to.col as isize - from.col as isize,
            ),
            spacing: self.spacing,
            fade_to,
        }
    }
}

impl Default for MoveResolver {
    fn default() -> Self {
        Self::new(8)
    }
}

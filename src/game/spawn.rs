use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::animation::AnimationOp;
use super::engine::MergeNotice;
use super::state::{Grid, Position};

/// What a spawn did to the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Spawned {
    pub pos: Position,
    /// Value the cell holds after the spawn
    pub value: u32,
    pub op: AnimationOp,
    /// Set when the spawn landed on an existing tile and added to it
    pub merge: Option<MergeNotice>,
}

/// What a removal did to the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Removed {
    pub pos: Position,
    /// Value the cell held before removal
    pub value: u32,
    pub op: AnimationOp,
}

/// Chooses where new tiles go and what they hold
pub struct SpawnPolicy<R: Rng = StdRng> {
    rng: R,
}

impl SpawnPolicy<StdRng> {
    /// Seeded policy when `seed` is given, entropy-seeded otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> SpawnPolicy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Introduce a tile.
    ///
    /// Without `pos`, picks uniformly among empty cells and does nothing if
    /// there are none. Without `value`, picks 2 or 4 with equal odds. An
    /// explicit `pos` that already holds a tile gets `value` added to it in
    /// place (a Pop plus a self-merge notice) instead of being overwritten,
    /// unless the sum would not fit in a cell.
    pub fn spawn(
        &mut self,
        grid: &mut Grid,
        pos: Option<Position>,
        value: Option<u32>,
    ) -> Option<Spawned> {
        let pos = match pos {
            Some(pos) => grid.contains(pos).then_some(pos)?,
            None => {
                let empty = grid.empty_cells();
                if empty.is_empty() {
                    return None;
                }
                empty[self.rng.gen_range(0..empty.len())]
            }
        };
        let value = value.unwrap_or_else(|| if self.rng.gen_bool(0.5) { 2 } else { 4 });

        let current = grid.get(pos);
        if current == 0 {
            grid.set(pos, value);
            Some(Spawned {
                pos,
                value,
                op: AnimationOp::Zoom {
                    target: pos,
                    value: Some(value),
                    reverse: false,
                },
                merge: None,
            })
        } else {
            // the cell keeps its tile when the sum would not fit
            let value = current.checked_add(value)?;
            grid.set(pos, value);
            Some(Spawned {
                pos,
                value,
                op: AnimationOp::Pop { target: pos },
                merge: Some(MergeNotice {
                    source: pos,
                    destination: pos,
                    value,
                }),
            })
        }
    }

    /// Clear a tile. Without `pos`, picks uniformly among occupied cells.
    /// Clearing an empty or off-grid cell does nothing.
    pub fn remove(&mut self, grid: &mut Grid, pos: Option<Position>) -> Option<Removed> {
        let pos = match pos {
            Some(pos) => grid.contains(pos).then_some(pos)?,
            None => {
                let occupied = grid.occupied_cells();
                if occupied.is_empty() {
                    return None;
                }
                occupied[self.rng.gen_range(0..occupied.len())]
            }
        };

        let value = grid.get(pos);
        if value == 0 {
            return None;
        }
        grid.set(pos, 0);
        Some(Removed {
            pos,
            value,
            op: AnimationOp::Zoom {
                target: pos,
                value: None,
                reverse: true,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(seed: u64) -> SpawnPolicy {
        SpawnPolicy::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_spawn_into_empty_cell() {
        let mut grid = Grid::new(4, 4);
        let spawned = policy(1).spawn(&mut grid, None, None).unwrap();

        assert!(spawned.value == 2 || spawned.value == 4);
        assert_eq!(grid.get(spawned.pos), spawned.value);
        assert_eq!(grid.occupied_cells(), vec![spawned.pos]);
        assert!(spawned.merge.is_none());
        assert_eq!(
            spawned.op,
            AnimationOp::Zoom {
                target: spawned.pos,
                value: Some(spawned.value),
                reverse: false
            }
        );
    }

    #[test]
    fn test_spawn_never_overwrites_without_position() {
        let mut policy = policy(42);
        let mut grid = Grid::from_rows(&[vec![8, 16], vec![32, 0]]);

        for _ in 0..20 {
            let mut trial = grid.clone();
            let spawned = policy.spawn(&mut trial, None, None).unwrap();
            assert_eq!(spawned.pos, Position::new(1, 1));
            assert_eq!(trial.get(Position::new(0, 0)), 8);
            assert_eq!(trial.get(Position::new(0, 1)), 16);
            assert_eq!(trial.get(Position::new(1, 0)), 32);
        }

        grid.set(Position::new(1, 1), 2);
        let before = grid.clone();
        assert!(policy.spawn(&mut grid, None, None).is_none());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_spawn_values_are_two_or_four() {
        let mut policy = policy(7);
        let mut twos = 0;
        let mut fours = 0;
        for _ in 0..400 {
            let mut grid = Grid::new(2, 2);
            match policy.spawn(&mut grid, None, None).unwrap().value {
                2 => twos += 1,
                4 => fours += 1,
                other => panic!("unexpected spawn value {other}"),
            }
        }
        // even odds, not the 90/10 split
        assert!(twos > 120 && fours > 120, "twos={twos} fours={fours}");
    }

    #[test]
    fn test_explicit_spawn_that_would_overflow_is_refused() {
        let mut policy = policy(5);
        let origin = Position::new(0, 1);
        let mut grid = Grid::from_rows(&[vec![0, 1 << 31]]);

        assert_eq!(policy.spawn(&mut grid, Some(origin), Some(1 << 31)), None);
        assert_eq!(grid.get(origin), 1 << 31);

        let merged = policy.spawn(&mut grid, Some(origin), Some(1 << 30)).unwrap();
        assert_eq!(merged.value, (1 << 31) + (1 << 30));
    }

    #[test]
    fn test_explicit_spawn_adds_to_existing_tile() {
        let mut policy = policy(3);
        let mut grid = Grid::new(2, 2);
        let origin = Position::new(0, 0);

        let first = policy.spawn(&mut grid, Some(origin), Some(2)).unwrap();
        assert_eq!(first.value, 2);
        assert!(matches!(first.op, AnimationOp::Zoom { .. }));

        let second = policy.spawn(&mut grid, Some(origin), Some(2)).unwrap();
        assert_eq!(grid.get(origin), 4);
        assert_eq!(second.op, AnimationOp::Pop { target: origin });
        assert_eq!(
            second.merge,
            Some(MergeNotice {
                source: origin,
                destination: origin,
                value: 4
            })
        );
    }

    #[test]
    fn test_spawn_off_grid_is_noop() {
        let mut grid = Grid::new(2, 2);
        assert!(policy(0)
            .spawn(&mut grid, Some(Position::new(2, 0)), Some(2))
            .is_none());
        assert!(grid.occupied_cells().is_empty());
    }

    #[test]
    fn test_remove() {
        let mut policy = policy(9);
        let mut grid = Grid::from_rows(&[vec![0, 4]]);

        // empty cell, off-grid cell
        assert!(policy.remove(&mut grid, Some(Position::new(0, 0))).is_none());
        assert!(policy.remove(&mut grid, Some(Position::new(0, 5))).is_none());

        let removed = policy.remove(&mut grid, None).unwrap();
        assert_eq!(removed.pos, Position::new(0, 1));
        assert_eq!(removed.value, 4);
        assert_eq!(
            removed.op,
            AnimationOp::Zoom {
                target: Position::new(0, 1),
                value: None,
                reverse: true
            }
        );
        assert!(policy.remove(&mut grid, None).is_none());
    }
}

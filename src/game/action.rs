use super::state::Position;

/// Direction the tiles travel in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All four directions, in clockwise order starting from Up
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ]
    }

    /// Returns the (row, col) delta to the trailing neighbor: the adjacent
    /// cell one step further away from the edge the tiles travel toward
    pub fn trailing_delta(&self) -> (isize, isize) {
        match self {
            Direction::Up => (1, 0),
            Direction::Right => (0, -1),
            Direction::Down => (-1, 0),
            Direction::Left => (0, 1),
        }
    }
}

/// An intent entering the game controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Slide every line toward an edge
    Move(Direction),
    /// Manually add a tile; random empty cell and random value when omitted
    Add {
        pos: Option<Position>,
        value: Option<u32>,
    },
    /// Manually remove a tile; random non-empty cell when omitted
    Delete { pos: Option<Position> },
    /// Start a fresh game
    Renew,
    /// A tile was clicked
    Click(Position),
}

impl From<Direction> for Intent {
    fn from(direction: Direction) -> Self {
        Intent::Move(direction)
    }
}

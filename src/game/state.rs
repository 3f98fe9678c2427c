use std::fmt;

/// A cell position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The rows x cols matrix of cell values. 0 is an empty cell, anything else
/// is a tile holding a power of two.
///
/// The grid knows nothing about game rules. Indexing outside the grid is a
/// caller bug; use [`Grid::contains`] or [`Grid::neighbor`] first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// Create an all-empty grid
    ///
    /// # Panics
    ///
    /// Panics if `rows` or `cols` is zero.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "grid dimensions must be positive");
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Build a grid from row vectors (all rows must share one length)
    pub fn from_rows(rows: &[Vec<u32>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "rows must all have the same length"
        );
        let mut grid = Self::new(rows.len(), cols);
        grid.cells = rows.concat();
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, pos: Position) -> u32 {
        self.cells[self.index(pos)]
    }

    pub fn set(&mut self, pos: Position, value: u32) {
        let index = self.index(pos);
        self.cells[index] = value;
    }

    /// Exchange the values of two cells
    pub fn swap(&mut self, a: Position, b: Position) {
        let (a, b) = (self.index(a), self.index(b));
        self.cells.swap(a, b);
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// The cell one (row, col) step away from `pos`, if it lies on the grid
    pub fn neighbor(&self, pos: Position, (dr, dc): (isize, isize)) -> Option<Position> {
        let row = pos.row.checked_add_signed(dr)?;
        let col = pos.col.checked_add_signed(dc)?;
        let next = Position::new(row, col);
        self.contains(next).then_some(next)
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    pub fn empty_cells(&self) -> Vec<Position> {
        self.positions().filter(|&pos| self.get(pos) == 0).collect()
    }

    pub fn occupied_cells(&self) -> Vec<Position> {
        self.positions().filter(|&pos| self.get(pos) != 0).collect()
    }

    /// Immutable copy handed to consumers outside the engine
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.clone(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        is_terminal(&self.cells, self.rows, self.cols)
    }

    fn index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "position {pos} outside grid");
        pos.row * self.cols + pos.col
    }
}

/// Read-only copy of the grid at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl Snapshot {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at `pos`, or `None` outside the grid
    pub fn get(&self, pos: Position) -> Option<u32> {
        (pos.row < self.rows && pos.col < self.cols).then(|| self.cells[pos.row * self.cols + pos.col])
    }

    /// The matrix as row vectors
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        self.cells.chunks(self.cols).map(<[u32]>::to_vec).collect()
    }

    /// Sum of every cell value
    pub fn sum(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// True when no cell is empty and no two row- or column-adjacent cells
    /// hold the same value
    pub fn is_terminal(&self) -> bool {
        is_terminal(&self.cells, self.rows, self.cols)
    }
}

fn is_terminal(cells: &[u32], rows: usize, cols: usize) -> bool {
    for row in 0..rows {
        for col in 0..cols {
            let value = cells[row * cols + col];
            if value == 0 {
                return false;
            }
            // equal neighbours only merge while the doubled value fits
            let mergeable = value.checked_mul(2).is_some();
            if mergeable && col + 1 < cols && cells[row * cols + col + 1] == value {
                return false;
            }
            if mergeable && row + 1 < rows && cells[(row + 1) * cols + col] == value {
                return false;
            }
        }
    }
    true
}

//! Rectangular boards of decoded cells.
//!
//! A [`Layout`] is both the static puzzle description and the board snapshot
//! the controller receives from the environment. It is immutable from the
//! outside and hashable, so a snapshot doubles as a plan-cache key.

use std::fmt;

use crate::cell::{Cell, Position};
use crate::error::{PlateError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Layout {
    /// Builds a layout from rows of raw cell codes.
    ///
    /// # Errors
    ///
    /// Fails on an empty grid, ragged rows, or a code outside every cell
    /// category.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(PlateError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(PlateError::RaggedLayout {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (c, &code) in row.iter().enumerate() {
                let cell = Cell::from_code(code).ok_or(PlateError::UnknownCellCode {
                    code,
                    row: r,
                    col: c,
                })?;
                cells.push(cell);
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn area(&self) -> usize {
        self.rows * self.cols
    }

    /// The cell at `pos`, `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|i| self.cells[i])
    }

    /// Overwrites a cell. Out-of-bounds writes are ignored.
    pub(crate) fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = cell;
        }
    }

    /// Every cell with its position, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells.iter().enumerate().map(move |(i, &cell)| {
            let pos = Position::new((i / self.cols) as i32, (i % self.cols) as i32);
            (pos, cell)
        })
    }

    /// First position holding `cell`, row-major.
    pub fn find(&self, cell: Cell) -> Option<Position> {
        self.cells().find(|&(_, c)| c == cell).map(|(pos, _)| pos)
    }

    /// Raw cell codes, one vector per row.
    pub fn to_codes(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(self.cols)
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row < 0 || pos.col < 0 {
            return None;
        }
        let (r, c) = (pos.row as usize, pos.col as usize);
        (r < self.rows && c < self.cols).then(|| r * self.cols + c)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: Vec<String> = row.iter().map(|c| format!("{:2}", c.code())).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

//! Terminal Grid
//!
//! A fixed-size 2D grid of cells representing the visible terminal area.
//! Geometry is set at construction and does not change for the lifetime of
//! a session.

use serde::{Deserialize, Serialize};

use super::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    /// The cells in this row
    pub cells: Vec<Cell>,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Self {
            cells: vec![Cell::default(); cols],
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    /// Clear cells from start (inclusive) to the end of the row
    pub fn clear_from(&mut self, start: usize) {
        for cell in self.cells.iter_mut().skip(start) {
            cell.reset();
        }
    }
}

/// The terminal grid - a 2D array of cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    /// The rows in the grid, visually top to bottom
    rows: Vec<Row>,
    /// Number of columns
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| Row::new(cols)).collect(),
            cols,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Get a reference to a cell
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Get a mutable reference to a cell
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    /// Get a reference to a row
    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Get a mutable reference to a row
    pub fn row_mut(&mut self, row: usize) -> Option<&mut Row> {
        self.rows.get_mut(row)
    }

    /// Clear the entire grid to default cells
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
    }

    /// Scroll the grid up by one line: every row is replaced by the row
    /// below it and the last row is cleared to default cells. This is the
    /// only way content leaves the grid; there is no scrollback.
    pub fn scroll_up(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.rows.rotate_left(1);
        if let Some(last) = self.rows.last_mut() {
            last.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(24, 80);
        assert_eq!(grid.rows(), 24);
        assert_eq!(grid.cols(), 80);
    }

    #[test]
    fn test_grid_cell_access() {
        let mut grid = Grid::new(24, 80);

        if let Some(cell) = grid.cell_mut(5, 10) {
            cell.ch = 'A';
        }

        assert_eq!(grid.cell(5, 10).unwrap().ch, 'A');
        assert!(grid.cell(24, 0).is_none());
        assert!(grid.cell(0, 80).is_none());
    }

    #[test]
    fn test_grid_scroll_up() {
        let mut grid = Grid::new(5, 80);

        // Put content in the second row
        if let Some(cell) = grid.cell_mut(1, 0) {
            cell.ch = 'B';
        }

        grid.scroll_up();

        // Row 1 content moved to row 0, last row cleared
        assert_eq!(grid.cell(0, 0).unwrap().ch, 'B');
        assert!(grid.cell(4, 0).unwrap().is_blank());
    }

    #[test]
    fn test_grid_clear() {
        let mut grid = Grid::new(5, 10);
        for row in 0..5 {
            for col in 0..10 {
                grid.cell_mut(row, col).unwrap().ch = 'x';
            }
        }

        grid.clear();

        for row in 0..5 {
            for col in 0..10 {
                assert!(grid.cell(row, col).unwrap().is_blank());
            }
        }
    }

    #[test]
    fn test_row_clear_from() {
        let mut row = Row::new(10);
        for cell in &mut row.cells {
            cell.ch = 'x';
        }

        row.clear_from(4);

        assert_eq!(row.cells[3].ch, 'x');
        assert!(row.cells[4].is_blank());
        assert!(row.cells[9].is_blank());
    }
}

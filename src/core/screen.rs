//! Terminal Screen
//!
//! The screen model: a fixed-geometry grid plus cursor state and scroll
//! logic. All operations clamp row/column arithmetic into bounds before
//! indexing and never block; callers serialize access with a mutex when the
//! screen is shared with a renderer.

use serde::{Deserialize, Serialize};

use super::{Cell, Cursor, Grid, Snapshot};

/// The terminal screen: grid, cursor, and scroll behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    grid: Grid,
    cursor: Cursor,
}

impl Screen {
    /// Create a new screen with the given geometry
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            grid: Grid::new(rows, cols),
            cursor: Cursor::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid.cell(row, col)
    }

    /// Write a printable character at the cursor using the current
    /// attribute set, advancing the cursor and wrapping/scrolling as needed.
    ///
    /// A character written into the last column leaves the cursor on it with
    /// the wrap pending; the next printable performs the wrap. This keeps the
    /// cursor inside the grid while filling rows x cols cells without a
    /// premature scroll.
    pub fn print_char(&mut self, ch: char) {
        if self.cursor.pending_wrap {
            self.cursor.col = 0;
            self.cursor.pending_wrap = false;
            self.advance_row();
        }

        let cell = Cell {
            ch,
            fg: self.cursor.fg,
            bg: self.cursor.bg,
            bold: self.cursor.bold,
            underline: self.cursor.underline,
        };
        let (row, col) = (self.cursor.row, self.cursor.col);
        if let Some(slot) = self.grid.cell_mut(row, col) {
            *slot = cell;
        }

        if self.cursor.col + 1 >= self.cols() {
            self.cursor.pending_wrap = true;
        } else {
            self.cursor.col += 1;
        }
    }

    /// Line feed: column to 0, cursor down one row, scrolling at the bottom
    pub fn linefeed(&mut self) {
        self.cursor.col = 0;
        self.cursor.pending_wrap = false;
        self.advance_row();
    }

    /// Carriage return: column to 0
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Backspace: column back one, stopping at 0
    pub fn backspace(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        }
        self.cursor.pending_wrap = false;
    }

    /// Horizontal tab: advance to the next multiple of 8, wrapping to the
    /// next row (scrolling if needed) on overflow
    pub fn tab(&mut self) {
        self.cursor.pending_wrap = false;
        let next = (self.cursor.col / 8 + 1) * 8;
        if next >= self.cols() {
            self.cursor.col = 0;
            self.advance_row();
        } else {
            self.cursor.col = next;
        }
    }

    /// Scroll the screen up one row; the last row is cleared to defaults
    pub fn scroll_up(&mut self) {
        self.grid.scroll_up();
    }

    /// Erase in display (CSI J): mode 0 erases from the cursor to the end
    /// of the screen, mode 2 erases everything and homes the cursor
    pub fn erase_in_display(&mut self, mode: u16) {
        match mode {
            0 => {
                let (row, col) = (self.cursor.row, self.cursor.col);
                if let Some(r) = self.grid.row_mut(row) {
                    r.clear_from(col);
                }
                for r in (row + 1)..self.rows() {
                    if let Some(r) = self.grid.row_mut(r) {
                        r.clear();
                    }
                }
            }
            2 => {
                self.clear();
            }
            _ => {}
        }
    }

    /// Erase in line (CSI K): mode 0 erases from the cursor to end of line
    pub fn erase_in_line(&mut self, mode: u16) {
        if mode == 0 {
            let (row, col) = (self.cursor.row, self.cursor.col);
            if let Some(r) = self.grid.row_mut(row) {
                r.clear_from(col);
            }
        }
    }

    /// Clear every cell and home the cursor. The current attribute set is
    /// preserved; only SGR 0 or a full reset changes it.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.cursor.home();
    }

    /// Full reset: clear all cells and return the cursor, including its
    /// attribute set, to the default state. Used between sessions so no
    /// state leaks from one peer to the next.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.cursor.reset();
    }

    /// Capture a renderer-facing snapshot of the grid and cursor
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    fn advance_row(&mut self) {
        if self.cursor.row + 1 >= self.rows() {
            self.grid.scroll_up();
        } else {
            self.cursor.row += 1;
        }
    }
}

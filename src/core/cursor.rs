//! Cursor state management
//!
//! The cursor tracks position and the current attribute set applied to
//! subsequently written characters. All movement is clamped into the grid
//! bounds; commands can never move the cursor out of range.

use serde::{Deserialize, Serialize};

use super::Color;

/// Cursor state including position and the active text attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Row position (0-indexed)
    pub row: usize,
    /// Column position (0-indexed)
    pub col: usize,
    /// Current foreground color (applied to new characters)
    pub fg: Color,
    /// Current background color
    pub bg: Color,
    /// Current bold attribute
    pub bold: bool,
    /// Current underline attribute
    pub underline: bool,
    /// Pending wrap - cursor sits on the last column, next char will wrap
    pub pending_wrap: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            fg: Color::White,
            bg: Color::Black,
            bold: false,
            underline: false,
            pending_wrap: false,
        }
    }
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor to absolute position, clamping to bounds
    pub fn move_to(&mut self, row: usize, col: usize, rows: usize, cols: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Move cursor to home position (0, 0)
    pub fn home(&mut self) {
        self.row = 0;
        self.col = 0;
        self.pending_wrap = false;
    }

    /// Move cursor up by n rows, stopping at the top
    pub fn move_up(&mut self, n: usize) {
        self.row = self.row.saturating_sub(n);
        self.pending_wrap = false;
    }

    /// Move cursor down by n rows, stopping at the last row
    pub fn move_down(&mut self, n: usize, rows: usize) {
        self.row = (self.row + n).min(rows.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Move cursor left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
        self.pending_wrap = false;
    }

    /// Move cursor right by n columns, stopping at the last column
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = (self.col + n).min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    /// Reset only the text attributes (SGR 0)
    pub fn reset_attributes(&mut self) {
        self.fg = Color::White;
        self.bg = Color::Black;
        self.bold = false;
        self.underline = false;
    }

    /// Reset cursor to default state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

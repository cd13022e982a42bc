//! Deterministic snapshot generation
//!
//! Snapshots capture the visible grid and cursor in a serializable format.
//! This is the renderer contract: an external draw loop takes the screen
//! lock, captures a snapshot, and renders from the copy. Given the same byte
//! stream, the screen must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::{Cell, Screen};

/// A complete snapshot of the screen state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub rows: usize,
    pub cols: usize,
    /// Visible grid content (row-major)
    pub grid: Vec<Vec<Cell>>,
    /// Cursor state
    pub cursor: CursorSnapshot,
}

/// Snapshot of the cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: usize,
    pub col: usize,
}

impl Snapshot {
    /// Capture the current screen state
    pub fn capture(screen: &Screen) -> Self {
        let grid = (0..screen.rows())
            .map(|row| {
                (0..screen.cols())
                    .map(|col| screen.cell(row, col).copied().unwrap_or_default())
                    .collect()
            })
            .collect();

        Self {
            rows: screen.rows(),
            cols: screen.cols(),
            grid,
            cursor: CursorSnapshot {
                row: screen.cursor().row,
                col: screen.cursor().col,
            },
        }
    }

    /// Render the grid as plain text, one line per row, trailing blanks
    /// trimmed. Used by the headless runner and tests.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in &self.grid {
            let line: String = row.iter().map(|c| c.ch).collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_capture() {
        let mut screen = Screen::new(3, 10);
        screen.print_char('H');
        screen.print_char('i');

        let snap = screen.snapshot();
        assert_eq!(snap.rows, 3);
        assert_eq!(snap.cols, 10);
        assert_eq!(snap.grid[0][0].ch, 'H');
        assert_eq!(snap.grid[0][1].ch, 'i');
        assert_eq!(snap.cursor, CursorSnapshot { row: 0, col: 2 });
    }

    #[test]
    fn test_snapshot_to_text() {
        let mut screen = Screen::new(2, 10);
        for ch in "ok".chars() {
            screen.print_char(ch);
        }
        let snap = screen.snapshot();
        assert_eq!(snap.to_text(), "ok\n\n");
    }

    #[test]
    fn test_snapshot_roundtrips_through_json() {
        let mut screen = Screen::new(2, 4);
        screen.print_char('a');
        let snap = screen.snapshot();

        let json = serde_json::to_string(&snap).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.grid[0][0].ch, 'a');
        assert_eq!(back.cursor, snap.cursor);
    }
}

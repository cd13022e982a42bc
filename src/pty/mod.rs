//! PTY (Pseudoterminal) handling
//!
//! This module provides functionality for creating and managing
//! pseudoterminals, spawning the session shell, and handling non-blocking
//! I/O on the master side. Every process and file-descriptor concern lives
//! behind this boundary; the interpreter and screen never see it.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::Pty;

/// Character cell width in pixels on the target display
pub const CHAR_WIDTH: u32 = 12;
/// Character cell height in pixels on the target display
pub const CHAR_HEIGHT: u32 = 20;
/// Height of the header region reserved above the terminal area
pub const HEADER_HEIGHT: u32 = 100;

/// Error type for PTY operations
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("Failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("Failed to grant PTY access: {0}")]
    GrantPty(#[source] nix::Error),

    #[error("Failed to unlock PTY: {0}")]
    UnlockPty(#[source] nix::Error),

    #[error("Failed to get PTY slave name: {0}")]
    PtsName(#[source] nix::Error),

    #[error("Failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("Failed to set window size: {0}")]
    SetWinsize(#[source] nix::Error),

    #[error("Failed to set non-blocking mode: {0}")]
    SetNonBlocking(#[source] nix::Error),

    #[error("Failed to read from PTY: {0}")]
    Read(#[source] nix::Error),

    #[error("Failed to write to PTY: {0}")]
    Write(#[source] nix::Error),

    #[error("Failed to poll PTY: {0}")]
    Poll(#[source] nix::Error),

    #[error("Failed to wait for child: {0}")]
    Wait(#[source] nix::Error),

    #[error("Operation would block")]
    WouldBlock,
}

/// Result type for PTY operations
pub type PtyResult<T> = Result<T, PtyError>;

/// Terminal geometry for a PTY session, fixed at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl WindowSize {
    /// Create a new window size with just rows and columns
    pub fn new(rows: u16, cols: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Derive terminal geometry from a display: columns from the full width,
    /// rows from the height minus the header region, both in fixed-size
    /// character cells.
    pub fn from_display(pixel_width: u32, pixel_height: u32) -> Self {
        let cols = pixel_width / CHAR_WIDTH;
        let rows = pixel_height.saturating_sub(HEADER_HEIGHT) / CHAR_HEIGHT;
        Self {
            rows: rows.min(u16::MAX as u32) as u16,
            cols: cols.min(u16::MAX as u32) as u16,
            pixel_width: pixel_width.min(u16::MAX as u32) as u16,
            pixel_height: pixel_height.min(u16::MAX as u32) as u16,
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(24, 80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_new() {
        let size = WindowSize::new(24, 80);
        assert_eq!(size.rows, 24);
        assert_eq!(size.cols, 80);
        assert_eq!(size.pixel_width, 0);
    }

    #[test]
    fn test_window_size_from_display() {
        let size = WindowSize::from_display(2160, 1080);
        assert_eq!(size.cols, 180);
        assert_eq!(size.rows, 49);
        assert_eq!(size.pixel_width, 2160);
        assert_eq!(size.pixel_height, 1080);
    }

    #[test]
    fn test_from_display_smaller_than_header() {
        let size = WindowSize::from_display(120, 50);
        assert_eq!(size.rows, 0);
        assert_eq!(size.cols, 10);
    }
}

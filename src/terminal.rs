//! Terminal Executor
//!
//! Ties together the parser and the screen model, applying parsed actions
//! to update the shared screen. The screen lives behind a mutex because an
//! external renderer snapshots it on its own draw schedule while the relay
//! loop feeds bytes through here.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{Color, Screen, Snapshot};
use crate::parser::{Action, CsiAction, Parser};

/// Terminal executor that processes raw bytes and updates the screen
pub struct Terminal {
    /// The escape sequence parser
    parser: Parser,
    /// The shared screen
    screen: Arc<Mutex<Screen>>,
}

impl Terminal {
    /// Create a terminal with its own screen of the given geometry
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_screen(Arc::new(Mutex::new(Screen::new(rows, cols))))
    }

    /// Create a terminal over an existing shared screen
    pub fn with_screen(screen: Arc<Mutex<Screen>>) -> Self {
        Self {
            parser: Parser::new(),
            screen,
        }
    }

    /// Get a handle to the shared screen for renderers
    pub fn screen(&self) -> Arc<Mutex<Screen>> {
        Arc::clone(&self.screen)
    }

    /// Process a chunk of output bytes from the PTY.
    ///
    /// The screen lock is taken once per chunk, not per byte.
    pub fn process(&mut self, data: &[u8]) {
        let actions = self.parser.feed(data);
        if actions.is_empty() {
            return;
        }
        let mut screen = self.lock_screen();
        for action in actions {
            apply_action(&mut screen, action);
        }
    }

    /// Capture a snapshot of the screen under its lock
    pub fn snapshot(&self) -> Snapshot {
        self.lock_screen().snapshot()
    }

    /// Fully reset the screen and the parser state
    pub fn reset(&mut self) {
        self.parser.reset();
        self.lock_screen().reset();
    }

    /// Take the screen lock. A panic in a renderer holding the lock poisons
    /// it, but every screen operation leaves the state consistent, so the
    /// guard is recovered and the session keeps running.
    fn lock_screen(&self) -> MutexGuard<'_, Screen> {
        self.screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Apply a single parsed action to the screen
fn apply_action(screen: &mut Screen, action: Action) {
    match action {
        Action::Print(ch) => screen.print_char(ch),
        Action::Execute(byte) => execute_c0(screen, byte),
        Action::Csi(csi) => execute_csi(screen, &csi),
    }
}

/// Execute a C0 control character
fn execute_c0(screen: &mut Screen, byte: u8) {
    match byte {
        0x08 => screen.backspace(),
        0x09 => screen.tab(),
        0x0a => screen.linefeed(),
        0x0d => screen.carriage_return(),
        0x07 => {
            // BEL
            tracing::debug!("bell");
        }
        _ => {
            // Other C0 controls are ignored
        }
    }
}

/// Execute a CSI sequence
fn execute_csi(screen: &mut Screen, csi: &CsiAction) {
    let rows = screen.rows();
    let cols = screen.cols();

    match csi.final_byte {
        b'H' | b'f' => {
            // CUP - Cursor Position (1-based, default 1, clamped)
            let row = csi.param_or(0, 1).saturating_sub(1) as usize;
            let col = csi.param_or(1, 1).saturating_sub(1) as usize;
            screen.cursor_mut().move_to(row, col, rows, cols);
        }
        b'A' => {
            // CUU - Cursor Up
            let n = csi.param_or(0, 1) as usize;
            screen.cursor_mut().move_up(n);
        }
        b'B' => {
            // CUD - Cursor Down
            let n = csi.param_or(0, 1) as usize;
            screen.cursor_mut().move_down(n, rows);
        }
        b'C' => {
            // CUF - Cursor Forward
            let n = csi.param_or(0, 1) as usize;
            screen.cursor_mut().move_right(n, cols);
        }
        b'D' => {
            // CUB - Cursor Backward
            let n = csi.param_or(0, 1) as usize;
            screen.cursor_mut().move_left(n);
        }
        b'J' => {
            // ED - Erase in Display
            screen.erase_in_display(csi.param_or(0, 0));
        }
        b'K' => {
            // EL - Erase in Line
            screen.erase_in_line(csi.param_or(0, 0));
        }
        b'm' => {
            // SGR - Select Graphic Rendition
            execute_sgr(screen, &csi.params);
        }
        other => {
            tracing::trace!(final_byte = %(other as char), "ignored CSI sequence");
        }
    }
}

/// Apply SGR parameters to the current attribute set
fn execute_sgr(screen: &mut Screen, params: &[u16]) {
    // CSI m with no parameters means reset
    if params.is_empty() {
        screen.cursor_mut().reset_attributes();
        return;
    }

    for &param in params {
        let cursor = screen.cursor_mut();
        match param {
            0 => cursor.reset_attributes(),
            1 => cursor.bold = true,
            4 => cursor.underline = true,
            30..=37 => {
                if let Some(color) = Color::from_ansi_index((param - 30) as u8) {
                    cursor.fg = color;
                }
            }
            40..=47 => {
                if let Some(color) = Color::from_ansi_index((param - 40) as u8) {
                    cursor.bg = color;
                }
            }
            _ => {
                // Unrecognized SGR parameters are no-ops
            }
        }
    }
}

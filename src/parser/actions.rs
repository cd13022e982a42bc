//! Screen actions produced by the parser
//!
//! These actions represent the semantic meaning of the parsed byte stream.

use serde::{Deserialize, Serialize};

/// Actions produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Print a character to the screen at the current cursor position
    Print(char),

    /// Execute a C0 control character (0x00-0x1F except ESC)
    /// Handled controls:
    /// - 0x08 BS: Backspace
    /// - 0x09 HT: Horizontal Tab
    /// - 0x0A LF: Line Feed
    /// - 0x0D CR: Carriage Return
    Execute(u8),

    /// CSI (Control Sequence Introducer) dispatch
    /// Format: ESC \[ \[params\] final
    Csi(CsiAction),
}

/// A parsed CSI sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// Numeric parameters separated by semicolons.
    /// A missing parameter between delimiters is represented as 0.
    pub params: Vec<u16>,
    /// Final byte (the terminating letter) determines the command
    pub final_byte: u8,
}

impl CsiAction {
    /// Get parameter at index, or `default` if absent
    pub fn param_or(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).copied().unwrap_or(default)
    }
}

//! Parser State Machine
//!
//! A two-state byte machine:
//!
//! - `Ground`: printable bytes become `Print` actions, C0 controls become
//!   `Execute` actions, and ESC enters `Escape` with a cleared accumulator.
//! - `Escape`: bytes accumulate until the first ASCII letter terminates the
//!   sequence. `[`-led sequences are parsed as CSI; anything else is
//!   silently discarded.
//!
//! The parser handles arbitrary chunk boundaries and never errors: a
//! malformed sequence only discards itself, so a corrupt stream can never
//! hang the terminal or corrupt unrelated state.

use super::actions::{Action, CsiAction};

const ESC: u8 = 0x1b;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ground,
    Escape,
}

/// The escape sequence parser
#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Sequence bytes accumulated since ESC, terminator included
    sequence: Vec<u8>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Create a new parser in the ground state
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            sequence: Vec::with_capacity(16),
        }
    }

    /// Reset the parser to the ground state
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.sequence.clear();
    }

    /// Process a chunk of bytes, returning the resulting actions
    pub fn feed(&mut self, data: &[u8]) -> Vec<Action> {
        let mut actions = Vec::new();

        for &byte in data {
            if let Some(action) = self.process_byte(byte) {
                actions.push(action);
            }
        }

        actions
    }

    fn process_byte(&mut self, byte: u8) -> Option<Action> {
        // ESC always restarts sequence accumulation, even mid-sequence
        if byte == ESC {
            self.state = State::Escape;
            self.sequence.clear();
            return None;
        }

        match self.state {
            State::Ground => {
                if byte >= 0x20 {
                    Some(Action::Print(byte as char))
                } else {
                    Some(Action::Execute(byte))
                }
            }
            State::Escape => {
                self.sequence.push(byte);
                if byte.is_ascii_alphabetic() {
                    let action = self.dispatch();
                    self.state = State::Ground;
                    self.sequence.clear();
                    action
                } else {
                    None
                }
            }
        }
    }

    /// Dispatch a completed sequence. Only CSI (`[`-led) sequences are
    /// recognized; everything else is dropped without error.
    fn dispatch(&self) -> Option<Action> {
        match self.sequence.split_first() {
            Some((b'[', rest)) => Some(Action::Csi(parse_csi(rest))),
            _ => None,
        }
    }
}

/// Parse the body of a CSI sequence: `;`-separated decimal parameters
/// followed by the final letter. A missing parameter between delimiters is
/// 0; bytes that are neither digits nor `;` are skipped.
fn parse_csi(body: &[u8]) -> CsiAction {
    debug_assert!(!body.is_empty());
    let (&final_byte, params_bytes) = body.split_last().unwrap_or((&0, &[]));

    let mut params = Vec::new();
    let mut value: u16 = 0;
    let mut has_digit = false;

    for &byte in params_bytes {
        match byte {
            b'0'..=b'9' => {
                value = value
                    .saturating_mul(10)
                    .saturating_add(u16::from(byte - b'0'));
                has_digit = true;
            }
            b';' => {
                params.push(if has_digit { value } else { 0 });
                value = 0;
                has_digit = false;
            }
            _ => {}
        }
    }
    if has_digit {
        params.push(value);
    }

    CsiAction { params, final_byte }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(input: &[u8]) -> Vec<Action> {
        Parser::new().feed(input)
    }

    fn single_csi(input: &[u8]) -> CsiAction {
        let actions = feed_all(input);
        assert_eq!(actions.len(), 1, "expected one action from {:?}", input);
        match &actions[0] {
            Action::Csi(csi) => csi.clone(),
            other => panic!("expected CSI, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_text() {
        let actions = feed_all(b"Hi");
        assert_eq!(actions, vec![Action::Print('H'), Action::Print('i')]);
    }

    #[test]
    fn test_control_characters() {
        let actions = feed_all(b"a\r\nb");
        assert_eq!(
            actions,
            vec![
                Action::Print('a'),
                Action::Execute(0x0d),
                Action::Execute(0x0a),
                Action::Print('b'),
            ]
        );
    }

    #[test]
    fn test_cursor_position() {
        let csi = single_csi(b"\x1b[5;10H");
        assert_eq!(csi.params, vec![5, 10]);
        assert_eq!(csi.final_byte, b'H');
    }

    #[test]
    fn test_empty_params() {
        let csi = single_csi(b"\x1b[H");
        assert!(csi.params.is_empty());

        // A missing parameter between delimiters defaults to 0
        let csi = single_csi(b"\x1b[;5H");
        assert_eq!(csi.params, vec![0, 5]);

        // A trailing delimiter contributes nothing
        let csi = single_csi(b"\x1b[5;H");
        assert_eq!(csi.params, vec![5]);
    }

    #[test]
    fn test_sgr_params() {
        let csi = single_csi(b"\x1b[1;31m");
        assert_eq!(csi.params, vec![1, 31]);
        assert_eq!(csi.final_byte, b'm');
    }

    #[test]
    fn test_chunk_boundary() {
        let mut parser = Parser::new();
        let mut actions = parser.feed(b"\x1b[5");
        assert!(actions.is_empty());
        actions.extend(parser.feed(b";10H"));
        assert_eq!(
            actions,
            vec![Action::Csi(CsiAction {
                params: vec![5, 10],
                final_byte: b'H',
            })]
        );
    }

    #[test]
    fn test_non_csi_sequence_dropped() {
        // ESC ] ... terminated by a letter is not CSI and is discarded
        let actions = feed_all(b"\x1b]0;titleA");
        assert!(actions.is_empty());

        // ESC directly followed by a letter is discarded too
        let actions = feed_all(b"\x1bM");
        assert!(actions.is_empty());

        // The stream stays live afterwards
        let mut parser = Parser::new();
        parser.feed(b"\x1bM");
        assert_eq!(parser.feed(b"x"), vec![Action::Print('x')]);
    }

    #[test]
    fn test_esc_restarts_sequence() {
        // A second ESC mid-sequence abandons the first accumulation
        let actions = feed_all(b"\x1b[31\x1b[32m");
        assert_eq!(
            actions,
            vec![Action::Csi(CsiAction {
                params: vec![32],
                final_byte: b'm',
            })]
        );
    }

    #[test]
    fn test_param_overflow_saturates() {
        let csi = single_csi(b"\x1b[99999999H");
        assert_eq!(csi.params, vec![u16::MAX]);
    }

    #[test]
    fn test_garbage_in_params_skipped() {
        let csi = single_csi(b"\x1b[?25h");
        assert_eq!(csi.params, vec![25]);
        assert_eq!(csi.final_byte, b'h');
    }
}

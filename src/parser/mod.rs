//! Escape sequence interpreter
//!
//! A stateful parser that converts the raw PTY byte stream into discrete
//! screen actions, independent of any transport. The PTY-only, network-relay,
//! and headless variants all wrap this same state machine.

mod actions;
mod state;

pub use actions::{Action, CsiAction};
pub use state::Parser;

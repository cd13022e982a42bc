//! Terminal Core Module
//!
//! Platform-independent terminal state management. This module contains:
//! - Screen model (fixed-geometry grid)
//! - Cell representation with attributes
//! - Cursor state and positioning
//! - Deterministic snapshot generation
//!
//! The core is designed to be completely deterministic: given the same
//! sequence of terminal actions, it will always produce the same state.

mod cell;
mod cursor;
mod grid;
mod screen;
mod snapshot;

pub use cell::{Cell, Color};
pub use cursor::Cursor;
pub use grid::{Grid, Row};
pub use screen::Screen;
pub use snapshot::{CursorSnapshot, Snapshot};

//! Netterm Terminal Core
//!
//! A minimal terminal emulator core built without terminal emulation libraries.
//! This crate provides:
//!
//! - `core`: Screen model, cells, cursor, snapshots
//! - `parser`: Escape sequence interpreter
//! - `terminal`: Executor tying the parser to the screen
//! - `pty`: PTY session management (Linux/macOS)
//! - `relay`: Bidirectional PTY <-> peer byte relay
//! - `server`: Single-client TCP acceptor
//!
//! The screen buffer is the only state shared with an external renderer; it is
//! always accessed behind a mutex so a renderer can snapshot it from its own
//! draw loop while the relay loop writes to it.

pub mod config;
pub mod core;
pub mod parser;
pub mod pty;
pub mod relay;
pub mod server;
pub mod terminal;

pub use config::Config;
pub use terminal::Terminal;

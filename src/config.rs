//! Configuration
//!
//! Session configuration for the server and headless binaries: listen port,
//! display geometry the PTY size is derived from, and the shell to spawn.
//! Defaults match the embedded debug display this tool was written for.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pty::WindowSize;

/// Default TCP port for the network relay
pub const DEFAULT_PORT: u16 = 2222;

/// Configuration for a terminal server instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCP port the acceptor listens on
    pub port: u16,
    /// Display width in pixels
    pub display_width: u32,
    /// Display height in pixels
    pub display_height: u32,
    /// Shell to exec inside the PTY
    pub shell: String,
    /// Arguments passed to the shell
    pub shell_args: Vec<String>,
    /// Prompt exported to the shell via PS1
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            display_width: 2160,
            display_height: 1080,
            shell: "/bin/bash".to_string(),
            shell_args: vec!["-l".to_string()],
            prompt: "term:$ ".to_string(),
        }
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    /// Load configuration from a JSON file; absent fields take defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// PTY geometry derived from the configured display
    pub fn geometry(&self) -> WindowSize {
        WindowSize::from_display(self.display_width, self.display_height)
    }

    /// Shell arguments as string slices for `Pty::spawn`
    pub fn shell_args(&self) -> Vec<&str> {
        self.shell_args.iter().map(String::as_str).collect()
    }
}

//! Headless Terminal Runner
//!
//! Feeds a byte stream through the interpreter without any PTY or network
//! and prints the resulting screen snapshot. Useful for testing escape
//! sequence handling and generating deterministic snapshots.
//!
//! # Usage
//!
//! ```bash
//! # Process input from stdin and output a JSON snapshot
//! printf 'Hello\x1b[31mRed\x1b[0m' | netterm-headless
//!
//! # Process input from a file, output as plain text
//! netterm-headless --input capture.bin --text
//! ```

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use netterm::Terminal;

/// Command-line arguments
struct Args {
    /// Input file (stdin if not specified)
    input: Option<PathBuf>,
    /// Output file (stdout if not specified)
    output: Option<PathBuf>,
    /// Output as text instead of JSON
    text: bool,
    /// Terminal columns
    cols: usize,
    /// Terminal rows
    rows: usize,
    /// Show help
    help: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            text: false,
            cols: 80,
            rows: 24,
            help: false,
        }
    }
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "-h" | "--help" => {
                args.help = true;
            }
            "-i" | "--input" => {
                i += 1;
                if i < argv.len() {
                    args.input = Some(PathBuf::from(&argv[i]));
                }
            }
            "-o" | "--output" => {
                i += 1;
                if i < argv.len() {
                    args.output = Some(PathBuf::from(&argv[i]));
                }
            }
            "-t" | "--text" => {
                args.text = true;
            }
            "-c" | "--cols" => {
                i += 1;
                if i < argv.len() {
                    args.cols = argv[i].parse().unwrap_or(80);
                }
            }
            "-r" | "--rows" => {
                i += 1;
                if i < argv.len() {
                    args.rows = argv[i].parse().unwrap_or(24);
                }
            }
            _ => {}
        }
        i += 1;
    }

    args
}

fn print_help() {
    eprintln!(
        r#"netterm-headless - Headless terminal interpreter

USAGE:
    netterm-headless [OPTIONS]

OPTIONS:
    -h, --help            Show this help message
    -i, --input <FILE>    Input file (stdin if not specified)
    -o, --output <FILE>   Output file (stdout if not specified)
    -t, --text            Output as plain text instead of JSON
    -c, --cols <N>        Terminal columns (default: 80)
    -r, --rows <N>        Terminal rows (default: 24)

EXAMPLES:
    # Process escape sequences and output a JSON snapshot
    printf 'Hello\x1b[31mWorld\x1b[0m' | netterm-headless

    # Process from file and output text
    netterm-headless -i capture.bin -t

    # Custom terminal size
    netterm-headless -c 180 -r 49 -i capture.bin -o snapshot.json
"#
    );
}

fn main() -> io::Result<()> {
    let args = parse_args();

    if args.help {
        print_help();
        return Ok(());
    }

    // Read input
    let input_data = if let Some(path) = &args.input {
        std::fs::read(path)?
    } else {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        data
    };

    // Create terminal and process input
    let mut terminal = Terminal::new(args.rows, args.cols);
    terminal.process(&input_data);

    let snapshot = terminal.snapshot();

    // Output result
    let output_data = if args.text {
        snapshot.to_text()
    } else {
        serde_json::to_string_pretty(&snapshot).map_err(io::Error::other)?
    };

    if let Some(path) = &args.output {
        let mut file = File::create(path)?;
        file.write_all(output_data.as_bytes())?;
    } else {
        io::stdout().write_all(output_data.as_bytes())?;
    }

    Ok(())
}

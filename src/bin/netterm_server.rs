//! Network Terminal Server
//!
//! Listens on a TCP port and relays at most one client at a time to a shell
//! running in a pseudoterminal, interpreting the shell's output into an
//! in-memory screen as it flows.
//!
//! This is debug tooling: the relay is an unauthenticated, unencrypted byte
//! pipe to a login shell. Only run it on a trusted network.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default port (2222)
//! netterm-server
//!
//! # Custom port and config file
//! netterm-server --port 3333 --config netterm.json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use netterm::server::Server;
use netterm::Config;

/// Command-line arguments
#[derive(Default)]
struct Args {
    /// Listen port override
    port: Option<u16>,
    /// Optional JSON config file
    config: Option<PathBuf>,
    /// Show help
    help: bool,
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
            "-p" | "--port" => {
                i += 1;
                if i < argv.len() {
                    args.port = argv[i].parse().ok();
                }
            }
            "-c" | "--config" => {
                i += 1;
                if i < argv.len() {
                    args.config = Some(PathBuf::from(&argv[i]));
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
        r#"netterm-server - Network terminal relay

Relays a single TCP client to a shell in a pseudoterminal. There is no
authentication or encryption; use only on a trusted network.

USAGE:
    netterm-server [OPTIONS]

OPTIONS:
    -h, --help            Show this help message
    -p, --port <PORT>     Listen port (default: 2222)
    -c, --config <FILE>   JSON config file; absent fields take defaults

EXAMPLES:
    # Listen on the default port
    netterm-server

    # Connect from another host
    nc <host> 2222
"#
    );
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = parse_args();
    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, path = %path.display(), "failed to load config");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Some(port) = args.port {
        config.port = port;
    }

    let mut server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "failed to start server");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run() {
        tracing::error!(error = %e, "server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

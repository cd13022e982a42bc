//! Connection Acceptor
//!
//! Binds a single TCP port and relays at most one client at a time to a
//! freshly spawned shell session. While a relay is live, further accepted
//! connections are closed immediately; the acceptor returns to listening
//! once the relay ends. Shutdown is cooperative: the accept loop polls the
//! listener on a one second bound and checks the running flag each pass.
//!
//! There is deliberately no authentication or encryption here: the relay is
//! a raw byte pipe to a login shell, intended as debug tooling on a trusted
//! network.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::os::fd::BorrowedFd;
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};

use crate::config::Config;
use crate::core::Screen;
use crate::pty::Pty;
use crate::relay::Relay;
use crate::terminal::Terminal;

/// Bounded wait per accept poll; shutdown is observed within this interval
const ACCEPT_TIMEOUT_MS: i32 = 1000;

/// Error type for server operations
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind listener: {0}")]
    Bind(#[source] io::Error),

    #[error("Failed to poll listener: {0}")]
    Poll(#[source] nix::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Single-client TCP acceptor owning the shared screen
pub struct Server {
    listener: TcpListener,
    config: Config,
    screen: Arc<Mutex<Screen>>,
    running: Arc<AtomicBool>,
    relay_thread: Option<JoinHandle<()>>,
}

impl Server {
    /// Bind the listener and build the shared screen from the configured
    /// display geometry
    pub fn bind(config: Config) -> ServerResult<Self> {
        let listener = TcpListener::bind(("0.0.0.0", config.port)).map_err(ServerError::Bind)?;
        listener.set_nonblocking(true)?;

        let size = config.geometry();
        let screen = Arc::new(Mutex::new(Screen::new(
            size.rows as usize,
            size.cols as usize,
        )));

        Ok(Self {
            listener,
            config,
            screen,
            running: Arc::new(AtomicBool::new(true)),
            relay_thread: None,
        })
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared screen for an external renderer. The handle
    /// stays valid across client sessions; each new session starts with
    /// the screen fully reset.
    pub fn screen(&self) -> Arc<Mutex<Screen>> {
        Arc::clone(&self.screen)
    }

    /// Shared running flag; clearing it stops the accept loop and any
    /// active relay within their poll intervals
    pub fn running(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Accept loop. Blocks the calling thread until the running flag is
    /// cleared, then joins the active relay before returning.
    pub fn run(&mut self) -> ServerResult<()> {
        tracing::info!(port = self.config.port, "terminal server listening");

        while self.running.load(Ordering::Relaxed) {
            if !self.wait_incoming()? {
                continue;
            }

            match self.listener.accept() {
                Ok((stream, addr)) => self.handle_client(stream, addr),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }

        self.join_relay();
        tracing::info!("terminal server stopped");
        Ok(())
    }

    /// Request shutdown and wait for the relay thread to finish.
    /// `run` must have returned (or never started) before resources are
    /// actually released with the server itself.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        self.join_relay();
    }

    /// Poll the listener with a bounded timeout
    fn wait_incoming(&self) -> ServerResult<bool> {
        // SAFETY: the listener outlives this call
        let fd = unsafe { BorrowedFd::borrow_raw(self.listener.as_raw_fd()) };
        let mut fds = [PollFd::new(&fd, PollFlags::POLLIN)];
        match poll(&mut fds, ACCEPT_TIMEOUT_MS) {
            Ok(n) => Ok(n > 0),
            // A signal landing mid-poll must not kill the accept loop
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(ServerError::Poll(e)),
        }
    }

    fn handle_client(&mut self, stream: TcpStream, addr: SocketAddr) {
        if self.relay_active() {
            // One peer at a time; drop the second connection on the floor
            // without disturbing the active session
            tracing::debug!(%addr, "rejecting connection, client already active");
            drop(stream);
            return;
        }

        tracing::info!(%addr, "client connected");

        // Every client gets a brand-new shell session
        let size = self.config.geometry();
        let pty = match Pty::spawn(
            &self.config.shell,
            &self.config.shell_args(),
            size,
            &self.config.prompt,
        ) {
            Ok(pty) => pty,
            Err(e) => {
                tracing::warn!(error = %e, "failed to spawn shell session");
                drop(stream);
                return;
            }
        };

        let terminal = Terminal::with_screen(Arc::clone(&self.screen));
        let running = Arc::clone(&self.running);
        match Relay::new(pty, terminal, Some(stream), running) {
            Ok(relay) => {
                self.relay_thread = Some(std::thread::spawn(move || {
                    if let Err(e) = relay.run() {
                        tracing::warn!(error = %e, "relay failed");
                    }
                }));
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to start relay");
            }
        }
    }

    /// Whether a relay is currently serving a client
    fn relay_active(&self) -> bool {
        self.relay_thread
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn join_relay(&mut self) {
        if let Some(handle) = self.relay_thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}

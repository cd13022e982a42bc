//! Bidirectional relay
//!
//! A single loop multiplexes the PTY master and the peer socket with a
//! bounded poll. PTY output goes two ways: raw bytes to the peer and
//! through the interpreter into the screen buffer. Peer input goes verbatim
//! to the PTY. Either side reaching end-of-stream ends the relay, after
//! which the peer is closed, the PTY session stopped, and the screen
//! cleared. Bytes from one source are always forwarded in the order they
//! were read.

use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::os::fd::BorrowedFd;
use std::os::unix::io::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags};

use crate::pty::{Pty, PtyError};
use crate::terminal::Terminal;

/// Bounded wait per multiplexed poll, so the loop observes a shutdown
/// request without busy-spinning
const POLL_TIMEOUT_MS: i32 = 50;

/// Bounded wait when retrying a blocked write
const WRITE_RETRY_MS: i32 = 10;

const BUF_SIZE: usize = 4096;

/// Error type for relay operations
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("PTY error: {0}")]
    Pty(#[from] PtyError),

    #[error("Failed to poll relay descriptors: {0}")]
    Poll(#[source] nix::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Relays bytes between one PTY session and at most one peer, feeding PTY
/// output through the interpreter into the shared screen
pub struct Relay {
    pty: Pty,
    peer: Option<TcpStream>,
    terminal: Terminal,
    running: Arc<AtomicBool>,
}

impl Relay {
    /// Create a relay over a fresh PTY session. `peer` is the remote end of
    /// the raw byte pipe, or `None` for a local-only session whose output
    /// only feeds the screen.
    pub fn new(
        pty: Pty,
        terminal: Terminal,
        peer: Option<TcpStream>,
        running: Arc<AtomicBool>,
    ) -> RelayResult<Self> {
        if let Some(ref peer) = peer {
            peer.set_nonblocking(true)?;
        }
        Ok(Self {
            pty,
            peer,
            terminal,
            running,
        })
    }

    /// Run the relay loop until either side reaches end-of-stream or the
    /// running flag is cleared. Teardown runs whether the loop ends normally
    /// or with an error; the session is never left half-open.
    pub fn run(mut self) -> RelayResult<()> {
        // The relay starts with a clean screen; nothing survives from a
        // previous session
        self.terminal.reset();

        let result = self.relay_loop();
        self.finish();
        result
    }

    fn relay_loop(&mut self) -> RelayResult<()> {
        let mut buf = [0u8; BUF_SIZE];

        while self.running.load(Ordering::Relaxed) {
            let (pty_ready, peer_ready) = self.wait_readable()?;

            if pty_ready && !self.pump_pty(&mut buf) {
                break;
            }
            if peer_ready && !self.pump_peer(&mut buf) {
                break;
            }
        }

        Ok(())
    }

    /// Poll both descriptors with a bounded timeout
    fn wait_readable(&self) -> RelayResult<(bool, bool)> {
        // SAFETY: both fds stay open for the lifetime of this Relay
        let pty_fd = unsafe { BorrowedFd::borrow_raw(self.pty.master_fd()) };
        let peer_raw = self.peer.as_ref().map(|p| p.as_raw_fd());
        let peer_fd = peer_raw.map(|fd| unsafe { BorrowedFd::borrow_raw(fd) });

        let mut fds = Vec::with_capacity(2);
        fds.push(PollFd::new(&pty_fd, PollFlags::POLLIN));
        if let Some(ref fd) = peer_fd {
            fds.push(PollFd::new(fd, PollFlags::POLLIN));
        }

        let n = match poll(&mut fds, POLL_TIMEOUT_MS) {
            Ok(n) => n,
            // A signal landing mid-poll is not a relay failure; the next
            // pass retries
            Err(Errno::EINTR) => return Ok((false, false)),
            Err(e) => return Err(RelayError::Poll(e)),
        };
        if n == 0 {
            return Ok((false, false));
        }

        let readable = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR;
        let pty_ready = fds[0].revents().is_some_and(|r| r.intersects(readable));
        let peer_ready = fds
            .get(1)
            .and_then(|f| f.revents())
            .is_some_and(|r| r.intersects(readable));
        Ok((pty_ready, peer_ready))
    }

    /// Drain PTY output into the screen and the peer.
    /// Returns false when the relay should end.
    fn pump_pty(&mut self, buf: &mut [u8]) -> bool {
        loop {
            match self.pty.read(buf) {
                Ok(0) => {
                    tracing::debug!("pty reached end of stream");
                    return false;
                }
                Ok(n) => {
                    self.terminal.process(&buf[..n]);
                    if let Some(ref mut peer) = self.peer {
                        if let Err(e) = write_all_nonblocking(peer, &buf[..n]) {
                            tracing::debug!(error = %e, "peer write failed");
                            return false;
                        }
                    }
                }
                Err(PtyError::WouldBlock) => return true,
                Err(e) => {
                    tracing::debug!(error = %e, "pty read failed");
                    return false;
                }
            }
        }
    }

    /// Drain peer input into the PTY.
    /// Returns false when the relay should end.
    fn pump_peer(&mut self, buf: &mut [u8]) -> bool {
        let Some(ref mut peer) = self.peer else {
            return true;
        };
        loop {
            match peer.read(buf) {
                Ok(0) => {
                    tracing::debug!("peer disconnected");
                    return false;
                }
                Ok(n) => {
                    if let Err(e) = self.pty.write_all(&buf[..n]) {
                        tracing::debug!(error = %e, "pty write failed");
                        return false;
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return true,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::debug!(error = %e, "peer read failed");
                    return false;
                }
            }
        }
    }

    /// Tear down: close the peer, stop the PTY session, clear the screen
    fn finish(&mut self) {
        drop(self.peer.take());
        self.pty.stop();
        self.terminal.reset();
        tracing::info!("relay ended");
    }
}

/// Write all bytes to a non-blocking stream, waiting briefly for
/// writability on short writes. A hard error here ends the relay the same
/// way end-of-stream does.
fn write_all_nonblocking(stream: &mut TcpStream, mut data: &[u8]) -> io::Result<()> {
    while !data.is_empty() {
        match stream.write(data) {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => data = &data[n..],
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                wait_writable(stream)?;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn wait_writable(stream: &TcpStream) -> io::Result<()> {
    // SAFETY: the stream outlives this call
    let fd = unsafe { BorrowedFd::borrow_raw(stream.as_raw_fd()) };
    let mut fds = [PollFd::new(&fd, PollFlags::POLLOUT)];
    match poll(&mut fds, WRITE_RETRY_MS) {
        Ok(_) | Err(Errno::EINTR) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

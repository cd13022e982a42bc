//! Unix PTY implementation
//!
//! Implements PTY creation and child process management using POSIX APIs.
//! One session owns one shell process; `stop` is idempotent and reaps the
//! child so repeated connect/disconnect cycles never accumulate zombies.

use std::ffi::CString;
use std::os::fd::BorrowedFd;
use std::os::unix::io::{AsRawFd, RawFd};

use nix::fcntl::{fcntl, open, FcntlArg, OFlag};
use nix::libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO};
use nix::poll::{poll, PollFd, PollFlags};
use nix::pty::{grantpt, posix_openpt, ptsname, unlockpt, PtyMaster};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, execvp, fork, read, setsid, write, ForkResult, Pid};

use super::{PtyError, PtyResult, WindowSize};

/// A pseudoterminal session with a spawned shell process
pub struct Pty {
    /// The PTY master file descriptor
    master: PtyMaster,
    /// The child process ID
    child_pid: Pid,
    /// Whether the child is still running
    child_alive: bool,
}

impl Pty {
    /// Spawn a new PTY session running the given shell.
    ///
    /// The child becomes a session leader with the slave side as its
    /// controlling terminal and standard streams, and gets `TERM`,
    /// `COLUMNS`, `LINES`, and `PS1` from the session geometry and prompt.
    /// If anything fails on the child side after the fork, the child calls
    /// `_exit(1)`; it never returns into the caller. The parent's master
    /// descriptor is set non-blocking.
    pub fn spawn(shell: &str, args: &[&str], size: WindowSize, prompt: &str) -> PtyResult<Self> {
        // Open PTY master
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;

        // Grant access to slave
        grantpt(&master).map_err(PtyError::GrantPty)?;

        // Unlock slave
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        // Get slave name
        // SAFETY: ptsname is not thread-safe, but we're calling it immediately
        // after unlockpt and before any other thread could interfere
        let slave_name = unsafe { ptsname(&master) }.map_err(PtyError::PtsName)?;

        // Set initial window size
        set_window_size(master.as_raw_fd(), size)?;

        // Fork
        // SAFETY: fork is safe as long as we're careful in the child
        match unsafe { fork() }.map_err(PtyError::Fork)? {
            ForkResult::Child => {
                // Child process: any failure is unrecoverable
                // Drop the master fd (child doesn't need it)
                drop(master);

                if setsid().is_err() {
                    // SAFETY: _exit is async-signal-safe
                    unsafe { libc::_exit(1) };
                }

                // Open slave - this becomes the controlling terminal
                let slave_fd = match open(slave_name.as_str(), OFlag::O_RDWR, Mode::empty()) {
                    Ok(fd) => fd,
                    Err(_) => unsafe { libc::_exit(1) },
                };

                // Set controlling terminal
                // SAFETY: TIOCSCTTY is a valid ioctl for setting controlling terminal
                unsafe {
                    if libc::ioctl(slave_fd, libc::TIOCSCTTY as _, 0) < 0 {
                        // Non-fatal on some systems
                        tracing::debug!("TIOCSCTTY failed (may be ok)");
                    }
                }

                // Duplicate slave to stdin/stdout/stderr
                for std_fd in [STDIN_FILENO, STDOUT_FILENO, STDERR_FILENO] {
                    if dup2(slave_fd, std_fd).is_err() {
                        unsafe { libc::_exit(1) };
                    }
                }

                // Close original slave fd if it's not one of the standard fds
                if slave_fd > STDERR_FILENO {
                    let _ = close(slave_fd);
                }

                // Session environment for the shell and its tooling
                std::env::set_var("TERM", "xterm-256color");
                std::env::set_var("COLUMNS", size.cols.to_string());
                std::env::set_var("LINES", size.rows.to_string());
                std::env::set_var("PS1", prompt);

                // Convert shell and args to CStrings; a NUL in either is a
                // caller bug we can only answer with exit
                let Ok(shell_cstr) = CString::new(shell) else {
                    unsafe { libc::_exit(1) }
                };
                let mut argv: Vec<CString> = Vec::with_capacity(args.len() + 1);
                argv.push(shell_cstr.clone());
                for arg in args {
                    match CString::new(*arg) {
                        Ok(c) => argv.push(c),
                        Err(_) => unsafe { libc::_exit(1) },
                    }
                }

                // Execute shell; execvp only returns on error
                let _ = execvp(&shell_cstr, &argv);
                unsafe { libc::_exit(1) }
            }
            ForkResult::Parent { child } => {
                // Set master to non-blocking
                let flags = fcntl(master.as_raw_fd(), FcntlArg::F_GETFL)
                    .map_err(PtyError::SetNonBlocking)?;
                let flags = OFlag::from_bits_truncate(flags);
                fcntl(
                    master.as_raw_fd(),
                    FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK),
                )
                .map_err(PtyError::SetNonBlocking)?;

                Ok(Pty {
                    master,
                    child_pid: child,
                    child_alive: true,
                })
            }
        }
    }

    /// Get the raw file descriptor of the PTY master
    pub fn master_fd(&self) -> RawFd {
        self.master.as_raw_fd()
    }

    /// Get the child process ID
    pub fn child_pid(&self) -> Pid {
        self.child_pid
    }

    /// Check if the child process is still running
    pub fn is_alive(&mut self) -> bool {
        if !self.child_alive {
            return false;
        }

        match waitpid(self.child_pid, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) => true,
            Ok(_) | Err(_) => {
                self.child_alive = false;
                false
            }
        }
    }

    /// Read from the PTY master (non-blocking).
    ///
    /// Returns `Ok(0)` once the child has exited: both a plain EOF and the
    /// EIO a Linux master reports after the slave side closes count as
    /// end-of-stream. `PtyError::WouldBlock` means no data right now.
    pub fn read(&self, buf: &mut [u8]) -> PtyResult<usize> {
        match read(self.master.as_raw_fd(), buf) {
            Ok(n) => Ok(n),
            // EAGAIN and EWOULDBLOCK are the same value on Linux
            Err(nix::errno::Errno::EAGAIN) => Err(PtyError::WouldBlock),
            Err(nix::errno::Errno::EIO) => Ok(0),
            Err(e) => Err(PtyError::Read(e)),
        }
    }

    /// Write to the PTY master (non-blocking); partial writes are possible
    pub fn write(&self, data: &[u8]) -> PtyResult<usize> {
        match write(self.master.as_raw_fd(), data) {
            Ok(n) => Ok(n),
            Err(nix::errno::Errno::EAGAIN) => Err(PtyError::WouldBlock),
            Err(e) => Err(PtyError::Write(e)),
        }
    }

    /// Write all data to the PTY master, retrying partial and would-block
    /// writes until everything is sent or a hard error occurs
    pub fn write_all(&self, mut data: &[u8]) -> PtyResult<()> {
        while !data.is_empty() {
            match self.write(data) {
                Ok(n) => data = &data[n..],
                Err(PtyError::WouldBlock) => {
                    self.poll_writable(10)?;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Stop the session: signal the child, wait for it to exit, and mark it
    /// dead. Idempotent; safe to call if the child already exited.
    pub fn stop(&mut self) {
        if !self.child_alive {
            return;
        }
        let _ = kill(self.child_pid, Signal::SIGTERM);
        let _ = waitpid(self.child_pid, None);
        self.child_alive = false;
    }

    /// Wait until the master is writable or the timeout expires
    fn poll_writable(&self, timeout_ms: i32) -> PtyResult<bool> {
        // SAFETY: The master fd is valid for the lifetime of this Pty
        let borrowed_fd = unsafe { BorrowedFd::borrow_raw(self.master.as_raw_fd()) };
        let mut fds = [PollFd::new(&borrowed_fd, PollFlags::POLLOUT)];
        match poll(&mut fds, timeout_ms) {
            Ok(n) => Ok(n > 0),
            Err(nix::errno::Errno::EINTR) => Ok(false),
            Err(e) => Err(PtyError::Poll(e)),
        }
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        // Terminate and reap the child; the master fd closes with PtyMaster
        self.stop();
    }
}

/// Set the window size on a PTY file descriptor
fn set_window_size(fd: RawFd, size: WindowSize) -> PtyResult<()> {
    let winsize = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.pixel_width,
        ws_ypixel: size.pixel_height,
    };

    // SAFETY: TIOCSWINSZ is a valid ioctl for setting window size
    let result = unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &winsize) };

    if result < 0 {
        Err(PtyError::SetWinsize(nix::errno::Errno::last()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_with_retries(pty: &Pty, buf: &mut [u8]) -> usize {
        for _ in 0..50 {
            match pty.read(buf) {
                Ok(n) => return n,
                Err(PtyError::WouldBlock) => {
                    std::thread::sleep(std::time::Duration::from_millis(20));
                }
                Err(e) => panic!("read failed: {e}"),
            }
        }
        0
    }

    #[test]
    fn test_pty_spawn_echo() {
        let mut pty = Pty::spawn("/bin/echo", &["hello"], WindowSize::new(24, 80), "$ ")
            .expect("Failed to spawn PTY");

        let mut buf = [0u8; 1024];
        let n = read_with_retries(&pty, &mut buf);
        let output = String::from_utf8_lossy(&buf[..n]);
        assert!(
            output.contains("hello") || n == 0,
            "Unexpected output: {}",
            output
        );

        pty.stop();
        assert!(!pty.is_alive());
    }

    #[test]
    fn test_pty_write_read() {
        // cat echoes input back through the PTY
        let mut pty = Pty::spawn("/bin/cat", &[], WindowSize::new(24, 80), "$ ")
            .expect("Failed to spawn PTY");

        pty.write_all(b"test\n").expect("Failed to write");

        let mut buf = [0u8; 1024];
        let n = read_with_retries(&pty, &mut buf);
        let output = String::from_utf8_lossy(&buf[..n]);
        assert!(
            output.contains("test") || n == 0,
            "Unexpected output: {}",
            output
        );

        pty.stop();
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut pty = Pty::spawn("/bin/cat", &[], WindowSize::new(24, 80), "$ ")
            .expect("Failed to spawn PTY");

        pty.stop();
        pty.stop();
        assert!(!pty.is_alive());
    }

    #[test]
    fn test_read_after_child_exit_reports_closed() {
        let mut pty = Pty::spawn("/bin/true", &[], WindowSize::new(24, 80), "$ ")
            .expect("Failed to spawn PTY");

        // Give the child time to exit
        for _ in 0..50 {
            if !pty.is_alive() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        // Drain anything buffered; the stream must end with Ok(0)
        let mut buf = [0u8; 1024];
        loop {
            match pty.read(&mut buf) {
                Ok(0) => break,
                Ok(_) => continue,
                Err(PtyError::WouldBlock) => {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
    }
}

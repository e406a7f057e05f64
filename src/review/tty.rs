//! Controlling-terminal access and raw-mode lifetime management.
//!
//! The review prompt talks to `/dev/tty` directly so it stays interactive
//! even when stdout is redirected (the generated command is written to a
//! tmpfile, not the screen). Raw mode is scoped to a guard that restores the
//! captured termios attributes on drop, so no exit path (early return,
//! error, or panic unwind) leaves the terminal unusable.

use crate::error::TerminalError;
use crate::review::key::RawInput;
use crossterm::style::{Color, Print, PrintStyledContent, Stylize};
use crossterm::QueueableCommand;
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, Termios};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsFd;
use std::time::Duration;

const TTY_PATH: &str = "/dev/tty";

/// Key legend shown under the candidate command.
const LEGEND: &str = "  [Enter] run  [Space] edit  [Esc] cancel";

/// Exclusive handle on the controlling terminal for one review session.
#[derive(Debug)]
pub struct TtyHandle {
    file: File,
    color: bool,
}

impl TtyHandle {
    /// Open `/dev/tty` read+write.
    ///
    /// Fails with [`TerminalError::Unavailable`] when the process has no
    /// controlling terminal; the caller must fall back to auto-cancel.
    pub fn open(color: bool) -> Result<Self, TerminalError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(TTY_PATH)
            .map_err(TerminalError::Unavailable)?;
        Ok(Self { file, color })
    }

    /// Write the candidate command and key legend to the terminal device.
    ///
    /// Must be called before entering raw mode: the rendering relies on
    /// cooked-mode newline translation.
    pub fn render_review_prompt(&mut self, command: &str) -> Result<(), TerminalError> {
        let color = self.color;
        self.file
            .queue(Print("\n  "))
            .and_then(|f| {
                if color {
                    f.queue(PrintStyledContent(command.with(Color::Green).bold()))
                } else {
                    f.queue(Print(command))
                }
            })
            .and_then(|f| f.queue(Print("\n\n")))
            .and_then(|f| f.queue(Print(LEGEND)))
            .and_then(|f| f.queue(Print("\n")))
            .and_then(|f| f.flush())
            .map_err(TerminalError::WriteFailed)
    }

    /// Write a trailing newline to close out the prompt area. Best-effort.
    pub fn finish_prompt(&mut self) {
        if let Err(e) = self.file.write_all(b"\n").and_then(|_| self.file.flush()) {
            tracing::debug!("trailing newline write failed: {e}");
        }
    }

    /// Capture current attributes and switch the device into raw mode.
    ///
    /// The returned guard restores the captured attributes when dropped. The
    /// guard holds a duplicated descriptor of the same terminal, so the
    /// handle stays usable for reads while the guard is alive.
    pub fn enter_raw_mode(&self) -> Result<RawModeGuard, TerminalError> {
        let file = self.file.try_clone().map_err(TerminalError::Unavailable)?;
        let saved = tcgetattr(file.as_fd()).map_err(TerminalError::RawModeFailed)?;
        let mut raw = saved.clone();
        cfmakeraw(&mut raw);
        tcsetattr(file.as_fd(), SetArg::TCSADRAIN, &raw).map_err(TerminalError::RawModeFailed)?;
        Ok(RawModeGuard {
            file,
            saved,
            restored: false,
        })
    }
}

impl RawInput for TtyHandle {
    fn read_byte(&mut self) -> Result<u8, TerminalError> {
        let mut buf = [0u8; 1];
        match self.file.read(&mut buf) {
            Ok(0) => Err(TerminalError::ReadFailed(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "end of input on /dev/tty",
            ))),
            Ok(_) => Ok(buf[0]),
            Err(e) => Err(TerminalError::ReadFailed(e)),
        }
    }

    fn poll_readable(&mut self, timeout: Duration) -> Result<bool, TerminalError> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(0) => Ok(false),
            Ok(_) => Ok(true),
            // A signal during the wait counts as "window expired"; the
            // pending byte (if any) is picked up by the next blocking read.
            Err(Errno::EINTR) => Ok(false),
            Err(e) => Err(TerminalError::ReadFailed(std::io::Error::from_raw_os_error(
                e as i32,
            ))),
        }
    }
}

/// Scoped raw-mode state; restores captured attributes exactly once.
pub struct RawModeGuard {
    file: File,
    saved: Termios,
    restored: bool,
}

impl RawModeGuard {
    /// Restore the captured attributes now instead of at end of scope.
    pub fn restore(mut self) {
        self.restore_attrs();
    }

    fn restore_attrs(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        // Best-effort: a failed restore is reported, never fatal.
        if let Err(e) = tcsetattr(self.file.as_fd(), SetArg::TCSADRAIN, &self.saved) {
            tracing::warn!("failed to restore terminal attributes: {e}");
        }
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        self.restore_attrs();
    }
}

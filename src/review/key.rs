//! Key decoding for the raw-mode review prompt.
//!
//! Terminals encode both a standalone Escape key and the start of multi-byte
//! function/arrow-key sequences with the same leading 0x1B byte. Without a
//! terminal capability database the only reliable disambiguation is a short
//! wait for continuation bytes: long enough that a human-typed Escape is
//! never misread as the start of a sequence, short enough not to add
//! perceptible input lag.

use crate::error::TerminalError;
use std::time::Duration;

/// How long to wait for escape-sequence continuation bytes.
pub const ESCAPE_WINDOW: Duration = Duration::from_millis(50);

/// Upper bound on trailing escape-sequence bytes consumed and discarded.
const ESCAPE_TAIL_MAX: usize = 8;

const ESC: u8 = 0x1b;

/// One decoded keypress from the terminal device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Carriage return or line feed.
    Enter,
    /// The space bar.
    Space,
    /// A bare Escape keypress.
    Escape,
    /// A multi-byte escape sequence (arrow/function key); contents discarded.
    EscapeSequence,
    /// Any other single byte.
    Other,
}

/// Raw byte source for the decoder.
///
/// The production implementation wraps the `/dev/tty` handle; tests script
/// byte streams and poll results.
pub trait RawInput {
    /// Block until one byte is available and return it.
    fn read_byte(&mut self) -> Result<u8, TerminalError>;

    /// Report whether a byte is readable within `timeout` without blocking
    /// past it. A zero timeout answers immediately.
    fn poll_readable(&mut self, timeout: Duration) -> Result<bool, TerminalError>;
}

/// Read exactly one semantic key event from a raw-mode byte stream.
pub fn read_key<I: RawInput + ?Sized>(input: &mut I) -> Result<KeyEvent, TerminalError> {
    let byte = input.read_byte()?;
    match byte {
        ESC => {
            if !input.poll_readable(ESCAPE_WINDOW)? {
                return Ok(KeyEvent::Escape);
            }
            // Continuation bytes belong to a sequence we don't interpret;
            // drain a bounded tail so they don't leak into later reads.
            for _ in 0..ESCAPE_TAIL_MAX {
                if !input.poll_readable(Duration::ZERO)? {
                    break;
                }
                input.read_byte()?;
            }
            Ok(KeyEvent::EscapeSequence)
        }
        b'\r' | b'\n' => Ok(KeyEvent::Enter),
        b' ' => Ok(KeyEvent::Space),
        _ => Ok(KeyEvent::Other),
    }
}

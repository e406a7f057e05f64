//! Interactive review of the generated command.
//!
//! The controller renders the candidate on the controlling terminal, reads a
//! single discriminating keypress in raw mode, and maps it to a decision:
//! Enter runs the command as-is, Space opens a pre-filled line editor, and
//! anything else (Esc, an escape sequence, a stray byte, a terminal fault)
//! cancels. Ambiguous input fails closed; a broken terminal session can
//! never accept a command the user did not confirm.

pub mod key;
pub mod tty;

use crate::error::TerminalError;
use key::{read_key, KeyEvent};
use std::path::Path;
use tty::TtyHandle;

/// Result of one interactive review session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// User confirmed this command text (original or edited).
    Accepted(String),
    /// User cancelled, or the terminal could not support a review.
    Cancelled,
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Terminal surface consumed by the controller.
///
/// [`TtyHandle`] is the production implementation; tests substitute a
/// scripted fake to drive the full transition table without a terminal.
pub trait ReviewSurface {
    /// Render the candidate command and key legend.
    fn render(&mut self, command: &str) -> Result<(), TerminalError>;
    /// Enter raw mode, read one key event, and restore attributes.
    fn read_key_raw(&mut self) -> Result<KeyEvent, TerminalError>;
    /// Close out the prompt area after the decision. Best-effort.
    fn finish(&mut self);
}

impl ReviewSurface for TtyHandle {
    fn render(&mut self, command: &str) -> Result<(), TerminalError> {
        self.render_review_prompt(command)
    }

    fn read_key_raw(&mut self) -> Result<KeyEvent, TerminalError> {
        let guard = self.enter_raw_mode()?;
        let key = read_key(self);
        // Restore before anything else touches the terminal, including the
        // line editor and the trailing newline.
        guard.restore();
        key
    }

    fn finish(&mut self) {
        self.finish_prompt();
    }
}

/// Pre-filled line editing, resolved only when the Edit transition fires.
pub trait LineEditor {
    /// Return the edited string, or `None` on cancel/EOF/empty submission.
    fn edit(&mut self, initial: &str) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Run one review session on the controlling terminal.
///
/// Terminal faults (no tty, raw-mode failure, read errors) degrade to
/// [`ReviewDecision::Cancelled`] with a diagnostic on stderr; no error
/// reaches the caller.
///
/// The review prompt itself goes to `/dev/tty`, but the edit path drives
/// the process's stdin/stdout through rustyline; callers that redirect
/// stdout away from the terminal will not see the edit prompt.
pub fn review(command: &str, color: bool) -> ReviewDecision {
    let mut tty = match TtyHandle::open(color) {
        Ok(tty) => tty,
        Err(e) => {
            eprintln!("magic-run: {e}");
            return ReviewDecision::Cancelled;
        }
    };
    review_on(&mut tty, command, || Box::new(RustylineEditor))
}

/// Controller core over injected terminal and editor seams.
///
/// The editor factory runs only when Space is pressed, keeping editor
/// construction off the fast path.
pub fn review_on<S, F>(surface: &mut S, command: &str, make_editor: F) -> ReviewDecision
where
    S: ReviewSurface + ?Sized,
    F: FnOnce() -> Box<dyn LineEditor>,
{
    if let Err(e) = surface.render(command) {
        eprintln!("magic-run: {e}");
        return ReviewDecision::Cancelled;
    }

    let key = surface.read_key_raw();
    surface.finish();

    match key {
        Ok(KeyEvent::Enter) => ReviewDecision::Accepted(command.to_string()),
        Ok(KeyEvent::Space) => match make_editor().edit(command) {
            Some(edited) => ReviewDecision::Accepted(edited),
            None => ReviewDecision::Cancelled,
        },
        Ok(KeyEvent::Escape) | Ok(KeyEvent::EscapeSequence) | Ok(KeyEvent::Other) => {
            ReviewDecision::Cancelled
        }
        Err(e) => {
            eprintln!("magic-run: {e}");
            ReviewDecision::Cancelled
        }
    }
}

/// Write the accepted command, newline-terminated, to the output path.
///
/// Cancelled decisions write nothing at all: the parent shell treats an
/// untouched tmpfile as "no command to run".
pub fn write_accepted(decision: &ReviewDecision, path: &Path) -> std::io::Result<()> {
    if let ReviewDecision::Accepted(command) = decision {
        std::fs::write(path, format!("{command}\n"))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rustyline-backed editor
// ---------------------------------------------------------------------------

/// Production editor: rustyline with the candidate pre-filled.
pub struct RustylineEditor;

impl LineEditor for RustylineEditor {
    fn edit(&mut self, initial: &str) -> Option<String> {
        let mut editor = match rustyline::DefaultEditor::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::warn!("cannot start line editor: {e}");
                return None;
            }
        };
        match editor.readline_with_initial("Edit: ", (initial, "")) {
            Ok(line) => {
                let line = line.trim().to_string();
                (!line.is_empty()).then_some(line)
            }
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => None,
            Err(e) => {
                tracing::warn!("line editor failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Scripted surface: yields one key result and records lifecycle calls.
    struct FakeSurface {
        key: Option<Result<KeyEvent, TerminalError>>,
        render_fails: bool,
        rendered: Option<String>,
        finished: bool,
    }

    impl FakeSurface {
        fn key(key: KeyEvent) -> Self {
            Self {
                key: Some(Ok(key)),
                render_fails: false,
                rendered: None,
                finished: false,
            }
        }

        fn read_failure() -> Self {
            Self {
                key: Some(Err(TerminalError::ReadFailed(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "device closed",
                )))),
                render_fails: false,
                rendered: None,
                finished: false,
            }
        }
    }

    impl ReviewSurface for FakeSurface {
        fn render(&mut self, command: &str) -> Result<(), TerminalError> {
            if self.render_fails {
                return Err(TerminalError::WriteFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "gone",
                )));
            }
            self.rendered = Some(command.to_string());
            Ok(())
        }

        fn read_key_raw(&mut self) -> Result<KeyEvent, TerminalError> {
            self.key.take().expect("read_key_raw called twice")
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    struct ScriptedEditor {
        result: Option<String>,
        seen_initial: Rc<Cell<bool>>,
    }

    impl LineEditor for ScriptedEditor {
        fn edit(&mut self, initial: &str) -> Option<String> {
            self.seen_initial.set(!initial.is_empty());
            self.result.take()
        }
    }

    fn no_editor() -> Box<dyn LineEditor> {
        panic!("editor constructed without the edit key");
    }

    #[test]
    fn enter_accepts_the_original_command() {
        let mut surface = FakeSurface::key(KeyEvent::Enter);
        let decision = review_on(&mut surface, "rm -rf /tmp/x", no_editor);
        assert_eq!(decision, ReviewDecision::Accepted("rm -rf /tmp/x".into()));
        assert_eq!(surface.rendered.as_deref(), Some("rm -rf /tmp/x"));
        assert!(surface.finished);
    }

    #[test]
    fn escape_cancels() {
        let mut surface = FakeSurface::key(KeyEvent::Escape);
        assert_eq!(
            review_on(&mut surface, "ls", no_editor),
            ReviewDecision::Cancelled
        );
        assert!(surface.finished);
    }

    #[test]
    fn escape_sequence_and_stray_bytes_cancel() {
        for key in [KeyEvent::EscapeSequence, KeyEvent::Other] {
            let mut surface = FakeSurface::key(key);
            assert_eq!(
                review_on(&mut surface, "ls", no_editor),
                ReviewDecision::Cancelled,
                "key {key:?}"
            );
        }
    }

    #[test]
    fn space_delegates_to_editor_and_accepts_its_result() {
        let mut surface = FakeSurface::key(KeyEvent::Space);
        let decision = review_on(&mut surface, "ls -l", || {
            Box::new(ScriptedEditor {
                result: Some("ls -la".into()),
                seen_initial: Rc::new(Cell::new(false)),
            })
        });
        assert_eq!(decision, ReviewDecision::Accepted("ls -la".into()));
    }

    #[test]
    fn edit_round_trip_keeps_unmodified_default() {
        // Submitting the pre-filled text unchanged accepts it.
        let mut surface = FakeSurface::key(KeyEvent::Space);
        let decision = review_on(&mut surface, "ls -la", || {
            Box::new(ScriptedEditor {
                result: Some("ls -la".into()),
                seen_initial: Rc::new(Cell::new(false)),
            })
        });
        assert_eq!(decision, ReviewDecision::Accepted("ls -la".into()));
    }

    #[test]
    fn editor_cancel_cancels_the_review() {
        let mut surface = FakeSurface::key(KeyEvent::Space);
        let decision = review_on(&mut surface, "ls", || {
            Box::new(ScriptedEditor {
                result: None,
                seen_initial: Rc::new(Cell::new(false)),
            })
        });
        assert_eq!(decision, ReviewDecision::Cancelled);
    }

    #[test]
    fn editor_receives_the_prefilled_command() {
        let seen = Rc::new(Cell::new(false));
        let seen_in_editor = seen.clone();
        let mut surface = FakeSurface::key(KeyEvent::Space);
        review_on(&mut surface, "du -sh *", move || {
            Box::new(ScriptedEditor {
                result: None,
                seen_initial: seen_in_editor,
            })
        });
        assert!(seen.get());
    }

    #[test]
    fn read_failure_degrades_to_cancelled() {
        let mut surface = FakeSurface::read_failure();
        assert_eq!(
            review_on(&mut surface, "ls", no_editor),
            ReviewDecision::Cancelled
        );
        // The prompt area is still closed out on the failure path.
        assert!(surface.finished);
    }

    #[test]
    fn render_failure_cancels_without_reading_keys() {
        let mut surface = FakeSurface {
            key: None,
            render_fails: true,
            rendered: None,
            finished: false,
        };
        assert_eq!(
            review_on(&mut surface, "ls", no_editor),
            ReviewDecision::Cancelled
        );
    }

    fn temp_output_path(tag: &str) -> std::path::PathBuf {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        std::env::temp_dir().join(format!("magic-run-{tag}-{}-{millis}", std::process::id()))
    }

    #[test]
    fn cancelled_decision_leaves_output_path_untouched() {
        let path = temp_output_path("cancelled");
        write_accepted(&ReviewDecision::Cancelled, &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn accepted_decision_writes_newline_terminated_command() {
        let path = temp_output_path("accepted");
        write_accepted(&ReviewDecision::Accepted("ls -la".into()), &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "ls -la\n");
        let _ = std::fs::remove_file(&path);
    }
}

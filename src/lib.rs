//! magic-run — natural language to zsh commands via a local Ollama instance.
//!
//! The pipeline is sequential glue around one interactive core: build a
//! prompt from shell context, stream a command from the model, strip any
//! markdown decoration, then let the user review it on the controlling
//! terminal: Enter runs, Space edits, Esc cancels. The accepted command is
//! written to a tmpfile for a parent zsh widget to source.
//!
//! # Quick start
//!
//! ```no_run
//! use magic_run::review::{review, ReviewDecision};
//!
//! match review("ls -la", true) {
//!     ReviewDecision::Accepted(command) => println!("{command}"),
//!     ReviewDecision::Cancelled => {}
//! }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod prompt;
pub mod review;
pub mod textutil;
pub mod types;

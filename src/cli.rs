//! CLI argument parsing via clap.

use clap::Parser;
use std::path::PathBuf;

/// Convert natural language to a zsh command via Ollama.
#[derive(Debug, Parser)]
#[command(name = "magic-run", version)]
pub struct Args {
    /// Natural-language description of the command to generate.
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Tmpfile path for the accepted command (sourced by the parent shell).
    #[arg(long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Path to config file (default: ~/.config/magic/config.toml).
    #[arg(short = 'c', long = "config")]
    pub config: Option<String>,

    /// Override model name.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Override Ollama base URL.
    #[arg(long = "url")]
    pub url: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Args {
    /// Join the query words into the natural-language request.
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }
}

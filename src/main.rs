//! CLI entry point for magic-run.

mod cli;

use clap::Parser;
use magic_run::api;
use magic_run::config::load_config;
use magic_run::context::ShellContext;
use magic_run::error::ConfigError;
use magic_run::prompt::build_messages;
use magic_run::review::{review, write_accepted};
use magic_run::textutil::strip_markdown;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e @ ConfigError::Missing) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    // Apply CLI overrides.
    if let Some(model) = &args.model {
        config.model = model.clone();
    }
    if let Some(url) = &args.url {
        config.url = url.clone();
    }

    let context = ShellContext::capture();
    let messages = build_messages(&context, &args.query_text());

    // Tokens stream to stderr so the user watches the command being written;
    // stdout stays clean for the parent shell.
    let mut token_sink = std::io::stderr();
    let generated = match api::generate(
        &config.url,
        &config.model,
        messages,
        config.num_gpu,
        &mut token_sink,
    )
    .await
    {
        Ok(text) => text,
        Err(e) => {
            match api::diagnostic_hint(&e, &config.model) {
                Some(hint) => eprintln!("{hint}"),
                None => eprintln!("Ollama error: {e}"),
            }
            std::process::exit(1);
        }
    };

    let command = strip_markdown(&generated);
    if command.is_empty() {
        eprintln!("model produced no command");
        std::process::exit(1);
    }

    // The output path is written on the single accepted branch only; on
    // cancellation the parent shell finds the tmpfile untouched.
    let decision = review(&command, !args.no_color);
    if let Err(e) = write_accepted(&decision, &args.output) {
        eprintln!("error: cannot write {}: {e}", args.output.display());
        std::process::exit(1);
    }
}

// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, parse arguments, hand over to `ui::run`.
// - Any error is printed once here and turned into a non-zero exit.

use clap::Parser;
use mi_cli::{cli::Cli, ui::{run, TerminalPrompt}};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli, &mut TerminalPrompt) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

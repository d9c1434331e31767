use std::process::ExitCode;

use clap::Parser;

mod args;
mod cmd;
mod io;
mod output;

fn init_tracing(cli: &args::Cli) {
    // Off unless --verbose; RUST_LOG is only consulted in verbose mode so it
    // never mixes log lines into normal output.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::new("off")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = args::Cli::parse();
    init_tracing(&cli);

    match cmd::dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

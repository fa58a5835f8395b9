mod app;
mod domain;
mod infra;
mod util;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::app::Cli;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so that reports on stdout stay machine-readable.
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = app::run(&cli) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

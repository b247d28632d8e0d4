mod cli;
mod config;
mod error;
mod hash;
mod hash_cmd;
mod osdb;
mod reader;
mod report;
mod scan;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Command};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match &cli.command {
        Command::Hash(args) => hash_cmd::run(args, &config)?,
        Command::Scan(args) => scan::run(args, &config)?,
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only hashes.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

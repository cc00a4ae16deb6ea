//! # slo
//!
//! Command-line entry point for SAML Single Logout.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![allow(clippy::uninlined_format_args)]

use clap::Parser;
use slo_cli::{
    cli::{Cli, Command},
    commands::{run_check, run_decode, run_logout},
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Command::Logout(args) => run_logout(&args, cli.output),
        Command::Check { settings } => run_check(&settings, cli.output),
        Command::Decode { url, cert } => run_decode(&url, cert.as_deref(), cli.output),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}

//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::output::OutputFormat;

/// SAML Single Logout tool - build and inspect HTTP-Redirect LogoutRequests.
#[derive(Debug, Parser)]
#[command(name = "slo")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a LogoutRequest redirect URL.
    Logout(LogoutArgs),

    /// Validate a settings file.
    Check {
        /// Settings file (TOML).
        #[arg(short, long, env = "SLO_SETTINGS")]
        settings: PathBuf,
    },

    /// Decode a LogoutRequest redirect URL.
    Decode {
        /// The redirect URL.
        url: String,

        /// Certificate (PEM) to verify the signature with.
        #[arg(long)]
        cert: Option<PathBuf>,
    },
}

/// Arguments of the `logout` command.
#[derive(Debug, Args)]
pub struct LogoutArgs {
    /// Settings file (TOML).
    #[arg(short, long, env = "SLO_SETTINGS")]
    pub settings: PathBuf,

    /// RelayState to round-trip through the IdP.
    #[arg(long)]
    pub relay_state: Option<String>,

    /// Session index to terminate.
    #[arg(long)]
    pub session_index: Option<String>,

    /// Name identifier value (overrides settings).
    #[arg(long)]
    pub name_id: Option<String>,

    /// Extra query parameter, `key=value` or `key` for an empty value.
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Print the individual parameters instead of the URL.
    #[arg(long)]
    pub params_only: bool,
}

/// Splits a `--param` argument into key and optional value.
pub fn parse_param(arg: &str) -> crate::CliResult<(String, Option<String>)> {
    let (key, value) = match arg.split_once('=') {
        Some((key, value)) => (key, Some(value.to_string())),
        None => (arg, None),
    };

    if key.is_empty() {
        return Err(crate::CliError::InvalidArgument(format!(
            "parameter '{arg}' has no name"
        )));
    }

    Ok((key.to_string(), value))
}

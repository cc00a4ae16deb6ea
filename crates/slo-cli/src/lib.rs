//! # slo-cli
//!
//! Command-line tool for SAML Single Logout.
//!
//! This crate provides command-line utilities for:
//! - Building signed or unsigned LogoutRequest redirect URLs from a settings file
//! - Validating settings before deployment
//! - Decoding and verifying redirect URLs

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};

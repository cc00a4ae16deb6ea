//! # slo-core
//!
//! Settings and configuration errors for SAML single logout.
//!
//! [`Settings`] describes the Identity Provider, the subject being logged out
//! and the signing policy. [`Settings::validate`] is the setup-time check;
//! the request path assumes settings that passed it.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;

pub use config::{SecuritySettings, Settings};
pub use error::{Error, Result};

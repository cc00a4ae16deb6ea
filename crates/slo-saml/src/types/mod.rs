//! SAML 2.0 types and data structures.
//!
//! The LogoutRequest message, name identifiers and protocol constants.

mod constants;
mod logout;
mod name_id;

pub use constants::*;
pub use logout::*;
pub use name_id::NameId;

//! End-to-End Integration Tests
//!
//! These tests drive the public logout API from settings to redirect URL and
//! decode the result the way an Identity Provider would.

mod common;
mod logout_request;
mod signing;

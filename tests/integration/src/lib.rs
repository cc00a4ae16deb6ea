//! Integration tests for the SAML single logout crates live under `tests/`.

//! Message identifier generation.
//!
//! SAML `ID` attributes are typed `xs:ID`, which must not start with a digit.
//! Identifiers here are a random (v4) UUID behind a leading underscore, giving
//! 122 bits of randomness per identifier.

use std::sync::atomic::{AtomicU64, Ordering};

/// Source of unique message identifiers.
///
/// Injected into the message builder so tests can supply deterministic IDs.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier that is a valid `xs:ID`.
    fn new_id(&self) -> String;
}

/// Random UUID based identifiers, e.g. `_0f8fad5b-d9cb-469f-a165-70867728950e`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn new_id(&self) -> String {
        generate_id()
    }
}

/// Predictable identifiers for tests: `{prefix}{n}` with `n` counting from 1.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator. The prefix must itself start with a letter or `_`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// Generates a random message identifier.
#[must_use]
pub fn generate_id() -> String {
    format!("_{}", uuid::Uuid::new_v4())
}

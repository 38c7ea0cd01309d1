//! ID generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// ID generator for entities and anonymous voter tokens.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new lowercase ULID, used as primary key for every table.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an opaque token for an anonymous voter cookie.
    #[must_use]
    pub fn voter_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

//! User entity and related types

use chrono::{DateTime, Utc};

/// A user record in the directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier, assigned by the persistence layer
    id: i64,
    /// Display name, unique across the directory
    username: String,
    /// Age in years, within [0, 120]
    age: i64,
    /// Creation timestamp in UTC
    created_at: DateTime<Utc>,
}

impl User {
    /// Reconstruct a user from already-persisted values
    pub fn new(id: i64, username: impl Into<String>, age: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            username: username.into(),
            age,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn age(&self) -> i64 {
        self.age
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Validated input for creating a user
///
/// Produced by the service layer after sanitization and validation; the
/// repository assigns the id and creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub age: i64,
}

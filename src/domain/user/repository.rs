//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{NewUser, User};
use crate::domain::DomainError;

/// Window and filter for listing users
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
    /// Case-sensitive substring match on the username
    pub keyword: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of users plus the total match count
///
/// `total` counts every user matching the keyword filter, independent of the
/// limit/offset window.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: i64,
}

/// Repository trait for user storage
///
/// The store's own uniqueness enforcement is the authoritative guard against
/// duplicate usernames; any existence pre-check made by callers is a UX
/// optimization only and is inherently racy.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Persist a new user, assigning its id and creation timestamp
    ///
    /// Ids are monotonically increasing and never reused. A duplicate
    /// username surfaces as `DomainError::Conflict`, detected by the
    /// underlying unique constraint rather than a prior lookup.
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError>;

    /// Get a user by id
    async fn get(&self, id: i64) -> Result<Option<User>, DomainError>;

    /// List users in insertion order (ascending id)
    async fn list(&self, query: &UserQuery) -> Result<UserPage, DomainError>;

    /// Check whether a username is taken (exact, case-sensitive match)
    async fn exists_by_username(&self, username: &str) -> Result<bool, DomainError>;

    /// Delete every user, returning the number removed
    ///
    /// Previously assigned ids are not reused afterwards.
    async fn delete_all(&self) -> Result<u64, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Repository whose every operation fails with a storage error
    ///
    /// Used to exercise the fail-safe paths: an erroring existence check
    /// must be treated as "username taken", and a failing write must map to
    /// a database error classification.
    #[derive(Debug, Default)]
    pub struct FailingUserRepository;

    impl FailingUserRepository {
        pub fn new() -> Self {
            Self
        }
    }

    #[async_trait]
    impl UserRepository for FailingUserRepository {
        async fn create(&self, _new_user: NewUser) -> Result<User, DomainError> {
            Err(DomainError::storage("simulated storage failure"))
        }

        async fn get(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Err(DomainError::storage("simulated storage failure"))
        }

        async fn list(&self, _query: &UserQuery) -> Result<UserPage, DomainError> {
            Err(DomainError::storage("simulated storage failure"))
        }

        async fn exists_by_username(&self, _username: &str) -> Result<bool, DomainError> {
            Err(DomainError::storage("simulated storage failure"))
        }

        async fn delete_all(&self) -> Result<u64, DomainError> {
            Err(DomainError::storage("simulated storage failure"))
        }
    }
}

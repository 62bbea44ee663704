//! User service - sanitization, validation and persistence orchestration

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::domain::user::{
    sanitize_user_data, validate_age, validate_username, NewUser, User, UserQuery,
    UserRepository,
};
use crate::domain::DomainError;

/// Default page size for listing users
pub const DEFAULT_LIMIT: i64 = 10;
/// Upper bound the requested page size is clamped to
pub const MAX_LIMIT: i64 = 100;

/// Raw input for creating a user, as it arrives from the request body
///
/// `age` stays a JSON value so that both a number and a numeric string are
/// accepted; the sanitizer performs the coercion.
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub username: Option<String>,
    pub age: Option<Value>,
}

/// Raw listing parameters before clamping
#[derive(Debug, Clone, Default)]
pub struct ListUsersInput {
    pub keyword: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// A listing result together with the effective (clamped) window
#[derive(Debug, Clone)]
pub struct UserListing {
    pub users: Vec<User>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Service coordinating validation and the user repository
#[derive(Debug)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a user from raw input
    ///
    /// Flow: sanitize -> validate (including the existence pre-check) ->
    /// persist. The pre-check is racy by nature and exists only for a
    /// friendly error message; the repository's unique constraint is the
    /// authoritative guard and still reports `Conflict` when two creations
    /// race past the check.
    pub async fn create_user(&self, input: CreateUserInput) -> Result<User, DomainError> {
        let data = sanitize_user_data(input.username.as_deref(), input.age.as_ref());

        let mut errors = BTreeMap::new();
        let mut taken = false;

        match validate_username(&data.username) {
            Err(err) => {
                errors.insert("username".to_string(), err.to_string());
            }
            // Existence is only consulted for a well-formed username, so a
            // field never carries both a format and a duplicate error.
            Ok(()) => {
                taken = self.username_taken(&data.username).await;
                if taken {
                    errors.insert(
                        "username".to_string(),
                        "username is already taken".to_string(),
                    );
                }
            }
        }

        let age = match validate_age(input.age.as_ref()) {
            Ok(age) => Some(age),
            Err(err) => {
                errors.insert("age".to_string(), err.to_string());
                None
            }
        };

        // An otherwise-valid record whose only problem is a taken username
        // gets the same conflict classification the repository constraint
        // would produce, so sequential and racing duplicates look alike to
        // the client.
        if taken && age.is_some() && errors.len() == 1 {
            return Err(DomainError::conflict(format!(
                "username '{}' is already taken",
                data.username
            )));
        }

        match (errors.is_empty(), age) {
            (true, Some(age)) => {
                self.repository
                    .create(NewUser {
                        username: data.username,
                        age,
                    })
                    .await
            }
            _ => Err(DomainError::validation("user data failed validation", errors)),
        }
    }

    /// List users with clamped pagination
    ///
    /// `limit` is clamped to [1, 100] (default 10), `offset` to >= 0. A
    /// blank keyword is treated as no filter.
    pub async fn list_users(&self, input: ListUsersInput) -> Result<UserListing, DomainError> {
        let limit = input.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = input.offset.unwrap_or(0).max(0);
        let keyword = input
            .keyword
            .map(|keyword| keyword.trim().to_string())
            .filter(|keyword| !keyword.is_empty());

        let page = self
            .repository
            .list(&UserQuery {
                keyword,
                limit,
                offset,
            })
            .await?;

        Ok(UserListing {
            users: page.users,
            total: page.total,
            limit,
            offset,
        })
    }

    /// Get a user by id
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        self.repository.get(id).await
    }

    /// Delete every user, returning the number removed
    ///
    /// Used by the seeding tooling; not exposed over HTTP.
    pub async fn clear_users(&self) -> Result<u64, DomainError> {
        self.repository.delete_all().await
    }

    /// Check whether a username is taken, failing safe
    ///
    /// If the lookup itself errors, the username is reported as taken: a
    /// falsely rejected caller can retry, a duplicate slipping through
    /// cannot be taken back.
    async fn username_taken(&self, username: &str) -> bool {
        match self.repository.exists_by_username(username).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(error = %err, username, "username existence check failed, treating as taken");
                true
            }
        }
    }
}

//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::UserRepository;
use crate::domain::{DomainError, User};
use crate::infrastructure::user::{CreateUserInput, ListUsersInput, UserListing, UserService};

/// Application state injected into handlers
///
/// Handlers only see the service trait object, so the concrete repository
/// (SQLite in production, in-memory in tests) is a wiring decision made at
/// bootstrap rather than global state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create_user(&self, input: CreateUserInput) -> Result<User, DomainError>;
    async fn list_users(&self, input: ListUsersInput) -> Result<UserListing, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn clear_users(&self) -> Result<u64, DomainError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn create_user(&self, input: CreateUserInput) -> Result<User, DomainError> {
        UserService::create_user(self, input).await
    }

    async fn list_users(&self, input: ListUsersInput) -> Result<UserListing, DomainError> {
        UserService::list_users(self, input).await
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        UserService::get_user(self, id).await
    }

    async fn clear_users(&self) -> Result<u64, DomainError> {
        UserService::clear_users(self).await
    }
}

//! User infrastructure - repositories and the orchestration service

mod in_memory_repository;
mod service;
mod sqlite_repository;

pub use in_memory_repository::InMemoryUserRepository;
pub use service::{
    CreateUserInput, ListUsersInput, UserListing, UserService, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use sqlite_repository::SqliteUserRepository;

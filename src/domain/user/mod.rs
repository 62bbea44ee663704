//! User domain
//!
//! Entity, validation/sanitization rules and the repository trait for user
//! records.

mod entity;
mod repository;
mod validation;

pub use entity::{NewUser, User};
pub use repository::{UserPage, UserQuery, UserRepository};
pub use validation::{
    parse_age, sanitize_user_data, validate_age, validate_username, SanitizedUserData,
    UserValidationError, MAX_AGE, MAX_USERNAME_LENGTH, MIN_AGE, MIN_USERNAME_LENGTH,
};

#[cfg(test)]
pub use repository::mock::FailingUserRepository;

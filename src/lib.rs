//! User Directory API
//!
//! A minimal user-directory web service: validated creation, listing and
//! retrieval of user records over a JSON HTTP API. The interesting part is
//! the validation + persistence contract: field-level validation with
//! structured errors, a racy-but-friendly existence pre-check, and the
//! storage layer's unique constraint as the authoritative duplicate guard.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::AppState;
use infrastructure::user::{SqliteUserRepository, UserService};

/// Build the application state from configuration
///
/// Opens (and if necessary creates) the SQLite database, initializes the
/// schema and wires the repository into the user service. The repository
/// handle is injected into handlers through [`AppState`] rather than held
/// as process-global state.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let repository = Arc::new(SqliteUserRepository::connect(&config.database.url).await?);
    let user_service = Arc::new(UserService::new(repository));

    Ok(AppState::new(user_service))
}

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::state::AppState;
use super::types::ApiError;
use super::users;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_router())
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            post(users::create_user)
                .get(users::list_users)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/{id}",
            get(users::get_user).fallback(method_not_allowed),
        )
}

/// Unknown route
async fn not_found() -> ApiError {
    ApiError::not_found("the requested resource does not exist")
}

/// Known route, unsupported method
async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}

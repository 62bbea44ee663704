//! User endpoints

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::User;
use crate::infrastructure::user::{CreateUserInput, ListUsersInput};

/// Request body for creating a user
///
/// `age` is kept as a raw JSON value because both `25` and `"25"` are
/// accepted; the sanitizer does the coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserApiRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub age: Option<Value>,
}

/// Query parameters for listing users
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListUsersParams {
    pub keyword: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// User representation in responses
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub age: i64,
    /// ISO-8601 UTC with a trailing `Z`
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id(),
            username: user.username().to_string(),
            age: user.age(),
            created_at: user
                .created_at()
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetUserResponse {
    pub user: UserResponse,
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserApiRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    debug!(username = ?request.username, "creating user");

    let user = state
        .user_service
        .create_user(CreateUserInput {
            username: request.username,
            age: request.age,
        })
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            message: "user created".to_string(),
            user: UserResponse::from(&user),
        }),
    ))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    params: Result<Query<ListUsersParams>, QueryRejection>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let Query(params) = params.map_err(|_| {
        ApiError::validation("query parameters could not be parsed", Default::default())
    })?;

    debug!(keyword = ?params.keyword, limit = ?params.limit, offset = ?params.offset, "listing users");

    let listing = state
        .user_service
        .list_users(ListUsersInput {
            keyword: params.keyword,
            limit: params.limit,
            offset: params.offset,
        })
        .await
        .map_err(ApiError::from)?;

    let pagination = Pagination {
        total: listing.total,
        limit: listing.limit,
        offset: listing.offset,
        has_next: listing.offset + listing.limit < listing.total,
        has_prev: listing.offset > 0,
    };

    Ok(Json(ListUsersResponse {
        users: listing.users.iter().map(UserResponse::from).collect(),
        pagination,
    }))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<GetUserResponse>, ApiError> {
    // A non-integer id segment is an unknown route, not a bad request
    let Path(id) = id.map_err(|_| ApiError::not_found("the requested resource does not exist"))?;

    debug!(user_id = id, "getting user");

    let user = state
        .user_service
        .get_user(id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::not_found("user does not exist").with_detail("user_id", Value::from(id))
        })?;

    Ok(Json(GetUserResponse {
        user: UserResponse::from(&user),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::api::router::create_router;
    use crate::api::state::AppState;
    use crate::infrastructure::user::{InMemoryUserRepository, UserService};

    fn app() -> Router {
        let repository = Arc::new(InMemoryUserRepository::new());
        let state = AppState::new(Arc::new(UserService::new(repository)));
        create_router(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_user(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_create_user_returns_201_with_record() {
        let app = app();

        let (status, body) =
            send(&app, post_user(json!({"username": "alice_01", "age": 25}))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "user created");
        assert_eq!(body["user"]["id"], 1);
        assert_eq!(body["user"]["username"], "alice_01");
        assert_eq!(body["user"]["age"], 25);

        let created_at = body["user"]["created_at"].as_str().unwrap();
        assert!(created_at.ends_with('Z'), "expected UTC Z suffix: {created_at}");
        assert!(created_at.contains('T'));
    }

    #[tokio::test]
    async fn test_create_user_accepts_string_age() {
        let app = app();

        let (status, body) =
            send(&app, post_user(json!({"username": "bob_2024", "age": "30"}))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["age"], 30);
    }

    #[tokio::test]
    async fn test_create_user_short_username_rejected() {
        let app = app();

        let (status, body) = send(&app, post_user(json!({"username": "ab", "age": 25}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert!(body["details"]["username"].is_string());
        assert!(body["details"].get("age").is_none());
    }

    #[tokio::test]
    async fn test_create_user_multiple_field_errors() {
        let app = app();

        let (status, body) =
            send(&app, post_user(json!({"username": "no spaces!", "age": "abc"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["username"].is_string());
        assert_eq!(body["details"]["age"], "age must be a valid integer");
    }

    #[tokio::test]
    async fn test_create_user_out_of_range_age() {
        let app = app();

        let (status, body) =
            send(&app, post_user(json!({"username": "old_timer", "age": 121}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["age"], "age must not exceed 120");
    }

    #[tokio::test]
    async fn test_duplicate_create_conflicts() {
        let app = app();

        let (status, _) = send(&app, post_user(json!({"username": "alice_01", "age": 25}))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            send(&app, post_user(json!({"username": "alice_01", "age": 25}))).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "conflict");
        assert!(body["details"]["username"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_validation_error() {
        let app = app();

        let request = Request::builder()
            .method("POST")
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_list_users_pagination_clamping() {
        let app = app();
        for i in 0..3 {
            send(&app, post_user(json!({"username": format!("user_{i}"), "age": 20}))).await;
        }

        let (status, body) = send(&app, get("/api/users?limit=200&offset=-5")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["limit"], 100);
        assert_eq!(body["pagination"]["offset"], 0);
        assert_eq!(body["pagination"]["total"], 3);
        assert_eq!(body["pagination"]["has_next"], false);
        assert_eq!(body["pagination"]["has_prev"], false);
    }

    #[tokio::test]
    async fn test_list_users_window_and_flags() {
        let app = app();
        for i in 0..5 {
            send(&app, post_user(json!({"username": format!("user_{i}"), "age": 20}))).await;
        }

        let (status, body) = send(&app, get("/api/users?limit=2&offset=2")).await;

        assert_eq!(status, StatusCode::OK);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["username"], "user_2");
        assert_eq!(body["pagination"]["total"], 5);
        assert_eq!(body["pagination"]["has_next"], true);
        assert_eq!(body["pagination"]["has_prev"], true);
    }

    #[tokio::test]
    async fn test_list_users_keyword_filter() {
        let app = app();
        for name in ["alice_chen", "bob_wang", "malice"] {
            send(&app, post_user(json!({"username": name, "age": 20}))).await;
        }

        let (status, body) = send(&app, get("/api/users?keyword=ali")).await;

        assert_eq!(status, StatusCode::OK);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let app = app();
        send(&app, post_user(json!({"username": "alice_01", "age": 25}))).await;

        let (status, body) = send(&app, get("/api/users/1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "alice_01");
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_404_with_id_detail() {
        let app = app();

        let (status, body) = send(&app, get("/api/users/999999")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["details"]["user_id"], 999999);
    }

    #[tokio::test]
    async fn test_get_non_integer_id_is_404() {
        let app = app();

        let (status, body) = send(&app, get("/api/users/abc")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = app();

        let (status, body) = send(&app, get("/api/unknown")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_unsupported_method_is_405() {
        let app = app();

        let request = Request::builder()
            .method("DELETE")
            .uri("/api/users")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, request).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "method_not_allowed");
    }
}

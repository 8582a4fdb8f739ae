// User accounts: signup and login against the user store, with session state
// written through tower-sessions on a successful login.

pub mod handlers;
pub mod models;
pub mod password;
pub mod service;
pub mod store;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::users::store::StoreError;

/// Auth failures. Every variant renders as `{ "success": false, "message": .. }`
/// and never carries internal detail to the client.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("User already exists")]
    AlreadyExists,

    #[error("User store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => AuthError::AlreadyExists,
            StoreError::Database(
                e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)),
            ) => AuthError::Unavailable(e.to_string()),
            StoreError::Database(e) => AuthError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::AlreadyExists => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::Unavailable(cause) => {
                tracing::error!("User store unavailable: {cause}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            AuthError::Internal(cause) => {
                tracing::error!("Auth error: {cause}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

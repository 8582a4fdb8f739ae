use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored account. `password_hash` is an Argon2id PHC string.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    /// Free-form signup fields beyond email and password.
    pub profile: Value,
    pub created_at: DateTime<Utc>,
}

/// The part of a user that may leave the server or sit in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub profile: Value,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            profile: user.profile,
            created_at: user.created_at,
        }
    }
}

/// Insert payload handed to the store once the password is hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub profile: Value,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Stored in the session under [`SESSION_KEY`] after a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub logged_in: bool,
    pub user: PublicUser,
}

pub const SESSION_KEY: &str = "auth";

/// Lower-cases and trims an email so lookups and the unique index agree.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

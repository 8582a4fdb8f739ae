//! Signup and login.
//!
//! Flow: Anonymous → signup → Registered → login → Authenticated (session set
//! by the handler). Passwords are only ever stored as Argon2id hashes.

use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::users::models::{normalize_email, NewUser, PublicUser, SignupRequest};
use crate::users::password::{dummy_hash, hash_password, verify_password};
use crate::users::store::UserStore;
use crate::users::AuthError;

/// Registers a new account and returns its id.
pub async fn signup(store: &dyn UserStore, request: SignupRequest) -> Result<Uuid, AuthError> {
    let email = request
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AuthError::Validation("Email is required".to_string()))?;
    let password = request
        .password
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AuthError::Validation("Password is required".to_string()))?;

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))?;

    let user = store
        .insert(NewUser {
            email,
            password_hash,
            profile: Value::Object(without_secrets(request.profile)),
        })
        .await?;

    info!(user_id = %user.id, "User registered");
    Ok(user.id)
}

/// Drops password-like fields (`confirmPassword`, `password_confirmation`, ..)
/// so the profile never holds a raw secret.
fn without_secrets(mut profile: Map<String, Value>) -> Map<String, Value> {
    profile.retain(|key, _| !key.to_lowercase().contains("password"));
    profile
}

/// Checks credentials. `Ok(None)` covers both an unknown email and a wrong
/// password; the two cases take the same work and look the same to callers.
pub async fn login(
    store: &dyn UserStore,
    email: &str,
    password: &str,
) -> Result<Option<PublicUser>, AuthError> {
    let user = store.find_by_email(&normalize_email(email)).await?;

    let hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => dummy_hash()
            .map_err(|e| AuthError::Internal(format!("failed to build dummy hash: {e}")))?
            .to_string(),
    };
    let password = password.to_string();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {e}")))?
        .map_err(|e| AuthError::Internal(format!("stored password hash is invalid: {e}")))?;

    match user {
        Some(user) if matches => {
            info!(user_id = %user.id, "User logged in");
            Ok(Some(user.into()))
        }
        _ => Ok(None),
    }
}

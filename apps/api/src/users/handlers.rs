use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tower_sessions::Session;

use crate::state::AppState;
use crate::users::models::{
    LoginRequest, LoginResponse, SessionState, SignupRequest, SignupResponse, SESSION_KEY,
};
use crate::users::service;
use crate::users::AuthError;

/// POST /signup
pub async fn handle_signup(
    State(state): State<AppState>,
    request: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), AuthError> {
    let Json(request) = request.map_err(invalid_body)?;
    let user_id = service::signup(state.users.as_ref(), request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            success: true,
            message: "Registration Successful".to_string(),
            user_id,
        }),
    ))
}

/// POST /login
///
/// A bad email or password is a 200 with `success: false`; only infrastructure
/// problems produce an error status.
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let Json(request) = request.map_err(invalid_body)?;
    let Some(user) = service::login(state.users.as_ref(), &request.email, &request.password).await?
    else {
        return Ok(Json(LoginResponse {
            success: false,
            user: None,
            message: Some("Incorrect email or password".to_string()),
        }));
    };

    // Fresh session id for the authenticated user.
    session
        .cycle_id()
        .await
        .map_err(|e| AuthError::Internal(format!("failed to rotate session: {e}")))?;
    session
        .insert(
            SESSION_KEY,
            SessionState {
                logged_in: true,
                user: user.clone(),
            },
        )
        .await
        .map_err(|e| AuthError::Internal(format!("failed to write session: {e}")))?;

    Ok(Json(LoginResponse {
        success: true,
        user: Some(user),
        message: None,
    }))
}

fn invalid_body(rejection: JsonRejection) -> AuthError {
    AuthError::Validation(format!("Invalid request body: {}", rejection.body_text()))
}

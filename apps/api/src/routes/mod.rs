pub mod health;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tower_sessions::SessionStore;

use crate::analysis::handlers::handle_upload;
use crate::config::Config;
use crate::session::session_layer;
use crate::state::AppState;
use crate::users::handlers::{handle_login, handle_signup};

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/signup", post(handle_signup))
        .route("/login", post(handle_login))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

/// The full service: routes plus session, trace and CORS layers.
pub fn build_app<S: SessionStore + Clone>(state: AppState, session_store: S) -> Result<Router> {
    let config = state.config.clone();
    with_layers(build_router(state), &config, session_store)
}

fn with_layers<S: SessionStore + Clone>(
    router: Router,
    config: &Config,
    session_store: S,
) -> Result<Router> {
    let sessions = session_layer(session_store, config)?;

    Ok(router
        .layer(sessions)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}

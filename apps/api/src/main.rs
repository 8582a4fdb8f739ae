mod analysis;
mod config;
mod db;
mod extract;
mod llm_client;
mod routes;
mod session;
mod state;
mod users;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, DEFAULT_SESSION_SECRET};
use crate::db::create_pool;
use crate::extract::PdfTextExtractor;
use crate::llm_client::GeminiClient;
use crate::routes::build_app;
use crate::state::AppState;
use crate::users::store::PgUserStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));
    if config.session_secret == DEFAULT_SESSION_SECRET {
        warn!("SESSION_SECRET is not set; using the built-in development secret");
    }

    // Initialize PostgreSQL (users + sessions)
    let db = create_pool(&config.database_url)
        .await
        .context("Database connection error")?;
    let users = PgUserStore::new(db.clone());
    users.ensure_schema().await?;
    let session_store = PostgresStore::new(db.clone());
    session_store.migrate().await?;
    info!("Session store ready");

    // Initialize LLM client
    let analyzer = GeminiClient::new(
        config.google_api_key.clone(),
        config.gemini_api_base.clone(),
        Duration::from_secs(config.analysis_timeout_secs),
    )?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", config.upload_dir.display()))?;

    // Build app state
    let state = AppState {
        config: Arc::new(config.clone()),
        extractor: Arc::new(PdfTextExtractor),
        analyzer: Arc::new(analyzer),
        users: Arc::new(users),
    };

    let app = build_app(state, session_store)?;

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Server running at http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting graceful shutdown..."),
    }
}

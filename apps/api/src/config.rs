use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_SESSION_SECRET: &str = "this12session#";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub google_api_key: String,
    pub gemini_api_base: String,
    pub analysis_timeout_secs: u64,
    pub session_secret: String,
    pub session_max_age_ms: u64,
    pub production: bool,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_secret = std::env::var("SESSION_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_SECRET.to_string());

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            google_api_key: require_env("GOOGLE_API_KEY")?,
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.to_string()),
            analysis_timeout_secs: parse_env("ANALYSIS_TIMEOUT_SECS", 120)?,
            session_secret,
            session_max_age_ms: parse_env("SESSION_MAX_AGE_MS", 600_000)?,
            production: std::env::var("APP_ENV")
                .map(|env| env.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string())
                .into(),
            static_dir: std::env::var("STATIC_DIR")
                .unwrap_or_else(|_| "public".to_string())
                .into(),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 3001)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

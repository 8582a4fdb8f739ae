use std::sync::Arc;

use crate::config::Config;
use crate::extract::TextExtractor;
use crate::llm_client::Analyzer;
use crate::users::store::UserStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Built once in `main` before the listener starts; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// PDF → text. Default: `PdfTextExtractor`.
    pub extractor: Arc<dyn TextExtractor>,
    /// Prompt → analysis text. Default: `GeminiClient`.
    pub analyzer: Arc<dyn Analyzer>,
    pub users: Arc<dyn UserStore>,
}

// Resume analysis: multipart upload → PDF text → ATS prompt → Gemini → JSON.
// All model calls go through llm_client::Analyzer.

pub mod handlers;
pub mod prompts;
pub mod upload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;

pub const MISSING_INPUT_MESSAGE: &str = "Missing resume file or job description";
pub const ANALYSIS_FAILED_MESSAGE: &str = "Failed to analyze resume";

/// One resume / job description pair, alive for a single request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub resume: Bytes,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub response: String,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("missing resume file or job description")]
    MissingInput,

    #[error("upload exceeds the configured size limit")]
    TooLarge,

    #[error("failed to read uploaded resume: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to extract resume text: {0}")]
    Extraction(#[from] ExtractError),
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AnalysisError::MissingInput => (StatusCode::BAD_REQUEST, MISSING_INPUT_MESSAGE),
            AnalysisError::TooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "Resume file is too large"),
            AnalysisError::Io(_) | AnalysisError::Extraction(_) => {
                tracing::error!("Error processing resume: {self}");
                (StatusCode::INTERNAL_SERVER_ERROR, ANALYSIS_FAILED_MESSAGE)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

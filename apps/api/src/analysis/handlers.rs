//! Axum route handler for the resume analysis API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::{info, warn};

use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::upload::{read_upload_form, TempResume};
use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResult};
use crate::state::AppState;

/// POST /upload
///
/// Multipart `resume` (PDF) + `jd` (text) → `{ "response": <analysis> }`.
/// The uploaded file is removed before the response leaves, whatever the outcome.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AnalysisError> {
    let multipart = multipart.map_err(|rejection| {
        warn!("Rejected non-multipart upload: {}", rejection.body_text());
        AnalysisError::MissingInput
    })?;
    let form = read_upload_form(&state.config.upload_dir, multipart).await?;
    let (resume, job_description) = form.into_parts()?;

    let result = analyze_upload(&state, &resume, job_description).await;
    resume.remove();

    result.map(Json)
}

async fn analyze_upload(
    state: &AppState,
    resume: &TempResume,
    job_description: String,
) -> Result<AnalysisResult, AnalysisError> {
    let request = AnalysisRequest {
        resume: resume.read().await?,
        job_description,
    };
    info!(
        resume_bytes = resume.size(),
        jd_chars = request.job_description.chars().count(),
        "Analyzing resume"
    );

    let resume_text = state.extractor.extract(request.resume).await?;
    let prompt = build_analysis_prompt(&resume_text, &request.job_description);
    let response = state.analyzer.analyze(&prompt).await;

    Ok(AnalysisResult { response })
}

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assistant::SeedRequest;
use crate::cv::{normalize_value, CvDocument, CvFragment};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub output: String,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub free_text: String,
}

#[derive(Deserialize)]
pub struct ImproveRequest {
    pub current_cv: Value,
    #[serde(default)]
    pub job_text: Option<String>,
}

/// POST /api/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let output = state.generator.generate(&req.prompt).await?;
    let output = if output.is_empty() {
        "[empty]".to_string()
    } else {
        output
    };
    Ok(Json(GenerateResponse { output }))
}

/// POST /api/extract-cv
/// Returns the fragment only; merging is the caller's decision.
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<Json<CvFragment>, AppError> {
    let fragment = state.extractor.extract(&req.free_text).await?;
    Ok(Json(fragment))
}

/// POST /api/improve-cv
/// The improved document is a suggestion and is not applied.
pub async fn handle_improve(
    State(state): State<AppState>,
    Json(req): Json<ImproveRequest>,
) -> Result<Json<CvDocument>, AppError> {
    let current = normalize_value(&req.current_cv);
    let improved = state
        .extractor
        .improve(&current, req.job_text.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(improved))
}

/// POST /api/seed-cv
pub async fn handle_seed(
    State(state): State<AppState>,
    Json(req): Json<SeedRequest>,
) -> Result<Json<CvDocument>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }
    let seeded = state.extractor.seed(&req).await?;
    Ok(Json(seeded))
}

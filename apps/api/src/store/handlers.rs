use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::cv::{normalize_value, title_of, CvDocument};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::CvRecord;

#[derive(Deserialize)]
pub struct CreateCvRequest {
    #[serde(default)]
    pub title: Option<String>,
    /// Any JSON; normalized before it is stored. Absent means an empty CV.
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Deserialize)]
pub struct RenameCvRequest {
    pub title: String,
}

/// GET /api/v1/cvs
pub async fn handle_list_cvs(State(state): State<AppState>) -> Json<Vec<CvRecord>> {
    let session = state.session.lock().await;
    Json(session.store().list())
}

/// POST /api/v1/cvs
/// Creates a record and makes it the working document.
pub async fn handle_create_cv(
    State(state): State<AppState>,
    Json(req): Json<CreateCvRequest>,
) -> Result<(StatusCode, Json<CvRecord>), AppError> {
    let data = req
        .data
        .as_ref()
        .map(normalize_value)
        .unwrap_or_default();
    let title = req.title.unwrap_or_else(|| title_of(&data));
    let record = state.session.lock().await.new_document(&title, data)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /api/v1/cvs
pub async fn handle_clear_cvs(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.session.lock().await.clear_store()?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/cvs/current
pub async fn handle_current_cv(State(state): State<AppState>) -> Json<Option<CvRecord>> {
    let session = state.session.lock().await;
    Json(session.store().current().cloned())
}

/// GET /api/v1/cvs/:id
/// Loading a CV also opens it for editing.
pub async fn handle_load_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CvDocument>, AppError> {
    let mut session = state.session.lock().await;
    let data = session
        .open(&id)?
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("CV {id} not found")))?;
    Ok(Json(data))
}

/// PATCH /api/v1/cvs/:id
pub async fn handle_rename_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameCvRequest>,
) -> Result<StatusCode, AppError> {
    state.session.lock().await.rename(&id, &req.title)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cvs/:id
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.session.lock().await.delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/cvs/:id/select
pub async fn handle_select_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.session.lock().await.select(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::cv::editing::{
    add_entry, apply_basics, draft_for, remove_entry, set_contacts, set_skills, update_entry,
    BasicsPatch, ContactsForm, Section, SectionDraft,
};
use crate::cv::preview::render_markdown;
use crate::cv::{normalize_value, CvDocument, CvFragment};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SkillsForm {
    /// Comma separated.
    pub skills: String,
}

/// GET /api/v1/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<CvDocument> {
    Json(state.session.lock().await.document().clone())
}

/// PUT /api/v1/document
/// Replaces the working document wholesale; the body is normalized first.
pub async fn handle_replace_document(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<CvDocument>, AppError> {
    let doc = normalize_value(&body);
    let mut session = state.session.lock().await;
    Ok(Json(session.replace_document(doc)?.clone()))
}

/// POST /api/v1/document/merge
pub async fn handle_merge(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<CvDocument>, AppError> {
    let fragment = CvFragment::from_value(&body);
    let mut session = state.session.lock().await;
    Ok(Json(session.apply_fragment(fragment)?.clone()))
}

/// PATCH /api/v1/document/basics
pub async fn handle_patch_basics(
    State(state): State<AppState>,
    Json(patch): Json<BasicsPatch>,
) -> Result<Json<CvDocument>, AppError> {
    let mut session = state.session.lock().await;
    let doc = session.edit(|doc| {
        apply_basics(doc, patch);
        Ok::<(), AppError>(())
    })?;
    Ok(Json(doc.clone()))
}

/// PUT /api/v1/document/contacts
pub async fn handle_set_contacts(
    State(state): State<AppState>,
    Json(form): Json<ContactsForm>,
) -> Result<Json<CvDocument>, AppError> {
    let mut session = state.session.lock().await;
    let doc = session.edit(|doc| {
        set_contacts(doc, form);
        Ok::<(), AppError>(())
    })?;
    Ok(Json(doc.clone()))
}

/// PUT /api/v1/document/skills
pub async fn handle_set_skills(
    State(state): State<AppState>,
    Json(form): Json<SkillsForm>,
) -> Result<Json<CvDocument>, AppError> {
    let mut session = state.session.lock().await;
    let doc = session.edit(|doc| {
        set_skills(doc, &form.skills);
        Ok::<(), AppError>(())
    })?;
    Ok(Json(doc.clone()))
}

/// POST /api/v1/document/:section
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(section): Path<Section>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<CvDocument>), AppError> {
    let draft = SectionDraft::from_json(section, body)?;
    let mut session = state.session.lock().await;
    let doc = session.edit(|doc| Ok::<(), AppError>(add_entry(doc, draft)?))?;
    Ok((StatusCode::CREATED, Json(doc.clone())))
}

/// GET /api/v1/document/:section/:index
/// The entry in form shape (bullets as lines, tech comma separated).
pub async fn handle_get_entry(
    State(state): State<AppState>,
    Path((section, index)): Path<(Section, usize)>,
) -> Result<Json<SectionDraft>, AppError> {
    let session = state.session.lock().await;
    Ok(Json(draft_for(session.document(), section, index)?))
}

/// PUT /api/v1/document/:section/:index
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((section, index)): Path<(Section, usize)>,
    Json(body): Json<Value>,
) -> Result<Json<CvDocument>, AppError> {
    let draft = SectionDraft::from_json(section, body)?;
    let mut session = state.session.lock().await;
    let doc = session.edit(|doc| Ok::<(), AppError>(update_entry(doc, index, draft)?))?;
    Ok(Json(doc.clone()))
}

/// DELETE /api/v1/document/:section/:index
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((section, index)): Path<(Section, usize)>,
) -> Result<Json<CvDocument>, AppError> {
    let mut session = state.session.lock().await;
    let doc = session.edit(|doc| Ok::<(), AppError>(remove_entry(doc, section, index)?))?;
    Ok(Json(doc.clone()))
}

/// GET /api/v1/document/preview
pub async fn handle_preview(State(state): State<AppState>) -> impl IntoResponse {
    let markdown = render_markdown(state.session.lock().await.document());
    (
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    )
}

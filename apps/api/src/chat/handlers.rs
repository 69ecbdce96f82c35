use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chat::{ChatMessage, Role};
use crate::cv::CvDocument;
use crate::errors::AppError;
use crate::state::AppState;

pub const FILLED_MESSAGE: &str =
    "✅ I’ve filled the form with what you told me. Review and edit on the right.";

#[derive(Deserialize)]
pub struct ChatTurnRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct ChatTurnResponse {
    pub document: CvDocument,
    pub messages: Vec<ChatMessage>,
    /// Set when extraction failed; the document is unchanged in that case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/v1/chat
pub async fn handle_chat_history(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    Json(state.session.lock().await.chat_messages().to_vec())
}

/// POST /api/v1/chat
/// One turn: record the user's text, extract, then merge or record the failure.
pub async fn handle_chat_turn(
    State(state): State<AppState>,
    Json(req): Json<ChatTurnRequest>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }

    state.session.lock().await.push_chat(Role::User, text)?;

    // Lock released while the assistant works
    let outcome = state.extractor.extract(text).await;

    let mut session = state.session.lock().await;
    let error = match outcome {
        Ok(fragment) => {
            session.apply_fragment(fragment)?;
            session.push_chat(Role::Assistant, FILLED_MESSAGE)?;
            info!("Chat turn merged into working CV");
            None
        }
        Err(e) => {
            let message = e.user_message();
            warn!("Chat extraction failed: {message}");
            session.push_chat(Role::Assistant, format!("⚠️ {message}"))?;
            Some(message)
        }
    };

    Ok(Json(ChatTurnResponse {
        document: session.document().clone(),
        messages: session.chat_messages().to_vec(),
        error,
    }))
}

/// DELETE /api/v1/chat
pub async fn handle_clear_chat(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.session.lock().await.clear_chat()?;
    Ok(StatusCode::NO_CONTENT)
}

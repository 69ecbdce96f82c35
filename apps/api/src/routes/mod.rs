pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::chat::handlers as chat;
use crate::cv::handlers as document;
use crate::state::AppState;
use crate::store::handlers as cvs;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Assistant helpers
        .route("/api/generate", post(assistant::handle_generate))
        .route("/api/extract-cv", post(assistant::handle_extract))
        .route("/api/improve-cv", post(assistant::handle_improve))
        .route("/api/seed-cv", post(assistant::handle_seed))
        // Saved CVs
        .route(
            "/api/v1/cvs",
            get(cvs::handle_list_cvs)
                .post(cvs::handle_create_cv)
                .delete(cvs::handle_clear_cvs),
        )
        .route("/api/v1/cvs/current", get(cvs::handle_current_cv))
        .route(
            "/api/v1/cvs/:id",
            get(cvs::handle_load_cv)
                .patch(cvs::handle_rename_cv)
                .delete(cvs::handle_delete_cv),
        )
        .route("/api/v1/cvs/:id/select", post(cvs::handle_select_cv))
        // Working document
        .route(
            "/api/v1/document",
            get(document::handle_get_document).put(document::handle_replace_document),
        )
        .route("/api/v1/document/merge", post(document::handle_merge))
        .route("/api/v1/document/basics", patch(document::handle_patch_basics))
        .route("/api/v1/document/contacts", put(document::handle_set_contacts))
        .route("/api/v1/document/skills", put(document::handle_set_skills))
        .route("/api/v1/document/preview", get(document::handle_preview))
        .route("/api/v1/document/:section", post(document::handle_add_entry))
        .route(
            "/api/v1/document/:section/:index",
            get(document::handle_get_entry)
                .put(document::handle_update_entry)
                .delete(document::handle_remove_entry),
        )
        // Chat
        .route(
            "/api/v1/chat",
            get(chat::handle_chat_history)
                .post(chat::handle_chat_turn)
                .delete(chat::handle_clear_chat),
        )
        .with_state(state)
}

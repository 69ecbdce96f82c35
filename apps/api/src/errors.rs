use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cv::editing::EditError;
use crate::llm_client::LlmError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-success reply from the model provider, passed through verbatim.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// Unusable model output (empty or not JSON).
    #[error("{0}")]
    Llm(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message shown next to the action that failed, e.g. in the chat log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Storage(_) => "Could not save your CV".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingApiKey => AppError::Configuration(e.to_string()),
            LlmError::Api { status, message } => AppError::Upstream { status, message },
            LlmError::EmptyContent | LlmError::Parse(_) => AppError::Llm(e.to_string()),
            LlmError::Http(_) | LlmError::RateLimited { .. } => AppError::Upstream {
                status: StatusCode::BAD_GATEWAY.as_u16(),
                message: e.to_string(),
            },
        }
    }
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::IndexOutOfRange { .. } => AppError::NotFound(e.to_string()),
            EditError::MissingField { .. } | EditError::Malformed { .. } => {
                AppError::Validation(e.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upstream { status, message } => {
                tracing::error!("Upstream error ({status}): {message}");
                (
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                    "UPSTREAM_ERROR",
                    message.clone(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (StatusCode::BAD_GATEWAY, "LLM_ERROR", msg.clone())
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    self.user_message(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    self.user_message(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::editing::Section;

    #[test]
    fn test_llm_errors_map_to_statuses() {
        let cases = [
            (LlmError::MissingApiKey, StatusCode::INTERNAL_SERVER_ERROR),
            (
                LlmError::Api {
                    status: 403,
                    message: "denied".to_string(),
                },
                StatusCode::FORBIDDEN,
            ),
            (LlmError::EmptyContent, StatusCode::BAD_GATEWAY),
            (LlmError::RateLimited { retries: 3 }, StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_upstream_message_verbatim() {
        let err = AppError::from(LlmError::Api {
            status: 400,
            message: "{\"error\":\"bad key\"}".to_string(),
        });
        assert_eq!(err.user_message(), "{\"error\":\"bad key\"}");
    }

    #[test]
    fn test_edit_errors() {
        let missing = AppError::from(EditError::MissingField {
            section: Section::Experience,
            field: "role",
        });
        assert_eq!(missing.into_response().status(), StatusCode::BAD_REQUEST);
        let range = AppError::from(EditError::IndexOutOfRange {
            section: Section::Languages,
            index: 4,
            len: 1,
        });
        assert_eq!(range.into_response().status(), StatusCode::NOT_FOUND);
    }
}

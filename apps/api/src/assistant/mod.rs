//! Assistant — pluggable text-generation backends behind the chat and the
//! `/api/*` helper endpoints.
//!
//! `AppState` carries `Arc<dyn CvExtractor>` and `Arc<dyn TextGenerator>`;
//! production wires both to `GeminiAssistant`, tests wire a stub.

pub mod handlers;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::cv::model::normalize_value;
use crate::cv::{CvDocument, CvFragment};
use crate::errors::AppError;
use crate::llm_client::{prompts, LlmClient};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedRequest {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub bio: String,
}

/// Structured CV operations. A failure carries a displayable message and
/// never yields a partial result.
#[async_trait]
pub trait CvExtractor: Send + Sync {
    /// Free text to a partial document.
    async fn extract(&self, free_text: &str) -> Result<CvFragment, AppError>;

    /// A rewritten copy of `current`, tailored to `job_text` when given.
    async fn improve(&self, current: &CvDocument, job_text: &str) -> Result<CvDocument, AppError>;

    /// A starter document: name and title as given, summary and skills generated.
    async fn seed(&self, request: &SeedRequest) -> Result<CvDocument, AppError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// The reply may be empty.
    async fn generate(&self, prompt: &str) -> Result<String, AppError>;
}

/// Gemini-backed assistant. All calls go through the shared `LlmClient`.
pub struct GeminiAssistant {
    llm: LlmClient,
}

impl GeminiAssistant {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CvExtractor for GeminiAssistant {
    async fn extract(&self, free_text: &str) -> Result<CvFragment, AppError> {
        let reply: Value = self
            .llm
            .call_json(
                &prompts::extract_prompt(free_text),
                prompts::EXTRACT_SYSTEM,
                &prompts::cv_schema(),
            )
            .await?;
        info!("Extracted CV fragment from {} chars of text", free_text.len());
        Ok(CvFragment::from_value(&reply))
    }

    async fn improve(&self, current: &CvDocument, job_text: &str) -> Result<CvDocument, AppError> {
        let current_json = serde_json::to_value(current).map_err(anyhow::Error::from)?;
        let reply: Value = self
            .llm
            .call_json(
                &prompts::improve_prompt(&current_json, job_text),
                prompts::IMPROVE_SYSTEM,
                &prompts::cv_schema(),
            )
            .await?;
        Ok(normalize_value(&reply))
    }

    async fn seed(&self, request: &SeedRequest) -> Result<CvDocument, AppError> {
        let title = request.title.as_deref().unwrap_or_default();
        let reply: Value = self
            .llm
            .call_json(
                &prompts::seed_prompt(&request.name, title, &request.bio),
                prompts::SEED_SYSTEM,
                &prompts::seed_schema(),
            )
            .await?;
        Ok(seeded_document(request, &reply))
    }
}

#[async_trait]
impl TextGenerator for GeminiAssistant {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        Ok(self.llm.generate_text(prompt).await?)
    }
}

/// Builds the starter document from the seed reply. Everything besides
/// name, title, summary and skills stays empty.
fn seeded_document(request: &SeedRequest, reply: &Value) -> CvDocument {
    let generated = CvFragment::from_value(reply);
    CvDocument {
        full_name: request.name.clone(),
        title: request.title.clone().unwrap_or_default(),
        summary: generated.summary.unwrap_or_default(),
        skills: generated.skills.unwrap_or_default(),
        ..CvDocument::default()
    }
}

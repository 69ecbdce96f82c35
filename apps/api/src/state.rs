use std::sync::Arc;

use tokio::sync::Mutex;

use crate::assistant::{CvExtractor, TextGenerator};
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Working document, saved CVs and chat history. Never held across an
    /// assistant call.
    pub session: Arc<Mutex<Session>>,
    /// Pluggable CV assistant. Default: `GeminiAssistant`.
    pub extractor: Arc<dyn CvExtractor>,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(
        session: Session,
        extractor: Arc<dyn CvExtractor>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            extractor,
            generator,
        }
    }
}

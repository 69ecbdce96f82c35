//! Conversation history for the CV chat. Persisted through the same medium
//! as the document store; unreadable history starts over empty.

pub mod handlers;

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::store::{StorageMedium, StoreError};

pub const CHAT_KEY: &str = "cv_chat_messages_v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub ts: i64,
}

pub struct ChatLog {
    medium: Arc<dyn StorageMedium>,
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn init(medium: Arc<dyn StorageMedium>) -> Self {
        let messages = match medium.read(CHAT_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Chat history is corrupt, starting empty: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read chat history: {e}");
                Vec::new()
            }
        };
        Self { medium, messages }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) -> Result<ChatMessage, StoreError> {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            ts: Utc::now().timestamp_millis(),
        };
        let mut next = self.messages.clone();
        next.push(message.clone());
        self.medium.write(CHAT_KEY, &serde_json::to_string(&next)?)?;
        self.messages = next;
        Ok(message)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.medium.remove(CHAT_KEY)?;
        self.messages.clear();
        Ok(())
    }
}

//! Editing session: the working document, the store it is saved into, and
//! the chat history. Handlers reach storage only through this type.
//!
//! Every change to the working document is saved immediately: into the
//! current record, or into a new record titled after the document when none
//! is current.

use std::sync::Arc;

use tracing::info;

use crate::chat::{ChatLog, ChatMessage, Role};
use crate::cv::{merge, title_of, CvDocument, CvFragment};
use crate::store::{CvRecord, CvStore, StorageMedium, StoreError};

pub struct Session {
    store: CvStore,
    chat: ChatLog,
    document: CvDocument,
}

impl Session {
    pub fn init(medium: Arc<dyn StorageMedium>) -> Self {
        let store = CvStore::init(medium.clone());
        let chat = ChatLog::init(medium);
        let document = store
            .current()
            .map(|r| r.data.clone())
            .unwrap_or_default();
        Self {
            store,
            chat,
            document,
        }
    }

    pub fn document(&self) -> &CvDocument {
        &self.document
    }

    pub fn store(&self) -> &CvStore {
        &self.store
    }

    /// Merges an extracted or hand-supplied fragment into the working document.
    pub fn apply_fragment(&mut self, fragment: CvFragment) -> Result<&CvDocument, StoreError> {
        let next = merge(&self.document, fragment);
        self.commit(next)
    }

    pub fn replace_document(&mut self, document: CvDocument) -> Result<&CvDocument, StoreError> {
        self.commit(document)
    }

    /// Applies a direct edit to a copy of the working document and saves it.
    /// A failed edit leaves the document untouched.
    pub fn edit<F, E>(&mut self, f: F) -> Result<&CvDocument, E>
    where
        F: FnOnce(&mut CvDocument) -> Result<(), E>,
        E: From<StoreError>,
    {
        let mut next = self.document.clone();
        f(&mut next)?;
        Ok(self.commit(next)?)
    }

    /// Creates a record for `data` and switches the session to it.
    pub fn new_document(&mut self, title: &str, data: CvDocument) -> Result<CvRecord, StoreError> {
        let record = self.store.create(title, data)?;
        self.document = record.data.clone();
        Ok(record)
    }

    /// Loads a record into the session. `None` for unknown ids.
    pub fn open(&mut self, id: &str) -> Result<Option<&CvDocument>, StoreError> {
        match self.store.load_cv(id)? {
            Some(data) => {
                self.document = data;
                Ok(Some(&self.document))
            }
            None => Ok(None),
        }
    }

    /// Like [`Session::open`] but without returning the data.
    pub fn select(&mut self, id: &str) -> Result<(), StoreError> {
        self.open(id).map(|_| ())
    }

    pub fn rename(&mut self, id: &str, title: &str) -> Result<(), StoreError> {
        self.store.rename(id, title)
    }

    /// Deletes a record; when it was the one being edited, the session moves
    /// to whichever record the store makes current (or an empty document).
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let was_current = self.store.current_id() == Some(id);
        self.store.delete(id)?;
        if was_current {
            self.document = self
                .store
                .current()
                .map(|r| r.data.clone())
                .unwrap_or_default();
        }
        Ok(())
    }

    pub fn clear_store(&mut self) -> Result<(), StoreError> {
        self.store.clear()?;
        self.document = CvDocument::default();
        Ok(())
    }

    pub fn chat_messages(&self) -> &[ChatMessage] {
        self.chat.messages()
    }

    pub fn push_chat(&mut self, role: Role, content: impl Into<String>) -> Result<ChatMessage, StoreError> {
        self.chat.push(role, content)
    }

    pub fn clear_chat(&mut self) -> Result<(), StoreError> {
        self.chat.clear()
    }

    fn commit(&mut self, next: CvDocument) -> Result<&CvDocument, StoreError> {
        if self.store.current_id().is_some() {
            self.store.save_current_cv(next.clone())?;
        } else {
            let record = self.store.create(&title_of(&next), next.clone())?;
            info!("Saved unsaved working CV as {}", record.id);
        }
        self.document = next;
        Ok(&self.document)
    }
}

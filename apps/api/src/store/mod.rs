//! Document Store — named CV drafts plus a single "current" pointer,
//! persisted through a [`StorageMedium`].
//!
//! Every mutation builds the next state, writes it, and only then swaps it
//! in, so a failed write leaves the in-memory view unchanged. Corrupt or
//! missing persisted state loads as an empty store.

pub mod handlers;
pub mod medium;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cv::model::{normalize_value, title_of, CvDocument, UNTITLED_CV};
pub use medium::{StorageMedium, StoreError};

pub const STORE_KEY: &str = "cv_store_v1";
/// Single-document draft written before multi-document storage existed.
pub const LEGACY_DRAFT_KEY: &str = "cv_draft_v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvRecord {
    pub id: String,
    pub title: String,
    pub data: CvDocument,
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_id: Option<String>,
    #[serde(default)]
    items: HashMap<String, CvRecord>,
}

pub struct CvStore {
    medium: Arc<dyn StorageMedium>,
    state: StoreState,
    last_stamp: i64,
}

impl CvStore {
    /// Loads persisted state, falling back to the legacy draft and then to an
    /// empty store. Never fails.
    pub fn init(medium: Arc<dyn StorageMedium>) -> Self {
        let (state, needs_migration) = match medium.read(STORE_KEY) {
            Ok(Some(raw)) => (parse_state(&raw), false),
            Ok(None) => (StoreState::default(), true),
            Err(e) => {
                warn!("Could not read CV store, starting empty: {e}");
                (StoreState::default(), false)
            }
        };
        let last_stamp = state.items.values().map(|r| r.updated_at).max().unwrap_or(0);
        let mut store = Self {
            medium,
            state,
            last_stamp,
        };
        if needs_migration {
            store.migrate_legacy_draft();
        }
        info!(
            "CV store loaded: {} document(s), current={:?}",
            store.state.items.len(),
            store.state.current_id
        );
        store
    }

    /// All records, most recently updated first.
    pub fn list(&self) -> Vec<CvRecord> {
        let mut records: Vec<CvRecord> = self.state.items.values().cloned().collect();
        records.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }

    /// Adds a record and makes it current.
    pub fn create(&mut self, title: &str, data: CvDocument) -> Result<CvRecord, StoreError> {
        let title = title.trim();
        let record = CvRecord {
            id: Uuid::new_v4().to_string(),
            title: if title.is_empty() {
                UNTITLED_CV.to_string()
            } else {
                title.to_string()
            },
            data,
            updated_at: self.next_stamp(),
        };
        let mut next = self.state.clone();
        next.items.insert(record.id.clone(), record.clone());
        next.current_id = Some(record.id.clone());
        self.commit(next)?;
        info!("Created CV {} ({:?})", record.id, record.title);
        Ok(record)
    }

    pub fn current(&self) -> Option<&CvRecord> {
        self.state
            .current_id
            .as_ref()
            .and_then(|id| self.state.items.get(id))
    }

    pub fn current_id(&self) -> Option<&str> {
        self.state.current_id.as_deref()
    }

    /// No-op for unknown ids.
    pub fn set_current(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.state.items.contains_key(id) {
            debug!("set_current ignored unknown CV {id}");
            return Ok(());
        }
        let mut next = self.state.clone();
        next.current_id = Some(id.to_string());
        self.commit(next)
    }

    /// Replaces the current record's data. No-op when nothing is current.
    pub fn save_current_cv(&mut self, data: CvDocument) -> Result<(), StoreError> {
        let Some(id) = self.state.current_id.clone() else {
            return Ok(());
        };
        let stamp = self.next_stamp();
        let mut next = self.state.clone();
        if let Some(record) = next.items.get_mut(&id) {
            record.data = data;
            record.updated_at = stamp;
        }
        self.commit(next)?;
        debug!("Saved current CV {id}");
        Ok(())
    }

    /// Blank titles keep the existing one. No-op for unknown ids.
    pub fn rename(&mut self, id: &str, title: &str) -> Result<(), StoreError> {
        if !self.state.items.contains_key(id) {
            return Ok(());
        }
        let stamp = self.next_stamp();
        let mut next = self.state.clone();
        if let Some(record) = next.items.get_mut(id) {
            let title = title.trim();
            if !title.is_empty() {
                record.title = title.to_string();
            }
            record.updated_at = stamp;
        }
        self.commit(next)
    }

    /// Removes a record. Deleting the current one moves the pointer to the
    /// most recently updated remaining record, or clears it.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.state.items.contains_key(id) {
            return Ok(());
        }
        let mut next = self.state.clone();
        next.items.remove(id);
        if next.current_id.as_deref() == Some(id) {
            next.current_id = next
                .items
                .values()
                .max_by(|a, b| {
                    a.updated_at
                        .cmp(&b.updated_at)
                        .then_with(|| b.id.cmp(&a.id))
                })
                .map(|r| r.id.clone());
        }
        self.commit(next)?;
        info!("Deleted CV {id}");
        Ok(())
    }

    /// Returns a record's data and makes it current.
    pub fn load_cv(&mut self, id: &str) -> Result<Option<CvDocument>, StoreError> {
        let Some(data) = self.state.items.get(id).map(|r| r.data.clone()) else {
            return Ok(None);
        };
        self.set_current(id)?;
        Ok(Some(data))
    }

    /// Drops every record and the persisted state, legacy draft included.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.medium.remove(STORE_KEY)?;
        self.medium.remove(LEGACY_DRAFT_KEY)?;
        self.state = StoreState::default();
        info!("Cleared CV store");
        Ok(())
    }

    fn commit(&mut self, next: StoreState) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&next)?;
        self.medium.write(STORE_KEY, &raw)?;
        self.state = next;
        Ok(())
    }

    /// Wall-clock milliseconds, forced strictly past every earlier stamp.
    fn next_stamp(&mut self) -> i64 {
        let stamp = Utc::now().timestamp_millis().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        stamp
    }

    fn migrate_legacy_draft(&mut self) {
        let raw = match self.medium.read(LEGACY_DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!("Could not read legacy CV draft: {e}");
                return;
            }
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
            warn!("Legacy CV draft is not valid JSON, skipping migration");
            return;
        };
        let draft = normalize_value(&value);
        match self.create(&title_of(&draft), draft) {
            Ok(record) => {
                info!("Migrated legacy CV draft into {}", record.id);
                if let Err(e) = self.medium.remove(LEGACY_DRAFT_KEY) {
                    warn!("Could not remove migrated legacy CV draft: {e}");
                }
            }
            Err(e) => warn!("Failed to migrate legacy CV draft: {e}"),
        }
    }
}

/// Reads persisted state leniently. Only an unreadable top level counts as
/// corrupt; a bad item is dropped on its own and every record's data is
/// normalized.
fn parse_state(raw: &str) -> StoreState {
    let root = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(root)) => root,
        Ok(_) => {
            warn!("CV store is not an object, starting empty");
            return StoreState::default();
        }
        Err(e) => {
            warn!("CV store is corrupt, starting empty: {e}");
            return StoreState::default();
        }
    };

    let mut items = HashMap::new();
    if let Some(raw_items) = root.get("items").and_then(Value::as_object) {
        for (id, item) in raw_items {
            match parse_record(id, item) {
                Some(record) => {
                    items.insert(id.clone(), record);
                }
                None => warn!("Dropping unreadable CV record {id}"),
            }
        }
    }

    // Keys are authoritative for ids; a dangling pointer is dropped.
    let current_id = root
        .get("currentId")
        .and_then(Value::as_str)
        .filter(|id| items.contains_key(*id))
        .map(str::to_string);

    StoreState { current_id, items }
}

fn parse_record(id: &str, item: &Value) -> Option<CvRecord> {
    let item = item.as_object()?;
    let title = item
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(UNTITLED_CV);
    let updated_at = item
        .get("updatedAt")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0);
    Some(CvRecord {
        id: id.to_string(),
        title: title.to_string(),
        data: normalize_value(item.get("data").unwrap_or(&Value::Null)),
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cv::model::{normalize, CvFragment};
    use crate::store::medium::{FileMedium, MemoryMedium};
    use serde_json::json;

    fn memory_store() -> (Arc<MemoryMedium>, CvStore) {
        let medium = Arc::new(MemoryMedium::default());
        let store = CvStore::init(medium.clone());
        (medium, store)
    }

    fn named(name: &str) -> CvDocument {
        normalize_value(&json!({ "fullName": name }))
    }

    #[test]
    fn test_empty_store() {
        let (_, store) = memory_store();
        assert!(store.list().is_empty());
        assert!(store.current().is_none());
        assert!(store.current_id().is_none());
    }

    #[test]
    fn test_create_and_load_round_trip() {
        let (_, mut store) = memory_store();
        let data = normalize(CvFragment::from_value(&json!({
            "fullName": "Ann",
            "skills": ["Go"]
        })));
        let record = store.create("T", data.clone()).unwrap();
        assert_eq!(store.current_id(), Some(record.id.as_str()));
        assert_eq!(store.load_cv(&record.id).unwrap(), Some(data));
    }

    #[test]
    fn test_create_trims_title() {
        let (_, mut store) = memory_store();
        assert_eq!(store.create("  My CV ", named("A")).unwrap().title, "My CV");
        assert_eq!(store.create("   ", named("B")).unwrap().title, "Untitled CV");
    }

    #[test]
    fn test_list_orders_by_updated_at() {
        let (_, mut store) = memory_store();
        let a = store.create("A", named("A")).unwrap();
        let b = store.create("B", named("B")).unwrap();
        assert_eq!(store.list()[0].id, b.id);

        store.set_current(&a.id).unwrap();
        store.save_current_cv(named("A2")).unwrap();
        let ids: Vec<String> = store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id.clone()]);
        assert_eq!(store.current().unwrap().data.full_name, "A2");
    }

    #[test]
    fn test_save_without_current_is_noop() {
        let (medium, mut store) = memory_store();
        store.save_current_cv(named("X")).unwrap();
        assert!(store.list().is_empty());
        assert_eq!(medium.read(STORE_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_current_unknown_is_noop() {
        let (_, mut store) = memory_store();
        let a = store.create("A", named("A")).unwrap();
        store.set_current("missing").unwrap();
        assert_eq!(store.current_id(), Some(a.id.as_str()));
    }

    #[test]
    fn test_rename() {
        let (_, mut store) = memory_store();
        let a = store.create("A", named("A")).unwrap();
        store.rename(&a.id, "  Backend CV ").unwrap();
        assert_eq!(store.current().unwrap().title, "Backend CV");
        store.rename(&a.id, "   ").unwrap();
        let renamed = store.current().unwrap();
        assert_eq!(renamed.title, "Backend CV");
        assert!(renamed.updated_at > a.updated_at);
        store.rename("missing", "X").unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_delete_current_reassigns() {
        let (_, mut store) = memory_store();
        let a = store.create("A", named("A")).unwrap();
        let b = store.create("B", named("B")).unwrap();
        store.set_current(&a.id).unwrap();

        store.delete(&a.id).unwrap();
        assert_eq!(store.current_id(), Some(b.id.as_str()));

        store.delete(&b.id).unwrap();
        assert_eq!(store.current_id(), None);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_delete_other_keeps_current() {
        let (_, mut store) = memory_store();
        let a = store.create("A", named("A")).unwrap();
        let b = store.create("B", named("B")).unwrap();
        store.delete(&a.id).unwrap();
        assert_eq!(store.current_id(), Some(b.id.as_str()));
        store.delete("missing").unwrap();
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_load_cv_selects() {
        let (_, mut store) = memory_store();
        let a = store.create("A", named("A")).unwrap();
        store.create("B", named("B")).unwrap();
        assert_eq!(store.load_cv(&a.id).unwrap().unwrap().full_name, "A");
        assert_eq!(store.current_id(), Some(a.id.as_str()));
        assert_eq!(store.load_cv("missing").unwrap(), None);
    }

    #[test]
    fn test_corrupt_state_loads_empty() {
        let medium = Arc::new(MemoryMedium::default());
        medium.write(STORE_KEY, "{not json").unwrap();
        let store = CvStore::init(medium);
        assert!(store.list().is_empty());
        assert!(store.current_id().is_none());
    }

    #[test]
    fn test_bad_record_dropped_siblings_kept() {
        let medium = Arc::new(MemoryMedium::default());
        medium
            .write(
                STORE_KEY,
                r#"{"currentId":"b","items":{
                    "a":{"id":"a","title":"Good","data":{"fullName":"Ann"},"updatedAt":5},
                    "b":{"id":"b","title":"Nulls","data":{"fullName":"Bo","skills":null},"updatedAt":7},
                    "c":"garbage"
                }}"#,
            )
            .unwrap();
        let mut store = CvStore::init(medium.clone());
        let ids: Vec<String> = store.list().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(store.current().unwrap().data.skills, Vec::<String>::new());

        // Survivors are written back intact.
        store.rename("a", "Still good").unwrap();
        let reopened = CvStore::init(medium);
        assert_eq!(reopened.list().len(), 2);
        assert_eq!(reopened.current_id(), Some("b"));
    }

    #[test]
    fn test_loaded_records_normalized() {
        let medium = Arc::new(MemoryMedium::default());
        medium
            .write(
                STORE_KEY,
                r#"{"currentId":"a","items":{"a":{"title":"  ","data":{
                    "experience":[{"role":"Dev","company":"Acme","start":"2020-01","end":"Present","bullets":["- x","  "]}]
                }}}}"#,
            )
            .unwrap();
        let mut store = CvStore::init(medium);
        let record = store.current().unwrap();
        assert_eq!(record.id, "a");
        assert_eq!(record.title, UNTITLED_CV);
        let data = store.load_cv("a").unwrap().unwrap();
        assert_eq!(data.experience[0].end, None);
        assert_eq!(data.experience[0].bullets, vec!["x"]);
    }

    #[test]
    fn test_dangling_current_id_dropped() {
        let medium = Arc::new(MemoryMedium::default());
        medium
            .write(STORE_KEY, r#"{"currentId":"gone","items":{}}"#)
            .unwrap();
        assert!(CvStore::init(medium).current_id().is_none());
    }

    #[test]
    fn test_legacy_draft_migrated() {
        let medium = Arc::new(MemoryMedium::default());
        medium
            .write(LEGACY_DRAFT_KEY, r#"{"fullName":"Ann","title":"Engineer"}"#)
            .unwrap();
        let store = CvStore::init(medium.clone());
        let current = store.current().unwrap();
        assert_eq!(current.title, "Ann – Engineer");
        assert_eq!(current.data.full_name, "Ann");
        assert!(medium.read(STORE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_legacy_draft_ignored_when_store_exists() {
        let medium = Arc::new(MemoryMedium::default());
        medium.write(STORE_KEY, r#"{"items":{}}"#).unwrap();
        medium.write(LEGACY_DRAFT_KEY, r#"{"fullName":"Ann"}"#).unwrap();
        assert!(CvStore::init(medium).list().is_empty());
    }

    #[test]
    fn test_clear() {
        let (medium, mut store) = memory_store();
        store.create("A", named("A")).unwrap();
        store.clear().unwrap();
        assert!(store.list().is_empty());
        assert_eq!(medium.read(STORE_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_is_final_after_migration() {
        let medium = Arc::new(MemoryMedium::default());
        medium.write(LEGACY_DRAFT_KEY, r#"{"fullName":"Ann"}"#).unwrap();
        let mut store = CvStore::init(medium.clone());
        assert_eq!(store.list().len(), 1);
        assert_eq!(medium.read(LEGACY_DRAFT_KEY).unwrap(), None);

        store.clear().unwrap();
        assert!(CvStore::init(medium).list().is_empty());
    }

    #[test]
    fn test_clear_removes_unmigrated_legacy_draft() {
        let medium = Arc::new(MemoryMedium::default());
        medium.write(STORE_KEY, r#"{"items":{}}"#).unwrap();
        medium.write(LEGACY_DRAFT_KEY, r#"{"fullName":"Ann"}"#).unwrap();
        let mut store = CvStore::init(medium.clone());
        store.clear().unwrap();
        assert_eq!(medium.read(LEGACY_DRAFT_KEY).unwrap(), None);
        assert!(CvStore::init(medium).list().is_empty());
    }

    #[test]
    fn test_survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let medium = Arc::new(FileMedium::open(dir.path()).unwrap());
            let mut store = CvStore::init(medium);
            store.create("Disk", named("Ann")).unwrap().id
        };
        let medium = Arc::new(FileMedium::open(dir.path()).unwrap());
        let mut reopened = CvStore::init(medium);
        assert_eq!(reopened.current_id(), Some(id.as_str()));
        assert_eq!(reopened.load_cv(&id).unwrap().unwrap().full_name, "Ann");
        let stamp = reopened.list()[0].updated_at;
        reopened.save_current_cv(named("Ann B")).unwrap();
        assert!(reopened.list()[0].updated_at > stamp);
    }
}

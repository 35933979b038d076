//! In-process document store.
//!
//! Mirrors the behaviour of the remote store closely enough for tests and the
//! offline CLI mode: query evaluation, a default page size of 25, atomic
//! increments with bounds, and store-assigned metadata fields. Call counters
//! and fault injection let tests observe exactly which remote calls an
//! operation makes.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};
use crate::document::{iso_timestamp, Document, DocumentData, DocumentId, DocumentList};
use crate::error::StoreError;
use crate::query::{Bounds, Query};
use crate::traits::DocumentStore;

/// Page size applied when a list call carries no limit
pub const DEFAULT_LIMIT: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Increment,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub increment: usize,
}

impl CallCounts {
    pub fn writes(&self) -> usize {
        self.create + self.update + self.delete + self.increment
    }

    fn bump(&mut self, op: Operation) {
        match op {
            Operation::List => self.list += 1,
            Operation::Get => self.get += 1,
            Operation::Create => self.create += 1,
            Operation::Update => self.update += 1,
            Operation::Delete => self.delete += 1,
            Operation::Increment => self.increment += 1,
        }
    }
}

#[derive(Default)]
struct MemoryState {
    /// Insertion-ordered documents per collection
    collections: HashMap<String, Vec<Document>>,
    calls: CallCounts,
    /// Countdown per operation; the call that brings it to zero fails
    faults: HashMap<Operation, usize>,
}

pub struct MemoryStore {
    database_id: String,
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new(database_id: impl Into<String>) -> Self {
        Self {
            database_id: database_id.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panic in another test thread must not poison every later call
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make the `nth` upcoming call of `op` fail (1 = the next call)
    pub fn fail_nth(&self, op: Operation, nth: usize) {
        if nth == 0 {
            return;
        }
        self.state().faults.insert(op, nth);
    }

    pub fn clear_faults(&self) {
        self.state().faults.clear();
    }

    pub fn calls(&self) -> CallCounts {
        self.state().calls
    }

    pub fn reset_calls(&self) {
        self.state().calls = CallCounts::default();
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.state().collections.get(collection).map(|docs| docs.len()).unwrap_or(0)
    }

    /// Insert a document verbatim, bypassing call counting and metadata
    pub fn seed(&self, collection: &str, document: Document) {
        self.state()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Load a JSON snapshot written by [`MemoryStore::save_snapshot`].
    ///
    /// A snapshot that does not parse is renamed to `<file>.corrupt` before
    /// starting empty, so the next save cannot overwrite it.
    pub fn load_snapshot(database_id: impl Into<String>, path: &Path) -> Result<Self, StoreError> {
        let store = Self::new(database_id);
        if !path.exists() {
            debug!("No offline snapshot at {}", path.display());
            return Ok(store);
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<HashMap<String, Vec<Document>>>(&content) {
            Ok(collections) => {
                let count: usize = collections.values().map(|docs| docs.len()).sum();
                info!("Loaded offline snapshot with {} documents from {}", count, path.display());
                store.state().collections = collections;
            }
            Err(e) => {
                let aside = corrupt_snapshot_path(path);
                std::fs::rename(path, &aside)?;
                warn!(
                    "Offline snapshot at {} is corrupt ({}), moved to {} and starting empty",
                    path.display(),
                    e,
                    aside.display()
                );
            }
        }
        Ok(store)
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = {
            let state = self.state();
            serde_json::to_string_pretty(&state.collections).map_err(|e| StoreError::Server {
                status: 500,
                message: format!("failed to serialize snapshot: {}", e),
            })?
        };
        std::fs::write(path, json)?;
        debug!("Saved offline snapshot to {}", path.display());
        Ok(())
    }

    /// Count the call and apply any pending fault for it
    fn enter(state: &mut MemoryState, op: Operation) -> Result<(), StoreError> {
        state.calls.bump(op);
        if let Some(remaining) = state.faults.get_mut(&op) {
            *remaining -= 1;
            if *remaining == 0 {
                state.faults.remove(&op);
                return Err(StoreError::Fault(format!("{:?}", op)));
            }
        }
        Ok(())
    }

    fn not_found(collection: &str, id: &str) -> StoreError {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

fn matches_filters(document: &Document, queries: &[Query]) -> bool {
    queries.iter().all(|query| match query {
        Query::Equal(attribute, expected) => field_value(document, attribute) == Some(expected),
        _ => true,
    })
}

fn field_value<'a>(document: &'a Document, attribute: &str) -> Option<&'a Value> {
    if attribute == "$id" {
        return None;
    }
    document.get(attribute)
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Null), Some(Value::Null)) => Ordering::Equal,
        (Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn sort_documents(documents: &mut [Document], queries: &[Query]) {
    let orders: Vec<(&str, bool)> = queries
        .iter()
        .filter_map(|q| match q {
            Query::OrderAsc(attribute) => Some((attribute.as_str(), true)),
            Query::OrderDesc(attribute) => Some((attribute.as_str(), false)),
            _ => None,
        })
        .collect();
    if orders.is_empty() {
        return;
    }

    // Stable sort keeps insertion order between equal keys
    documents.sort_by(|a, b| {
        for (attribute, ascending) in &orders {
            let ordering = compare_values(field_value(a, attribute), field_value(b, attribute));
            let ordering = if *ascending { ordering } else { ordering.reverse() };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn store_name(&self) -> &str {
        "memory"
    }

    async fn list_documents(&self, collection: &str, queries: &[Query]) -> Result<DocumentList, StoreError> {
        let mut state = self.state();
        Self::enter(&mut state, Operation::List)?;

        let mut matching: Vec<Document> = state
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches_filters(d, queries)).cloned().collect())
            .unwrap_or_default();
        sort_documents(&mut matching, queries);

        let total = matching.len() as u64;
        let limit = queries
            .iter()
            .rev()
            .find_map(|q| if let Query::Limit(n) = q { Some(*n) } else { None })
            .unwrap_or(DEFAULT_LIMIT) as usize;
        let offset = queries
            .iter()
            .rev()
            .find_map(|q| if let Query::Offset(n) = q { Some(*n) } else { None })
            .unwrap_or(0) as usize;

        let documents = matching.into_iter().skip(offset).take(limit).collect();
        Ok(DocumentList { total, documents })
    }

    async fn get_document(&self, collection: &str, document_id: &str) -> Result<Document, StoreError> {
        let mut state = self.state();
        Self::enter(&mut state, Operation::Get)?;

        state
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == document_id))
            .cloned()
            .ok_or_else(|| Self::not_found(collection, document_id))
    }

    async fn create_document(
        &self,
        collection: &str,
        document_id: DocumentId,
        data: DocumentData,
    ) -> Result<Document, StoreError> {
        let mut state = self.state();
        Self::enter(&mut state, Operation::Create)?;

        let id = match document_id {
            DocumentId::Unique => uuid::Uuid::new_v4().simple().to_string(),
            DocumentId::Custom(id) => id,
        };
        let docs = state.collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|d| d.id == id) {
            return Err(StoreError::Conflict {
                collection: collection.to_string(),
                id,
            });
        }

        let now = Value::String(iso_timestamp(Utc::now()));
        let mut fields: Map<String, Value> = data.into_iter().filter(|(k, _)| !k.starts_with('$')).collect();
        fields.insert("$collectionId".to_string(), Value::String(collection.to_string()));
        fields.insert("$databaseId".to_string(), Value::String(self.database_id.clone()));
        fields.insert("$createdAt".to_string(), now.clone());
        fields.insert("$updatedAt".to_string(), now);

        let document = Document::new(id, fields);
        docs.push(document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: DocumentData,
    ) -> Result<Document, StoreError> {
        let mut state = self.state();
        Self::enter(&mut state, Operation::Update)?;

        let document = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == document_id))
            .ok_or_else(|| Self::not_found(collection, document_id))?;

        for (key, value) in data.into_iter().filter(|(k, _)| !k.starts_with('$')) {
            document.fields.insert(key, value);
        }
        document
            .fields
            .insert("$updatedAt".to_string(), Value::String(iso_timestamp(Utc::now())));
        Ok(document.clone())
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<(), StoreError> {
        let mut state = self.state();
        Self::enter(&mut state, Operation::Delete)?;

        let docs = state
            .collections
            .get_mut(collection)
            .ok_or_else(|| Self::not_found(collection, document_id))?;
        let position = docs
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(|| Self::not_found(collection, document_id))?;
        docs.remove(position);
        Ok(())
    }

    async fn increment_field(
        &self,
        collection: &str,
        document_id: &str,
        field: &str,
        delta: i64,
        bounds: Bounds,
    ) -> Result<Document, StoreError> {
        let mut state = self.state();
        Self::enter(&mut state, Operation::Increment)?;

        let document = state
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == document_id))
            .ok_or_else(|| Self::not_found(collection, document_id))?;

        let current = document.get(field).and_then(|v| v.as_i64()).unwrap_or(0);
        let next = current + delta;
        if !bounds.contains(next) {
            return Err(StoreError::BoundExceeded {
                id: document_id.to_string(),
                field: field.to_string(),
            });
        }

        document.fields.insert(field.to_string(), Value::from(next));
        document
            .fields
            .insert("$updatedAt".to_string(), Value::String(iso_timestamp(Utc::now())));
        Ok(document.clone())
    }
}

fn corrupt_snapshot_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".corrupt");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> DocumentData {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_metadata() {
        let store = MemoryStore::new("db");
        let doc = store
            .create_document("playlists", DocumentId::Unique, data(json!({"name": "Rust"})))
            .await
            .unwrap();
        assert!(!doc.id.is_empty());
        assert_eq!(doc.collection_id(), "playlists");
        assert!(doc.get("$createdAt").is_some());
        assert_eq!(store.document_count("playlists"), 1);
    }

    #[tokio::test]
    async fn test_custom_id_conflict() {
        let store = MemoryStore::new("db");
        store.create_document("c", "x".into(), Map::new()).await.unwrap();
        let err = store.create_document("c", "x".into(), Map::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_filter_sort_and_default_limit() {
        let store = MemoryStore::new("db");
        for i in 0..30 {
            let owner = if i % 2 == 0 { "a" } else { "b" };
            store
                .create_document("c", DocumentId::Unique, data(json!({"owner": owner, "rank": i})))
                .await
                .unwrap();
        }

        let list = store
            .list_documents("c", &[Query::equal("owner", "a"), Query::order_desc("rank")])
            .await
            .unwrap();
        assert_eq!(list.total, 15);
        assert_eq!(list.documents.len(), 15);
        assert_eq!(list.documents[0].get("rank"), Some(&json!(28)));

        let all = store.list_documents("c", &[]).await.unwrap();
        assert_eq!(all.total, 30);
        assert_eq!(all.documents.len(), DEFAULT_LIMIT as usize);
    }

    #[tokio::test]
    async fn test_increment_respects_bounds() {
        let store = MemoryStore::new("db");
        let doc = store
            .create_document("c", DocumentId::Unique, data(json!({"count": 0})))
            .await
            .unwrap();

        let updated = store.increment_field("c", &doc.id, "count", 2, Bounds::NONE).await.unwrap();
        assert_eq!(updated.get("count"), Some(&json!(2)));

        let err = store
            .increment_field("c", &doc.id, "count", -3, Bounds::floor(0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::BoundExceeded { .. }));
        let unchanged = store.get_document("c", &doc.id).await.unwrap();
        assert_eq!(unchanged.get("count"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_fault_injection_and_call_counts() {
        let store = MemoryStore::new("db");
        store.fail_nth(Operation::Create, 2);
        assert!(store.create_document("c", DocumentId::Unique, Map::new()).await.is_ok());
        let err = store.create_document("c", DocumentId::Unique, Map::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Fault(_)));
        assert!(store.create_document("c", DocumentId::Unique, Map::new()).await.is_ok());

        let calls = store.calls();
        assert_eq!(calls.create, 3);
        assert_eq!(calls.writes(), 3);
        assert_eq!(store.document_count("c"), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_document() {
        let store = MemoryStore::new("db");
        assert!(store.update_document("c", "nope", Map::new()).await.unwrap_err().is_not_found());
        assert!(store.delete_document("c", "nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = MemoryStore::new("db");
        store
            .create_document("c", "keep".into(), data(json!({"name": "kept"})))
            .await
            .unwrap();
        store.save_snapshot(&path).unwrap();

        let reloaded = MemoryStore::load_snapshot("db", &path).unwrap();
        let doc = reloaded.get_document("c", "keep").await.unwrap();
        assert_eq!(doc.get("name"), Some(&json!("kept")));
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_kept_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let truncated = r#"{"c": [{"$id": "keep", "name": "ke"#;
        std::fs::write(&path, truncated).unwrap();

        let store = MemoryStore::load_snapshot("db", &path).unwrap();
        assert_eq!(store.document_count("c"), 0);
        store.list_documents("c", &[]).await.unwrap();
        store.save_snapshot(&path).unwrap();

        let aside = dir.path().join("store.json.corrupt");
        assert_eq!(std::fs::read_to_string(&aside).unwrap(), truncated);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}

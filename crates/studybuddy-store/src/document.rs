use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::error::StoreError;

/// Field map written to / read from a document
pub type DocumentData = Map<String, Value>;

/// Timestamps are written the way browsers serialize them
/// (`2026-10-19T08:00:00.000Z`) so that string ordering matches time ordering.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Identifier requested on create
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentId {
    /// Let the store assign an id
    Unique,
    Custom(String),
}

impl DocumentId {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentId::Unique => "unique()",
            DocumentId::Custom(id) => id,
        }
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        DocumentId::Custom(id.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    /// User fields plus store metadata (`$collectionId`, `$createdAt`, ...)
    #[serde(flatten)]
    pub fields: DocumentData,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: DocumentData) -> Self {
        Self { id: id.into(), fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn collection_id(&self) -> &str {
        self.fields
            .get("$collectionId")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    }

    /// User fields only, without `$`-prefixed store metadata
    pub fn user_fields(&self) -> DocumentData {
        self.fields
            .iter()
            .filter(|(k, _)| !k.starts_with('$'))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Decode into a schema struct, failing with a typed error on mismatch
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut object = self.fields.clone();
        object.insert("$id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(object)).map_err(|source| StoreError::Decode {
            collection: self.collection_id().to_string(),
            id: self.id.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DocumentList {
    /// Number of matching documents, ignoring limit/offset
    pub total: u64,
    pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        #[serde(rename = "$id")]
        id: String,
        name: String,
    }

    fn doc(value: Value) -> Document {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_success() {
        let d = doc(json!({"$id": "a1", "$collectionId": "playlists", "name": "Rust"}));
        let named: Named = d.decode().unwrap();
        assert_eq!(named.id, "a1");
        assert_eq!(named.name, "Rust");
    }

    #[test]
    fn test_decode_shape_mismatch() {
        let d = doc(json!({"$id": "a1", "$collectionId": "playlists", "name": 42}));
        match d.decode::<Named>() {
            Err(StoreError::Decode { collection, id, .. }) => {
                assert_eq!(collection, "playlists");
                assert_eq!(id, "a1");
            }
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_user_fields_strip_metadata() {
        let d = doc(json!({"$id": "a1", "$createdAt": "x", "name": "Rust"}));
        let fields = d.user_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], json!("Rust"));
    }

    #[test]
    fn test_iso_timestamp_format() {
        let at = DateTime::parse_from_rfc3339("2026-10-19T08:00:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(iso_timestamp(at), "2026-10-19T08:00:00.000Z");
    }
}

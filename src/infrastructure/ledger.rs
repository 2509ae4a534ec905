// Ledger - Read-side contract with the ledger node
// The node owns every object; this module only describes how they are fetched

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Address, ObjectId};
use crate::error::AppResult;

/// Which parts of an object the node should include in a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentOptions {
    pub show_content: bool,
    pub show_type: bool,
}

impl ContentOptions {
    pub fn with_content() -> Self {
        Self {
            show_content: true,
            show_type: true,
        }
    }
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self::with_content()
    }
}

/// Cursor and page size for owned-object listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub cursor: Option<String>,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { cursor: None, limit }
    }
}

/// Move object payload: `{ type, fields }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectContent {
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default, rename = "type")]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub fields: Value,
}

/// A raw ledger object with an opaque content payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerObject {
    pub object_id: ObjectId,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub content: Option<ObjectContent>,
}

impl LedgerObject {
    /// Build an object carrying a Move content payload
    pub fn with_fields(object_id: impl Into<ObjectId>, type_tag: &str, fields: Value) -> Self {
        Self {
            object_id: object_id.into(),
            version: None,
            digest: None,
            object_type: Some(type_tag.to_string()),
            content: Some(ObjectContent {
                data_type: Some("moveObject".to_string()),
                type_tag: Some(type_tag.to_string()),
                fields,
            }),
        }
    }

    /// Declared type of the object, taken from its content first
    pub fn type_tag(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|c| c.type_tag.as_deref())
            .or(self.object_type.as_deref())
    }

    /// Top-level field mapping; empty when the content is absent or not a mapping
    pub fn fields(&self) -> &Map<String, Value> {
        static EMPTY: once_cell::sync::Lazy<Map<String, Value>> =
            once_cell::sync::Lazy::new(Map::new);
        self.content
            .as_ref()
            .and_then(|c| c.fields.as_object())
            .unwrap_or(&EMPTY)
    }
}

/// One page of owned objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedObjectsPage {
    pub data: Vec<LedgerObject>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Filter accepted by `query_events`; serializes as `{"MoveEventType": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventFilter {
    MoveEventType(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEventId {
    pub tx_digest: String,
    pub event_seq: String,
}

/// Event emitted by a contract call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    #[serde(default)]
    pub id: Option<LedgerEventId>,
    #[serde(default)]
    pub package_id: Option<String>,
    #[serde(default)]
    pub transaction_module: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Value,
    #[serde(default)]
    pub timestamp_ms: Option<String>,
}

impl LedgerEvent {
    /// String field from the event's JSON payload
    pub fn json_str(&self, key: &str) -> Option<&str> {
        self.parsed_json.get(key).and_then(Value::as_str)
    }
}

/// Ledger RPC client (shared, read-only from the aggregation layer)
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn list_owned_objects(
        &self,
        owner: &Address,
        page: PageRequest,
        options: ContentOptions,
    ) -> AppResult<OwnedObjectsPage>;

    /// Fetch one object; a missing object is `AppError::NotFound`
    async fn get_object(&self, id: &ObjectId, options: ContentOptions) -> AppResult<LedgerObject>;

    async fn query_events(&self, filter: &EventFilter) -> AppResult<Vec<LedgerEvent>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_deserializes_from_node_shape() {
        let raw = json!({
            "objectId": "0xAB",
            "version": "12",
            "digest": "d1",
            "type": "0x1::attendance::Attendance",
            "content": {
                "dataType": "moveObject",
                "type": "0x1::attendance::Attendance",
                "hasPublicTransfer": true,
                "fields": { "name": "Alice" }
            }
        });
        let obj: LedgerObject = serde_json::from_value(raw).unwrap();
        assert_eq!(obj.object_id, ObjectId::from("0xab"));
        assert_eq!(obj.type_tag(), Some("0x1::attendance::Attendance"));
        assert_eq!(obj.fields().get("name"), Some(&json!("Alice")));
    }

    #[test]
    fn test_fields_default_to_empty_mapping() {
        let obj = LedgerObject {
            object_id: ObjectId::from("0x1"),
            version: None,
            digest: None,
            object_type: None,
            content: None,
        };
        assert!(obj.fields().is_empty());
        assert_eq!(obj.type_tag(), None);
    }

    #[test]
    fn test_event_filter_wire_shape() {
        let filter = EventFilter::MoveEventType("0x1::m::EventCreated".into());
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "MoveEventType": "0x1::m::EventCreated" })
        );
    }
}

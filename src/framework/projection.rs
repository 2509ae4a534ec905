// Field Projector - Turns loosely-typed object payloads into typed records
//
// Payload access never fails: a missing scalar becomes `None` and a missing
// container becomes an empty list. Callers decide what to do with partial records.

use serde_json::{Map, Value};

use crate::core::ObjectId;
use crate::framework::classifier::{ObjectKind, TypeTags};
use crate::infrastructure::ledger::LedgerObject;
use crate::models::{Attendee, ConciseEvent, Event};

pub type Fields = Map<String, Value>;

/// Scalar field as a string; numbers and booleans are rendered, everything else is absent
pub fn str_field(fields: &Fields, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn first_str_field(fields: &Fields, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| str_field(fields, key))
}

/// Flattens a wrapped collection `{ fields: { contents: [...] } }` into a list
///
/// A bare array is accepted too. Non-string entries are skipped.
pub fn container_field(fields: &Fields, key: &str) -> Vec<String> {
    let Some(value) = fields.get(key) else {
        return Vec::new();
    };
    let contents = value
        .pointer("/fields/contents")
        .or_else(|| value.get("contents"))
        .unwrap_or(value);
    contents
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Object id field, either `{ id: "0x.." }` (a UID) or a plain string
pub fn id_field(fields: &Fields, key: &str) -> Option<ObjectId> {
    let value = fields.get(key)?;
    value
        .get("id")
        .and_then(Value::as_str)
        .or_else(|| value.as_str())
        .map(ObjectId::new)
}

/// Event payload; the contract names the title `name`, older payloads use `event_name`
pub fn project_event_fields(fields: &Fields) -> Event {
    Event {
        event_name: first_str_field(fields, &["name", "event_name"]),
        host_name: str_field(fields, "host_name"),
        host_address: str_field(fields, "host_address"),
        date: str_field(fields, "date"),
        location: str_field(fields, "location"),
        description: str_field(fields, "description"),
        attendees: container_field(fields, "participants"),
    }
}

pub fn project_event(object: &LedgerObject) -> Event {
    project_event_fields(object.fields())
}

pub fn project_concise_fields(fields: &Fields) -> ConciseEvent {
    ConciseEvent {
        event_name: first_str_field(fields, &["event_name", "name"]),
        host_name: str_field(fields, "host_name"),
        date: str_field(fields, "date"),
        location: str_field(fields, "location"),
        event_id: None,
        participants: container_field(fields, "participants"),
    }
}

/// Concise event keyed by the object it was read from
pub fn project_concise_event(object: &LedgerObject) -> ConciseEvent {
    ConciseEvent {
        event_id: Some(object.object_id.clone()),
        ..project_concise_fields(object.fields())
    }
}

pub fn project_attendee(object: &LedgerObject) -> Attendee {
    let fields = object.fields();
    Attendee {
        id: Some(object.object_id.clone()),
        event_id: id_field(fields, "event_id"),
        event_name: str_field(fields, "event_name"),
        name: str_field(fields, "name"),
        description: str_field(fields, "description"),
        x_handle: str_field(fields, "x_handle"),
        tg_handle: str_field(fields, "tg_handle"),
        friends: container_field(fields, "friends"),
    }
}

/// Event ids listed in a registry object's `events` container
pub fn project_registry(object: &LedgerObject) -> Vec<ObjectId> {
    container_field(object.fields(), "events")
        .into_iter()
        .map(ObjectId::new)
        .collect()
}

/// A ledger object parsed against the contract's schema
#[derive(Debug, Clone, PartialEq)]
pub enum ContractObject {
    Capability { object_id: ObjectId },
    Registry { object_id: ObjectId, event_ids: Vec<ObjectId> },
    Attendance(Attendee),
    Event { object_id: ObjectId, event: Event },
}

impl ContractObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ContractObject::Capability { .. } => ObjectKind::Capability,
            ContractObject::Registry { .. } => ObjectKind::Registry,
            ContractObject::Attendance(_) => ObjectKind::Attendance,
            ContractObject::Event { .. } => ObjectKind::Event,
        }
    }
}

/// Parses objects whose type tag belongs to the contract
#[derive(Debug, Clone)]
pub struct FieldProjector {
    tags: TypeTags,
}

impl FieldProjector {
    pub fn new(tags: TypeTags) -> Self {
        Self { tags }
    }

    /// `None` for objects of a foreign type
    pub fn project(&self, object: &LedgerObject) -> Option<ContractObject> {
        let kind = self.tags.kind_of(object.type_tag()?)?;
        let object_id = object.object_id.clone();
        Some(match kind {
            ObjectKind::Capability => ContractObject::Capability { object_id },
            ObjectKind::Registry => ContractObject::Registry {
                event_ids: project_registry(object),
                object_id,
            },
            ObjectKind::Attendance => ContractObject::Attendance(project_attendee(object)),
            ObjectKind::Event => ContractObject::Event {
                event: project_event(object),
                object_id,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContractPackage;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_concise_projection_flattens_container() {
        let payload = json!({
            "fields": {
                "event_name": "Demo",
                "participants": { "fields": { "contents": ["0xA", "0xB"] } }
            }
        });
        let inner = fields(payload["fields"].clone());
        let projected = project_concise_fields(&inner);
        assert_eq!(
            projected,
            ConciseEvent {
                event_name: Some("Demo".into()),
                participants: vec!["0xA".into(), "0xB".into()],
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let event = project_event_fields(&Fields::new());
        assert_eq!(event, Event::default());
        assert!(event.attendees.is_empty());

        let object = LedgerObject {
            object_id: ObjectId::from("0x5"),
            version: None,
            digest: None,
            object_type: None,
            content: None,
        };
        let attendee = project_attendee(&object);
        assert_eq!(attendee.id, Some(ObjectId::from("0x5")));
        assert_eq!(attendee.event_id, None);
        assert_eq!(attendee.name, None);
        assert!(attendee.friends.is_empty());
    }

    #[test]
    fn test_malformed_container_yields_empty_list() {
        let f = fields(json!({
            "participants": { "fields": { "contents": "not a list" } },
            "friends": { "fields": {} }
        }));
        assert!(container_field(&f, "participants").is_empty());
        assert!(container_field(&f, "friends").is_empty());
    }

    #[test]
    fn test_attendee_projection() {
        let object = LedgerObject::with_fields(
            "0xatt",
            "0xpkg::attendance::Attendance",
            json!({
                "id": { "id": "0xatt" },
                "event_id": "0xEV",
                "event_name": "RustConf",
                "name": "Alice",
                "description": "",
                "x_handle": "@alice",
                "tg_handle": "@alice_tg",
                "friends": { "type": "0x2::vec_set::VecSet<address>", "fields": { "contents": ["0xb0b"] } }
            }),
        );
        let attendee = project_attendee(&object);
        assert_eq!(attendee.event_id, Some(ObjectId::from("0xev")));
        assert_eq!(attendee.event_name.as_deref(), Some("RustConf"));
        assert_eq!(attendee.description.as_deref(), Some(""));
        assert_eq!(attendee.friends, vec!["0xb0b".to_string()]);
    }

    #[test]
    fn test_event_name_key_fallback() {
        let by_name = fields(json!({ "name": "A", "event_name": "B" }));
        assert_eq!(project_event_fields(&by_name).event_name.as_deref(), Some("A"));
        assert_eq!(project_concise_fields(&by_name).event_name.as_deref(), Some("B"));

        let only_name = fields(json!({ "name": "A" }));
        assert_eq!(project_concise_fields(&only_name).event_name.as_deref(), Some("A"));
    }

    #[test]
    fn test_projector_dispatches_on_type_tag() {
        let projector =
            FieldProjector::new(TypeTags::for_package(&ContractPackage::new("0xpkg", "attendance")));
        let registry = LedgerObject::with_fields(
            "0xreg",
            "0xpkg::attendance::Events",
            json!({ "events": { "fields": { "contents": ["0xE1", "0xE2"] } } }),
        );
        match projector.project(&registry) {
            Some(ContractObject::Registry { event_ids, .. }) => {
                assert_eq!(event_ids, vec![ObjectId::from("0xe1"), ObjectId::from("0xe2")]);
            }
            other => panic!("unexpected: {:?}", other),
        }

        let foreign = LedgerObject::with_fields("0x1", "0x2::coin::Coin", json!({}));
        assert!(projector.project(&foreign).is_none());
    }
}

// Object Classifier - Partitions an owned-object batch by declared type tag

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::package::{
    ATTENDANCE_STRUCT, CAPABILITY_STRUCT, EVENT_CREATED_STRUCT, EVENT_STRUCT, REGISTRY_STRUCT,
};
use crate::core::{ContractPackage, ObjectId};
use crate::infrastructure::ledger::LedgerObject;

/// Object kinds the contract defines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    Capability,
    Registry,
    Attendance,
    Event,
}

/// Exact type tags for one contract package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTags {
    pub capability: String,
    pub registry: String,
    pub attendance: String,
    pub event: String,
    pub event_created: String,
}

impl TypeTags {
    pub fn for_package(package: &ContractPackage) -> Self {
        Self {
            capability: package.qualify(CAPABILITY_STRUCT),
            registry: package.qualify(REGISTRY_STRUCT),
            attendance: package.qualify(ATTENDANCE_STRUCT),
            event: package.qualify(EVENT_STRUCT),
            event_created: package.qualify(EVENT_CREATED_STRUCT),
        }
    }

    /// Exact-match lookup; anything else is unrecognized
    pub fn kind_of(&self, tag: &str) -> Option<ObjectKind> {
        if tag == self.capability {
            Some(ObjectKind::Capability)
        } else if tag == self.registry {
            Some(ObjectKind::Registry)
        } else if tag == self.attendance {
            Some(ObjectKind::Attendance)
        } else if tag == self.event {
            Some(ObjectKind::Event)
        } else {
            None
        }
    }

    pub fn tag_for(&self, kind: ObjectKind) -> &str {
        match kind {
            ObjectKind::Capability => &self.capability,
            ObjectKind::Registry => &self.registry,
            ObjectKind::Attendance => &self.attendance,
            ObjectKind::Event => &self.event,
        }
    }
}

/// Per-kind buckets, each in the order objects were received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedObjects {
    pub capabilities: Vec<LedgerObject>,
    pub registries: Vec<LedgerObject>,
    pub attendances: Vec<LedgerObject>,
    pub events: Vec<LedgerObject>,
}

impl ClassifiedObjects {
    pub fn bucket(&self, kind: ObjectKind) -> &[LedgerObject] {
        match kind {
            ObjectKind::Capability => &self.capabilities,
            ObjectKind::Registry => &self.registries,
            ObjectKind::Attendance => &self.attendances,
            ObjectKind::Event => &self.events,
        }
    }

    pub fn len(&self) -> usize {
        self.capabilities.len() + self.registries.len() + self.attendances.len() + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// References the host flows need before building a `create_event` intent
    pub fn host_references(&self) -> HostReferences {
        HostReferences {
            capability: self.capabilities.first().map(|o| o.object_id.clone()),
            registry: self.registries.first().map(|o| o.object_id.clone()),
        }
    }
}

/// Capability and registry ids resolved for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostReferences {
    pub capability: Option<ObjectId>,
    pub registry: Option<ObjectId>,
}

/// Stateless partitioner keyed on one package's type tags
#[derive(Debug, Clone)]
pub struct ObjectClassifier {
    tags: TypeTags,
}

impl ObjectClassifier {
    pub fn new(tags: TypeTags) -> Self {
        Self { tags }
    }

    pub fn tags(&self) -> &TypeTags {
        &self.tags
    }

    pub fn classify<I>(&self, batch: I) -> ClassifiedObjects
    where
        I: IntoIterator<Item = LedgerObject>,
    {
        let mut out = ClassifiedObjects::default();
        let mut ignored = 0usize;

        for object in batch {
            let kind = object.type_tag().and_then(|tag| self.tags.kind_of(tag));
            match kind {
                Some(ObjectKind::Capability) => out.capabilities.push(object),
                Some(ObjectKind::Registry) => out.registries.push(object),
                Some(ObjectKind::Attendance) => out.attendances.push(object),
                Some(ObjectKind::Event) => out.events.push(object),
                None => ignored += 1,
            }
        }

        debug!(
            "Classified {} objects (capabilities={}, registries={}, attendances={}, events={}), ignored {}",
            out.len(),
            out.capabilities.len(),
            out.registries.len(),
            out.attendances.len(),
            out.events.len(),
            ignored
        );
        out
    }

    /// Only the objects of one kind, order preserved
    pub fn select<I>(&self, batch: I, kind: ObjectKind) -> Vec<LedgerObject>
    where
        I: IntoIterator<Item = LedgerObject>,
    {
        batch
            .into_iter()
            .filter(|o| o.type_tag().and_then(|t| self.tags.kind_of(t)) == Some(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn classifier() -> ObjectClassifier {
        ObjectClassifier::new(TypeTags::for_package(&ContractPackage::new("0xpkg", "attendance")))
    }

    fn obj(id: &str, tag: &str) -> LedgerObject {
        LedgerObject::with_fields(id, tag, json!({}))
    }

    #[test]
    fn test_attendance_bucket_excludes_unrelated_kind() {
        let c = classifier();
        let batch = vec![
            obj("0x1", "0xpkg::attendance::Attendance"),
            obj("0x2", "0x2::coin::Coin<0x2::sui::SUI>"),
        ];
        let out = c.classify(batch);
        assert_eq!(out.attendances.len(), 1);
        assert_eq!(out.attendances[0].object_id, ObjectId::from("0x1"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_buckets_are_disjoint_subset_of_input() {
        let c = classifier();
        let batch = vec![
            obj("0x1", "0xpkg::attendance::AdminCap"),
            obj("0x2", "0xpkg::attendance::Events"),
            obj("0x3", "0xpkg::attendance::Attendance"),
            obj("0x4", "0xpkg::attendance::Attendance"),
            obj("0x5", "0xpkg::attendance::Event"),
            obj("0x6", "0xother::attendance::Attendance"),
            obj("0x7", "0xpkg::attendance::attendance"),
        ];
        let input: HashSet<_> = batch.iter().map(|o| o.object_id.clone()).collect();
        let out = c.classify(batch);

        let mut seen = HashSet::new();
        for kind in [
            ObjectKind::Capability,
            ObjectKind::Registry,
            ObjectKind::Attendance,
            ObjectKind::Event,
        ] {
            for o in out.bucket(kind) {
                assert!(seen.insert(o.object_id.clone()), "object in two buckets");
                assert!(input.contains(&o.object_id));
            }
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(out.attendances[0].object_id, ObjectId::from("0x3"));
        assert_eq!(out.attendances[1].object_id, ObjectId::from("0x4"));
    }

    #[test]
    fn test_objects_without_content_are_ignored() {
        let c = classifier();
        let bare = LedgerObject {
            object_id: ObjectId::from("0x9"),
            version: None,
            digest: None,
            object_type: None,
            content: None,
        };
        assert!(c.classify(vec![bare]).is_empty());
    }

    #[test]
    fn test_host_references_take_first_match() {
        let c = classifier();
        let out = c.classify(vec![
            obj("0x2", "0xpkg::attendance::Events"),
            obj("0x1", "0xpkg::attendance::AdminCap"),
            obj("0x3", "0xpkg::attendance::AdminCap"),
        ]);
        let refs = out.host_references();
        assert_eq!(refs.capability, Some(ObjectId::from("0x1")));
        assert_eq!(refs.registry, Some(ObjectId::from("0x2")));

        let empty = c.classify(Vec::new()).host_references();
        assert_eq!(empty, HostReferences::default());
    }
}

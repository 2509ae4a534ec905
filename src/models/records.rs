// View-model records projected out of ledger objects
// Scalar fields stay `None` when the source object lacks them; list fields default to empty

use serde::{Deserialize, Serialize};

use crate::core::ObjectId;

/// Full event as shown on host and discovery pages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub event_name: Option<String>,
    pub host_name: Option<String>,
    pub host_address: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl Event {
    /// Fields a page needs before it can render the event
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.event_name.is_none() {
            missing.push("event_name");
        }
        if self.host_name.is_none() {
            missing.push("host_name");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.location.is_none() {
            missing.push("location");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Reduced event used by the friend-management view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConciseEvent {
    pub event_name: Option<String>,
    pub host_name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub event_id: Option<ObjectId>,
    #[serde(default)]
    pub participants: Vec<String>,
}

impl ConciseEvent {
    pub fn is_complete(&self) -> bool {
        self.event_name.is_some() && self.event_id.is_some()
    }
}

/// One attendance credential owned by the current wallet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub id: Option<ObjectId>,
    pub event_id: Option<ObjectId>,
    pub event_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub x_handle: Option<String>,
    pub tg_handle: Option<String>,
    /// Peer addresses added through `add_friend`
    #[serde(default)]
    pub friends: Vec<String>,
}

impl Attendee {
    pub fn is_complete(&self) -> bool {
        self.id.is_some() && self.event_id.is_some()
    }
}

/// An event together with the ledger object it was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventListing {
    pub object_id: ObjectId,
    pub event: Event,
}

impl EventListing {
    /// Case-insensitive match of `term` against name, location or host name
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.event.event_name, &self.event.location, &self.event.host_name]
            .into_iter()
            .flatten()
            .any(|value| value.to_lowercase().contains(&term))
    }
}

/// Attendance record joined with the event it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedAttendance {
    pub attendance_id: ObjectId,
    pub attendee: Attendee,
    pub event: ConciseEvent,
}

/// Attendance record joined with the full event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedAttendanceDetail {
    pub attendance_id: ObjectId,
    pub attendee: Attendee,
    pub event: Event,
}

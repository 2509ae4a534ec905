// Cross-Reference Resolver - Joins attendance records with the events they reference
//
// Referenced ids are fetched concurrently (one request per distinct id) and the
// outcomes are collected before any join happens. Whether a failed fetch sinks
// the whole batch or only the records that depend on it is a `JoinPolicy` choice.

use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::ObjectId;
use crate::error::{AppError, AppResult};
use crate::framework::projection::{project_attendee, project_concise_event, project_event};
use crate::infrastructure::ledger::{ContentOptions, LedgerClient, LedgerObject};
use crate::models::{Attendee, JoinedAttendance, JoinedAttendanceDetail};

/// What to do when some referenced objects could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinPolicy {
    /// Join what resolved, drop records whose reference failed
    #[default]
    DropUnresolved,
    /// Fail the whole resolution if any fetch failed
    AllOrNothing,
}

/// Result of one fan-out batch, keyed by requested id
#[derive(Debug, Default)]
pub struct FetchOutcomes {
    order: Vec<ObjectId>,
    resolved: HashMap<ObjectId, LedgerObject>,
    failed: Vec<(ObjectId, AppError)>,
}

impl FetchOutcomes {
    pub fn get(&self, id: &ObjectId) -> Option<&LedgerObject> {
        self.resolved.get(id)
    }

    pub fn failures(&self) -> &[(ObjectId, AppError)] {
        &self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Resolved objects in request order
    pub fn into_objects(mut self) -> Vec<LedgerObject> {
        self.order
            .iter()
            .filter_map(|id| self.resolved.remove(id))
            .collect()
    }
}

pub struct CrossReferenceResolver {
    client: Arc<dyn LedgerClient>,
    policy: JoinPolicy,
}

impl CrossReferenceResolver {
    pub fn new(client: Arc<dyn LedgerClient>, policy: JoinPolicy) -> Self {
        Self { client, policy }
    }

    pub fn policy(&self) -> JoinPolicy {
        self.policy
    }

    /// Fetch every distinct id concurrently and wait for all of them
    pub async fn fetch_all<I>(&self, ids: I) -> FetchOutcomes
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let mut seen = HashSet::new();
        let order: Vec<ObjectId> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();

        let fetches = order.iter().map(|id| {
            let client = Arc::clone(&self.client);
            async move {
                let result = client.get_object(id, ContentOptions::with_content()).await;
                (id.clone(), result)
            }
        });
        let results = join_all(fetches).await;

        let mut outcomes = FetchOutcomes {
            order,
            ..Default::default()
        };
        for (id, result) in results {
            match result {
                Ok(object) => {
                    outcomes.resolved.insert(id, object);
                }
                Err(err) => {
                    if err.is_not_found() {
                        debug!("Referenced object {} not found", id);
                    } else {
                        warn!("Failed to fetch referenced object {}: {}", id, err);
                    }
                    outcomes.failed.push((id, err));
                }
            }
        }
        debug!(
            "Fetched {} referenced objects, {} failed",
            outcomes.resolved.len(),
            outcomes.failed.len()
        );
        outcomes
    }

    fn enforce_policy(&self, outcomes: &FetchOutcomes) -> AppResult<()> {
        if self.policy == JoinPolicy::AllOrNothing && !outcomes.is_complete() {
            let ids: Vec<String> = outcomes.failed.iter().map(|(id, _)| id.to_string()).collect();
            return Err(AppError::ResolutionFailed(format!(
                "could not fetch {}",
                ids.join(", ")
            )));
        }
        Ok(())
    }

    /// Fetch objects by id, in the given order, subject to the join policy
    pub async fn fetch_objects<I>(&self, ids: I) -> AppResult<Vec<LedgerObject>>
    where
        I: IntoIterator<Item = ObjectId>,
    {
        let outcomes = self.fetch_all(ids).await;
        self.enforce_policy(&outcomes)?;
        Ok(outcomes.into_objects())
    }

    async fn join_with<T, F>(&self, attendances: &[LedgerObject], build: F) -> AppResult<Vec<T>>
    where
        F: Fn(ObjectId, Attendee, &LedgerObject) -> Option<T>,
    {
        let records: Vec<Attendee> = attendances.iter().map(project_attendee).collect();
        let outcomes = self
            .fetch_all(records.iter().filter_map(|r| r.event_id.clone()))
            .await;
        self.enforce_policy(&outcomes)?;

        let mut joined = Vec::with_capacity(records.len());
        for attendee in records {
            let (Some(attendance_id), Some(event_id)) = (attendee.id.clone(), attendee.event_id.clone())
            else {
                debug!("Dropping attendance record without an event reference");
                continue;
            };
            let Some(event_object) = outcomes.get(&event_id) else {
                debug!("Dropping attendance {}: event {} unresolved", attendance_id, event_id);
                continue;
            };
            match build(attendance_id.clone(), attendee, event_object) {
                Some(record) => joined.push(record),
                None => debug!("Dropping attendance {}: event {} has no name", attendance_id, event_id),
            }
        }
        Ok(joined)
    }

    /// Attendance records joined with concise events (participants included)
    pub async fn join_concise(&self, attendances: &[LedgerObject]) -> AppResult<Vec<JoinedAttendance>> {
        self.join_with(attendances, |attendance_id, attendee, event_object| {
            let event = project_concise_event(event_object);
            event.event_name.as_ref()?;
            Some(JoinedAttendance {
                attendance_id,
                attendee,
                event,
            })
        })
        .await
    }

    /// Attendance records joined with full events (attendees included)
    pub async fn join_detail(
        &self,
        attendances: &[LedgerObject],
    ) -> AppResult<Vec<JoinedAttendanceDetail>> {
        self.join_with(attendances, |attendance_id, attendee, event_object| {
            let event = project_event(event_object);
            event.event_name.as_ref()?;
            Some(JoinedAttendanceDetail {
                attendance_id,
                attendee,
                event,
            })
        })
        .await
    }
}

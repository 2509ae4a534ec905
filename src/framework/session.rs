// Aggregation Session - The page-level flows for one connected address
//
// The session is constructed with the owner address and the ledger client
// instead of reading them from ambient wallet state. Every flow is read-only
// against the ledger except `submit`, which goes through a `TransactionSigner`.

use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::core::{Address, ContractPackage, ObjectId};
use crate::error::{AppError, AppResult};
use crate::framework::classifier::{ClassifiedObjects, HostReferences, ObjectClassifier, ObjectKind, TypeTags};
use crate::framework::intent::{IntentBuilder, TransactionIntent};
use crate::framework::projection::{project_attendee, project_event, project_registry};
use crate::framework::resolver::{CrossReferenceResolver, JoinPolicy};
use crate::infrastructure::ledger::{ContentOptions, EventFilter, LedgerClient, LedgerObject, PageRequest};
use crate::infrastructure::signer::{TransactionReceipt, TransactionSigner};
use crate::models::{
    Attendee, CreateEventForm, Event, EventListing, JoinedAttendance, JoinedAttendanceDetail,
    SignInForm,
};

/// Page size used by the dashboard for owned-object listings
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Tunables for one session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub page_limit: usize,
    /// Upper bound on owned-object pages followed per listing
    pub max_pages: usize,
    pub policy: JoinPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            max_pages: 1,
            policy: JoinPolicy::default(),
        }
    }
}

pub struct AggregationSession {
    session_id: Uuid,
    owner: Address,
    client: Arc<dyn LedgerClient>,
    tags: TypeTags,
    classifier: ObjectClassifier,
    resolver: CrossReferenceResolver,
    intents: IntentBuilder,
    options: SessionOptions,
}

impl AggregationSession {
    pub fn new(
        owner: Address,
        client: Arc<dyn LedgerClient>,
        package: ContractPackage,
        options: SessionOptions,
    ) -> Self {
        let tags = TypeTags::for_package(&package);
        let session_id = Uuid::new_v4();
        info!("Opened session {} for {} on package {}", session_id, owner, package);
        Self {
            session_id,
            owner,
            resolver: CrossReferenceResolver::new(Arc::clone(&client), options.policy),
            client,
            classifier: ObjectClassifier::new(tags.clone()),
            tags,
            intents: IntentBuilder::new(package),
            options,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn tags(&self) -> &TypeTags {
        &self.tags
    }

    /// Owned objects with content, following the cursor up to `max_pages`
    pub async fn owned_objects(&self) -> AppResult<Vec<LedgerObject>> {
        let mut objects = Vec::new();
        let mut page = PageRequest::first(self.options.page_limit);

        for fetched in 1..=self.options.max_pages.max(1) {
            let result = self
                .client
                .list_owned_objects(&self.owner, page.clone(), ContentOptions::with_content())
                .await?;
            objects.extend(result.data);

            match result.next_cursor {
                Some(cursor) if result.has_next_page => {
                    if fetched == self.options.max_pages.max(1) {
                        debug!("Stopping after {} owned-object pages for {}", fetched, self.owner);
                        break;
                    }
                    page.cursor = Some(cursor);
                }
                _ => break,
            }
        }

        debug!("Listed {} owned objects for {}", objects.len(), self.owner);
        Ok(objects)
    }

    pub async fn classify_owned(&self) -> AppResult<ClassifiedObjects> {
        Ok(self.classifier.classify(self.owned_objects().await?))
    }

    /// Capability and registry the create-event flow needs
    pub async fn host_references(&self) -> AppResult<HostReferences> {
        Ok(self.classify_owned().await?.host_references())
    }

    /// Events listed in the owner's registry (host manage page)
    pub async fn hosted_events(&self) -> AppResult<Vec<Event>> {
        let owned = self.owned_objects().await?;
        let registries = self.classifier.select(owned, ObjectKind::Registry);
        let Some(registry) = registries.first() else {
            debug!("{} owns no registry", self.owner);
            return Ok(Vec::new());
        };

        let event_ids = project_registry(registry);
        let objects = self.resolver.fetch_objects(event_ids).await?;
        Ok(objects
            .iter()
            .filter(|o| self.is_event(o))
            .map(project_event)
            .filter(|e| e.event_name.is_some())
            .collect())
    }

    fn is_event(&self, object: &LedgerObject) -> bool {
        object.type_tag() == Some(self.tags.event.as_str())
    }

    /// Every event announced by the package, newest state fetched (attend page)
    pub async fn discover_events(&self) -> AppResult<Vec<EventListing>> {
        let filter = EventFilter::MoveEventType(self.tags.event_created.clone());
        let announcements = self.client.query_events(&filter).await?;
        let ids: Vec<ObjectId> = announcements
            .iter()
            .filter_map(|e| e.json_str("event_id"))
            .map(ObjectId::new)
            .collect();
        debug!("{} event announcements found", ids.len());

        let objects = self.resolver.fetch_objects(ids).await?;
        Ok(objects
            .iter()
            .filter(|o| self.is_event(o))
            .map(|o| EventListing {
                object_id: o.object_id.clone(),
                event: project_event(o),
            })
            .filter(|l| l.event.event_name.is_some())
            .collect())
    }

    pub fn filter_events<'a>(listings: &'a [EventListing], term: &str) -> Vec<&'a EventListing> {
        listings.iter().filter(|l| l.matches(term)).collect()
    }

    /// First listing whose event name equals `name`
    pub fn find_listing_by_name<'a>(listings: &'a [EventListing], name: &str) -> Option<&'a EventListing> {
        listings
            .iter()
            .find(|l| l.event.event_name.as_deref() == Some(name))
    }

    /// Attendance records owned by this address (attendee manage page)
    pub async fn my_attendances(&self) -> AppResult<Vec<Attendee>> {
        let owned = self.owned_objects().await?;
        Ok(self
            .classifier
            .select(owned, ObjectKind::Attendance)
            .iter()
            .map(project_attendee)
            .collect())
    }

    /// Attendance records joined with concise events (add-friend page)
    pub async fn my_attended_events(&self) -> AppResult<Vec<JoinedAttendance>> {
        let owned = self.owned_objects().await?;
        let attendances = self.classifier.select(owned, ObjectKind::Attendance);
        self.resolver.join_concise(&attendances).await
    }

    pub async fn my_attended_event_details(&self) -> AppResult<Vec<JoinedAttendanceDetail>> {
        let owned = self.owned_objects().await?;
        let attendances = self.classifier.select(owned, ObjectKind::Attendance);
        self.resolver.join_detail(&attendances).await
    }

    pub async fn prepare_create_event(&self, form: &CreateEventForm) -> AppResult<TransactionIntent> {
        form.validate()?;
        let refs = self.host_references().await?;
        self.intents.create_event(&refs, form)
    }

    pub fn prepare_sign_in(&self, listing: &EventListing, form: &SignInForm) -> AppResult<TransactionIntent> {
        form.validate()?;
        Ok(self.intents.sign_in(&listing.object_id, form))
    }

    /// `friend` is parsed here so malformed input fails before any intent exists
    pub fn prepare_add_friend(&self, joined: &JoinedAttendance, friend: &str) -> AppResult<TransactionIntent> {
        let friend = Address::parse(friend)?;
        let event_id = joined
            .event
            .event_id
            .as_ref()
            .ok_or_else(|| AppError::MissingReference("Event object has not been resolved".to_string()))?;
        self.intents
            .add_friend(event_id, Some(&joined.attendance_id), &friend)
    }

    /// Hand an intent to the signer once; failures are reported, not retried
    pub async fn submit(
        &self,
        signer: &dyn TransactionSigner,
        intent: &TransactionIntent,
    ) -> AppResult<TransactionReceipt> {
        match signer.sign_and_execute(intent).await {
            Ok(receipt) => {
                info!(
                    "Session {}: {} executed in {}",
                    self.session_id,
                    intent.target(),
                    receipt.digest
                );
                Ok(receipt)
            }
            Err(err) => {
                error!("Session {}: {} failed: {}", self.session_id, intent.target(), err);
                Err(match err {
                    AppError::Submission(msg) => AppError::Submission(msg),
                    other => AppError::Submission(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::in_memory::InMemoryLedger;
    use serde_json::json;

    fn addr(raw: &str) -> Address {
        Address::parse(raw).unwrap()
    }

    fn session(ledger: &InMemoryLedger, owner: &Address, options: SessionOptions) -> AggregationSession {
        AggregationSession::new(
            owner.clone(),
            Arc::new(ledger.clone()),
            ledger.package().clone(),
            options,
        )
    }

    #[tokio::test]
    async fn test_owned_objects_respects_page_bound() {
        let ledger = InMemoryLedger::default();
        let owner = addr("0xa11ce");
        for i in 0..5 {
            ledger
                .insert_object(
                    Some(owner.clone()),
                    LedgerObject::with_fields(format!("0x{}", i), "0x2::coin::Coin", json!({})),
                )
                .await;
        }

        let one_page = SessionOptions {
            page_limit: 2,
            max_pages: 1,
            ..Default::default()
        };
        assert_eq!(session(&ledger, &owner, one_page).owned_objects().await.unwrap().len(), 2);

        let all_pages = SessionOptions {
            page_limit: 2,
            max_pages: 10,
            ..Default::default()
        };
        assert_eq!(session(&ledger, &owner, all_pages).owned_objects().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_hosted_events_keep_partial_records() {
        let ledger = InMemoryLedger::default();
        let host = addr("0x4057");
        ledger
            .insert_object(
                Some(host.clone()),
                LedgerObject::with_fields(
                    "0xreg",
                    "0xpkg::attendance::Events",
                    json!({ "events": { "fields": { "contents": ["0xe1", "0xe2", "0xcoin"] } } }),
                ),
            )
            .await;
        ledger
            .insert_object(
                None,
                LedgerObject::with_fields(
                    "0xe1",
                    "0xpkg::attendance::Event",
                    json!({ "name": "No Venue", "host_name": "Hana", "date": "2025-07-01" }),
                ),
            )
            .await;
        ledger
            .insert_object(
                None,
                LedgerObject::with_fields("0xe2", "0xpkg::attendance::Event", json!({ "location": "Nowhere" })),
            )
            .await;
        ledger
            .insert_object(
                None,
                LedgerObject::with_fields("0xcoin", "0x2::coin::Coin", json!({ "name": "Not an event" })),
            )
            .await;

        let events = session(&ledger, &host, SessionOptions::default())
            .hosted_events()
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name.as_deref(), Some("No Venue"));
        assert_eq!(events[0].location, None);
    }

    #[tokio::test]
    async fn test_prepare_create_event_without_capability() {
        let ledger = InMemoryLedger::default();
        let s = session(&ledger, &addr("0xa11ce"), SessionOptions::default());
        let form = CreateEventForm {
            event_name: "Demo".into(),
            host_name: "Host".into(),
            date: "2025-07-01".into(),
            location: "Online".into(),
            description: String::new(),
        };
        let result = s.prepare_create_event(&form).await;
        assert!(matches!(result, Err(AppError::MissingReference(_))));
    }

    #[tokio::test]
    async fn test_invalid_form_rejected_before_lookup() {
        let ledger = InMemoryLedger::default();
        ledger.fail_listing(true).await;
        let s = session(&ledger, &addr("0xa11ce"), SessionOptions::default());
        let result = s.prepare_create_event(&CreateEventForm::default()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_friend_rejects_malformed_address() {
        let ledger = InMemoryLedger::default();
        let s = session(&ledger, &addr("0xa11ce"), SessionOptions::default());
        let joined = JoinedAttendance {
            attendance_id: ObjectId::from("0xatt"),
            attendee: Attendee::default(),
            event: crate::models::ConciseEvent {
                event_id: Some(ObjectId::from("0xev")),
                ..Default::default()
            },
        };
        assert!(matches!(
            s.prepare_add_friend(&joined, "bob"),
            Err(AppError::Validation(_))
        ));
        assert!(s.prepare_add_friend(&joined, "0xb0b").is_ok());
    }

    #[tokio::test]
    async fn test_submit_failure_is_reported_once() {
        let ledger = InMemoryLedger::default();
        let owner = addr("0xa11ce");
        ledger.reject_submissions(Some("insufficient gas")).await;
        let s = session(&ledger, &owner, SessionOptions::default());
        let intent = IntentBuilder::new(ledger.package().clone())
            .sign_in(&ObjectId::from("0xev"), &SignInForm::default());

        let err = s.submit(&ledger.signer(owner), &intent).await.unwrap_err();
        assert!(matches!(err, AppError::Submission(ref msg) if msg.contains("insufficient gas")));
    }
}

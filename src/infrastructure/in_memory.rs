// In-Memory Ledger - Deterministic stand-in for the ledger node and the signer
//
// Holds objects and emitted events in process and applies the three contract
// entry points the way the on-chain module does, so the aggregation flows can
// run end to end without a network. Fetch failures and latency can be injected
// per object.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::{Address, ContractPackage, ObjectId};
use crate::error::{AppError, AppResult};
use crate::framework::classifier::{HostReferences, ObjectKind, TypeTags};
use crate::framework::intent::{ContractFunction, TransactionIntent};
use crate::infrastructure::ledger::{
    ContentOptions, EventFilter, LedgerClient, LedgerEvent, LedgerEventId, LedgerObject,
    OwnedObjectsPage, PageRequest,
};
use crate::infrastructure::signer::{TransactionReceipt, TransactionSigner};

const VEC_SET_TYPE: &str = "0x2::vec_set::VecSet<address>";
const VECTOR_ID_TYPE: &str = "vector<0x2::object::ID>";

#[derive(Debug)]
struct StoredObject {
    owner: Option<Address>,
    object: LedgerObject,
}

#[derive(Debug, Default)]
struct LedgerState {
    objects: HashMap<ObjectId, StoredObject>,
    order: Vec<ObjectId>,
    events: Vec<LedgerEvent>,
    failing: HashSet<ObjectId>,
    delays: HashMap<ObjectId, Duration>,
    fetch_counts: HashMap<ObjectId, usize>,
    listing_failure: bool,
    submission_failure: Option<String>,
    next_object: u64,
    next_tx: u64,
}

impl LedgerState {
    fn insert(&mut self, owner: Option<Address>, object: LedgerObject) {
        let id = object.object_id.clone();
        if !self.objects.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.objects.insert(id, StoredObject { owner, object });
    }

    fn allocate_id(&mut self) -> ObjectId {
        self.next_object += 1;
        ObjectId::new(format!("0x{:064x}", self.next_object))
    }

    fn next_digest(&mut self) -> String {
        self.next_tx += 1;
        format!("tx{:08}", self.next_tx)
    }

    fn emit(&mut self, event_type: String, sender: &Address, digest: &str, payload: Value) {
        let seq = self.events.len();
        self.events.push(LedgerEvent {
            id: Some(LedgerEventId {
                tx_digest: digest.to_string(),
                event_seq: seq.to_string(),
            }),
            package_id: None,
            transaction_module: None,
            sender: Some(sender.to_string()),
            event_type,
            parsed_json: payload,
            timestamp_ms: None,
        });
    }

    fn object_of_kind(&self, id: &ObjectId, kind: ObjectKind, tags: &TypeTags) -> AppResult<&StoredObject> {
        let stored = self
            .objects
            .get(id)
            .ok_or_else(|| AppError::Submission(format!("object {} does not exist", id)))?;
        if stored.object.type_tag() != Some(tags.tag_for(kind)) {
            return Err(AppError::Submission(format!("object {} is not a {:?}", id, kind)));
        }
        Ok(stored)
    }

    fn require_owned(&self, id: &ObjectId, kind: ObjectKind, tags: &TypeTags, sender: &Address) -> AppResult<()> {
        let stored = self.object_of_kind(id, kind, tags)?;
        if stored.owner.as_ref() != Some(sender) {
            return Err(AppError::Submission(format!("{} does not own {}", sender, id)));
        }
        Ok(())
    }

    fn fields_mut(&mut self, id: &ObjectId) -> AppResult<&mut Value> {
        self.objects
            .get_mut(id)
            .and_then(|stored| stored.object.content.as_mut())
            .map(|content| &mut content.fields)
            .ok_or_else(|| AppError::Submission(format!("object {} has no content", id)))
    }
}

fn wrapped(type_tag: &str, items: Vec<String>) -> Value {
    json!({ "type": type_tag, "fields": { "contents": items } })
}

fn container_mut<'a>(fields: &'a mut Value, key: &str) -> AppResult<&'a mut Vec<Value>> {
    fields
        .pointer_mut(&format!("/{}/fields/contents", key))
        .and_then(Value::as_array_mut)
        .ok_or_else(|| AppError::Submission(format!("field {} is not a container", key)))
}

fn contains(items: &[Value], needle: &str) -> bool {
    items.iter().any(|v| v.as_str() == Some(needle))
}

#[derive(Clone)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    package: ContractPackage,
    tags: TypeTags,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(ContractPackage::new("0xpkg", "attendance"))
    }
}

impl InMemoryLedger {
    pub fn new(package: ContractPackage) -> Self {
        let tags = TypeTags::for_package(&package);
        Self {
            state: Arc::new(RwLock::new(LedgerState::default())),
            package,
            tags,
        }
    }

    pub fn package(&self) -> &ContractPackage {
        &self.package
    }

    pub async fn insert_object(&self, owner: Option<Address>, object: LedgerObject) {
        self.state.write().await.insert(owner, object);
    }

    /// Make every fetch of `id` fail with a network error
    pub async fn fail_fetch(&self, id: &ObjectId) {
        self.state.write().await.failing.insert(id.clone());
    }

    pub async fn set_fetch_delay(&self, id: &ObjectId, delay: Duration) {
        self.state.write().await.delays.insert(id.clone(), delay);
    }

    pub async fn fetch_count(&self, id: &ObjectId) -> usize {
        self.state.read().await.fetch_counts.get(id).copied().unwrap_or(0)
    }

    pub async fn fail_listing(&self, fail: bool) {
        self.state.write().await.listing_failure = fail;
    }

    /// Reject every submission with `reason`, or accept again with `None`
    pub async fn reject_submissions(&self, reason: Option<&str>) {
        self.state.write().await.submission_failure = reason.map(str::to_string);
    }

    /// Mint the capability and registry a host needs, as package publication does
    pub async fn publish(&self, host: &Address) -> HostReferences {
        let mut state = self.state.write().await;
        let capability = state.allocate_id();
        let registry = state.allocate_id();
        state.insert(
            Some(host.clone()),
            LedgerObject::with_fields(
                capability.clone(),
                &self.tags.capability,
                json!({ "id": { "id": capability } }),
            ),
        );
        state.insert(
            Some(host.clone()),
            LedgerObject::with_fields(
                registry.clone(),
                &self.tags.registry,
                json!({ "id": { "id": registry }, "events": wrapped(VECTOR_ID_TYPE, Vec::new()) }),
            ),
        );
        info!("Published capability {} and registry {} to {}", capability, registry, host);
        HostReferences {
            capability: Some(capability),
            registry: Some(registry),
        }
    }

    /// Signer acting on behalf of `sender`
    pub fn signer(&self, sender: Address) -> InMemorySigner {
        InMemorySigner {
            ledger: self.clone(),
            sender,
        }
    }

    async fn execute(&self, sender: &Address, intent: &TransactionIntent) -> AppResult<TransactionReceipt> {
        if intent.package != self.package {
            return Err(AppError::Submission(format!("unknown package {}", intent.package)));
        }
        if intent.arguments.len() != intent.function.arity() {
            return Err(AppError::Submission(format!(
                "{} expects {} arguments, got {}",
                intent.function,
                intent.function.arity(),
                intent.arguments.len()
            )));
        }

        let mut state = self.state.write().await;
        if let Some(reason) = state.submission_failure.clone() {
            return Err(AppError::Submission(reason));
        }

        match intent.function {
            ContractFunction::CreateEvent => self.create_event(&mut state, sender, intent),
            ContractFunction::SignIn => self.sign_in(&mut state, sender, intent),
            ContractFunction::AddFriend => self.add_friend(&mut state, sender, intent),
        }
    }

    fn create_event(
        &self,
        state: &mut LedgerState,
        sender: &Address,
        intent: &TransactionIntent,
    ) -> AppResult<TransactionReceipt> {
        let capability = intent.object_arg(0)?;
        let registry = intent.object_arg(1)?;
        state.require_owned(capability, ObjectKind::Capability, &self.tags, sender)?;
        state.require_owned(registry, ObjectKind::Registry, &self.tags, sender)?;

        let event_id = state.allocate_id();
        let name = intent.string_arg(2)?.to_string();
        let fields = json!({
            "id": { "id": event_id },
            "name": name,
            "date": intent.string_arg(3)?,
            "location": intent.string_arg(4)?,
            "description": intent.string_arg(5)?,
            "host_name": intent.string_arg(6)?,
            "host_address": sender.as_str(),
            "participants": wrapped(VEC_SET_TYPE, Vec::new()),
        });
        state.insert(None, LedgerObject::with_fields(event_id.clone(), &self.tags.event, fields));
        container_mut(state.fields_mut(registry)?, "events")?.push(json!(event_id));

        let digest = state.next_digest();
        state.emit(
            self.tags.event_created.clone(),
            sender,
            &digest,
            json!({ "event_id": event_id, "name": name, "host": sender.as_str() }),
        );
        debug!("create_event {} -> {}", name, event_id);
        Ok(TransactionReceipt {
            digest,
            created: vec![event_id],
        })
    }

    fn sign_in(
        &self,
        state: &mut LedgerState,
        sender: &Address,
        intent: &TransactionIntent,
    ) -> AppResult<TransactionReceipt> {
        let event_id = intent.object_arg(0)?.clone();
        state.object_of_kind(&event_id, ObjectKind::Event, &self.tags)?;

        let event_fields = state.fields_mut(&event_id)?;
        let event_name = event_fields.get("name").cloned().unwrap_or(Value::Null);
        let participants = container_mut(event_fields, "participants")?;
        if contains(participants.as_slice(), sender.as_str()) {
            return Err(AppError::Submission(format!(
                "{} already signed in to {}",
                sender, event_id
            )));
        }
        participants.push(json!(sender.as_str()));

        let attendance_id = state.allocate_id();
        let fields = json!({
            "id": { "id": attendance_id },
            "event_id": event_id,
            "event_name": event_name,
            "name": intent.string_arg(1)?,
            "description": intent.string_arg(2)?,
            "x_handle": intent.string_arg(3)?,
            "tg_handle": intent.string_arg(4)?,
            "friends": wrapped(VEC_SET_TYPE, Vec::new()),
        });
        state.insert(
            Some(sender.clone()),
            LedgerObject::with_fields(attendance_id.clone(), &self.tags.attendance, fields),
        );

        let digest = state.next_digest();
        state.emit(
            self.package.qualify("AttendeeSignedIn"),
            sender,
            &digest,
            json!({ "event_id": event_id, "attendance_id": attendance_id }),
        );
        Ok(TransactionReceipt {
            digest,
            created: vec![attendance_id],
        })
    }

    fn add_friend(
        &self,
        state: &mut LedgerState,
        sender: &Address,
        intent: &TransactionIntent,
    ) -> AppResult<TransactionReceipt> {
        let event_id = intent.object_arg(0)?.clone();
        let attendance_id = intent.object_arg(1)?.clone();
        let friend = intent.address_arg(2)?;

        state.object_of_kind(&event_id, ObjectKind::Event, &self.tags)?;
        state.require_owned(&attendance_id, ObjectKind::Attendance, &self.tags, sender)?;
        if friend == sender {
            return Err(AppError::Submission("cannot add yourself as a friend".to_string()));
        }

        let event_fields = state.fields_mut(&event_id)?;
        if !contains(container_mut(event_fields, "participants")?.as_slice(), friend.as_str()) {
            return Err(AppError::Submission(format!(
                "{} did not attend {}",
                friend, event_id
            )));
        }

        let attendance_fields = state.fields_mut(&attendance_id)?;
        let linked = attendance_fields
            .get("event_id")
            .and_then(Value::as_str)
            .map(ObjectId::new);
        if linked.as_ref() != Some(&event_id) {
            return Err(AppError::Submission(format!(
                "attendance {} is not for event {}",
                attendance_id, event_id
            )));
        }
        let friends = container_mut(attendance_fields, "friends")?;
        if !contains(friends.as_slice(), friend.as_str()) {
            friends.push(json!(friend.as_str()));
        }

        let digest = state.next_digest();
        state.emit(
            self.package.qualify("FriendAdded"),
            sender,
            &digest,
            json!({ "attendance_id": attendance_id, "friend": friend.as_str() }),
        );
        Ok(TransactionReceipt {
            digest,
            created: Vec::new(),
        })
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn list_owned_objects(
        &self,
        owner: &Address,
        page: PageRequest,
        _options: ContentOptions,
    ) -> AppResult<OwnedObjectsPage> {
        let state = self.state.read().await;
        if state.listing_failure {
            return Err(AppError::Network("owned object listing unavailable".to_string()));
        }

        let owned: Vec<&ObjectId> = state
            .order
            .iter()
            .filter(|id| state.objects.get(*id).and_then(|s| s.owner.as_ref()) == Some(owner))
            .collect();
        let start = match &page.cursor {
            Some(cursor) => owned
                .iter()
                .position(|id| id.as_str() == cursor.as_str())
                .map(|pos| pos + 1)
                .unwrap_or(owned.len()),
            None => 0,
        };
        let end = (start + page.limit).min(owned.len());
        let data: Vec<LedgerObject> = owned[start..end]
            .iter()
            .filter_map(|id| state.objects.get(*id).map(|s| s.object.clone()))
            .collect();

        Ok(OwnedObjectsPage {
            next_cursor: data.last().map(|o| o.object_id.to_string()),
            has_next_page: end < owned.len(),
            data,
        })
    }

    async fn get_object(&self, id: &ObjectId, _options: ContentOptions) -> AppResult<LedgerObject> {
        let delay = {
            let mut state = self.state.write().await;
            *state.fetch_counts.entry(id.clone()).or_insert(0) += 1;
            state.delays.get(id).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().await;
        if state.failing.contains(id) {
            return Err(AppError::Network(format!("fetch of {} failed", id)));
        }
        state
            .objects
            .get(id)
            .map(|s| s.object.clone())
            .ok_or_else(|| AppError::NotFound(format!("object {}", id)))
    }

    async fn query_events(&self, filter: &EventFilter) -> AppResult<Vec<LedgerEvent>> {
        let state = self.state.read().await;
        let EventFilter::MoveEventType(event_type) = filter;
        Ok(state
            .events
            .iter()
            .filter(|e| &e.event_type == event_type)
            .cloned()
            .collect())
    }
}

/// Signs as one fixed address against an `InMemoryLedger`
#[derive(Clone)]
pub struct InMemorySigner {
    ledger: InMemoryLedger,
    sender: Address,
}

impl InMemorySigner {
    pub fn sender(&self) -> &Address {
        &self.sender
    }
}

#[async_trait]
impl TransactionSigner for InMemorySigner {
    async fn sign_and_execute(&self, intent: &TransactionIntent) -> AppResult<TransactionReceipt> {
        self.ledger.execute(&self.sender, intent).await
    }
}

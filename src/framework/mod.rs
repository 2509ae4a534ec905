// Aggregation Framework - Classification, projection, joins and page flows

pub mod classifier;  // Type-tag partitioning of owned objects
pub mod projection;  // Raw fields -> typed records
pub mod resolver;    // Attendance -> event joins
pub mod intent;      // Contract-call intents
pub mod store;       // Per-page view-model state
pub mod session;     // Page flows for one address

pub use classifier::{ClassifiedObjects, HostReferences, ObjectClassifier, ObjectKind, TypeTags};
pub use projection::{ContractObject, FieldProjector};
pub use resolver::{CrossReferenceResolver, FetchOutcomes, JoinPolicy};
pub use intent::{ContractFunction, IntentArgument, IntentBuilder, TransactionIntent};
pub use store::{LoadStatus, RefreshTicket, ViewModelStore};
pub use session::{AggregationSession, SessionOptions};

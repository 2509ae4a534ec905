// Infrastructure modules
pub mod ledger;     // Ledger client interface and wire types
pub mod json_rpc;   // Fullnode JSON-RPC client
pub mod in_memory;  // In-process ledger and signer
pub mod signer;     // Signing and submission interface
pub mod scope;      // View-lifetime cancellation

pub use ledger::{
    ContentOptions, EventFilter, LedgerClient, LedgerEvent, LedgerObject, OwnedObjectsPage,
    PageRequest,
};
pub use json_rpc::JsonRpcLedgerClient;
pub use in_memory::{InMemoryLedger, InMemorySigner};
pub use signer::{TransactionReceipt, TransactionSigner};
pub use scope::{ScopeToken, ViewScope};

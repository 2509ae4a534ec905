// Signer - The external signing and submission collaborator

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::ObjectId;
use crate::error::AppResult;
use crate::framework::intent::TransactionIntent;

/// What the signer reports back after a transaction executed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub digest: String,
    #[serde(default)]
    pub created: Vec<ObjectId>,
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    /// Sign, submit and wait for execution; errors are reported once, never retried
    async fn sign_and_execute(&self, intent: &TransactionIntent) -> AppResult<TransactionReceipt>;
}

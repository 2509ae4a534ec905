use std::sync::Arc;
use crate::{
    config::Config,
    core::Address,
    error::AppResult,
    framework::session::AggregationSession,
    infrastructure::{JsonRpcLedgerClient, LedgerClient},
};

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerClient>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = JsonRpcLedgerClient::new(config.rpc_url(), config.rpc_timeout())?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    pub fn with_client(config: Config, ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger, config }
    }

    /// A fresh aggregation session for the connected address
    pub fn session(&self, owner: Address) -> AppResult<AggregationSession> {
        Ok(AggregationSession::new(
            owner,
            Arc::clone(&self.ledger),
            self.config.package()?,
            self.config.session_options(),
        ))
    }
}

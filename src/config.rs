use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::core::{ContractPackage, Network};
use crate::error::{AppError, AppResult};
use crate::framework::session::{SessionOptions, DEFAULT_PAGE_LIMIT};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub network: Network,
    /// Overrides the network's public fullnode
    pub rpc_url: Option<String>,
    pub package_id: String,
    pub package_name: String,
    pub owned_object_limit: usize,
    pub owned_object_pages: usize,
    pub rpc_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let network = match env::var("LEDGER_NETWORK") {
            Ok(raw) => raw.parse::<Network>()?,
            Err(_) => Network::default(),
        };

        Ok(Self {
            ledger: LedgerConfig {
                network,
                rpc_url: env::var("LEDGER_RPC_URL").ok().filter(|u| !u.trim().is_empty()),
                package_id: env::var("PACKAGE_ID").unwrap_or_default(),
                package_name: env::var("PACKAGE_NAME")
                    .unwrap_or_else(|_| "attendance".to_string()),
                owned_object_limit: parsed("OWNED_OBJECT_LIMIT", DEFAULT_PAGE_LIMIT).max(1),
                owned_object_pages: parsed("OWNED_OBJECT_PAGES", 1usize).max(1),
                rpc_timeout_secs: parsed("RPC_TIMEOUT_SECS", 30u64),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST")
                    .unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parsed("SERVER_PORT", 3000u16),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn rpc_url(&self) -> String {
        self.ledger
            .rpc_url
            .clone()
            .unwrap_or_else(|| self.ledger.network.fullnode_url().to_string())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.ledger.rpc_timeout_secs)
    }

    /// The deployed contract package; `PACKAGE_ID` has no usable default
    pub fn package(&self) -> AppResult<ContractPackage> {
        if self.ledger.package_id.trim().is_empty() {
            return Err(AppError::ConfigurationError("PACKAGE_ID is not set".to_string()));
        }
        Ok(ContractPackage::new(
            self.ledger.package_id.trim(),
            self.ledger.package_name.trim(),
        ))
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            page_limit: self.ledger.owned_object_limit,
            max_pages: self.ledger.owned_object_pages,
            ..Default::default()
        }
    }
}

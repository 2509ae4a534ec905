// JSON-RPC Ledger Client - LedgerClient backed by a fullnode's JSON-RPC endpoint

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::core::{Address, Network, ObjectId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::ledger::{
    ContentOptions, EventFilter, LedgerClient, LedgerEvent, LedgerObject, OwnedObjectsPage,
    PageRequest,
};

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

/// Per-object response: either `data` or an `error` such as `notExists`
#[derive(Debug, Deserialize)]
struct ObjectResponse {
    data: Option<LedgerObject>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOwnedPage {
    data: Vec<ObjectResponse>,
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
struct RawEventPage {
    data: Vec<LedgerEvent>,
}

fn decode_envelope<T: DeserializeOwned>(method: &str, body: Value) -> AppResult<T> {
    let envelope: RpcEnvelope<T> = serde_json::from_value(body)?;
    if let Some(err) = envelope.error {
        return Err(AppError::Rpc {
            code: err.code,
            message: format!("{}: {}", method, err.message),
        });
    }
    envelope
        .result
        .ok_or_else(|| AppError::DeserializationError(format!("{} returned no result", method)))
}

fn into_object(response: ObjectResponse, id: &ObjectId) -> AppResult<LedgerObject> {
    match response.data {
        Some(object) => Ok(object),
        None => Err(AppError::NotFound(format!(
            "object {} ({})",
            id,
            response.error.unwrap_or(Value::Null)
        ))),
    }
}

fn into_page(raw: RawOwnedPage) -> OwnedObjectsPage {
    let data = raw
        .data
        .into_iter()
        .filter_map(|response| {
            if response.data.is_none() {
                debug!("Skipping owned object entry with error: {:?}", response.error);
            }
            response.data
        })
        .collect();
    OwnedObjectsPage {
        data,
        next_cursor: raw.next_cursor,
        has_next_page: raw.has_next_page,
    }
}

/// Ledger client talking to a fullnode over HTTP
pub struct JsonRpcLedgerClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl JsonRpcLedgerClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn for_network(network: Network, timeout: Duration) -> AppResult<Self> {
        Self::new(network.fullnode_url(), timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> AppResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("RPC {} #{} -> {}", method, id, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Network(format!(
                "{} returned HTTP {}",
                method,
                status.as_u16()
            )));
        }

        let body: Value = response.json().await?;
        decode_envelope(method, body)
    }
}

#[async_trait]
impl LedgerClient for JsonRpcLedgerClient {
    async fn list_owned_objects(
        &self,
        owner: &Address,
        page: PageRequest,
        options: ContentOptions,
    ) -> AppResult<OwnedObjectsPage> {
        let raw: RawOwnedPage = self
            .call(
                "suix_getOwnedObjects",
                json!([
                    owner.as_str(),
                    { "filter": null, "options": options },
                    page.cursor,
                    page.limit,
                ]),
            )
            .await?;
        Ok(into_page(raw))
    }

    async fn get_object(&self, id: &ObjectId, options: ContentOptions) -> AppResult<LedgerObject> {
        let response: ObjectResponse = self
            .call("sui_getObject", json!([id.as_str(), options]))
            .await?;
        into_object(response, id)
    }

    async fn query_events(&self, filter: &EventFilter) -> AppResult<Vec<LedgerEvent>> {
        let page: RawEventPage = self
            .call("suix_queryEvents", json!([filter, null, null, false]))
            .await?;
        Ok(page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_is_surfaced() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "Invalid params" }
        });
        let result: AppResult<Value> = decode_envelope("sui_getObject", body);
        match result {
            Err(AppError::Rpc { code, message }) => {
                assert_eq!(code, -32602);
                assert!(message.contains("sui_getObject"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_object_maps_to_not_found() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 2,
            "result": { "error": { "code": "notExists", "object_id": "0x9" } }
        });
        let response: ObjectResponse = decode_envelope("sui_getObject", body).unwrap();
        let err = into_object(response, &ObjectId::from("0x9")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_owned_page_skips_error_entries() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 3,
            "result": {
                "data": [
                    { "data": { "objectId": "0x1", "content": { "type": "0x2::m::T", "fields": {} } } },
                    { "error": { "code": "deleted" } }
                ],
                "nextCursor": "0x1",
                "hasNextPage": false
            }
        });
        let raw: RawOwnedPage = decode_envelope("suix_getOwnedObjects", body).unwrap();
        let page = into_page(raw);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].type_tag(), Some("0x2::m::T"));
        assert_eq!(page.next_cursor.as_deref(), Some("0x1"));
    }

    #[test]
    fn test_client_uses_network_endpoint() {
        let client = JsonRpcLedgerClient::for_network(Network::Devnet, Duration::from_secs(5)).unwrap();
        assert_eq!(client.endpoint(), Network::Devnet.fullnode_url());
    }
}

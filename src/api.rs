// Event API - Placeholder HTTP endpoints served next to the dashboard
//
// Neither endpoint touches the ledger: creation only logs the payload and the
// listing returns fixed records.

use axum::{
    extract::Query,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{AppError, AppResult};

/// Event payload as the dashboard's forms send it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventPayload {
    pub event_name: String,
    pub host_name: String,
    pub date: String,
    pub location: String,
    pub description: String,
}

impl EventPayload {
    fn fixture(n: u32, date: &str) -> Self {
        Self {
            event_name: format!("Event {}", n),
            host_name: format!("Host {}", n),
            date: date.to_string(),
            location: format!("Location {}", n),
            description: format!("Description {}", n),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HostQuery {
    #[serde(rename = "hostId")]
    pub host_id: Option<String>,
}

pub async fn create_event_handler(Json(payload): Json<EventPayload>) -> AppResult<Json<Value>> {
    info!(
        "Create event request: name={:?} host={:?} date={:?} location={:?} description={:?}",
        payload.event_name, payload.host_name, payload.date, payload.location, payload.description
    );
    Ok(Json(json!({
        "message": "Event created successfully",
        "data": []
    })))
}

pub async fn get_events_handler(Query(params): Query<HostQuery>) -> AppResult<Json<Value>> {
    let host_id = params
        .host_id
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::BadRequest("Host ID is required".to_string()))?;
    info!("Listing events for host {}", host_id);

    let data = vec![
        EventPayload::fixture(1, "2025-07-01"),
        EventPayload::fixture(2, "2025-08-02"),
    ];
    Ok(Json(json!({
        "message": "Events retrieved successfully",
        "data": data
    })))
}

pub fn create_api_router() -> Router {
    Router::new()
        .route("/api/event/create", post(create_event_handler))
        .route("/api/event/get", get(get_events_handler))
}

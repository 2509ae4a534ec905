// Event Attendance Server - Serves the dashboard's placeholder event API

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use event_attendance::{api::create_api_router, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let app = Router::new()
        .merge(create_api_router())
        .layer(CorsLayer::permissive());

    let addr = config.server_address();
    info!("Event attendance server starting on http://{}", addr);
    info!("  POST /api/event/create         - Create event (logged only)");
    info!("  GET  /api/event/get?hostId=... - List events for a host");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! milkline portal server: the staff-facing approval and reconciliation API.

mod api;
mod error;
mod events;
mod state;

use std::sync::Arc;

use milkline_core::reconciliation::ApprovalService;
use milkline_remote::{RemoteClient, RemoteDataGateway, StaticTokenProvider};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::events::EventBus;
use crate::state::AppState;

const DEFAULT_DATA_API_URL: &str = "https://api.milkline.app";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

fn data_api_base_url() -> String {
    std::env::var("MILKLINE_API_URL")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_API_URL.to_string())
}

fn bind_addr() -> String {
    std::env::var("MILKLINE_BIND_ADDR")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}

fn service_token() -> anyhow::Result<String> {
    std::env::var("MILKLINE_SERVICE_TOKEN")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow::anyhow!("MILKLINE_SERVICE_TOKEN must be set"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let token = service_token()?;
    let gateway = Arc::new(RemoteDataGateway::new(
        RemoteClient::new(&data_api_base_url()),
        Arc::new(StaticTokenProvider::new(token)),
    ));
    let approval_service = Arc::new(ApprovalService::new(
        gateway.clone(),
        gateway.clone(),
        gateway,
    ));

    let state = AppState {
        approval_service,
        event_bus: EventBus::new(),
    };

    let addr = bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("milkline portal server listening on {}", addr);
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}

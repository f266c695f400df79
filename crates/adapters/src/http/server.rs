use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use super::state::AppState;
use super::status_handler;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(status_handler::ping))
        .route("/status", get(status_handler::status))
        .route("/alerts", get(status_handler::alerts))
        .route("/reload_config", post(status_handler::reload_config))
        .with_state(state)
}

/// Run the status HTTP server until `shutdown` resolves, draining
/// in-flight connections before returning.
pub async fn run_http_server(
    state: Arc<AppState>,
    bind_address: &str,
    port: u16,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("{bind_address}:{port}")).await?;
    tracing::info!(%bind_address, port, "status server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

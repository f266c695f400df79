use std::sync::Arc;

use application::delivery::RouteTable;
use application::status::RuntimeStatus;
use ports::secondary::alert_log::AlertLog;
use ports::secondary::dedupe_store::DedupeStore;
use tokio::sync::mpsc;

/// Shared state for the status HTTP surface.
///
/// Passed to Axum handlers via `State(Arc<AppState>)`. Everything here
/// is a read-only view; the only write path is the reload trigger.
pub struct AppState {
    pub status: Arc<RuntimeStatus>,
    pub dedupe: Arc<dyn DedupeStore>,
    pub alert_log: Arc<dyn AlertLog>,
    pub routes: RouteTable,
    /// Signals the agent to re-read and apply the config file.
    pub reload_tx: mpsc::Sender<()>,
    pub probe_client: reqwest::Client,
    pub version: &'static str,
}

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use domain::format::locale::DEFAULT_TZ;
use serde::{Deserialize, Serialize};

use super::state::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub uptime_seconds: i64,
}

/// Liveness endpoint.
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "OK",
        message: "The server is running!",
        version: state.version,
        uptime_seconds: state.status.uptime_seconds(),
    })
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub active_alerts: usize,
    pub webhook_status: BTreeMap<String, String>,
    pub last_nws_fetch: String,
    pub uptime_seconds: i64,
}

/// Full status: notified-alert count, per-destination reachability,
/// last successful fetch and uptime.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let mut webhook_status = BTreeMap::new();
    let routes = state.routes.read().await.clone();
    for (category, route) in routes {
        let health = probe_webhook(&state.probe_client, &route.webhook_url).await;
        webhook_status.insert(category.to_string(), health);
    }

    let last_nws_fetch = match state.status.last_fetch().await {
        Some(instant) => instant.to_rfc3339(),
        None => "Never".to_string(),
    };

    Json(StatusResponse {
        active_alerts: state.dedupe.len().unwrap_or(0),
        webhook_status,
        last_nws_fetch,
        uptime_seconds: state.status.uptime_seconds(),
    })
}

async fn probe_webhook(client: &reqwest::Client, url: &str) -> String {
    match client.get(url).timeout(PROBE_TIMEOUT).send().await {
        Ok(response) if response.status().is_success() => "Healthy".to_string(),
        Ok(response) => format!("Failed ({})", response.status().as_u16()),
        Err(e) => format!("Error: {e}"),
    }
}

#[derive(Deserialize)]
pub struct AlertsQuery {
    /// Day filter, "YYYY-MM-DD". Defaults to today.
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<domain::alert::entity::LoggedAlert>,
    pub count: usize,
}

/// Delivered-alert history for one day.
pub async fn alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlertsQuery>,
) -> impl IntoResponse {
    let date = query.date.unwrap_or_else(|| {
        Utc::now()
            .with_timezone(&DEFAULT_TZ)
            .format("%Y-%m-%d")
            .to_string()
    });
    match state.alert_log.entries() {
        Ok(entries) => {
            let alerts: Vec<_> = entries
                .into_iter()
                .filter(|e| e.timestamp.starts_with(&date))
                .collect();
            let count = alerts.len();
            (StatusCode::OK, Json(AlertsResponse { alerts, count })).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to read alert log");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "status": "Error", "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

#[derive(Serialize)]
pub struct ReloadResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Ask the agent to re-read the config file and apply it.
pub async fn reload_config(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReloadResponse>) {
    match state.reload_tx.send(()).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ReloadResponse {
                status: "Success",
                message: "Configuration reload triggered",
            }),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ReloadResponse {
                status: "Error",
                message: "Reload channel closed",
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::yaml_alert_log::YamlAlertLog;
    use application::status::RuntimeStatus;
    use domain::alert::entity::{DedupeEntry, LoggedAlert, NotificationCategory};
    use domain::alert::error::AlertError;
    use ports::secondary::alert_log::AlertLog;
    use ports::secondary::dedupe_store::DedupeStore;
    use std::collections::HashMap;
    use tempfile::TempDir;
    use tokio::sync::{mpsc, RwLock};

    struct EmptyDedupe;
    impl DedupeStore for EmptyDedupe {
        fn has_sent(&self, _alert_id: &str) -> Result<bool, AlertError> {
            Ok(false)
        }
        fn category_of(
            &self,
            _alert_id: &str,
        ) -> Result<Option<NotificationCategory>, AlertError> {
            Ok(None)
        }
        fn record(&self, _alert_id: &str, _entry: DedupeEntry) -> Result<(), AlertError> {
            Ok(())
        }
        fn len(&self) -> Result<usize, AlertError> {
            Ok(3)
        }
    }

    fn state(log: Arc<dyn AlertLog>) -> (Arc<AppState>, mpsc::Receiver<()>) {
        let (reload_tx, reload_rx) = mpsc::channel(1);
        let state = Arc::new(AppState {
            status: Arc::new(RuntimeStatus::new()),
            dedupe: Arc::new(EmptyDedupe),
            alert_log: log,
            routes: Arc::new(RwLock::new(HashMap::new())),
            reload_tx,
            probe_client: reqwest::Client::new(),
            version: "test",
        });
        (state, reload_rx)
    }

    fn temp_log(dir: &TempDir) -> Arc<YamlAlertLog> {
        Arc::new(YamlAlertLog::new(&dir.path().join("alerts.yml"), dir.path()))
    }

    #[tokio::test]
    async fn ping_reports_ok_and_uptime() {
        let dir = TempDir::new().unwrap();
        let (state, _rx) = state(temp_log(&dir));
        let response = ping(State(state)).await;
        assert_eq!(response.status, "OK");
        assert!(response.uptime_seconds >= 0);
    }

    #[tokio::test]
    async fn status_counts_notified_alerts() {
        let dir = TempDir::new().unwrap();
        let (state, _rx) = state(temp_log(&dir));
        let response = status(State(state)).await;
        assert_eq!(response.active_alerts, 3);
        assert_eq!(response.last_nws_fetch, "Never");
        assert!(response.webhook_status.is_empty());
    }

    #[tokio::test]
    async fn alerts_filters_by_date() {
        let dir = TempDir::new().unwrap();
        let log = temp_log(&dir);
        log.append(&LoggedAlert {
            timestamp: "2024-07-04 18:00:00".to_string(),
            event: "Tornado Warning".to_string(),
            location: "Wayne, MI".to_string(),
            details: String::new(),
            url: String::new(),
        })
        .unwrap();
        log.append(&LoggedAlert {
            timestamp: "2024-07-05 10:00:00".to_string(),
            event: "Heat Advisory".to_string(),
            location: "Wayne, MI".to_string(),
            details: String::new(),
            url: String::new(),
        })
        .unwrap();

        let (state, _rx) = state(log);
        let response = alerts(
            State(state),
            Query(AlertsQuery {
                date: Some("2024-07-04".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn reload_signals_agent() {
        let dir = TempDir::new().unwrap();
        let (state, mut rx) = state(temp_log(&dir));
        let (code, _) = reload_config(State(state)).await;
        assert_eq!(code, StatusCode::OK);
        assert!(rx.try_recv().is_ok());
    }
}

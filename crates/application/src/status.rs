use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// Read-only runtime snapshot shared with the status surface.
///
/// Only the poll loop writes here; every other task reads.
pub struct RuntimeStatus {
    started_at: DateTime<Utc>,
    last_fetch: RwLock<Option<DateTime<Utc>>>,
}

impl RuntimeStatus {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            last_fetch: RwLock::new(None),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    pub async fn record_fetch(&self) {
        *self.last_fetch.write().await = Some(Utc::now());
    }

    pub async fn last_fetch(&self) -> Option<DateTime<Utc>> {
        *self.last_fetch.read().await
    }
}

impl Default for RuntimeStatus {
    fn default() -> Self {
        Self::new()
    }
}

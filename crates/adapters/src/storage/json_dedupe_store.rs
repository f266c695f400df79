use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use domain::alert::entity::{DedupeEntry, NotificationCategory};
use domain::alert::error::AlertError;
use ports::secondary::dedupe_store::DedupeStore;
use serde::{Deserialize, Serialize};

/// File-backed dedupe map. The whole map lives in memory and the file
/// is rewritten on every update.
pub struct JsonDedupeStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, DedupeEntry>>,
}

#[derive(Default, Serialize, Deserialize)]
struct PersistedDedupe {
    alerts: HashMap<String, DedupeEntry>,
}

impl JsonDedupeStore {
    /// Open the store, loading any existing file. A corrupt file is
    /// logged and replaced on the next write rather than aborting.
    pub fn open(path: &Path) -> Result<Self, AlertError> {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<PersistedDedupe>(&raw) {
                Ok(persisted) => persisted.alerts,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt dedupe file, starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(AlertError::LoadFailed(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        tracing::info!(path = %path.display(), count = entries.len(), "loaded sent-alert history");
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, DedupeEntry>) -> Result<(), AlertError> {
        let persisted = PersistedDedupe {
            alerts: entries.clone(),
        };
        let raw = serde_json::to_string(&persisted)
            .map_err(|e| AlertError::StoreFailed(format!("serialize dedupe map: {e}")))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| AlertError::StoreFailed(format!("write {}: {e}", self.path.display())))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, DedupeEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DedupeStore for JsonDedupeStore {
    fn has_sent(&self, alert_id: &str) -> Result<bool, AlertError> {
        Ok(self.lock().contains_key(alert_id))
    }

    fn category_of(&self, alert_id: &str) -> Result<Option<NotificationCategory>, AlertError> {
        Ok(self.lock().get(alert_id).map(|e| e.category))
    }

    fn record(&self, alert_id: &str, entry: DedupeEntry) -> Result<(), AlertError> {
        let mut entries = self.lock();
        entries.insert(alert_id.to_string(), entry);
        self.persist(&entries)
    }

    fn len(&self) -> Result<usize, AlertError> {
        Ok(self.lock().len())
    }
}

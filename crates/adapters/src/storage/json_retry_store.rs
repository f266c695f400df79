use std::path::{Path, PathBuf};
use std::sync::Mutex;

use domain::alert::entity::PendingDelivery;
use domain::alert::error::AlertError;
use ports::secondary::retry_store::RetryStore;

/// File-backed retry queue, rewritten in full on every change so a
/// restart resumes with the same pending deliveries.
pub struct JsonRetryStore {
    path: PathBuf,
    queue: Mutex<Vec<PendingDelivery>>,
}

impl JsonRetryStore {
    pub fn open(path: &Path) -> Result<Self, AlertError> {
        let queue = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<PendingDelivery>>(&raw) {
                Ok(queue) => queue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt retry file, starting empty");
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(AlertError::LoadFailed(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        if !queue.is_empty() {
            tracing::info!(path = %path.display(), count = queue.len(), "loaded pending deliveries");
        }
        Ok(Self {
            path: path.to_path_buf(),
            queue: Mutex::new(queue),
        })
    }

    fn persist(&self, queue: &[PendingDelivery]) -> Result<(), AlertError> {
        let raw = serde_json::to_string(queue)
            .map_err(|e| AlertError::StoreFailed(format!("serialize retry queue: {e}")))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| AlertError::StoreFailed(format!("write {}: {e}", self.path.display())))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PendingDelivery>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RetryStore for JsonRetryStore {
    fn enqueue(&self, pending: PendingDelivery) -> Result<(), AlertError> {
        let mut queue = self.lock();
        queue.push(pending);
        self.persist(&queue)
    }

    fn drain(&self) -> Result<Vec<PendingDelivery>, AlertError> {
        let mut queue = self.lock();
        let drained = std::mem::take(&mut *queue);
        self.persist(&queue)?;
        Ok(drained)
    }

    fn len(&self) -> Result<usize, AlertError> {
        Ok(self.lock().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::alert::entity::{AlertRecord, AlertStatus, MessageType, NotificationCategory};
    use tempfile::TempDir;

    fn pending(id: &str) -> PendingDelivery {
        PendingDelivery {
            category: NotificationCategory::TornadoWarning,
            record: AlertRecord {
                id: id.to_string(),
                event: "Tornado Warning".to_string(),
                status: AlertStatus::Actual,
                message_type: MessageType::Alert,
                headline: String::new(),
                description: "storm".to_string(),
                area_desc: "Wayne, MI".to_string(),
                sent_at: None,
                expires_at: None,
                sender_name: "NWS".to_string(),
                source_url: "https://example.test".to_string(),
            },
            tornado_possible: false,
            is_update: false,
            enqueued_at: Utc::now(),
        }
    }

    #[test]
    fn enqueue_then_drain_empties_queue() {
        let dir = TempDir::new().unwrap();
        let store = JsonRetryStore::open(&dir.path().join("retry.json")).unwrap();

        store.enqueue(pending("r1")).unwrap();
        store.enqueue(pending("r2")).unwrap();
        assert_eq!(store.len().unwrap(), 2);

        let drained = store.drain().unwrap();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].record.id, "r1");
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn queue_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retry.json");
        {
            let store = JsonRetryStore::open(&path).unwrap();
            store.enqueue(pending("r1")).unwrap();
        }
        let store = JsonRetryStore::open(&path).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn drain_persists_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("retry.json");
        {
            let store = JsonRetryStore::open(&path).unwrap();
            store.enqueue(pending("r1")).unwrap();
            store.drain().unwrap();
        }
        let store = JsonRetryStore::open(&path).unwrap();
        assert!(store.is_empty().unwrap());
    }
}

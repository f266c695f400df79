use std::path::{Path, PathBuf};
use std::sync::Mutex;

use domain::alert::entity::CategoryGroup;
use domain::alert::error::AlertError;
use domain::sequence::SequenceCounters;
use ports::secondary::counter_store::CounterStore;

/// File-backed sequence counters.
///
/// Assignment always succeeds against the in-memory counters; a failed
/// persist is logged and retried implicitly on the next assignment.
/// Losing the latest value on crash is preferred over skipping a
/// notification.
pub struct JsonCounterStore {
    path: PathBuf,
    counters: Mutex<SequenceCounters>,
}

impl JsonCounterStore {
    pub fn open(path: &Path) -> Result<Self, AlertError> {
        let counters = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<SequenceCounters>(&raw) {
                Ok(counters) => counters,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt counter file, starting fresh");
                    SequenceCounters::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SequenceCounters::new(),
            Err(e) => {
                return Err(AlertError::LoadFailed(format!(
                    "read {}: {e}",
                    path.display()
                )));
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            counters: Mutex::new(counters),
        })
    }

    fn persist(&self, counters: &SequenceCounters) {
        let raw = match serde_json::to_string(counters) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(error = %e, "serialize counters failed");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, raw) {
            tracing::error!(path = %self.path.display(), error = %e, "persist counters failed");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SequenceCounters> {
        self.counters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CounterStore for JsonCounterStore {
    fn next(&self, group: Option<CategoryGroup>) -> Result<String, AlertError> {
        let mut counters = self.lock();
        let tag = counters.assign(group);
        if group.is_some() {
            self.persist(&counters);
        }
        Ok(tag)
    }

    fn current(&self, group: CategoryGroup) -> Result<u64, AlertError> {
        Ok(self.lock().current(group))
    }
}

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use domain::alert::entity::LoggedAlert;
use domain::alert::error::AlertError;
use domain::format::locale::DEFAULT_TZ;
use ports::secondary::alert_log::AlertLog;

/// Audit trail: a YAML list of structured entries plus a per-day
/// plain-text file (`alerts_YYYY-MM-DD.txt`) in `text_dir`.
pub struct YamlAlertLog {
    yaml_path: PathBuf,
    text_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl YamlAlertLog {
    pub fn new(yaml_path: &Path, text_dir: &Path) -> Self {
        Self {
            yaml_path: yaml_path.to_path_buf(),
            text_dir: text_dir.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_entries(&self) -> Vec<LoggedAlert> {
        match std::fs::read_to_string(&self.yaml_path) {
            Ok(raw) => match serde_yaml_ng::from_str::<Vec<LoggedAlert>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %self.yaml_path.display(), error = %e, "corrupt alert log, starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        }
    }

    fn append_text(&self, entry: &LoggedAlert) -> Result<(), AlertError> {
        let today = Utc::now().with_timezone(&DEFAULT_TZ).format("%Y-%m-%d");
        let path = self.text_dir.join(format!("alerts_{today}.txt"));
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| AlertError::LogFailed(format!("open {}: {e}", path.display())))?;
        writeln!(file, "{} - {} [{}]", entry.timestamp, entry.event, entry.location)
            .and_then(|()| writeln!(file, "Details: {}", entry.details))
            .and_then(|()| writeln!(file, "{}", "=".repeat(50)))
            .map_err(|e| AlertError::LogFailed(format!("write {}: {e}", path.display())))
    }
}

impl AlertLog for YamlAlertLog {
    fn append(&self, entry: &LoggedAlert) -> Result<(), AlertError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut entries = self.read_entries();
        entries.push(entry.clone());
        let raw = serde_yaml_ng::to_string(&entries)
            .map_err(|e| AlertError::LogFailed(format!("serialize alert log: {e}")))?;
        std::fs::write(&self.yaml_path, raw).map_err(|e| {
            AlertError::LogFailed(format!("write {}: {e}", self.yaml_path.display()))
        })?;
        self.append_text(entry)
    }

    fn entries(&self) -> Result<Vec<LoggedAlert>, AlertError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.read_entries())
    }
}

use domain::alert::entity::LoggedAlert;
use domain::alert::error::AlertError;

/// Append-only audit trail of delivered notifications.
///
/// Backed by a structured log (read back for summaries and the status
/// surface) plus a per-day plain-text file.
pub trait AlertLog: Send + Sync {
    /// Append one delivered alert to both the structured log and the
    /// daily text file.
    fn append(&self, entry: &LoggedAlert) -> Result<(), AlertError>;

    /// All structured entries, oldest first.
    fn entries(&self) -> Result<Vec<LoggedAlert>, AlertError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyLog;
    impl AlertLog for DummyLog {
        fn append(&self, _entry: &LoggedAlert) -> Result<(), AlertError> {
            Ok(())
        }
        fn entries(&self) -> Result<Vec<LoggedAlert>, AlertError> {
            Ok(vec![])
        }
    }

    #[test]
    fn alert_log_is_dyn_compatible() {
        let log: Box<dyn AlertLog> = Box::new(DummyLog);
        assert!(log.entries().unwrap().is_empty());
    }
}

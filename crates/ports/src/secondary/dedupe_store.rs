use domain::alert::entity::{DedupeEntry, NotificationCategory};
use domain::alert::error::AlertError;

/// Durable record of which alert ids have already been notified.
///
/// Implementations load the full map at startup and rewrite it on
/// every update.
pub trait DedupeStore: Send + Sync {
    /// Whether this alert id has already produced a notification.
    fn has_sent(&self, alert_id: &str) -> Result<bool, AlertError>;

    /// Category the alert id was last notified as, if any.
    fn category_of(&self, alert_id: &str) -> Result<Option<NotificationCategory>, AlertError>;

    /// Record a successful notification and persist the updated map.
    fn record(&self, alert_id: &str, entry: DedupeEntry) -> Result<(), AlertError>;

    /// Number of recorded notifications.
    fn len(&self) -> Result<usize, AlertError>;

    fn is_empty(&self) -> Result<bool, AlertError> {
        Ok(self.len()? == 0)
    }
}

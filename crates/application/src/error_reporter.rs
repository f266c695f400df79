use std::sync::Arc;
use std::time::{Duration, Instant};

use ports::secondary::notifier::Notifier;
use tokio::sync::Mutex;

/// Default cooldown between operator-facing error notices.
pub const ERROR_COOLDOWN: Duration = Duration::from_secs(60);

/// Publishes error notices to the operations webhook, globally rate
/// limited. Suppressed notices are only logged locally.
pub struct ErrorReporter {
    notifier: Arc<dyn Notifier>,
    webhook_url: String,
    cooldown: Duration,
    last_sent: Mutex<Option<Instant>>,
}

impl ErrorReporter {
    pub fn new(notifier: Arc<dyn Notifier>, webhook_url: String) -> Self {
        Self::with_cooldown(notifier, webhook_url, ERROR_COOLDOWN)
    }

    pub fn with_cooldown(
        notifier: Arc<dyn Notifier>,
        webhook_url: String,
        cooldown: Duration,
    ) -> Self {
        Self {
            notifier,
            webhook_url,
            cooldown,
            last_sent: Mutex::new(None),
        }
    }

    pub async fn report(&self, message: &str) {
        let mut last_sent = self.last_sent.lock().await;
        let now = Instant::now();
        if let Some(last) = *last_sent {
            if now.duration_since(last) < self.cooldown {
                tracing::debug!(message, "error notice rate limited");
                return;
            }
        }
        let content = format!("Error: {message}");
        match self
            .notifier
            .publish_text(&self.webhook_url, &content)
            .await
        {
            Ok(()) => *last_sent = Some(now),
            Err(e) => tracing::warn!(error = %e, "failed to publish error notice"),
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use ports::secondary::notifier::Notifier;
use rand::seq::IndexedRandom;
use tokio_util::sync::CancellationToken;

const HEALTH_TITLE: &str = "🟢 Stormwatch Health Check";
const HEALTH_COLOR: u32 = 0x00FF00;
const HEALTH_INTERVAL: Duration = Duration::from_secs(6 * 3600);

const HEALTH_MESSAGES: [&str; 7] = [
    "All systems nominal.",
    "Stormwatch is running smoothly!",
    "Everything's looking good here.",
    "No issues detected, all clear!",
    "Systems are green across the board.",
    "Stormwatch is fully operational.",
    "Health check passed with flying colors!",
];

/// Posts a liveness card to the operations webhook every six hours,
/// starting immediately.
pub struct HealthTask {
    notifier: Arc<dyn Notifier>,
    webhook_url: String,
}

impl HealthTask {
    pub fn new(notifier: Arc<dyn Notifier>, webhook_url: String) -> Self {
        Self {
            notifier,
            webhook_url,
        }
    }

    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            self.ping().await;
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("health task stopping");
                    break;
                }
                () = tokio::time::sleep(HEALTH_INTERVAL) => {}
            }
        }
    }

    async fn ping(&self) {
        let message = HEALTH_MESSAGES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(HEALTH_MESSAGES[0]);
        match self
            .notifier
            .publish_card(&self.webhook_url, HEALTH_TITLE, message, HEALTH_COLOR)
            .await
        {
            Ok(()) => tracing::debug!(message, "health ping sent"),
            Err(e) => tracing::warn!(error = %e, "failed to send health ping"),
        }
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use domain::alert::entity::{CategoryRoute, DedupeEntry, LoggedAlert, NotificationCategory, PendingDelivery};
use domain::format::locale::local_timestamp;
use domain::format::message::{build_notification, FormatRequest};
use ports::secondary::alert_log::AlertLog;
use ports::secondary::counter_store::CounterStore;
use ports::secondary::dedupe_store::DedupeStore;
use ports::secondary::notifier::Notifier;
use ports::secondary::retry_store::RetryStore;
use tokio::sync::RwLock;

use crate::error_reporter::ErrorReporter;

/// Category to destination routing table, swappable on config reload.
pub type RouteTable = Arc<RwLock<HashMap<NotificationCategory, CategoryRoute>>>;

/// Renders and publishes one classified alert, maintaining the dedupe
/// store, audit log and retry queue around the publish.
pub struct DeliveryService {
    notifier: Arc<dyn Notifier>,
    dedupe: Arc<dyn DedupeStore>,
    counters: Arc<dyn CounterStore>,
    alert_log: Arc<dyn AlertLog>,
    retry: Arc<dyn RetryStore>,
    reporter: Arc<ErrorReporter>,
    routes: RouteTable,
}

impl DeliveryService {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        dedupe: Arc<dyn DedupeStore>,
        counters: Arc<dyn CounterStore>,
        alert_log: Arc<dyn AlertLog>,
        retry: Arc<dyn RetryStore>,
        reporter: Arc<ErrorReporter>,
        routes: RouteTable,
    ) -> Self {
        Self {
            notifier,
            dedupe,
            counters,
            alert_log,
            retry,
            reporter,
            routes,
        }
    }

    /// Deliver one notification. On success the dedupe store and audit
    /// log are updated; on failure the item is queued for retry.
    /// Returns whether the publish succeeded.
    pub async fn deliver(&self, delivery: &PendingDelivery) -> bool {
        let route = {
            self.routes
                .read()
                .await
                .get(&delivery.category)
                .cloned()
        };
        let Some(route) = route else {
            // Routing changed under us after classification. Drop
            // rather than retry forever against nothing.
            tracing::warn!(
                category = %delivery.category,
                alert_id = %delivery.record.id,
                "no destination configured, dropping"
            );
            return true;
        };

        let sequence = match self.counters.next(Some(delivery.category.group())) {
            Ok(sequence) => sequence,
            Err(e) => {
                tracing::error!(error = %e, "sequence assignment failed");
                domain::sequence::UNKNOWN_SEQUENCE.to_string()
            }
        };

        let batch = build_notification(&FormatRequest {
            category: delivery.category,
            record: &delivery.record,
            tornado_possible: delivery.tornado_possible,
            is_update: delivery.is_update,
            sequence: &sequence,
            style: &route.style,
        });

        match self.notifier.publish(&route.webhook_url, &batch).await {
            Ok(()) => {
                self.mark_sent(delivery, &sequence);
                true
            }
            Err(e) => {
                self.reporter
                    .report(&format!(
                        "Error sending alert for {}: {e}",
                        delivery.category
                    ))
                    .await;
                if let Err(err) = self.retry.enqueue(delivery.clone()) {
                    tracing::error!(error = %err, alert_id = %delivery.record.id, "failed to queue delivery for retry");
                }
                false
            }
        }
    }

    /// Attempt every queued delivery once. Failures re-enqueue through
    /// the normal delivery path.
    pub async fn replay_pending(&self) {
        let queued = match self.retry.drain() {
            Ok(queued) => queued,
            Err(e) => {
                tracing::error!(error = %e, "failed to read retry queue");
                return;
            }
        };
        if queued.is_empty() {
            return;
        }
        tracing::info!(count = queued.len(), "replaying queued deliveries");
        for pending in queued {
            self.deliver(&pending).await;
        }
    }

    fn mark_sent(&self, delivery: &PendingDelivery, sequence: &str) {
        let record = &delivery.record;
        let sent_at = local_timestamp(record.sent_at);
        tracing::info!(
            alert_id = %record.id,
            category = %delivery.category,
            sequence,
            update = delivery.is_update,
            "notification sent"
        );
        let entry = DedupeEntry {
            category: delivery.category,
            sent_at: sent_at.clone(),
        };
        if let Err(e) = self.dedupe.record(&record.id, entry) {
            tracing::error!(error = %e, alert_id = %record.id, "failed to persist dedupe entry");
        }
        let logged = LoggedAlert {
            timestamp: sent_at,
            event: delivery.category.display_name().to_string(),
            location: record.area_desc.clone(),
            details: record.description.clone(),
            url: record.source_url.clone(),
        };
        if let Err(e) = self.alert_log.append(&logged) {
            tracing::error!(error = %e, alert_id = %record.id, "failed to append alert log");
        }
    }
}

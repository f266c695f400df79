use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use domain::alert::classifier::{Classification, Classifier};
use domain::alert::entity::PendingDelivery;
use ports::secondary::alert_source::AlertSource;
use ports::secondary::dedupe_store::DedupeStore;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::delivery::DeliveryService;
use crate::error_reporter::ErrorReporter;
use crate::status::RuntimeStatus;

/// Pause between poll cycles, randomized within this range.
const CYCLE_PAUSE_MS: std::ops::RangeInclusive<u64> = 1000..=2000;

/// Single-worker orchestrator: replay queued deliveries, fetch the
/// feed, classify, deliver. Nothing else mutates the stores.
pub struct PollService {
    source: Arc<dyn AlertSource>,
    classifier: Arc<tokio::sync::RwLock<Classifier>>,
    dedupe: Arc<dyn DedupeStore>,
    delivery: Arc<DeliveryService>,
    reporter: Arc<ErrorReporter>,
    status: Arc<RuntimeStatus>,
}

impl PollService {
    pub fn new(
        source: Arc<dyn AlertSource>,
        classifier: Arc<tokio::sync::RwLock<Classifier>>,
        dedupe: Arc<dyn DedupeStore>,
        delivery: Arc<DeliveryService>,
        reporter: Arc<ErrorReporter>,
        status: Arc<RuntimeStatus>,
    ) -> Self {
        Self {
            source,
            classifier,
            dedupe,
            delivery,
            reporter,
            status,
        }
    }

    /// Run poll cycles until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!("poll loop started");
        loop {
            self.poll_once().await;
            let pause = Duration::from_millis(rand::rng().random_range(CYCLE_PAUSE_MS));
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::info!("poll loop stopping");
                    break;
                }
                () = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// One full cycle: retry replay, fetch, classify, deliver.
    pub async fn poll_once(&self) {
        self.delivery.replay_pending().await;

        let records = match self.source.fetch().await {
            Ok(records) => {
                self.status.record_fetch().await;
                tracing::debug!(count = records.len(), "fetched active alerts");
                records
            }
            Err(e) => {
                tracing::warn!(error = %e, "feed fetch failed");
                self.reporter
                    .report(&format!("Error fetching targeted alerts: {e}"))
                    .await;
                Vec::new()
            }
        };

        for record in records {
            let prior = match self.dedupe.category_of(&record.id) {
                Ok(prior) => prior,
                Err(e) => {
                    tracing::error!(error = %e, alert_id = %record.id, "dedupe lookup failed");
                    continue;
                }
            };
            let decision = self.classifier.read().await.classify(&record, prior);
            match decision {
                Classification::Notify(classified) => {
                    let pending = PendingDelivery {
                        category: classified.category,
                        record,
                        tornado_possible: classified.tornado_possible,
                        is_update: classified.is_update,
                        enqueued_at: Utc::now(),
                    };
                    self.delivery.deliver(&pending).await;
                }
                Classification::Skip(reason) => {
                    tracing::debug!(alert_id = %record.id, ?reason, "alert skipped");
                }
            }
        }
    }
}

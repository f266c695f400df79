//! In-memory port implementations shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use domain::alert::entity::{
    AlertRecord, CategoryGroup, DedupeEntry, LoggedAlert, NotificationCategory, PendingDelivery,
};
use domain::alert::error::AlertError;
use domain::common::error::DomainError;
use domain::format::message::NotificationBatch;
use domain::sequence::SequenceCounters;
use ports::secondary::alert_log::AlertLog;
use ports::secondary::alert_source::AlertSource;
use ports::secondary::counter_store::CounterStore;
use ports::secondary::dedupe_store::DedupeStore;
use ports::secondary::notifier::Notifier;
use ports::secondary::retry_store::RetryStore;

/// Notifier that records publishes and can be told to fail the first
/// N batch publishes.
#[derive(Default)]
pub struct MockNotifier {
    pub published: Mutex<Vec<(String, NotificationBatch)>>,
    pub texts: Mutex<Vec<(String, String)>>,
    pub cards: Mutex<Vec<(String, String, String)>>,
    pub fail_next: AtomicU32,
}

impl MockNotifier {
    pub fn failing(times: u32) -> Self {
        Self {
            fail_next: AtomicU32::new(times),
            ..Self::default()
        }
    }

    pub fn publish_count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    fn take_failure(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Notifier for MockNotifier {
    fn publish<'a>(
        &'a self,
        webhook_url: &'a str,
        batch: &'a NotificationBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        Box::pin(async move {
            if self.take_failure() {
                return Err(DomainError::PublishError("injected failure".to_string()));
            }
            self.published
                .lock()
                .unwrap()
                .push((webhook_url.to_string(), batch.clone()));
            Ok(())
        })
    }

    fn publish_text<'a>(
        &'a self,
        webhook_url: &'a str,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        Box::pin(async move {
            self.texts
                .lock()
                .unwrap()
                .push((webhook_url.to_string(), content.to_string()));
            Ok(())
        })
    }

    fn publish_card<'a>(
        &'a self,
        webhook_url: &'a str,
        title: &'a str,
        body: &'a str,
        _color: u32,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        Box::pin(async move {
            self.cards.lock().unwrap().push((
                webhook_url.to_string(),
                title.to_string(),
                body.to_string(),
            ));
            Ok(())
        })
    }
}

#[derive(Default)]
pub struct MemoryDedupeStore {
    entries: Mutex<HashMap<String, DedupeEntry>>,
}

impl DedupeStore for MemoryDedupeStore {
    fn has_sent(&self, alert_id: &str) -> Result<bool, AlertError> {
        Ok(self.entries.lock().unwrap().contains_key(alert_id))
    }

    fn category_of(&self, alert_id: &str) -> Result<Option<NotificationCategory>, AlertError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(alert_id)
            .map(|e| e.category))
    }

    fn record(&self, alert_id: &str, entry: DedupeEntry) -> Result<(), AlertError> {
        self.entries
            .lock()
            .unwrap()
            .insert(alert_id.to_string(), entry);
        Ok(())
    }

    fn len(&self) -> Result<usize, AlertError> {
        Ok(self.entries.lock().unwrap().len())
    }
}

#[derive(Default)]
pub struct MemoryRetryStore {
    queue: Mutex<Vec<PendingDelivery>>,
}

impl RetryStore for MemoryRetryStore {
    fn enqueue(&self, pending: PendingDelivery) -> Result<(), AlertError> {
        self.queue.lock().unwrap().push(pending);
        Ok(())
    }

    fn drain(&self) -> Result<Vec<PendingDelivery>, AlertError> {
        Ok(std::mem::take(&mut *self.queue.lock().unwrap()))
    }

    fn len(&self) -> Result<usize, AlertError> {
        Ok(self.queue.lock().unwrap().len())
    }
}

#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<SequenceCounters>,
}

impl CounterStore for MemoryCounterStore {
    fn next(&self, group: Option<CategoryGroup>) -> Result<String, AlertError> {
        Ok(self.counters.lock().unwrap().assign(group))
    }

    fn current(&self, group: CategoryGroup) -> Result<u64, AlertError> {
        Ok(self.counters.lock().unwrap().current(group))
    }
}

#[derive(Default)]
pub struct MemoryAlertLog {
    entries: Mutex<Vec<LoggedAlert>>,
}

impl AlertLog for MemoryAlertLog {
    fn append(&self, entry: &LoggedAlert) -> Result<(), AlertError> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<LoggedAlert>, AlertError> {
        Ok(self.entries.lock().unwrap().clone())
    }
}

/// Source returning a fixed record set on every fetch.
pub struct FixedSource {
    pub records: Vec<AlertRecord>,
}

impl AlertSource for FixedSource {
    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<AlertRecord>, DomainError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.records.clone()) })
    }
}

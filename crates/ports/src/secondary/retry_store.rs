use domain::alert::entity::PendingDelivery;
use domain::alert::error::AlertError;

/// Durable queue of deliveries that failed and await another attempt.
pub trait RetryStore: Send + Sync {
    /// Append a failed delivery and persist the queue.
    fn enqueue(&self, pending: PendingDelivery) -> Result<(), AlertError>;

    /// Remove and return every queued delivery, persisting the now
    /// empty queue. Entries that fail again are re-enqueued by the
    /// caller.
    fn drain(&self) -> Result<Vec<PendingDelivery>, AlertError>;

    /// Number of queued deliveries.
    fn len(&self) -> Result<usize, AlertError>;

    fn is_empty(&self) -> Result<bool, AlertError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DummyStore;
    impl RetryStore for DummyStore {
        fn enqueue(&self, _pending: PendingDelivery) -> Result<(), AlertError> {
            Ok(())
        }
        fn drain(&self) -> Result<Vec<PendingDelivery>, AlertError> {
            Ok(vec![])
        }
        fn len(&self) -> Result<usize, AlertError> {
            Ok(0)
        }
    }

    #[test]
    fn retry_store_is_dyn_compatible() {
        let store: Box<dyn RetryStore> = Box::new(DummyStore);
        assert!(store.is_empty().unwrap());
    }
}

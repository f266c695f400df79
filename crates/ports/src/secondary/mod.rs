pub mod alert_log;
pub mod alert_source;
pub mod counter_store;
pub mod dedupe_store;
pub mod notifier;
pub mod retry_store;

pub mod json_counter_store;
pub mod json_dedupe_store;
pub mod json_retry_store;
pub mod yaml_alert_log;

mod agent;
mod common;

pub use agent::{AgentConfig, FeedConfig, HttpConfig, LoggingConfig, StorageConfig};
pub use common::{ConfigError, LogFormat, LogLevel};

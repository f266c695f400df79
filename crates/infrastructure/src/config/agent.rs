use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use domain::alert::entity::{CategoryRoute, CategoryStyle, NotificationCategory};
use serde::Deserialize;

use super::common::{ConfigError, LogFormat, LogLevel};

/// Top-level agent configuration, loaded from a YAML file.
///
/// Category-keyed maps use display names ("Tornado Warning",
/// "PDS Tornado Warning", ...) as keys.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Destination webhook per category. At least one entry required.
    #[serde(default)]
    pub webhooks: HashMap<String, String>,
    #[serde(default)]
    pub embed_colors: HashMap<String, u32>,
    #[serde(default)]
    pub alert_icons: HashMap<String, String>,
    #[serde(default)]
    pub safety_tips: HashMap<String, Vec<String>>,
    /// Full mention content per category, e.g. `<@&123456>`.
    #[serde(default)]
    pub role_mentions: HashMap<String, String>,
    #[serde(default)]
    pub winter_alerts_enabled: bool,
    #[serde(default)]
    pub feed: FeedConfig,
    /// Destination for error notices and health pings.
    pub error_webhook_url: String,
    /// Destination for the daily summary.
    pub summary_webhook_url: String,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://api.weather.gov/alerts/active?area=MI".to_string(),
            user_agent: "Stormwatch/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dedupe_file: PathBuf,
    pub retry_file: PathBuf,
    pub counter_file: PathBuf,
    pub alert_log_file: PathBuf,
    pub text_log_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dedupe_file: PathBuf::from("sent_alerts.json"),
            retry_file: PathBuf::from("alert_cache.json"),
            counter_file: PathBuf::from("alert_counter.json"),
            alert_log_file: PathBuf::from("alert_logs.yml"),
            text_log_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl AgentConfig {
    /// Load and validate the config file. A missing or invalid file is
    /// a startup abort.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::validation(
                    "config",
                    format!(
                        "{} not found; create it with webhooks, embed_colors, alert_icons, \
                         safety_tips and winter_alerts_enabled",
                        path.display()
                    ),
                )
            } else {
                ConfigError::Io(e)
            }
        })?;
        let config: Self = serde_yaml_ng::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhooks.is_empty() {
            return Err(ConfigError::validation(
                "webhooks",
                "at least one category webhook is required",
            ));
        }
        for key in self.webhooks.keys() {
            if NotificationCategory::from_event(key).is_none() {
                return Err(ConfigError::validation(
                    "webhooks",
                    format!("unknown category '{key}'"),
                ));
            }
        }
        if self.error_webhook_url.trim().is_empty() {
            return Err(ConfigError::validation(
                "error_webhook_url",
                "must not be empty",
            ));
        }
        if self.summary_webhook_url.trim().is_empty() {
            return Err(ConfigError::validation(
                "summary_webhook_url",
                "must not be empty",
            ));
        }
        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::validation("feed.url", "must not be empty"));
        }
        Ok(())
    }

    /// Routing table: category to webhook plus presentation style.
    pub fn routes(&self) -> HashMap<NotificationCategory, CategoryRoute> {
        self.webhooks
            .iter()
            .filter_map(|(name, url)| {
                let category = NotificationCategory::from_event(name)?;
                let style = CategoryStyle {
                    color: self
                        .embed_colors
                        .get(name)
                        .copied()
                        .unwrap_or(CategoryStyle::default().color),
                    icon: self
                        .alert_icons
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| CategoryStyle::default().icon),
                    safety_tips: self.safety_tips.get(name).cloned().unwrap_or_default(),
                    mention: self.role_mentions.get(name).cloned(),
                };
                Some((
                    category,
                    CategoryRoute {
                        webhook_url: url.clone(),
                        style,
                    },
                ))
            })
            .collect()
    }

    /// Categories with a configured destination.
    pub fn configured_categories(&self) -> HashSet<NotificationCategory> {
        self.routes().into_keys().collect()
    }
}

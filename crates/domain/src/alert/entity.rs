use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized item from the upstream alert feed.
///
/// Built once per fetch cycle from the raw feed payload and never mutated
/// afterwards. Optional feed fields that were absent are filled with the
/// `"Unknown"` / `"N/A"` sentinels by the source adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Feed-unique alert identifier.
    pub id: String,
    /// Raw event name as reported by the feed (e.g. "Tornado Warning").
    pub event: String,
    pub status: AlertStatus,
    pub message_type: MessageType,
    pub headline: String,
    pub description: String,
    /// Semicolon-separated list of affected areas.
    pub area_desc: String,
    pub sent_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub sender_name: String,
    /// Canonical URL of the alert on the upstream service.
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Actual,
    Other,
}

impl AlertStatus {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("actual") {
            Self::Actual
        } else {
            Self::Other
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Alert,
    Update,
    Cancel,
    Other,
}

impl MessageType {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "alert" => Self::Alert,
            "update" => Self::Update,
            "cancel" => Self::Cancel,
            _ => Self::Other,
        }
    }
}

/// Closed set of notification categories an alert can resolve to.
///
/// The first ten are always active; the winter group is gated by the
/// `winter_alerts_enabled` runtime toggle. `PdsTornadoWarning`,
/// `TornadoEmergency` and `TornadoObserved` never appear as feed event
/// names; they are derived from Tornado Warning text by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationCategory {
    SevereThunderstormWatch,
    SevereThunderstormWarning,
    TornadoWatch,
    TornadoWarning,
    PdsTornadoWarning,
    TornadoEmergency,
    TornadoObserved,
    HeatAdvisory,
    ExtremeHeatWarning,
    SpecialWeatherStatement,
    WinterStormWarning,
    WinterStormWatch,
    WinterWeatherAdvisory,
    SnowSquallWarning,
    BlizzardWarning,
}

impl NotificationCategory {
    /// Human-readable name, matching the feed's event naming and the keys
    /// used in the configuration file.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::SevereThunderstormWatch => "Severe Thunderstorm Watch",
            Self::SevereThunderstormWarning => "Severe Thunderstorm Warning",
            Self::TornadoWatch => "Tornado Watch",
            Self::TornadoWarning => "Tornado Warning",
            Self::PdsTornadoWarning => "PDS Tornado Warning",
            Self::TornadoEmergency => "Tornado Emergency",
            Self::TornadoObserved => "Tornado Observed",
            Self::HeatAdvisory => "Heat Advisory",
            Self::ExtremeHeatWarning => "Extreme Heat Warning",
            Self::SpecialWeatherStatement => "Special Weather Statement",
            Self::WinterStormWarning => "Winter Storm Warning",
            Self::WinterStormWatch => "Winter Storm Watch",
            Self::WinterWeatherAdvisory => "Winter Weather Advisory",
            Self::SnowSquallWarning => "Snow Squall Warning",
            Self::BlizzardWarning => "Blizzard Warning",
        }
    }

    /// Resolve a feed event name (or config key) to a category.
    pub fn from_event(event: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.display_name().eq_ignore_ascii_case(event.trim()))
    }

    pub const ALL: [Self; 15] = [
        Self::SevereThunderstormWatch,
        Self::SevereThunderstormWarning,
        Self::TornadoWatch,
        Self::TornadoWarning,
        Self::PdsTornadoWarning,
        Self::TornadoEmergency,
        Self::TornadoObserved,
        Self::HeatAdvisory,
        Self::ExtremeHeatWarning,
        Self::SpecialWeatherStatement,
        Self::WinterStormWarning,
        Self::WinterStormWatch,
        Self::WinterWeatherAdvisory,
        Self::SnowSquallWarning,
        Self::BlizzardWarning,
    ];

    /// Sequence-counter group for this category.
    pub fn group(self) -> CategoryGroup {
        match self {
            Self::SevereThunderstormWatch | Self::TornadoWatch => CategoryGroup::Watch,
            Self::SevereThunderstormWarning | Self::TornadoWarning | Self::TornadoObserved => {
                CategoryGroup::Warning
            }
            Self::PdsTornadoWarning | Self::TornadoEmergency => CategoryGroup::PdsEmergency,
            Self::ExtremeHeatWarning | Self::HeatAdvisory => CategoryGroup::Heat,
            Self::SpecialWeatherStatement => CategoryGroup::SpecialWeather,
            Self::WinterStormWarning
            | Self::WinterStormWatch
            | Self::WinterWeatherAdvisory
            | Self::SnowSquallWarning
            | Self::BlizzardWarning => CategoryGroup::Winter,
        }
    }

    pub fn is_winter(self) -> bool {
        matches!(self.group(), CategoryGroup::Winter)
    }

    /// Whether the notification body reads "WATCH" rather than "WARNING".
    /// Also controls mention suppression: watch categories never mention.
    pub fn is_watch(self) -> bool {
        self.display_name().contains("Watch")
    }

    /// Escalation rank within the tornado-warning family. Severity order:
    /// Warning < PDS < Emergency = Observed. `None` outside the family.
    pub fn escalation_rank(self) -> Option<u8> {
        match self {
            Self::TornadoWarning => Some(0),
            Self::PdsTornadoWarning => Some(1),
            Self::TornadoEmergency | Self::TornadoObserved => Some(2),
            _ => None,
        }
    }

    /// Categories whose notifications carry wind/movement/gust detail fields.
    pub fn has_detail_fields(self) -> bool {
        !matches!(self, Self::SevereThunderstormWatch | Self::TornadoWatch)
    }

    /// Subset of detailed categories that also report hail size.
    pub fn has_hail_field(self) -> bool {
        matches!(
            self,
            Self::SevereThunderstormWarning
                | Self::TornadoWarning
                | Self::PdsTornadoWarning
                | Self::TornadoEmergency
                | Self::TornadoObserved
        )
    }

    /// Categories that always attach a role mention, configured or not.
    pub fn always_mentions(self) -> bool {
        matches!(
            self,
            Self::TornadoEmergency | Self::PdsTornadoWarning | Self::TornadoObserved
        )
    }
}

impl std::fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Per-category sequence-counter group. Each group has a fixed numeric code
/// and zero-padding width used when rendering alert numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Watch,
    Warning,
    PdsEmergency,
    Heat,
    SpecialWeather,
    Winter,
}

impl CategoryGroup {
    pub fn code(self) -> &'static str {
        match self {
            Self::Watch => "1",
            Self::Warning => "2",
            Self::PdsEmergency => "3",
            Self::Heat => "9",
            Self::SpecialWeather => "4",
            Self::Winter => "8",
        }
    }

    pub fn pad_width(self) -> usize {
        match self {
            Self::Watch => 5,
            Self::Heat => 8,
            Self::Warning | Self::PdsEmergency | Self::SpecialWeather | Self::Winter => 6,
        }
    }

    pub const ALL: [Self; 6] = [
        Self::Watch,
        Self::Warning,
        Self::PdsEmergency,
        Self::Heat,
        Self::SpecialWeather,
        Self::Winter,
    ];
}

/// Persisted per-alert record proving a notification was sent.
///
/// Invariant: an alert id present in the dedupe store has been notified at
/// least once; `category` is the most recent category notified and drives
/// escalation decisions for later updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeEntry {
    pub category: NotificationCategory,
    /// Local wall-clock timestamp of the successful send.
    pub sent_at: String,
}

/// One failed delivery waiting in the retry queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingDelivery {
    pub category: NotificationCategory,
    pub record: AlertRecord,
    pub tornado_possible: bool,
    pub is_update: bool,
    pub enqueued_at: DateTime<Utc>,
}

/// One line of the structured alert log, written after each
/// successful delivery and consumed by the daily summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedAlert {
    /// Local wall-clock timestamp, "YYYY-MM-DD HH:MM:SS".
    pub timestamp: String,
    pub event: String,
    pub location: String,
    pub details: String,
    pub url: String,
}

/// Presentation settings for one category's notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStyle {
    /// Embed accent color (0xRRGGBB).
    pub color: u32,
    pub icon: String,
    pub safety_tips: Vec<String>,
    /// Role mention content, e.g. `<@&123>`.
    pub mention: Option<String>,
}

impl Default for CategoryStyle {
    fn default() -> Self {
        Self {
            color: 0x000000,
            icon: "🚨".to_string(),
            safety_tips: Vec::new(),
            mention: None,
        }
    }
}

/// Destination plus presentation for one category.
#[derive(Debug, Clone)]
pub struct CategoryRoute {
    pub webhook_url: String,
    pub style: CategoryStyle,
}

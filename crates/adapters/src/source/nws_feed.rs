use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use domain::alert::entity::{AlertRecord, AlertStatus, MessageType, NotificationCategory};
use domain::common::error::DomainError;
use ports::secondary::alert_source::AlertSource;
use serde::Deserialize;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Alert source backed by the NWS active-alerts API.
///
/// The upstream returns GeoJSON; only the `features[].properties` we
/// notify on are deserialized. Missing optional fields are filled with
/// display sentinels so the formatter never sees an empty value.
pub struct NwsFeedSource {
    client: reqwest::Client,
    url: String,
    winter_enabled: AtomicBool,
}

impl NwsFeedSource {
    pub fn new(url: String, user_agent: &str, winter_enabled: bool) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| DomainError::FetchError(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            url,
            winter_enabled: AtomicBool::new(winter_enabled),
        })
    }

    /// Toggle winter events in the query set on config reload.
    pub fn set_winter_enabled(&self, enabled: bool) {
        self.winter_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Event names requested from the feed. Escalated tornado
    /// categories are derived from text, never reported by the feed,
    /// so they are excluded here.
    fn target_events(&self) -> String {
        let winter = self.winter_enabled.load(Ordering::Relaxed);
        NotificationCategory::ALL
            .into_iter()
            .filter(|c| c.escalation_rank().unwrap_or(0) == 0)
            .filter(|c| winter || !c.is_winter())
            .map(NotificationCategory::display_name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl AlertSource for NwsFeedSource {
    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<AlertRecord>, DomainError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .query(&[("event", self.target_events())])
                .send()
                .await
                .map_err(|e| DomainError::FetchError(format!("feed request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(DomainError::FetchError(format!(
                    "feed returned HTTP {}",
                    response.status()
                )));
            }

            let feed: FeedDocument = response
                .json()
                .await
                .map_err(|e| DomainError::FetchError(format!("feed decode failed: {e}")))?;

            let records: Vec<AlertRecord> =
                feed.features.into_iter().map(FeedFeature::into_record).collect();
            tracing::debug!(count = records.len(), "decoded feed records");
            Ok(records)
        })
    }
}

#[derive(Debug, Deserialize)]
struct FeedDocument {
    #[serde(default)]
    features: Vec<FeedFeature>,
}

#[derive(Debug, Deserialize)]
struct FeedFeature {
    #[serde(default)]
    id: String,
    #[serde(default)]
    properties: FeedProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedProperties {
    #[serde(rename = "@id")]
    at_id: Option<String>,
    event: Option<String>,
    status: Option<String>,
    message_type: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    area_desc: Option<String>,
    sent: Option<String>,
    expires: Option<String>,
    sender_name: Option<String>,
}

impl FeedFeature {
    fn into_record(self) -> AlertRecord {
        let p = self.properties;
        AlertRecord {
            source_url: p.at_id.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            event: p.event.unwrap_or_else(|| "Unknown".to_string()),
            status: AlertStatus::parse(p.status.as_deref().unwrap_or("Actual")),
            message_type: MessageType::parse(p.message_type.as_deref().unwrap_or("Alert")),
            headline: p.headline.unwrap_or_default(),
            description: p
                .description
                .unwrap_or_else(|| "No description available.".to_string()),
            area_desc: p.area_desc.unwrap_or_else(|| "Unknown Area".to_string()),
            sent_at: parse_instant(p.sent.as_deref()),
            expires_at: parse_instant(p.expires.as_deref()),
            sender_name: p
                .sender_name
                .unwrap_or_else(|| "National Weather Service".to_string()),
        }
    }
}

fn parse_instant(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(raw, error = %e, "unparseable feed timestamp");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_decodes_full_properties() {
        let json = r#"{
            "features": [{
                "id": "urn:oid:2.49.0.1",
                "properties": {
                    "@id": "https://api.weather.gov/alerts/urn:oid:2.49.0.1",
                    "event": "Tornado Warning",
                    "status": "Actual",
                    "messageType": "Update",
                    "headline": "Tornado Warning issued",
                    "description": "Take cover now.",
                    "areaDesc": "Wayne, MI",
                    "sent": "2024-07-04T18:00:00-04:00",
                    "expires": "2024-07-04T19:00:00-04:00",
                    "senderName": "NWS Detroit MI"
                }
            }]
        }"#;
        let doc: FeedDocument = serde_json::from_str(json).unwrap();
        let record = doc.features.into_iter().next().unwrap().into_record();
        assert_eq!(record.id, "urn:oid:2.49.0.1");
        assert_eq!(record.event, "Tornado Warning");
        assert_eq!(record.status, AlertStatus::Actual);
        assert_eq!(record.message_type, MessageType::Update);
        assert_eq!(record.area_desc, "Wayne, MI");
        assert!(record.sent_at.is_some());
        assert!(record.expires_at.is_some());
        assert_eq!(
            record.source_url,
            "https://api.weather.gov/alerts/urn:oid:2.49.0.1"
        );
    }

    #[test]
    fn missing_optionals_fall_back_to_sentinels() {
        let json = r#"{"features": [{"id": "a1", "properties": {}}]}"#;
        let doc: FeedDocument = serde_json::from_str(json).unwrap();
        let record = doc.features.into_iter().next().unwrap().into_record();
        assert_eq!(record.description, "No description available.");
        assert_eq!(record.area_desc, "Unknown Area");
        assert_eq!(record.sender_name, "National Weather Service");
        assert_eq!(record.status, AlertStatus::Actual);
        assert_eq!(record.message_type, MessageType::Alert);
        assert_eq!(record.sent_at, None);
        assert_eq!(record.source_url, "a1");
    }

    #[test]
    fn winter_toggle_changes_requested_events() {
        let source =
            NwsFeedSource::new("http://feed".to_string(), "stormwatch-test", false).unwrap();
        let events = source.target_events();
        assert!(events.contains("Tornado Warning"));
        assert!(!events.contains("Blizzard Warning"));
        assert!(!events.contains("PDS"));

        source.set_winter_enabled(true);
        assert!(source.target_events().contains("Blizzard Warning"));
    }
}

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use domain::common::error::DomainError;
use domain::format::locale::now_local_rfc3339;
use domain::format::message::{NotificationBatch, NotificationMessage};
use ports::secondary::notifier::Notifier;
use serde_json::{json, Value};

const PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier that POSTs Discord-style webhook payloads.
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new() -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(PUBLISH_TIMEOUT)
            .build()
            .map_err(|e| DomainError::PublishError(format!("http client build failed: {e}")))?;
        Ok(Self { client })
    }

    async fn post(&self, webhook_url: &str, payload: &Value) -> Result<(), DomainError> {
        let response = self
            .client
            .post(webhook_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| DomainError::PublishError(format!("webhook POST failed: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(DomainError::PublishError(format!(
                "webhook returned HTTP {}",
                response.status()
            )))
        }
    }
}

impl Notifier for WebhookNotifier {
    fn publish<'a>(
        &'a self,
        webhook_url: &'a str,
        batch: &'a NotificationBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        Box::pin(async move { self.post(webhook_url, &batch_payload(batch)).await })
    }

    fn publish_text<'a>(
        &'a self,
        webhook_url: &'a str,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        Box::pin(async move { self.post(webhook_url, &json!({ "content": content })).await })
    }

    fn publish_card<'a>(
        &'a self,
        webhook_url: &'a str,
        title: &'a str,
        body: &'a str,
        color: u32,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>> {
        Box::pin(async move {
            let payload = json!({
                "embeds": [{
                    "title": title,
                    "description": body,
                    "color": color,
                    "timestamp": now_local_rfc3339(),
                }]
            });
            self.post(webhook_url, &payload).await
        })
    }
}

/// Wire shape: one post carrying every page as an embed, plus the
/// mention as top-level content when present.
fn batch_payload(batch: &NotificationBatch) -> Value {
    let embeds: Vec<Value> = batch.messages.iter().map(embed_payload).collect();
    match &batch.mention {
        Some(mention) => json!({ "content": mention, "embeds": embeds }),
        None => json!({ "embeds": embeds }),
    }
}

fn embed_payload(message: &NotificationMessage) -> Value {
    let fields: Vec<Value> = message
        .fields
        .iter()
        .map(|f| json!({ "name": f.name, "value": f.value, "inline": f.inline }))
        .collect();
    json!({
        "title": message.title,
        "description": message.body,
        "color": message.color,
        "fields": fields,
        "timestamp": message.timestamp,
    })
}

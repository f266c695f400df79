use std::future::Future;
use std::pin::Pin;

use domain::common::error::DomainError;
use domain::format::message::NotificationBatch;

/// Secondary port for publishing rendered notifications to a webhook
/// destination.
///
/// Uses `Pin<Box<dyn Future>>` return type (instead of RPITIT) so the trait
/// is dyn-compatible and can be used as `Arc<dyn Notifier>`.
pub trait Notifier: Send + Sync {
    /// Publish a full notification batch (all pages in one post).
    fn publish<'a>(
        &'a self,
        webhook_url: &'a str,
        batch: &'a NotificationBatch,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>>;

    /// Publish a bare text message, for operational notices.
    fn publish_text<'a>(
        &'a self,
        webhook_url: &'a str,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>>;

    /// Publish a single standalone card with a title, body and color.
    fn publish_card<'a>(
        &'a self,
        webhook_url: &'a str,
        title: &'a str,
        body: &'a str,
        color: u32,
    ) -> Pin<Box<dyn Future<Output = Result<(), DomainError>> + Send + 'a>>;
}

use std::future::Future;
use std::pin::Pin;

use domain::alert::entity::AlertRecord;
use domain::common::error::DomainError;

/// Secondary port for pulling active alerts from the upstream feed.
///
/// Uses `Pin<Box<dyn Future>>` return type (instead of RPITIT) so the trait
/// is dyn-compatible and can be used as `Arc<dyn AlertSource>`.
pub trait AlertSource: Send + Sync {
    /// Fetch the currently active alerts for the configured event set.
    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<AlertRecord>, DomainError>> + Send + 'a>>;
}

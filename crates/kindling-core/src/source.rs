use crate::error::SourceError;
use crate::item::ItemId;
use crate::story::RawItem;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

type Result<T> = std::result::Result<T, SourceError>;

/// Read-only access to the upstream item-tracking API.
///
/// Implementations perform no retries and no caching; both belong to the
/// caller. Every operation races the supplied cancellation token and returns
/// [`SourceError::Cancelled`] promptly once it fires, abandoning any
/// in-flight network call rather than blocking to completion.
#[async_trait]
pub trait ItemSource: Send + Sync + 'static {
    /// Fetches the ranked list of best item ids, best first.
    async fn fetch_best_ids(&self, cancel: &CancellationToken) -> Result<Vec<ItemId>>;

    /// Fetches the detail payload for a single item.
    ///
    /// Returns `Ok(None)` when upstream answers with a well-formed `null`
    /// body, which it does for deleted and unknown ids.
    async fn fetch_item(&self, id: ItemId, cancel: &CancellationToken) -> Result<Option<RawItem>>;
}

use crate::error::AggregateError;
use crate::story::StoryView;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

type Result<T> = std::result::Result<T, AggregateError>;

/// The aggregation engine's public operation.
#[async_trait]
pub trait BestStories: Send + Sync + 'static {
    /// Returns up to `n` of the current best stories, sorted by score
    /// descending.
    ///
    /// Stories with equal scores keep their upstream rank order (the sort is
    /// stable). The result may be shorter than `n` when upstream knows fewer
    /// ids, or when individual detail fetches fail — per-item failures are
    /// dropped, never surfaced.
    ///
    /// Callers must pass `n > 0`; a zero count fails fast with
    /// [`AggregateError::InvalidCount`].
    async fn best_stories(&self, n: usize, cancel: &CancellationToken) -> Result<Vec<StoryView>>;
}

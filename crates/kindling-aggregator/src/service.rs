use crate::gate::{FetchGate, DEFAULT_MAX_CONCURRENT_FETCHES};
use async_trait::async_trait;
use futures::future::join_all;
use kindling_core::{
    AggregateError, BestStories, ItemId, ItemSource, SourceError, StoryView, TtlCache,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, AggregateError>;

/// Cache key for the ranked id list.
const BEST_IDS_KEY: &str = "best_ids";

fn story_key(id: ItemId) -> String {
    format!("story_{id}")
}

/// Tuning knobs for the aggregation engine.
#[derive(Debug, Clone, TypedBuilder)]
pub struct AggregatorConfig {
    /// How long a fetched id list stays fresh.
    #[builder(default = Duration::from_secs(300))]
    pub ids_ttl: Duration,
    /// How long a fetched story stays fresh.
    #[builder(default = Duration::from_secs(300))]
    pub story_ttl: Duration,
    /// Upper bound on simultaneous upstream detail fetches.
    #[builder(default = DEFAULT_MAX_CONCURRENT_FETCHES)]
    pub max_concurrent_fetches: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// The aggregation engine.
///
/// Stateless per call: the id-list cache, the story cache, and the fetch
/// gate are the only shared mutable state, so one instance serves any
/// number of concurrent [`best_stories`](BestStories::best_stories) calls.
/// The process-wide composition owns one client, one cache pair, and one
/// gate, and injects them here.
pub struct AggregatorService<S, I, V> {
    source: Arc<S>,
    ids_cache: Arc<I>,
    story_cache: Arc<V>,
    gate: FetchGate,
    config: AggregatorConfig,
}

impl<S, I, V> Clone for AggregatorService<S, I, V> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            ids_cache: Arc::clone(&self.ids_cache),
            story_cache: Arc::clone(&self.story_cache),
            gate: self.gate.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, I, V> AggregatorService<S, I, V>
where
    S: ItemSource,
    I: TtlCache<Vec<ItemId>>,
    V: TtlCache<StoryView>,
{
    /// Creates an engine over the given collaborators.
    pub fn new(source: S, ids_cache: I, story_cache: V, config: AggregatorConfig) -> Self {
        let gate = FetchGate::new(config.max_concurrent_fetches);
        Self {
            source: Arc::new(source),
            ids_cache: Arc::new(ids_cache),
            story_cache: Arc::new(story_cache),
            gate,
            config,
        }
    }

    /// The gate shared by every detail fetch this engine issues.
    pub fn gate(&self) -> &FetchGate {
        &self.gate
    }

    /// Resolves the ranked id list, from cache or upstream.
    ///
    /// A fetch failure here is fatal to the whole request; there is no
    /// partial id-list result.
    async fn best_ids(&self, cancel: &CancellationToken) -> Result<Vec<ItemId>> {
        if let Some(ids) = self.ids_cache.get(BEST_IDS_KEY).await {
            debug!(count = ids.len(), "using cached id list");
            return Ok(ids);
        }

        info!("id list cache miss, fetching from upstream");
        let ids = self
            .source
            .fetch_best_ids(cancel)
            .await
            .map_err(source_error)?;
        self.ids_cache
            .set(BEST_IDS_KEY, ids.clone(), self.config.ids_ttl)
            .await;
        debug!(count = ids.len(), ttl = ?self.config.ids_ttl, "cached id list");
        Ok(ids)
    }

    /// Resolves one story, from cache or upstream through the gate.
    ///
    /// `Ok(None)` drops the item from the result; only cancellation
    /// escapes as an error.
    async fn resolve_story(
        &self,
        id: ItemId,
        cancel: &CancellationToken,
    ) -> Result<Option<StoryView>> {
        let key = story_key(id);
        if let Some(story) = self.story_cache.get(&key).await {
            trace!(%id, "story cache hit");
            return Ok(Some(story));
        }

        let permit = self.gate.acquire(cancel).await?;
        let fetched = self.source.fetch_item(id, cancel).await;
        drop(permit);

        let item = match fetched {
            Ok(Some(item)) => item,
            Ok(None) => {
                warn!(%id, "upstream has no payload for item, dropping");
                return Ok(None);
            }
            Err(SourceError::Cancelled) => return Err(AggregateError::Cancelled),
            Err(error) => {
                warn!(%id, %error, "item fetch failed, dropping");
                return Ok(None);
            }
        };

        let story = StoryView::from(&item);
        self.story_cache
            .set(&key, story.clone(), self.config.story_ttl)
            .await;
        Ok(Some(story))
    }
}

#[async_trait]
impl<S, I, V> BestStories for AggregatorService<S, I, V>
where
    S: ItemSource,
    I: TtlCache<Vec<ItemId>>,
    V: TtlCache<StoryView>,
{
    async fn best_stories(&self, n: usize, cancel: &CancellationToken) -> Result<Vec<StoryView>> {
        if n == 0 {
            return Err(AggregateError::InvalidCount(n));
        }

        let ids = self.best_ids(cancel).await?;
        let take = n.min(ids.len());
        let fetch_set = &ids[..take];
        info!(requested = n, fetching = take, "resolving story details");

        // Whole-batch join: a slow or failing id is waited for, never
        // abandoned while the others are collected.
        let results = join_all(
            fetch_set
                .iter()
                .map(|id| self.resolve_story(*id, cancel)),
        )
        .await;

        let mut stories = Vec::with_capacity(take);
        for result in results {
            if let Some(story) = result? {
                stories.push(story);
            }
        }

        // Stable sort: equal scores keep their upstream rank order.
        stories.sort_by(|a, b| b.score.cmp(&a.score));

        info!(requested = n, returned = stories.len(), "assembled best stories");
        Ok(stories)
    }
}

fn source_error(error: SourceError) -> AggregateError {
    match error {
        SourceError::Cancelled => AggregateError::Cancelled,
        other => AggregateError::Upstream(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use kindling_cache::MemoryTtlCache;
    use kindling_core::{ManualClock, RawItem};
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn raw_item(id: u64, score: i64) -> RawItem {
        RawItem {
            title: Some(format!("Story {id}")),
            url: Some(format!("https://example.com/{id}")),
            by: Some("tester".to_string()),
            time: 1_700_000_000 + id as i64,
            score,
            descendants: score / 2,
            kind: Some("story".to_string()),
        }
    }

    #[derive(Default)]
    struct FakeSourceInner {
        ids: Vec<ItemId>,
        items: HashMap<u64, RawItem>,
        failing: HashSet<u64>,
        item_delay: Option<Duration>,
        fail_ids: bool,
        fail_everything: AtomicBool,
        id_fetches: AtomicUsize,
        item_fetches: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[derive(Clone)]
    struct FakeSource {
        inner: Arc<FakeSourceInner>,
    }

    impl From<FakeSourceInner> for FakeSource {
        fn from(inner: FakeSourceInner) -> Self {
            Self {
                inner: Arc::new(inner),
            }
        }
    }

    impl FakeSource {
        fn id_fetches(&self) -> usize {
            self.inner.id_fetches.load(Ordering::SeqCst)
        }

        fn item_fetches(&self) -> usize {
            self.inner.item_fetches.load(Ordering::SeqCst)
        }

        fn max_in_flight(&self) -> usize {
            self.inner.max_in_flight.load(Ordering::SeqCst)
        }

        fn break_upstream(&self) {
            self.inner.fail_everything.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ItemSource for FakeSource {
        async fn fetch_best_ids(
            &self,
            _cancel: &CancellationToken,
        ) -> std::result::Result<Vec<ItemId>, SourceError> {
            self.inner.id_fetches.fetch_add(1, Ordering::SeqCst);
            if self.inner.fail_ids || self.inner.fail_everything.load(Ordering::SeqCst) {
                return Err(SourceError::Status(500));
            }
            Ok(self.inner.ids.clone())
        }

        async fn fetch_item(
            &self,
            id: ItemId,
            cancel: &CancellationToken,
        ) -> std::result::Result<Option<RawItem>, SourceError> {
            self.inner.item_fetches.fetch_add(1, Ordering::SeqCst);
            let current = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.inner.max_in_flight.fetch_max(current, Ordering::SeqCst);

            let outcome = async {
                if let Some(delay) = self.inner.item_delay {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                if self.inner.fail_everything.load(Ordering::SeqCst)
                    || self.inner.failing.contains(&id.get())
                {
                    return Err(SourceError::Status(503));
                }
                Ok(self.inner.items.get(&id.get()).cloned())
            }
            .await;

            self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn inner(ids: &[u64], items: &[(u64, i64)]) -> FakeSourceInner {
        FakeSourceInner {
            ids: ids.iter().copied().map(ItemId::new).collect(),
            items: items
                .iter()
                .map(|&(id, score)| (id, raw_item(id, score)))
                .collect(),
            ..FakeSourceInner::default()
        }
    }

    type TestService = AggregatorService<
        FakeSource,
        MemoryTtlCache<Vec<ItemId>>,
        MemoryTtlCache<StoryView>,
    >;

    fn service(source: FakeSource) -> TestService {
        service_with_config(source, AggregatorConfig::default())
    }

    fn service_with_config(source: FakeSource, config: AggregatorConfig) -> TestService {
        AggregatorService::new(source, MemoryTtlCache::new(), MemoryTtlCache::new(), config)
    }

    fn token() -> CancellationToken {
        CancellationToken::new()
    }

    #[tokio::test]
    async fn returns_stories_sorted_by_score_descending() {
        let source = FakeSource::from(inner(&[10, 20, 30], &[(10, 50), (20, 90), (30, 10)]));
        let engine = service(source);

        let stories = engine.best_stories(2, &token()).await.unwrap();

        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].title, "Story 20");
        assert_eq!(stories[0].score, 90);
        assert_eq!(stories[1].title, "Story 10");
        assert_eq!(stories[1].score, 50);
    }

    #[tokio::test]
    async fn caps_result_at_available_ids() {
        let source = FakeSource::from(inner(&[1, 2, 3], &[(1, 10), (2, 20), (3, 30)]));
        let engine = service(source);

        let stories = engine.best_stories(5, &token()).await.unwrap();
        assert_eq!(stories.len(), 3);
    }

    #[tokio::test]
    async fn zero_count_fails_fast() {
        let source = FakeSource::from(inner(&[1], &[(1, 10)]));
        let engine = service(source.clone());

        let error = engine.best_stories(0, &token()).await.unwrap_err();
        assert!(matches!(error, AggregateError::InvalidCount(0)));
        assert_eq!(source.id_fetches(), 0);
    }

    #[tokio::test]
    async fn id_list_failure_is_fatal() {
        let source = FakeSource::from(FakeSourceInner {
            fail_ids: true,
            ..inner(&[], &[])
        });
        let engine = service(source);

        let error = engine.best_stories(3, &token()).await.unwrap_err();
        assert!(matches!(
            error,
            AggregateError::Upstream(SourceError::Status(500))
        ));
    }

    #[tokio::test]
    async fn per_item_failures_shrink_the_result() {
        let ids: Vec<u64> = (1..=10).collect();
        let items: Vec<(u64, i64)> = ids.iter().map(|&id| (id, id as i64 * 10)).collect();
        let source = FakeSource::from(FakeSourceInner {
            failing: HashSet::from([4, 5, 6]),
            ..inner(&ids, &items)
        });
        let engine = service(source);

        let stories = engine.best_stories(10, &token()).await.unwrap();

        assert_eq!(stories.len(), 7);
        assert!(stories.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(stories.iter().all(|s| {
            s.title != "Story 4" && s.title != "Story 5" && s.title != "Story 6"
        }));
    }

    #[tokio::test]
    async fn null_items_are_dropped() {
        // id 2 has no payload, which upstream reports as a null body
        let source = FakeSource::from(inner(&[1, 2], &[(1, 5)]));
        let engine = service(source);

        let stories = engine.best_stories(2, &token()).await.unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title, "Story 1");
    }

    #[tokio::test]
    async fn second_call_within_ttl_hits_caches() {
        let source = FakeSource::from(inner(&[1, 2, 3], &[(1, 10), (2, 20), (3, 30)]));
        let engine = service(source.clone());

        let first = engine.best_stories(3, &token()).await.unwrap();
        let second = engine.best_stories(3, &token()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.id_fetches(), 1);
        assert_eq!(source.item_fetches(), 3);
    }

    #[tokio::test]
    async fn expired_ttl_triggers_exactly_one_refetch() {
        let clock = ManualClock::at_epoch();
        let source = FakeSource::from(inner(&[1, 2], &[(1, 10), (2, 20)]));
        let engine = AggregatorService::new(
            source.clone(),
            MemoryTtlCache::with_clock(clock.clone()),
            MemoryTtlCache::with_clock(clock.clone()),
            AggregatorConfig::default(),
        );

        engine.best_stories(2, &token()).await.unwrap();
        clock.advance(SignedDuration::from_secs(301));
        engine.best_stories(2, &token()).await.unwrap();

        assert_eq!(source.id_fetches(), 2);
        assert_eq!(source.item_fetches(), 4);
    }

    #[tokio::test]
    async fn gate_caps_concurrent_fetches() {
        let ids: Vec<u64> = (1..=10).collect();
        let items: Vec<(u64, i64)> = ids.iter().map(|&id| (id, id as i64)).collect();
        let source = FakeSource::from(FakeSourceInner {
            item_delay: Some(Duration::from_millis(30)),
            ..inner(&ids, &items)
        });
        let engine = service_with_config(
            source.clone(),
            AggregatorConfig::builder().max_concurrent_fetches(2).build(),
        );

        let stories = engine.best_stories(10, &token()).await.unwrap();

        assert_eq!(stories.len(), 10);
        assert_eq!(source.item_fetches(), 10);
        assert!(source.max_in_flight() <= 2);
    }

    #[tokio::test]
    async fn cached_results_survive_upstream_outage() {
        let source = FakeSource::from(inner(&[1, 2], &[(1, 10), (2, 20)]));
        let engine = service(source.clone());

        let warm = engine.best_stories(2, &token()).await.unwrap();
        source.break_upstream();
        let cold = engine.best_stories(2, &token()).await.unwrap();

        assert_eq!(warm, cold);
    }

    #[tokio::test]
    async fn cancellation_mid_fanout_returns_cancelled_and_restores_permits() {
        let ids: Vec<u64> = (1..=5).collect();
        let items: Vec<(u64, i64)> = ids.iter().map(|&id| (id, id as i64)).collect();
        let source = FakeSource::from(FakeSourceInner {
            item_delay: Some(Duration::from_secs(30)),
            ..inner(&ids, &items)
        });
        let engine = service_with_config(
            source,
            AggregatorConfig::builder().max_concurrent_fetches(2).build(),
        );

        let cancel = token();
        let call = {
            let engine = engine.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { engine.best_stories(5, &cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), call)
            .await
            .expect("call should return promptly after cancellation")
            .unwrap();
        assert!(matches!(result, Err(AggregateError::Cancelled)));
        assert_eq!(engine.gate().available_permits(), 2);
    }

    #[tokio::test]
    async fn equal_scores_keep_upstream_rank_order() {
        let source = FakeSource::from(inner(&[7, 8, 9], &[(7, 42), (8, 42), (9, 42)]));
        let engine = service(source);

        let stories = engine.best_stories(3, &token()).await.unwrap();

        let titles: Vec<&str> = stories.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Story 7", "Story 8", "Story 9"]);
    }

    #[tokio::test]
    async fn duplicate_ids_resolve_independently() {
        let source = FakeSource::from(inner(&[5, 5], &[(5, 50)]));
        let engine = service(source);

        let stories = engine.best_stories(2, &token()).await.unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0], stories[1]);
    }
}

//! Bounded tile cache with single-flight fetching.
//!
//! # Bookkeeping
//!
//! Two tables live behind one `parking_lot::Mutex`:
//!
//! - `entries`: resolved tiles in an [`LruCache`] bounded at `capacity`
//! - `in_flight`: one shared pending fetch per key
//!
//! The lock is only taken in synchronous sections before and after the
//! awaited fetch, never across it. A request first checks `entries`, then
//! joins an existing fetch in `in_flight`, and only then starts a new one.
//!
//! # Eviction
//!
//! Eviction is FIFO: once a new entry pushes the count past `capacity`,
//! the entry inserted longest ago is dropped. Lookups use `peek`, so a
//! cache hit never renews an entry and recency order stays insertion
//! order.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use lru::LruCache;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::types::{CacheStats, TileError, TileKey, DEFAULT_CACHE_SIZE};
use crate::coord::TileCoord;
use crate::provider::TileSource;
use crate::tile::TileParser;

type FetchResult<T> = Result<Arc<T>, TileError>;
type SharedFetch<T> = Shared<BoxFuture<'static, FetchResult<T>>>;

struct InFlight<T> {
    id: u64,
    fetch: SharedFetch<T>,
}

struct CacheState<T> {
    entries: LruCache<TileKey, Arc<T>>,
    in_flight: HashMap<TileKey, InFlight<T>>,
    next_flight_id: u64,
}

/// Bounded key→tile store that fetches misses through a [`TileSource`].
pub struct TileCache<T> {
    source: Option<Arc<dyn TileSource>>,
    parser: Arc<dyn TileParser<T>>,
    capacity: usize,
    state: Mutex<CacheState<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    failures: AtomicU64,
    evictions: AtomicU64,
}

impl<T> TileCache<T>
where
    T: Send + Sync + 'static,
{
    /// Create a cache holding at most `capacity` tiles, with no source attached.
    ///
    /// A zero capacity is raised to one. Until [`TileCache::with_source`] is
    /// called every request fails with [`TileError::NotConfigured`].
    pub fn new(parser: Arc<dyn TileParser<T>>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source: None,
            parser,
            capacity: capacity.get(),
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                in_flight: HashMap::new(),
                next_flight_id: 0,
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Create a cache with the default bound of 16 tiles.
    pub fn with_default_size(parser: Arc<dyn TileParser<T>>) -> Self {
        Self::new(parser, DEFAULT_CACHE_SIZE)
    }

    /// Attach the transport used for cache misses.
    pub fn with_source(mut self, source: Arc<dyn TileSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Get a tile, fetching and parsing it on a miss.
    ///
    /// Concurrent requests for the same tile share one fetch and receive
    /// the same result. Failures are not cached; the next request for the
    /// tile starts a fresh fetch.
    pub async fn get_tile(&self, tile: TileCoord) -> Result<Arc<T>, TileError> {
        let source = self.source.as_ref().ok_or(TileError::NotConfigured)?;
        let key = TileKey::from(tile);

        let (flight_id, fetch) = {
            let mut state = self.state.lock();

            if let Some(data) = state.entries.peek(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %key, "Tile cache hit");
                return Ok(Arc::clone(data));
            }

            if let Some(flight) = state.in_flight.get(&key) {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Joining in-flight tile fetch");
                (flight.id, flight.fetch.clone())
            } else {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let id = state.next_flight_id;
                state.next_flight_id += 1;

                let fetch = Self::fetch(Arc::clone(source), Arc::clone(&self.parser), tile)
                    .boxed()
                    .shared();
                state.in_flight.insert(
                    key,
                    InFlight {
                        id,
                        fetch: fetch.clone(),
                    },
                );
                debug!(key = %key, "Tile cache miss, fetching");
                (id, fetch)
            }
        };

        let result = fetch.await;
        self.complete(key, flight_id, &result);
        result
    }

    async fn fetch(
        source: Arc<dyn TileSource>,
        parser: Arc<dyn TileParser<T>>,
        tile: TileCoord,
    ) -> FetchResult<T> {
        let raw = source.fetch_raw(tile).await?;
        let data = parser.parse(tile, raw).await?;
        Ok(Arc::new(data))
    }

    /// Settles a finished fetch. Only the first waiter to arrive does the
    /// bookkeeping; the flight id guards against touching a newer fetch
    /// for the same key.
    fn complete(&self, key: TileKey, flight_id: u64, result: &FetchResult<T>) {
        let mut state = self.state.lock();

        let owns_flight = state
            .in_flight
            .get(&key)
            .is_some_and(|flight| flight.id == flight_id);
        if !owns_flight {
            return;
        }
        state.in_flight.remove(&key);

        match result {
            Ok(data) => {
                if let Some((evicted, _)) = state.entries.push(key, Arc::clone(data)) {
                    if evicted != key {
                        self.evictions.fetch_add(1, Ordering::Relaxed);
                        debug!(key = %evicted, "Evicted tile");
                    }
                }
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Tile request failed");
            }
        }
    }

    /// Whether a resolved tile is retained.
    pub fn contains(&self, tile: TileCoord) -> bool {
        self.state.lock().entries.contains(&TileKey::from(tile))
    }

    /// Retained tiles, oldest first.
    pub fn cached_tiles(&self) -> Vec<TileCoord> {
        self.state
            .lock()
            .entries
            .iter()
            .rev()
            .map(|(key, _)| key.tile())
            .collect()
    }

    /// Number of retained tiles.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained tiles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether a transport is attached.
    pub fn is_configured(&self) -> bool {
        self.source.is_some()
    }

    /// Drop all retained tiles. Outstanding fetches are left running.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (entry_count, in_flight) = {
            let state = self.state.lock();
            (state.entries.len(), state.in_flight.len())
        };
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count,
            in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;
    use crate::tile::{ParseError, RawTile, RawTileParser};
    use bytes::Bytes;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Source that answers with the tile's path, optionally waiting on a gate.
    #[derive(Default)]
    struct ScriptedSource {
        calls: AtomicUsize,
        failures: HashMap<TileCoord, ProviderError>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedSource {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TileSource for ScriptedSource {
        fn fetch_raw(&self, tile: TileCoord) -> BoxFuture<'_, Result<Bytes, ProviderError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                match self.failures.get(&tile) {
                    Some(e) => Err(e.clone()),
                    None => Ok(Bytes::from(tile.to_string())),
                }
            }
            .boxed()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct FailingParser;

    impl TileParser<RawTile> for FailingParser {
        fn parse(
            &self,
            tile: TileCoord,
            _raw: Bytes,
        ) -> BoxFuture<'_, Result<RawTile, ParseError>> {
            async move { Err(ParseError::new(tile, "bad protobuf")) }.boxed()
        }
    }

    fn cache_with(source: Arc<ScriptedSource>, capacity: usize) -> TileCache<RawTile> {
        TileCache::new(Arc::new(RawTileParser), capacity).with_source(source)
    }

    fn tile(i: u32) -> TileCoord {
        TileCoord::new(10, 500 + i, 300)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let source = Arc::new(ScriptedSource::default());
        let cache = cache_with(Arc::clone(&source), 16);

        let first = cache.get_tile(tile(0)).await.unwrap();
        let second = cache.get_tile(tile(0)).await.unwrap();

        assert_eq!(first.data.as_ref(), b"10/500/300");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.calls(), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test]
    async fn test_twenty_requests_keep_sixteen_newest() {
        let source = Arc::new(ScriptedSource::default());
        let cache = cache_with(Arc::clone(&source), 16);

        for i in 0..20 {
            cache.get_tile(tile(i)).await.unwrap();
            assert!(cache.len() <= 16);
        }

        assert_eq!(cache.len(), 16);
        for i in 0..4 {
            assert!(!cache.contains(tile(i)), "tile {} should be evicted", i);
        }
        for i in 4..20 {
            assert!(cache.contains(tile(i)), "tile {} should be cached", i);
        }
        assert_eq!(cache.stats().evictions, 4);
        assert_eq!(cache.cached_tiles().first(), Some(&tile(4)));
    }

    #[tokio::test]
    async fn test_hit_does_not_renew_entry() {
        let source = Arc::new(ScriptedSource::default());
        let cache = cache_with(Arc::clone(&source), 3);

        for i in 0..3 {
            cache.get_tile(tile(i)).await.unwrap();
        }
        cache.get_tile(tile(0)).await.unwrap();
        cache.get_tile(tile(3)).await.unwrap();

        assert!(!cache.contains(tile(0)));
        assert!(cache.contains(tile(1)));
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_cached_tiles_stay_in_insertion_order_after_hits() {
        let source = Arc::new(ScriptedSource::default());
        let cache = cache_with(Arc::clone(&source), 4);

        for i in 0..4 {
            cache.get_tile(tile(i)).await.unwrap();
        }
        cache.get_tile(tile(0)).await.unwrap();
        cache.get_tile(tile(2)).await.unwrap();

        assert_eq!(
            cache.cached_tiles(),
            vec![tile(0), tile(1), tile(2), tile(3)]
        );
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[tokio::test]
    async fn test_zero_capacity_keeps_one_tile() {
        let source = Arc::new(ScriptedSource::default());
        let cache = cache_with(Arc::clone(&source), 0);
        assert_eq!(cache.capacity(), 1);

        cache.get_tile(tile(0)).await.unwrap();
        cache.get_tile(tile(1)).await.unwrap();

        assert_eq!(cache.cached_tiles(), vec![tile(1)]);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let gate = Arc::new(Notify::new());
        let source = Arc::new(ScriptedSource {
            gate: Some(Arc::clone(&gate)),
            ..Default::default()
        });
        let cache = cache_with(Arc::clone(&source), 16);

        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };
        let (a, b, ()) = tokio::time::timeout(
            Duration::from_secs(5),
            async { tokio::join!(cache.get_tile(tile(7)), cache.get_tile(tile(7)), release) },
        )
        .await
        .expect("single-flight fetch should complete");

        let (a, b) = (a.unwrap(), b.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.calls(), 1);

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.coalesced, 1);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[tokio::test]
    async fn test_concurrent_failure_is_shared() {
        let gate = Arc::new(Notify::new());
        let mut failures = HashMap::new();
        failures.insert(tile(1), ProviderError::Http("connection reset".to_string()));
        let source = Arc::new(ScriptedSource {
            gate: Some(Arc::clone(&gate)),
            failures,
            ..Default::default()
        });
        let cache = cache_with(Arc::clone(&source), 16);

        let release = async {
            tokio::task::yield_now().await;
            gate.notify_one();
        };
        let (a, b, ()) = tokio::join!(cache.get_tile(tile(1)), cache.get_tile(tile(1)), release);

        assert_eq!(a.unwrap_err(), b.unwrap_err());
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_http_404_is_not_cached_and_can_retry() {
        let target = TileCoord::new(5, 10, 10);
        let mut failures = HashMap::new();
        failures.insert(
            target,
            ProviderError::HttpStatus {
                status: 404,
                reason: "Not Found".to_string(),
            },
        );
        let source = Arc::new(ScriptedSource {
            failures,
            ..Default::default()
        });
        let cache = cache_with(Arc::clone(&source), 16);

        let err = cache.get_tile(target).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, TileError::Provider(_)));
        assert!(!cache.contains(target));
        assert_eq!(cache.stats().in_flight, 0);

        let _ = cache.get_tile(target).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_parse_failure_is_not_cached() {
        let source = Arc::new(ScriptedSource::default());
        let cache: TileCache<RawTile> =
            TileCache::new(Arc::new(FailingParser), 16).with_source(source.clone());

        let err = cache.get_tile(tile(0)).await.unwrap_err();
        assert!(matches!(err, TileError::Parse(_)));
        assert!(cache.is_empty());

        let _ = cache.get_tile(tile(0)).await;
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_source_is_a_configuration_error() {
        let cache: TileCache<RawTile> = TileCache::with_default_size(Arc::new(RawTileParser));

        assert!(!cache.is_configured());
        assert_eq!(cache.capacity(), 16);
        assert_eq!(
            cache.get_tile(tile(0)).await.unwrap_err(),
            TileError::NotConfigured
        );
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let source = Arc::new(ScriptedSource::default());
        let cache = cache_with(Arc::clone(&source), 16);

        cache.get_tile(tile(0)).await.unwrap();
        cache.clear();
        assert!(cache.is_empty());

        cache.get_tile(tile(0)).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_bound_holds_under_concurrent_load() {
        let source = Arc::new(ScriptedSource::default());
        let cache = Arc::new(cache_with(Arc::clone(&source), 8));

        let mut handles = Vec::new();
        for i in 0..64 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.get_tile(tile(i % 24)).await.unwrap();
                assert!(cache.len() <= 8);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len(), 8);
        assert_eq!(cache.stats().in_flight, 0);
    }
}

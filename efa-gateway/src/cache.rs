//! Short-lived caching of normalized departure boards.
//!
//! Departure boards change by the minute, but bursts of requests for the
//! same stop are common (several displays polling one stop). Boards are
//! cached for a fixed TTL (30 seconds by default) after normalization, so
//! a hit costs no upstream call and no parsing.
//!
//! Expiry is lazy: an expired entry stays in the map, reads treat it as
//! absent, and the next successful fetch for the key overwrites it. There
//! is no eviction sweep beyond the store's capacity bound.
//!
//! Concurrent misses for the same key each fetch upstream and the last
//! writer wins. Sharing one in-flight fetch per key would avoid the
//! duplicate calls but is not done here.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::{BoardOptions, Departure, StopCandidate};
use crate::efa::{EfaApi, EfaError};
use crate::normalize::normalize_board;
use crate::resolve::{StopQuery, resolve};

/// Cached departure board entry.
pub type BoardEntry = Arc<Vec<Departure>>;

/// Source of the current instant, replaceable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long an entry stays valid.
    pub ttl: Duration,

    /// Maximum number of stored entries, sized to the number of stops
    /// times the flag combinations in use.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            max_capacity: 10_000,
        }
    }
}

/// A stored value and when it was stored.
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Key-value store with a fixed time-to-live.
///
/// Backed by a concurrent map with internal locking; no lock is held
/// outside a single `get` or `put`.
pub struct TtlCache<K, V> {
    entries: MokaCache<K, Arc<CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache on the system clock.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache on the given clock.
    pub fn with_clock(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        // No time_to_live on the store itself: expiry is decided on read.
        let entries = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .build();

        Self {
            entries,
            ttl: config.ttl,
            clock,
        }
    }

    /// Get a value stored less than one TTL ago.
    pub async fn get(&self, key: &K) -> Option<V> {
        let entry = self.entries.get(key).await?;
        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        (age < self.ttl).then(|| entry.value.clone())
    }

    /// Store a value, replacing any previous entry for the key.
    pub async fn put(&self, key: K, value: V) {
        let entry = Arc::new(CacheEntry {
            value,
            stored_at: self.clock.now(),
        });
        self.entries.insert(key, entry).await;
    }

    /// Whether an entry is physically stored, expired or not.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// The configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Approximate number of stored entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

/// Cache key for a departure board: the stop plus the flags that shape
/// the normalized records.
///
/// Displays as `<stopId>[_detailed][_delay]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoardKey {
    pub stop_id: String,
    pub options: BoardOptions,
}

impl BoardKey {
    pub fn new(stop_id: impl Into<String>, options: BoardOptions) -> Self {
        Self {
            stop_id: stop_id.into(),
            options,
        }
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stop_id)?;
        if self.options.detailed {
            f.write_str("_detailed")?;
        }
        if self.options.include_delay {
            f.write_str("_delay")?;
        }
        Ok(())
    }
}

/// EFA client with cached, normalized departure boards.
///
/// Stop searches pass straight through to the resolver.
pub struct CachedEfaClient<C> {
    client: C,
    boards: TtlCache<BoardKey, BoardEntry>,
}

impl<C: EfaApi> CachedEfaClient<C> {
    /// Create a new cached client.
    pub fn new(client: C, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            boards: TtlCache::new(cache_config),
        }
    }

    /// Create a cached client on the given clock.
    pub fn with_clock(client: C, cache_config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            boards: TtlCache::with_clock(cache_config, clock),
        }
    }

    /// Get the normalized departure board for a stop.
    ///
    /// Failed fetches are not cached.
    pub async fn departures(
        &self,
        stop_id: &str,
        options: BoardOptions,
    ) -> Result<BoardEntry, EfaError> {
        let key = BoardKey::new(stop_id, options);

        if let Some(cached) = self.boards.get(&key).await {
            debug!(%key, "departure board cache hit");
            return Ok(cached);
        }

        debug!(
            %key,
            entries = self.boards.entry_count(),
            "departure board cache miss"
        );
        let raw = self.client.departure_board(stop_id).await?;
        let entry: BoardEntry = Arc::new(normalize_board(&raw, options));

        debug!(
            %key,
            departures = entry.len(),
            ttl_secs = self.boards.ttl().as_secs(),
            "caching departure board"
        );
        self.boards.put(key, entry.clone()).await;
        Ok(entry)
    }

    /// Resolve a stop search (uncached).
    pub async fn search_stops(&self, query: &StopQuery) -> Result<Vec<StopCandidate>, EfaError> {
        resolve(&self.client, query).await
    }

    /// Access the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The board cache.
    pub fn boards(&self) -> &TtlCache<BoardKey, BoardEntry> {
        &self.boards
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
pub(crate) struct ManualClock {
    start: Instant,
    offset: std::sync::Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: std::sync::Mutex::new(Duration::ZERO),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock().unwrap()
    }
}

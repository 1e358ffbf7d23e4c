//! Keyed resource cache with staleness, invalidation and fetch deduplication
//!
//! One [`ResourceCache`] is created at startup and handed (cheaply cloned) to
//! every accessor and controller. Entry transitions happen under a single
//! async lock so readers never observe a half-applied fetch.
//!
//! Fetches run as spawned tasks: a fetch keeps going and lands in the cache
//! even when every caller that started it has gone away.

mod entry;
mod key;


pub use entry::{CacheEntry, CachePolicy, CacheStatus, QueryState, DEFAULT_CACHE_TIME};
pub use key::{CacheKey, ANALYTICS, MODEL_INFO, PLAYERS, TOP_PLAYERS};

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use futures_util::FutureExt;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{ClientError, ClientResult};
use entry::{downcast, CachedValue, FetchOutcome, InFlight, Lookup, Observers, Slot};

/// Counters for cache behaviour
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served fresh from cache
    pub hits: u64,
    /// Reads that found no value and started a fetch
    pub misses: u64,
    /// Reads that found no value and joined a fetch already running
    pub joins: u64,
    /// Reads served stale while a background refetch started
    pub revalidations: u64,
    /// Fetches started
    pub fetches: u64,
    /// Fetches that failed
    pub failures: u64,
    /// Entries purged for being idle past their cache time
    pub evictions: u64,
}

struct CacheState {
    entries: HashMap<String, Slot>,
    stats: CacheStats,
}

struct CacheInner {
    state: RwLock<CacheState>,
    next_fetch_id: AtomicU64,
}

/// Process-wide resource cache handle
#[derive(Clone)]
pub struct ResourceCache {
    inner: Arc<CacheInner>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CacheInner {
                state: RwLock::new(CacheState {
                    entries: HashMap::new(),
                    stats: CacheStats::default(),
                }),
                next_fetch_id: AtomicU64::new(1),
            }),
        }
    }

    /// Read `key`, fetching through `fetcher` when needed.
    ///
    /// - no value: one fetch is started (or joined, if already running) and
    ///   awaited
    /// - fresh value: returned as is, no fetch
    /// - stale, invalidated or errored value: returned immediately while a
    ///   single background refetch runs
    pub async fn get<T, F, Fut>(&self, key: &CacheKey, policy: CachePolicy, fetcher: F) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let mut rx = {
            let now = Instant::now();
            let mut state = self.inner.state.write().await;
            Self::sweep_locked(&mut state, now);

            let CacheState { entries, stats } = &mut *state;
            let slot = entries
                .entry(key.as_str().to_string())
                .or_insert_with(|| Slot::new(policy, now));
            slot.policy = policy;
            slot.last_access = now;
            if slot.reap_dead_fetch() {
                warn!(key = %key, "Previous fetch ended without a result, fetching again");
            }

            match slot.lookup(now) {
                Lookup::Fresh => {
                    stats.hits += 1;
                    debug!(key = %key, "Cache hit");
                    return slot.snapshot(key.as_str(), now);
                }
                Lookup::Revalidate => {
                    if slot.in_flight.is_none() {
                        stats.revalidations += 1;
                        stats.fetches += 1;
                        debug!(key = %key, "Serving stale value, revalidating in background");
                        self.start_fetch(key, slot, fetcher);
                    }
                    return slot.snapshot(key.as_str(), now);
                }
                Lookup::Missing => {
                    let running = slot.in_flight.as_ref().map(|f| (f.id, f.rx.clone()));
                    match running {
                        Some((fetch_id, rx)) => {
                            stats.joins += 1;
                            debug!(key = %key, fetch_id, "Joining in-flight fetch");
                            rx
                        }
                        None => {
                            stats.misses += 1;
                            stats.fetches += 1;
                            self.start_fetch(key, slot, fetcher)
                        }
                    }
                }
            }
        };

        let outcome = match rx.wait_for(Option::is_some).await {
            Ok(outcome) => match &*outcome {
                Some(outcome) => outcome.clone(),
                None => Err(ClientError::network("fetch finished without a result")),
            },
            Err(_) => Err(ClientError::network(format!("fetch for {key} was dropped"))),
        };

        match outcome {
            Ok(value) => {
                let state = self.inner.state.read().await;
                // The entry may have been removed and recreated by a newer read
                let holds_result = |slot: &&Slot| slot.value.as_ref().is_some_and(|v| Arc::ptr_eq(v, &value));
                match state.entries.get(key.as_str()).filter(holds_result) {
                    Some(slot) => slot.snapshot(key.as_str(), Instant::now()),
                    None => match downcast::<T>(value, key.as_str()) {
                        Ok(data) => QueryState {
                            data: Some(data),
                            status: CacheStatus::Fresh,
                            error: None,
                            fetched_at: Some(Utc::now()),
                        },
                        Err(mismatch) => QueryState::failed(mismatch),
                    },
                }
            }
            Err(error) => QueryState::failed(error),
        }
    }

    /// Register the fetch on `slot` and spawn it
    fn start_fetch<T, F, Fut>(&self, key: &CacheKey, slot: &mut Slot, fetcher: F) -> watch::Receiver<Option<FetchOutcome>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let fetch_id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let epoch = slot.epoch;
        slot.in_flight = Some(InFlight {
            id: fetch_id,
            rx: rx.clone(),
        });

        info!(key = %key, fetch_id, "Fetching");
        let fetch = fetcher();
        let cache = self.clone();
        let key = key.clone();

        tokio::spawn(async move {
            let outcome: FetchOutcome = match AssertUnwindSafe(fetch).catch_unwind().await {
                Ok(result) => result.map(|value| Arc::new(value) as CachedValue),
                Err(_) => Err(ClientError::network(format!("fetch for {key} panicked"))),
            };
            cache.complete(&key, fetch_id, epoch, &outcome).await;
            tx.send_replace(Some(outcome));
        });

        rx
    }

    /// Apply a finished fetch to its entry, if the entry still expects it
    async fn complete(&self, key: &CacheKey, fetch_id: u64, epoch: u64, outcome: &FetchOutcome) {
        let now = Instant::now();
        let mut state = self.inner.state.write().await;
        let CacheState { entries, stats } = &mut *state;

        let Some(slot) = entries.get_mut(key.as_str()) else {
            debug!(key = %key, fetch_id, "Entry removed while fetching, result not cached");
            return;
        };
        if slot.in_flight.as_ref().map(|f| f.id) != Some(fetch_id) {
            debug!(key = %key, fetch_id, "Entry replaced while fetching, result not cached");
            return;
        }

        slot.in_flight = None;
        slot.last_access = now;
        match outcome {
            Ok(value) => {
                slot.value = Some(value.clone());
                slot.fetched_at = Some(now);
                slot.fetched_wall = Some(Utc::now());
                slot.last_error = None;
                slot.invalidated = slot.epoch != epoch;
                info!(key = %key, fetch_id, "Fetch completed");
            }
            Err(err) => {
                stats.failures += 1;
                slot.last_error = Some(err.clone());
                error!(key = %key, fetch_id, error = %err, retained = slot.value.is_some(), "Fetch failed");
            }
        }
    }

    /// Current state of `key` without fetching
    pub async fn peek<T>(&self, key: &CacheKey) -> QueryState<T>
    where
        T: Send + Sync + 'static,
    {
        let now = Instant::now();
        let mut state = self.inner.state.write().await;
        Self::sweep_locked(&mut state, now);

        match state.entries.get_mut(key.as_str()) {
            Some(slot) => {
                slot.last_access = now;
                slot.snapshot(key.as_str(), now)
            }
            None => QueryState::empty(),
        }
    }

    /// Mark every entry matching `pattern` stale.
    ///
    /// `pattern` is either a full key or a resource name covering all of its
    /// parameterisations. No fetch is performed; the next read revalidates.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        let mut state = self.inner.state.write().await;
        let mut marked = 0;
        for (key, slot) in state.entries.iter_mut() {
            if CacheKey::new(key.as_str()).matches(pattern) {
                slot.invalidated = true;
                slot.epoch += 1;
                marked += 1;
            }
        }
        info!(pattern, marked, "Invalidated cache entries");
        marked
    }

    /// Mark every entry stale
    pub async fn invalidate_all(&self) -> usize {
        let mut state = self.inner.state.write().await;
        for slot in state.entries.values_mut() {
            slot.invalidated = true;
            slot.epoch += 1;
        }
        let marked = state.entries.len();
        info!(marked, "Invalidated all cache entries");
        marked
    }

    /// Register an active observer of `key`; the entry is never evicted
    /// while the returned guard is alive
    pub async fn subscribe(&self, key: &CacheKey) -> Subscription {
        let now = Instant::now();
        let mut state = self.inner.state.write().await;
        let slot = state
            .entries
            .entry(key.as_str().to_string())
            .or_insert_with(|| Slot::new(CachePolicy::default(), now));
        slot.last_access = now;
        slot.observers.acquire();

        Subscription {
            key: key.clone(),
            observers: slot.observers.clone(),
        }
    }

    /// Evict idle entries now; returns how many were purged
    pub async fn sweep(&self) -> usize {
        let mut state = self.inner.state.write().await;
        Self::sweep_locked(&mut state, Instant::now())
    }

    fn sweep_locked(state: &mut CacheState, now: Instant) -> usize {
        let before = state.entries.len();
        state.entries.retain(|key, slot| {
            if slot.reap_dead_fetch() {
                debug!(key = %key, "Dropping dead in-flight fetch");
            }
            let evict = slot.is_evictable(now);
            if evict {
                debug!(key = %key, "Evicting idle cache entry");
            }
            !evict
        });
        let evicted = before - state.entries.len();
        state.stats.evictions += evicted as u64;
        evicted
    }

    /// Sweep on a fixed interval until the handle is dropped
    pub fn spawn_sweeper(&self, interval: Duration) -> SweeperHandle {
        let cache = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = cache.sweep().await;
                if evicted > 0 {
                    debug!(evicted, "Background sweep evicted entries");
                }
            }
        });
        SweeperHandle { handle }
    }

    /// Drop `key` outright; an in-flight fetch for it will not be cached
    pub async fn remove(&self, key: &CacheKey) -> bool {
        self.inner.state.write().await.entries.remove(key.as_str()).is_some()
    }

    pub async fn clear(&self) {
        self.inner.state.write().await.entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.inner.state.read().await.entries.contains_key(key.as_str())
    }

    /// Keys currently held, sorted
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.state.read().await.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Introspection view of `key`
    pub async fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        let state = self.inner.state.read().await;
        state
            .entries
            .get(key.as_str())
            .map(|slot| slot.describe(key.as_str(), Instant::now()))
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.state.read().await.stats.clone()
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Active observer of a cache key; releasing it restarts the idle clock
pub struct Subscription {
    key: CacheKey,
    observers: Arc<Observers>,
}

impl Subscription {
    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.observers.release();
    }
}

/// Background sweeper task, aborted on drop
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn abort(&self) {
        self.handle.abort();
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

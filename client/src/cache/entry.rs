//! Cache entry state and the snapshots handed to readers

use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::ClientError;

/// Eviction delay used when a caller only picks a stale time
pub const DEFAULT_CACHE_TIME: Duration = Duration::from_secs(10 * 60);

/// Opaque cached payload; typed access downcasts it
pub(crate) type CachedValue = Arc<dyn Any + Send + Sync>;

/// Result of one fetch, shared with every caller waiting on it
pub(crate) type FetchOutcome = Result<CachedValue, ClientError>;

/// Lifecycle status of a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing cached and nothing in flight
    Empty,
    /// First fetch in flight, no value yet
    Loading,
    /// Value younger than its stale time
    Fresh,
    /// Value usable but due for revalidation
    Stale,
    /// Last fetch failed; a previous value may still be present
    Error,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Empty => write!(f, "empty"),
            CacheStatus::Loading => write!(f, "loading"),
            CacheStatus::Fresh => write!(f, "fresh"),
            CacheStatus::Stale => write!(f, "stale"),
            CacheStatus::Error => write!(f, "error"),
        }
    }
}

/// Staleness and eviction timings for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub stale_time: Duration,
    pub cache_time: Duration,
}

impl CachePolicy {
    /// `cache_time` is raised to `stale_time` when given smaller
    pub fn new(stale_time: Duration, cache_time: Duration) -> Self {
        Self {
            stale_time,
            cache_time: cache_time.max(stale_time),
        }
    }

    /// Policy with the default eviction delay
    pub fn with_stale_time(stale_time: Duration) -> Self {
        Self::new(stale_time, DEFAULT_CACHE_TIME)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::new(Duration::ZERO, DEFAULT_CACHE_TIME)
    }
}

/// What a reader sees for one key
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub status: CacheStatus,
    pub error: Option<ClientError>,
    /// Wall-clock time of the fetch that produced `data`
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> QueryState<T> {
    pub fn empty() -> Self {
        Self {
            data: None,
            status: CacheStatus::Empty,
            error: None,
            fetched_at: None,
        }
    }

    pub(crate) fn failed(error: ClientError) -> Self {
        Self {
            data: None,
            status: CacheStatus::Error,
            error: Some(error),
            fetched_at: None,
        }
    }

    /// No data yet and a fetch is running
    pub fn is_loading(&self) -> bool {
        self.status == CacheStatus::Loading
    }

    pub fn is_error(&self) -> bool {
        self.status == CacheStatus::Error
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

/// Introspection view of a cache entry
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub status: CacheStatus,
    pub has_value: bool,
    pub fetched_at: Option<DateTime<Utc>>,
    pub stale_time: Duration,
    pub cache_time: Duration,
    pub last_error: Option<ClientError>,
    pub subscribers: usize,
}

/// Active observer bookkeeping shared with [`super::Subscription`] guards
#[derive(Debug)]
pub(crate) struct Observers {
    count: AtomicUsize,
    released_at: Mutex<Option<Instant>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            count: AtomicUsize::new(0),
            released_at: Mutex::new(None),
        }
    }

    pub(crate) fn acquire(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn release(&self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
        if let Ok(mut released_at) = self.released_at.lock() {
            *released_at = Some(Instant::now());
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn released_at(&self) -> Option<Instant> {
        self.released_at.lock().ok().and_then(|at| *at)
    }
}

#[derive(Debug)]
pub(crate) struct InFlight {
    pub(crate) id: u64,
    pub(crate) rx: watch::Receiver<Option<FetchOutcome>>,
}

impl InFlight {
    /// The fetch task still holds its sender. A finished fetch detaches
    /// itself before sending, so a closed channel here means the task died.
    pub(crate) fn is_alive(&self) -> bool {
        self.rx.has_changed().is_ok()
    }
}

/// How a `get` should be served
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// Serve from cache, no network
    Fresh,
    /// Serve from cache and refetch in the background
    Revalidate,
    /// Nothing to serve, wait for a fetch
    Missing,
}

/// Internal per-key state; only touched under the cache lock
pub(crate) struct Slot {
    pub(crate) value: Option<CachedValue>,
    pub(crate) fetched_at: Option<Instant>,
    pub(crate) fetched_wall: Option<DateTime<Utc>>,
    pub(crate) policy: CachePolicy,
    pub(crate) invalidated: bool,
    /// Bumped on every invalidation; a fetch started before the bump does
    /// not clear the invalidation when it lands
    pub(crate) epoch: u64,
    pub(crate) last_error: Option<ClientError>,
    pub(crate) in_flight: Option<InFlight>,
    pub(crate) observers: Arc<Observers>,
    pub(crate) last_access: Instant,
}

impl Slot {
    pub(crate) fn new(policy: CachePolicy, now: Instant) -> Self {
        Self {
            value: None,
            fetched_at: None,
            fetched_wall: None,
            policy,
            invalidated: false,
            epoch: 0,
            last_error: None,
            in_flight: None,
            observers: Arc::new(Observers::new()),
            last_access: now,
        }
    }

    /// Forget an in-flight fetch whose task ended without completing.
    /// Returns whether one was dropped.
    pub(crate) fn reap_dead_fetch(&mut self) -> bool {
        if self.in_flight.as_ref().is_some_and(|f| !f.is_alive()) {
            self.in_flight = None;
            return true;
        }
        false
    }

    fn is_stale(&self, now: Instant) -> bool {
        if self.invalidated {
            return true;
        }
        match self.fetched_at {
            Some(fetched_at) => now.saturating_duration_since(fetched_at) >= self.policy.stale_time,
            None => true,
        }
    }

    pub(crate) fn lookup(&self, now: Instant) -> Lookup {
        if self.value.is_none() {
            Lookup::Missing
        } else if self.last_error.is_some() || self.is_stale(now) {
            Lookup::Revalidate
        } else {
            Lookup::Fresh
        }
    }

    pub(crate) fn status(&self, now: Instant) -> CacheStatus {
        match (&self.value, &self.last_error) {
            (None, _) if self.in_flight.is_some() => CacheStatus::Loading,
            (_, Some(_)) => CacheStatus::Error,
            (None, None) => CacheStatus::Empty,
            (Some(_), None) if self.is_stale(now) => CacheStatus::Stale,
            (Some(_), None) => CacheStatus::Fresh,
        }
    }

    /// Idle since the later of last access and last subscriber release
    pub(crate) fn is_evictable(&self, now: Instant) -> bool {
        if self.observers.count() > 0 || self.in_flight.is_some() {
            return false;
        }
        let idle_since = match self.observers.released_at() {
            Some(released_at) => released_at.max(self.last_access),
            None => self.last_access,
        };
        now.saturating_duration_since(idle_since) >= self.policy.cache_time
    }

    pub(crate) fn snapshot<T>(&self, key: &str, now: Instant) -> QueryState<T>
    where
        T: Send + Sync + 'static,
    {
        let data = match &self.value {
            Some(value) => match downcast::<T>(value.clone(), key) {
                Ok(data) => Some(data),
                Err(mismatch) => return QueryState::failed(mismatch),
            },
            None => None,
        };

        QueryState {
            data,
            status: self.status(now),
            error: self.last_error.clone(),
            fetched_at: self.fetched_wall,
        }
    }

    pub(crate) fn describe(&self, key: &str, now: Instant) -> CacheEntry {
        CacheEntry {
            key: key.to_string(),
            status: self.status(now),
            has_value: self.value.is_some(),
            fetched_at: self.fetched_wall,
            stale_time: self.policy.stale_time,
            cache_time: self.policy.cache_time,
            last_error: self.last_error.clone(),
            subscribers: self.observers.count(),
        }
    }
}

pub(crate) fn downcast<T>(value: CachedValue, key: &str) -> Result<Arc<T>, ClientError>
where
    T: Send + Sync + 'static,
{
    value.downcast::<T>().map_err(|_| ClientError::TypeMismatch {
        key: key.to_string(),
    })
}

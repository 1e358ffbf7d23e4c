//! Cached read accessors for the optimizer service
//!
//! Each accessor binds one endpoint to its cache key and staleness policy.
//! Callers get a [`QueryResult`] describing what is currently known,
//! including stale data and the last failure.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use shared::{HealthStatus, ModelInfo, Player, Position, PositionStat, TopPlayer};
use crate::cache::{CacheKey, CachePolicy, CacheStatus, QueryState, ResourceCache};
use crate::error::{ClientError, ClientResult};
use crate::traits::ApiClient;

pub const PLAYERS_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const ANALYTICS_STALE_TIME: Duration = Duration::from_secs(10 * 60);
pub const TOP_PLAYERS_STALE_TIME: Duration = Duration::from_secs(5 * 60);
pub const MODEL_INFO_STALE_TIME: Duration = Duration::from_secs(10 * 60);

/// Read-side view of one cached resource
#[derive(Debug, Clone)]
pub struct QueryResult<T> {
    pub data: Option<Arc<T>>,
    /// True only while no data exists and a fetch is running
    pub is_loading: bool,
    pub error: Option<ClientError>,
    pub status: CacheStatus,
}

impl<T> QueryResult<T> {
    /// Nothing requested, nothing fetched
    pub fn idle() -> Self {
        QueryState::empty().into()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Stale or errored data still on hand
    pub fn is_degraded(&self) -> bool {
        self.data.is_some() && self.status != CacheStatus::Fresh
    }
}

impl<T> From<QueryState<T>> for QueryResult<T> {
    fn from(state: QueryState<T>) -> Self {
        Self {
            is_loading: state.is_loading(),
            data: state.data,
            error: state.error,
            status: state.status,
        }
    }
}

/// Cached accessors over an [`ApiClient`]
#[derive(Clone)]
pub struct Queries {
    cache: ResourceCache,
    api: Arc<dyn ApiClient>,
    top_players_limit: u32,
}

impl Queries {
    pub fn new(cache: ResourceCache, api: Arc<dyn ApiClient>, top_players_limit: u32) -> Self {
        Self {
            cache,
            api,
            top_players_limit,
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    pub async fn players(&self) -> QueryResult<Vec<Player>> {
        let api = self.api.clone();
        self.cache
            .get(&CacheKey::players(), CachePolicy::with_stale_time(PLAYERS_STALE_TIME), move || async move {
                api.get_players().await
            })
            .await
            .into()
    }

    /// Per-position aggregates
    pub async fn analytics(&self) -> QueryResult<Vec<PositionStat>> {
        let api = self.api.clone();
        self.cache
            .get(&CacheKey::analytics(), CachePolicy::with_stale_time(ANALYTICS_STALE_TIME), move || async move {
                api.get_position_stats().await
            })
            .await
            .into()
    }

    /// Best players for `position`; without a position nothing is fetched
    pub async fn top_players(&self, position: Option<Position>) -> QueryResult<Vec<TopPlayer>> {
        let Some(position) = position else {
            debug!("No position selected, top players query idle");
            return QueryResult::idle();
        };

        let api = self.api.clone();
        let limit = self.top_players_limit;
        self.cache
            .get(
                &CacheKey::top_players(position),
                CachePolicy::with_stale_time(TOP_PLAYERS_STALE_TIME),
                move || async move { api.get_top_players(position, limit).await },
            )
            .await
            .into()
    }

    pub async fn model_info(&self) -> QueryResult<ModelInfo> {
        let api = self.api.clone();
        self.cache
            .get(&CacheKey::model_info(), CachePolicy::with_stale_time(MODEL_INFO_STALE_TIME), move || async move {
                api.get_model_info().await
            })
            .await
            .into()
    }

    /// Service health, never cached
    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.api.health_check().await
    }

    pub async fn peek_players(&self) -> QueryResult<Vec<Player>> {
        self.cache.peek(&CacheKey::players()).await.into()
    }

    pub async fn peek_analytics(&self) -> QueryResult<Vec<PositionStat>> {
        self.cache.peek(&CacheKey::analytics()).await.into()
    }

    pub async fn peek_top_players(&self, position: Position) -> QueryResult<Vec<TopPlayer>> {
        self.cache.peek(&CacheKey::top_players(position)).await.into()
    }

    pub async fn peek_model_info(&self) -> QueryResult<ModelInfo> {
        self.cache.peek(&CacheKey::model_info()).await.into()
    }
}

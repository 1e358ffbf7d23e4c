//! Mutation controller for optimization and data refresh requests
//!
//! Every submission takes a fresh token. When a response arrives it is applied
//! to the controller state only if its token is still the latest one issued;
//! older responses go back to their own caller and nowhere else.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use shared::{OptimizationRequest, OptimizationResult, RefreshSummary};
use crate::cache::{ResourceCache, ANALYTICS, MODEL_INFO, PLAYERS, TOP_PLAYERS};
use crate::error::{ClientError, ClientResult};
use crate::traits::ApiClient;

/// Lifecycle of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Idle,
    Pending,
    Success,
    Error,
}

/// Point-in-time view of a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationSnapshot<T> {
    pub status: MutationStatus,
    /// Most recent applied result; survives later failures
    pub latest: Option<T>,
    pub error: Option<ClientError>,
    /// Token of the most recent submission
    pub token: u64,
}

impl<T> MutationSnapshot<T> {
    pub fn is_pending(&self) -> bool {
        self.status == MutationStatus::Pending
    }
}

struct MutationState<T> {
    status: MutationStatus,
    latest: Option<T>,
    error: Option<ClientError>,
    token: u64,
}

/// One mutation's state and token counter
struct MutationCell<T> {
    name: &'static str,
    state: RwLock<MutationState<T>>,
}

impl<T: Clone> MutationCell<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            state: RwLock::new(MutationState {
                status: MutationStatus::Idle,
                latest: None,
                error: None,
                token: 0,
            }),
        }
    }

    /// Issue a new token and enter `Pending`
    async fn begin(&self) -> u64 {
        let mut state = self.state.write().await;
        state.token += 1;
        state.status = MutationStatus::Pending;
        state.error = None;
        state.token
    }

    /// Apply `outcome` if `token` is still current; returns whether it was
    async fn settle(&self, token: u64, outcome: &ClientResult<T>) -> bool {
        let mut state = self.state.write().await;
        if state.token != token {
            warn!(
                mutation = self.name,
                token,
                current = state.token,
                "Discarding superseded response"
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                state.status = MutationStatus::Success;
                state.latest = Some(result.clone());
                state.error = None;
            }
            Err(err) => {
                state.status = MutationStatus::Error;
                state.error = Some(err.clone());
            }
        }
        true
    }

    async fn reset(&self) {
        let mut state = self.state.write().await;
        state.token += 1;
        state.status = MutationStatus::Idle;
        state.latest = None;
        state.error = None;
    }

    async fn snapshot(&self) -> MutationSnapshot<T> {
        let state = self.state.read().await;
        MutationSnapshot {
            status: state.status,
            latest: state.latest.clone(),
            error: state.error.clone(),
            token: state.token,
        }
    }
}

/// Submits optimization and refresh requests and keeps their latest outcome
#[derive(Clone)]
pub struct MutationController {
    api: Arc<dyn ApiClient>,
    cache: ResourceCache,
    optimize: Arc<MutationCell<OptimizationResult>>,
    refresh: Arc<MutationCell<RefreshSummary>>,
}

impl MutationController {
    pub fn new(cache: ResourceCache, api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            cache,
            optimize: Arc::new(MutationCell::new("optimize")),
            refresh: Arc::new(MutationCell::new("refresh-data")),
        }
    }

    /// Submit an optimization request.
    ///
    /// Invalid requests fail with [`ClientError::Validation`] without touching
    /// the network. An applied success marks the players query stale.
    pub async fn optimize(&self, request: OptimizationRequest) -> ClientResult<OptimizationResult> {
        let token = self.optimize.begin().await;

        if let Err(err) = request.validate() {
            let err = ClientError::from(err);
            self.optimize.settle(token, &Err(err.clone())).await;
            return Err(err);
        }

        info!(
            token,
            budget = request.budget,
            excluded = request.exclude_players.len(),
            "Submitting optimization request"
        );
        let outcome = self.api.optimize_team(&request).await;

        let applied = self.optimize.settle(token, &outcome).await;
        match &outcome {
            Ok(result) => {
                info!(
                    token,
                    applied,
                    total_cost = result.total_cost,
                    total_points = result.total_predicted_points,
                    "Optimization completed"
                );
                if applied {
                    self.cache.invalidate(PLAYERS).await;
                }
            }
            Err(err) => warn!(token, applied, error = %err, "Optimization failed"),
        }
        outcome
    }

    /// Ask the service to reload its data; an applied success marks every
    /// cached query stale
    pub async fn refresh_data(&self) -> ClientResult<RefreshSummary> {
        let token = self.refresh.begin().await;
        info!(token, "Requesting data refresh");

        let outcome = self.api.refresh_data().await;
        let applied = self.refresh.settle(token, &outcome).await;

        match &outcome {
            Ok(summary) => {
                info!(token, applied, players_updated = summary.players_updated, "Data refresh completed");
                if applied {
                    for resource in [PLAYERS, ANALYTICS, TOP_PLAYERS, MODEL_INFO] {
                        self.cache.invalidate(resource).await;
                    }
                }
            }
            Err(err) => warn!(token, applied, error = %err, "Data refresh failed"),
        }
        outcome
    }

    pub async fn snapshot(&self) -> MutationSnapshot<OptimizationResult> {
        self.optimize.snapshot().await
    }

    pub async fn refresh_snapshot(&self) -> MutationSnapshot<RefreshSummary> {
        self.refresh.snapshot().await
    }

    /// Back to `Idle`; responses still in flight will be discarded
    pub async fn reset(&self) {
        self.optimize.reset().await;
    }

    pub async fn reset_refresh(&self) {
        self.refresh.reset().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    use shared::{HealthStatus, ModelInfo, Player, Position, PositionStat, TopPlayer};
    use crate::cache::{CacheKey, CachePolicy, CacheStatus};
    use crate::traits::MockApiClient;

    fn result_with_cost(total_cost: f64) -> OptimizationResult {
        OptimizationResult {
            status: Some("Optimal".to_string()),
            players: Vec::new(),
            total_cost,
            total_predicted_points: 300.0,
            remaining_budget: 100.0 - total_cost,
        }
    }

    /// Optimize responses are released by the test, keyed by budget
    struct GatedApi {
        gates: Mutex<HashMap<u64, oneshot::Receiver<OptimizationResult>>>,
    }

    impl GatedApi {
        fn new() -> (Self, HashMap<u64, oneshot::Sender<OptimizationResult>>) {
            let mut gates = HashMap::new();
            let mut senders = HashMap::new();
            for budget in [98u64, 99, 100] {
                let (tx, rx) = oneshot::channel();
                gates.insert(budget, rx);
                senders.insert(budget, tx);
            }
            (Self { gates: Mutex::new(gates) }, senders)
        }
    }

    #[async_trait]
    impl ApiClient for GatedApi {
        async fn get_players(&self) -> ClientResult<Vec<Player>> {
            Ok(Vec::new())
        }

        async fn optimize_team(&self, request: &OptimizationRequest) -> ClientResult<OptimizationResult> {
            let gate = self.gates.lock().unwrap().remove(&(request.budget as u64));
            match gate {
                Some(rx) => rx.await.map_err(|_| ClientError::network("gate dropped")),
                None => Err(ClientError::network("no gate")),
            }
        }

        async fn get_position_stats(&self) -> ClientResult<Vec<PositionStat>> {
            Ok(Vec::new())
        }

        async fn get_top_players(&self, _: Position, _: u32) -> ClientResult<Vec<TopPlayer>> {
            Ok(Vec::new())
        }

        async fn health_check(&self) -> ClientResult<HealthStatus> {
            Err(ClientError::network("unused"))
        }

        async fn refresh_data(&self) -> ClientResult<RefreshSummary> {
            Err(ClientError::network("unused"))
        }

        async fn get_model_info(&self) -> ClientResult<ModelInfo> {
            Err(ClientError::network("unused"))
        }
    }

    #[tokio::test]
    async fn test_successful_optimize_invalidates_players() {
        // Arrange
        let cache = ResourceCache::new();
        cache
            .get(&CacheKey::players(), CachePolicy::with_stale_time(std::time::Duration::from_secs(300)), || async {
                Ok::<_, ClientError>(vec![1u32])
            })
            .await;
        let mut api = MockApiClient::new();
        api.expect_optimize_team()
            .times(1)
            .returning(|_| Ok(result_with_cost(99.5)));
        let controller = MutationController::new(cache.clone(), Arc::new(api));

        // Act
        let result = controller.optimize(OptimizationRequest::new(100.0)).await;

        // Assert
        assert_eq!(result.unwrap().total_cost, 99.5);
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, MutationStatus::Success);
        assert_eq!(snapshot.latest.map(|r| r.total_cost), Some(99.5));
        assert_eq!(cache.peek::<Vec<u32>>(&CacheKey::players()).await.status, CacheStatus::Stale);
    }

    #[tokio::test]
    async fn test_invalid_budget_fails_without_network() {
        let mut api = MockApiClient::new();
        api.expect_optimize_team().never();
        let controller = MutationController::new(ResourceCache::new(), Arc::new(api));

        let result = controller.optimize(OptimizationRequest::new(0.0)).await;

        assert!(matches!(result, Err(ClientError::Validation { .. })));
        assert_eq!(controller.snapshot().await.status, MutationStatus::Error);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_result_and_cache() {
        let cache = ResourceCache::new();
        let mut api = MockApiClient::new();
        let mut calls = 0;
        api.expect_optimize_team().times(2).returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(result_with_cost(98.0))
            } else {
                Err(ClientError::Remote {
                    status: 400,
                    body: "Optimization failed".to_string(),
                })
            }
        });
        let controller = MutationController::new(cache.clone(), Arc::new(api));

        controller.optimize(OptimizationRequest::new(100.0)).await.unwrap();
        cache
            .get(&CacheKey::players(), CachePolicy::with_stale_time(std::time::Duration::from_secs(300)), || async {
                Ok::<_, ClientError>(vec![1u32])
            })
            .await;
        let second = controller.optimize(OptimizationRequest::new(100.0)).await;

        assert!(second.is_err());
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, MutationStatus::Error);
        assert_eq!(snapshot.latest.map(|r| r.total_cost), Some(98.0));
        assert!(matches!(snapshot.error, Some(ClientError::Remote { status: 400, .. })));
        assert_eq!(cache.peek::<Vec<u32>>(&CacheKey::players()).await.status, CacheStatus::Fresh);
    }

    #[tokio::test]
    async fn test_superseded_response_is_not_applied() {
        // Arrange
        let (api, mut senders) = GatedApi::new();
        let controller = MutationController::new(ResourceCache::new(), Arc::new(api));

        let first = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.optimize(OptimizationRequest::new(99.0)).await })
        };
        while controller.snapshot().await.token < 1 {
            tokio::task::yield_now().await;
        }
        let second = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.optimize(OptimizationRequest::new(100.0)).await })
        };
        while controller.snapshot().await.token < 2 {
            tokio::task::yield_now().await;
        }

        // Act: the later request resolves first
        senders.remove(&100).unwrap().send(result_with_cost(100.0)).unwrap();
        let second = second.await.unwrap().unwrap();
        senders.remove(&99).unwrap().send(result_with_cost(99.0)).unwrap();
        let first = first.await.unwrap().unwrap();

        // Assert: each caller got its own answer, state holds the newest
        assert_eq!(first.total_cost, 99.0);
        assert_eq!(second.total_cost, 100.0);
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, MutationStatus::Success);
        assert_eq!(snapshot.latest.map(|r| r.total_cost), Some(100.0));
        assert_eq!(snapshot.token, 2);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_response() {
        let (api, mut senders) = GatedApi::new();
        let controller = MutationController::new(ResourceCache::new(), Arc::new(api));

        let pending = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.optimize(OptimizationRequest::new(98.0)).await })
        };
        while !controller.snapshot().await.is_pending() {
            tokio::task::yield_now().await;
        }

        controller.reset().await;
        senders.remove(&98).unwrap().send(result_with_cost(98.0)).unwrap();
        assert!(pending.await.unwrap().is_ok());

        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.status, MutationStatus::Idle);
        assert!(snapshot.latest.is_none());
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_refresh_invalidates_every_query() {
        let cache = ResourceCache::new();
        let policy = CachePolicy::with_stale_time(std::time::Duration::from_secs(300));
        for key in [
            CacheKey::players(),
            CacheKey::analytics(),
            CacheKey::top_players(Position::GKP),
            CacheKey::model_info(),
        ] {
            cache.get(&key, policy, || async { Ok::<_, ClientError>(0u8) }).await;
        }
        let mut api = MockApiClient::new();
        api.expect_refresh_data().times(1).returning(|| {
            Ok(RefreshSummary {
                message: "Data refreshed successfully".to_string(),
                players_updated: 612,
                predictions_updated: 612,
            })
        });
        let controller = MutationController::new(cache.clone(), Arc::new(api));

        let summary = controller.refresh_data().await.unwrap();

        assert_eq!(summary.players_updated, 612);
        assert_eq!(controller.refresh_snapshot().await.status, MutationStatus::Success);
        for key in cache.keys().await {
            assert_eq!(cache.peek::<u8>(&CacheKey::new(key)).await.status, CacheStatus::Stale);
        }
    }
}

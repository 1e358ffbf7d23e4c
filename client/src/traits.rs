//! Client trait definitions for dependency injection
//!
//! The remote optimizer service is reached only through [`ApiClient`], so the
//! cache, accessors and controllers can be tested against a mock.

use async_trait::async_trait;

use shared::{
    HealthStatus, ModelInfo, OptimizationRequest, OptimizationResult, Player, Position,
    PositionStat, RefreshSummary, TopPlayer,
};
use crate::error::ClientResult;

/// Remote optimizer API.
///
/// Implementations must parse every response into the typed records and
/// report shape mismatches as [`crate::ClientError::Validation`].
#[mockall::automock]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GET /api/players
    async fn get_players(&self) -> ClientResult<Vec<Player>>;

    /// POST /api/optimize
    async fn optimize_team(&self, request: &OptimizationRequest) -> ClientResult<OptimizationResult>;

    /// GET /api/analytics/position-stats
    async fn get_position_stats(&self) -> ClientResult<Vec<PositionStat>>;

    /// GET /api/top-players/{position}?limit=N
    async fn get_top_players(&self, position: Position, limit: u32) -> ClientResult<Vec<TopPlayer>>;

    /// GET /api/health
    async fn health_check(&self) -> ClientResult<HealthStatus>;

    /// POST /api/refresh-data
    async fn refresh_data(&self) -> ClientResult<RefreshSummary>;

    /// GET /api/model-info
    async fn get_model_info(&self) -> ClientResult<ModelInfo>;
}

//! Payload types exchanged with the remote optimizer service
//!
//! This module organizes the HTTP request/response bodies by endpoint family:
//! - `optimize`: team optimization request and result
//! - `analytics`: position statistics and top players
//! - `service`: health, model info and data refresh

pub mod analytics;
pub mod optimize;
pub mod service;

pub use analytics::{PositionStat, TopPlayer};

pub use optimize::{
    OptimizationRequest, OptimizationResult, parse_exclude_ids, parse_exclude_ids_strict,
    DEFAULT_BUDGET, MAX_ADVISED_BUDGET, MIN_ADVISED_BUDGET,
};

pub use service::{HealthStatus, ModelInfo, PositionModel, RefreshSummary};

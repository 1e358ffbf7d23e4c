//! Shared types for the FPL optimizer client
//!
//! Contains the domain records received from the remote optimizer service,
//! the request/response payloads, shared errors and tracing setup.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

pub use messages::{
    // Optimization
    OptimizationRequest, OptimizationResult, parse_exclude_ids, parse_exclude_ids_strict,
    DEFAULT_BUDGET, MAX_ADVISED_BUDGET, MIN_ADVISED_BUDGET,

    // Analytics
    PositionStat, TopPlayer,

    // Service housekeeping
    HealthStatus, ModelInfo, PositionModel, RefreshSummary,
};

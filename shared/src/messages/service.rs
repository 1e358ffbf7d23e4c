//! Service housekeeping payloads: health, model info and data refresh

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Liveness payload from `/api/health`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub model_status: Option<String>,
    #[serde(default)]
    pub predictions_available: Option<u64>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Per-position model details
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PositionModel {
    #[serde(default)]
    pub n_estimators: Option<serde_json::Value>,
    #[serde(default)]
    pub trained: bool,
}

/// Prediction model description from `/api/model-info`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelInfo {
    pub model_type: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub features_used: u32,
    #[serde(default)]
    pub position_models: BTreeMap<String, PositionModel>,
}

/// Result of `/api/refresh-data`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RefreshSummary {
    pub message: String,
    #[serde(default)]
    pub players_updated: u64,
    #[serde(default)]
    pub predictions_updated: u64,
}

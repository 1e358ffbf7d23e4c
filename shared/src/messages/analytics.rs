//! Analytics payloads: per-position aggregates and top players

use serde::{Deserialize, Serialize};

use crate::types::{opt_flexible_f64, opt_team_ref, PlayerId, Position};

/// Aggregated statistics for one position.
///
/// Only the means and the maximum predicted points are always present; the
/// remaining aggregates depend on which upstream columns were available.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PositionStat {
    pub position_name: Position,
    pub predicted_points_mean: f64,
    pub predicted_points_max: f64,
    pub price_mean: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_points_std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_points_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_points_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_by_percent_mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_value: Option<f64>,
}

impl PositionStat {
    /// Build a stat with only the required aggregates
    pub fn new(position: Position, points_mean: f64, points_max: f64, price_mean: f64) -> Self {
        Self {
            position_name: position,
            predicted_points_mean: points_mean,
            predicted_points_max: points_max,
            price_mean,
            predicted_points_std: None,
            predicted_points_count: None,
            price_max: None,
            price_min: None,
            total_points_mean: None,
            total_points_max: None,
            form_mean: None,
            selected_by_percent_mean: None,
            avg_value: None,
        }
    }
}

/// Player row from `/api/top-players/{position}`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TopPlayer {
    pub id: PlayerId,
    pub web_name: String,
    #[serde(default, deserialize_with = "opt_team_ref")]
    pub team: Option<String>,
    /// Price in tenths of a currency unit
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    pub now_cost: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    pub total_points: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    pub predicted_points: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    pub form: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    pub form_score: Option<f64>,
}

impl TopPlayer {
    /// Price in currency units
    pub fn price(&self) -> Option<f64> {
        self.now_cost.map(|tenths| tenths / 10.0)
    }
}

//! Test fixtures and payloads for client tests
//!
//! JSON bodies mirror what the optimizer service returns.

use serde_json::{json, Value};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const BUDGET: f64 = 100.0;
    pub const EXCLUDED_ID: u32 = 7;
    pub const TOTAL_COST: f64 = 99.5;
    pub const TOTAL_POINTS: f64 = 312.4;
    pub const REMAINING: f64 = 0.5;

    /// Raw player rows as served by `/api/players`
    pub fn players_json() -> Value {
        json!([
            {"id": 1, "web_name": "Raya", "team": 1, "position_name": "GKP", "now_cost": 55, "predicted_points": 4.2},
            {"id": 7, "web_name": "Saka", "team": 1, "position_name": "MID", "now_cost": 100, "predicted_points": 6.8},
            {"id": 12, "web_name": "Gabriel", "team": 1, "position_name": "DEF", "now_cost": 60, "predicted_points": 5.1},
            {"id": 20, "web_name": "Haaland", "team": 13, "position_name": "FWD", "now_cost": 150, "predicted_points": 8.9},
            {"id": 21, "web_name": "Isak", "team": 15, "position_name": "FWD", "now_cost": 85, "predicted_points": 6.0}
        ])
    }

    /// A 15-man squad: 2 GKP, 5 DEF, 5 MID, 3 FWD
    pub fn squad_json() -> Value {
        let layout = [("GKP", 2, 4.5), ("DEF", 5, 5.0), ("MID", 5, 8.0), ("FWD", 3, 7.5)];
        let mut players = Vec::new();
        let mut id = 100;
        for (position, count, price) in layout {
            for _ in 0..count {
                players.push(json!({
                    "id": id,
                    "name": format!("Player {id}"),
                    "team": "ARS",
                    "position": position,
                    "price": price,
                    "predicted_points": 20.0
                }));
                id += 1;
            }
        }
        Value::Array(players)
    }

    pub fn optimize_result_json() -> Value {
        json!({
            "status": "Optimal",
            "players": Self::squad_json(),
            "total_cost": Self::TOTAL_COST,
            "total_predicted_points": Self::TOTAL_POINTS,
            "remaining_budget": Self::REMAINING
        })
    }

    /// Position means summing to 10
    pub fn position_stats_json() -> Value {
        json!([
            {"position_name": "GKP", "predicted_points_mean": 2.0, "predicted_points_max": 6.5, "price_mean": 4.6},
            {"position_name": "DEF", "predicted_points_mean": 4.0, "predicted_points_max": 9.1, "price_mean": 4.9},
            {"position_name": "MID", "predicted_points_mean": 3.0, "predicted_points_max": 11.2, "price_mean": 6.3},
            {"position_name": "FWD", "predicted_points_mean": 1.0, "predicted_points_max": 10.4, "price_mean": 6.8}
        ])
    }

    pub fn refresh_json() -> Value {
        json!({"message": "Data refreshed successfully", "players_updated": 5, "predictions_updated": 5})
    }
}

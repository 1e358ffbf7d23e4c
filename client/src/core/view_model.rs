//! Display-ready derivations of domain records
//!
//! Everything here is a pure function of its input.

use serde::Serialize;

use shared::{OptimizationResult, Player, Position, PositionStat};

/// Chart colours, indexed by canonical position index
pub const PALETTE: [&str; 4] = ["#0088FE", "#00C49F", "#FFBB28", "#FF8042"];

/// Colour for the `index`-th category, cycling through [`PALETTE`]
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Players of one position, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionGroup {
    pub position: Position,
    pub players: Vec<Player>,
}

impl PositionGroup {
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Bucket players by position.
///
/// Buckets come out in canonical order `GKP, DEF, MID, FWD`; positions with no
/// players are left out.
pub fn group_by_position(players: &[Player]) -> Vec<PositionGroup> {
    Position::ALL
        .into_iter()
        .filter_map(|position| {
            let members: Vec<Player> = players
                .iter()
                .filter(|player| player.position == position)
                .cloned()
                .collect();
            (!members.is_empty()).then_some(PositionGroup {
                position,
                players: members,
            })
        })
        .collect()
}

/// One bar group in the points/price chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarPoint {
    pub position: Position,
    pub avg_points: f64,
    pub max_points: f64,
    pub avg_price: f64,
}

pub fn bar_series(stats: &[PositionStat]) -> Vec<BarPoint> {
    stats
        .iter()
        .map(|stat| BarPoint {
            position: stat.position_name,
            avg_points: stat.predicted_points_mean,
            max_points: stat.predicted_points_max,
            avg_price: stat.price_mean,
        })
        .collect()
}

/// One slice of the average-points pie
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: Position,
    pub value: f64,
    /// Whole percent of the total, rounded per slice
    pub percent: u32,
    pub color: &'static str,
}

/// Pie slices over mean predicted points.
///
/// Each percentage is rounded on its own, so the slices may not add up to
/// exactly 100. A zero total gives every slice 0%.
pub fn pie_series(stats: &[PositionStat]) -> Vec<PieSlice> {
    let total: f64 = stats.iter().map(|stat| stat.predicted_points_mean).sum();

    stats
        .iter()
        .map(|stat| {
            let value = stat.predicted_points_mean;
            let percent = if total > 0.0 {
                (value / total * 100.0).round().max(0.0) as u32
            } else {
                0
            };
            PieSlice {
                name: stat.position_name,
                value,
                percent,
                color: palette_color(stat.position_name.index()),
            }
        })
        .collect()
}

/// Player count per position, canonical order, zeros included
pub fn position_counts(players: &[Player]) -> [(Position, usize); 4] {
    Position::ALL.map(|position| {
        let count = players.iter().filter(|player| player.position == position).count();
        (position, count)
    })
}

/// Headline figures for an optimized squad
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SquadSummary {
    pub status: Option<String>,
    pub total_cost: f64,
    pub total_predicted_points: f64,
    pub remaining_budget: f64,
    pub player_count: usize,
    pub composition: [(Position, usize); 4],
}

pub fn squad_summary(result: &OptimizationResult) -> SquadSummary {
    SquadSummary {
        status: result.status.clone(),
        total_cost: result.total_cost,
        total_predicted_points: result.total_predicted_points,
        remaining_budget: result.remaining_budget,
        player_count: result.players.len(),
        composition: position_counts(&result.players),
    }
}

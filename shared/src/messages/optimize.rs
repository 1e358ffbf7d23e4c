//! Optimize-team request and result payloads
//!
//! The request is built from user input (a budget and a free-text list of
//! player ids to exclude) and posted to `/api/optimize`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::errors::{SharedError, SharedResult};
use crate::types::{Player, PlayerId};

/// Lower bound of the budget range the optimizer is tuned for
pub const MIN_ADVISED_BUDGET: f64 = 95.0;

/// Upper bound of the budget range the optimizer is tuned for
pub const MAX_ADVISED_BUDGET: f64 = 105.0;

/// Budget used when the caller does not pick one
pub const DEFAULT_BUDGET: f64 = 100.0;

/// Request body for `/api/optimize`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptimizationRequest {
    pub budget: f64,
    #[serde(default)]
    pub exclude_players: BTreeSet<PlayerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation_preference: Option<String>,
}

impl OptimizationRequest {
    /// Create a request with no exclusions
    pub fn new(budget: f64) -> Self {
        Self {
            budget,
            exclude_players: BTreeSet::new(),
            formation_preference: None,
        }
    }

    /// Exclude the given player ids (duplicates collapse)
    pub fn with_excluded<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = PlayerId>,
    {
        self.exclude_players.extend(ids);
        self
    }

    /// Exclude ids parsed leniently from free text, see [`parse_exclude_ids`]
    pub fn with_excluded_text(self, text: &str) -> Self {
        self.with_excluded(parse_exclude_ids(text))
    }

    pub fn with_formation(mut self, formation: impl Into<String>) -> Self {
        self.formation_preference = Some(formation.into());
        self
    }

    /// Check the request before it is sent.
    ///
    /// The budget must be a positive finite number. Budgets outside the
    /// advised range are still sent, the service decides feasibility.
    pub fn validate(&self) -> SharedResult<()> {
        if !self.budget.is_finite() || self.budget <= 0.0 {
            return Err(SharedError::InvalidBudget { value: self.budget });
        }
        if !(MIN_ADVISED_BUDGET..=MAX_ADVISED_BUDGET).contains(&self.budget) {
            warn!(
                budget = self.budget,
                "Budget outside advised range [{}, {}]", MIN_ADVISED_BUDGET, MAX_ADVISED_BUDGET
            );
        }
        Ok(())
    }
}

impl Default for OptimizationRequest {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

fn id_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Parse a delimited list of player ids, silently dropping anything that is
/// not a non-negative integer.
pub fn parse_exclude_ids(text: &str) -> BTreeSet<PlayerId> {
    id_tokens(text)
        .filter_map(|token| match token.parse::<PlayerId>() {
            Ok(id) => Some(id),
            Err(_) => {
                debug!(token, "Dropping unparseable exclude id");
                None
            }
        })
        .collect()
}

/// Parse a delimited list of player ids, failing on the first bad token
pub fn parse_exclude_ids_strict(text: &str) -> SharedResult<BTreeSet<PlayerId>> {
    id_tokens(text)
        .map(|token| {
            token
                .parse::<PlayerId>()
                .map_err(|_| SharedError::InvalidPlayerId {
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Optimized squad returned by `/api/optimize`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OptimizationResult {
    /// Solver status reported by the service, e.g. "Optimal"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub players: Vec<Player>,
    pub total_cost: f64,
    pub total_predicted_points: f64,
    pub remaining_budget: f64,
}

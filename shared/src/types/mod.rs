//! Core domain types used throughout the optimizer client

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SharedError;

/// Identifier of a player as assigned by the remote service
pub type PlayerId = u32;

/// Playing position, also the canonical grouping and ordering key for players
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Position {
    GKP,
    DEF,
    MID,
    FWD,
}

impl Position {
    /// All positions in canonical display order
    pub const ALL: [Position; 4] = [Position::GKP, Position::DEF, Position::MID, Position::FWD];

    /// Zero-based index in canonical order
    pub fn index(self) -> usize {
        match self {
            Position::GKP => 0,
            Position::DEF => 1,
            Position::MID => 2,
            Position::FWD => 3,
        }
    }

    /// Short code used on the wire and in cache keys
    pub fn code(self) -> &'static str {
        match self {
            Position::GKP => "GKP",
            Position::DEF => "DEF",
            Position::MID => "MID",
            Position::FWD => "FWD",
        }
    }

    /// Human readable group heading
    pub fn label(self) -> &'static str {
        match self {
            Position::GKP => "Goalkeepers",
            Position::DEF => "Defenders",
            Position::MID => "Midfielders",
            Position::FWD => "Forwards",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Position {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GKP" => Ok(Position::GKP),
            "DEF" => Ok(Position::DEF),
            "MID" => Ok(Position::MID),
            "FWD" => Ok(Position::FWD),
            _ => Err(SharedError::InvalidPosition {
                input: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Position {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A player record as received from the remote service.
///
/// Records are immutable once received and are replaced wholesale on refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlayerRecord")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: Position,
    /// Price in currency units, tenth granularity (e.g. 5.5)
    pub price: f64,
    pub predicted_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Loosely shaped player payload.
///
/// The players endpoint returns raw upstream columns (`web_name`, `now_cost`,
/// `position_name`) while the optimizer returns the compact shape (`name`,
/// `price`, `position`). Both are accepted here and validated into [`Player`].
#[derive(Debug, Deserialize)]
struct PlayerRecord {
    id: Option<PlayerId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    web_name: Option<String>,
    #[serde(default, deserialize_with = "opt_team_ref")]
    team: Option<String>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    position_name: Option<String>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    now_cost: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    predicted_points: Option<f64>,
    #[serde(default, deserialize_with = "opt_flexible_f64")]
    value: Option<f64>,
}

impl TryFrom<PlayerRecord> for Player {
    type Error = SharedError;

    fn try_from(record: PlayerRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .ok_or_else(|| SharedError::invalid_record("player is missing `id`"))?;
        let name = record
            .name
            .or(record.web_name)
            .ok_or_else(|| SharedError::invalid_record(format!("player {id} is missing `name`")))?;
        let position = record
            .position
            .or(record.position_name)
            .ok_or_else(|| SharedError::invalid_record(format!("player {id} is missing `position`")))?
            .parse::<Position>()?;
        let price = record
            .price
            .or_else(|| record.now_cost.map(|tenths| tenths / 10.0))
            .ok_or_else(|| SharedError::invalid_record(format!("player {id} is missing `price`")))?;

        Ok(Player {
            id,
            name,
            team: record.team.unwrap_or_default(),
            position,
            price,
            predicted_points: record.predicted_points.unwrap_or(0.0),
            value: record.value,
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts a JSON number, a numeric string or null.
///
/// Upstream columns such as `form` arrive as strings ("5.2").
pub fn opt_flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("expected a number, got {text:?}")))
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TeamRef {
    Id(i64),
    Name(String),
}

/// Team references are either a team name or a numeric team id
pub fn opt_team_ref<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TeamRef>::deserialize(deserializer)?.map(|team| match team {
        TeamRef::Id(id) => id.to_string(),
        TeamRef::Name(name) => name,
    }))
}

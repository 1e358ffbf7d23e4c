//! Cache keys
//!
//! A key is a resource name followed by zero or more `:`-separated
//! parameters, so `topPlayers:MID` and `topPlayers:FWD` never collide and a
//! bare resource name can be used to address every parameterisation at once.

use std::fmt;

use shared::Position;

pub const PLAYERS: &str = "players";
pub const ANALYTICS: &str = "analytics";
pub const TOP_PLAYERS: &str = "topPlayers";
pub const MODEL_INFO: &str = "modelInfo";

const SEPARATOR: char = ':';

/// Key uniquely identifying a cached resource and its parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a resource without parameters
    pub fn new(resource: impl Into<String>) -> Self {
        Self(resource.into())
    }

    /// Append a parameter segment
    pub fn with_param(mut self, param: impl fmt::Display) -> Self {
        self.0.push(SEPARATOR);
        self.0.push_str(&param.to_string());
        self
    }

    pub fn players() -> Self {
        Self::new(PLAYERS)
    }

    pub fn analytics() -> Self {
        Self::new(ANALYTICS)
    }

    pub fn top_players(position: Position) -> Self {
        Self::new(TOP_PLAYERS).with_param(position.code())
    }

    pub fn model_info() -> Self {
        Self::new(MODEL_INFO)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resource name without parameters
    pub fn resource(&self) -> &str {
        self.0.split(SEPARATOR).next().unwrap_or_default()
    }

    /// Whether this key is `pattern` itself or one of its parameterisations.
    ///
    /// Matching respects segment boundaries: `players` does not match
    /// `playersArchive` nor `topPlayers:MID`.
    pub fn matches(&self, pattern: &str) -> bool {
        match self.0.strip_prefix(pattern) {
            Some(rest) => rest.is_empty() || rest.starts_with(SEPARATOR),
            None => false,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

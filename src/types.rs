//! Shared primitive IDs and quiz-related enums.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Club identifier.
pub type ClubId = u64;
/// Season identifier.
pub type SeasonId = u64;
/// Person identifier.
pub type PersonId = u64;
/// Participation record identifier.
pub type ParticipationId = u64;

/// Role held by a person at one club in one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Squad member; may carry statistics.
    Player,
    /// First-team manager; never carries statistics.
    Manager,
}

impl Role {
    /// Lowercase wire/storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Player => "player",
            Role::Manager => "manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Role::Player),
            "manager" => Ok(Role::Manager),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Numeric statistic carried by a player's stats record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    /// Matches played.
    Appearances,
    /// Goals scored.
    Goals,
    /// Assists provided.
    Assists,
}

impl Stat {
    /// Column name used by the SQLite schema.
    pub fn column(self) -> &'static str {
        match self {
            Stat::Appearances => "appearances",
            Stat::Goals => "goals",
            Stat::Assists => "assists",
        }
    }

    /// Key under which an answer reports its aggregated total.
    pub fn total_key(self) -> &'static str {
        match self {
            Stat::Appearances => "total_appearances",
            Stat::Goals => "total_goals",
            Stat::Assists => "total_assists",
        }
    }
}

/// Aggregation scope of a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Restrict to one club.
    #[default]
    Club,
    /// Restrict to one season.
    Season,
    /// No restriction.
    Overall,
}

/// What a quiz ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizCategory {
    /// Total goals.
    #[default]
    Goals,
    /// Total assists.
    Assists,
    /// Total appearances.
    Appearances,
    /// Distinct managers.
    Managers,
}

impl QuizCategory {
    /// Statistic summed by this category, or `None` for managers.
    pub fn stat(self) -> Option<Stat> {
        match self {
            QuizCategory::Goals => Some(Stat::Goals),
            QuizCategory::Assists => Some(Stat::Assists),
            QuizCategory::Appearances => Some(Stat::Appearances),
            QuizCategory::Managers => None,
        }
    }
}

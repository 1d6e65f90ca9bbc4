//! Club, season, person and participation records.

use serde::{Deserialize, Serialize};

use crate::types::{ClubId, ParticipationId, PersonId, Role, SeasonId, Stat};

/// A football club. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    /// Stable club identifier.
    pub id: ClubId,
    /// Unique display name.
    pub name: String,
}

/// A season, identified by a short unique label such as `2023/2024`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// Stable season identifier.
    pub id: SeasonId,
    /// Unique label.
    pub label: String,
}

/// A player or manager. Never matched by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable person identifier.
    pub id: PersonId,
    /// Given name; may be empty.
    pub first_name: String,
    /// Family name; may be empty.
    pub last_name: String,
}

impl Person {
    /// `first last`, trimmed so a missing half leaves no stray space.
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

/// Joins a first and last name the way every answer row displays it.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{first_name} {last_name}").trim().to_string()
}

/// One person holding one role at one club in one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRecord {
    /// Stable participation identifier.
    pub id: ParticipationId,
    /// Person holding the role.
    pub person_id: PersonId,
    /// Club at which the role is held.
    pub club_id: ClubId,
    /// Season in which the role is held.
    pub season_id: SeasonId,
    /// Player or manager.
    pub role: Role,
}

/// Per-season statistics attached to a player participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsRecord {
    /// Matches played.
    pub appearances: u32,
    /// Goals scored.
    pub goals: u32,
    /// Assists provided.
    pub assists: u32,
}

impl StatsRecord {
    /// Reads one statistic.
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Appearances => self.appearances,
            Stat::Goals => self.goals,
            Stat::Assists => self.assists,
        }
    }
}

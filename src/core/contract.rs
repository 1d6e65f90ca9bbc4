//! Read and write contracts every entity store implements.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::{Club, ParticipationRecord, Person, Season, StatsRecord},
    types::{ClubId, ParticipationId, PersonId, Role, SeasonId, Stat},
};

/// Failures raised by a store. The quiz engine never recovers from these.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Snapshot (de)serialization failure.
    #[error("snapshot encoding error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Referenced person does not exist.
    #[error("no person with id={0}")]
    MissingPerson(PersonId),
    /// Referenced club does not exist.
    #[error("no club with id={0}")]
    MissingClub(ClubId),
    /// Referenced season does not exist.
    #[error("no season with id={0}")]
    MissingSeason(SeasonId),
    /// Referenced participation does not exist.
    #[error("no participation with id={0}")]
    MissingParticipation(ParticipationId),
    /// Stats were attached to a manager-role participation.
    #[error("participation {0} is a manager record and cannot carry stats")]
    StatsOnManager(ParticipationId),
    /// A snapshot or table row violates a uniqueness or integrity rule.
    #[error("corrupt store data: {0}")]
    Corrupt(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Restriction applied to participation records before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScopeFilter {
    /// Every record.
    #[default]
    Overall,
    /// Records at one club.
    Club(ClubId),
    /// Records in one season.
    Season(SeasonId),
}

/// One person's aggregated total for a statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRow {
    /// Person the total belongs to.
    pub person_id: PersonId,
    /// Person's first name.
    pub first_name: String,
    /// Person's last name.
    pub last_name: String,
    /// Club of one contributing record (the earliest created).
    pub club_name: Option<String>,
    /// Sum of the statistic across contributing records.
    pub total: u64,
}

/// One distinct person holding a manager record within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerRow {
    /// Manager's person id.
    pub person_id: PersonId,
    /// Manager's first name.
    pub first_name: String,
    /// Manager's last name.
    pub last_name: String,
}

/// Read access consumed by the quiz engine and list endpoints.
pub trait EntityQuery {
    /// Looks up a club by id.
    fn find_club(&self, id: ClubId) -> StoreResult<Option<Club>>;
    /// Looks up a season by id.
    fn find_season(&self, id: SeasonId) -> StoreResult<Option<Season>>;
    /// All clubs ordered by name.
    fn list_clubs(&self) -> StoreResult<Vec<Club>>;
    /// All seasons ordered by label.
    fn list_seasons(&self) -> StoreResult<Vec<Season>>;
    /// Per-person totals of `stat` over player records where `stat > 0`.
    ///
    /// Exactly one row per qualifying person; row order is unspecified.
    fn query_stats_by_category(&self, stat: Stat, scope: ScopeFilter) -> StoreResult<Vec<StatRow>>;
    /// Distinct persons holding a manager record within `scope`.
    ///
    /// Row order is unspecified.
    fn query_managers(&self, scope: ScopeFilter) -> StoreResult<Vec<ManagerRow>>;
}

/// Outcome of [`EntityWriter::upsert_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsUpsert {
    /// No stats existed for the participation.
    Created,
    /// Existing stats were overwritten.
    Updated,
}

/// Write access used by the importer.
pub trait EntityWriter {
    /// Returns the club named `name`, creating it if needed.
    fn get_or_create_club(&mut self, name: &str) -> StoreResult<Club>;
    /// Returns the season labelled `label`, creating it if needed.
    fn get_or_create_season(&mut self, label: &str) -> StoreResult<Season>;
    /// Looks up a person by explicit id.
    fn find_person(&self, id: PersonId) -> StoreResult<Option<Person>>;
    /// Always creates a new person; never matches existing names.
    fn create_person(&mut self, first_name: &str, last_name: &str) -> StoreResult<Person>;
    /// Returns the unique record for the tuple, creating it if needed.
    fn get_or_create_participation(
        &mut self,
        person_id: PersonId,
        club_id: ClubId,
        season_id: SeasonId,
        role: Role,
    ) -> StoreResult<ParticipationRecord>;
    /// Creates or overwrites the stats of a player participation.
    fn upsert_stats(
        &mut self,
        participation_id: ParticipationId,
        stats: StatsRecord,
    ) -> StoreResult<StatsUpsert>;
}

/// A store the quiz service can own: readable, writable and movable across threads.
pub trait QuizStore: EntityQuery + EntityWriter + Send {}

impl<T: EntityQuery + EntityWriter + Send> QuizStore for T {}

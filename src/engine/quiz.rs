//! Quiz generation: scope resolution, aggregation, ranking and truncation.

use std::cmp::Ordering;

use serde::{Serialize, Serializer, ser::SerializeMap};
use tracing::debug;

use crate::{
    core::contract::{EntityQuery, ManagerRow, ScopeFilter, StatRow, StoreResult},
    engine::config::QuizConfig,
    entity::full_name,
    types::{PersonId, QuizCategory, QuizMode, Stat},
};

/// Error carried by a managers quiz requested in overall mode.
pub const MANAGERS_OVERALL_ERROR: &str = "Managers quiz is only available for club or season mode.";

/// Ranked answer for a goals/assists/appearances quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatAnswer {
    pub id: PersonId,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    /// Club of one contributing record; not meaningful across clubs.
    pub club: Option<String>,
    pub stat: Stat,
    pub total: u64,
}

// The total is keyed by statistic (`total_goals`, ...), so the map is built by hand.
impl Serialize for StatAnswer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.club.is_some() { 6 } else { 5 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("first_name", &self.first_name)?;
        map.serialize_entry("last_name", &self.last_name)?;
        if let Some(club) = &self.club {
            map.serialize_entry("club", club)?;
        }
        map.serialize_entry(self.stat.total_key(), &self.total)?;
        map.end()
    }
}

/// Answer for a managers quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerAnswer {
    pub id: PersonId,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
}

/// One entry of [`QuizResult::answers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QuizAnswer {
    Stat(StatAnswer),
    Manager(ManagerAnswer),
}

impl QuizAnswer {
    pub fn id(&self) -> PersonId {
        match self {
            QuizAnswer::Stat(a) => a.id,
            QuizAnswer::Manager(a) => a.id,
        }
    }

    pub fn last_name(&self) -> &str {
        match self {
            QuizAnswer::Stat(a) => &a.last_name,
            QuizAnswer::Manager(a) => &a.last_name,
        }
    }

    /// Aggregated statistic; `None` for managers.
    pub fn total(&self) -> Option<u64> {
        match self {
            QuizAnswer::Stat(a) => Some(a.total),
            QuizAnswer::Manager(_) => None,
        }
    }
}

/// Outcome of [`generate_quiz`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub config: QuizConfig,
    /// Qualifying persons before truncation to `limit`.
    pub max_answers: usize,
    pub answers: Vec<QuizAnswer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs one quiz against `store`.
///
/// The only rejected combination is managers in overall mode, which is
/// reported through [`QuizResult::error`] without touching the store.
/// Store failures propagate unchanged.
pub fn generate_quiz<S>(store: &S, config: &QuizConfig) -> StoreResult<QuizResult>
where
    S: EntityQuery + ?Sized,
{
    if config.category == QuizCategory::Managers && config.mode == QuizMode::Overall {
        debug!("managers quiz requested in overall mode; rejecting");
        return Ok(QuizResult {
            config: config.clone(),
            max_answers: 0,
            answers: Vec::new(),
            error: Some(MANAGERS_OVERALL_ERROR.to_string()),
        });
    }

    let scope = resolve_scope(store, config)?;
    let (max_answers, answers) = match config.category.stat() {
        Some(stat) => rank_stat(store, stat, scope, config.limit)?,
        None => rank_managers(store, scope, config.limit)?,
    };
    debug!(
        mode = ?config.mode,
        category = ?config.category,
        ?scope,
        max_answers,
        returned = answers.len(),
        "quiz generated"
    );

    Ok(QuizResult {
        config: config.clone(),
        max_answers,
        answers,
        error: None,
    })
}

/// Restriction implied by the mode and ids.
///
/// Missing, zero, or unknown ids fall through to [`ScopeFilter::Overall`].
pub fn resolve_scope<S>(store: &S, config: &QuizConfig) -> StoreResult<ScopeFilter>
where
    S: EntityQuery + ?Sized,
{
    let scope = match (config.mode, config.club_id, config.season_id) {
        (QuizMode::Club, Some(id), _) if id != 0 => {
            if store.find_club(id)?.is_some() {
                ScopeFilter::Club(id)
            } else {
                debug!(club_id = id, "unknown club; quiz runs unrestricted");
                ScopeFilter::Overall
            }
        }
        (QuizMode::Season, _, Some(id)) if id != 0 => {
            if store.find_season(id)?.is_some() {
                ScopeFilter::Season(id)
            } else {
                debug!(season_id = id, "unknown season; quiz runs unrestricted");
                ScopeFilter::Overall
            }
        }
        _ => ScopeFilter::Overall,
    };
    Ok(scope)
}

fn rank_stat<S>(
    store: &S,
    stat: Stat,
    scope: ScopeFilter,
    limit: usize,
) -> StoreResult<(usize, Vec<QuizAnswer>)>
where
    S: EntityQuery + ?Sized,
{
    let rows = store.query_stats_by_category(stat, scope)?;
    let (max_answers, rows) = rank(rows, limit, |a: &StatRow, b: &StatRow| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.last_name.cmp(&b.last_name))
            .then_with(|| a.person_id.cmp(&b.person_id))
    });

    let answers = rows
        .into_iter()
        .map(|row| {
            QuizAnswer::Stat(StatAnswer {
                id: row.person_id,
                name: full_name(&row.first_name, &row.last_name),
                first_name: row.first_name,
                last_name: row.last_name,
                club: row.club_name,
                stat,
                total: row.total,
            })
        })
        .collect();
    Ok((max_answers, answers))
}

fn rank_managers<S>(
    store: &S,
    scope: ScopeFilter,
    limit: usize,
) -> StoreResult<(usize, Vec<QuizAnswer>)>
where
    S: EntityQuery + ?Sized,
{
    let rows = store.query_managers(scope)?;
    let (max_answers, rows) = rank(rows, limit, |a: &ManagerRow, b: &ManagerRow| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
            .then_with(|| a.person_id.cmp(&b.person_id))
    });

    let answers = rows
        .into_iter()
        .map(|row| {
            QuizAnswer::Manager(ManagerAnswer {
                id: row.person_id,
                name: full_name(&row.first_name, &row.last_name),
                first_name: row.first_name,
                last_name: row.last_name,
            })
        })
        .collect();
    Ok((max_answers, answers))
}

/// Counts, sorts and truncates; the count is taken before truncation.
fn rank<T>(
    mut rows: Vec<T>,
    limit: usize,
    order: impl FnMut(&T, &T) -> Ordering,
) -> (usize, Vec<T>) {
    let max_answers = rows.len();
    rows.sort_by(order);
    rows.truncate(limit);
    (max_answers, rows)
}

//! CSV ingestion with strict identity resolution.
//!
//! Expected headers: `person_id, first_name, last_name, season_label,
//! club_name, role, appearances, goals, assists`. Persons are never matched
//! by name: a row either names an existing `person_id` or creates a new
//! person.

use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    core::contract::{EntityWriter, StatsUpsert, StoreError},
    entity::{Person, StatsRecord},
    types::{ParticipationId, PersonId, Role},
};

/// Failures that abort an import. Row-level problems are reported in
/// [`ImportReport`] instead.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    Store {
        row: usize,
        #[source]
        source: StoreError,
    },
}

/// One CSV row, before cleaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportRow {
    pub person_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub season_label: Option<String>,
    pub club_name: Option<String>,
    pub role: Option<String>,
    pub appearances: Option<String>,
    pub goals: Option<String>,
    pub assists: Option<String>,
}

/// Why a row was not imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `season_label`, `club_name` or `role` is empty.
    MissingFields,
    /// Neither `person_id` nor any name was given.
    NoIdentity,
    /// `role` is neither `player` nor `manager`.
    InvalidRole(String),
    /// `person_id` is not an integer.
    InvalidPersonId(String),
    /// `person_id` does not name an existing person.
    UnknownPerson(PersonId),
}

/// What happened to one row. Rows are numbered as in the file, header = 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Imported {
        row: usize,
        person_id: PersonId,
        created_person: bool,
        participation_id: ParticipationId,
        /// `None` for manager rows.
        stats: Option<StatsUpsert>,
    },
    Skipped {
        row: usize,
        reason: SkipReason,
    },
}

/// Per-row outcomes of one import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub outcomes: Vec<RowOutcome>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Imported { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.imported()
    }

    pub fn persons_created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Imported { created_person: true, .. }))
            .count()
    }

    pub fn stats_with(&self, upsert: StatsUpsert) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, RowOutcome::Imported { stats: Some(s), .. } if *s == upsert))
            .count()
    }
}

/// Imports the CSV file at `path`.
pub fn import_path<W>(writer: &mut W, path: impl AsRef<Path>) -> Result<ImportReport, ImportError>
where
    W: EntityWriter + ?Sized,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.display().to_string(),
        source,
    })?;
    import_reader(writer, file)
}

/// Imports CSV text from `reader`. A malformed record aborts the import.
pub fn import_reader<W, R>(writer: &mut W, reader: R) -> Result<ImportReport, ImportError>
where
    W: EntityWriter + ?Sized,
    R: Read,
{
    let mut csv = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let mut rows = Vec::new();
    for record in csv.deserialize::<ImportRow>() {
        rows.push(record?);
    }
    import_rows(writer, rows)
}

/// Imports already-split rows; the first row is numbered 2.
pub fn import_rows<W, I>(writer: &mut W, rows: I) -> Result<ImportReport, ImportError>
where
    W: EntityWriter + ?Sized,
    I: IntoIterator<Item = ImportRow>,
{
    let mut report = ImportReport::default();
    for (idx, raw) in rows.into_iter().enumerate() {
        let row = idx + 2;
        let outcome = import_row(writer, row, &raw)
            .map_err(|source| ImportError::Store { row, source })?;
        if let RowOutcome::Skipped { reason, .. } = &outcome {
            warn!(row, ?reason, "skipping row");
        }
        report.outcomes.push(outcome);
    }

    info!(
        imported = report.imported(),
        skipped = report.skipped(),
        persons_created = report.persons_created(),
        "import complete"
    );
    Ok(report)
}

fn import_row<W>(writer: &mut W, row: usize, raw: &ImportRow) -> Result<RowOutcome, StoreError>
where
    W: EntityWriter + ?Sized,
{
    let skip = |reason| Ok(RowOutcome::Skipped { row, reason });

    let person_id = clean(&raw.person_id);
    let first_name = clean(&raw.first_name);
    let last_name = clean(&raw.last_name);
    let season_label = clean(&raw.season_label);
    let club_name = clean(&raw.club_name);
    let role_raw = clean(&raw.role).to_lowercase();

    if season_label.is_empty() || club_name.is_empty() || role_raw.is_empty() {
        return skip(SkipReason::MissingFields);
    }
    if person_id.is_empty() && first_name.is_empty() && last_name.is_empty() {
        return skip(SkipReason::NoIdentity);
    }
    let Ok(role) = role_raw.parse::<Role>() else {
        return skip(SkipReason::InvalidRole(role_raw));
    };

    let season = writer.get_or_create_season(season_label)?;
    let club = writer.get_or_create_club(club_name)?;

    let (person, created_person) = match resolve_person(writer, person_id, first_name, last_name)? {
        Ok(resolved) => resolved,
        Err(reason) => return skip(reason),
    };
    if created_person {
        debug!(row, person_id = person.id, name = %person.full_name(), "created person");
    }

    let pcs = writer.get_or_create_participation(person.id, club.id, season.id, role)?;

    let stats = if role == Role::Player {
        let stats = StatsRecord {
            appearances: to_count(&raw.appearances),
            goals: to_count(&raw.goals),
            assists: to_count(&raw.assists),
        };
        let upsert = writer.upsert_stats(pcs.id, stats)?;
        debug!(row, ?upsert, person = %person.full_name(), club = %club.name, season = %season.label, "stats written");
        Some(upsert)
    } else {
        None
    };

    Ok(RowOutcome::Imported {
        row,
        person_id: person.id,
        created_person,
        participation_id: pcs.id,
        stats,
    })
}

/// Explicit id must exist; no id always creates a new person.
fn resolve_person<W>(
    writer: &mut W,
    person_id: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Result<(Person, bool), SkipReason>, StoreError>
where
    W: EntityWriter + ?Sized,
{
    if !person_id.is_empty() {
        let Ok(id) = person_id.parse::<PersonId>() else {
            return Ok(Err(SkipReason::InvalidPersonId(person_id.to_string())));
        };
        return Ok(match writer.find_person(id)? {
            Some(person) => Ok((person, false)),
            None => Err(SkipReason::UnknownPerson(id)),
        });
    }

    let person = writer.create_person(first_name, last_name)?;
    Ok(Ok((person, true)))
}

fn clean(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

/// Empty, negative or non-integer cells count as 0.
fn to_count(value: &Option<String>) -> u32 {
    clean(value).parse::<u32>().unwrap_or(0)
}

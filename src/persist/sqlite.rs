//! SQLite-backed entity store; quiz aggregation runs as SQL.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::{
    core::{
        contract::{
            EntityQuery, EntityWriter, ManagerRow, ScopeFilter, StatRow, StatsUpsert, StoreError,
            StoreResult,
        },
        store::{MemoryStore, StoreSnapshotV1},
    },
    entity::{Club, ParticipationRecord, Person, Season, StatsRecord},
    types::{ClubId, ParticipationId, PersonId, Role, SeasonId, Stat},
};

/// SQLite implementation of the store contracts.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a store at `path`.
    ///
    /// Enables WAL mode, `synchronous=NORMAL` and foreign keys.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens an in-memory SQLite store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }

    /// Loads every table into an in-memory store.
    pub fn load_store(&self) -> StoreResult<MemoryStore> {
        MemoryStore::from_snapshot(self.export_snapshot()?)
    }

    /// Reads every table into a snapshot, participations in creation order.
    pub fn export_snapshot(&self) -> StoreResult<StoreSnapshotV1> {
        let clubs = self.collect("SELECT id, name FROM clubs ORDER BY id", club_from_row)?;
        let seasons = self.collect("SELECT id, label FROM seasons ORDER BY id", season_from_row)?;
        let persons = self.collect(
            "SELECT id, first_name, last_name FROM persons ORDER BY id",
            person_from_row,
        )?;
        let participations = self.collect(
            "SELECT id, person_id, club_id, season_id, role FROM participations ORDER BY id",
            |row| {
                Ok(ParticipationRecord {
                    id: row.get::<_, i64>(0)? as ParticipationId,
                    person_id: row.get::<_, i64>(1)? as PersonId,
                    club_id: row.get::<_, i64>(2)? as ClubId,
                    season_id: row.get::<_, i64>(3)? as SeasonId,
                    role: role_from_sql(row.get(4)?)?,
                })
            },
        )?;
        let stats = self.collect(
            "SELECT participation_id, appearances, goals, assists FROM stats ORDER BY participation_id",
            |row| {
                Ok((
                    row.get::<_, i64>(0)? as ParticipationId,
                    StatsRecord {
                        appearances: row.get(1)?,
                        goals: row.get(2)?,
                        assists: row.get(3)?,
                    },
                ))
            },
        )?;

        Ok(StoreSnapshotV1 {
            clubs,
            seasons,
            persons,
            participations,
            stats,
        })
    }

    fn collect<T>(
        &self,
        sql: &str,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> StoreResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([], map)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn exists(&self, sql: &str, id: u64) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(sql, params![id as i64], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }
}

impl EntityQuery for SqliteStore {
    fn find_club(&self, id: ClubId) -> StoreResult<Option<Club>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name FROM clubs WHERE id = ?1",
                params![id as i64],
                club_from_row,
            )
            .optional()?)
    }

    fn find_season(&self, id: SeasonId) -> StoreResult<Option<Season>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, label FROM seasons WHERE id = ?1",
                params![id as i64],
                season_from_row,
            )
            .optional()?)
    }

    fn list_clubs(&self) -> StoreResult<Vec<Club>> {
        self.collect("SELECT id, name FROM clubs ORDER BY name", club_from_row)
    }

    fn list_seasons(&self) -> StoreResult<Vec<Season>> {
        self.collect("SELECT id, label FROM seasons ORDER BY label", season_from_row)
    }

    fn query_stats_by_category(&self, stat: Stat, scope: ScopeFilter) -> StoreResult<Vec<StatRow>> {
        let (clause, args) = scope_clause(scope);
        // With a single MIN() aggregate, SQLite takes the bare `c.name` from
        // the row holding the minimum, i.e. the earliest participation.
        let sql = format!(
            "SELECT p.id, p.first_name, p.last_name, c.name, SUM(s.{col}) AS total, MIN(pcs.id)
             FROM stats s
             JOIN participations pcs ON pcs.id = s.participation_id
             JOIN persons p ON p.id = pcs.person_id
             JOIN clubs c ON c.id = pcs.club_id
             WHERE pcs.role = 'player' AND s.{col} > 0{clause}
             GROUP BY p.id",
            col = stat.column(),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), |row| {
            Ok(StatRow {
                person_id: row.get::<_, i64>(0)? as PersonId,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                club_name: row.get(3)?,
                total: row.get::<_, i64>(4)? as u64,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn query_managers(&self, scope: ScopeFilter) -> StoreResult<Vec<ManagerRow>> {
        let (clause, args) = scope_clause(scope);
        let sql = format!(
            "SELECT DISTINCT p.id, p.first_name, p.last_name
             FROM participations pcs
             JOIN persons p ON p.id = pcs.person_id
             WHERE pcs.role = 'manager'{clause}"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), |row| {
            Ok(ManagerRow {
                person_id: row.get::<_, i64>(0)? as PersonId,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl EntityWriter for SqliteStore {
    fn get_or_create_club(&mut self, name: &str) -> StoreResult<Club> {
        self.conn.execute(
            "INSERT INTO clubs(name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;
        Ok(self.conn.query_row(
            "SELECT id, name FROM clubs WHERE name = ?1",
            params![name],
            club_from_row,
        )?)
    }

    fn get_or_create_season(&mut self, label: &str) -> StoreResult<Season> {
        self.conn.execute(
            "INSERT INTO seasons(label) VALUES (?1) ON CONFLICT(label) DO NOTHING",
            params![label],
        )?;
        Ok(self.conn.query_row(
            "SELECT id, label FROM seasons WHERE label = ?1",
            params![label],
            season_from_row,
        )?)
    }

    fn find_person(&self, id: PersonId) -> StoreResult<Option<Person>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, first_name, last_name FROM persons WHERE id = ?1",
                params![id as i64],
                person_from_row,
            )
            .optional()?)
    }

    fn create_person(&mut self, first_name: &str, last_name: &str) -> StoreResult<Person> {
        self.conn.execute(
            "INSERT INTO persons(first_name, last_name) VALUES (?1, ?2)",
            params![first_name, last_name],
        )?;
        Ok(Person {
            id: self.conn.last_insert_rowid() as PersonId,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        })
    }

    fn get_or_create_participation(
        &mut self,
        person_id: PersonId,
        club_id: ClubId,
        season_id: SeasonId,
        role: Role,
    ) -> StoreResult<ParticipationRecord> {
        if !self.exists("SELECT id FROM persons WHERE id = ?1", person_id)? {
            return Err(StoreError::MissingPerson(person_id));
        }
        if !self.exists("SELECT id FROM clubs WHERE id = ?1", club_id)? {
            return Err(StoreError::MissingClub(club_id));
        }
        if !self.exists("SELECT id FROM seasons WHERE id = ?1", season_id)? {
            return Err(StoreError::MissingSeason(season_id));
        }

        let (person, club, season) = (person_id as i64, club_id as i64, season_id as i64);
        self.conn.execute(
            "INSERT INTO participations(person_id, club_id, season_id, role)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(person_id, club_id, season_id, role) DO NOTHING",
            params![person, club, season, role.as_str()],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM participations
             WHERE person_id = ?1 AND club_id = ?2 AND season_id = ?3 AND role = ?4",
            params![person, club, season, role.as_str()],
            |row| row.get(0),
        )?;

        Ok(ParticipationRecord {
            id: id as ParticipationId,
            person_id,
            club_id,
            season_id,
            role,
        })
    }

    fn upsert_stats(
        &mut self,
        participation_id: ParticipationId,
        stats: StatsRecord,
    ) -> StoreResult<StatsUpsert> {
        let role: Option<String> = self
            .conn
            .query_row(
                "SELECT role FROM participations WHERE id = ?1",
                params![participation_id as i64],
                |row| row.get(0),
            )
            .optional()?;
        match role.as_deref() {
            None => return Err(StoreError::MissingParticipation(participation_id)),
            Some("player") => {}
            Some(_) => return Err(StoreError::StatsOnManager(participation_id)),
        }

        let existed = self.exists(
            "SELECT participation_id FROM stats WHERE participation_id = ?1",
            participation_id,
        )?;
        self.conn.execute(
            "INSERT INTO stats(participation_id, appearances, goals, assists)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(participation_id) DO UPDATE SET
                appearances = excluded.appearances,
                goals = excluded.goals,
                assists = excluded.assists",
            params![
                participation_id as i64,
                stats.appearances,
                stats.goals,
                stats.assists
            ],
        )?;

        Ok(if existed {
            StatsUpsert::Updated
        } else {
            StatsUpsert::Created
        })
    }
}

fn scope_clause(scope: ScopeFilter) -> (&'static str, Vec<i64>) {
    match scope {
        ScopeFilter::Overall => ("", Vec::new()),
        ScopeFilter::Club(id) => (" AND pcs.club_id = ?1", vec![id as i64]),
        ScopeFilter::Season(id) => (" AND pcs.season_id = ?1", vec![id as i64]),
    }
}

fn club_from_row(row: &Row<'_>) -> rusqlite::Result<Club> {
    Ok(Club {
        id: row.get::<_, i64>(0)? as ClubId,
        name: row.get(1)?,
    })
}

fn season_from_row(row: &Row<'_>) -> rusqlite::Result<Season> {
    Ok(Season {
        id: row.get::<_, i64>(0)? as SeasonId,
        label: row.get(1)?,
    })
}

fn person_from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get::<_, i64>(0)? as PersonId,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
    })
}

fn role_from_sql(raw: String) -> rusqlite::Result<Role> {
    raw.parse().map_err(|err: String| {
        rusqlite::Error::FromSqlConversionFailure(
            raw.len(),
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::other(err)),
        )
    })
}

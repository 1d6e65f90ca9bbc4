use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        contract::{
            EntityQuery, EntityWriter, ManagerRow, ScopeFilter, StatRow, StatsUpsert, StoreError,
            StoreResult,
        },
        indices::{ParticipationKey, VecIndex},
    },
    entity::{Club, ParticipationRecord, Person, Season, StatsRecord},
    types::{ClubId, ParticipationId, PersonId, Role, SeasonId, Stat},
};

/// Serializable image of a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreSnapshotV1 {
    pub clubs: Vec<Club>,
    pub seasons: Vec<Season>,
    pub persons: Vec<Person>,
    /// Participations in creation order.
    pub participations: Vec<ParticipationRecord>,
    pub stats: Vec<(ParticipationId, StatsRecord)>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    clubs: HashMap<ClubId, Club>,
    club_by_name: HashMap<String, ClubId>,
    seasons: HashMap<SeasonId, Season>,
    season_by_label: HashMap<String, SeasonId>,
    persons: HashMap<PersonId, Person>,
    participations: HashMap<ParticipationId, ParticipationRecord>,
    by_key: HashMap<ParticipationKey, ParticipationId>,
    order: Vec<ParticipationId>,
    by_club: VecIndex<ClubId>,
    by_season: VecIndex<SeasonId>,
    stats: HashMap<ParticipationId, StatsRecord>,
    next_club_id: ClubId,
    next_season_id: SeasonId,
    next_person_id: PersonId,
    next_participation_id: ParticipationId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_club_id: 1,
            next_season_id: 1,
            next_person_id: 1,
            next_participation_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a store, re-checking every uniqueness and ownership rule.
    pub fn from_snapshot(snapshot: StoreSnapshotV1) -> StoreResult<Self> {
        let mut store = Self::new();

        for club in snapshot.clubs {
            if store.club_by_name.contains_key(&club.name) || store.clubs.contains_key(&club.id) {
                return Err(StoreError::Corrupt(format!("duplicate club '{}'", club.name)));
            }
            store.next_club_id = store.next_club_id.max(club.id.saturating_add(1));
            store.club_by_name.insert(club.name.clone(), club.id);
            store.clubs.insert(club.id, club);
        }

        for season in snapshot.seasons {
            if store.season_by_label.contains_key(&season.label)
                || store.seasons.contains_key(&season.id)
            {
                return Err(StoreError::Corrupt(format!(
                    "duplicate season '{}'",
                    season.label
                )));
            }
            store.next_season_id = store.next_season_id.max(season.id.saturating_add(1));
            store.season_by_label.insert(season.label.clone(), season.id);
            store.seasons.insert(season.id, season);
        }

        for person in snapshot.persons {
            if store.persons.contains_key(&person.id) {
                return Err(StoreError::Corrupt(format!("duplicate person id={}", person.id)));
            }
            store.next_person_id = store.next_person_id.max(person.id.saturating_add(1));
            store.persons.insert(person.id, person);
        }

        for rec in snapshot.participations {
            store.check_refs(rec.person_id, rec.club_id, rec.season_id)?;
            let key = key_of(&rec);
            if store.by_key.contains_key(&key) || store.participations.contains_key(&rec.id) {
                return Err(StoreError::Corrupt(format!(
                    "duplicate participation id={}",
                    rec.id
                )));
            }
            store.next_participation_id =
                store.next_participation_id.max(rec.id.saturating_add(1));
            store.insert_participation(rec);
        }

        for (id, stats) in snapshot.stats {
            store.check_stats_owner(id)?;
            if store.stats.insert(id, stats).is_some() {
                return Err(StoreError::Corrupt(format!("duplicate stats for participation {id}")));
            }
        }

        Ok(store)
    }

    pub fn export_snapshot(&self) -> StoreSnapshotV1 {
        let mut clubs: Vec<Club> = self.clubs.values().cloned().collect();
        clubs.sort_by_key(|c| c.id);
        let mut seasons: Vec<Season> = self.seasons.values().cloned().collect();
        seasons.sort_by_key(|s| s.id);
        let mut persons: Vec<Person> = self.persons.values().cloned().collect();
        persons.sort_by_key(|p| p.id);

        let participations: Vec<ParticipationRecord> = self
            .order
            .iter()
            .filter_map(|id| self.participations.get(id).cloned())
            .collect();
        let stats = self
            .order
            .iter()
            .filter_map(|id| self.stats.get(id).map(|s| (*id, *s)))
            .collect();

        StoreSnapshotV1 {
            clubs,
            seasons,
            persons,
            participations,
            stats,
        }
    }

    pub fn participation(&self, id: ParticipationId) -> Option<&ParticipationRecord> {
        self.participations.get(&id)
    }

    pub fn stats(&self, id: ParticipationId) -> Option<&StatsRecord> {
        self.stats.get(&id)
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn participation_count(&self) -> usize {
        self.order.len()
    }

    /// Participation ids matching `scope`, in creation order.
    fn scoped_ids(&self, scope: ScopeFilter) -> &[ParticipationId] {
        match scope {
            ScopeFilter::Overall => &self.order,
            ScopeFilter::Club(id) => self.by_club.get(&id).map(Vec::as_slice).unwrap_or(&[]),
            ScopeFilter::Season(id) => self.by_season.get(&id).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    fn scoped<'a>(
        &'a self,
        scope: ScopeFilter,
        role: Role,
    ) -> impl Iterator<Item = &'a ParticipationRecord> + 'a {
        self.scoped_ids(scope)
            .iter()
            .filter_map(move |id| self.participations.get(id))
            .filter(move |rec| rec.role == role)
    }

    fn insert_participation(&mut self, rec: ParticipationRecord) {
        let id = rec.id;
        self.by_key.insert(key_of(&rec), id);
        self.by_club.entry(rec.club_id).or_default().push(id);
        self.by_season.entry(rec.season_id).or_default().push(id);
        self.order.push(id);
        self.participations.insert(id, rec);
    }

    fn check_refs(
        &self,
        person_id: PersonId,
        club_id: ClubId,
        season_id: SeasonId,
    ) -> StoreResult<()> {
        if !self.persons.contains_key(&person_id) {
            return Err(StoreError::MissingPerson(person_id));
        }
        if !self.clubs.contains_key(&club_id) {
            return Err(StoreError::MissingClub(club_id));
        }
        if !self.seasons.contains_key(&season_id) {
            return Err(StoreError::MissingSeason(season_id));
        }
        Ok(())
    }

    fn check_stats_owner(&self, id: ParticipationId) -> StoreResult<()> {
        let rec = self
            .participations
            .get(&id)
            .ok_or(StoreError::MissingParticipation(id))?;
        if rec.role != Role::Player {
            return Err(StoreError::StatsOnManager(id));
        }
        Ok(())
    }

    fn person(&self, id: PersonId) -> StoreResult<&Person> {
        self.persons.get(&id).ok_or(StoreError::MissingPerson(id))
    }
}

impl EntityQuery for MemoryStore {
    fn find_club(&self, id: ClubId) -> StoreResult<Option<Club>> {
        Ok(self.clubs.get(&id).cloned())
    }

    fn find_season(&self, id: SeasonId) -> StoreResult<Option<Season>> {
        Ok(self.seasons.get(&id).cloned())
    }

    fn list_clubs(&self) -> StoreResult<Vec<Club>> {
        let mut clubs: Vec<Club> = self.clubs.values().cloned().collect();
        clubs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clubs)
    }

    fn list_seasons(&self) -> StoreResult<Vec<Season>> {
        let mut seasons: Vec<Season> = self.seasons.values().cloned().collect();
        seasons.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(seasons)
    }

    fn query_stats_by_category(&self, stat: Stat, scope: ScopeFilter) -> StoreResult<Vec<StatRow>> {
        // person -> (slot in `rows`), rows kept in first-contribution order
        let mut slot: HashMap<PersonId, usize> = HashMap::new();
        let mut rows: Vec<StatRow> = Vec::new();

        for rec in self.scoped(scope, Role::Player) {
            let value = self.stats.get(&rec.id).map_or(0, |s| s.get(stat));
            if value == 0 {
                continue;
            }

            if let Some(&idx) = slot.get(&rec.person_id) {
                rows[idx].total += u64::from(value);
                continue;
            }

            let person = self.person(rec.person_id)?;
            slot.insert(rec.person_id, rows.len());
            rows.push(StatRow {
                person_id: person.id,
                first_name: person.first_name.clone(),
                last_name: person.last_name.clone(),
                club_name: self.clubs.get(&rec.club_id).map(|c| c.name.clone()),
                total: u64::from(value),
            });
        }

        Ok(rows)
    }

    fn query_managers(&self, scope: ScopeFilter) -> StoreResult<Vec<ManagerRow>> {
        let mut seen: HashSet<PersonId> = HashSet::new();
        let mut rows = Vec::new();
        for rec in self.scoped(scope, Role::Manager) {
            if !seen.insert(rec.person_id) {
                continue;
            }
            let person = self.person(rec.person_id)?;
            rows.push(ManagerRow {
                person_id: person.id,
                first_name: person.first_name.clone(),
                last_name: person.last_name.clone(),
            });
        }
        Ok(rows)
    }
}

impl EntityWriter for MemoryStore {
    fn get_or_create_club(&mut self, name: &str) -> StoreResult<Club> {
        if let Some(id) = self.club_by_name.get(name) {
            return self.clubs.get(id).cloned().ok_or(StoreError::MissingClub(*id));
        }
        let club = Club {
            id: self.next_club_id,
            name: name.to_string(),
        };
        self.next_club_id += 1;
        self.club_by_name.insert(club.name.clone(), club.id);
        self.clubs.insert(club.id, club.clone());
        Ok(club)
    }

    fn get_or_create_season(&mut self, label: &str) -> StoreResult<Season> {
        if let Some(id) = self.season_by_label.get(label) {
            return self.seasons.get(id).cloned().ok_or(StoreError::MissingSeason(*id));
        }
        let season = Season {
            id: self.next_season_id,
            label: label.to_string(),
        };
        self.next_season_id += 1;
        self.season_by_label.insert(season.label.clone(), season.id);
        self.seasons.insert(season.id, season.clone());
        Ok(season)
    }

    fn find_person(&self, id: PersonId) -> StoreResult<Option<Person>> {
        Ok(self.persons.get(&id).cloned())
    }

    fn create_person(&mut self, first_name: &str, last_name: &str) -> StoreResult<Person> {
        let person = Person {
            id: self.next_person_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        };
        self.next_person_id += 1;
        self.persons.insert(person.id, person.clone());
        Ok(person)
    }

    fn get_or_create_participation(
        &mut self,
        person_id: PersonId,
        club_id: ClubId,
        season_id: SeasonId,
        role: Role,
    ) -> StoreResult<ParticipationRecord> {
        self.check_refs(person_id, club_id, season_id)?;
        let key = ParticipationKey {
            person_id,
            club_id,
            season_id,
            role,
        };
        if let Some(id) = self.by_key.get(&key) {
            return self
                .participations
                .get(id)
                .cloned()
                .ok_or(StoreError::MissingParticipation(*id));
        }

        let rec = ParticipationRecord {
            id: self.next_participation_id,
            person_id,
            club_id,
            season_id,
            role,
        };
        self.next_participation_id += 1;
        self.insert_participation(rec.clone());
        Ok(rec)
    }

    fn upsert_stats(
        &mut self,
        participation_id: ParticipationId,
        stats: StatsRecord,
    ) -> StoreResult<StatsUpsert> {
        self.check_stats_owner(participation_id)?;
        Ok(match self.stats.insert(participation_id, stats) {
            Some(_) => StatsUpsert::Updated,
            None => StatsUpsert::Created,
        })
    }
}

fn key_of(rec: &ParticipationRecord) -> ParticipationKey {
    ParticipationKey {
        person_id: rec.person_id,
        club_id: rec.club_id,
        season_id: rec.season_id,
        role: rec.role,
    }
}

use hashbrown::HashMap;

use crate::types::{ClubId, ParticipationId, PersonId, Role, SeasonId};

pub type VecIndex<K> = HashMap<K, Vec<ParticipationId>>;

/// Uniqueness key of a participation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipationKey {
    pub person_id: PersonId,
    pub club_id: ClubId,
    pub season_id: SeasonId,
    pub role: Role,
}

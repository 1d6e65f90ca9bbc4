use tempfile::TempDir;

use footyquiz::{
    core::{
        contract::{EntityQuery, EntityWriter, StatsUpsert, StoreError},
        store::MemoryStore,
    },
    engine::{QuizConfig, generate_quiz},
    entity::StatsRecord,
    persist::sqlite::SqliteStore,
    types::{QuizCategory, QuizMode, Role},
};

fn stats(appearances: u32, goals: u32, assists: u32) -> StatsRecord {
    StatsRecord {
        appearances,
        goals,
        assists,
    }
}

/// Same writes against any store: two clubs, two seasons, a transfer,
/// a player-manager and a zero-goal defender.
fn seed<W: EntityWriter>(w: &mut W) {
    let arsenal = w.get_or_create_club("Arsenal").expect("club");
    let chelsea = w.get_or_create_club("Chelsea").expect("club");
    let s1 = w.get_or_create_season("2003/2004").expect("season");
    let s2 = w.get_or_create_season("2004/2005").expect("season");

    let henry = w.create_person("Thierry", "Henry").expect("person");
    let lampard = w.create_person("Frank", "Lampard").expect("person");
    let cole = w.create_person("Ashley", "Cole").expect("person");
    let terry = w.create_person("John", "Terry").expect("person");
    let wenger = w.create_person("Arsene", "Wenger").expect("person");
    let mourinho = w.create_person("Jose", "Mourinho").expect("person");

    let mut play = |person, club, season, s: StatsRecord| {
        let pcs = w
            .get_or_create_participation(person, club, season, Role::Player)
            .expect("participation");
        w.upsert_stats(pcs.id, s).expect("stats");
    };
    play(henry.id, arsenal.id, s1.id, stats(37, 30, 6));
    play(henry.id, arsenal.id, s2.id, stats(32, 25, 14));
    play(lampard.id, chelsea.id, s1.id, stats(38, 10, 9));
    play(lampard.id, chelsea.id, s2.id, stats(38, 13, 16));
    play(cole.id, arsenal.id, s1.id, stats(32, 0, 3));
    play(cole.id, chelsea.id, s2.id, stats(0, 0, 0));
    play(terry.id, chelsea.id, s2.id, stats(36, 3, 1));

    for (person, club, season) in [
        (wenger.id, arsenal.id, s1.id),
        (wenger.id, arsenal.id, s2.id),
        (mourinho.id, chelsea.id, s2.id),
        (terry.id, chelsea.id, s2.id),
    ] {
        w.get_or_create_participation(person, club, season, Role::Manager)
            .expect("manager");
    }
}

fn configs() -> Vec<QuizConfig> {
    let mut out = Vec::new();
    for category in [
        QuizCategory::Goals,
        QuizCategory::Assists,
        QuizCategory::Appearances,
        QuizCategory::Managers,
    ] {
        out.push(QuizConfig::new(QuizMode::Overall, category));
        for id in [1, 2, 99] {
            out.push(QuizConfig::new(QuizMode::Club, category).club(id).limit(2));
            out.push(QuizConfig::new(QuizMode::Season, category).season(id));
        }
    }
    out
}

#[test]
fn sqlite_and_memory_stores_agree_on_every_quiz() {
    let mut memory = MemoryStore::new();
    let mut sqlite = SqliteStore::open_in_memory().expect("open sqlite");
    seed(&mut memory);
    seed(&mut sqlite);

    for cfg in configs() {
        let a = generate_quiz(&memory, &cfg).expect("memory quiz");
        let b = generate_quiz(&sqlite, &cfg).expect("sqlite quiz");
        assert_eq!(a, b, "config {cfg:?}");
    }
    assert_eq!(memory.list_clubs().expect("clubs"), sqlite.list_clubs().expect("clubs"));
    assert_eq!(
        memory.list_seasons().expect("seasons"),
        sqlite.list_seasons().expect("seasons")
    );
}

#[test]
fn sqlite_reopen_and_load_round_trips() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("quiz.db");

    let mut sqlite = SqliteStore::open(&db_path).expect("open sqlite");
    seed(&mut sqlite);
    let before = sqlite.export_snapshot().expect("snapshot");
    drop(sqlite);

    let reopened = SqliteStore::open(&db_path).expect("reopen");
    assert_eq!(reopened.export_snapshot().expect("snapshot"), before);

    let loaded = reopened.load_store().expect("load");
    assert_eq!(loaded.export_snapshot(), before);
    for cfg in configs() {
        assert_eq!(
            generate_quiz(&loaded, &cfg).expect("memory quiz"),
            generate_quiz(&reopened, &cfg).expect("sqlite quiz"),
        );
    }
}

#[test]
fn sqlite_enforces_participation_rules() {
    let mut sqlite = SqliteStore::open_in_memory().expect("open sqlite");
    let club = sqlite.get_or_create_club("Leeds").expect("club");
    assert_eq!(sqlite.get_or_create_club("Leeds").expect("club"), club);
    let season = sqlite.get_or_create_season("1991/1992").expect("season");
    let person = sqlite.create_person("Eric", "Cantona").expect("person");
    let twin = sqlite.create_person("Eric", "Cantona").expect("person");
    assert_ne!(person.id, twin.id);

    let first = sqlite
        .get_or_create_participation(person.id, club.id, season.id, Role::Player)
        .expect("participation");
    let again = sqlite
        .get_or_create_participation(person.id, club.id, season.id, Role::Player)
        .expect("participation");
    assert_eq!(first, again);

    assert_eq!(
        sqlite.upsert_stats(first.id, stats(20, 3, 2)).expect("stats"),
        StatsUpsert::Created
    );
    assert_eq!(
        sqlite.upsert_stats(first.id, stats(21, 4, 2)).expect("stats"),
        StatsUpsert::Updated
    );

    let managed = sqlite
        .get_or_create_participation(person.id, club.id, season.id, Role::Manager)
        .expect("manager");
    assert_ne!(managed.id, first.id);
    assert!(matches!(
        sqlite.upsert_stats(managed.id, stats(1, 1, 1)),
        Err(StoreError::StatsOnManager(id)) if id == managed.id
    ));
    assert!(matches!(
        sqlite.get_or_create_participation(999, club.id, season.id, Role::Player),
        Err(StoreError::MissingPerson(999))
    ));
    assert!(matches!(
        sqlite.upsert_stats(999, stats(1, 1, 1)),
        Err(StoreError::MissingParticipation(999))
    ));

    let snapshot = sqlite.export_snapshot().expect("snapshot");
    assert_eq!(snapshot.stats, vec![(first.id, stats(21, 4, 2))]);
}

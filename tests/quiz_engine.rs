use footyquiz::{
    core::{
        contract::{EntityQuery, EntityWriter, ScopeFilter},
        store::MemoryStore,
    },
    engine::{MANAGERS_OVERALL_ERROR, QuizAnswer, QuizConfig, generate_quiz},
    entity::StatsRecord,
    types::{ClubId, PersonId, QuizCategory, QuizMode, Role, SeasonId},
};

fn player(
    store: &mut MemoryStore,
    person: PersonId,
    club: &str,
    season: &str,
    stats: StatsRecord,
) -> (ClubId, SeasonId) {
    let club = store.get_or_create_club(club).unwrap();
    let season = store.get_or_create_season(season).unwrap();
    let pcs = store
        .get_or_create_participation(person, club.id, season.id, Role::Player)
        .unwrap();
    store.upsert_stats(pcs.id, stats).unwrap();
    (club.id, season.id)
}

fn manager(store: &mut MemoryStore, person: PersonId, club: &str, season: &str) {
    let club = store.get_or_create_club(club).unwrap();
    let season = store.get_or_create_season(season).unwrap();
    store
        .get_or_create_participation(person, club.id, season.id, Role::Manager)
        .unwrap();
}

fn goals(n: u32) -> StatsRecord {
    StatsRecord {
        goals: n,
        ..StatsRecord::default()
    }
}

fn ids(answers: &[QuizAnswer]) -> Vec<PersonId> {
    answers.iter().map(QuizAnswer::id).collect()
}

#[test]
fn club_goals_rank_by_total_descending() {
    let mut store = MemoryStore::new();
    let adams = store.create_person("Tony", "Adams").unwrap();
    let baker = store.create_person("Joe", "Baker").unwrap();
    let (club_a, _) = player(&mut store, adams.id, "Club A", "1990/1991", goals(3));
    player(&mut store, baker.id, "Club A", "1990/1991", goals(5));

    let cfg = QuizConfig::new(QuizMode::Club, QuizCategory::Goals)
        .club(club_a)
        .limit(10);
    let result = generate_quiz(&store, &cfg).unwrap();

    assert_eq!(result.max_answers, 2);
    assert_eq!(ids(&result.answers), vec![baker.id, adams.id]);
    assert_eq!(result.answers[0].total(), Some(5));
    assert_eq!(result.answers[1].total(), Some(3));
    assert!(result.error.is_none());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["answers"][0]["total_goals"], 5);
    assert_eq!(json["answers"][0]["name"], "Joe Baker");
    assert_eq!(json["answers"][0]["club"], "Club A");
    assert!(json.get("error").is_none());
}

#[test]
fn club_without_scorers_yields_nothing() {
    let mut store = MemoryStore::new();
    let adams = store.create_person("Tony", "Adams").unwrap();
    player(&mut store, adams.id, "Club A", "1990/1991", goals(3));
    let club_b = store.get_or_create_club("Club B").unwrap();

    let cfg = QuizConfig::new(QuizMode::Club, QuizCategory::Goals).club(club_b.id);
    let result = generate_quiz(&store, &cfg).unwrap();

    assert_eq!(result.max_answers, 0);
    assert!(result.answers.is_empty());
}

#[test]
fn manager_at_two_clubs_in_one_season_counts_once() {
    let mut store = MemoryStore::new();
    let boss = store.create_person("Harry", "Redknapp").unwrap();
    manager(&mut store, boss.id, "Club A", "2008/2009");
    manager(&mut store, boss.id, "Club B", "2008/2009");
    let season = store.get_or_create_season("2008/2009").unwrap();

    let cfg = QuizConfig::new(QuizMode::Season, QuizCategory::Managers).season(season.id);
    let result = generate_quiz(&store, &cfg).unwrap();

    assert_eq!(result.max_answers, 1);
    assert_eq!(ids(&result.answers), vec![boss.id]);
    assert_eq!(result.answers[0].total(), None);
    let json = serde_json::to_value(&result.answers[0]).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 4);
}

#[test]
fn limit_truncates_but_max_answers_counts_everyone() {
    let mut store = MemoryStore::new();
    for (i, last) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        let p = store.create_person("P", last).unwrap();
        player(&mut store, p.id, "Club A", "2000/2001", goals(i as u32 + 1));
    }

    let cfg = QuizConfig::new(QuizMode::Overall, QuizCategory::Goals).limit(1);
    let result = generate_quiz(&store, &cfg).unwrap();

    assert_eq!(result.answers.len(), 1);
    assert_eq!(result.max_answers, 5);
    assert_eq!(result.answers[0].last_name(), "E");
}

#[test]
fn managers_in_overall_mode_are_rejected_without_querying() {
    let mut store = MemoryStore::new();
    let boss = store.create_person("Arsene", "Wenger").unwrap();
    manager(&mut store, boss.id, "Arsenal", "2003/2004");

    let cfg = QuizConfig::new(QuizMode::Overall, QuizCategory::Managers)
        .club(1)
        .season(1)
        .limit(50);
    let result = generate_quiz(&store, &cfg).unwrap();

    assert_eq!(result.max_answers, 0);
    assert!(result.answers.is_empty());
    assert_eq!(result.error.as_deref(), Some(MANAGERS_OVERALL_ERROR));
    assert_eq!(result.config, cfg);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json["error"],
        "Managers quiz is only available for club or season mode."
    );
    assert_eq!(json["config"]["limit"], 50);
}

#[test]
fn ties_break_on_last_name_then_person_id() {
    let mut store = MemoryStore::new();
    let smith_b = store.create_person("Bob", "Smith").unwrap();
    let jones = store.create_person("Ann", "Jones").unwrap();
    let smith_a = store.create_person("Al", "Smith").unwrap();
    let top = store.create_person("Zed", "Zola").unwrap();
    for p in [smith_b.id, jones.id, smith_a.id] {
        player(&mut store, p, "Club A", "2000/2001", goals(4));
    }
    player(&mut store, top.id, "Club A", "2000/2001", goals(9));

    let cfg = QuizConfig::new(QuizMode::Overall, QuizCategory::Goals);
    let result = generate_quiz(&store, &cfg).unwrap();

    assert_eq!(
        ids(&result.answers),
        vec![top.id, jones.id, smith_b.id, smith_a.id]
    );
}

#[test]
fn managers_sort_by_last_then_first_name() {
    let mut store = MemoryStore::new();
    let b = store.create_person("Brian", "Clough").unwrap();
    let a = store.create_person("Alex", "Ferguson").unwrap();
    let n = store.create_person("Nigel", "Clough").unwrap();
    let c = store.create_person("Arsene", "Wenger").unwrap();
    for p in [b.id, a.id, n.id, c.id] {
        manager(&mut store, p, "Club A", "1990/1991");
    }
    let club = store.get_or_create_club("Club A").unwrap();

    let cfg = QuizConfig::new(QuizMode::Club, QuizCategory::Managers)
        .club(club.id)
        .limit(3);
    let result = generate_quiz(&store, &cfg).unwrap();

    assert_eq!(result.max_answers, 4);
    assert_eq!(ids(&result.answers), vec![b.id, n.id, a.id]);
}

#[test]
fn totals_sum_across_clubs_and_seasons() {
    let mut store = MemoryStore::new();
    let striker = store.create_person("Alan", "Shearer").unwrap();
    let (_, s1) = player(&mut store, striker.id, "Blackburn", "1995/1996", goals(31));
    player(&mut store, striker.id, "Newcastle", "1996/1997", goals(25));
    player(&mut store, striker.id, "Newcastle", "1995/1996", goals(0));

    let overall = QuizConfig::new(QuizMode::Overall, QuizCategory::Goals);
    let result = generate_quiz(&store, &overall).unwrap();
    assert_eq!(result.max_answers, 1);
    assert_eq!(result.answers[0].total(), Some(56));
    // club comes from the earliest contributing record
    let json = serde_json::to_value(&result.answers[0]).unwrap();
    assert_eq!(json["club"], "Blackburn");

    let season = QuizConfig::new(QuizMode::Season, QuizCategory::Goals).season(s1);
    let result = generate_quiz(&store, &season).unwrap();
    assert_eq!(result.answers[0].total(), Some(31));
}

#[test]
fn zero_valued_statistics_do_not_qualify() {
    let mut store = MemoryStore::new();
    let keeper = store.create_person("David", "Seaman").unwrap();
    let winger = store.create_person("Marc", "Overmars").unwrap();
    player(
        &mut store,
        keeper.id,
        "Arsenal",
        "1997/1998",
        StatsRecord {
            appearances: 31,
            goals: 0,
            assists: 0,
        },
    );
    player(
        &mut store,
        winger.id,
        "Arsenal",
        "1997/1998",
        StatsRecord {
            appearances: 32,
            goals: 12,
            assists: 5,
        },
    );

    let apps = generate_quiz(
        &store,
        &QuizConfig::new(QuizMode::Overall, QuizCategory::Appearances),
    )
    .unwrap();
    assert_eq!(apps.max_answers, 2);
    assert_eq!(ids(&apps.answers), vec![winger.id, keeper.id]);

    let assists = generate_quiz(
        &store,
        &QuizConfig::new(QuizMode::Overall, QuizCategory::Assists),
    )
    .unwrap();
    assert_eq!(assists.max_answers, 1);
    let json = serde_json::to_value(&assists.answers[0]).unwrap();
    assert_eq!(json["total_assists"], 5);
}

#[test]
fn player_and_manager_roles_are_counted_separately() {
    let mut store = MemoryStore::new();
    let dalglish = store.create_person("Kenny", "Dalglish").unwrap();
    let (club, season) = player(&mut store, dalglish.id, "Liverpool", "1985/1986", goals(3));
    manager(&mut store, dalglish.id, "Liverpool", "1985/1986");

    let scorers = generate_quiz(
        &store,
        &QuizConfig::new(QuizMode::Club, QuizCategory::Goals).club(club),
    )
    .unwrap();
    let managers = generate_quiz(
        &store,
        &QuizConfig::new(QuizMode::Season, QuizCategory::Managers).season(season),
    )
    .unwrap();
    assert_eq!(ids(&scorers.answers), vec![dalglish.id]);
    assert_eq!(ids(&managers.answers), vec![dalglish.id]);
}

#[test]
fn missing_zero_or_unknown_ids_fall_through_to_overall() {
    let mut store = MemoryStore::new();
    let a = store.create_person("Ian", "Wright").unwrap();
    let b = store.create_person("Andy", "Cole").unwrap();
    player(&mut store, a.id, "Arsenal", "1993/1994", goals(23));
    player(&mut store, b.id, "Newcastle", "1993/1994", goals(34));

    for cfg in [
        QuizConfig::new(QuizMode::Club, QuizCategory::Goals),
        QuizConfig::new(QuizMode::Club, QuizCategory::Goals).club(0),
        QuizConfig::new(QuizMode::Club, QuizCategory::Goals).club(999),
        QuizConfig::new(QuizMode::Season, QuizCategory::Goals).season(999),
        QuizConfig::new(QuizMode::Season, QuizCategory::Goals).club(1),
    ] {
        let result = generate_quiz(&store, &cfg).unwrap();
        assert_eq!(result.max_answers, 2, "config {cfg:?}");
        assert_eq!(result.config, cfg);
    }
}

#[test]
fn managers_in_club_mode_without_club_cover_everyone() {
    let mut store = MemoryStore::new();
    let a = store.create_person("Bob", "Paisley").unwrap();
    let b = store.create_person("Bill", "Shankly").unwrap();
    manager(&mut store, a.id, "Liverpool", "1976/1977");
    manager(&mut store, b.id, "Liverpool", "1970/1971");

    let cfg = QuizConfig::new(QuizMode::Club, QuizCategory::Managers);
    let result = generate_quiz(&store, &cfg).unwrap();
    assert!(result.error.is_none());
    assert_eq!(result.max_answers, 2);
    assert_eq!(
        store.query_managers(ScopeFilter::Overall).unwrap().len(),
        2
    );
}

#[test]
fn concurrent_quizzes_share_one_store() {
    let mut store = MemoryStore::new();
    for i in 0..20u32 {
        let p = store.create_person("P", &format!("L{i:02}")).unwrap();
        player(&mut store, p.id, "Club A", "2000/2001", goals(i % 7 + 1));
    }
    let cfg = QuizConfig::new(QuizMode::Overall, QuizCategory::Goals).limit(5);
    let expected = generate_quiz(&store, &cfg).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| generate_quiz(&store, &cfg).unwrap()))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

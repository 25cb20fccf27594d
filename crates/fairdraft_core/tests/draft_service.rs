use fairdraft_core::db::open_db_in_memory;
use fairdraft_core::draft::MAX_TEAM_COUNT;
use fairdraft_core::{
    replay, DraftError, DraftService, DraftSettings, GeneratedResult, MissingHandling, Player,
    PlayerId, RepoError, ResultListQuery, ResultRepository, RosterService, SqlitePlayerRepository,
    SqlitePlayerSetRepository, SqliteResultRepository, StaticRoster,
};
use std::collections::BTreeSet;
use uuid::Uuid;

fn club_roster() -> Vec<Player> {
    [
        ("Ada", Some(81.0)),
        ("Bo", Some(74.0)),
        ("Cy", Some(66.0)),
        ("Di", Some(66.0)),
        ("Ed", Some(59.0)),
        ("Flo", None),
        ("Gus", Some(52.0)),
        ("Hal", Some(45.0)),
    ]
    .into_iter()
    .map(|(name, rating)| {
        let player = Player::new(name).with_category("position", "Field");
        match rating {
            Some(rating) => player.with_number("rating", rating),
            None => player,
        }
    })
    .collect()
}

fn drafted_ids(result: &GeneratedResult) -> BTreeSet<PlayerId> {
    result
        .teams
        .iter()
        .flat_map(|team| team.player_ids.iter().copied())
        .collect()
}

#[test]
fn generate_balances_on_the_first_numeric_criterion() {
    let players = club_roster();
    let service = DraftService::new(StaticRoster::new(players.clone()));

    let result = service.generate(&DraftSettings::default(), Some(42)).unwrap();

    assert_eq!(result.seed, 42);
    assert_eq!(result.parameters.attribute_key.as_deref(), Some("rating"));
    assert_eq!(result.teams.len(), 2);
    assert_eq!(
        drafted_ids(&result),
        players.iter().map(|player| player.id).collect()
    );
    assert!(!result.is_saved);

    let report = result.fairness.as_ref().unwrap();
    assert_eq!(report.attribute_key, "rating");
    assert_eq!(report.missing_count, 1);
    assert_eq!(report.fallback_value, 60.0);
}

#[test]
fn generate_without_seed_records_the_drawn_seed() {
    let service = DraftService::new(StaticRoster::new(club_roster()));

    let result = service.generate(&DraftSettings::default(), None).unwrap();
    let again = replay(&result).unwrap();

    assert_eq!(again.seed, result.seed);
    assert_eq!(again.teams, result.teams);
}

#[test]
fn same_seed_reproduces_the_same_teams() {
    let players = club_roster();
    let mut reversed = players.clone();
    reversed.reverse();
    let settings = DraftSettings {
        team_count: 3,
        ..DraftSettings::default()
    };

    let first = DraftService::new(StaticRoster::new(players))
        .generate(&settings, Some(7))
        .unwrap();
    let second = DraftService::new(StaticRoster::new(reversed))
        .generate(&settings, Some(7))
        .unwrap();

    assert_eq!(first.teams, second.teams);
}

#[test]
fn reroll_keeps_settings_and_covers_the_roster() {
    let players = club_roster();
    let service = DraftService::new(StaticRoster::new(players.clone()));
    let settings = DraftSettings {
        team_count: 4,
        ..DraftSettings::default()
    };

    let first = service.generate(&settings, Some(1)).unwrap();
    let rerolled = service.reroll(&first).unwrap();

    assert_ne!(rerolled.id, first.id);
    assert_eq!(rerolled.settings, first.settings);
    assert_eq!(rerolled.teams.len(), 4);
    assert_eq!(drafted_ids(&rerolled), drafted_ids(&first));
}

#[test]
fn team_count_below_two_is_clamped() {
    let service = DraftService::new(StaticRoster::new(club_roster()));
    let settings = DraftSettings {
        team_count: 0,
        ..DraftSettings::default()
    };

    let result = service.generate(&settings, Some(3)).unwrap();

    assert_eq!(result.parameters.team_count, 2);
    assert_eq!(result.teams.len(), 2);
}

#[test]
fn team_count_above_the_maximum_is_rejected() {
    let service = DraftService::new(StaticRoster::new(club_roster()));

    for team_count in [MAX_TEAM_COUNT + 1, usize::MAX / 2, usize::MAX] {
        let settings = DraftSettings {
            team_count,
            ..DraftSettings::default()
        };
        let err = service.generate(&settings, Some(3)).unwrap_err();
        assert!(matches!(
            err,
            DraftError::TeamCountTooLarge { requested, max }
                if requested == team_count && max == MAX_TEAM_COUNT
        ));
    }

    let settings = DraftSettings {
        team_count: MAX_TEAM_COUNT,
        ..DraftSettings::default()
    };
    let result = service.generate(&settings, Some(3)).unwrap();
    assert_eq!(result.teams.len(), MAX_TEAM_COUNT);
}

#[test]
fn different_seeds_give_different_teams() {
    let service = DraftService::new(StaticRoster::new(club_roster()));

    let compositions: BTreeSet<BTreeSet<PlayerId>> = (0..16)
        .map(|seed| {
            let result = service.generate(&DraftSettings::default(), Some(seed)).unwrap();
            result.teams[0].player_ids.iter().copied().collect()
        })
        .collect();

    assert!(compositions.len() > 1);
}

#[test]
fn out_of_range_ratings_count_as_missing() {
    let mut players = club_roster();
    players.push(Player::new("Ivy").with_number("rating", f64::MAX));
    players.push(Player::new("Jo").with_number("rating", f64::MAX));
    let service = DraftService::new(StaticRoster::new(players));

    let result = service.generate(&DraftSettings::default(), Some(12)).unwrap();

    let report = result.fairness.as_ref().unwrap();
    assert_eq!(report.missing_count, 3);
    assert!(report.team_sums.iter().all(|sum| sum.is_finite()));
    assert!(report.spread.is_finite());
    assert!(report.gap_fraction.is_finite());
    assert!(report.score.is_finite());
    assert_eq!(report.team_sums.iter().sum::<f64>(), 443.0 + 3.0 * 60.0);

    let conn = open_db_in_memory().unwrap();
    let results = SqliteResultRepository::try_new(&conn).unwrap();
    let err = results.save_result(&result).unwrap_err();
    assert!(matches!(err, RepoError::InvalidPlayer(_)));
    assert!(results.list_results(&ResultListQuery::default()).unwrap().is_empty());
}

#[test]
fn exclude_policy_leaves_players_out() {
    let players = club_roster();
    let mut settings = DraftSettings::default();
    settings
        .missing_handling
        .insert("rating".to_string(), MissingHandling::Exclude);

    let result = DraftService::new(StaticRoster::new(players.clone()))
        .generate(&settings, Some(5))
        .unwrap();

    assert_eq!(result.players.len(), players.len() - 1);
    assert!(result.players.iter().all(|player| player.name != "Flo"));
    assert_eq!(result.fairness.as_ref().unwrap().missing_count, 0);
}

#[test]
fn unknown_player_set_is_a_roster_error() {
    let service = DraftService::new(StaticRoster::new(club_roster()));
    let settings = DraftSettings {
        player_set_id: Uuid::new_v4(),
        ..DraftSettings::default()
    };

    let err = service.generate(&settings, Some(1)).unwrap_err();
    assert!(matches!(err, DraftError::Roster(RepoError::NotFound { .. })));
}

#[test]
fn empty_roster_drafts_empty_teams() {
    let service = DraftService::new(StaticRoster::new(Vec::new()));

    let result = service.generate(&DraftSettings::default(), Some(1)).unwrap();

    assert_eq!(result.teams.len(), 2);
    assert!(result.teams.iter().all(|team| team.is_empty()));
    assert!(result.fairness.is_none());
}

#[test]
fn stored_roster_drafts_and_results_persist() {
    let conn = open_db_in_memory().unwrap();
    let roster = RosterService::new(
        SqlitePlayerRepository::try_new(&conn).unwrap(),
        SqlitePlayerSetRepository::try_new(&conn).unwrap(),
    );
    for player in club_roster() {
        roster.add_player(&player).unwrap();
    }
    let service = DraftService::new(roster);
    let results = SqliteResultRepository::try_new(&conn).unwrap();

    let result = service.generate(&DraftSettings::default(), Some(2024)).unwrap();
    results.save_result(&result).unwrap();

    let loaded = results.get_result(result.id).unwrap().unwrap();
    assert_eq!(loaded.seed, 2024);
    assert_eq!(loaded.teams, result.teams);
    assert_eq!(loaded.players.len(), 8);
    assert!(!loaded.is_saved);

    let replayed = replay(&loaded).unwrap();
    assert_eq!(replayed.teams, result.teams);
}

#[test]
fn result_library_tracks_saved_flag_and_prunes_unsaved() {
    let conn = open_db_in_memory().unwrap();
    let results = SqliteResultRepository::try_new(&conn).unwrap();
    let service = DraftService::new(StaticRoster::new(club_roster()));

    let mut ids = Vec::new();
    for seed in 0..5 {
        let result = service.generate(&DraftSettings::default(), Some(seed)).unwrap();
        ids.push(results.save_result(&result).unwrap());
    }
    results.mark_saved(ids[0], true).unwrap();

    let saved = results
        .list_results(&ResultListQuery {
            saved_only: true,
            limit: None,
        })
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, ids[0]);
    assert!(saved[0].is_saved);

    let limited = results
        .list_results(&ResultListQuery {
            saved_only: false,
            limit: Some(3),
        })
        .unwrap();
    assert_eq!(limited.len(), 3);

    assert_eq!(results.prune_unsaved(2).unwrap(), 2);
    assert_eq!(results.list_results(&ResultListQuery::default()).unwrap().len(), 3);
    assert!(results.get_result(ids[0]).unwrap().is_some());

    results.delete_result(ids[0]).unwrap();
    let err = results.mark_saved(ids[0], false).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "result", .. }));
}

#[test]
fn save_result_rejects_inconsistent_teams() {
    let conn = open_db_in_memory().unwrap();
    let results = SqliteResultRepository::try_new(&conn).unwrap();
    let service = DraftService::new(StaticRoster::new(club_roster()));

    let mut result = service.generate(&DraftSettings::default(), Some(9)).unwrap();
    let moved = result.teams[0].player_ids[0];
    result.teams[1].player_ids.push(moved);

    let err = results.save_result(&result).unwrap_err();
    assert!(matches!(err, RepoError::InvalidResult(_)));
}

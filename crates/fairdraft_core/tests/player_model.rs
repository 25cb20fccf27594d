use fairdraft_core::{CriterionValue, Player, PlayerValidationError};
use uuid::Uuid;

#[test]
fn player_new_sets_defaults() {
    let player = Player::new("Robin");

    assert!(!player.id.is_nil());
    assert_eq!(player.name, "Robin");
    assert!(player.criteria.is_empty());
    assert_eq!(player.created_at, player.updated_at);
    assert!(player.validate().is_ok());
}

#[test]
fn with_id_rejects_nil_uuid() {
    let err = Player::with_id(Uuid::nil(), "nobody").unwrap_err();
    assert_eq!(err, PlayerValidationError::NilId);
}

#[test]
fn validate_rejects_blank_names() {
    let player = Player::new("   ");
    assert_eq!(player.validate(), Err(PlayerValidationError::BlankName));
}

#[test]
fn player_serialization_uses_tagged_criteria() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let player = Player::with_id(id, "Robin")
        .unwrap()
        .with_number("rating", 72.0)
        .with_category("position", "Goalkeeper");

    let json = serde_json::to_value(&player).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["name"], "Robin");
    assert_eq!(json["criteria"]["rating"]["type"], "number");
    assert_eq!(json["criteria"]["rating"]["value"], 72.0);
    assert_eq!(json["criteria"]["position"]["type"], "category");
    assert_eq!(json["criteria"]["position"]["value"], "Goalkeeper");

    let decoded: Player = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, player);
}

#[test]
fn deserialize_rejects_reversed_timestamps() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "Robin",
        "criteria": {},
        "created_at": 200,
        "updated_at": 100
    });

    let err = serde_json::from_value::<Player>(value).unwrap_err();
    assert!(
        err.to_string()
            .contains("updated_at (100) must be >= created_at (200)"),
        "unexpected error: {err}"
    );
}

#[test]
fn set_criterion_replaces_and_clears_values() {
    let mut player = Player::new("Robin").with_number("rating", 50.0);

    player.set_criterion("rating", CriterionValue::Number(65.0));
    assert_eq!(player.number("rating"), Some(65.0));

    player.set_criterion("gender", CriterionValue::Category("female".to_string()));
    assert_eq!(player.category("gender"), Some("female"));

    player.set_criterion("gender", CriterionValue::Category(" ".to_string()));
    assert_eq!(player.category("gender"), None);

    assert!(player.clear_criterion("rating"));
    assert!(!player.clear_criterion("rating"));
    assert_eq!(player.number("rating"), None);
}

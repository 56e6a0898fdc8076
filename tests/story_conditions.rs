use serde_json::json;
use wayfarer_bot::adventure::story::{
    Condition, Effect, apply, apply_in_place, evaluate, evaluate_values, parse_conditions, parse_effects,
};
use wayfarer_bot::database::models::PlayerRecord;

fn player() -> PlayerRecord {
    let mut record = PlayerRecord::new_player(7, "Ayla");
    record.gold = 250;
    record.hp = 40;
    record.add_item("wolf_fang", 2);
    record.story_flags.insert("met_hermit".into(), true);
    record
}

#[test]
fn conditions_parse_from_tagged_json() {
    let parsed = parse_conditions(&[
        json!({ "type": "has_flag", "flag": "met_hermit" }),
        json!({ "type": "has_item", "item": "wolf_fang" }),
        json!({ "type": "moon_phase", "phase": "full" }),
    ]);
    assert_eq!(
        parsed,
        vec![
            Condition::HasFlag { flag: "met_hermit".into() },
            Condition::HasItem { item: "wolf_fang".into(), count: 1 },
            Condition::Unknown,
        ]
    );
}

#[test]
fn conditions_are_anded() {
    let record = player();
    assert!(evaluate(&record, &[]));
    assert!(evaluate_values(
        &record,
        &[
            json!({ "type": "gold_at_least", "amount": 250 }),
            json!({ "type": "has_item", "item": "wolf_fang", "count": 2 }),
            json!({ "type": "missing_flag", "flag": "climbed_well" }),
        ]
    ));
    assert!(!evaluate_values(
        &record,
        &[
            json!({ "type": "gold_at_least", "amount": 250 }),
            json!({ "type": "has_item", "item": "wolf_fang", "count": 3 }),
        ]
    ));
}

#[test]
fn stat_and_distance_checks() {
    let mut record = player();
    record.distance = 1200;
    assert!(evaluate_values(&record, &[json!({ "type": "stat_below", "stat": "hp", "value": 50 })]));
    assert!(evaluate_values(&record, &[json!({ "type": "distance_at_least", "distance": 1000 })]));
    assert!(!evaluate_values(&record, &[json!({ "type": "distance_below", "distance": 1000 })]));
}

#[test]
fn unknown_and_malformed_conditions_pass() {
    let record = player();
    assert!(evaluate_values(&record, &[json!({ "type": "moon_phase" }), json!("garbage")]));
}

#[test]
fn effects_mutate_a_copy_and_report_the_patch() {
    let record = player();
    let effects = parse_effects(&[
        json!({ "type": "add_gold", "amount": -50 }),
        json!({ "type": "heal", "amount": 500 }),
        json!({ "type": "remove_item", "item": "wolf_fang" }),
        json!({ "type": "set_flag", "flag": "climbed_well" }),
    ]);
    let (patch, lines) = apply(&record, &effects);
    assert_eq!(record.gold, 250, "input record is untouched");
    assert_eq!(patch.gold, Some(200));
    assert_eq!(patch.hp, Some(record.max_hp));
    assert_eq!(patch.inventory.as_ref().and_then(|inv| inv.get("wolf_fang")).copied(), Some(1));
    assert!(patch.story_flags.as_ref().is_some_and(|f| f.contains_key("climbed_well")));
    assert_eq!(lines.len(), 3);
}

#[test]
fn gold_never_goes_negative() {
    let mut record = player();
    apply_in_place(&mut record, &[Effect::AddGold { amount: -1000 }]);
    assert_eq!(record.gold, 0);
}

#[test]
fn clearing_a_flag_removes_it() {
    let mut record = player();
    apply_in_place(&mut record, &[Effect::ClearFlag { flag: "met_hermit".into() }]);
    assert!(!record.flag("met_hermit"));
}

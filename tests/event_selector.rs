use std::collections::BTreeMap;
use wayfarer_bot::adventure::dice::ScriptedDice;
use wayfarer_bot::adventure::events::{EventKind, GameEvent, crossed, determine_event};

fn flags(ids: &[&str]) -> BTreeMap<String, bool> {
    ids.iter().map(|id| (id.to_string(), true)).collect()
}

fn pick(from: i64, to: i64, seen: &[&str], rolls: &[i32]) -> GameEvent {
    let mut dice = ScriptedDice::new(rolls.iter().copied());
    determine_event(to, from, 1, &flags(seen), &[], &mut dice)
}

#[test]
fn stepping_onto_a_thousand_is_a_boss() {
    let event = pick(999, 1000, &[], &[]);
    assert_eq!(
        event,
        GameEvent::Boss {
            stage: 1,
            threshold: 1000,
            pre_story_id: "boss_pre_1".into(),
            pre_story_seen: false,
        }
    );
}

#[test]
fn standing_on_a_milestone_does_not_retrigger_it() {
    assert!(!crossed(1000, 1000, 1000));
    let event = pick(1000, 1000, &[], &[99]);
    assert_eq!(event.kind(), EventKind::Nothing);
}

#[test]
fn boss_beats_every_other_milestone() {
    let event = pick(980, 1010, &[], &[]);
    assert_eq!(event.kind(), EventKind::Boss);
}

#[test]
fn seen_pre_story_is_reported() {
    match pick(1990, 2005, &["boss_pre_2"], &[]) {
        GameEvent::Boss { stage, pre_story_seen, .. } => {
            assert_eq!(stage, 2);
            assert!(pre_story_seen);
        }
        other => panic!("expected a boss, got {other:?}"),
    }
}

#[test]
fn odd_five_hundreds_are_shrines() {
    assert_eq!(pick(490, 510, &[], &[]), GameEvent::Special { distance: 500 });
    assert_ne!(pick(990, 1000, &[], &[]).kind(), EventKind::Special);
}

#[test]
fn story_fires_once() {
    assert_eq!(
        pick(240, 260, &[], &[]),
        GameEvent::Story {
            story_id: "story_250".into(),
            distance: 250
        }
    );
    let again = pick(240, 260, &["story_250"], &[99]);
    assert_eq!(again.kind(), EventKind::Nothing);
}

#[test]
fn later_loops_prefer_their_own_story_variant() {
    let mut dice = ScriptedDice::new([]);
    let event = determine_event(260, 240, 2, &BTreeMap::new(), &[], &mut dice);
    assert_eq!(
        event,
        GameEvent::Story {
            story_id: "story_250_loop2".into(),
            distance: 250
        }
    );
}

#[test]
fn choice_story_needs_a_one_in_a_thousand_roll() {
    let ids = vec!["choice_merchant".to_string(), "choice_old_well".to_string()];
    let mut dice = ScriptedDice::new([1, 1]);
    let event = determine_event(40, 20, 1, &BTreeMap::new(), &ids, &mut dice);
    assert_eq!(
        event,
        GameEvent::ChoiceStory {
            story_id: "choice_old_well".into()
        }
    );

    let mut dice = ScriptedDice::new([2, 99]);
    let event = determine_event(40, 20, 1, &BTreeMap::new(), &ids, &mut dice);
    assert_eq!(event.kind(), EventKind::Nothing);

    // Every choice already made: no die is spent on them.
    let mut dice = ScriptedDice::new([5]);
    let event = determine_event(40, 20, 1, &flags(&["choice_merchant", "choice_old_well"]), &ids, &mut dice);
    assert_eq!(event, GameEvent::Chest);
}

#[test]
fn random_table_bands() {
    assert_eq!(pick(20, 40, &[], &[0]), GameEvent::TrapChest);
    assert_eq!(pick(20, 40, &[], &[1]), GameEvent::Chest);
    assert_eq!(pick(20, 40, &[], &[9]), GameEvent::Chest);
    assert_eq!(pick(20, 40, &[], &[10]), GameEvent::Battle);
    assert_eq!(pick(20, 40, &[], &[39]), GameEvent::Battle);
    assert_eq!(pick(20, 40, &[], &[40]), GameEvent::Nothing);
}

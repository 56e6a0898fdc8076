//! Picks what happens after a move along the distance track.
//!
//! Milestones are detected with a crossing test (`previous < t <= current`) so a
//! multi-unit step never skips one. Tiers are checked in priority order and the
//! first match wins: boss, special, story, choice story, then one weighted draw.

use super::dice::Dice;
use crate::constants::{
    BATTLE_UPPER, BOSS_INTERVAL, CHEST_UPPER, CHOICE_STORY_DIE, MAX_BOSS_STAGE, SPECIAL_INTERVAL,
    STORY_INTERVAL, TRAP_CHEST_UPPER,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Boss,
    Special,
    Story,
    ChoiceStory,
    TrapChest,
    Chest,
    Battle,
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Boss {
        stage: u32,
        threshold: i64,
        pre_story_id: String,
        pre_story_seen: bool,
    },
    Special {
        distance: i64,
    },
    Story {
        story_id: String,
        distance: i64,
    },
    ChoiceStory {
        story_id: String,
    },
    TrapChest,
    Chest,
    Battle,
    Nothing,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::Boss { .. } => EventKind::Boss,
            GameEvent::Special { .. } => EventKind::Special,
            GameEvent::Story { .. } => EventKind::Story,
            GameEvent::ChoiceStory { .. } => EventKind::ChoiceStory,
            GameEvent::TrapChest => EventKind::TrapChest,
            GameEvent::Chest => EventKind::Chest,
            GameEvent::Battle => EventKind::Battle,
            GameEvent::Nothing => EventKind::Nothing,
        }
    }
}

pub fn is_flagged(flags: &BTreeMap<String, bool>, id: &str) -> bool {
    flags.get(id).copied().unwrap_or(false)
}

/// Boss milestones in ascending order: 1000, 2000, ... up to the last stage.
pub fn boss_thresholds() -> impl Iterator<Item = i64> {
    (1..=MAX_BOSS_STAGE).map(|stage| stage * BOSS_INTERVAL)
}

pub fn crossed(previous: i64, current: i64, threshold: i64) -> bool {
    previous < threshold && threshold <= current
}

/// Odd multiples of `interval` inside `(previous, current]`, ascending.
fn odd_multiples_crossed(previous: i64, current: i64, interval: i64) -> impl Iterator<Item = i64> {
    let first = previous.max(0) / interval + 1;
    let first_odd = if first % 2 == 0 { first + 1 } else { first };
    (first_odd..)
        .step_by(2)
        .map(move |n| n * interval)
        .take_while(move |t| *t <= current)
}

pub fn boss_pre_story_id(stage: u32) -> String {
    format!("boss_pre_{stage}")
}

/// Story id for a milestone, preferring an unseen loop-specific variant from loop 2 on.
pub fn story_id_for(distance: i64, loop_count: u32, flags: &BTreeMap<String, bool>) -> String {
    if loop_count >= 2 {
        let loop_id = format!("story_{distance}_loop{loop_count}");
        if !is_flagged(flags, &loop_id) {
            return loop_id;
        }
    }
    format!("story_{distance}")
}

/// Classifies the event for a move from `previous_distance` to `current_distance`.
pub fn determine_event(
    current_distance: i64,
    previous_distance: i64,
    loop_count: u32,
    story_flags: &BTreeMap<String, bool>,
    available_choice_story_ids: &[String],
    dice: &mut dyn Dice,
) -> GameEvent {
    if let Some(threshold) =
        boss_thresholds().find(|t| crossed(previous_distance, current_distance, *t))
    {
        let stage = (threshold / BOSS_INTERVAL) as u32;
        let pre_story_id = boss_pre_story_id(stage);
        let pre_story_seen = is_flagged(story_flags, &pre_story_id);
        return GameEvent::Boss {
            stage,
            threshold,
            pre_story_id,
            pre_story_seen,
        };
    }

    if let Some(distance) =
        odd_multiples_crossed(previous_distance, current_distance, SPECIAL_INTERVAL).next()
    {
        return GameEvent::Special { distance };
    }

    for distance in odd_multiples_crossed(previous_distance, current_distance, STORY_INTERVAL) {
        let story_id = story_id_for(distance, loop_count, story_flags);
        if !is_flagged(story_flags, &story_id) {
            return GameEvent::Story { story_id, distance };
        }
    }

    let unseen: Vec<&String> = available_choice_story_ids
        .iter()
        .filter(|id| !is_flagged(story_flags, id))
        .collect();
    if !unseen.is_empty() && dice.roll(1, CHOICE_STORY_DIE) == 1 {
        let pick = dice.roll(0, unseen.len() as i32 - 1) as usize;
        if let Some(id) = unseen.get(pick) {
            return GameEvent::ChoiceStory {
                story_id: (*id).clone(),
            };
        }
    }

    let roll = dice.roll(0, 99);
    if roll < TRAP_CHEST_UPPER {
        GameEvent::TrapChest
    } else if roll < CHEST_UPPER {
        GameEvent::Chest
    } else if roll < BATTLE_UPPER {
        GameEvent::Battle
    } else {
        GameEvent::Nothing
    }
}

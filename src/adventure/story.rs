//! Branch conditions and story effects.
//!
//! Story content stores both as JSON lists (`{"type": "has_flag", "flag": "..."}`).
//! Entries are decoded one at a time: anything unknown or malformed becomes
//! `Unknown`, which evaluates true and applies nothing.

use crate::database::models::{PlayerRecord, RecordPatch};
use serde::Deserialize;
use serde_json::Value;

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    HasFlag { flag: String },
    MissingFlag { flag: String },
    HasItem {
        item: String,
        #[serde(default = "one")]
        count: u32,
    },
    MissingItem { item: String },
    GoldAtLeast { amount: i64 },
    StatAtLeast { stat: String, value: i64 },
    StatBelow { stat: String, value: i64 },
    DistanceAtLeast { distance: i64 },
    DistanceBelow { distance: i64 },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    AddItem {
        item: String,
        #[serde(default = "one")]
        count: u32,
    },
    RemoveItem {
        item: String,
        #[serde(default = "one")]
        count: u32,
    },
    AddGold { amount: i64 },
    Heal { amount: i32 },
    SetFlag { flag: String },
    ClearFlag { flag: String },
    #[serde(other)]
    Unknown,
}

pub fn parse_conditions(values: &[Value]) -> Vec<Condition> {
    values
        .iter()
        .map(|v| match Condition::deserialize(v) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(target = "story", error = %e, entry = %v, "ignoring malformed condition");
                Condition::Unknown
            }
        })
        .collect()
}

pub fn parse_effects(values: &[Value]) -> Vec<Effect> {
    values
        .iter()
        .map(|v| match Effect::deserialize(v) {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(target = "story", error = %err, entry = %v, "ignoring malformed effect");
                Effect::Unknown
            }
        })
        .collect()
}

/// Numeric stat lookup by name; unknown stats read as `None`.
fn stat(record: &PlayerRecord, name: &str) -> Option<i64> {
    let v = match name.trim().to_ascii_lowercase().as_str() {
        "hp" => record.hp as i64,
        "max_hp" => record.max_hp as i64,
        "mp" => record.mp as i64,
        "max_mp" => record.max_mp as i64,
        "atk" | "attack" => record.atk as i64,
        "def" | "defense" => record.def as i64,
        "gold" => record.gold,
        "distance" => record.distance,
        "loop" | "loop_count" => record.loop_count as i64,
        "deaths" => record.deaths as i64,
        _ => return None,
    };
    Some(v)
}

fn holds(record: &PlayerRecord, condition: &Condition) -> bool {
    match condition {
        Condition::HasFlag { flag } => record.flag(flag),
        Condition::MissingFlag { flag } => !record.flag(flag),
        Condition::HasItem { item, count } => record.item_count(item) >= *count,
        Condition::MissingItem { item } => record.item_count(item) == 0,
        Condition::GoldAtLeast { amount } => record.gold >= *amount,
        Condition::StatAtLeast { stat: name, value } => stat(record, name).is_none_or(|v| v >= *value),
        Condition::StatBelow { stat: name, value } => stat(record, name).is_none_or(|v| v < *value),
        Condition::DistanceAtLeast { distance } => record.distance >= *distance,
        Condition::DistanceBelow { distance } => record.distance < *distance,
        Condition::Unknown => true,
    }
}

/// AND over every condition. An empty list is true.
pub fn evaluate(record: &PlayerRecord, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| holds(record, c))
}

/// Convenience for raw JSON condition lists straight from content.
pub fn evaluate_values(record: &PlayerRecord, conditions: &[Value]) -> bool {
    evaluate(record, &parse_conditions(conditions))
}

/// Applies effects to a copy of the record and returns the field deltas plus
/// one display line per effect that did something.
pub fn apply(record: &PlayerRecord, effects: &[Effect]) -> (RecordPatch, Vec<String>) {
    let mut next = record.clone();
    let lines = apply_in_place(&mut next, effects);
    (RecordPatch::diff(record, &next), lines)
}

/// Same as [`apply`] but mutates the record directly.
pub fn apply_in_place(record: &mut PlayerRecord, effects: &[Effect]) -> Vec<String> {
    let mut lines = Vec::new();
    for effect in effects {
        match effect {
            Effect::AddItem { item, count } => {
                record.add_item(item, *count);
                lines.push(format!("Obtained {item} x{count}"));
            }
            Effect::RemoveItem { item, count } => {
                let removed = record.remove_item(item, *count);
                if removed > 0 {
                    lines.push(format!("Lost {item} x{removed}"));
                }
            }
            Effect::AddGold { amount } => {
                record.gold = (record.gold + amount).max(0);
                lines.push(format!("Gold {amount:+}"));
            }
            Effect::Heal { amount } => {
                let before = record.hp;
                record.hp = (record.hp + (*amount).max(0)).min(record.max_hp);
                if record.hp > before {
                    lines.push(format!("Recovered {} HP", record.hp - before));
                }
            }
            Effect::SetFlag { flag } => {
                record.story_flags.insert(flag.clone(), true);
            }
            Effect::ClearFlag { flag } => {
                record.story_flags.remove(flag);
            }
            Effect::Unknown => {}
        }
    }
    lines
}

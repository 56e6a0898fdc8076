//! What a finished fight does to the player record.

use super::state::BattleSession;
use crate::adventure::content::ContentTables;
use crate::adventure::dice::Dice;
use crate::constants::{DEATH_GOLD_KEEP_PERCENT, RESTART_MAX_HP_BONUS};
use crate::database::models::PlayerRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewards {
    pub gold: i64,
    pub drops: Vec<(String, u32)>,
    pub lines: Vec<String>,
}

/// Gold, one roll per drop entry, and the encounter's progress hook.
pub fn apply_win(
    record: &mut PlayerRecord,
    session: &BattleSession,
    content: &ContentTables,
    dice: &mut dyn Dice,
) -> Rewards {
    let gold = session.gold.max(0).saturating_mul(session.policy.reward_multiplier);
    record.gold = record.gold.saturating_add(gold);
    let mut rewards = Rewards {
        gold,
        ..Default::default()
    };
    rewards.lines.push(format!("+{gold} gold"));
    for drop in &session.drops {
        if dice.chance(drop.chance) {
            record.add_item(&drop.item, drop.count);
            rewards
                .lines
                .push(format!("Found {} x{}", content.item(&drop.item).name, drop.count));
            rewards.drops.push((drop.item.clone(), drop.count));
        }
    }
    rewards.lines.extend(session.policy.on_win(record));
    rewards
}

/// Sends the player back to the start: distance reset, half the gold lost,
/// a little tougher for the next attempt.
pub fn apply_loss(record: &mut PlayerRecord) -> Vec<String> {
    let lost = record.gold - record.gold * DEATH_GOLD_KEEP_PERCENT / 100;
    record.gold -= lost;
    record.distance = 0;
    record.deaths += 1;
    record.max_hp += RESTART_MAX_HP_BONUS;
    record.hp = record.max_hp;
    record.mp = record.max_mp;
    record.stunned = false;
    vec![
        format!("Lost {lost} gold"),
        format!("Max HP +{RESTART_MAX_HP_BONUS}"),
        "Back to the trailhead".to_string(),
    ]
}

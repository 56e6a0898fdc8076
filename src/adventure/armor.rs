//! Defensive ability text (armor + shield) applied to an incoming hit.
//!
//! Evaluation order is fixed: evasion, illusion, generic reduction, physical
//! reduction, elemental resistances, floor, counter, reflect, thorns, regen,
//! guardian, revive, nullify.

use super::actor::{Attribute, is_low_hp};
use super::dice::Dice;
use regex_lite::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArmorEffectResult {
    pub damage: i32,
    pub evaded: bool,
    pub nullified: bool,
    pub counter_damage: i32,
    pub reflect_damage: i32,
    pub hp_regen: i32,
    pub revived: bool,
    pub effect_text: Vec<String>,
}

impl ArmorEffectResult {
    /// Damage sent back to the attacker by counter and reflect effects.
    pub fn retaliation(&self) -> i32 {
        self.counter_damage + self.reflect_damage
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArmorRule {
    Evasion,
    Illusion,
    Reduction,
    Physical,
    Resist,
    Counter,
    Reflect,
    Thorns,
    Regen,
    Guardian,
    Revive,
    Nullify,
}

const ARMOR_RULES: [ArmorRule; 12] = [
    ArmorRule::Evasion,
    ArmorRule::Illusion,
    ArmorRule::Reduction,
    ArmorRule::Physical,
    ArmorRule::Resist,
    ArmorRule::Counter,
    ArmorRule::Reflect,
    ArmorRule::Thorns,
    ArmorRule::Regen,
    ArmorRule::Guardian,
    ArmorRule::Revive,
    ArmorRule::Nullify,
];

impl ArmorRule {
    fn pattern(self) -> &'static str {
        match self {
            ArmorRule::Evasion => r"evasion\s+(\d+)\s*%",
            ArmorRule::Illusion => r"illusion\s+(\d+)\s*%",
            ArmorRule::Reduction => r"damage\s+reduction\s+(\d+)\s*%",
            ArmorRule::Physical => r"physical\s+reduction\s+(\d+)\s*%",
            ArmorRule::Resist => r"(fire|dark|water|all)\s+resist\s+(\d+)\s*%",
            ArmorRule::Counter => r"counter\s+(\d+)\s*%",
            ArmorRule::Reflect => r"reflect\s+(\d+)\s*%",
            ArmorRule::Thorns => r"thorns\s+(\d+)",
            ArmorRule::Regen => r"(last\s+stand\s+)?regen\s+(\d+)",
            ArmorRule::Guardian => r"guardian\s+(\d+)\s*%",
            ArmorRule::Revive => r"revive\s+(\d+)\s*%",
            ArmorRule::Nullify => r"nullify\s+(\d+)\s*%",
        }
    }
}

fn compiled() -> &'static [Option<Regex>] {
    static COMPILED: OnceLock<Vec<Option<Regex>>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        ARMOR_RULES
            .iter()
            .map(|rule| match Regex::new(rule.pattern()) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!(target = "armor", rule = ?rule, error = %e, "rule pattern rejected");
                    None
                }
            })
            .collect()
    })
}

fn regex(rule: ArmorRule) -> Option<&'static Regex> {
    compiled().get(rule as usize).and_then(|r| r.as_ref())
}

/// First number captured by `rule` in `text` (capture group `group`).
fn first_value(rule: ArmorRule, text: &str, group: usize) -> Option<i64> {
    regex(rule)?
        .captures(text)?
        .get(group)?
        .as_str()
        .parse::<i64>()
        .ok()
}

fn percent(rule: ArmorRule, text: &str) -> i32 {
    first_value(rule, text, 1).unwrap_or(0).clamp(0, 100) as i32
}

fn reduce(damage: i32, pct: i32) -> i32 {
    damage - (damage as i64 * pct as i64 / 100) as i32
}

fn resist_percent(text: &str, attribute: Attribute) -> i32 {
    if !attribute.is_elemental() {
        return 0;
    }
    let Some(re) = regex(ArmorRule::Resist) else {
        return 0;
    };
    let mut total = 0_i64;
    for caps in re.captures_iter(text) {
        let applies = match caps.get(1).map(|m| m.as_str()) {
            Some("fire") => attribute == Attribute::Fire,
            Some("dark") => attribute == Attribute::Dark,
            Some("water") => matches!(attribute, Attribute::Water | Attribute::Ice),
            Some("all") => true,
            _ => false,
        };
        if applies {
            total += caps
                .get(2)
                .and_then(|m| m.as_str().parse::<i64>().ok())
                .unwrap_or(0);
        }
    }
    total.clamp(0, 100) as i32
}

/// Applies the defender's armor text to an incoming hit.
///
/// `incoming_damage` is the post-mitigation hit, `attacker_damage` the
/// attacker's raw roll (what a reflect sends back).
pub fn apply_armor_effects(
    incoming_damage: i32,
    armor_ability_text: &str,
    defender_hp: i32,
    defender_max_hp: i32,
    attacker_damage: i32,
    attack_attribute: Attribute,
    dice: &mut dyn Dice,
) -> ArmorEffectResult {
    let incoming = incoming_damage.max(0);
    let mut out = ArmorEffectResult {
        damage: incoming,
        ..Default::default()
    };
    if super::ability::is_inert_text(armor_ability_text) {
        return out;
    }
    let text = armor_ability_text.to_lowercase();

    for (rule, label) in [(ArmorRule::Evasion, "evaded"), (ArmorRule::Illusion, "illusion dodge")] {
        if dice.chance(percent(rule, &text)) {
            out.damage = 0;
            out.evaded = true;
            out.effect_text.push(label.to_string());
            return out;
        }
    }

    let mut damage = incoming;
    let generic = percent(ArmorRule::Reduction, &text);
    if generic > 0 {
        damage = reduce(damage, generic);
        out.effect_text.push(format!("reduced {generic}%"));
    }
    if attack_attribute == Attribute::Physical {
        let physical = percent(ArmorRule::Physical, &text);
        if physical > 0 {
            damage = reduce(damage, physical);
            out.effect_text.push(format!("physical reduced {physical}%"));
        }
    }
    let resist = resist_percent(&text, attack_attribute);
    if resist > 0 {
        damage = reduce(damage, resist);
        out.effect_text
            .push(format!("{} resisted {resist}%", attack_attribute.as_str()));
    }
    damage = damage.max(0);

    let counter = percent(ArmorRule::Counter, &text);
    if counter > 0 {
        out.counter_damage = (incoming as i64 * counter as i64 / 100) as i32;
        if out.counter_damage > 0 {
            out.effect_text.push(format!("counter {}", out.counter_damage));
        }
    }
    if dice.chance(percent(ArmorRule::Reflect, &text)) {
        out.reflect_damage += attacker_damage.max(0);
        out.effect_text.push(format!("reflected {}", attacker_damage.max(0)));
    }
    if let Some(thorns) = first_value(ArmorRule::Thorns, &text, 1).filter(|n| *n > 0) {
        out.reflect_damage += thorns as i32;
        out.effect_text.push(format!("thorns {thorns}"));
    }

    let low = is_low_hp(defender_hp, defender_max_hp);
    if let Some(re) = regex(ArmorRule::Regen) {
        for caps in re.captures_iter(&text) {
            let amount = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<i32>().ok())
                .unwrap_or(0);
            let conditional = caps.get(1).is_some();
            if amount > 0 && (!conditional || low) {
                out.hp_regen += amount;
            }
        }
    }
    if out.hp_regen > 0 {
        out.effect_text.push(format!("regen {}", out.hp_regen));
    }
    if low {
        let guardian = percent(ArmorRule::Guardian, &text);
        if guardian > 0 {
            damage = reduce(damage, guardian);
            out.effect_text.push(format!("guardian {guardian}%"));
        }
    }

    if damage >= defender_hp && defender_hp > 0 && dice.chance(percent(ArmorRule::Revive, &text)) {
        damage = defender_hp - 1;
        out.revived = true;
        out.effect_text.push("survived at 1 HP".to_string());
    }
    if damage >= defender_hp && damage > 0 && dice.chance(percent(ArmorRule::Nullify, &text)) {
        damage = 0;
        out.nullified = true;
        out.effect_text.push("lethal hit nullified".to_string());
    }

    out.damage = damage;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_armor_patterns_compile() {
        assert!(compiled().iter().all(|r| r.is_some()));
        assert_eq!(compiled().len(), ARMOR_RULES.len());
    }

    #[test]
    fn resist_only_matches_its_element() {
        assert_eq!(resist_percent("fire resist 30%", Attribute::Fire), 30);
        assert_eq!(resist_percent("fire resist 30%", Attribute::Dark), 0);
        assert_eq!(resist_percent("water resist 20% all resist 10%", Attribute::Ice), 30);
        assert_eq!(resist_percent("all resist 10%", Attribute::Physical), 0);
    }
}

//! Offensive ability text → structured combat effects.
//!
//! Item descriptions are free text ("burn 30% / double attack / lifesteal 10%").
//! Each recognised phrase is a rule in `RULES`: a pattern plus an applier that
//! folds the match into a `Draft`. Rules run once, in table order, so damage
//! bonuses accumulate before multi-attack multiplies the running total. Anything
//! the table does not recognise is ignored.

use super::actor::{Family, TargetType};
use super::dice::Dice;
use crate::constants::{BURN_PERCENT, DEFAULT_CRIT_PERCENT, POISON_PERCENT};
use regex_lite::{Captures, Regex};
use std::sync::OnceLock;

/// Every field is always populated; callers apply the deltas themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityEffectResult {
    pub damage: i32,
    pub lifesteal: i32,
    pub burn: i32,
    pub poison: i32,
    pub heal: i32,
    pub instant_kill: bool,
    pub defense_ignore: bool,
    pub freeze: bool,
    pub paralyze: bool,
    pub enemy_flinch: bool,
    pub critical: bool,
    pub multi_attack: i32,
    pub mp_drain: i32,
    pub self_damage: i32,
    pub effect_text: Vec<String>,
}

impl AbilityEffectResult {
    pub fn identity(damage: i32) -> Self {
        Self {
            damage,
            lifesteal: 0,
            burn: 0,
            poison: 0,
            heal: 0,
            instant_kill: false,
            defense_ignore: false,
            freeze: false,
            paralyze: false,
            enemy_flinch: false,
            critical: false,
            multi_attack: 1,
            mp_drain: 0,
            self_damage: 0,
            effect_text: Vec::new(),
        }
    }

    /// Whether the target loses its next reaction.
    pub fn disables_target(&self) -> bool {
        self.freeze || self.paralyze || self.enemy_flinch
    }
}

/// True for text that carries no combat effect at all.
pub fn is_inert_text(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.eq_ignore_ascii_case("none") || t.eq_ignore_ascii_case("material")
}

struct Draft<'a> {
    base: i64,
    damage: i64,
    actor_hp: i64,
    target: TargetType,
    lifesteal_pct: i64,
    drain_flat: i64,
    drain_pct: i64,
    out: &'a mut AbilityEffectResult,
}

type Applier = fn(&Captures<'_>, &mut Draft<'_>, &mut dyn Dice);

struct Rule {
    name: &'static str,
    pattern: &'static str,
    apply: Applier,
}

fn num(caps: &Captures<'_>, idx: usize) -> i64 {
    caps.get(idx)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

fn pct(caps: &Captures<'_>, idx: usize) -> i32 {
    num(caps, idx).clamp(0, 100) as i32
}

fn has(caps: &Captures<'_>, idx: usize) -> bool {
    caps.get(idx).is_some()
}

fn dot_magnitude(base: i64, percent: i32) -> i32 {
    (base * percent as i64 / 100).max(1) as i32
}

fn proc_burn(d: &mut Draft<'_>) {
    d.out.burn = d.out.burn.max(dot_magnitude(d.base, BURN_PERCENT));
    d.out.effect_text.push(format!("burn {}", d.out.burn));
}

fn proc_poison(d: &mut Draft<'_>) {
    d.out.poison = d.out.poison.max(dot_magnitude(d.base, POISON_PERCENT));
    d.out.effect_text.push(format!("poison {}", d.out.poison));
}

fn proc_pierce(d: &mut Draft<'_>) {
    d.out.defense_ignore = true;
    d.out.effect_text.push("defense ignored".to_string());
}

fn set_multi(d: &mut Draft<'_>, hits: i32) {
    if hits > d.out.multi_attack {
        d.out.multi_attack = hits;
    }
}

const RULES: &[Rule] = &[
    Rule {
        name: "damage_bonus",
        pattern: r"(?:damage|attack)\s*\+\s*(\d+)\s*(%)?",
        apply: |c, d, _| {
            let n = num(c, 1);
            if has(c, 2) {
                d.damage = d.damage * (100 + n) / 100;
                d.out.effect_text.push(format!("damage +{n}%"));
            } else {
                d.damage += n;
                d.out.effect_text.push(format!("damage +{n}"));
            }
        },
    },
    Rule {
        name: "slayer",
        pattern: r"(undead|dragon|dark|boss)\s+slayer\s*\+?\s*(\d+)\s*%",
        apply: |c, d, _| {
            let hits = match c.get(1).map(|m| m.as_str()) {
                Some("undead") => d.target.family == Family::Undead,
                Some("dragon") => d.target.family == Family::Dragon,
                Some("dark") => d.target.family == Family::Dark,
                Some("boss") => d.target.boss,
                _ => false,
            };
            if hits {
                let n = num(c, 2);
                d.damage = d.damage * (100 + n) / 100;
                d.out.effect_text.push(format!(
                    "{} slayer +{n}%",
                    c.get(1).map(|m| m.as_str()).unwrap_or("")
                ));
            }
        },
    },
    Rule {
        name: "critical",
        pattern: r"critical\s+(\d+)\s*%(?:.*?critical\s+damage\s+(\d+)\s*%)?",
        apply: |c, d, dice| {
            if dice.chance(pct(c, 1)) {
                let multiplier = if has(c, 2) {
                    num(c, 2)
                } else {
                    DEFAULT_CRIT_PERCENT as i64
                };
                d.damage = d.damage * multiplier / 100;
                d.out.critical = true;
                d.out.effect_text.push(format!("critical x{}%", multiplier));
            }
        },
    },
    Rule {
        name: "random_effect",
        pattern: r"random\s+effect",
        apply: |_, d, dice| match dice.roll(1, 4) {
            1 => proc_burn(d),
            2 => proc_poison(d),
            3 => proc_pierce(d),
            _ => {
                set_multi(d, 2);
                d.out.effect_text.push("double attack".to_string());
            }
        },
    },
    Rule {
        name: "burn",
        pattern: r"burn\s+(\d+)\s*%",
        apply: |c, d, dice| {
            if dice.chance(pct(c, 1)) {
                proc_burn(d);
            }
        },
    },
    Rule {
        name: "poison",
        pattern: r"poison\s+(\d+)\s*%",
        apply: |c, d, dice| {
            if dice.chance(pct(c, 1)) {
                proc_poison(d);
            }
        },
    },
    Rule {
        name: "freeze",
        pattern: r"freeze\s+(\d+)\s*%",
        apply: |c, d, dice| {
            if dice.chance(pct(c, 1)) {
                d.out.freeze = true;
                d.out.effect_text.push("frozen".to_string());
            }
        },
    },
    Rule {
        name: "paralyze",
        pattern: r"paralyze\s+(\d+)\s*%",
        apply: |c, d, dice| {
            if dice.chance(pct(c, 1)) {
                d.out.paralyze = true;
                d.out.effect_text.push("paralyzed".to_string());
            }
        },
    },
    Rule {
        name: "flinch",
        pattern: r"flinch\s+(\d+)\s*%",
        apply: |c, d, dice| {
            if dice.chance(pct(c, 1)) {
                d.out.enemy_flinch = true;
                d.out.effect_text.push("flinched".to_string());
            }
        },
    },
    Rule {
        name: "instant_kill",
        pattern: r"instant\s*kill\s+(\d+)\s*%",
        apply: |c, d, dice| {
            // Bosses are immune; no roll is spent on them.
            if !d.target.boss && dice.chance(pct(c, 1)) {
                d.out.instant_kill = true;
                d.out.effect_text.push("instant kill".to_string());
            }
        },
    },
    Rule {
        name: "pierce",
        pattern: r"(?:pierce|ignore\s+defense)\s+(\d+)\s*%",
        apply: |c, d, dice| {
            if dice.chance(pct(c, 1)) {
                proc_pierce(d);
            }
        },
    },
    Rule {
        name: "multi_attack",
        pattern: r"(double|triple)\s+attack",
        apply: |c, d, _| {
            let hits = if c.get(1).map(|m| m.as_str()) == Some("triple") {
                3
            } else {
                2
            };
            set_multi(d, hits);
            d.out.effect_text.push(format!("{hits} hits"));
        },
    },
    Rule {
        name: "lifesteal",
        pattern: r"lifesteal\s+(\d+)\s*%",
        apply: |c, d, _| d.lifesteal_pct += num(c, 1),
    },
    Rule {
        name: "mp_drain",
        pattern: r"mp\s*drain\s+(\d+)\s*(%)?",
        apply: |c, d, _| {
            if has(c, 2) {
                d.drain_pct += num(c, 1);
            } else {
                d.drain_flat += num(c, 1);
            }
        },
    },
    Rule {
        name: "curse",
        pattern: r"curse\s+(\d+)\s*(%)?",
        apply: |c, d, _| {
            let n = num(c, 1);
            let amount = if has(c, 2) { d.actor_hp * n / 100 } else { n };
            d.out.self_damage += amount as i32;
            d.out.effect_text.push(format!("curse -{amount} HP"));
        },
    },
    Rule {
        name: "summon_heal",
        pattern: r"summon\s+heal\s+(\d+)",
        apply: |c, d, _| {
            let n = num(c, 1) as i32;
            d.out.heal += n;
            d.out.effect_text.push(format!("summon heals {n}"));
        },
    },
];

fn compiled_rules() -> &'static [(&'static Rule, Regex)] {
    static COMPILED: OnceLock<Vec<(&'static Rule, Regex)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        RULES
            .iter()
            .filter_map(|rule| match Regex::new(rule.pattern) {
                Ok(re) => Some((rule, re)),
                Err(e) => {
                    tracing::error!(target = "ability", rule = rule.name, error = %e, "rule pattern rejected");
                    None
                }
            })
            .collect()
    })
}

/// Parses `ability_text` and applies it to `base_damage`.
pub fn apply_ability_effects(
    base_damage: i32,
    ability_text: &str,
    actor_current_hp: i32,
    target: TargetType,
    dice: &mut dyn Dice,
) -> AbilityEffectResult {
    let mut out = AbilityEffectResult::identity(base_damage);
    if is_inert_text(ability_text) {
        return out;
    }
    let text = ability_text.to_lowercase();
    let mut draft = Draft {
        base: base_damage.max(0) as i64,
        damage: base_damage as i64,
        actor_hp: actor_current_hp.max(0) as i64,
        target,
        lifesteal_pct: 0,
        drain_flat: 0,
        drain_pct: 0,
        out: &mut out,
    };
    for (rule, re) in compiled_rules() {
        for caps in re.captures_iter(&text) {
            (rule.apply)(&caps, &mut draft, dice);
        }
    }

    let damage = (draft.damage.max(0) * draft.out.multi_attack as i64).min(i32::MAX as i64);
    let lifesteal = damage * draft.lifesteal_pct / 100;
    let mp_drain = draft.drain_flat + damage * draft.drain_pct / 100;
    if lifesteal > 0 {
        draft.out.effect_text.push(format!("lifesteal {lifesteal}"));
    }
    if mp_drain > 0 {
        draft.out.effect_text.push(format!("mp drain {mp_drain}"));
    }
    out.damage = damage as i32;
    out.lifesteal = lifesteal as i32;
    out.mp_drain = mp_drain as i32;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_pattern_compiles() {
        assert_eq!(compiled_rules().len(), RULES.len());
    }
}

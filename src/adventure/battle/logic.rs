//! One battle turn, resolved in memory.
//!
//! A turn runs in three stages: the player's action, the status phase (damage
//! over time on the enemy), then the enemy's reaction. The fight ends as soon as
//! either side drops, so a winning blow means the enemy never acts. Validation
//! happens before anything is touched: a rejected action leaves the session and
//! the player exactly as they were.

use super::state::{BattleSession, DamageOverTime, DotKind, Signal, Terminal};
use crate::adventure::ability::{AbilityEffectResult, apply_ability_effects};
use crate::adventure::actor::{Actor, TargetType};
use crate::adventure::armor::apply_armor_effects;
use crate::adventure::content::{ContentTables, SkillDef, SkillKind};
use crate::adventure::damage::{DamageConfig, HitRoll};
use crate::adventure::dice::Dice;
use crate::adventure::error::ActionError;
use crate::constants::{
    DEFEND_REDUCTION_MAX, DEFEND_REDUCTION_MIN, DOT_TURNS, FLEE_CHANCE, REVIVE_ITEM_HEAL_PERCENT,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Attack,
    Defend,
    UseSkill(String),
    Flee,
}

impl PlayerAction {
    pub fn label(&self) -> &str {
        match self {
            PlayerAction::Attack => "attack",
            PlayerAction::Defend => "defend",
            PlayerAction::UseSkill(id) => id.as_str(),
            PlayerAction::Flee => "flee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviveSource {
    Armor,
    Item,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// The player's action was swallowed by the stun from running out of MP.
    Stunned,
    PlayerStrike {
        skill: Option<String>,
        damage: i32,
        critical: bool,
        hits: i32,
        effects: Vec<String>,
    },
    InstantKill,
    PlayerHealed {
        amount: i32,
        source: &'static str,
    },
    SelfDamage {
        amount: i32,
    },
    ManaDrained {
        amount: i32,
    },
    Defending {
        reduction: i32,
    },
    FleeSucceeded,
    FleeFailed,
    StatusApplied {
        kind: DotKind,
        magnitude: i32,
    },
    StatusTick {
        kind: DotKind,
        damage: i32,
    },
    EnemyDisabled,
    EnemySkipped,
    EnemyStrike {
        damage: i32,
        evaded: bool,
        nullified: bool,
        effects: Vec<String>,
    },
    EnemyHealed {
        amount: i32,
    },
    PlayerManaLost {
        amount: i32,
    },
    Retaliation {
        damage: i32,
    },
    /// Counter, reflect or thorns from the enemy's armor.
    PlayerRetaliated {
        damage: i32,
    },
    Regenerated {
        amount: i32,
    },
    Revived {
        source: ReviveSource,
        hp: i32,
    },
    EnemyDefeated,
    PlayerDefeated,
}

fn with_effects(line: String, effects: &[String]) -> String {
    if effects.is_empty() {
        line
    } else {
        format!("{line} ({})", effects.join(", "))
    }
}

impl TurnEvent {
    /// One log line for the battle embed.
    pub fn describe(&self, player: &str, enemy: &str) -> String {
        match self {
            TurnEvent::Stunned => format!("💫 **{player}** is exhausted and cannot act!"),
            TurnEvent::PlayerStrike {
                skill,
                damage,
                critical,
                hits,
                effects,
            } => {
                let how = skill.as_deref().map_or("attacks".to_string(), |s| format!("uses **{s}** on"));
                let crit = if *critical { " Critical!" } else { "" };
                let multi = if *hits > 1 { format!(" ×{hits}") } else { String::new() };
                with_effects(
                    format!("⚔️ **{player}** {how} **{enemy}** for `{damage}` damage{multi}.{crit}"),
                    effects,
                )
            }
            TurnEvent::InstantKill => format!("☠️ **{enemy}** is slain outright!"),
            TurnEvent::PlayerHealed { amount, source } => {
                format!("💚 **{player}** recovers `{amount}` HP ({source}).")
            }
            TurnEvent::SelfDamage { amount } => format!("🩸 **{player}** suffers `{amount}` from a curse."),
            TurnEvent::ManaDrained { amount } => format!("🔷 **{player}** drains `{amount}` MP."),
            TurnEvent::Defending { reduction } => {
                format!("🛡️ **{player}** braces, cutting the next hit by {reduction}%.")
            }
            TurnEvent::FleeSucceeded => format!("🏃 **{player}** escapes!"),
            TurnEvent::FleeFailed => format!("🏃 **{player}** fails to escape!"),
            TurnEvent::StatusApplied { kind, magnitude } => {
                format!("🔥 **{enemy}** is afflicted with {} ({magnitude}/turn).", kind.as_str())
            }
            TurnEvent::StatusTick { kind, damage } => {
                format!("🔥 **{enemy}** takes `{damage}` {} damage.", kind.as_str())
            }
            TurnEvent::EnemyDisabled => format!("❄️ **{enemy}** is stopped in its tracks!"),
            TurnEvent::EnemySkipped => format!("❄️ **{enemy}** cannot move this turn."),
            TurnEvent::EnemyStrike {
                damage,
                evaded,
                nullified,
                effects,
            } => {
                let line = if *evaded {
                    format!("💨 **{player}** evades **{enemy}**'s attack!")
                } else if *nullified {
                    format!("✨ **{enemy}**'s lethal blow is nullified!")
                } else {
                    format!("💥 **{enemy}** hits **{player}** for `{damage}` damage.")
                };
                with_effects(line, effects)
            }
            TurnEvent::EnemyHealed { amount } => format!("🩹 **{enemy}** recovers `{amount}` HP."),
            TurnEvent::PlayerManaLost { amount } => format!("🔷 **{enemy}** drains `{amount}` MP from **{player}**."),
            TurnEvent::Retaliation { damage } => format!("↩️ **{enemy}** takes `{damage}` damage in return."),
            TurnEvent::PlayerRetaliated { damage } => {
                format!("↩️ **{player}** takes `{damage}` damage in return.")
            }
            TurnEvent::Regenerated { amount } => format!("💚 **{player}** regenerates `{amount}` HP."),
            TurnEvent::Revived { source, hp } => match source {
                ReviveSource::Armor => format!("✨ **{player}** clings on with `{hp}` HP!"),
                ReviveSource::Item => format!("🪶 A phoenix feather burns away. **{player}** rises with `{hp}` HP!"),
            },
            TurnEvent::EnemyDefeated => format!("🏆 **{enemy}** has been defeated!"),
            TurnEvent::PlayerDefeated => format!("☠️ **{player}** has fallen..."),
        }
    }
}

/// The player's side of a fight, rebuilt from the stored record every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub actor: Actor,
    pub skills: Vec<String>,
    pub revive_items: u32,
    pub stunned: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResolution {
    pub events: Vec<TurnEvent>,
    pub outcome: Option<Terminal>,
    pub revive_items_used: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub damage: &'a DamageConfig,
    pub content: &'a ContentTables,
}

fn validate<'c>(
    session: &BattleSession,
    player: &PlayerState,
    action: &PlayerAction,
    content: &'c ContentTables,
) -> Result<Option<&'c SkillDef>, ActionError> {
    if session.phase.is_terminal() {
        return Err(ActionError::SessionOver);
    }
    match action {
        PlayerAction::UseSkill(id) => {
            let skill = content
                .skill(id)
                .ok_or_else(|| ActionError::UnknownSkill(id.clone()))?;
            if !player.skills.iter().any(|s| s == id) {
                return Err(ActionError::SkillNotLearned(id.clone()));
            }
            if skill.mp_cost > player.actor.current_mp {
                return Err(ActionError::InsufficientMp {
                    need: skill.mp_cost,
                    have: player.actor.current_mp,
                });
            }
            Ok(Some(skill))
        }
        PlayerAction::Flee if !session.policy.flee_allowed => Err(ActionError::FleeForbidden),
        _ => Ok(None),
    }
}

/// Resolves one player action and whatever follows it.
pub fn resolve_turn(
    session: &mut BattleSession,
    player: &mut PlayerState,
    action: &PlayerAction,
    ctx: &TurnContext<'_>,
    dice: &mut dyn Dice,
) -> Result<TurnResolution, ActionError> {
    let skill = validate(session, player, action, ctx.content)?;
    let mut events = Vec::new();
    let mut revive_items_used = 0;
    let mut defend = 0;

    if player.stunned {
        player.stunned = false;
        events.push(TurnEvent::Stunned);
    } else {
        match (action, skill) {
            (PlayerAction::UseSkill(_), Some(skill)) => {
                player.actor.spend_mp(skill.mp_cost);
                if player.actor.current_mp == 0 && skill.mp_cost > 0 {
                    player.stunned = true;
                }
                match skill.kind {
                    SkillKind::Attack => {
                        player_strike(session, player, Some(&skill.name), skill.power.max(0), ctx, dice, &mut events)
                    }
                    SkillKind::Heal => {
                        let amount = player.actor.heal(skill.heal_amount);
                        events.push(TurnEvent::PlayerHealed {
                            amount,
                            source: "skill",
                        });
                    }
                }
            }
            (PlayerAction::Defend, _) => {
                defend = dice.roll(DEFEND_REDUCTION_MIN, DEFEND_REDUCTION_MAX);
                events.push(TurnEvent::Defending { reduction: defend });
            }
            (PlayerAction::Flee, _) => {
                if dice.chance(FLEE_CHANCE) {
                    events.push(TurnEvent::FleeSucceeded);
                    session.signal(Signal::Fled);
                    return Ok(finish(session, events, revive_items_used));
                }
                events.push(TurnEvent::FleeFailed);
            }
            _ => player_strike(session, player, None, 100, ctx, dice, &mut events),
        }
        if session.enemy.is_down() {
            if player.actor.is_down() {
                player.actor.current_hp = 1;
            }
            events.push(TurnEvent::EnemyDefeated);
            session.signal(Signal::EnemyDown);
            return Ok(finish(session, events, revive_items_used));
        }
        if player.actor.is_down() && !revive_with_item(player, &mut revive_items_used, &mut events) {
            events.push(TurnEvent::PlayerDefeated);
            session.signal(Signal::PlayerDown);
            return Ok(finish(session, events, revive_items_used));
        }
    }
    session.signal(Signal::ActionResolved);

    for kind in [DotKind::Burn, DotKind::Poison] {
        let slot = session.status.dot_mut(kind);
        let Some(dot) = slot.as_mut() else { continue };
        let magnitude = dot.magnitude;
        dot.turns_left -= 1;
        if dot.turns_left <= 0 {
            *slot = None;
        }
        let damage = session.enemy.take_damage(magnitude);
        events.push(TurnEvent::StatusTick { kind, damage });
        if session.enemy.is_down() {
            events.push(TurnEvent::EnemyDefeated);
            session.signal(Signal::EnemyDown);
            return Ok(finish(session, events, revive_items_used));
        }
    }

    if session.status.skip_turns > 0 {
        session.status.skip_turns -= 1;
        events.push(TurnEvent::EnemySkipped);
    } else {
        enemy_strike(session, player, defend, ctx, dice, &mut events);
    }

    if session.enemy.is_down() {
        // Retaliation finished the enemy off; the player survives the exchange.
        if player.actor.is_down() {
            player.actor.current_hp = 1;
        }
        events.push(TurnEvent::EnemyDefeated);
        session.signal(Signal::EnemyDown);
        return Ok(finish(session, events, revive_items_used));
    }
    if player.actor.is_down() && !revive_with_item(player, &mut revive_items_used, &mut events) {
        events.push(TurnEvent::PlayerDefeated);
        session.signal(Signal::PlayerDown);
        return Ok(finish(session, events, revive_items_used));
    }

    session.signal(Signal::ReactionDone);
    session.turn += 1;
    Ok(finish(session, events, revive_items_used))
}

/// Burns a revive item on a fallen player. False when none is left.
fn revive_with_item(player: &mut PlayerState, used: &mut u32, events: &mut Vec<TurnEvent>) -> bool {
    if player.revive_items == 0 {
        return false;
    }
    player.revive_items -= 1;
    *used += 1;
    let hp = (player.actor.max_hp * REVIVE_ITEM_HEAL_PERCENT / 100).max(1);
    player.actor.heal(hp);
    events.push(TurnEvent::Revived {
        source: ReviveSource::Item,
        hp: player.actor.current_hp,
    });
    true
}

fn finish(session: &BattleSession, events: Vec<TurnEvent>, revive_items_used: u32) -> TurnResolution {
    TurnResolution {
        events,
        outcome: session.phase.terminal(),
        revive_items_used,
    }
}

/// Raw and mitigated damage plus ability effects for one attack.
fn strike(
    attacker: &Actor,
    defender: &Actor,
    target: TargetType,
    power: i32,
    raw_reduction: i32,
    config: &DamageConfig,
    dice: &mut dyn Dice,
) -> (HitRoll, AbilityEffectResult, i32) {
    let mut hit = config.roll_hit(attacker.attack, defender.defense, dice);
    if raw_reduction > 0 {
        let raw = hit.raw - (hit.raw as i64 * raw_reduction as i64 / 100) as i32;
        hit = HitRoll {
            raw,
            mitigated: config.mitigate(raw, defender.defense),
        };
    }
    let base = (hit.mitigated as i64 * power as i64 / 100) as i32;
    let fx = apply_ability_effects(base, &attacker.ability_text, attacker.current_hp, target, dice);
    let mut damage = fx.damage;
    if fx.defense_ignore {
        damage += hit.raw - hit.mitigated;
    }
    (hit, fx, damage.max(0))
}

fn player_strike(
    session: &mut BattleSession,
    player: &mut PlayerState,
    skill: Option<&str>,
    power: i32,
    ctx: &TurnContext<'_>,
    dice: &mut dyn Dice,
    events: &mut Vec<TurnEvent>,
) {
    let target = session.enemy.target_type();
    let (hit, fx, damage) = strike(&player.actor, &session.enemy, target, power, 0, ctx.damage, dice);
    // An instant kill goes straight through the enemy's armor.
    let armor = (!fx.instant_kill).then(|| {
        apply_armor_effects(
            damage,
            &session.enemy.armor_text,
            session.enemy.current_hp,
            session.enemy.max_hp,
            hit.raw,
            player.actor.attribute,
            dice,
        )
    });
    let evaded = armor.as_ref().is_some_and(|a| a.evaded);
    let dealt = match &armor {
        Some(armor) => session.enemy.take_damage(armor.damage),
        None => session.enemy.take_damage(session.enemy.current_hp),
    };
    let mut effects = if evaded { Vec::new() } else { fx.effect_text.clone() };
    if let Some(armor) = &armor {
        effects.extend(armor.effect_text.iter().cloned());
    }
    events.push(TurnEvent::PlayerStrike {
        skill: skill.map(str::to_string),
        damage: dealt,
        critical: fx.critical && !evaded,
        hits: fx.multi_attack,
        effects,
    });
    if fx.instant_kill {
        events.push(TurnEvent::InstantKill);
    }
    if let Some(armor) = &armor {
        let retaliation = armor.retaliation();
        if retaliation > 0 {
            let damage = player.actor.take_damage(retaliation);
            events.push(TurnEvent::PlayerRetaliated { damage });
        }
        if armor.hp_regen > 0 && !session.enemy.is_down() {
            let amount = session.enemy.heal(armor.hp_regen);
            if amount > 0 {
                events.push(TurnEvent::EnemyHealed { amount });
            }
        }
    }
    if evaded || player.actor.is_down() {
        return;
    }

    if fx.lifesteal > 0 {
        let amount = player.actor.heal(fx.lifesteal);
        events.push(TurnEvent::PlayerHealed {
            amount,
            source: "lifesteal",
        });
    }
    if fx.heal > 0 {
        let amount = player.actor.heal(fx.heal);
        events.push(TurnEvent::PlayerHealed {
            amount,
            source: "summon",
        });
    }
    if fx.self_damage > 0 {
        // A curse hurts but never kills its bearer.
        let amount = fx.self_damage.min(player.actor.current_hp - 1).max(0);
        player.actor.take_damage(amount);
        events.push(TurnEvent::SelfDamage { amount });
    }
    if fx.mp_drain > 0 {
        let amount = session.enemy.drain_mp(fx.mp_drain);
        player.actor.restore_mp(amount);
        if amount > 0 {
            events.push(TurnEvent::ManaDrained { amount });
        }
    }
    if session.enemy.is_down() {
        return;
    }
    for (kind, magnitude) in [(DotKind::Burn, fx.burn), (DotKind::Poison, fx.poison)] {
        if magnitude > 0 {
            *session.status.dot_mut(kind) = Some(DamageOverTime {
                magnitude,
                turns_left: DOT_TURNS,
            });
            events.push(TurnEvent::StatusApplied { kind, magnitude });
        }
    }
    if fx.disables_target() {
        session.status.skip_turns = session.status.skip_turns.max(1);
        events.push(TurnEvent::EnemyDisabled);
    }
}

fn enemy_strike(
    session: &mut BattleSession,
    player: &mut PlayerState,
    defend: i32,
    ctx: &TurnContext<'_>,
    dice: &mut dyn Dice,
    events: &mut Vec<TurnEvent>,
) {
    let enemy = &mut session.enemy;
    let (hit, fx, damage) = strike(enemy, &player.actor, TargetType::normal(), 100, defend, ctx.damage, dice);
    // Players carry no status track; an enemy's burn or poison lands as extra damage.
    let mut incoming = damage + fx.burn + fx.poison;
    if fx.instant_kill {
        incoming = incoming.max(player.actor.current_hp);
    }
    let armor = apply_armor_effects(
        incoming,
        &player.actor.armor_text,
        player.actor.current_hp,
        player.actor.max_hp,
        hit.raw,
        enemy.attribute,
        dice,
    );
    let taken = player.actor.take_damage(armor.damage);
    let mut effects = if armor.evaded { Vec::new() } else { fx.effect_text.clone() };
    effects.extend(armor.effect_text.iter().cloned());
    events.push(TurnEvent::EnemyStrike {
        damage: taken,
        evaded: armor.evaded,
        nullified: armor.nullified,
        effects,
    });

    if !armor.evaded {
        let healed = enemy.heal(fx.lifesteal + fx.heal);
        if healed > 0 {
            events.push(TurnEvent::EnemyHealed { amount: healed });
        }
        if fx.self_damage > 0 {
            enemy.take_damage(fx.self_damage.min(enemy.current_hp - 1).max(0));
        }
        if fx.mp_drain > 0 {
            let amount = player.actor.drain_mp(fx.mp_drain);
            enemy.restore_mp(amount);
            if amount > 0 {
                events.push(TurnEvent::PlayerManaLost { amount });
            }
        }
    }
    if armor.revived {
        events.push(TurnEvent::Revived {
            source: ReviveSource::Armor,
            hp: player.actor.current_hp,
        });
    }
    let retaliation = armor.retaliation();
    if retaliation > 0 {
        let damage = enemy.take_damage(retaliation);
        events.push(TurnEvent::Retaliation { damage });
    }
    if armor.hp_regen > 0 && !player.actor.is_down() {
        let amount = player.actor.heal(armor.hp_regen);
        if amount > 0 {
            events.push(TurnEvent::Regenerated { amount });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_render_with_names() {
        let line = TurnEvent::PlayerStrike {
            skill: None,
            damage: 12,
            critical: true,
            hits: 2,
            effects: vec!["burn 3".into()],
        }
        .describe("Ayla", "Slime");
        assert!(line.contains("Ayla"));
        assert!(line.contains("`12`"));
        assert!(line.contains("Critical"));
        assert!(line.contains("burn 3"));
    }
}

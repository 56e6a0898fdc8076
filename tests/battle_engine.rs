use wayfarer_bot::adventure::ActionError;
use wayfarer_bot::adventure::actor::Actor;
use wayfarer_bot::adventure::battle::logic::ReviveSource;
use wayfarer_bot::adventure::battle::rewards::apply_win;
use wayfarer_bot::adventure::battle::state::DotKind;
use wayfarer_bot::adventure::battle::{
    BattlePhase, BattleSession, EncounterPolicy, PlayerAction, PlayerState, Terminal, TurnContext,
    TurnEvent, resolve_turn,
};
use wayfarer_bot::adventure::content::{ContentTables, DropEntry};
use wayfarer_bot::adventure::damage::DamageConfig;
use wayfarer_bot::adventure::dice::ScriptedDice;
use wayfarer_bot::database::models::PlayerRecord;

fn hero(attack: i32, hp: i32, mp: i32) -> PlayerState {
    PlayerState {
        actor: Actor {
            name: "Ayla".into(),
            current_hp: hp,
            max_hp: 50,
            current_mp: mp,
            max_mp: 30,
            attack,
            defense: 5,
            ..Default::default()
        },
        skills: vec!["power_strike".into(), "heal".into()],
        revive_items: 0,
        stunned: false,
    }
}

fn foe(hp: i32, attack: i32, defense: i32, policy: EncounterPolicy) -> BattleSession {
    let enemy = Actor {
        name: "Slime".into(),
        current_hp: hp,
        max_hp: hp.max(30),
        attack,
        defense,
        ..Default::default()
    };
    BattleSession::new(1, "slime", enemy, policy)
}

fn has_enemy_strike(events: &[TurnEvent]) -> bool {
    events.iter().any(|e| matches!(e, TurnEvent::EnemyStrike { .. }))
}

#[test]
fn killing_blow_wins_before_the_enemy_acts() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(10, 8, 5, EncounterPolicy::normal()).with_rewards(
        10,
        vec![DropEntry {
            item: "slime_gel".into(),
            chance: 50,
            count: 1,
        }],
    );
    let mut player = hero(20, 50, 30);
    let mut dice = ScriptedDice::new([0, 1]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, Some(Terminal::Win));
    assert_eq!(session.phase, BattlePhase::Terminal(Terminal::Win));
    assert!(!has_enemy_strike(&res.events));
    assert_eq!(res.events.last(), Some(&TurnEvent::EnemyDefeated));
    assert_eq!(player.actor.current_hp, 50);
    assert_eq!(dice.drawn(), 1);

    let mut record = PlayerRecord::new_player(1, "Ayla");
    let rewards = apply_win(&mut record, &session, &content, &mut dice);
    assert_eq!(dice.drawn(), 2, "exactly one roll per drop entry");
    assert_eq!(rewards.gold, 10);
    assert_eq!(rewards.drops, vec![("slime_gel".to_string(), 1)]);
    assert_eq!(record.item_count("slime_gel"), 1);
}

#[test]
fn finished_sessions_reject_more_actions() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(10, 8, 5, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    let mut dice = ScriptedDice::new([0]);
    resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");

    let err = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).unwrap_err();
    assert_eq!(err, ActionError::SessionOver);
}

#[test]
fn insufficient_mp_is_rejected_without_side_effects() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(30, 8, 2, EncounterPolicy::normal());
    let mut player = hero(20, 50, 5);
    let mut dice = ScriptedDice::new([]);

    let err = resolve_turn(
        &mut session,
        &mut player,
        &PlayerAction::UseSkill("power_strike".into()),
        &ctx,
        &mut dice,
    )
    .unwrap_err();
    assert_eq!(err, ActionError::InsufficientMp { need: 8, have: 5 });
    assert_eq!(player.actor.current_mp, 5);
    assert_eq!(session.turn, 1);
    assert_eq!(session.enemy.current_hp, 30);
    assert_eq!(dice.drawn(), 0);
}

#[test]
fn unknown_and_unlearned_skills_are_rejected() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(30, 8, 2, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    let mut dice = ScriptedDice::new([]);

    let err = resolve_turn(&mut session, &mut player, &PlayerAction::UseSkill("meteor".into()), &ctx, &mut dice)
        .unwrap_err();
    assert_eq!(err, ActionError::UnknownSkill("meteor".into()));
    let err = resolve_turn(&mut session, &mut player, &PlayerAction::UseSkill("whirlwind".into()), &ctx, &mut dice)
        .unwrap_err();
    assert_eq!(err, ActionError::SkillNotLearned("whirlwind".into()));
}

#[test]
fn emptying_mp_stuns_the_next_action() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 5, 0, EncounterPolicy::normal());
    let mut player = hero(20, 50, 8);
    let mut dice = ScriptedDice::new([0, 0]);

    let first = resolve_turn(
        &mut session,
        &mut player,
        &PlayerAction::UseSkill("power_strike".into()),
        &ctx,
        &mut dice,
    )
    .expect("valid turn");
    assert_eq!(first.outcome, None);
    // 20 raw, no defense, 150% power.
    assert_eq!(session.enemy.current_hp, 70);
    assert_eq!(player.actor.current_mp, 0);
    assert!(player.stunned);
    assert_eq!(session.turn, 2);
    assert_eq!(session.phase, BattlePhase::AwaitingAction);

    let second = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(second.events.first(), Some(&TurnEvent::Stunned));
    assert!(!second.events.iter().any(|e| matches!(e, TurnEvent::PlayerStrike { .. })));
    assert!(has_enemy_strike(&second.events));
    assert!(!player.stunned);
    assert_eq!(session.enemy.current_hp, 70);
}

#[test]
fn bosses_cannot_be_fled() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(120, 14, 4, EncounterPolicy::boss(1));
    let mut player = hero(20, 50, 30);
    let mut dice = ScriptedDice::new([1]);

    let err = resolve_turn(&mut session, &mut player, &PlayerAction::Flee, &ctx, &mut dice).unwrap_err();
    assert_eq!(err, ActionError::FleeForbidden);
    assert_eq!(dice.drawn(), 0);
}

#[test]
fn successful_flee_ends_the_fight() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(30, 8, 2, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    let mut dice = ScriptedDice::new([10]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Flee, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, Some(Terminal::Flee));
    assert!(!has_enemy_strike(&res.events));
}

#[test]
fn defending_softens_the_enemy_hit() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(30, 45, 2, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    // Defend rolls 60% off the raw hit: 45 raw becomes 18, minus 5 defense.
    let mut dice = ScriptedDice::new([60, 0]);

    resolve_turn(&mut session, &mut player, &PlayerAction::Defend, &ctx, &mut dice).expect("valid turn");
    assert_eq!(player.actor.current_hp, 50 - 13);
}

#[test]
fn phoenix_feather_saves_a_lethal_hit() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 50, 0, EncounterPolicy::normal());
    let mut player = hero(1, 1, 30);
    player.revive_items = 1;
    let mut dice = ScriptedDice::new([0, 0]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, None);
    assert_eq!(res.revive_items_used, 1);
    assert_eq!(player.actor.current_hp, 25);
    assert!(res.events.iter().any(|e| matches!(
        e,
        TurnEvent::Revived {
            source: ReviveSource::Item,
            hp: 25
        }
    )));
}

#[test]
fn lethal_hit_without_revival_loses() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 50, 0, EncounterPolicy::normal());
    let mut player = hero(1, 1, 30);
    let mut dice = ScriptedDice::new([0, 0]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, Some(Terminal::Lose));
    assert_eq!(res.events.last(), Some(&TurnEvent::PlayerDefeated));
}

#[test]
fn thorns_finishing_the_enemy_beats_a_simultaneous_death() {
    let content = ContentTables::builtin();
    let damage = DamageConfig::default();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(3, 50, 0, EncounterPolicy::normal());
    let mut player = hero(0, 1, 30);
    player.actor.armor_text = "thorns 5".into();
    let mut dice = ScriptedDice::new([-5, 0]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, Some(Terminal::Win));
    assert_eq!(player.actor.current_hp, 1);
}

fn ctx_parts() -> (ContentTables, DamageConfig) {
    (ContentTables::builtin(), DamageConfig::default())
}

#[test]
fn burn_ticks_on_the_enemy_after_the_hit() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 8, 0, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    player.actor.ability_text = "burn 100%".into();
    let mut dice = ScriptedDice::new([0, 1]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, None);
    assert!(res.events.contains(&TurnEvent::StatusApplied {
        kind: DotKind::Burn,
        magnitude: 4
    }));
    assert!(res.events.contains(&TurnEvent::StatusTick {
        kind: DotKind::Burn,
        damage: 4
    }));
    assert_eq!(session.enemy.current_hp, 100 - 20 - 4);
    assert!(has_enemy_strike(&res.events));
}

#[test]
fn burn_tick_can_finish_the_fight() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(23, 8, 0, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    player.actor.ability_text = "burn 100%".into();
    let mut dice = ScriptedDice::new([0, 1]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, Some(Terminal::Win));
    assert!(res.events.iter().any(|e| matches!(e, TurnEvent::StatusTick { kind: DotKind::Burn, .. })));
    assert!(!has_enemy_strike(&res.events));
    assert_eq!(player.actor.current_hp, 50);
}

#[test]
fn frozen_enemy_skips_one_reaction() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 8, 0, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    player.actor.ability_text = "freeze 50%".into();
    let mut dice = ScriptedDice::new([0, 1, 0, 90]);

    let first = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert!(first.events.contains(&TurnEvent::EnemyDisabled));
    assert!(first.events.contains(&TurnEvent::EnemySkipped));
    assert!(!has_enemy_strike(&first.events));
    assert_eq!(player.actor.current_hp, 50);

    let second = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert!(!second.events.contains(&TurnEvent::EnemySkipped));
    assert!(has_enemy_strike(&second.events));
}

#[test]
fn pierce_adds_back_what_defense_took() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 8, 5, EncounterPolicy::normal());
    let mut player = hero(20, 50, 30);
    player.actor.ability_text = "pierce 100%".into();
    let mut dice = ScriptedDice::new([0, 1]);

    resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    // Raw 20, mitigated 15, plus the 5 defense absorbed.
    assert_eq!(session.enemy.current_hp, 80);
}

#[test]
fn enemy_armor_softens_the_player_hit() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut plain = foe(100, 8, 0, EncounterPolicy::normal());
    let mut armored = foe(100, 8, 0, EncounterPolicy::normal());
    armored.enemy.armor_text = "damage reduction 50% / physical reduction 50%".into();

    let mut player = hero(20, 50, 30);
    resolve_turn(&mut plain, &mut player, &PlayerAction::Attack, &ctx, &mut ScriptedDice::new([0])).expect("valid turn");
    let mut player = hero(20, 50, 30);
    resolve_turn(&mut armored, &mut player, &PlayerAction::Attack, &ctx, &mut ScriptedDice::new([0])).expect("valid turn");

    assert_eq!(plain.enemy.current_hp, 80);
    assert_eq!(armored.enemy.current_hp, 95);
}

#[test]
fn enemy_counter_and_regen_answer_the_player() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 8, 0, EncounterPolicy::normal());
    session.enemy.armor_text = "counter 10% / regen 10".into();
    let mut player = hero(20, 50, 30);
    let mut dice = ScriptedDice::new([0]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert!(res.events.contains(&TurnEvent::PlayerRetaliated { damage: 2 }));
    assert!(res.events.contains(&TurnEvent::EnemyHealed { amount: 10 }));
    assert_eq!(session.enemy.current_hp, 90);
}

#[test]
fn evaded_player_hit_lands_nothing() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 8, 0, EncounterPolicy::normal());
    session.enemy.armor_text = "evasion 100%".into();
    let mut player = hero(20, 50, 30);
    player.actor.ability_text = "burn 100%".into();
    let mut dice = ScriptedDice::new([0, 1, 1]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(session.enemy.current_hp, 100);
    assert!(!res.events.iter().any(|e| matches!(e, TurnEvent::StatusApplied { .. })));
    assert!(session.status.burn.is_none());
}

#[test]
fn thorns_on_the_enemy_can_kill_the_attacker() {
    let (content, damage) = ctx_parts();
    let ctx = TurnContext { damage: &damage, content: &content };
    let mut session = foe(100, 8, 0, EncounterPolicy::normal());
    session.enemy.armor_text = "thorns 5".into();
    let mut player = hero(20, 1, 30);
    let mut dice = ScriptedDice::new([0]);

    let res = resolve_turn(&mut session, &mut player, &PlayerAction::Attack, &ctx, &mut dice).expect("valid turn");
    assert_eq!(res.outcome, Some(Terminal::Lose));
    assert!(!has_enemy_strike(&res.events));
    assert_eq!(res.events.last(), Some(&TurnEvent::PlayerDefeated));
}

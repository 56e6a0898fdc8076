use wayfarer_bot::adventure::ability::{AbilityEffectResult, apply_ability_effects};
use wayfarer_bot::adventure::actor::{Family, TargetType};
use wayfarer_bot::adventure::dice::ScriptedDice;

fn apply(base: i32, text: &str, rolls: &[i32]) -> (AbilityEffectResult, usize) {
    let mut dice = ScriptedDice::new(rolls.iter().copied());
    let out = apply_ability_effects(base, text, 50, TargetType::normal(), &mut dice);
    (out, dice.drawn())
}

#[test]
fn empty_text_is_identity() {
    for text in ["", "   ", "none", "Material"] {
        let (out, drawn) = apply(12, text, &[]);
        assert_eq!(out, AbilityEffectResult::identity(12));
        assert_eq!(drawn, 0);
    }
}

#[test]
fn flat_and_percent_damage_bonuses() {
    assert_eq!(apply(20, "damage +10%", &[]).0.damage, 22);
    assert_eq!(apply(20, "attack +5", &[]).0.damage, 25);
}

#[test]
fn guaranteed_critical_uses_the_default_multiplier() {
    let (out, drawn) = apply(20, "critical 100%", &[1]);
    assert!(out.critical);
    assert_eq!(out.damage, 30);
    assert_eq!(drawn, 1);
}

#[test]
fn failed_critical_leaves_damage_alone() {
    let (out, _) = apply(20, "critical 10%", &[50]);
    assert!(!out.critical);
    assert_eq!(out.damage, 20);
}

#[test]
fn multi_attack_scales_damage_and_lifesteal_follows() {
    let (out, _) = apply(20, "double attack / lifesteal 10%", &[]);
    assert_eq!(out.multi_attack, 2);
    assert_eq!(out.damage, 40);
    assert_eq!(out.lifesteal, 4);
}

#[test]
fn burn_magnitude_comes_from_the_base_hit() {
    let (out, _) = apply(20, "burn 100%", &[1]);
    assert_eq!(out.burn, 4);
    assert_eq!(out.poison, 0);
}

#[test]
fn slayer_only_applies_to_its_family() {
    let mut dice = ScriptedDice::new([]);
    let undead = TargetType::new(Family::Undead, false);
    let out = apply_ability_effects(20, "undead slayer +50%", 50, undead, &mut dice);
    assert_eq!(out.damage, 30);
    assert_eq!(apply(20, "undead slayer +50%", &[]).0.damage, 20);
}

#[test]
fn bosses_never_roll_for_instant_kill() {
    let mut dice = ScriptedDice::new([1]);
    let boss = TargetType::new(Family::Normal, true);
    let out = apply_ability_effects(20, "instant kill 100%", 50, boss, &mut dice);
    assert!(!out.instant_kill);
    assert_eq!(dice.drawn(), 0);

    let (out, _) = apply(20, "instant kill 100%", &[1]);
    assert!(out.instant_kill);
}

#[test]
fn curse_and_disables_are_reported() {
    let (out, _) = apply(20, "curse 5 / freeze 100%", &[1]);
    assert_eq!(out.self_damage, 5);
    assert!(out.freeze);
    assert!(out.disables_target());
}

#[test]
fn random_effect_picks_one_of_four() {
    let (burn, drawn) = apply(20, "random effect", &[1]);
    assert_eq!(burn.burn, 4);
    assert_eq!(drawn, 1);
    assert_eq!(apply(20, "random effect", &[2]).0.poison, 3);
    assert!(apply(20, "random effect", &[3]).0.defense_ignore);
    let (double, _) = apply(20, "random effect", &[4]);
    assert_eq!(double.multi_attack, 2);
    assert_eq!(double.damage, 40);
}

#[test]
fn mp_drain_flat_and_percent() {
    assert_eq!(apply(20, "mp drain 5", &[]).0.mp_drain, 5);
    // Percent drain reads the final damage, after multi-attack.
    let (out, _) = apply(20, "double attack / mp drain 10%", &[]);
    assert_eq!(out.mp_drain, 4);
}

#[test]
fn bonuses_land_before_multi_attack_whatever_the_text_order() {
    assert_eq!(apply(20, "damage +5 / double attack", &[]).0.damage, 50);
    assert_eq!(apply(20, "double attack / damage +5", &[]).0.damage, 50);
}

#[test]
fn pierce_marks_defense_ignored() {
    let (out, _) = apply(20, "pierce 100%", &[1]);
    assert!(out.defense_ignore);
    assert_eq!(out.damage, 20);
    assert!(!apply(20, "pierce 10%", &[90]).0.defense_ignore);
}

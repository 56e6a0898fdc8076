use wayfarer_bot::adventure::actor::Attribute;
use wayfarer_bot::adventure::armor::apply_armor_effects;
use wayfarer_bot::adventure::dice::ScriptedDice;

#[test]
fn guaranteed_evasion_blocks_everything() {
    let mut dice = ScriptedDice::new([1]);
    let out = apply_armor_effects(40, "evasion 100% / thorns 3", 100, 100, 45, Attribute::Physical, &mut dice);
    assert!(out.evaded);
    assert_eq!(out.damage, 0);
    assert_eq!(out.retaliation(), 0);
}

#[test]
fn empty_armor_passes_damage_through() {
    let mut dice = ScriptedDice::new([]);
    let out = apply_armor_effects(17, "", 100, 100, 20, Attribute::Fire, &mut dice);
    assert_eq!(out.damage, 17);
    assert!(!out.evaded && !out.revived && !out.nullified);
    assert_eq!(dice.drawn(), 0);
}

#[test]
fn reductions_stack_in_order() {
    let mut dice = ScriptedDice::new([]);
    let out = apply_armor_effects(40, "damage reduction 50%", 100, 100, 40, Attribute::Physical, &mut dice);
    assert_eq!(out.damage, 20);
}

#[test]
fn elemental_resist_ignores_physical_hits() {
    let mut dice = ScriptedDice::new([]);
    let fire = apply_armor_effects(20, "fire resist 50%", 100, 100, 20, Attribute::Fire, &mut dice);
    assert_eq!(fire.damage, 10);
    let physical = apply_armor_effects(20, "fire resist 50%", 100, 100, 20, Attribute::Physical, &mut dice);
    assert_eq!(physical.damage, 20);
}

#[test]
fn counter_and_thorns_retaliate() {
    let mut dice = ScriptedDice::new([]);
    let out = apply_armor_effects(30, "thorns 3 / counter 10%", 100, 100, 35, Attribute::Physical, &mut dice);
    assert_eq!(out.counter_damage, 3);
    assert_eq!(out.reflect_damage, 3);
    assert_eq!(out.retaliation(), 6);
}

#[test]
fn conditional_regen_needs_low_health() {
    let mut dice = ScriptedDice::new([]);
    let low = apply_armor_effects(1, "regen 3 / last stand regen 6", 10, 100, 1, Attribute::Physical, &mut dice);
    assert_eq!(low.hp_regen, 9);
    let high = apply_armor_effects(1, "regen 3 / last stand regen 6", 90, 100, 1, Attribute::Physical, &mut dice);
    assert_eq!(high.hp_regen, 3);
}

#[test]
fn revive_leaves_one_hp_and_skips_nullify() {
    let mut dice = ScriptedDice::new([1]);
    let out = apply_armor_effects(50, "revive 100% / nullify 100%", 10, 100, 50, Attribute::Physical, &mut dice);
    assert!(out.revived);
    assert!(!out.nullified);
    assert_eq!(out.damage, 9);
    assert_eq!(dice.drawn(), 1);
}

#[test]
fn nullify_cancels_a_lethal_hit() {
    let mut dice = ScriptedDice::new([1]);
    let out = apply_armor_effects(50, "nullify 100%", 10, 100, 50, Attribute::Physical, &mut dice);
    assert!(out.nullified);
    assert_eq!(out.damage, 0);
}

#[test]
fn illusion_dodges_like_evasion() {
    let mut dice = ScriptedDice::new([1]);
    let out = apply_armor_effects(40, "illusion 100%", 100, 100, 45, Attribute::Physical, &mut dice);
    assert!(out.evaded);
    assert_eq!(out.damage, 0);
    assert_eq!(out.effect_text, vec!["illusion dodge".to_string()]);
    assert_eq!(dice.drawn(), 1);
}

#[test]
fn reflect_returns_the_raw_hit_on_a_successful_roll() {
    let mut dice = ScriptedDice::new([1]);
    let out = apply_armor_effects(30, "reflect 50%", 100, 100, 35, Attribute::Physical, &mut dice);
    assert_eq!(out.damage, 30);
    assert_eq!(out.reflect_damage, 35);

    let mut dice = ScriptedDice::new([80]);
    let out = apply_armor_effects(30, "reflect 50%", 100, 100, 35, Attribute::Physical, &mut dice);
    assert_eq!(out.reflect_damage, 0);
}

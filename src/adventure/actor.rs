//! Combatant value type shared by players and enemies.

use super::content::ContentTables;
use crate::constants::UPGRADE_STAT_STEP;
use crate::database::models::{EquipSlot, PlayerRecord};
use serde::{Deserialize, Serialize};

/// Elemental tag carried by an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Attribute {
    #[default]
    Physical,
    Fire,
    Water,
    Ice,
    Dark,
    Light,
    Thunder,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Physical => "physical",
            Attribute::Fire => "fire",
            Attribute::Water => "water",
            Attribute::Ice => "ice",
            Attribute::Dark => "dark",
            Attribute::Light => "light",
            Attribute::Thunder => "thunder",
        }
    }

    pub fn is_elemental(&self) -> bool {
        !matches!(self, Attribute::Physical)
    }
}

impl From<String> for Attribute {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire" => Attribute::Fire,
            "water" => Attribute::Water,
            "ice" => Attribute::Ice,
            "dark" => Attribute::Dark,
            "light" => Attribute::Light,
            "thunder" => Attribute::Thunder,
            _ => Attribute::Physical,
        }
    }
}

impl From<Attribute> for String {
    fn from(a: Attribute) -> Self {
        a.as_str().to_string()
    }
}

/// Creature family, used by slayer effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Family {
    #[default]
    Normal,
    Undead,
    Dragon,
    Dark,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Normal => "normal",
            Family::Undead => "undead",
            Family::Dragon => "dragon",
            Family::Dark => "dark",
        }
    }
}

impl From<String> for Family {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "undead" => Family::Undead,
            "dragon" => Family::Dragon,
            "dark" => Family::Dark,
            _ => Family::Normal,
        }
    }
}

impl From<Family> for String {
    fn from(f: Family) -> Self {
        f.as_str().to_string()
    }
}

/// What an ability is aimed at: the family tag plus whether the target is a boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TargetType {
    pub family: Family,
    pub boss: bool,
}

impl TargetType {
    pub fn normal() -> Self {
        Self::default()
    }

    pub fn new(family: Family, boss: bool) -> Self {
        Self { family, boss }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Actor {
    pub name: String,
    pub current_hp: i32,
    pub max_hp: i32,
    pub current_mp: i32,
    pub max_mp: i32,
    pub attack: i32,
    pub defense: i32,
    pub attribute: Attribute,
    pub family: Family,
    /// Offensive ability text (weapon for players).
    pub ability_text: String,
    /// Defensive ability text (armor and shield combined for players).
    pub armor_text: String,
    pub is_boss: bool,
}

impl Actor {
    /// Lowers HP, clamped at zero. Returns the HP actually removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.current_hp;
        self.current_hp = (self.current_hp - amount.max(0)).clamp(0, self.max_hp.max(0));
        before - self.current_hp
    }

    /// Raises HP, clamped at `max_hp`. Returns the HP actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current_hp;
        self.current_hp = (self.current_hp + amount.max(0)).clamp(0, self.max_hp.max(0));
        self.current_hp - before
    }

    /// Spends MP if enough is available; otherwise leaves it untouched.
    pub fn spend_mp(&mut self, amount: i32) -> bool {
        if amount > self.current_mp {
            return false;
        }
        self.current_mp = (self.current_mp - amount.max(0)).clamp(0, self.max_mp.max(0));
        true
    }

    /// Removes up to `amount` MP and returns how much was removed.
    pub fn drain_mp(&mut self, amount: i32) -> i32 {
        let before = self.current_mp;
        self.current_mp = (self.current_mp - amount.max(0)).max(0);
        before - self.current_mp
    }

    pub fn restore_mp(&mut self, amount: i32) -> i32 {
        let before = self.current_mp;
        self.current_mp = (self.current_mp + amount.max(0)).clamp(0, self.max_mp.max(0));
        self.current_mp - before
    }

    pub fn is_down(&self) -> bool {
        self.current_hp <= 0
    }

    pub fn target_type(&self) -> TargetType {
        TargetType::new(self.family, self.is_boss)
    }
}

impl Actor {
    /// Player combatant with equipment and upgrades folded into attack and defense.
    pub fn from_record(record: &PlayerRecord, content: &ContentTables) -> Self {
        let equipped = |slot: EquipSlot| record.equipment.get(slot).map(|id| content.item(id));
        let upgrade = |slot: EquipSlot| record.upgrade_level(slot) * UPGRADE_STAT_STEP;

        let weapon = equipped(EquipSlot::Weapon);
        let attack = record.atk
            + weapon.map_or(0, |w| w.attack)
            + if weapon.is_some() { upgrade(EquipSlot::Weapon) } else { 0 };

        let mut defense = record.def;
        let mut armor_text = Vec::new();
        for slot in [EquipSlot::Armor, EquipSlot::Shield] {
            if let Some(item) = equipped(slot) {
                defense += item.defense + upgrade(slot);
                if !super::ability::is_inert_text(&item.ability_text) {
                    armor_text.push(item.ability_text.as_str());
                }
            }
        }

        Actor {
            name: record.name.clone(),
            current_hp: record.hp,
            max_hp: record.max_hp,
            current_mp: record.mp,
            max_mp: record.max_mp,
            attack: attack.max(0),
            defense: defense.max(0),
            attribute: Attribute::Physical,
            family: Family::Normal,
            ability_text: weapon.map(|w| w.ability_text.clone()).unwrap_or_default(),
            armor_text: armor_text.join(" / "),
            is_boss: false,
        }
    }
}

/// True when `hp` is at or below the low-health threshold of `max_hp`.
pub fn is_low_hp(hp: i32, max_hp: i32) -> bool {
    max_hp > 0 && (hp as i64) * 100 <= (max_hp as i64) * crate::constants::LOW_HP_PERCENT as i64
}

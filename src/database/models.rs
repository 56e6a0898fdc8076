//! The persisted player document and the partial-update patch written back to the store.

use crate::constants::{
    START_ATK, START_DEF, START_GOLD, START_HP, START_MP, STARTER_ARMOR, STARTER_SKILLS,
    STARTER_WEAPON,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Shield,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 3] = [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Shield];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Armor => "armor",
            EquipSlot::Shield => "shield",
        }
    }
}

impl fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipSlot {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weapon" => Ok(EquipSlot::Weapon),
            "armor" => Ok(EquipSlot::Armor),
            "shield" => Ok(EquipSlot::Shield),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    pub weapon: Option<String>,
    pub armor: Option<String>,
    pub shield: Option<String>,
}

impl Equipment {
    pub fn get(&self, slot: EquipSlot) -> Option<&str> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_deref(),
            EquipSlot::Armor => self.armor.as_deref(),
            EquipSlot::Shield => self.shield.as_deref(),
        }
    }

    pub fn set(&mut self, slot: EquipSlot, item_id: Option<String>) -> Option<String> {
        let target = match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Shield => &mut self.shield,
        };
        std::mem::replace(target, item_id)
    }
}

/// One player's persisted state. Every field defaults, so documents written by
/// older versions of the bot still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
    pub user_id: u64,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub mp: i32,
    pub max_mp: i32,
    pub atk: i32,
    pub def: i32,
    pub gold: i64,
    pub distance: i64,
    pub loop_count: u32,
    pub deaths: u32,
    pub inventory: BTreeMap<String, u32>,
    pub equipment: Equipment,
    pub upgrades: BTreeMap<EquipSlot, i32>,
    pub skills: Vec<String>,
    pub story_flags: BTreeMap<String, bool>,
    pub bosses_defeated: BTreeSet<u32>,
    /// Set when a skill drained MP to exactly zero; consumes the next battle action.
    pub stunned: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for PlayerRecord {
    fn default() -> Self {
        Self {
            user_id: 0,
            name: String::new(),
            hp: START_HP,
            max_hp: START_HP,
            mp: START_MP,
            max_mp: START_MP,
            atk: START_ATK,
            def: START_DEF,
            gold: START_GOLD,
            distance: 0,
            loop_count: 1,
            deaths: 0,
            inventory: BTreeMap::new(),
            equipment: Equipment::default(),
            upgrades: BTreeMap::new(),
            skills: Vec::new(),
            story_flags: BTreeMap::new(),
            bosses_defeated: BTreeSet::new(),
            stunned: false,
            updated_at: None,
        }
    }
}

impl PlayerRecord {
    /// A fresh adventurer with starter skills and gear.
    pub fn new_player(user_id: u64, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            skills: STARTER_SKILLS.iter().map(|s| s.to_string()).collect(),
            equipment: Equipment {
                weapon: Some(STARTER_WEAPON.to_string()),
                armor: Some(STARTER_ARMOR.to_string()),
                shield: None,
            },
            updated_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    pub fn item_count(&self, item_id: &str) -> u32 {
        self.inventory.get(item_id).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, item_id: &str, count: u32) {
        if count == 0 {
            return;
        }
        *self.inventory.entry(item_id.to_string()).or_insert(0) += count;
    }

    /// Removes up to `count` copies; returns how many were actually removed.
    pub fn remove_item(&mut self, item_id: &str, count: u32) -> u32 {
        let Some(held) = self.inventory.get_mut(item_id) else {
            return 0;
        };
        let removed = (*held).min(count);
        *held -= removed;
        if *held == 0 {
            self.inventory.remove(item_id);
        }
        removed
    }

    pub fn flag(&self, id: &str) -> bool {
        self.story_flags.get(id).copied().unwrap_or(false)
    }

    pub fn upgrade_level(&self, slot: EquipSlot) -> i32 {
        self.upgrades.get(&slot).copied().unwrap_or(0)
    }
}

/// Partial update: only `Some` fields are written. Values are absolute, so
/// re-sending the same patch leaves the record unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atk: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub def: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deaths: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<BTreeMap<String, u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipment: Option<Equipment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrades: Option<BTreeMap<EquipSlot, i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_flags: Option<BTreeMap<String, bool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bosses_defeated: Option<BTreeSet<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stunned: Option<bool>,
}

macro_rules! diff_fields {
    ($patch:ident, $before:ident, $after:ident, $($field:ident),+ $(,)?) => {
        $(
            if $before.$field != $after.$field {
                $patch.$field = Some($after.$field.clone());
            }
        )+
    };
}

macro_rules! apply_fields {
    ($patch:ident, $record:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = &$patch.$field {
                $record.$field = value.clone();
            }
        )+
    };
}

impl RecordPatch {
    /// Patch carrying every field that differs between `before` and `after`.
    pub fn diff(before: &PlayerRecord, after: &PlayerRecord) -> Self {
        let mut patch = RecordPatch::default();
        diff_fields!(
            patch, before, after, name, hp, max_hp, mp, max_mp, atk, def, gold, distance,
            loop_count, deaths, inventory, equipment, upgrades, skills, story_flags,
            bosses_defeated, stunned,
        );
        patch
    }

    pub fn is_empty(&self) -> bool {
        *self == RecordPatch::default()
    }

    pub fn apply_to(&self, record: &mut PlayerRecord) {
        let patch = self;
        apply_fields!(
            patch, record, name, hp, max_hp, mp, max_mp, atk, def, gold, distance, loop_count,
            deaths, inventory, equipment, upgrades, skills, story_flags, bosses_defeated, stunned,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_then_apply_reproduces_after() {
        let before = PlayerRecord::new_player(7, "Ayla");
        let mut after = before.clone();
        after.gold += 40;
        after.add_item("potion", 2);
        after.story_flags.insert("story_250".into(), true);
        let patch = RecordPatch::diff(&before, &after);
        assert!(patch.hp.is_none());
        let mut replay = before.clone();
        patch.apply_to(&mut replay);
        patch.apply_to(&mut replay);
        assert_eq!(replay.gold, after.gold);
        assert_eq!(replay.inventory, after.inventory);
        assert!(replay.flag("story_250"));
    }

    #[test]
    fn old_documents_fill_defaults() {
        let record: PlayerRecord =
            serde_json::from_str(r#"{"user_id": 3, "gold": 12, "legacy_field": true}"#)
                .expect("tolerant decode");
        assert_eq!(record.gold, 12);
        assert_eq!(record.max_hp, START_HP);
        assert!(record.inventory.is_empty());
    }
}

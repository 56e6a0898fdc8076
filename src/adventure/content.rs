//! Read-only content tables: items, enemies, zones, bosses, skills and stories.
//!
//! The bot ships a built-in set (the JSON files under `content/`). A deployment
//! can overlay any of them by dropping a file with the same name into
//! `CONTENT_DIR`. Lookups never fail: unknown ids fall back to a default entry.

use super::actor::{Actor, Attribute, Family};
use super::dice::Dice;
use crate::constants::ZONE_LENGTH;
use anyhow::Context as _;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

const BUILTIN_ITEMS: &str = include_str!("../../content/items.json");
const BUILTIN_ENEMIES: &str = include_str!("../../content/enemies.json");
const BUILTIN_ZONES: &str = include_str!("../../content/zones.json");
const BUILTIN_BOSSES: &str = include_str!("../../content/bosses.json");
const BUILTIN_SKILLS: &str = include_str!("../../content/skills.json");
const BUILTIN_STORIES: &str = include_str!("../../content/stories.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon,
    Armor,
    Shield,
    Consumable,
    #[default]
    Material,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub ability_text: String,
    #[serde(default)]
    pub description: String,
    /// Shop price; `None` means the shop does not sell it.
    #[serde(default)]
    pub price: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DropEntry {
    pub item: String,
    /// Percent chance in `[0, 100]`.
    pub chance: i32,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnemyTemplate {
    pub id: String,
    pub name: String,
    pub hp: i32,
    #[serde(default)]
    pub mp: i32,
    pub attack: i32,
    pub defense: i32,
    #[serde(default)]
    pub attribute: Attribute,
    #[serde(default)]
    pub family: Family,
    #[serde(default)]
    pub ability_text: String,
    #[serde(default)]
    pub armor_text: String,
    #[serde(default)]
    pub gold: i64,
    #[serde(default)]
    pub drops: Vec<DropEntry>,
}

impl EnemyTemplate {
    /// Builds the combat actor; later loops hit harder (+50% stats per loop).
    pub fn to_actor(&self, loop_count: u32, is_boss: bool) -> Actor {
        let scale = |v: i32| -> i32 {
            let extra = loop_count.saturating_sub(1) as i64;
            (v as i64 + v as i64 * extra / 2).min(i32::MAX as i64) as i32
        };
        let hp = scale(self.hp.max(1));
        let mp = scale(self.mp.max(0));
        Actor {
            name: self.name.clone(),
            current_hp: hp,
            max_hp: hp,
            current_mp: mp,
            max_mp: mp,
            attack: scale(self.attack.max(0)),
            defense: scale(self.defense.max(0)),
            attribute: self.attribute,
            family: self.family,
            ability_text: self.ability_text.clone(),
            armor_text: self.armor_text.clone(),
            is_boss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WeightedEnemy {
    pub enemy: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneTable {
    pub name: String,
    /// Inclusive lower bound of the distance range.
    pub from: i64,
    /// Exclusive upper bound.
    pub to: i64,
    pub enemies: Vec<WeightedEnemy>,
    #[serde(default)]
    pub loot: Vec<DropEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BossTemplate {
    pub stage: u32,
    #[serde(default)]
    pub final_boss: bool,
    #[serde(flatten)]
    pub enemy: EnemyTemplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Attack,
    Heal,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub kind: SkillKind,
    pub mp_cost: i32,
    /// Percent multiplier on mitigated damage for attack skills.
    #[serde(default)]
    pub power: i32,
    #[serde(default)]
    pub heal_amount: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoryChoice {
    pub label: String,
    #[serde(default)]
    pub conditions: Vec<Value>,
    #[serde(default)]
    pub effects: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoryNode {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub conditions: Vec<Value>,
    #[serde(default)]
    pub effects: Vec<Value>,
    #[serde(default)]
    pub choices: Vec<StoryChoice>,
}

impl StoryNode {
    pub fn is_choice(&self) -> bool {
        !self.choices.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentTables {
    pub items: HashMap<String, ItemDef>,
    pub enemies: HashMap<String, EnemyTemplate>,
    pub zones: Vec<ZoneTable>,
    pub bosses: BTreeMap<u32, BossTemplate>,
    pub skills: HashMap<String, SkillDef>,
    pub stories: HashMap<String, StoryNode>,
}

fn parse_table<T: DeserializeOwned>(name: &str, raw: &str) -> Option<Vec<T>> {
    match serde_json::from_str::<Vec<T>>(raw) {
        Ok(rows) => Some(rows),
        Err(e) => {
            warn!(target = "content", table = name, error = %e, "content table rejected");
            None
        }
    }
}

fn default_item() -> &'static ItemDef {
    static ITEM: OnceLock<ItemDef> = OnceLock::new();
    ITEM.get_or_init(|| ItemDef {
        id: "unknown".to_string(),
        name: "Unknown Item".to_string(),
        kind: ItemKind::Material,
        attack: 0,
        defense: 0,
        ability_text: String::new(),
        description: String::new(),
        price: None,
    })
}

fn default_enemy() -> &'static EnemyTemplate {
    static ENEMY: OnceLock<EnemyTemplate> = OnceLock::new();
    ENEMY.get_or_init(|| EnemyTemplate {
        id: "slime".to_string(),
        name: "Slime".to_string(),
        hp: 30,
        mp: 0,
        attack: 8,
        defense: 2,
        attribute: Attribute::Physical,
        family: Family::Normal,
        ability_text: String::new(),
        armor_text: String::new(),
        gold: 10,
        drops: Vec::new(),
    })
}

impl ContentTables {
    /// Tables compiled into the binary.
    pub fn builtin() -> Self {
        let mut tables = ContentTables::default();
        tables.overlay("items.json", BUILTIN_ITEMS);
        tables.overlay("enemies.json", BUILTIN_ENEMIES);
        tables.overlay("zones.json", BUILTIN_ZONES);
        tables.overlay("bosses.json", BUILTIN_BOSSES);
        tables.overlay("skills.json", BUILTIN_SKILLS);
        tables.overlay("stories.json", BUILTIN_STORIES);
        tables
    }

    /// Built-in tables overlaid with whichever files exist in `dir`.
    pub fn load_dir(dir: &Path) -> anyhow::Result<Self> {
        let mut tables = Self::builtin();
        for file in [
            "items.json",
            "enemies.json",
            "zones.json",
            "bosses.json",
            "skills.json",
            "stories.json",
        ] {
            let path = dir.join(file);
            if !path.exists() {
                continue;
            }
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading content file {}", path.display()))?;
            tables.overlay(file, &raw);
            info!(target = "content", file, "content overlay loaded");
        }
        Ok(tables)
    }

    /// Merges one JSON table into the current set, replacing entries by id.
    pub fn overlay(&mut self, file: &str, raw: &str) {
        match file {
            "items.json" => {
                for item in parse_table::<ItemDef>(file, raw).unwrap_or_default() {
                    self.items.insert(item.id.clone(), item);
                }
            }
            "enemies.json" => {
                for enemy in parse_table::<EnemyTemplate>(file, raw).unwrap_or_default() {
                    self.enemies.insert(enemy.id.clone(), enemy);
                }
            }
            "zones.json" => {
                if let Some(mut zones) = parse_table::<ZoneTable>(file, raw) {
                    zones.sort_by_key(|z| z.from);
                    self.zones = zones;
                }
            }
            "bosses.json" => {
                for boss in parse_table::<BossTemplate>(file, raw).unwrap_or_default() {
                    self.bosses.insert(boss.stage, boss);
                }
            }
            "skills.json" => {
                for skill in parse_table::<SkillDef>(file, raw).unwrap_or_default() {
                    self.skills.insert(skill.id.clone(), skill);
                }
            }
            "stories.json" => {
                for story in parse_table::<StoryNode>(file, raw).unwrap_or_default() {
                    self.stories.insert(story.id.clone(), story);
                }
            }
            other => warn!(target = "content", file = other, "unknown content table"),
        }
    }

    pub fn item(&self, id: &str) -> &ItemDef {
        self.items.get(id).unwrap_or_else(|| {
            warn!(target = "content", item = id, "unknown item, using default");
            default_item()
        })
    }

    pub fn has_item(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn enemy(&self, id: &str) -> &EnemyTemplate {
        self.enemies.get(id).unwrap_or_else(|| {
            warn!(target = "content", enemy = id, "unknown enemy, using default");
            default_enemy()
        })
    }

    /// Zone covering `distance`; past the last zone the last one repeats.
    pub fn zone_for(&self, distance: i64) -> Option<&ZoneTable> {
        self.zones
            .iter()
            .find(|z| z.from <= distance && distance < z.to)
            .or_else(|| self.zones.last())
    }

    /// Weighted enemy pick for the zone at `distance`.
    pub fn pick_enemy(&self, distance: i64, dice: &mut dyn Dice) -> &EnemyTemplate {
        let Some(zone) = self.zone_for(distance) else {
            return default_enemy();
        };
        let total: u32 = zone.enemies.iter().map(|e| e.weight).sum();
        if total == 0 {
            return default_enemy();
        }
        let mut roll = dice.roll(1, total.min(i32::MAX as u32) as i32) as u32;
        for entry in &zone.enemies {
            if roll <= entry.weight {
                return self.enemy(&entry.enemy);
            }
            roll -= entry.weight;
        }
        default_enemy()
    }

    /// Boss for a stage. Missing stages reuse the strongest known boss scaled by stage.
    pub fn boss(&self, stage: u32) -> BossTemplate {
        if let Some(boss) = self.bosses.get(&stage) {
            return boss.clone();
        }
        warn!(target = "content", stage, "missing boss template, scaling fallback");
        let base = self
            .bosses
            .values()
            .next_back()
            .map(|b| b.enemy.clone())
            .unwrap_or_else(|| default_enemy().clone());
        let factor = stage.max(1) as i32;
        BossTemplate {
            stage,
            final_boss: false,
            enemy: EnemyTemplate {
                id: format!("boss_{stage}"),
                hp: base.hp.saturating_mul(factor),
                attack: base.attack + 4 * factor,
                defense: base.defense + 2 * factor,
                gold: base.gold.saturating_mul(factor as i64),
                ..base
            },
        }
    }

    pub fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.skills.get(id)
    }

    pub fn story(&self, id: &str) -> Option<&StoryNode> {
        self.stories.get(id)
    }

    /// Ids of every branching story, sorted for stable selection.
    pub fn choice_story_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .stories
            .values()
            .filter(|s| s.is_choice())
            .map(|s| s.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Items the shop sells, cheapest first.
    pub fn shop_items(&self) -> Vec<&ItemDef> {
        let mut items: Vec<&ItemDef> = self.items.values().filter(|i| i.price.is_some()).collect();
        items.sort_by_key(|i| (i.price.unwrap_or(0), i.id.clone()));
        items
    }

    /// 1-based zone number, used for chest gold scaling.
    pub fn zone_number(distance: i64) -> i64 {
        distance.max(0) / ZONE_LENGTH + 1
    }
}

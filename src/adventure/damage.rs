//! Damage model: one raw-hit roll plus three interchangeable mitigation formulas.
//!
//! ```text
//! raw     = max(0, round(attack * attack_scale) + roll[rand_min, rand_max])
//! legacy  = max(0, raw - round(defense * defense_scale))
//! lol     = max(0, raw / (1 + scaled_defense / 100))
//! poe     = max(0, k * raw^2 / (scaled_defense + k * raw))
//! ```
//!
//! All three return 0 for `raw <= 0` and never exceed `raw`.

use super::dice::Dice;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ARMOR_FACTOR: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DamageModel {
    /// Flat subtraction of scaled defense.
    #[default]
    Legacy,
    /// Armor ratio: each 100 points of defense halves the remaining damage.
    Lol,
    /// Nonlinear armor: big hits punch through, small hits are soaked.
    Poe,
}

impl DamageModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DamageModel::Legacy => "legacy",
            DamageModel::Lol => "lol",
            DamageModel::Poe => "poe",
        }
    }
}

impl fmt::Display for DamageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageModel {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(DamageModel::Legacy),
            "lol" => Ok(DamageModel::Lol),
            "poe" => Ok(DamageModel::Poe),
            _ => Err(()),
        }
    }
}

/// Numeric knobs for the damage model. Every field has a safe default.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageConfig {
    pub model: DamageModel,
    pub attack_scale: f64,
    pub defense_scale: f64,
    pub armor_factor: f64,
    pub rand_min: i32,
    pub rand_max: i32,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            model: DamageModel::Legacy,
            attack_scale: 1.0,
            defense_scale: 1.0,
            armor_factor: DEFAULT_ARMOR_FACTOR,
            rand_min: -5,
            rand_max: 5,
        }
    }
}

impl DamageConfig {
    /// Replaces non-finite or negative knobs with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.attack_scale.is_finite() || self.attack_scale < 0.0 {
            self.attack_scale = defaults.attack_scale;
        }
        if !self.defense_scale.is_finite() || self.defense_scale < 0.0 {
            self.defense_scale = defaults.defense_scale;
        }
        if !self.armor_factor.is_finite() || self.armor_factor <= 0.0 {
            self.armor_factor = defaults.armor_factor;
        }
        if self.rand_min > self.rand_max {
            std::mem::swap(&mut self.rand_min, &mut self.rand_max);
        }
        self
    }
}

/// Rolls the unmitigated hit for an attacker.
pub fn raw_hit(attack: i32, rand_min: i32, rand_max: i32, attack_scale: f64, dice: &mut dyn Dice) -> i32 {
    let scaled = (attack as f64 * attack_scale).round() as i32;
    (scaled + dice.roll(rand_min, rand_max)).max(0)
}

/// Applies the configured mitigation formula to a raw hit.
pub fn mitigate(model: DamageModel, raw: i32, defense: i32, defense_scale: f64, armor_factor: f64) -> i32 {
    if raw <= 0 {
        return 0;
    }
    let scaled_defense = (defense.max(0) as f64) * defense_scale.max(0.0);
    let mitigated = match model {
        DamageModel::Legacy => (raw as f64 - scaled_defense.round()).max(0.0),
        DamageModel::Lol => raw as f64 / (1.0 + scaled_defense / 100.0),
        DamageModel::Poe => {
            let k = if armor_factor > 0.0 {
                armor_factor
            } else {
                DEFAULT_ARMOR_FACTOR
            };
            let raw = raw as f64;
            k * raw * raw / (scaled_defense + k * raw)
        }
    };
    (mitigated.round() as i32).clamp(0, raw)
}

/// Raw roll and mitigation in one step, using the configured model.
pub fn calculate_physical_damage(attack: i32, defense: i32, config: &DamageConfig, dice: &mut dyn Dice) -> i32 {
    let raw = raw_hit(attack, config.rand_min, config.rand_max, config.attack_scale, dice);
    mitigate(config.model, raw, defense, config.defense_scale, config.armor_factor)
}

/// Both stages of a hit, kept apart so effects can intervene between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRoll {
    pub raw: i32,
    pub mitigated: i32,
}

impl DamageConfig {
    pub fn roll_hit(&self, attack: i32, defense: i32, dice: &mut dyn Dice) -> HitRoll {
        let raw = raw_hit(attack, self.rand_min, self.rand_max, self.attack_scale, dice);
        HitRoll {
            raw,
            mitigated: self.mitigate(raw, defense),
        }
    }

    pub fn mitigate(&self, raw: i32, defense: i32) -> i32 {
        mitigate(self.model, raw, defense, self.defense_scale, self.armor_factor)
    }
}

//! Runtime tunables read from the environment (after `.env` is loaded).
//!
//! Every knob has a default. A value that fails to parse is logged and ignored
//! so a typo in `.env` never keeps the bot from starting.

use crate::adventure::damage::{DamageConfig, DamageModel};
use crate::constants::{DEFAULT_ACTION_TIMEOUT_SECS, DEFAULT_BATTLE_TIMEOUT_SECS};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub damage: DamageConfig,
    /// Idle time after which an open battle is closed.
    pub battle_timeout: Duration,
    /// Upper bound on a single player action, store round-trips included.
    pub action_timeout: Duration,
    /// Directory holding JSON content overlays, if any.
    pub content_dir: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            damage: DamageConfig::default(),
            battle_timeout: Duration::from_secs(DEFAULT_BATTLE_TIMEOUT_SECS),
            action_timeout: Duration::from_secs(DEFAULT_ACTION_TIMEOUT_SECS),
            content_dir: None,
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(target = "config", key, value = trimmed, "unparseable value, using default");
            None
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = GameConfig::default();
        let mut damage = defaults.damage.clone();
        if let Some(model) = parse_var::<DamageModel>(&lookup, "DAMAGE_MODEL") {
            damage.model = model;
        }
        if let Some(v) = parse_var(&lookup, "ATTACK_SCALE") {
            damage.attack_scale = v;
        }
        if let Some(v) = parse_var(&lookup, "DEFENSE_SCALE") {
            damage.defense_scale = v;
        }
        if let Some(v) = parse_var(&lookup, "ARMOR_FACTOR") {
            damage.armor_factor = v;
        }
        if let Some(v) = parse_var(&lookup, "DAMAGE_RAND_MIN") {
            damage.rand_min = v;
        }
        if let Some(v) = parse_var(&lookup, "DAMAGE_RAND_MAX") {
            damage.rand_max = v;
        }

        let battle_timeout = parse_var::<u64>(&lookup, "BATTLE_TIMEOUT_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.battle_timeout);
        let action_timeout = parse_var::<u64>(&lookup, "ACTION_TIMEOUT_SECS")
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.action_timeout);
        let content_dir = lookup("CONTENT_DIR")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        Self {
            damage: damage.sanitized(),
            battle_timeout,
            action_timeout,
            content_dir,
        }
    }
}

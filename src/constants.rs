// Central balance constants for the adventure. Runtime-tunable numbers live in `config.rs`.

// --- Track & milestones ---
pub const BOSS_INTERVAL: i64 = 1000;
pub const SPECIAL_INTERVAL: i64 = 500;
pub const STORY_INTERVAL: i64 = 250;
pub const MAX_BOSS_STAGE: i64 = 10;
pub const STEP_MIN: i32 = 10;
pub const STEP_MAX: i32 = 30;
pub const ZONE_LENGTH: i64 = 1000;

// --- Event weights (one draw in [0, 100)) ---
pub const TRAP_CHEST_UPPER: i32 = 1;
pub const CHEST_UPPER: i32 = 10;
pub const BATTLE_UPPER: i32 = 40;
// Choice stories fire on a single 1-in-1000 draw (0.1%).
pub const CHOICE_STORY_DIE: i32 = 1000;

// --- Exploration rewards ---
pub const TRAP_DAMAGE_PERCENT: i32 = 10;
pub const CHEST_GOLD_MIN: i64 = 20;
pub const CHEST_GOLD_MAX: i64 = 60;
pub const SHRINE_GOLD_PER_SPECIAL: i64 = 50;

// --- Combat ---
pub const DEFEND_REDUCTION_MIN: i32 = 30;
pub const DEFEND_REDUCTION_MAX: i32 = 60;
pub const FLEE_CHANCE: i32 = 50;
pub const DOT_TURNS: i32 = 3;
pub const BURN_PERCENT: i32 = 20;
pub const POISON_PERCENT: i32 = 15;
pub const DEFAULT_CRIT_PERCENT: i32 = 150;
pub const LOW_HP_PERCENT: i32 = 30;
pub const REVIVE_ITEM: &str = "phoenix_feather";
pub const REVIVE_ITEM_HEAL_PERCENT: i32 = 50;

// --- Death & restart ---
pub const RESTART_MAX_HP_BONUS: i32 = 5;
pub const DEATH_GOLD_KEEP_PERCENT: i64 = 50;

// --- Upgrades ---
pub const UPGRADE_STAT_STEP: i32 = 2;
pub const UPGRADE_BASE_COST: i64 = 100;
pub const MAX_UPGRADE_LEVEL: i32 = 10;

// --- New players ---
pub const START_HP: i32 = 100;
pub const START_MP: i32 = 30;
pub const START_ATK: i32 = 10;
pub const START_DEF: i32 = 5;
pub const START_GOLD: i64 = 100;
pub const STARTER_SKILLS: [&str; 2] = ["power_strike", "heal"];
pub const STARTER_WEAPON: &str = "wooden_sword";
pub const STARTER_ARMOR: &str = "cloth_armor";

// --- Sessions ---
pub const DEFAULT_BATTLE_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 15;
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 30;

// --- Store retry ---
pub const STORE_MAX_ATTEMPTS: u32 = 3;
pub const STORE_BACKOFF_BASE_MS: u64 = 100;

//! Turn-based combat: session state, encounter rules, turn resolution and rewards.

pub mod logic;
pub mod policy;
pub mod registry;
pub mod rewards;
pub mod state;

pub use logic::{PlayerAction, PlayerState, TurnContext, TurnEvent, TurnResolution, resolve_turn};
pub use policy::{EncounterKind, EncounterPolicy};
pub use registry::BattleRegistry;
pub use state::{BattlePhase, BattleSession, Signal, Terminal, ViewHandle};

//! Battle session data and the phase state machine.

use super::policy::EncounterPolicy;
use crate::adventure::actor::Actor;
use crate::adventure::content::DropEntry;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terminal {
    Win,
    Lose,
    Flee,
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    AwaitingAction,
    EnemyReaction,
    Terminal(Terminal),
}

/// What just happened, fed to [`BattlePhase::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The player's action resolved and the enemy is still standing.
    ActionResolved,
    Fled,
    EnemyDown,
    PlayerDown,
    /// The enemy's reaction (or skipped reaction) finished.
    ReactionDone,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no transition from {from:?} on {signal:?}")]
pub struct InvalidTransition {
    pub from: BattlePhase,
    pub signal: Signal,
}

impl BattlePhase {
    pub fn transition(self, signal: Signal) -> Result<BattlePhase, InvalidTransition> {
        let next = match (self, signal) {
            (BattlePhase::AwaitingAction, Signal::ActionResolved) => BattlePhase::EnemyReaction,
            (BattlePhase::AwaitingAction, Signal::Fled) => BattlePhase::Terminal(Terminal::Flee),
            (BattlePhase::AwaitingAction | BattlePhase::EnemyReaction, Signal::EnemyDown) => {
                BattlePhase::Terminal(Terminal::Win)
            }
            (BattlePhase::AwaitingAction | BattlePhase::EnemyReaction, Signal::PlayerDown) => {
                BattlePhase::Terminal(Terminal::Lose)
            }
            (BattlePhase::AwaitingAction | BattlePhase::EnemyReaction, Signal::Expired) => {
                BattlePhase::Terminal(Terminal::Timeout)
            }
            (BattlePhase::EnemyReaction, Signal::ReactionDone) => BattlePhase::AwaitingAction,
            (from, signal) => return Err(InvalidTransition { from, signal }),
        };
        Ok(next)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BattlePhase::Terminal(_))
    }

    pub fn terminal(&self) -> Option<Terminal> {
        match self {
            BattlePhase::Terminal(t) => Some(*t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DotKind {
    Burn,
    Poison,
}

impl DotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DotKind::Burn => "burn",
            DotKind::Poison => "poison",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOverTime {
    pub magnitude: i32,
    pub turns_left: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnemyStatus {
    pub burn: Option<DamageOverTime>,
    pub poison: Option<DamageOverTime>,
    /// Reactions the enemy will lose (freeze, paralyze, flinch).
    pub skip_turns: u32,
}

impl EnemyStatus {
    pub fn dot_mut(&mut self, kind: DotKind) -> &mut Option<DamageOverTime> {
        match kind {
            DotKind::Burn => &mut self.burn,
            DotKind::Poison => &mut self.poison,
        }
    }
}

/// Where the adapter drew the battle; opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewHandle {
    pub channel_id: u64,
    pub message_id: u64,
}

#[derive(Debug, Clone)]
pub struct BattleSession {
    pub user_id: u64,
    pub enemy_id: String,
    pub enemy: Actor,
    pub status: EnemyStatus,
    pub phase: BattlePhase,
    pub turn: u32,
    pub policy: EncounterPolicy,
    pub zone: Option<String>,
    pub gold: i64,
    pub drops: Vec<DropEntry>,
    pub last_activity: Instant,
    pub view: Option<ViewHandle>,
}

impl BattleSession {
    pub fn new(user_id: u64, enemy_id: impl Into<String>, enemy: Actor, policy: EncounterPolicy) -> Self {
        Self {
            user_id,
            enemy_id: enemy_id.into(),
            enemy,
            status: EnemyStatus::default(),
            phase: BattlePhase::AwaitingAction,
            turn: 1,
            policy,
            zone: None,
            gold: 0,
            drops: Vec::new(),
            last_activity: Instant::now(),
            view: None,
        }
    }

    pub fn with_rewards(mut self, gold: i64, drops: Vec<DropEntry>) -> Self {
        self.gold = gold;
        self.drops = drops;
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    /// Applies a signal; an impossible signal leaves the phase unchanged.
    pub fn signal(&mut self, signal: Signal) -> BattlePhase {
        match self.phase.transition(signal) {
            Ok(next) => self.phase = next,
            Err(e) => tracing::warn!(target = "battle", user_id = self.user_id, error = %e, "ignored phase signal"),
        }
        self.phase
    }

    pub fn is_idle_for(&self, timeout: std::time::Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.last_activity) >= timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        let p = BattlePhase::AwaitingAction;
        assert_eq!(p.transition(Signal::ActionResolved), Ok(BattlePhase::EnemyReaction));
        assert_eq!(
            BattlePhase::EnemyReaction.transition(Signal::ReactionDone),
            Ok(BattlePhase::AwaitingAction)
        );
        assert_eq!(
            BattlePhase::EnemyReaction.transition(Signal::EnemyDown),
            Ok(BattlePhase::Terminal(Terminal::Win))
        );
        assert!(BattlePhase::EnemyReaction.transition(Signal::Fled).is_err());
        assert!(BattlePhase::Terminal(Terminal::Win).transition(Signal::Expired).is_err());
    }
}

//! Errors surfaced to the chat adapter.

use crate::database::StoreError;

/// A request the game refuses. Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("you have not started an adventure yet; use /start")]
    NotRegistered,
    #[error("you are in a battle; finish it first")]
    InBattle,
    #[error("you are not in a battle")]
    NoBattle,
    #[error("this battle is already over")]
    SessionOver,
    #[error("unknown skill `{0}`")]
    UnknownSkill(String),
    #[error("you have not learned `{0}`")]
    SkillNotLearned(String),
    #[error("not enough MP: need {need}, have {have}")]
    InsufficientMp { need: i32, have: i32 },
    #[error("there is no escape from this fight")]
    FleeForbidden,
    #[error("unknown item `{0}`")]
    UnknownItem(String),
    #[error("`{0}` is not for sale")]
    NotForSale(String),
    #[error("not enough gold: need {need}, have {have}")]
    InsufficientGold { need: i64, have: i64 },
    #[error("you do not own `{0}`")]
    NotOwned(String),
    #[error("`{0}` cannot be equipped")]
    NotEquippable(String),
    #[error("nothing is equipped in the {0} slot")]
    EmptySlot(String),
    #[error("the {0} is already at its maximum level")]
    MaxUpgrade(String),
    #[error("that story choice is not available")]
    UnknownChoice,
    #[error("you do not meet the requirements for that choice")]
    ChoiceLocked,
}

#[derive(Debug, thiserror::Error)]
pub enum AdventureError {
    /// Another action for the same player is still running.
    #[error("you are already doing something; wait a moment")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ActionError),
    #[error("storage problem: {0}")]
    Store(#[from] StoreError),
    #[error("the action took too long and was cancelled")]
    TimedOut,
}

impl AdventureError {
    /// Whether the same request may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdventureError::Busy | AdventureError::TimedOut => true,
            AdventureError::Store(e) => e.is_transient(),
            AdventureError::Invalid(_) => false,
        }
    }
}

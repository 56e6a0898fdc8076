//! The game itself: rules, content and the service that runs them for each player.

pub mod ability;
pub mod actor;
pub mod armor;
pub mod battle;
pub mod content;
pub mod damage;
pub mod dice;
pub mod error;
pub mod events;
pub mod locks;
pub mod service;
pub mod story;

pub use error::{ActionError, AdventureError};
pub use service::AdventureService;

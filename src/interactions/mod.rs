//! This module acts as a central router for all component interactions.
//!
//! The main `handler.rs` file delegates here by the component's "family" (the
//! custom id text before the first underscore), and each family has its own
//! handler.

pub mod battle_handler;
pub mod ids;
pub mod road_handler;
pub mod story_handler;
pub mod util;

//! Shared embed styling and button helpers for the chat adapter.

pub mod buttons;
pub mod style;

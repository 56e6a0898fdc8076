// Library entry so integration tests and external tools can reference internal modules.
// Re-export the same modules used by the binary (`main.rs`).
pub mod adventure;
pub mod commands;
pub mod config;
pub mod constants;
pub mod database;
pub mod handler;
pub mod interactions;
pub mod model;
pub mod ui;

// Convenient re-exports for frequently used types.
pub use adventure::AdventureService;
pub use model::AppState;

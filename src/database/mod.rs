//! Persistence for player records.
//!
//! The game talks to storage only through [`PlayerStore`]. `MemoryStore` backs
//! tests and local runs without a database; `PgStore` is the production store.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{PlayerStore, StoreError};

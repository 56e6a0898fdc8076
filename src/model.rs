//! Shared data stored in Serenity's global context as `TypeMapKey`s.

use crate::adventure::AdventureService;
use serenity::gateway::ShardManager;
use serenity::prelude::TypeMapKey;
use std::sync::Arc;

/// A container for the ShardManager, allowing it to be stored in the global context.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// The central, shared state of the bot. Command and component handlers reach
/// the game only through `adventure`.
pub struct AppState {
    pub adventure: Arc<AdventureService>,
}

impl AppState {
    pub fn new(adventure: Arc<AdventureService>) -> Self {
        Self { adventure }
    }

    pub async fn from_ctx(ctx: &serenity::prelude::Context) -> Option<Arc<Self>> {
        ctx.data.read().await.get::<AppState>().cloned()
    }
}

impl TypeMapKey for AppState {
    type Value = Arc<AppState>;
}

use std::env;
use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wayfarer_bot::adventure::content::ContentTables;
use wayfarer_bot::config::GameConfig;
use wayfarer_bot::database::{MemoryStore, PgStore, PlayerStore};
use wayfarer_bot::handler::Handler;
use wayfarer_bot::model::ShardManagerContainer;
use wayfarer_bot::{AdventureService, AppState};

fn load_content(config: &GameConfig) -> ContentTables {
    match &config.content_dir {
        Some(dir) => match ContentTables::load_dir(dir) {
            Ok(tables) => {
                info!(target = "startup", dir = %dir.display(), "content overlays loaded");
                tables
            }
            Err(e) => {
                warn!(target = "startup", dir = %dir.display(), error = ?e, "content overlays failed; using built-in tables");
                ContentTables::builtin()
            }
        },
        None => ContentTables::builtin(),
    }
}

async fn open_store() -> anyhow::Result<Arc<dyn PlayerStore>> {
    match env::var("DATABASE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            let store = PgStore::connect(&url).await?;
            store.ensure_schema().await?;
            info!(target = "startup", "connected to Postgres");
            Ok(Arc::new(store))
        }
        _ => {
            warn!(target = "startup", "DATABASE_URL not set; progress is kept in memory only");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,wayfarer_bot=debug")),
        )
        .init();

    let token = env::var("DISCORD_TOKEN").expect("Expected DISCORD_TOKEN in the .env file.");
    let server_id_str = env::var("SERVER_ID").expect("Expected SERVER_ID in the .env file.");
    let server_id = server_id_str
        .parse::<u64>()
        .expect("SERVER_ID must be a valid number.");
    let allowed_guild_id = GuildId::new(server_id);

    let config = GameConfig::from_env();
    let content = Arc::new(load_content(&config));
    let store = open_store().await.expect("Failed to open the player store.");
    let adventure = Arc::new(AdventureService::new(store, content, config));
    let app_state = Arc::new(AppState::new(adventure));

    // Slash commands and components only need GUILDS.
    let intents = GatewayIntents::GUILDS;

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler::new(allowed_guild_id))
        .await
        .expect("Error creating the Discord client.");

    {
        let mut data = client.data.write().await;
        data.insert::<ShardManagerContainer>(client.shard_manager.clone());
        data.insert::<AppState>(app_state);
    }

    if let Err(why) = client.start().await {
        error!(target = "startup", error = ?why, "client error");
    }
}

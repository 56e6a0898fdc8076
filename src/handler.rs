use crate::adventure::service::ExpiredBattle;
use crate::constants::SESSION_SWEEP_INTERVAL_SECS;
use crate::{AppState, commands, interactions};
use serenity::all::{ChannelId, MessageId};
use serenity::async_trait;
use serenity::builder::EditMessage;
use serenity::client::Context;
use serenity::model::application::Interaction;
use serenity::model::{gateway::Ready, id::GuildId};
use serenity::prelude::EventHandler;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

pub struct Handler {
    pub allowed_guild_id: GuildId,
    /// `ready` fires again on reconnect; the sweeper must only start once.
    pub sweeper_started: AtomicBool,
}

impl Handler {
    pub fn new(allowed_guild_id: GuildId) -> Self {
        Self {
            allowed_guild_id,
            sweeper_started: AtomicBool::new(false),
        }
    }
}

/// Removes the buttons from a timed-out battle's message.
async fn close_expired(ctx: &Context, expired: ExpiredBattle) {
    let Some(view) = expired.view else {
        return;
    };
    let edit = EditMessage::new()
        .content(format!(
            "⌛ The {} lost interest and wandered off. Use /explore to continue.",
            expired.enemy_name
        ))
        .components(Vec::new());
    if let Err(e) = ChannelId::new(view.channel_id)
        .edit_message(ctx, MessageId::new(view.message_id), edit)
        .await
    {
        warn!(target = "handler.sweep", user_id = expired.user_id, error = ?e, "could not close expired battle view");
    }
}

fn spawn_sweeper(ctx: Context, app_state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            let expired = app_state.adventure.sweep_timeouts(Instant::now());
            for battle in expired {
                close_expired(&ctx, battle).await;
            }
        }
    });
}

#[async_trait]
impl EventHandler for Handler {
    async fn interaction_create(&self, ctx: Context, mut interaction: Interaction) {
        let Some(app_state) = AppState::from_ctx(&ctx).await else {
            error!(target = "handler", "AppState missing from TypeMap");
            return;
        };
        if let Interaction::Command(command) = &mut interaction {
            match command.data.name.as_str() {
                "start" | "explore" | "status" | "shop" | "buy" | "equip" | "upgrade" => {
                    commands::adventure::run::run_slash(&ctx, command).await
                }
                _ => {}
            }
        } else if let Interaction::Component(component) = &mut interaction {
            match interactions::ids::family(&component.data.custom_id) {
                "battle" => interactions::battle_handler::handle(&ctx, component, app_state).await,
                "story" => interactions::story_handler::handle(&ctx, component, app_state).await,
                "road" => interactions::road_handler::handle(&ctx, component, app_state).await,
                _ => {}
            }
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(target = "handler", user = %ready.user.name, "connected and ready");
        if let Err(e) = self
            .allowed_guild_id
            .set_commands(&ctx.http, commands::adventure::run::register_all())
            .await
        {
            error!(target = "handler", error = ?e, "error creating guild commands");
        } else {
            info!(target = "handler", "registered guild commands");
        }
        if self.sweeper_started.swap(true, Ordering::SeqCst) {
            return;
        }
        match AppState::from_ctx(&ctx).await {
            Some(app_state) => spawn_sweeper(ctx.clone(), app_state),
            None => error!(target = "handler", "AppState missing; battle timeouts disabled"),
        }
    }
}

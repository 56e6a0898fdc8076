//! Slash command registration and dispatch for the adventure.

use super::ui;
use crate::AppState;
use crate::adventure::AdventureError;
use crate::adventure::battle::ViewHandle;
use crate::database::models::EquipSlot;
use serenity::builder::{
    CreateActionRow, CreateCommand, CreateCommandOption, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{debug, error};

pub fn register_start() -> CreateCommand {
    CreateCommand::new("start").description("Begin your journey down the road.")
}

pub fn register_explore() -> CreateCommand {
    CreateCommand::new("explore").description("Walk forward and see what the road brings.")
}

pub fn register_status() -> CreateCommand {
    CreateCommand::new("status").description("Show your stats, equipment and progress.")
}

pub fn register_shop() -> CreateCommand {
    CreateCommand::new("shop").description("Browse the wayside merchant's goods.")
}

pub fn register_buy() -> CreateCommand {
    CreateCommand::new("buy")
        .description("Buy an item from the merchant.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "item", "Item id, e.g. iron_sword")
                .required(true),
        )
}

pub fn register_equip() -> CreateCommand {
    CreateCommand::new("equip")
        .description("Equip a weapon, armor or shield you own.")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "item", "Item id from your inventory")
                .required(true),
        )
}

pub fn register_upgrade() -> CreateCommand {
    let slot = EquipSlot::ALL.iter().fold(
        CreateCommandOption::new(CommandOptionType::String, "slot", "Which piece to upgrade")
            .required(true),
        |opt, slot| opt.add_string_choice(slot.as_str(), slot.as_str()),
    );
    CreateCommand::new("upgrade")
        .description("Spend gold to upgrade an equipped piece.")
        .add_option(slot)
}

pub fn register_all() -> Vec<CreateCommand> {
    vec![
        register_start(),
        register_explore(),
        register_status(),
        register_shop(),
        register_buy(),
        register_equip(),
        register_upgrade(),
    ]
}

fn string_option<'a>(interaction: &'a CommandInteraction, name: &str) -> Option<&'a str> {
    interaction
        .data
        .options
        .iter()
        .find(|o| o.name == name)
        .and_then(|o| o.value.as_str())
}

/// Replaces the deferred reply with an ephemeral error only the caller sees.
async fn fail(ctx: &Context, interaction: &CommandInteraction, err: &AdventureError) {
    debug!(target = "commands.adventure", user_id = interaction.user.id.get(), error = %err, "command refused");
    interaction.delete_response(&ctx.http).await.ok();
    let followup = CreateInteractionResponseFollowup::new()
        .embed(ui::render_error(err))
        .ephemeral(true);
    if let Err(e) = interaction.create_followup(&ctx.http, followup).await {
        error!(target = "commands.adventure", error = ?e, "failed to send error followup");
    }
}

async fn show(
    ctx: &Context,
    interaction: &CommandInteraction,
    embed: CreateEmbed,
    components: Vec<CreateActionRow>,
) -> Option<serenity::model::channel::Message> {
    let builder = EditInteractionResponse::new().embed(embed).components(components);
    match interaction.edit_response(&ctx.http, builder).await {
        Ok(msg) => Some(msg),
        Err(e) => {
            error!(target = "commands.adventure", cmd = %interaction.data.name, error = ?e, "edit_response failed");
            None
        }
    }
}

/// Entry point for every adventure slash command.
pub async fn run_slash(ctx: &Context, interaction: &CommandInteraction) {
    // Defer the response immediately; store round-trips may take a moment.
    let _ = interaction
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(CreateInteractionResponseMessage::new()),
        )
        .await;

    let Some(app_state) = AppState::from_ctx(ctx).await else {
        return;
    };
    let game = Arc::clone(&app_state.adventure);
    let user_id = interaction.user.id.get();

    match interaction.data.name.as_str() {
        "start" => {
            let name = interaction
                .user
                .global_name
                .clone()
                .unwrap_or_else(|| interaction.user.name.clone());
            match game.start(user_id, &name).await {
                Ok((record, created)) => {
                    let (embed, rows) = ui::start_view(&record, created);
                    show(ctx, interaction, embed, rows).await;
                }
                Err(e) => fail(ctx, interaction, &e).await,
            }
        }
        "explore" => match game.explore(user_id).await {
            Ok(outcome) => {
                let (embed, rows) = ui::explore_view(&outcome);
                let msg = show(ctx, interaction, embed, rows).await;
                if let (Some(msg), Some(_)) = (msg, &outcome.battle) {
                    game.attach_view(
                        user_id,
                        ViewHandle {
                            channel_id: msg.channel_id.get(),
                            message_id: msg.id.get(),
                        },
                    );
                }
            }
            Err(e) => fail(ctx, interaction, &e).await,
        },
        "status" => match game.status(user_id).await {
            Ok(report) => {
                let (embed, rows) = ui::status_view(&report, game.content());
                show(ctx, interaction, embed, rows).await;
            }
            Err(e) => fail(ctx, interaction, &e).await,
        },
        "shop" => {
            let gold = game.status(user_id).await.ok().map(|r| r.record.gold);
            let embed = ui::shop_embed(&game.shop_items(), gold);
            show(ctx, interaction, embed, Vec::new()).await;
        }
        "buy" => {
            let item = string_option(interaction, "item").unwrap_or_default();
            match game.buy(user_id, item.trim()).await {
                Ok(receipt) => {
                    show(ctx, interaction, ui::receipt_embed("Purchase", &receipt), Vec::new()).await;
                }
                Err(e) => fail(ctx, interaction, &e).await,
            }
        }
        "equip" => {
            let item = string_option(interaction, "item").unwrap_or_default();
            match game.equip(user_id, item.trim()).await {
                Ok(receipt) => {
                    show(ctx, interaction, ui::receipt_embed("Equipment", &receipt), Vec::new()).await;
                }
                Err(e) => fail(ctx, interaction, &e).await,
            }
        }
        "upgrade" => {
            let Some(slot) = string_option(interaction, "slot").and_then(|s| s.parse::<EquipSlot>().ok())
            else {
                let embed = crate::ui::style::error_embed("Not now", "Pick weapon, armor or shield.");
                show(ctx, interaction, embed, Vec::new()).await;
                return;
            };
            match game.upgrade(user_id, slot).await {
                Ok(receipt) => {
                    show(ctx, interaction, ui::receipt_embed("Blacksmith", &receipt), Vec::new()).await;
                }
                Err(e) => fail(ctx, interaction, &e).await,
            }
        }
        other => debug!(target = "commands.adventure", cmd = other, "unrouted command"),
    }
}

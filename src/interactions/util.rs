//! Shared interaction utility helpers (single defer + safe edit wrapper).
use crate::adventure::AdventureError;
use crate::adventure::battle::ViewHandle;
use crate::commands::adventure::ui::render_error;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::ComponentInteraction;
use serenity::prelude::Context;

/// Acknowledge a component interaction (message update) ignoring duplicate/late errors.
pub async fn defer_component(ctx: &Context, c: &ComponentInteraction) {
    if let Err(e) = c.defer(&ctx.http).await {
        tracing::debug!(target="ui.defer", cid=%c.data.custom_id, error=?e, "defer failed (already acknowledged?)");
    }
}

/// Edit original interaction response; logs failure with a tag for observability.
pub async fn edit_component(
    ctx: &Context,
    c: &ComponentInteraction,
    tag: &str,
    builder: EditInteractionResponse,
) {
    if let Err(e) = c.edit_response(&ctx.http, builder).await {
        tracing::error!(target="ui.edit", cid=%c.data.custom_id, tag=%tag, error=?e, "edit_response failed");
    }
}

/// Sends an ephemeral error after the component was deferred.
pub async fn refuse(ctx: &Context, c: &ComponentInteraction, err: &AdventureError) {
    tracing::debug!(target="ui.refuse", cid=%c.data.custom_id, user_id=c.user.id.get(), error=%err, "action refused");
    let followup = CreateInteractionResponseFollowup::new()
        .embed(render_error(err))
        .ephemeral(true);
    if let Err(e) = c.create_followup(&ctx.http, followup).await {
        tracing::error!(target="ui.refuse", cid=%c.data.custom_id, error=?e, "followup failed");
    }
}

/// The user whose slash command produced the message carrying this component.
#[allow(deprecated)]
pub fn message_owner(c: &ComponentInteraction) -> Option<u64> {
    c.message.interaction.as_ref().map(|i| i.user.id.get())
}

/// Rejects presses on someone else's message. Must run before deferring.
pub async fn ensure_owner(ctx: &Context, c: &ComponentInteraction) -> bool {
    match message_owner(c) {
        Some(owner) if owner != c.user.id.get() => {
            let reply = CreateInteractionResponseMessage::new()
                .content("This is someone else's adventure. Use /start to begin your own.")
                .ephemeral(true);
            c.create_response(&ctx.http, CreateInteractionResponse::Message(reply))
                .await
                .ok();
            false
        }
        _ => true,
    }
}

pub fn view_of(c: &ComponentInteraction) -> ViewHandle {
    ViewHandle {
        channel_id: c.channel_id.get(),
        message_id: c.message.id.get(),
    }
}

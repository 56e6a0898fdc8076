//! Handles `story_choice_*` buttons.

use super::ids;
use super::util::{defer_component, edit_component, ensure_owner, refuse};
use crate::AppState;
use crate::commands::adventure::ui;
use serenity::builder::EditInteractionResponse;
use serenity::model::application::ComponentInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

pub async fn handle(ctx: &Context, component: &mut ComponentInteraction, app_state: Arc<AppState>) {
    let Some((story_id, index)) = ids::parse_choice(&component.data.custom_id) else {
        tracing::warn!(target = "interactions.story", cid = %component.data.custom_id, "malformed choice id");
        return;
    };
    let story_id = story_id.to_string();
    if !ensure_owner(ctx, component).await {
        return;
    }
    defer_component(ctx, component).await;

    match app_state
        .adventure
        .choose_story(component.user.id.get(), &story_id, index)
        .await
    {
        Ok(outcome) => {
            let (embed, rows) = ui::story_outcome_view(&outcome);
            edit_component(
                ctx,
                component,
                "story.choice",
                EditInteractionResponse::new().embed(embed).components(rows),
            )
            .await;
        }
        Err(e) => refuse(ctx, component, &e).await,
    }
}

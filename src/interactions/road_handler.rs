//! Handles the `road_*` buttons shown under travel and status embeds.

use super::ids;
use super::util::{defer_component, edit_component, ensure_owner, refuse, view_of};
use crate::AppState;
use crate::commands::adventure::ui;
use serenity::builder::EditInteractionResponse;
use serenity::model::application::ComponentInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

pub async fn handle(ctx: &Context, component: &mut ComponentInteraction, app_state: Arc<AppState>) {
    if !ensure_owner(ctx, component).await {
        return;
    }
    let game = &app_state.adventure;
    let user_id = component.user.id.get();
    match component.data.custom_id.as_str() {
        ids::ROAD_EXPLORE => {
            defer_component(ctx, component).await;
            match game.explore(user_id).await {
                Ok(outcome) => {
                    let (embed, rows) = ui::explore_view(&outcome);
                    edit_component(
                        ctx,
                        component,
                        "road.explore",
                        EditInteractionResponse::new().embed(embed).components(rows),
                    )
                    .await;
                    if outcome.battle.is_some() {
                        game.attach_view(user_id, view_of(component));
                    }
                }
                Err(e) => refuse(ctx, component, &e).await,
            }
        }
        ids::ROAD_STATUS => {
            defer_component(ctx, component).await;
            match game.status(user_id).await {
                Ok(report) => {
                    let (embed, rows) = ui::status_view(&report, game.content());
                    edit_component(
                        ctx,
                        component,
                        "road.status",
                        EditInteractionResponse::new().embed(embed).components(rows),
                    )
                    .await;
                    if report.battle.is_some() {
                        game.attach_view(user_id, view_of(component));
                    }
                }
                Err(e) => refuse(ctx, component, &e).await,
            }
        }
        other => tracing::warn!(target = "interactions.road", cid = other, "unknown road button"),
    }
}

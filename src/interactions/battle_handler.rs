//! Handles the `battle_*` buttons: one press resolves one turn.

use super::ids;
use super::util::{defer_component, edit_component, ensure_owner, refuse, view_of};
use crate::AppState;
use crate::adventure::battle::PlayerAction;
use crate::commands::adventure::ui;
use serenity::builder::EditInteractionResponse;
use serenity::model::application::ComponentInteraction;
use serenity::prelude::Context;
use std::sync::Arc;

pub fn parse_action(custom_id: &str) -> Option<PlayerAction> {
    match custom_id {
        ids::BATTLE_ATTACK => Some(PlayerAction::Attack),
        ids::BATTLE_DEFEND => Some(PlayerAction::Defend),
        ids::BATTLE_FLEE => Some(PlayerAction::Flee),
        other => ids::parse_skill(other).map(|id| PlayerAction::UseSkill(id.to_string())),
    }
}

pub async fn handle(ctx: &Context, component: &mut ComponentInteraction, app_state: Arc<AppState>) {
    let Some(action) = parse_action(&component.data.custom_id) else {
        tracing::warn!(target = "interactions.battle", cid = %component.data.custom_id, "unknown battle button");
        return;
    };
    if !ensure_owner(ctx, component).await {
        return;
    }
    defer_component(ctx, component).await;

    let game = &app_state.adventure;
    let user_id = component.user.id.get();
    match game.battle_action(user_id, action).await {
        Ok(report) => {
            let (embed, rows) = ui::turn_view(&report);
            edit_component(
                ctx,
                component,
                "battle.turn",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_map_to_actions() {
        assert_eq!(parse_action("battle_attack"), Some(PlayerAction::Attack));
        assert_eq!(parse_action("battle_flee"), Some(PlayerAction::Flee));
        assert_eq!(
            parse_action("battle_skill_power_strike"),
            Some(PlayerAction::UseSkill("power_strike".into()))
        );
        assert_eq!(parse_action("battle_dance"), None);
    }
}

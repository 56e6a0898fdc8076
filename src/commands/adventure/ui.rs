//! Embeds and buttons for the adventure commands and their components.

use crate::adventure::AdventureError;
use crate::adventure::battle::Terminal;
use crate::adventure::content::{ContentTables, ItemDef};
use crate::adventure::events::EventKind;
use crate::adventure::service::{
    BattleView, ChoicePrompt, ExploreOutcome, Receipt, StatusReport, StoryOutcome, TurnReport,
};
use crate::constants::BOSS_INTERVAL;
use crate::database::models::{EquipSlot, PlayerRecord};
use crate::interactions::ids;
use crate::ui::buttons::Btn;
use crate::ui::style::{
    COLOR_BATTLE, COLOR_BOSS, COLOR_ROAD, COLOR_SHOP, COLOR_STORY, EMOJI_COIN, EMOJI_HP, EMOJI_MP,
    EMOJI_ROAD, bar, error_embed, stat_pair,
};
use serenity::builder::{CreateActionRow, CreateEmbed, CreateEmbedFooter};

const BUTTONS_PER_ROW: usize = 5;
// Discord caps embed field values at 1024 characters.
const FIELD_LIMIT: usize = 1024;

fn road_row() -> CreateActionRow {
    CreateActionRow::Buttons(vec![
        Btn::primary(ids::ROAD_EXPLORE, "Explore"),
        Btn::secondary(ids::ROAD_STATUS, "Status"),
    ])
}

fn clip(lines: &[String]) -> String {
    let mut out = String::new();
    for line in lines {
        if out.len() + line.len() + 1 > FIELD_LIMIT {
            out.push('…');
            break;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line);
    }
    if out.is_empty() { "-".to_string() } else { out }
}

fn next_boss_at(distance: i64) -> i64 {
    (distance / BOSS_INTERVAL + 1) * BOSS_INTERVAL
}

fn vitals(record: &PlayerRecord) -> String {
    format!(
        "{EMOJI_HP} {}\n{EMOJI_MP} {}",
        bar(record.hp, record.max_hp),
        bar(record.mp, record.max_mp)
    )
}

pub fn render_error(err: &AdventureError) -> CreateEmbed {
    let title = match err {
        AdventureError::Busy => "Hold on",
        AdventureError::Invalid(_) => "Not now",
        AdventureError::Store(_) => "Something went wrong",
        AdventureError::TimedOut => "Too slow",
    };
    let mut text = err.to_string();
    if err.is_retryable() {
        text.push_str("\nPlease try again.");
    }
    error_embed(title, text)
}

pub fn start_view(record: &PlayerRecord, created: bool) -> (CreateEmbed, Vec<CreateActionRow>) {
    let description = if created {
        format!(
            "Welcome, **{}**. The road begins here. Bosses wait every {BOSS_INTERVAL} meters.",
            record.name
        )
    } else {
        format!("Welcome back, **{}**. You stand at {}m.", record.name, record.distance)
    };
    let embed = CreateEmbed::new()
        .title("A New Journey")
        .description(description)
        .field("Vitals", vitals(record), false)
        .field(format!("{EMOJI_COIN} Gold"), record.gold.to_string(), true)
        .color(COLOR_ROAD);
    (embed, vec![road_row()])
}

pub fn status_view(report: &StatusReport, content: &ContentTables) -> (CreateEmbed, Vec<CreateActionRow>) {
    let record = &report.record;
    let gear = EquipSlot::ALL
        .iter()
        .map(|slot| match record.equipment.get(*slot) {
            Some(id) => {
                let level = record.upgrade_level(*slot);
                let plus = if level > 0 { format!(" +{level}") } else { String::new() };
                format!("**{slot}**: {}{plus}", content.item(id).name)
            }
            None => format!("**{slot}**: -"),
        })
        .collect::<Vec<_>>();
    let inventory = record
        .inventory
        .iter()
        .map(|(id, n)| format!("{} x{n}", content.item(id).name))
        .collect::<Vec<_>>();
    let embed = CreateEmbed::new()
        .title(format!("{} the Wayfarer", record.name))
        .field("Vitals", vitals(record), false)
        .field("⚔️ ATK", stat_pair(report.player.attack, record.atk), true)
        .field("🛡️ DEF", stat_pair(report.player.defense, record.def), true)
        .field(format!("{EMOJI_COIN} Gold"), record.gold.to_string(), true)
        .field(
            format!("{EMOJI_ROAD} Road"),
            format!(
                "{}m (loop {}) · next boss at {}m",
                record.distance,
                record.loop_count + 1,
                next_boss_at(record.distance)
            ),
            false,
        )
        .field("Equipment", clip(&gear), true)
        .field("Inventory", clip(&inventory), true)
        .footer(CreateEmbedFooter::new(format!(
            "Deaths: {} · Bosses defeated: {}",
            record.deaths,
            record.bosses_defeated.len()
        )))
        .color(COLOR_ROAD);
    match &report.battle {
        Some(view) => (embed, battle_components(view)),
        None => (embed, vec![road_row()]),
    }
}

pub fn battle_embed(view: &BattleView, log: &[String]) -> CreateEmbed {
    let (title, color) = match view.boss_stage {
        Some(stage) => (format!("Boss {stage}: {}", view.enemy.name), COLOR_BOSS),
        None => (format!("Battle: {}", view.enemy.name), COLOR_BATTLE),
    };
    let mut statuses = Vec::new();
    if view.burn_turns > 0 {
        statuses.push(format!("🔥 burning ({})", view.burn_turns));
    }
    if view.poison_turns > 0 {
        statuses.push(format!("☠️ poisoned ({})", view.poison_turns));
    }
    let mut embed = CreateEmbed::new()
        .title(title)
        .field(
            view.enemy.name.clone(),
            format!(
                "{EMOJI_HP} {}\n{} · {}",
                bar(view.enemy.current_hp, view.enemy.max_hp),
                view.enemy.attribute.as_str(),
                view.enemy.family.as_str()
            ),
            true,
        )
        .field(
            view.player.name.clone(),
            format!(
                "{EMOJI_HP} {}\n{EMOJI_MP} {}",
                bar(view.player.current_hp, view.player.max_hp),
                bar(view.player.current_mp, view.player.max_mp)
            ),
            true,
        )
        .footer(CreateEmbedFooter::new(format!("Turn {}", view.turn)))
        .color(color);
    if !statuses.is_empty() {
        embed = embed.field("Status", statuses.join(" · "), false);
    }
    if !log.is_empty() {
        embed = embed.field("Log", clip(log), false);
    }
    embed
}

pub fn battle_components(view: &BattleView) -> Vec<CreateActionRow> {
    let mut rows = vec![CreateActionRow::Buttons(vec![
        Btn::danger(ids::BATTLE_ATTACK, "Attack"),
        Btn::primary(ids::BATTLE_DEFEND, "Defend"),
        Btn::secondary(ids::BATTLE_FLEE, "Flee").disabled(!view.flee_allowed),
    ])];
    let skills = view
        .skills
        .iter()
        .map(|(id, name, mp)| {
            Btn::success(&ids::skill_button(id), &format!("{name} ({mp})"))
                .disabled(view.player.current_mp < *mp)
        })
        .collect::<Vec<_>>();
    rows.extend(
        skills
            .chunks(BUTTONS_PER_ROW)
            .take(4)
            .map(|chunk| CreateActionRow::Buttons(chunk.to_vec())),
    );
    rows
}

fn story_field(embed: CreateEmbed, story: &StoryOutcome) -> CreateEmbed {
    let mut text = story.text.clone();
    if !story.lines.is_empty() {
        text.push_str("\n\n");
        text.push_str(&story.lines.join("\n"));
    }
    embed.field(format!("📜 {}", story.title), clip(&[text]), false)
}

pub fn choice_view(prompt: &ChoicePrompt) -> (CreateEmbed, Vec<CreateActionRow>) {
    let embed = CreateEmbed::new()
        .title(format!("📜 {}", prompt.title))
        .description(prompt.text.clone())
        .color(COLOR_STORY);
    let buttons = prompt
        .options
        .iter()
        .enumerate()
        .map(|(i, label)| Btn::primary(&ids::choice_button(&prompt.story_id, i), label))
        .collect::<Vec<_>>();
    let rows = buttons
        .chunks(BUTTONS_PER_ROW)
        .map(|chunk| CreateActionRow::Buttons(chunk.to_vec()))
        .collect();
    (embed, rows)
}

pub fn explore_view(outcome: &ExploreOutcome) -> (CreateEmbed, Vec<CreateActionRow>) {
    if let Some(prompt) = &outcome.choice {
        let (embed, rows) = choice_view(prompt);
        let embed = embed.footer(CreateEmbedFooter::new(format!("{}m", outcome.distance)));
        return (embed, rows);
    }
    let header = format!(
        "{EMOJI_ROAD} {}m → {}m",
        outcome.previous_distance, outcome.distance
    );
    if let Some(view) = &outcome.battle {
        let mut embed = battle_embed(view, &outcome.lines).description(header);
        if let Some(story) = &outcome.story {
            embed = story_field(embed, story);
        }
        return (embed, battle_components(view));
    }
    let color = match outcome.kind() {
        EventKind::Story => COLOR_STORY,
        EventKind::TrapChest => crate::ui::style::COLOR_ALERT,
        _ => COLOR_ROAD,
    };
    let mut embed = CreateEmbed::new()
        .title("On the Road")
        .description(header)
        .field("Vitals", vitals(&outcome.record), true)
        .field(format!("{EMOJI_COIN} Gold"), outcome.record.gold.to_string(), true)
        .color(color);
    if !outcome.lines.is_empty() {
        embed = embed.field("Events", clip(&outcome.lines), false);
    }
    if let Some(story) = &outcome.story {
        embed = story_field(embed, story);
    }
    (embed, vec![road_row()])
}

pub fn turn_view(report: &TurnReport) -> (CreateEmbed, Vec<CreateActionRow>) {
    let log = report.log_lines();
    if let Some(view) = &report.battle {
        return (battle_embed(view, &log), battle_components(view));
    }
    let (title, color) = match report.outcome {
        Some(Terminal::Win) => (format!("Victory over {}", report.enemy_name), COLOR_ROAD),
        Some(Terminal::Lose) => (format!("Defeated by {}", report.enemy_name), COLOR_BATTLE),
        Some(Terminal::Flee) => ("You escaped".to_string(), COLOR_ROAD),
        Some(Terminal::Timeout) | None => ("The battle is over".to_string(), COLOR_BATTLE),
    };
    let mut embed = CreateEmbed::new()
        .title(title)
        .field("Log", clip(&log), false)
        .field("Vitals", vitals(&report.record), true)
        .field(format!("{EMOJI_COIN} Gold"), report.record.gold.to_string(), true)
        .color(color);
    if let Some(rewards) = &report.rewards {
        embed = embed.field("Rewards", clip(&rewards.lines), false);
    }
    if !report.restart.is_empty() {
        embed = embed.field("Back to the start", clip(&report.restart), false);
    }
    if let Some(story) = &report.follow_up {
        embed = story_field(embed, story);
    }
    (embed, vec![road_row()])
}

pub fn story_outcome_view(outcome: &StoryOutcome) -> (CreateEmbed, Vec<CreateActionRow>) {
    let embed = CreateEmbed::new()
        .title(format!("📜 {}", outcome.title))
        .description(format!("You chose: **{}**", outcome.text))
        .field("Result", clip(&outcome.lines), false)
        .color(COLOR_STORY);
    (embed, vec![road_row()])
}

pub fn shop_embed(items: &[&ItemDef], gold: Option<i64>) -> CreateEmbed {
    let lines = items
        .iter()
        .map(|item| {
            let mut stats = Vec::new();
            if item.attack != 0 {
                stats.push(format!("ATK {:+}", item.attack));
            }
            if item.defense != 0 {
                stats.push(format!("DEF {:+}", item.defense));
            }
            if !item.ability_text.is_empty() {
                stats.push(item.ability_text.clone());
            }
            format!(
                "`{}` **{}** · {} {EMOJI_COIN}{}",
                item.id,
                item.name,
                item.price.unwrap_or_default(),
                if stats.is_empty() { String::new() } else { format!("\n  {}", stats.join(", ")) }
            )
        })
        .collect::<Vec<_>>();
    let mut embed = CreateEmbed::new()
        .title("Wayside Merchant")
        .description(clip(&lines))
        .footer(CreateEmbedFooter::new("Use /buy <item id> to purchase."))
        .color(COLOR_SHOP);
    if let Some(gold) = gold {
        embed = embed.field(format!("{EMOJI_COIN} Your gold"), gold.to_string(), true);
    }
    embed
}

pub fn receipt_embed(title: &str, receipt: &Receipt) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(receipt.message.clone())
        .field(format!("{EMOJI_COIN} Gold left"), receipt.record.gold.to_string(), true)
        .color(COLOR_SHOP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_truncates_long_logs() {
        let lines = vec!["x".repeat(600), "y".repeat(600)];
        let out = clip(&lines);
        assert!(out.len() <= FIELD_LIMIT + '…'.len_utf8());
        assert!(out.ends_with('…'));
        assert_eq!(clip(&[]), "-");
    }

    #[test]
    fn next_boss_is_the_following_thousand() {
        assert_eq!(next_boss_at(0), 1000);
        assert_eq!(next_boss_at(999), 1000);
        assert_eq!(next_boss_at(1000), 2000);
    }
}

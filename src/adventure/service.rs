//! Async orchestration of every player-initiated operation.
//!
//! Each operation takes the player's busy lock, loads the record, runs the pure
//! game rules on a copy, and writes the difference back as one patch. Dice are
//! drawn inside short synchronous sections; the dice mutex is never held across
//! an `.await`. A battle session is only replaced once its write succeeded, so a
//! failed write leaves the fight exactly where it was.

use super::actor::Actor;
use super::battle::logic::TurnEvent;
use super::battle::rewards::{self, Rewards};
use super::battle::{
    BattleRegistry, BattleSession, EncounterPolicy, PlayerAction, PlayerState, Terminal,
    TurnContext, ViewHandle, resolve_turn,
};
use super::content::{ContentTables, DropEntry, EnemyTemplate, ItemDef, ItemKind, StoryNode};
use super::dice::Dice;
use super::error::{ActionError, AdventureError};
use super::events::{EventKind, GameEvent, determine_event};
use super::locks::ActorLocks;
use super::story;
use crate::config::GameConfig;
use crate::constants::{
    CHEST_GOLD_MAX, CHEST_GOLD_MIN, MAX_BOSS_STAGE, MAX_UPGRADE_LEVEL, REVIVE_ITEM,
    SHRINE_GOLD_PER_SPECIAL, SPECIAL_INTERVAL, STEP_MAX, STEP_MIN, TRAP_DAMAGE_PERCENT,
    UPGRADE_BASE_COST,
};
use crate::database::models::{EquipSlot, PlayerRecord, RecordPatch};
use crate::database::{PlayerStore, StoreError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of running a story node against a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryOutcome {
    pub story_id: String,
    pub title: String,
    pub text: String,
    /// False when the node's conditions did not hold and its effects were skipped.
    pub applied: bool,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoicePrompt {
    pub story_id: String,
    pub title: String,
    pub text: String,
    pub options: Vec<String>,
}

/// Snapshot of a fight for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleView {
    pub enemy: Actor,
    pub player: Actor,
    pub turn: u32,
    pub boss_stage: Option<u32>,
    pub flee_allowed: bool,
    /// `(id, name, mp_cost)` of every skill the player knows.
    pub skills: Vec<(String, String, i32)>,
    pub burn_turns: i32,
    pub poison_turns: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreOutcome {
    pub previous_distance: i64,
    pub distance: i64,
    pub event: GameEvent,
    pub lines: Vec<String>,
    pub story: Option<StoryOutcome>,
    pub choice: Option<ChoicePrompt>,
    pub battle: Option<BattleView>,
    pub record: PlayerRecord,
}

impl ExploreOutcome {
    pub fn kind(&self) -> EventKind {
        self.event.kind()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub player_name: String,
    pub enemy_name: String,
    pub events: Vec<TurnEvent>,
    pub outcome: Option<Terminal>,
    pub rewards: Option<Rewards>,
    /// Restart summary after a loss.
    pub restart: Vec<String>,
    pub follow_up: Option<StoryOutcome>,
    /// Present while the fight goes on.
    pub battle: Option<BattleView>,
    pub record: PlayerRecord,
}

impl TurnReport {
    pub fn log_lines(&self) -> Vec<String> {
        self.events
            .iter()
            .map(|e| e.describe(&self.player_name, &self.enemy_name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub record: PlayerRecord,
    pub player: Actor,
    pub battle: Option<BattleView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub message: String,
    pub record: PlayerRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredBattle {
    pub user_id: u64,
    pub enemy_name: String,
    pub view: Option<ViewHandle>,
}

type SharedDice = Mutex<Box<dyn Dice + Send>>;
// (battle opened, narration, story played, choice offered)
type ResolvedEvent = (Option<BattleSession>, Vec<String>, Option<StoryOutcome>, Option<ChoicePrompt>);

pub struct AdventureService {
    store: Arc<dyn PlayerStore>,
    content: Arc<ContentTables>,
    config: GameConfig,
    locks: ActorLocks,
    battles: BattleRegistry,
    dice: SharedDice,
}

/// Gold price of the next upgrade level.
pub fn upgrade_cost(current_level: i32) -> i64 {
    UPGRADE_BASE_COST * (current_level as i64 + 1)
}

fn slot_for(kind: ItemKind) -> Option<EquipSlot> {
    match kind {
        ItemKind::Weapon => Some(EquipSlot::Weapon),
        ItemKind::Armor => Some(EquipSlot::Armor),
        ItemKind::Shield => Some(EquipSlot::Shield),
        ItemKind::Consumable | ItemKind::Material => None,
    }
}

/// Runs a linear story node: effects apply only when its conditions hold; the
/// node is marked seen either way.
fn play_story(record: &mut PlayerRecord, node: &StoryNode) -> StoryOutcome {
    let applied = story::evaluate_values(record, &node.conditions);
    let lines = if applied {
        story::apply_in_place(record, &story::parse_effects(&node.effects))
    } else {
        Vec::new()
    };
    record.story_flags.insert(node.id.clone(), true);
    StoryOutcome {
        story_id: node.id.clone(),
        title: node.title.clone(),
        text: node.text.clone(),
        applied,
        lines,
    }
}

fn battle_view(session: &BattleSession, player: &Actor, record: &PlayerRecord, content: &ContentTables) -> BattleView {
    BattleView {
        enemy: session.enemy.clone(),
        player: player.clone(),
        turn: session.turn,
        boss_stage: session.policy.boss_stage(),
        flee_allowed: session.policy.flee_allowed,
        skills: record
            .skills
            .iter()
            .filter_map(|id| content.skill(id).map(|s| (s.id.clone(), s.name.clone(), s.mp_cost)))
            .collect(),
        burn_turns: session.status.burn.map_or(0, |d| d.turns_left),
        poison_turns: session.status.poison.map_or(0, |d| d.turns_left),
    }
}

fn open_battle(user_id: u64, template: &EnemyTemplate, loop_count: u32, policy: EncounterPolicy) -> BattleSession {
    let enemy = template.to_actor(loop_count, policy.is_boss());
    BattleSession::new(user_id, template.id.clone(), enemy, policy)
        .with_rewards(template.gold, template.drops.clone())
}

/// Single d100 walk over the loot table; at most one item.
fn roll_loot<'a>(loot: &'a [DropEntry], dice: &mut dyn Dice) -> Option<&'a DropEntry> {
    if loot.is_empty() {
        return None;
    }
    let roll = dice.roll(1, 100);
    let mut ceiling = 0;
    loot.iter().find(|entry| {
        ceiling += entry.chance.max(0);
        roll <= ceiling
    })
}

impl AdventureService {
    pub fn new(store: Arc<dyn PlayerStore>, content: Arc<ContentTables>, config: GameConfig) -> Self {
        Self {
            store,
            content,
            config,
            locks: ActorLocks::new(),
            battles: BattleRegistry::new(),
            dice: Mutex::new(Box::new(StdRng::from_os_rng())),
        }
    }

    /// Replaces the random source, e.g. with scripted rolls for a replay.
    pub fn with_dice(mut self, dice: impl Dice + Send + 'static) -> Self {
        self.dice = Mutex::new(Box::new(dice));
        self
    }

    pub fn content(&self) -> &ContentTables {
        &self.content
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn battles(&self) -> &BattleRegistry {
        &self.battles
    }

    fn roll<T>(&self, f: impl FnOnce(&mut dyn Dice) -> T) -> T {
        let mut dice = self.dice.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut **dice)
    }

    /// Runs `op` under the player's busy lock and the action timeout.
    async fn guarded<T>(
        &self,
        user_id: u64,
        op: &'static str,
        body: impl Future<Output = Result<T, AdventureError>>,
    ) -> Result<T, AdventureError> {
        self.guarded_or(user_id, op, body, || {}).await
    }

    /// Like `guarded`, running `on_timeout` before the lock is released when `body` is cut off.
    async fn guarded_or<T>(
        &self,
        user_id: u64,
        op: &'static str,
        body: impl Future<Output = Result<T, AdventureError>>,
        on_timeout: impl FnOnce(),
    ) -> Result<T, AdventureError> {
        let Some(_guard) = self.locks.try_acquire(user_id) else {
            debug!(target = "adventure", user_id, op, "rejected: player busy");
            return Err(AdventureError::Busy);
        };
        match tokio::time::timeout(self.config.action_timeout, body).await {
            Ok(result) => {
                if let Err(e) = &result {
                    debug!(target = "adventure", user_id, op, error = %e, "action rejected");
                }
                result
            }
            Err(_) => {
                warn!(target = "adventure", user_id, op, "action timed out");
                on_timeout();
                Err(AdventureError::TimedOut)
            }
        }
    }

    async fn load(&self, user_id: u64) -> Result<PlayerRecord, AdventureError> {
        self.store
            .get_player(user_id)
            .await?
            .ok_or(AdventureError::Invalid(ActionError::NotRegistered))
    }

    async fn save(&self, before: &PlayerRecord, after: &PlayerRecord) -> Result<PlayerRecord, StoreError> {
        let patch = RecordPatch::diff(before, after);
        if patch.is_empty() {
            return Ok(after.clone());
        }
        self.store.update_player(before.user_id, &patch).await
    }

    /// Creates the player's record, or returns the existing one. The flag is true
    /// when a new record was created.
    #[instrument(skip(self, name))]
    pub async fn start(&self, user_id: u64, name: &str) -> Result<(PlayerRecord, bool), AdventureError> {
        self.guarded(user_id, "start", async move {
            if let Some(existing) = self.store.get_player(user_id).await? {
                return Ok((existing, false));
            }
            let record = self
                .store
                .insert_player(&PlayerRecord::new_player(user_id, name))
                .await?;
            info!(target = "adventure", user_id, "new adventurer registered");
            Ok((record, true))
        })
        .await
    }

    pub async fn status(&self, user_id: u64) -> Result<StatusReport, AdventureError> {
        let record = self.load(user_id).await?;
        let player = Actor::from_record(&record, &self.content);
        let battle = self
            .battles
            .get(user_id)
            .map(|s| battle_view(&s, &player, &record, &self.content));
        Ok(StatusReport { record, player, battle })
    }

    /// Walks forward and resolves whatever happens there.
    #[instrument(skip(self))]
    pub async fn explore(&self, user_id: u64) -> Result<ExploreOutcome, AdventureError> {
        self.guarded(user_id, "explore", async move {
            let record = self.load(user_id).await?;
            if self.battles.contains(user_id) {
                return Err(ActionError::InBattle.into());
            }
            let choice_ids = self.content.choice_story_ids();
            let mut next = record.clone();
            let (event, opened, lines, story, choice) = self.roll(|dice| {
                let step = dice.roll(STEP_MIN, STEP_MAX) as i64;
                next.distance = record.distance + step;
                let event = determine_event(
                    next.distance,
                    record.distance,
                    record.loop_count,
                    &record.story_flags,
                    &choice_ids,
                    dice,
                );
                let (opened, lines, story, choice) = self.resolve_event(&event, &mut next, dice);
                (event, opened, lines, story, choice)
            });

            let saved = self.save(&record, &next).await?;
            let battle = opened.map(|session| {
                let player = Actor::from_record(&saved, &self.content);
                let view = battle_view(&session, &player, &saved, &self.content);
                self.battles.put(session);
                view
            });
            info!(
                target = "adventure",
                user_id,
                from = record.distance,
                to = saved.distance,
                event = ?event.kind(),
                "explored"
            );
            Ok(ExploreOutcome {
                previous_distance: record.distance,
                distance: next.distance,
                event,
                lines,
                story,
                choice,
                battle,
                record: saved,
            })
        })
        .await
    }

    fn resolve_event(&self, event: &GameEvent, next: &mut PlayerRecord, dice: &mut dyn Dice) -> ResolvedEvent {
        let content = &*self.content;
        let mut lines = Vec::new();
        match event {
            GameEvent::Boss {
                stage,
                pre_story_id,
                pre_story_seen,
                ..
            } => {
                let story = match content.story(pre_story_id) {
                    Some(node) if !pre_story_seen => Some(play_story(next, node)),
                    _ => None,
                };
                next.story_flags.insert(pre_story_id.clone(), true);
                let template = content.boss(*stage);
                let policy = if *stage as i64 >= MAX_BOSS_STAGE || template.final_boss {
                    EncounterPolicy::final_boss(*stage)
                } else {
                    EncounterPolicy::boss(*stage)
                };
                lines.push(format!("**{}** blocks the road!", template.enemy.name));
                let session = open_battle(next.user_id, &template.enemy, next.loop_count, policy);
                (Some(session), lines, story, None)
            }
            GameEvent::Special { distance } => {
                let gold = SHRINE_GOLD_PER_SPECIAL * (distance / SPECIAL_INTERVAL);
                next.hp = next.max_hp;
                next.mp = next.max_mp;
                next.gold += gold;
                lines.push("A quiet shrine restores your body and spirit.".to_string());
                lines.push(format!("+{gold} gold"));
                (None, lines, None, None)
            }
            GameEvent::Story { story_id, .. } => match content.story(story_id) {
                Some(node) => {
                    let outcome = play_story(next, node);
                    (None, lines, Some(outcome), None)
                }
                None => {
                    next.story_flags.insert(story_id.clone(), true);
                    lines.push("You pass a familiar landmark.".to_string());
                    (None, lines, None, None)
                }
            },
            GameEvent::ChoiceStory { story_id } => match content.story(story_id) {
                Some(node) => {
                    let prompt = ChoicePrompt {
                        story_id: node.id.clone(),
                        title: node.title.clone(),
                        text: node.text.clone(),
                        options: node.choices.iter().map(|c| c.label.clone()).collect(),
                    };
                    (None, lines, None, Some(prompt))
                }
                None => (None, lines, None, None),
            },
            GameEvent::TrapChest => {
                let loss = (next.max_hp * TRAP_DAMAGE_PERCENT / 100).max(1);
                let before = next.hp;
                next.hp = (next.hp - loss).max(1);
                lines.push(format!("The chest was trapped! -{} HP", before - next.hp));
                (None, lines, None, None)
            }
            GameEvent::Chest => {
                let zone = ContentTables::zone_number(next.distance);
                let gold = dice.roll(CHEST_GOLD_MIN as i32, CHEST_GOLD_MAX as i32) as i64 * zone;
                next.gold += gold;
                lines.push(format!("You open a chest: +{gold} gold"));
                let loot = content
                    .zone_for(next.distance)
                    .and_then(|z| roll_loot(&z.loot, dice));
                if let Some(entry) = loot {
                    next.add_item(&entry.item, entry.count);
                    lines.push(format!("Found {} x{}", content.item(&entry.item).name, entry.count));
                }
                (None, lines, None, None)
            }
            GameEvent::Battle => {
                let template = content.pick_enemy(next.distance, dice);
                lines.push(format!("A wild **{}** appears!", template.name));
                let mut session = open_battle(next.user_id, template, next.loop_count, EncounterPolicy::normal());
                if let Some(zone) = content.zone_for(next.distance) {
                    session = session.with_zone(zone.name.clone());
                }
                (Some(session), lines, None, None)
            }
            GameEvent::Nothing => {
                lines.push("The road stretches on quietly.".to_string());
                (None, lines, None, None)
            }
        }
    }

    /// Applies one branch of a pending choice story.
    #[instrument(skip(self))]
    pub async fn choose_story(&self, user_id: u64, story_id: &str, index: usize) -> Result<StoryOutcome, AdventureError> {
        self.guarded(user_id, "choose_story", async move {
            let record = self.load(user_id).await?;
            let node = self
                .content
                .story(story_id)
                .filter(|n| n.is_choice() && !record.flag(&n.id))
                .ok_or(ActionError::UnknownChoice)?;
            let choice = node.choices.get(index).ok_or(ActionError::UnknownChoice)?;
            if !story::evaluate_values(&record, &choice.conditions) {
                return Err(ActionError::ChoiceLocked.into());
            }
            let mut next = record.clone();
            let lines = story::apply_in_place(&mut next, &story::parse_effects(&choice.effects));
            next.story_flags.insert(node.id.clone(), true);
            self.save(&record, &next).await?;
            info!(target = "adventure", user_id, story_id, index, "story choice made");
            Ok(StoryOutcome {
                story_id: node.id.clone(),
                title: node.title.clone(),
                text: choice.label.clone(),
                applied: true,
                lines,
            })
        })
        .await
    }

    pub async fn attack(&self, user_id: u64) -> Result<TurnReport, AdventureError> {
        self.battle_action(user_id, PlayerAction::Attack).await
    }

    pub async fn defend(&self, user_id: u64) -> Result<TurnReport, AdventureError> {
        self.battle_action(user_id, PlayerAction::Defend).await
    }

    pub async fn use_skill(&self, user_id: u64, skill_id: &str) -> Result<TurnReport, AdventureError> {
        self.battle_action(user_id, PlayerAction::UseSkill(skill_id.to_string()))
            .await
    }

    pub async fn flee(&self, user_id: u64) -> Result<TurnReport, AdventureError> {
        self.battle_action(user_id, PlayerAction::Flee).await
    }

    #[instrument(skip(self, action), fields(action = action.label()))]
    pub async fn battle_action(&self, user_id: u64, action: PlayerAction) -> Result<TurnReport, AdventureError> {
        let drop_session = || {
            // The turn may already be committed, so its pre-turn session cannot be replayed.
            if let Some(session) = self.battles.remove(user_id) {
                warn!(
                    target = "adventure",
                    user_id,
                    enemy = %session.enemy.name,
                    "battle dropped after a timed-out turn"
                );
            }
        };
        let turn = async move {
            let record = self.load(user_id).await?;
            let session = self.battles.get(user_id).ok_or(ActionError::NoBattle)?;
            let content = &*self.content;
            let mut next_session = session.clone();
            let mut player = PlayerState {
                actor: Actor::from_record(&record, content),
                skills: record.skills.clone(),
                revive_items: record.item_count(REVIVE_ITEM),
                stunned: record.stunned,
            };
            let ctx = TurnContext {
                damage: &self.config.damage,
                content,
            };

            let mut next = record.clone();
            let (resolution, rewards, restart, follow_up) = self.roll(|dice| {
                let resolution = resolve_turn(&mut next_session, &mut player, &action, &ctx, dice)?;
                next.hp = player.actor.current_hp;
                next.mp = player.actor.current_mp;
                next.stunned = player.stunned;
                next.remove_item(REVIVE_ITEM, resolution.revive_items_used);

                let mut won = None;
                let mut restart = Vec::new();
                let follow_up_id = match resolution.outcome {
                    Some(Terminal::Win) => {
                        won = Some(rewards::apply_win(&mut next, &next_session, content, dice));
                        next.stunned = false;
                        next_session.policy.follow_up_story()
                    }
                    Some(Terminal::Lose) => {
                        restart = rewards::apply_loss(&mut next);
                        Some(format!("death_{}", next.deaths))
                    }
                    Some(Terminal::Flee) => {
                        next.stunned = false;
                        None
                    }
                    _ => None,
                };
                let follow_up = follow_up_id
                    .and_then(|id| content.story(&id))
                    .filter(|node| !next.flag(&node.id))
                    .map(|node| play_story(&mut next, node));
                Ok::<_, ActionError>((resolution, won, restart, follow_up))
            })?;

            let saved = match self.save(&record, &next).await {
                Ok(saved) => saved,
                Err(e) => {
                    warn!(target = "adventure", user_id, error = %e, "turn not saved; battle left as it was");
                    return Err(e.into());
                }
            };

            let battle = if next_session.phase.is_terminal() {
                self.battles.remove(user_id);
                info!(
                    target = "adventure",
                    user_id,
                    enemy = %next_session.enemy.name,
                    outcome = ?resolution.outcome,
                    turns = next_session.turn,
                    "battle finished"
                );
                None
            } else {
                let player = Actor::from_record(&saved, content);
                let view = battle_view(&next_session, &player, &saved, content);
                self.battles.put(next_session.clone());
                Some(view)
            };

            Ok::<_, AdventureError>(TurnReport {
                player_name: saved.name.clone(),
                enemy_name: next_session.enemy.name.clone(),
                events: resolution.events,
                outcome: resolution.outcome,
                rewards,
                restart,
                follow_up,
                battle,
                record: saved,
            })
        };
        self.guarded_or(user_id, "battle_action", turn, drop_session).await
    }

    pub fn shop_items(&self) -> Vec<&ItemDef> {
        self.content.shop_items()
    }

    #[instrument(skip(self))]
    pub async fn buy(&self, user_id: u64, item_id: &str) -> Result<Receipt, AdventureError> {
        self.guarded(user_id, "buy", async move {
            let record = self.load(user_id).await?;
            if !self.content.has_item(item_id) {
                return Err(ActionError::UnknownItem(item_id.to_string()).into());
            }
            let item = self.content.item(item_id);
            let price = item.price.ok_or_else(|| ActionError::NotForSale(item.name.clone()))?;
            if record.gold < price {
                return Err(ActionError::InsufficientGold {
                    need: price,
                    have: record.gold,
                }
                .into());
            }
            let mut next = record.clone();
            next.gold -= price;
            next.add_item(&item.id, 1);
            let saved = self.save(&record, &next).await?;
            info!(target = "adventure", user_id, item = item_id, price, "item bought");
            Ok(Receipt {
                message: format!("Bought **{}** for {price} gold.", item.name),
                record: saved,
            })
        })
        .await
    }

    /// Equips an owned item in the slot its type dictates. The previous piece
    /// goes back to the inventory.
    #[instrument(skip(self))]
    pub async fn equip(&self, user_id: u64, item_id: &str) -> Result<Receipt, AdventureError> {
        self.guarded(user_id, "equip", async move {
            let record = self.load(user_id).await?;
            if self.battles.contains(user_id) {
                return Err(ActionError::InBattle.into());
            }
            if !self.content.has_item(item_id) {
                return Err(ActionError::UnknownItem(item_id.to_string()).into());
            }
            let item = self.content.item(item_id);
            let slot = slot_for(item.kind).ok_or_else(|| ActionError::NotEquippable(item.name.clone()))?;
            if record.item_count(&item.id) == 0 {
                return Err(ActionError::NotOwned(item.name.clone()).into());
            }
            let mut next = record.clone();
            next.remove_item(&item.id, 1);
            if let Some(previous) = next.equipment.set(slot, Some(item.id.clone())) {
                next.add_item(&previous, 1);
            }
            // Upgrades belong to the slot's current piece.
            next.upgrades.remove(&slot);
            let saved = self.save(&record, &next).await?;
            info!(target = "adventure", user_id, item = item_id, %slot, "item equipped");
            Ok(Receipt {
                message: format!("Equipped **{}** as your {slot}.", item.name),
                record: saved,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn upgrade(&self, user_id: u64, slot: EquipSlot) -> Result<Receipt, AdventureError> {
        self.guarded(user_id, "upgrade", async move {
            let record = self.load(user_id).await?;
            if self.battles.contains(user_id) {
                return Err(ActionError::InBattle.into());
            }
            let Some(item_id) = record.equipment.get(slot) else {
                return Err(ActionError::EmptySlot(slot.to_string()).into());
            };
            let level = record.upgrade_level(slot);
            if level >= MAX_UPGRADE_LEVEL {
                return Err(ActionError::MaxUpgrade(slot.to_string()).into());
            }
            let cost = upgrade_cost(level);
            if record.gold < cost {
                return Err(ActionError::InsufficientGold {
                    need: cost,
                    have: record.gold,
                }
                .into());
            }
            let name = self.content.item(item_id).name.clone();
            let mut next = record.clone();
            next.gold -= cost;
            next.upgrades.insert(slot, level + 1);
            let saved = self.save(&record, &next).await?;
            info!(target = "adventure", user_id, %slot, level = level + 1, cost, "equipment upgraded");
            Ok(Receipt {
                message: format!("**{name}** is now +{} ({cost} gold).", level + 1),
                record: saved,
            })
        })
        .await
    }

    /// Remembers where the adapter drew the player's battle.
    pub fn attach_view(&self, user_id: u64, view: ViewHandle) -> bool {
        self.battles.set_view(user_id, view)
    }

    /// Closes battles idle longer than the configured timeout. Players mid-action
    /// are skipped and picked up by a later sweep.
    pub fn sweep_timeouts(&self, now: Instant) -> Vec<ExpiredBattle> {
        let timeout = self.config.battle_timeout;
        let mut expired = Vec::new();
        for user_id in self.battles.idle(timeout, now) {
            let Some(_guard) = self.locks.try_acquire(user_id) else {
                continue;
            };
            if let Some(session) = self.battles.expire(user_id, timeout, now) {
                info!(target = "adventure", user_id, enemy = %session.enemy.name, "battle timed out");
                expired.push(ExpiredBattle {
                    user_id,
                    enemy_name: session.enemy.name.clone(),
                    view: session.view,
                });
            }
        }
        self.locks.prune();
        expired
    }
}

//! Per-encounter rules: reward scaling, whether fleeing is allowed, and what a
//! win does to the player's progress.

use crate::database::models::PlayerRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterKind {
    Normal,
    Boss { stage: u32 },
    FinalBoss { stage: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterPolicy {
    pub kind: EncounterKind,
    /// Gold multiplier applied to the enemy's base gold.
    pub reward_multiplier: i64,
    pub flee_allowed: bool,
}

impl EncounterPolicy {
    pub fn normal() -> Self {
        Self {
            kind: EncounterKind::Normal,
            reward_multiplier: 1,
            flee_allowed: true,
        }
    }

    pub fn boss(stage: u32) -> Self {
        Self {
            kind: EncounterKind::Boss { stage },
            reward_multiplier: 2,
            flee_allowed: false,
        }
    }

    pub fn final_boss(stage: u32) -> Self {
        Self {
            kind: EncounterKind::FinalBoss { stage },
            reward_multiplier: 3,
            flee_allowed: false,
        }
    }

    pub fn boss_stage(&self) -> Option<u32> {
        match self.kind {
            EncounterKind::Normal => None,
            EncounterKind::Boss { stage } | EncounterKind::FinalBoss { stage } => Some(stage),
        }
    }

    pub fn is_boss(&self) -> bool {
        self.boss_stage().is_some()
    }

    /// Story shown after the encounter is won.
    pub fn follow_up_story(&self) -> Option<String> {
        self.boss_stage().map(|stage| format!("boss_post_{stage}"))
    }

    /// Progress changes a win makes beyond gold and drops.
    pub fn on_win(&self, record: &mut PlayerRecord) -> Vec<String> {
        match self.kind {
            EncounterKind::Normal => Vec::new(),
            EncounterKind::Boss { stage } => {
                record.bosses_defeated.insert(stage);
                vec![format!("Stage {stage} boss defeated")]
            }
            EncounterKind::FinalBoss { stage } => {
                record.bosses_defeated.insert(stage);
                record.loop_count += 1;
                record.distance = 0;
                vec![
                    format!("Stage {stage} boss defeated"),
                    format!("The road begins again: loop {}", record.loop_count),
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_boss_starts_a_new_loop() {
        let mut record = PlayerRecord::new_player(1, "Ayla");
        record.distance = 10_000;
        let lines = EncounterPolicy::final_boss(10).on_win(&mut record);
        assert_eq!(record.loop_count, 2);
        assert_eq!(record.distance, 0);
        assert!(record.bosses_defeated.contains(&10));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn normal_fights_can_be_fled() {
        assert!(EncounterPolicy::normal().flee_allowed);
        assert!(!EncounterPolicy::boss(3).flee_allowed);
        assert_eq!(EncounterPolicy::boss(3).follow_up_story().as_deref(), Some("boss_post_3"));
        assert!(EncounterPolicy::normal().follow_up_story().is_none());
    }
}

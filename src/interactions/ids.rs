//! Centralized custom_id string constants for interaction components.
//! Consolidating here reduces typos between the renderers and the handlers.

// Battle actions
pub const BATTLE_ATTACK: &str = "battle_attack";
pub const BATTLE_DEFEND: &str = "battle_defend";
pub const BATTLE_FLEE: &str = "battle_flee";
pub const BATTLE_SKILL_PREFIX: &str = "battle_skill_"; // followed by skill id

// Road
pub const ROAD_EXPLORE: &str = "road_explore";
pub const ROAD_STATUS: &str = "road_status";

// Story choices
pub const STORY_CHOICE_PREFIX: &str = "story_choice_"; // followed by story id + _ + index

/// The component family is the text before the first underscore.
pub fn family(custom_id: &str) -> &str {
    custom_id.split('_').next().unwrap_or("")
}

pub fn skill_button(skill_id: &str) -> String {
    format!("{BATTLE_SKILL_PREFIX}{skill_id}")
}

pub fn parse_skill(custom_id: &str) -> Option<&str> {
    custom_id
        .strip_prefix(BATTLE_SKILL_PREFIX)
        .filter(|id| !id.is_empty())
}

pub fn choice_button(story_id: &str, index: usize) -> String {
    format!("{STORY_CHOICE_PREFIX}{story_id}_{index}")
}

/// Story ids contain underscores, so the index is taken from the end.
pub fn parse_choice(custom_id: &str) -> Option<(&str, usize)> {
    let rest = custom_id.strip_prefix(STORY_CHOICE_PREFIX)?;
    let (story_id, index) = rest.rsplit_once('_')?;
    if story_id.is_empty() {
        return None;
    }
    Some((story_id, index.parse().ok()?))
}

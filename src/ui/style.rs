//! Central UI style constants and helpers.
use serenity::builder::CreateEmbed;

pub const COLOR_ROAD: u32 = 0x2ECC71; // Green
pub const COLOR_BATTLE: u32 = 0xE67E22; // Orange
pub const COLOR_BOSS: u32 = 0x8E44AD; // Purple
pub const COLOR_STORY: u32 = 0x3498DB; // Blue
pub const COLOR_SHOP: u32 = 0xCD7F32; // Bronze
pub const COLOR_ALERT: u32 = 0xE74C3C; // Red

pub const EMOJI_HP: &str = "❤️";
pub const EMOJI_MP: &str = "🔷";
pub const EMOJI_COIN: &str = "💰";
pub const EMOJI_ROAD: &str = "🧭";

// Button label widths (approx char counts before Discord trimming)
pub const BTN_W_NARROW: usize = 10;
pub const BTN_W_STD: usize = 14;

const BAR_WIDTH: usize = 10;

pub fn stat_pair(current: i32, max: i32) -> String {
    format!("`{}/{}`", current, max)
}

/// Ten-cell gauge, e.g. `▰▰▰▰▱▱▱▱▱▱ 40/100`.
pub fn bar(current: i32, max: i32) -> String {
    let max = max.max(1);
    let filled = ((current.clamp(0, max) as usize) * BAR_WIDTH).div_ceil(max as usize);
    format!(
        "{}{} {}/{}",
        "▰".repeat(filled),
        "▱".repeat(BAR_WIDTH - filled),
        current.max(0),
        max
    )
}

/// Pads a label with up to two trailing spaces so action rows line up.
pub fn pad_label(label: &str, target_min: usize) -> String {
    let len = label.chars().count();
    if len >= target_min {
        return label.to_string();
    }
    format!("{label}{pad}", pad = " ".repeat((target_min - len).min(2)))
}

pub fn pad_std(label: &str) -> String {
    pad_label(label, BTN_W_STD)
}
pub fn pad_narrow(label: &str) -> String {
    pad_label(label, BTN_W_NARROW)
}

/// Convenience builder for an alert/error-styled embed.
pub fn error_embed<T: Into<String>, U: Into<String>>(title: T, description: U) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_ALERT)
}

//! The adventure's slash commands (`/start`, `/explore`, `/status`, `/shop`,
//! `/buy`, `/equip`, `/upgrade`) and the renderers shared with component handlers.

pub mod run;
pub mod ui;

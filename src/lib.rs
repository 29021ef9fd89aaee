//! Glyphtone library - captured frames rendered as a playable glyph grid

pub mod cli;
pub mod frame;
pub mod grid;
pub mod params;
pub mod pitch;
pub mod router;
pub mod tone;

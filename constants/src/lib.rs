//! Shared tuning values for the fly-through engine.

pub mod path_settings;
pub mod playback_settings;

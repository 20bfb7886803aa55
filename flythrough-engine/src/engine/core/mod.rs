//! Application setup and state management.
//!
//! Wires the path pipeline into a Bevy app and mirrors the editor state
//! machines into Bevy `States`.

/// Plugin and headless app construction.
///
/// Registers resources, events and the chained per-frame systems.
pub mod app_setup;

/// Table-driven editor and planner state machines.
///
/// The fly-through table drives Bevy's `FlythroughState` transitions.
pub mod app_state;

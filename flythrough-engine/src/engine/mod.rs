pub mod config;
pub mod core;
pub mod dirty_tracker;
pub mod path;
pub mod search;
pub mod sweeps;

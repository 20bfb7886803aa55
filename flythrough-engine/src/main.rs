//! Headless fly-through path generator entry point.

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use constants::playback_settings::{HEADLESS_FRAME_COUNT, HEADLESS_FRAME_MS};
use flythrough_engine::engine::config::PathingConfig;
use flythrough_engine::engine::core::app_setup::create_app;
use flythrough_engine::engine::core::app_state::FlythroughEvent;
use flythrough_engine::engine::path::PathState;
use flythrough_engine::engine::sweeps::SweepSet;
use flythrough_engine::tools::session::{LoadSession, PathSession};
use std::env;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if !(2..=4).contains(&args.len()) {
        eprintln!(
            "Usage: {} <sweeps.json> [config.json] [session.json]",
            args[0]
        );
        std::process::exit(1);
    }

    let sweeps = SweepSet::from_json_file(Path::new(&args[1]))?;
    let config = match args.get(2) {
        Some(path) => PathingConfig::from_json_file(Path::new(path))?,
        None => PathingConfig::default(),
    };
    let session = args
        .get(3)
        .map(|path| PathSession::from_json_file(Path::new(path)))
        .transpose()?;

    let sweep_count = sweeps.len();
    let mut app = create_app(sweeps, config);
    app.add_plugins(LogPlugin::default())
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
            HEADLESS_FRAME_MS,
        )));
    info!("Planning over {} aligned sweeps", sweep_count);

    match session {
        Some(session) => {
            app.world_mut().send_event(LoadSession(session));
        }
        None => {
            app.world_mut().send_event(FlythroughEvent::InitializeEditing);
        }
    }

    for _ in 0..HEADLESS_FRAME_COUNT {
        app.update();
    }

    let path_state = app.world().resource::<PathState>();
    if !path_state.valid_path {
        warn!("No valid path after {} frames", HEADLESS_FRAME_COUNT);
    }
    info!(
        "Path: {} points ({:?})",
        path_state.path_length, path_state.source
    );
    for point in &path_state.path {
        info!("  {:>8} {:?}", point.id, point.position);
    }

    if let Some(session) = PathSession::capture(app.world()) {
        println!("{}", session.to_json()?);
    }

    Ok(())
}

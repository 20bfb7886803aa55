// Standard library and external crates
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

// Crate engine modules
use crate::engine::config::PathingConfig;
use crate::engine::core::app_state::{
    FlythroughEvent, FlythroughFsm, FlythroughReentered, FlythroughState, drive_flythrough_fsm,
};
use crate::engine::path::{PathState, PathUpdated};
use crate::engine::search::{SweepSearch, sync_neighbor_search};
use crate::engine::sweeps::SweepSet;

// Crate tools modules
use crate::tools::{
    anchor_path_builder::{
        AnchorPathBuilder, refresh_anchor_path, refresh_anchor_path_on_reentry, update_anchor_path,
    },
    anchors::{MoveAnchor, apply_anchor_moves, initialize_anchors},
    history::{EditHistory, HistoryRequest, apply_history_requests, log_history_change},
    nearest_sweep::{invalidate_on_sweep_change, update_nearest_sweeps},
    path_builder::update_filter_path_builders,
    playback::{Playback, advance_playback, start_playback, stop_playback},
    session::{LoadSession, apply_loaded_session},
};

/// Fly-through editor pipeline.
///
/// Reads `PathingConfig` and `SweepSet` when built, so insert both first.
/// Without a `SweepSearch` resource the breadth-first `NeighborSearch` is
/// used, rebuilt whenever `SweepSet` is replaced.
pub struct SweepPathPlugin;

impl Plugin for SweepPathPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<StatesPlugin>() {
            app.add_plugins(StatesPlugin);
        }

        app.init_state::<FlythroughState>()
            .init_resource::<PathingConfig>()
            .init_resource::<SweepSet>()
            .init_resource::<PathState>()
            .init_resource::<FlythroughFsm>()
            .init_resource::<AnchorPathBuilder>()
            .init_resource::<Playback>()
            .add_event::<FlythroughEvent>()
            .add_event::<FlythroughReentered>()
            .add_event::<PathUpdated>()
            .add_event::<MoveAnchor>()
            .add_event::<HistoryRequest>()
            .add_event::<LoadSession>();

        if !app.world().contains_resource::<EditHistory>() {
            let mut history = EditHistory::default();
            history.0.on_history_change(Box::new(log_history_change));
            app.insert_resource(history);
        }

        if !app.world().contains_resource::<SweepSearch>() {
            let sweeps = app.world().resource::<SweepSet>().clone();
            app.insert_resource(SweepSearch::neighbors(sweeps));
        }

        app.add_systems(OnEnter(FlythroughState::Initializing), initialize_anchors)
            .add_systems(OnEnter(FlythroughState::Editing), refresh_anchor_path)
            .add_systems(OnEnter(FlythroughState::Previewing), start_playback)
            .add_systems(OnExit(FlythroughState::Previewing), stop_playback)
            .add_systems(
                Update,
                (
                    apply_loaded_session,
                    drive_flythrough_fsm,
                    refresh_anchor_path_on_reentry,
                    (apply_anchor_moves, apply_history_requests)
                        .run_if(in_state(FlythroughState::Editing)),
                    (
                        sync_neighbor_search,
                        invalidate_on_sweep_change,
                        update_nearest_sweeps,
                    )
                        .chain(),
                    (update_anchor_path, update_filter_path_builders)
                        .run_if(in_state(FlythroughState::Editing)),
                    advance_playback.run_if(in_state(FlythroughState::Previewing)),
                )
                    .chain(),
            );
    }
}

/// Headless app over `sweeps`: minimal plugins plus the editor pipeline.
pub fn create_app(sweeps: SweepSet, config: PathingConfig) -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins)
        .add_plugins(StatesPlugin)
        .insert_resource(config)
        .insert_resource(sweeps)
        .add_plugins(SweepPathPlugin);

    app
}

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use flythrough_engine::engine::config::PathingConfig;
use flythrough_engine::engine::core::app_setup::create_app;
use flythrough_engine::engine::core::app_state::{FlythroughEvent, FlythroughState};
use flythrough_engine::engine::path::{PathPoint, PathSource, PathState};
use flythrough_engine::engine::search::{SearchConstraints, SweepSearch};
use flythrough_engine::engine::sweeps::SweepSet;
use flythrough_engine::tools::anchors::{AnchorEntities, AnchorRole, MoveAnchor};
use flythrough_engine::tools::history::HistoryRequest;
use flythrough_engine::tools::path_builder::{FilterPathBuilder, FilterVolume};
use flythrough_engine::tools::playback::{FlythroughCamera, Playback};
use flythrough_engine::tools::session::{LoadSession, PathSession};

const SWEEPS: &str = r#"[
    {"uuid": "a", "position": {"x": 0, "y": 0, "z": 0}, "neighbors": ["b"], "alignmentType": "aligned"},
    {"uuid": "b", "position": {"x": 5, "y": 0, "z": 0}, "neighbors": ["a", "c"], "alignmentType": "aligned"},
    {"uuid": "c", "position": {"x": 10, "y": 0, "z": 0}, "neighbors": ["b", "d"], "alignmentType": "aligned"},
    {"uuid": "d", "position": {"x": 15, "y": 0, "z": 0}, "neighbors": ["c"], "alignmentType": "aligned"},
    {"uuid": "ghost", "position": {"x": 7, "y": 0, "z": 0}, "neighbors": [], "alignmentType": "unaligned"}
]"#;

fn test_app() -> App {
    let sweeps = SweepSet::from_json_str(SWEEPS).unwrap();
    let mut app = create_app(sweeps, PathingConfig::default());
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn state(app: &App) -> FlythroughState {
    *app.world().resource::<State<FlythroughState>>().get()
}

fn path_ids(app: &App) -> Vec<String> {
    app.world()
        .resource::<PathState>()
        .path
        .iter()
        .map(|p| p.id.clone())
        .collect()
}

fn anchor_position(app: &App, role: AnchorRole) -> Vec3 {
    let anchors = app.world().resource::<AnchorEntities>();
    app.world()
        .get::<Transform>(anchors.get(role))
        .unwrap()
        .translation
}

fn editing_app() -> App {
    let mut app = test_app();
    app.world_mut().send_event(FlythroughEvent::InitializeEditing);
    run_frames(&mut app, 10);
    app
}

#[test]
fn initialize_places_anchors_and_builds_path() {
    let app = editing_app();

    assert_eq!(state(&app), FlythroughState::Editing);
    assert_eq!(anchor_position(&app, AnchorRole::Start), Vec3::new(15.0, 0.0, 0.0));
    assert_eq!(anchor_position(&app, AnchorRole::End), Vec3::ZERO);

    let path_state = app.world().resource::<PathState>();
    assert!(path_state.valid_path);
    assert_eq!(path_state.source, PathSource::Search);
    assert_eq!(path_ids(&app), ["0", "d", "c", "b", "a", "1"]);
    assert!(path_ids(&app).iter().all(|id| id != "ghost"));
}

#[test]
fn anchor_moves_are_undoable() {
    let mut app = editing_app();

    app.world_mut().send_event(MoveAnchor {
        role: AnchorRole::Start,
        to: Vec3::new(10.0, 0.0, 1.0),
    });
    run_frames(&mut app, 20);
    assert_eq!(anchor_position(&app, AnchorRole::Start), Vec3::new(10.0, 0.0, 1.0));
    assert_eq!(path_ids(&app), ["0", "c", "b", "a", "1"]);

    app.world_mut().send_event(HistoryRequest::Undo);
    run_frames(&mut app, 20);
    assert_eq!(anchor_position(&app, AnchorRole::Start), Vec3::new(15.0, 0.0, 0.0));
    assert_eq!(path_ids(&app), ["0", "d", "c", "b", "a", "1"]);

    app.world_mut().send_event(HistoryRequest::Redo);
    run_frames(&mut app, 2);
    assert_eq!(anchor_position(&app, AnchorRole::Start), Vec3::new(10.0, 0.0, 1.0));
}

#[test]
fn preview_plays_and_returns_to_editing() {
    let mut app = editing_app();

    app.world_mut().send_event(FlythroughEvent::StartPreview);
    run_frames(&mut app, 3);
    assert_eq!(state(&app), FlythroughState::Previewing);
    let duration = app.world().resource::<Playback>().plan().unwrap().duration();
    assert!((duration - 1.5).abs() < 1e-5);

    let mut cameras = app
        .world_mut()
        .query_filtered::<&Transform, With<FlythroughCamera>>();
    assert_eq!(cameras.iter(app.world()).count(), 1);

    // 15 m at 10 m/s, plus the transitions.
    run_frames(&mut app, 25);
    assert_eq!(state(&app), FlythroughState::Editing);
    assert!(!app.world().resource::<Playback>().is_playing());
}

#[test]
fn preview_of_invalid_path_bounces_back() {
    let sweeps = SweepSet::from_json_str("[]").unwrap();
    let mut app = create_app(sweeps, PathingConfig::default());
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app.insert_resource(SweepSearch::new(
        |_: &str, _: &str, _: &SearchConstraints| -> Option<Vec<PathPoint>> { None },
    ));
    app.world_mut().send_event(FlythroughEvent::InitializeEditing);
    run_frames(&mut app, 10);

    // Both anchors sit at the origin; the path is still the two anchor points.
    assert_eq!(path_ids(&app), ["0", "1"]);
    app.world_mut().resource_mut::<PathState>().clear();

    app.world_mut().send_event(FlythroughEvent::StartPreview);
    run_frames(&mut app, 6);
    assert_eq!(state(&app), FlythroughState::Editing);
}

#[test]
fn injected_search_fills_the_interior() {
    let mut app = test_app();
    app.insert_resource(SweepSearch::new(
        |from: &str, to: &str, _: &SearchConstraints| -> Option<Vec<PathPoint>> {
            (from == "d" && to == "a").then(|| {
                vec![PathPoint {
                    id: "b".to_string(),
                    position: Vec3::new(5.0, 0.0, 0.0),
                    floor_position: None,
                }]
            })
        },
    ));
    app.world_mut().send_event(FlythroughEvent::InitializeEditing);
    run_frames(&mut app, 10);

    assert_eq!(path_ids(&app), ["0", "b", "1"]);
}

#[test]
fn loaded_session_restores_anchors() {
    let mut app = editing_app();
    let saved = PathSession::capture(app.world()).unwrap();
    assert_eq!(saved.start(), Vec3::new(15.0, 0.0, 0.0));

    let session = PathSession::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(11.0, 0.0, 0.0));
    app.world_mut().send_event(LoadSession(session));
    run_frames(&mut app, 20);

    assert_eq!(state(&app), FlythroughState::Editing);
    assert_eq!(anchor_position(&app, AnchorRole::Start), Vec3::new(4.0, 0.0, 0.0));
    assert_eq!(anchor_position(&app, AnchorRole::End), Vec3::new(11.0, 0.0, 0.0));
    assert_eq!(path_ids(&app), ["0", "b", "c", "1"]);
}

#[test]
fn reloading_the_current_session_rebuilds_path() {
    let mut app = editing_app();
    let before = path_ids(&app);
    let saved = PathSession::capture(app.world()).unwrap();

    app.world_mut().send_event(LoadSession(saved));
    run_frames(&mut app, 20);
    assert_eq!(state(&app), FlythroughState::Editing);
    assert!(app.world().resource::<PathState>().valid_path);
    assert_eq!(path_ids(&app), before);
}

#[test]
fn reinitializing_while_editing_rebuilds_path() {
    let mut app = editing_app();
    app.world_mut().resource_mut::<PathState>().clear();

    app.world_mut().send_event(FlythroughEvent::InitializeEditing);
    run_frames(&mut app, 20);

    assert_eq!(state(&app), FlythroughState::Editing);
    assert_eq!(path_ids(&app), ["0", "d", "c", "b", "a", "1"]);
}

#[test]
fn replaced_sweep_set_is_searched() {
    let mut app = editing_app();
    let replacement = SweepSet::from_json_str(
        r#"[
            {"uuid": "p", "position": {"x": 0, "y": 0, "z": 0}, "neighbors": ["q"], "alignmentType": "aligned"},
            {"uuid": "q", "position": {"x": 5, "y": 0, "z": 0}, "neighbors": ["p", "r"], "alignmentType": "aligned"},
            {"uuid": "r", "position": {"x": 15, "y": 0, "z": 0}, "neighbors": ["q"], "alignmentType": "aligned"}
        ]"#,
    )
    .unwrap();
    app.insert_resource(replacement);
    run_frames(&mut app, 20);

    let path_state = app.world().resource::<PathState>();
    assert_eq!(path_state.source, PathSource::Search);
    assert_eq!(path_ids(&app), ["0", "r", "q", "p", "1"]);
}

#[test]
fn session_loaded_before_editing_survives_initialization() {
    let mut app = test_app();
    let session = PathSession::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(14.0, 0.0, 0.0));
    app.world_mut().send_event(LoadSession(session));
    run_frames(&mut app, 10);

    assert_eq!(state(&app), FlythroughState::Editing);
    assert_eq!(anchor_position(&app, AnchorRole::Start), Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(path_ids(&app), ["0", "a", "b", "c", "d", "1"]);
}

#[test]
fn filter_builder_orders_sweeps_in_region() {
    let mut app = editing_app();
    let filter = app
        .world_mut()
        .spawn((
            Transform::from_xyz(7.5, 0.0, 0.0),
            FilterVolume {
                half_extents: Vec3::new(5.0, 1.0, 1.0),
            },
        ))
        .id();
    let builder = app
        .world_mut()
        .spawn(FilterPathBuilder::new(&PathingConfig::default(), Some(filter)))
        .id();
    run_frames(&mut app, 3);

    let output = app
        .world()
        .get::<FilterPathBuilder>(builder)
        .unwrap()
        .builder()
        .output()
        .clone();
    // b and c are inside; two candidates skip the search.
    let ids: Vec<&str> = output.path.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["b", "c"]);
    assert_eq!(output.source, PathSource::Candidates);
    // The anchor path stays the published one.
    assert_eq!(path_ids(&app), ["0", "d", "c", "b", "a", "1"]);
}

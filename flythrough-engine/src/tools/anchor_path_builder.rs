use bevy::prelude::*;

use crate::engine::config::PathingConfig;
use crate::engine::core::app_state::{FlythroughReentered, FlythroughState};
use crate::engine::dirty_tracker::DirtyTracker;
use crate::engine::path::{PathPoint, PathSource, PathState, PathUpdated};
use crate::engine::search::{GraphSearch, SearchConstraints, SweepSearch};
use crate::engine::sweeps::Sweep;
use crate::tools::anchors::{AnchorRole, PathAnchor};
use crate::tools::nearest_sweep::NearestSweep;

/// One end of an anchored path: where the user put it, and the sweep
/// closest to that spot.
#[derive(Debug, Clone, Copy)]
pub struct AnchorInput<'a> {
    pub position: Vec3,
    pub nearest: Option<&'a Sweep>,
}

/// Path between a start and an end anchor.
///
/// The published path always begins at the exact start anchor position and
/// ends at the exact end anchor position. Between them go the sweeps the
/// graph search finds between the sweeps nearest to each anchor.
#[derive(Resource, Debug)]
pub struct AnchorPathBuilder {
    inputs_changed: bool,
    time: f32,
    next_valid_update: f32,
    cooldown: f32,
    start_tracker: DirtyTracker<Vec3>,
    end_tracker: DirtyTracker<Vec3>,
    nearest_ids: (Option<String>, Option<String>),
    constraints: SearchConstraints,
    output: PathState,
}

impl AnchorPathBuilder {
    pub fn new(config: &PathingConfig) -> Self {
        let tracker = || {
            DirtyTracker::new(
                config.anchor_check_interval_ms,
                |a: &Vec3, b: &Vec3| a == b,
                || Vec3::ZERO,
                |from, to| *to = *from,
            )
        };
        Self {
            inputs_changed: true,
            time: 0.0,
            next_valid_update: 0.0,
            cooldown: config.rebuild_cooldown_ms,
            start_tracker: tracker(),
            end_tracker: tracker(),
            nearest_ids: (None, None),
            constraints: config.search,
            output: PathState::default(),
        }
    }

    pub fn mark_inputs_changed(&mut self) {
        self.inputs_changed = true;
    }

    pub fn output(&self) -> &PathState {
        &self.output
    }

    /// Advance by `delta` ms. Returns `true` when a new path was published.
    pub fn on_tick(
        &mut self,
        delta: f32,
        start: &AnchorInput,
        end: &AnchorInput,
        search: &dyn GraphSearch,
    ) -> bool {
        self.time += delta;
        self.start_tracker.on_tick(delta, &start.position);
        self.end_tracker.on_tick(delta, &end.position);

        let nearest_ids = (
            start.nearest.map(|s| s.id.clone()),
            end.nearest.map(|s| s.id.clone()),
        );
        if nearest_ids != self.nearest_ids {
            self.nearest_ids = nearest_ids;
            self.inputs_changed = true;
        }

        let stale =
            self.inputs_changed || self.start_tracker.dirty() || self.end_tracker.dirty();
        if !stale || self.time <= self.next_valid_update {
            return false;
        }

        self.next_valid_update = self.time + self.cooldown;
        self.inputs_changed = false;
        self.start_tracker.update(&start.position);
        self.end_tracker.update(&end.position);

        let (interior, source) = match (start.nearest, end.nearest) {
            (Some(from), Some(to)) => match search.find_path(&from.id, &to.id, &self.constraints) {
                Some(route) if !route.is_empty() => (route, PathSource::Search),
                _ => {
                    warn!("No sweep route from {} to {}; linking anchors directly", from.id, to.id);
                    (Vec::new(), PathSource::SearchFailed)
                }
            },
            _ => (Vec::new(), PathSource::Candidates),
        };

        let mut path = Vec::with_capacity(interior.len() + 2);
        path.push(PathPoint::start(start.position));
        path.extend(interior);
        path.push(PathPoint::end(end.position));

        self.output = PathState::publish(path, source);
        debug!(
            "Anchor path rebuilt: {} points ({:?})",
            self.output.path_length, self.output.source
        );
        true
    }
}

impl FromWorld for AnchorPathBuilder {
    fn from_world(world: &mut World) -> Self {
        let config = world.get_resource::<PathingConfig>().cloned().unwrap_or_default();
        Self::new(&config)
    }
}

pub fn update_anchor_path(
    time: Res<Time>,
    search: Res<SweepSearch>,
    anchors: Query<(&PathAnchor, &Transform, &NearestSweep)>,
    mut builder: ResMut<AnchorPathBuilder>,
    mut path_state: ResMut<PathState>,
    mut path_events: EventWriter<PathUpdated>,
) {
    let mut start = None;
    let mut end = None;
    for (anchor, transform, nearest) in &anchors {
        let input = AnchorInput {
            position: transform.translation,
            nearest: nearest.sweep(),
        };
        match anchor.role {
            AnchorRole::Start => start = Some(input),
            AnchorRole::End => end = Some(input),
        }
    }
    let (Some(start), Some(end)) = (start, end) else {
        return;
    };

    let delta = time.delta_secs() * 1000.0;
    if builder.on_tick(delta, &start, &end, search.get()) {
        *path_state = builder.output().clone();
        path_events.write(PathUpdated {
            path_length: path_state.path_length,
            valid_path: path_state.valid_path,
        });
    }
}

/// Rebuild as soon as editing starts.
pub fn refresh_anchor_path(mut builder: ResMut<AnchorPathBuilder>) {
    builder.mark_inputs_changed();
}

/// Rebuild when editing restarts without leaving the state.
pub fn refresh_anchor_path_on_reentry(
    mut reentered: EventReader<FlythroughReentered>,
    mut builder: ResMut<AnchorPathBuilder>,
) {
    if reentered
        .read()
        .any(|FlythroughReentered(state)| *state == FlythroughState::Editing)
    {
        builder.mark_inputs_changed();
    }
}

use bevy::prelude::*;
use std::cmp::Ordering;

use crate::engine::config::PathingConfig;
use crate::engine::dirty_tracker::DirtyTracker;
use crate::engine::path::{PathPoint, PathSource, PathState};
use crate::engine::search::{GraphSearch, SearchConstraints, SweepSearch};
use crate::engine::sweeps::{Sweep, SweepSet};

/// Oriented box selecting which sweeps a path may use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterRegion {
    /// Local to world transform of the region.
    pub world: Mat4,
    pub local_min: Vec3,
    pub local_max: Vec3,
}

impl FilterRegion {
    /// Box of `half_extents` centred on the origin of `transform`.
    pub fn from_transform(transform: &Transform, half_extents: Vec3) -> Self {
        Self {
            world: transform.compute_matrix(),
            local_min: -half_extents,
            local_max: half_extents,
        }
    }

    /// Direction the region faces: its world +Z axis.
    pub fn forward(&self) -> Vec3 {
        self.world.z_axis.truncate().normalize_or_zero()
    }
}

/// Forward used to order candidates when no region is set.
pub const DEFAULT_FORWARD: Vec3 = Vec3::NEG_Z;

/// Sweeps inside `filter` (all sweeps without one), as path points.
pub fn select_candidates(sweeps: &[Sweep], filter: Option<&FilterRegion>) -> Vec<PathPoint> {
    let Some(filter) = filter else {
        return sweeps.iter().map(PathPoint::from_sweep).collect();
    };

    let to_local = filter.world.inverse();
    sweeps
        .iter()
        .filter(|sweep| {
            let local = to_local.transform_point3(sweep.position);
            local.cmpge(filter.local_min).all() && local.cmple(filter.local_max).all()
        })
        .map(PathPoint::from_sweep)
        .collect()
}

/// Stable sort by projection onto `forward`, ascending.
pub fn order_candidates(candidates: &mut [PathPoint], forward: Vec3) {
    candidates.sort_by(|a, b| {
        let a_dot = forward.dot(a.position);
        let b_dot = forward.dot(b.position);
        a_dot.partial_cmp(&b_dot).unwrap_or(Ordering::Equal)
    });
}

/// Path through the sweeps inside a filter region, ordered along the
/// direction the region faces.
///
/// Recomputation is gated on the region moving (or inputs being replaced)
/// and throttled to one rebuild per cooldown window.
#[derive(Debug)]
pub struct PathBuilder {
    inputs_changed: bool,
    time: f32,
    next_valid_update: f32,
    cooldown: f32,
    matrix_tracker: DirtyTracker<Mat4>,
    constraints: SearchConstraints,
    output: PathState,
}

impl PathBuilder {
    pub fn new(config: &PathingConfig) -> Self {
        Self {
            inputs_changed: true,
            time: 0.0,
            next_valid_update: 0.0,
            cooldown: config.rebuild_cooldown_ms,
            matrix_tracker: DirtyTracker::new(
                config.filter_check_interval_ms,
                |a, b| a == b,
                || Mat4::IDENTITY,
                |from, to| *to = *from,
            ),
            constraints: config.search,
            output: PathState::default(),
        }
    }

    /// The filter was set or replaced; rebuild at the next opportunity.
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
        filter: Option<&FilterRegion>,
        sweeps: &[Sweep],
        search: &dyn GraphSearch,
    ) -> bool {
        self.time += delta;
        let matrix = filter.map_or(Mat4::IDENTITY, |f| f.world);
        self.matrix_tracker.on_tick(delta, &matrix);

        let stale = self.inputs_changed || self.matrix_tracker.dirty();
        if !stale || self.time <= self.next_valid_update {
            return false;
        }

        self.next_valid_update = self.time + self.cooldown;
        self.inputs_changed = false;
        self.matrix_tracker.update(&matrix);

        let mut candidates = select_candidates(sweeps, filter);
        let forward = filter.map_or(DEFAULT_FORWARD, FilterRegion::forward);
        order_candidates(&mut candidates, forward);

        let (path, source) = self.assemble(candidates, search);
        self.output = PathState::publish(path, source);
        debug!(
            "Filter path rebuilt: {} points ({:?})",
            self.output.path_length, self.output.source
        );
        true
    }

    fn assemble(
        &self,
        candidates: Vec<PathPoint>,
        search: &dyn GraphSearch,
    ) -> (Vec<PathPoint>, PathSource) {
        let (Some(first), Some(last)) = (candidates.first(), candidates.last()) else {
            return (candidates, PathSource::Candidates);
        };
        if candidates.len() <= 2 {
            return (candidates, PathSource::Candidates);
        }

        match search.find_path(&first.id, &last.id, &self.constraints) {
            Some(path) if !path.is_empty() => (path, PathSource::Search),
            _ => {
                warn!(
                    "No sweep route from {} to {}; using {} ordered candidates",
                    first.id,
                    last.id,
                    candidates.len()
                );
                (candidates, PathSource::SearchFailed)
            }
        }
    }
}

/// Marks an entity as a filter region of `half_extents` around its transform.
#[derive(Component, Debug, Clone, Copy)]
pub struct FilterVolume {
    pub half_extents: Vec3,
}

/// Filter-region path builder attached to an entity.
#[derive(Component, Debug)]
pub struct FilterPathBuilder {
    builder: PathBuilder,
    filter: Option<Entity>,
}

impl FilterPathBuilder {
    pub fn new(config: &PathingConfig, filter: Option<Entity>) -> Self {
        Self {
            builder: PathBuilder::new(config),
            filter,
        }
    }

    pub fn set_filter(&mut self, filter: Option<Entity>) {
        self.filter = filter;
        self.builder.mark_inputs_changed();
    }

    pub fn builder(&self) -> &PathBuilder {
        &self.builder
    }
}

/// Rebuild every filter path builder. Results stay on the component; the
/// app-wide `PathState` belongs to the anchor builder.
pub fn update_filter_path_builders(
    time: Res<Time>,
    sweeps: Res<SweepSet>,
    search: Res<SweepSearch>,
    filters: Query<(&Transform, &FilterVolume)>,
    mut builders: Query<(Entity, &mut FilterPathBuilder)>,
) {
    let delta = time.delta_secs() * 1000.0;
    for (entity, mut builder) in &mut builders {
        let region = builder.filter.and_then(|entity| {
            filters
                .get(entity)
                .ok()
                .map(|(transform, volume)| FilterRegion::from_transform(transform, volume.half_extents))
        });

        if builder
            .builder
            .on_tick(delta, region.as_ref(), sweeps.as_slice(), search.get())
        {
            debug!(
                "Filter path {} rebuilt: {} points",
                entity,
                builder.builder.output().path_length
            );
        }
    }
}

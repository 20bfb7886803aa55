use bevy::prelude::*;

use crate::engine::config::PathingConfig;
use crate::engine::dirty_tracker::DirtyTracker;
use crate::engine::sweeps::{Sweep, SweepSet};

/// Tracks which sweep is closest to a moving reference point.
///
/// Attached to anchor entities; the anchor path builder reads it to pick the
/// graph entry and exit sweeps.
#[derive(Component, Debug)]
pub struct NearestSweep {
    tracker: DirtyTracker<Vec3>,
    needs_scan: bool,
    sweep: Option<Sweep>,
}

impl NearestSweep {
    pub fn new(interval: f32) -> Self {
        Self {
            tracker: DirtyTracker::new(interval, |a, b| a == b, || Vec3::ZERO, |from, to| *to = *from),
            needs_scan: true,
            sweep: None,
        }
    }

    /// Advance by `delta` ms. Rescans when the position has moved since the
    /// last scan, and once after construction. Returns `true` on a rescan.
    pub fn on_tick(&mut self, delta: f32, position: Vec3, sweeps: &[Sweep]) -> bool {
        self.tracker.on_tick(delta, &position);

        if !self.needs_scan && !self.tracker.dirty() {
            return false;
        }
        self.needs_scan = false;
        self.tracker.update(&position);

        self.sweep = nearest_sweep(position, sweeps).cloned();
        true
    }

    /// Force a rescan on the next tick, e.g. after the sweep set changed.
    pub fn invalidate(&mut self) {
        self.needs_scan = true;
    }

    pub fn sweep(&self) -> Option<&Sweep> {
        self.sweep.as_ref()
    }
}

impl Default for NearestSweep {
    fn default() -> Self {
        Self::new(PathingConfig::default().nearest_sweep_interval_ms)
    }
}

/// Linear scan for the sweep with minimum squared distance to `position`.
/// The first sweep wins ties.
pub fn nearest_sweep(position: Vec3, sweeps: &[Sweep]) -> Option<&Sweep> {
    let mut nearest: Option<(&Sweep, f32)> = None;
    for sweep in sweeps {
        let distance_squared = position.distance_squared(sweep.position);
        if nearest.is_none_or(|(_, best)| distance_squared < best) {
            nearest = Some((sweep, distance_squared));
        }
    }
    nearest.map(|(sweep, _)| sweep)
}

pub fn update_nearest_sweeps(
    time: Res<Time>,
    sweeps: Res<SweepSet>,
    mut trackers: Query<(&Transform, &mut NearestSweep)>,
) {
    let delta = time.delta_secs() * 1000.0;
    for (transform, mut nearest) in &mut trackers {
        if nearest.on_tick(delta, transform.translation, sweeps.as_slice()) {
            debug!(
                "Nearest sweep at {:?}: {:?}",
                transform.translation,
                nearest.sweep().map(|s| s.id.as_str())
            );
        }
    }
}

/// Rescan every tracker when the sweep set resource is replaced.
pub fn invalidate_on_sweep_change(
    sweeps: Res<SweepSet>,
    mut trackers: Query<&mut NearestSweep>,
) {
    if !sweeps.is_changed() {
        return;
    }
    for mut nearest in &mut trackers {
        nearest.invalidate();
    }
}

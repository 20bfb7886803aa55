use bevy::prelude::*;
use thiserror::Error;

use crate::engine::config::PathingConfig;
use crate::engine::core::app_state::FlythroughEvent;
use crate::engine::path::{PathState, polyline_length};

/// Distance ahead along the path the camera looks at (metres).
const LOOK_AHEAD: f32 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum PlaybackError {
    #[error("a fly-through needs at least two points, got {0}")]
    NotEnoughPoints(usize),
    #[error("playback speed must be positive, got {0}")]
    InvalidSpeed(f32),
}

/// Constant-speed traversal of a path polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct FlythroughPlan {
    points: Vec<Vec3>,
    /// Distance from the first point to each point.
    cumulative: Vec<f32>,
    length: f32,
    duration: f32,
}

impl FlythroughPlan {
    pub fn new(points: Vec<Vec3>, speed: f32) -> Result<Self, PlaybackError> {
        if points.len() < 2 {
            return Err(PlaybackError::NotEnoughPoints(points.len()));
        }
        if !(speed > 0.0) {
            return Err(PlaybackError::InvalidSpeed(speed));
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut travelled = 0.0;
        cumulative.push(0.0);
        for segment in points.windows(2) {
            travelled += segment[0].distance(segment[1]);
            cumulative.push(travelled);
        }
        let length = polyline_length(&points);

        Ok(Self {
            points,
            cumulative,
            length,
            duration: length / speed,
        })
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    /// Seconds needed to travel the whole path.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Point `distance` metres along the path, clamped to its ends.
    pub fn sample(&self, distance: f32) -> Vec3 {
        let distance = distance.clamp(0.0, self.length);
        let segment = self
            .cumulative
            .partition_point(|&d| d <= distance)
            .clamp(1, self.points.len() - 1);

        let (from, to) = (self.points[segment - 1], self.points[segment]);
        let span = self.cumulative[segment] - self.cumulative[segment - 1];
        if span <= f32::EPSILON {
            return to;
        }
        from.lerp(to, (distance - self.cumulative[segment - 1]) / span)
    }

    /// Position after `elapsed` seconds of playback.
    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        if self.duration <= 0.0 {
            return self.points[self.points.len() - 1];
        }
        self.sample(self.length * (elapsed / self.duration))
    }

    pub fn finished(&self, elapsed: f32) -> bool {
        elapsed > self.duration
    }
}

/// Active fly-through, if any.
#[derive(Resource, Debug, Default)]
pub struct Playback {
    plan: Option<FlythroughPlan>,
    elapsed: f32,
}

impl Playback {
    pub fn plan(&self) -> Option<&FlythroughPlan> {
        self.plan.as_ref()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_playing(&self) -> bool {
        self.plan.is_some()
    }
}

/// Camera driven along the path while previewing.
#[derive(Component, Debug, Default)]
pub struct FlythroughCamera;

pub fn start_playback(
    mut commands: Commands,
    config: Res<PathingConfig>,
    path_state: Res<PathState>,
    cameras: Query<(), With<FlythroughCamera>>,
    mut playback: ResMut<Playback>,
    mut fsm_events: EventWriter<FlythroughEvent>,
) {
    let points: Vec<Vec3> = path_state.positions().collect();
    let plan = match FlythroughPlan::new(points, config.playback_speed) {
        Ok(plan) => plan,
        Err(err) => {
            warn!("Cannot preview path: {}", err);
            fsm_events.write(FlythroughEvent::InitializeEditing);
            return;
        }
    };

    info!(
        "Previewing {:.1} m at {} m/s ({:.2} s)",
        plan.length(),
        config.playback_speed,
        plan.duration()
    );
    if cameras.is_empty() {
        commands.spawn((FlythroughCamera, Transform::from_translation(plan.sample(0.0))));
    }
    *playback = Playback {
        plan: Some(plan),
        elapsed: 0.0,
    };
}

pub fn advance_playback(
    time: Res<Time>,
    mut playback: ResMut<Playback>,
    mut cameras: Query<&mut Transform, With<FlythroughCamera>>,
    mut fsm_events: EventWriter<FlythroughEvent>,
) {
    let Some(plan) = playback.plan.as_ref() else {
        return;
    };
    let elapsed = playback.elapsed + time.delta_secs();

    let position = plan.position_at(elapsed);
    let travelled = plan.length() * (elapsed / plan.duration().max(f32::EPSILON));
    let ahead = plan.sample(travelled + LOOK_AHEAD);
    for mut transform in &mut cameras {
        transform.translation = position;
        if ahead.distance_squared(position) > f32::EPSILON {
            transform.look_at(ahead, Vec3::Y);
        }
    }

    if plan.finished(elapsed) {
        info!("Fly-through finished after {:.2} s", elapsed);
        playback.plan = None;
        fsm_events.write(FlythroughEvent::InitializeEditing);
    }
    playback.elapsed = elapsed;
}

pub fn stop_playback(mut playback: ResMut<Playback>) {
    playback.plan = None;
}

use bevy::prelude::*;
use constants::path_settings::{END_POINT_ID, START_POINT_ID};

use crate::engine::sweeps::Sweep;

/// One point of a fly-through path.
///
/// `id` is a sweep id, or `"0"` / `"1"` for the synthetic points placed at the
/// start and end anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    pub id: String,
    pub position: Vec3,
    pub floor_position: Option<Vec3>,
}

impl PathPoint {
    pub fn from_sweep(sweep: &Sweep) -> Self {
        Self {
            id: sweep.id.clone(),
            position: sweep.position,
            floor_position: None,
        }
    }

    /// Synthetic point at the exact start anchor position.
    pub fn start(position: Vec3) -> Self {
        Self::anchored(START_POINT_ID, position)
    }

    /// Synthetic point at the exact end anchor position.
    pub fn end(position: Vec3) -> Self {
        Self::anchored(END_POINT_ID, position)
    }

    fn anchored(id: &str, position: Vec3) -> Self {
        Self {
            id: id.to_string(),
            position,
            floor_position: Some(position),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.id == START_POINT_ID || self.id == END_POINT_ID
    }
}

/// Where the points of a published path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSource {
    #[default]
    None,
    /// Too few candidates for a search; candidates used as-is.
    Candidates,
    /// Sweep graph search result.
    Search,
    /// Search came back empty and the builder fell back.
    SearchFailed,
}

/// Published path output shared by builders and consumers.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct PathState {
    pub path: Vec<PathPoint>,
    pub valid_path: bool,
    pub path_length: usize,
    pub source: PathSource,
}

impl PathState {
    pub fn publish(path: Vec<PathPoint>, source: PathSource) -> Self {
        let path_length = path.len();
        Self {
            path,
            valid_path: path_length > 1,
            path_length,
            source,
        }
    }

    /// Reset to the empty, invalid path.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.path.iter().map(|p| p.position)
    }
}

/// Fired whenever a builder publishes a new path.
#[derive(Event, Debug, Clone)]
pub struct PathUpdated {
    pub path_length: usize,
    pub valid_path: bool,
}

/// Total length of the polyline through `points`.
pub fn polyline_length(points: &[Vec3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

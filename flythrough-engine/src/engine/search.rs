//! Sweep graph search capability.
//!
//! The real shortest-path search lives in the host viewer; builders only see
//! the `GraphSearch` trait. `NeighborSearch` is a breadth-first stand-in over
//! the sweep neighbor lists for headless runs and tests.

use bevy::prelude::*;
use constants::path_settings::{SEARCH_MAX_HEIGHT, SEARCH_MAX_HOPS, SEARCH_MIN_HEIGHT};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::engine::path::PathPoint;
use crate::engine::sweeps::SweepSet;

/// Fixed parameters handed to every search call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConstraints {
    pub min_height: f32,
    pub max_height: f32,
    pub max_hops: u32,
}

impl Default for SearchConstraints {
    fn default() -> Self {
        Self {
            min_height: SEARCH_MIN_HEIGHT,
            max_height: SEARCH_MAX_HEIGHT,
            max_hops: SEARCH_MAX_HOPS,
        }
    }
}

/// Shortest-path search between two sweeps.
///
/// Returns the ordered points of the route, or `None` when the sweeps are
/// not connected within the constraints.
pub trait GraphSearch {
    fn find_path(
        &self,
        start_id: &str,
        end_id: &str,
        constraints: &SearchConstraints,
    ) -> Option<Vec<PathPoint>>;
}

impl<F> GraphSearch for F
where
    F: Fn(&str, &str, &SearchConstraints) -> Option<Vec<PathPoint>>,
{
    fn find_path(
        &self,
        start_id: &str,
        end_id: &str,
        constraints: &SearchConstraints,
    ) -> Option<Vec<PathPoint>> {
        self(start_id, end_id, constraints)
    }
}

/// Search capability injected into the app.
#[derive(Resource)]
pub struct SweepSearch {
    search: Box<dyn GraphSearch + Send + Sync>,
    follows_sweep_set: bool,
}

impl SweepSearch {
    /// Host-provided search, kept as is when the sweep set changes.
    pub fn new(search: impl GraphSearch + Send + Sync + 'static) -> Self {
        Self {
            search: Box::new(search),
            follows_sweep_set: false,
        }
    }

    /// Default `NeighborSearch`, rebuilt whenever `SweepSet` is replaced.
    pub fn neighbors(sweeps: SweepSet) -> Self {
        Self {
            search: Box::new(NeighborSearch::new(sweeps)),
            follows_sweep_set: true,
        }
    }

    pub fn get(&self) -> &dyn GraphSearch {
        self.search.as_ref()
    }

    pub fn follows_sweep_set(&self) -> bool {
        self.follows_sweep_set
    }
}

/// Keep the default search on the current sweep set.
pub fn sync_neighbor_search(sweeps: Res<SweepSet>, mut search: ResMut<SweepSearch>) {
    if sweeps.is_changed() && search.follows_sweep_set {
        *search = SweepSearch::neighbors(SweepSet::clone(&sweeps));
        debug!("Neighbor search rebuilt over {} sweeps", sweeps.len());
    }
}

/// Breadth-first search over sweep neighbor lists.
///
/// Edges follow each sweep's own neighbor list. The height band is not
/// modelled; only `max_hops` bounds the search.
#[derive(Debug, Clone)]
pub struct NeighborSearch {
    sweeps: SweepSet,
}

impl NeighborSearch {
    pub fn new(sweeps: SweepSet) -> Self {
        Self { sweeps }
    }
}

impl GraphSearch for NeighborSearch {
    fn find_path(
        &self,
        start_id: &str,
        end_id: &str,
        constraints: &SearchConstraints,
    ) -> Option<Vec<PathPoint>> {
        let start = self.sweeps.get(start_id)?;
        self.sweeps.get(end_id)?;

        let mut came_from: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<(&str, u32)> = VecDeque::new();
        came_from.insert(start.id.as_str(), start.id.as_str());
        queue.push_back((start.id.as_str(), 0));

        while let Some((current, hops)) = queue.pop_front() {
            if current == end_id {
                break;
            }
            if hops >= constraints.max_hops {
                continue;
            }
            let Some(sweep) = self.sweeps.get(current) else {
                continue;
            };
            for neighbor in &sweep.neighbors {
                if came_from.contains_key(neighbor.as_str()) {
                    continue;
                }
                if let Some(next) = self.sweeps.get(neighbor) {
                    came_from.insert(next.id.as_str(), current);
                    queue.push_back((next.id.as_str(), hops + 1));
                }
            }
        }

        if !came_from.contains_key(end_id) {
            return None;
        }

        let mut ids = vec![end_id];
        let mut cursor = end_id;
        while cursor != start.id {
            cursor = came_from[cursor];
            ids.push(cursor);
        }
        ids.reverse();

        ids.into_iter()
            .map(|id| self.sweeps.get(id).map(PathPoint::from_sweep))
            .collect()
    }
}

use bevy::prelude::*;
use constants::path_settings::ALIGNED_SWEEP;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Plain `{x, y, z}` triple as it appears in feed and session JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3Record {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3Record> for Vec3 {
    fn from(r: Vec3Record) -> Self {
        Vec3::new(r.x, r.y, r.z)
    }
}

impl From<Vec3> for Vec3Record {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// One record of the host's sweep subscription feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepRecord {
    pub uuid: String,
    pub position: Vec3Record,
    #[serde(default)]
    pub rotation: Vec3Record,
    #[serde(default)]
    pub floor: i32,
    #[serde(default)]
    pub neighbors: Vec<String>,
    pub alignment_type: String,
}

/// Capture viewpoint in the host's spatial graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Sweep {
    pub id: String,
    pub uuid: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub floor: i32,
    pub neighbors: Vec<String>,
}

/// Errors raised while ingesting the sweep feed.
#[derive(Debug, Error)]
pub enum SweepFeedError {
    #[error("failed to read sweep feed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed sweep feed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable snapshot of the usable sweeps for the session.
///
/// Only aligned sweeps are kept and their id is replaced by their uuid,
/// matching the ids the graph search expects.
#[derive(Resource, Debug, Clone, Default)]
pub struct SweepSet {
    sweeps: Arc<[Sweep]>,
}

impl SweepSet {
    pub fn new(sweeps: Vec<Sweep>) -> Self {
        Self {
            sweeps: sweeps.into(),
        }
    }

    /// Build the set from raw feed records, dropping unaligned sweeps.
    pub fn from_records(records: impl IntoIterator<Item = SweepRecord>) -> Self {
        let mut skipped = 0usize;
        let sweeps: Vec<Sweep> = records
            .into_iter()
            .filter_map(|record| {
                if record.alignment_type != ALIGNED_SWEEP {
                    skipped += 1;
                    return None;
                }
                Some(Sweep {
                    id: record.uuid.clone(),
                    uuid: record.uuid,
                    position: record.position.into(),
                    rotation: record.rotation.into(),
                    floor: record.floor,
                    neighbors: record.neighbors,
                })
            })
            .collect();

        if skipped > 0 {
            debug!("Sweep feed: skipped {} unaligned sweeps", skipped);
        }
        info!("Sweep feed: {} usable sweeps", sweeps.len());

        Self::new(sweeps)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SweepFeedError> {
        let records: Vec<SweepRecord> = serde_json::from_str(json)?;
        Ok(Self::from_records(records))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SweepFeedError> {
        let reader = BufReader::new(File::open(path)?);
        let records: Vec<SweepRecord> = serde_json::from_reader(reader)?;
        Ok(Self::from_records(records))
    }

    pub fn as_slice(&self) -> &[Sweep] {
        &self.sweeps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sweep> {
        self.sweeps.iter()
    }

    pub fn len(&self) -> usize {
        self.sweeps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sweeps.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Sweep> {
        self.sweeps.iter().find(|s| s.id == id)
    }

    /// Axis-aligned bounds of all sweep positions, `None` for an empty set.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.sweeps.first()?.position;
        Some(self.sweeps.iter().fold((first, first), |(min, max), s| {
            (min.min(s.position), max.max(s.position))
        }))
    }
}

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::engine::config::PathingConfig;
use crate::engine::core::app_state::FlythroughEvent;
use crate::engine::path::{PathState, PathUpdated};
use crate::engine::sweeps::Vec3Record;
use crate::tools::anchor_path_builder::AnchorPathBuilder;
use crate::tools::anchors::{AnchorEntities, PathAnchor, spawn_anchors};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access session file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionPath {
    pub start: Vec3Record,
    pub end: Vec3Record,
}

/// Saved editor state: where the two anchors were.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathSession {
    pub path: SessionPath,
}

impl PathSession {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self {
            path: SessionPath {
                start: start.into(),
                end: end.into(),
            },
        }
    }

    /// Current anchor positions, if the anchors exist.
    pub fn capture(world: &World) -> Option<Self> {
        let anchors = world.get_resource::<AnchorEntities>()?;
        let start = world.get::<Transform>(anchors.start)?.translation;
        let end = world.get::<Transform>(anchors.end)?.translation;
        Some(Self::new(start, end))
    }

    pub fn start(&self) -> Vec3 {
        self.path.start.into()
    }

    pub fn end(&self) -> Vec3 {
        self.path.end.into()
    }

    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, SessionError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        std::fs::write(path, self.to_json()?)?;
        info!("Saved path session to {}", path.display());
        Ok(())
    }
}

/// Restore a saved session.
#[derive(Event, Debug, Clone, Copy)]
pub struct LoadSession(pub PathSession);

/// Reset the published path, move the anchors to the saved positions and
/// restart editing.
pub fn apply_loaded_session(
    mut commands: Commands,
    config: Res<PathingConfig>,
    mut requests: EventReader<LoadSession>,
    anchors: Option<Res<AnchorEntities>>,
    mut transforms: Query<&mut Transform, With<PathAnchor>>,
    mut path_state: ResMut<PathState>,
    mut builder: ResMut<AnchorPathBuilder>,
    mut path_events: EventWriter<PathUpdated>,
    mut fsm_events: EventWriter<FlythroughEvent>,
) {
    let Some(LoadSession(session)) = requests.read().last().copied() else {
        return;
    };
    let (start, end) = (session.start(), session.end());

    path_state.clear();
    builder.mark_inputs_changed();
    path_events.write(PathUpdated {
        path_length: 0,
        valid_path: false,
    });

    match anchors {
        Some(anchors) => {
            for (entity, position) in [(anchors.start, start), (anchors.end, end)] {
                let Ok(mut transform) = transforms.get_mut(entity) else {
                    warn!("Anchor {} is gone; skipping restore", entity);
                    continue;
                };
                transform.translation = position;
            }
        }
        None => {
            let entities = spawn_anchors(&mut commands, &config, start, end);
            commands.insert_resource(entities);
        }
    }

    info!("Session loaded: start {:?}, end {:?}", start, end);
    fsm_events.write(FlythroughEvent::InitializeEditing);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_layout_nests_anchors_under_path() {
        let session = PathSession::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.5, 0.0));
        let value: serde_json::Value = serde_json::from_str(&session.to_json().unwrap()).unwrap();
        assert_eq!(value["path"]["start"]["y"], 2.0);
        assert_eq!(value["path"]["end"]["x"], -1.0);

        let restored = PathSession::from_json_str(&session.to_json().unwrap()).unwrap();
        assert_eq!(restored.start(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(restored.end(), Vec3::new(-1.0, 0.5, 0.0));
    }

    #[test]
    fn malformed_session_is_an_error() {
        assert!(matches!(
            PathSession::from_json_str(r#"{"path": {"start": {"x": 1}}}"#),
            Err(SessionError::Json(_))
        ));
    }

    #[test]
    fn capture_reads_anchor_transforms() {
        let mut world = World::new();
        assert!(PathSession::capture(&world).is_none());

        let start = world.spawn(Transform::from_xyz(4.0, 0.0, 0.0)).id();
        let end = world.spawn(Transform::from_xyz(-4.0, 0.0, 0.0)).id();
        world.insert_resource(AnchorEntities { start, end });

        let session = PathSession::capture(&world).unwrap();
        assert_eq!(session.start(), Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(session.end(), Vec3::new(-4.0, 0.0, 0.0));
    }
}

use bevy::prelude::*;

use crate::engine::config::PathingConfig;
use crate::engine::core::app_state::FlythroughEvent;
use crate::engine::sweeps::SweepSet;
use crate::tools::history::{Command, CommandError, EditHistory};
use crate::tools::nearest_sweep::NearestSweep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorRole {
    Start,
    End,
}

/// User-placed end of the fly-through path.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathAnchor {
    pub role: AnchorRole,
}

/// The two anchor entities, once spawned.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorEntities {
    pub start: Entity,
    pub end: Entity,
}

impl AnchorEntities {
    pub fn get(&self, role: AnchorRole) -> Entity {
        match role {
            AnchorRole::Start => self.start,
            AnchorRole::End => self.end,
        }
    }
}

/// Axis-aligned bounds of the loaded model. Sweep positions stand in when
/// the host provides none.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ModelBounds {
    pub min: Vec3,
    pub max: Vec3,
}

/// Start on the +X face of the bounds, end on the -X face, both centred.
pub fn initial_anchor_positions(min: Vec3, max: Vec3) -> (Vec3, Vec3) {
    let center = (min + max) * 0.5;
    (
        Vec3::new(max.x, center.y, center.z),
        Vec3::new(min.x, center.y, center.z),
    )
}

/// Spawn both anchors from the model bounds, then hand over to editing.
///
/// Anchors that already exist (placed by a loaded session) stay where they are.
pub fn initialize_anchors(
    mut commands: Commands,
    config: Res<PathingConfig>,
    sweeps: Res<SweepSet>,
    model_bounds: Option<Res<ModelBounds>>,
    existing: Option<Res<AnchorEntities>>,
    mut fsm_events: EventWriter<FlythroughEvent>,
) {
    if existing.is_some() {
        info!("Keeping restored anchors");
    } else {
        let bounds = model_bounds
            .map(|b| (b.min, b.max))
            .or_else(|| sweeps.bounds());
        let (start, end) = match bounds {
            Some((min, max)) => initial_anchor_positions(min, max),
            None => {
                warn!("No model or sweep bounds; placing anchors at the origin");
                (Vec3::ZERO, Vec3::ZERO)
            }
        };
        let entities = spawn_anchors(&mut commands, &config, start, end);
        commands.insert_resource(entities);
        info!("Anchors placed: start {:?}, end {:?}", start, end);
    }

    fsm_events.write(FlythroughEvent::EditingReady);
}

pub fn spawn_anchors(
    commands: &mut Commands,
    config: &PathingConfig,
    start: Vec3,
    end: Vec3,
) -> AnchorEntities {
    let mut spawn = |role: AnchorRole, position: Vec3| {
        commands
            .spawn((
                PathAnchor { role },
                Transform::from_translation(position),
                NearestSweep::new(config.nearest_sweep_interval_ms),
            ))
            .id()
    };
    AnchorEntities {
        start: spawn(AnchorRole::Start, start),
        end: spawn(AnchorRole::End, end),
    }
}

/// Undoable anchor move.
#[derive(Debug, Clone)]
pub struct MoveAnchorCommand {
    anchor: Entity,
    to: Vec3,
    from: Option<Vec3>,
}

impl MoveAnchorCommand {
    pub fn new(anchor: Entity, to: Vec3) -> Self {
        Self {
            anchor,
            to,
            from: None,
        }
    }

    fn transform<'w>(&self, world: &'w mut World) -> Result<Mut<'w, Transform>, CommandError> {
        world
            .get_mut::<Transform>(self.anchor)
            .ok_or(CommandError::MissingEntity(self.anchor))
    }
}

impl Command<World> for MoveAnchorCommand {
    fn exec(&mut self, world: &mut World) -> Result<(), CommandError> {
        let to = self.to;
        let mut transform = self.transform(world)?;
        let from = std::mem::replace(&mut transform.translation, to);
        self.from = Some(from);
        Ok(())
    }

    fn undo(&mut self, world: &mut World) -> Result<(), CommandError> {
        let Some(from) = self.from else {
            return Err(CommandError::Failed("move was never applied".to_string()));
        };
        self.transform(world)?.translation = from;
        Ok(())
    }
}

/// Editor request to move an anchor.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct MoveAnchor {
    pub role: AnchorRole,
    pub to: Vec3,
}

/// Run queued anchor moves through the edit history.
pub fn apply_anchor_moves(world: &mut World) {
    let moves: Vec<MoveAnchor> = world.resource_mut::<Events<MoveAnchor>>().drain().collect();
    if moves.is_empty() {
        return;
    }
    let Some(entities) = world.get_resource::<AnchorEntities>().copied() else {
        warn!("Dropping {} anchor moves: anchors not placed yet", moves.len());
        return;
    };

    world.resource_scope(|world, mut history: Mut<EditHistory>| {
        for request in moves {
            let command = MoveAnchorCommand::new(entities.get(request.role), request.to);
            if let Err(err) = history.0.exec(Box::new(command), world) {
                warn!("Moving {:?} anchor failed: {}", request.role, err);
            }
        }
    });
}

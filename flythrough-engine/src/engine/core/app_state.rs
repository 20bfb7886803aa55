use bevy::prelude::*;
use std::fmt::Debug;

/// A single accepted state change. `from == to` for self-transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: S,
    pub to: S,
}

/// Table-driven finite state machine.
///
/// Events not listed for the current state are ignored.
#[derive(Debug, Clone)]
pub struct TransitionTable<S, E> {
    state: S,
    transitions: Vec<(S, E, S)>,
}

impl<S, E> TransitionTable<S, E>
where
    S: Copy + Eq + Debug,
    E: Copy + Eq + Debug,
{
    pub fn new(initial: S, transitions: &[(S, E, S)]) -> Self {
        Self {
            state: initial,
            transitions: transitions.to_vec(),
        }
    }

    pub fn state(&self) -> S {
        self.state
    }

    /// State `event` would lead to from the current state.
    pub fn target(&self, event: E) -> Option<S> {
        self.transitions
            .iter()
            .find(|(from, on, _)| *from == self.state && *on == event)
            .map(|(_, _, to)| *to)
    }

    pub fn accepts(&self, event: E) -> bool {
        self.target(event).is_some()
    }

    pub fn fire(&mut self, event: E) -> Option<Transition<S>> {
        let to = self.target(event)?;
        let from = std::mem::replace(&mut self.state, to);
        Some(Transition { from, to })
    }
}

/// Fly-through editor phases.
#[derive(States, Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum FlythroughState {
    /// Doing nothing.
    #[default]
    Idle,
    /// Loading sweeps and placing anchors.
    Initializing,
    /// Anchors are editable and the path is rebuilt as they move.
    Editing,
    /// Playing the fly-through along the current path.
    Previewing,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlythroughEvent {
    InitializeEditing,
    EditingReady,
    StartPreview,
    StopPreview,
}

pub fn flythrough_table() -> TransitionTable<FlythroughState, FlythroughEvent> {
    use FlythroughEvent::*;
    use FlythroughState::*;

    TransitionTable::new(
        Idle,
        &[
            (Idle, InitializeEditing, Initializing),
            (Initializing, EditingReady, Editing),
            (Editing, StartPreview, Previewing),
            (Editing, InitializeEditing, Editing),
            (Previewing, InitializeEditing, Editing),
        ],
    )
}

/// Spatial planner phases.
#[derive(States, Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub enum PlannerState {
    #[default]
    Idle,
    /// Waiting for the user to start the session.
    WaitingForUser,
    Initializing,
    /// Choosing a room.
    Selecting,
    /// Editing the selected room.
    Editing,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerEvent {
    Start,
    UserReady,
    Initialized,
    StartEditing,
    StopEditing,
}

pub fn planner_table() -> TransitionTable<PlannerState, PlannerEvent> {
    use PlannerEvent::*;
    use PlannerState::*;

    TransitionTable::new(
        Idle,
        &[
            (Idle, Start, WaitingForUser),
            (WaitingForUser, UserReady, Initializing),
            (Initializing, Initialized, Selecting),
            (Selecting, StartEditing, Editing),
            (Editing, StopEditing, Selecting),
            (Editing, StartEditing, Editing),
        ],
    )
}

/// Sent when an accepted event leads back into the current state.
///
/// Bevy only runs `OnEnter` on a real state change, so systems that reset on
/// entry also listen for this.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlythroughReentered(pub FlythroughState);

/// Resource owning the fly-through table; Bevy's `State` mirrors it.
#[derive(Resource, Debug, Clone)]
pub struct FlythroughFsm(pub TransitionTable<FlythroughState, FlythroughEvent>);

impl Default for FlythroughFsm {
    fn default() -> Self {
        Self(flythrough_table())
    }
}

/// Feed queued fly-through events through the table and schedule the
/// resulting Bevy state change.
pub fn drive_flythrough_fsm(
    mut events: EventReader<FlythroughEvent>,
    mut fsm: ResMut<FlythroughFsm>,
    mut next_state: ResMut<NextState<FlythroughState>>,
    mut reentered: EventWriter<FlythroughReentered>,
) {
    for event in events.read() {
        match fsm.0.fire(*event) {
            Some(transition) if transition.from == transition.to => {
                info!("→ {:?}: re-entering {:?}", event, transition.to);
                reentered.write(FlythroughReentered(transition.to));
            }
            Some(transition) => {
                info!(
                    "→ {:?}: {:?} -> {:?}",
                    event, transition.from, transition.to
                );
                next_state.set(transition.to);
            }
            None => {
                debug!("Ignoring {:?} in {:?}", event, fsm.0.state());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flythrough_happy_path() {
        let mut fsm = flythrough_table();
        assert_eq!(fsm.state(), FlythroughState::Idle);

        let t = fsm.fire(FlythroughEvent::InitializeEditing).unwrap();
        assert_eq!(t.to, FlythroughState::Initializing);
        fsm.fire(FlythroughEvent::EditingReady).unwrap();
        fsm.fire(FlythroughEvent::StartPreview).unwrap();
        assert_eq!(fsm.state(), FlythroughState::Previewing);

        let back = fsm.fire(FlythroughEvent::InitializeEditing).unwrap();
        assert_eq!(
            back,
            Transition {
                from: FlythroughState::Previewing,
                to: FlythroughState::Editing
            }
        );
    }

    #[test]
    fn flythrough_editing_reenters_itself() {
        let mut fsm = flythrough_table();
        fsm.fire(FlythroughEvent::InitializeEditing);
        fsm.fire(FlythroughEvent::EditingReady);
        let t = fsm.fire(FlythroughEvent::InitializeEditing).unwrap();
        assert_eq!(t.from, t.to);
    }

    #[test]
    fn self_transition_is_reported_as_reentry() {
        use bevy::state::app::StatesPlugin;

        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<FlythroughState>()
            .init_resource::<FlythroughFsm>()
            .add_event::<FlythroughEvent>()
            .add_event::<FlythroughReentered>()
            .add_systems(Update, drive_flythrough_fsm);

        for event in [FlythroughEvent::InitializeEditing, FlythroughEvent::EditingReady] {
            app.world_mut().send_event(event);
            app.update();
        }
        app.update();
        assert_eq!(
            *app.world().resource::<State<FlythroughState>>().get(),
            FlythroughState::Editing
        );
        app.world_mut().resource_mut::<Events<FlythroughReentered>>().clear();

        app.world_mut().send_event(FlythroughEvent::InitializeEditing);
        app.update();
        let reentries: Vec<FlythroughReentered> = app
            .world_mut()
            .resource_mut::<Events<FlythroughReentered>>()
            .drain()
            .collect();
        assert_eq!(reentries, [FlythroughReentered(FlythroughState::Editing)]);
    }

    #[test]
    fn flythrough_ignores_unlisted_events() {
        let mut fsm = flythrough_table();
        assert!(fsm.fire(FlythroughEvent::StartPreview).is_none());
        assert!(fsm.fire(FlythroughEvent::EditingReady).is_none());
        assert_eq!(fsm.state(), FlythroughState::Idle);

        fsm.fire(FlythroughEvent::InitializeEditing);
        fsm.fire(FlythroughEvent::EditingReady);
        fsm.fire(FlythroughEvent::StartPreview);
        // Nothing leaves the preview except re-initializing the editor.
        assert!(!fsm.accepts(FlythroughEvent::StopPreview));
        assert!(!fsm.accepts(FlythroughEvent::StartPreview));
    }

    #[test]
    fn planner_walks_all_phases() {
        let mut fsm = planner_table();
        for event in [
            PlannerEvent::Start,
            PlannerEvent::UserReady,
            PlannerEvent::Initialized,
            PlannerEvent::StartEditing,
        ] {
            assert!(fsm.fire(event).is_some(), "{event:?} rejected");
        }
        assert_eq!(fsm.state(), PlannerState::Editing);

        assert_eq!(
            fsm.fire(PlannerEvent::StartEditing).map(|t| t.to),
            Some(PlannerState::Editing)
        );
        assert_eq!(
            fsm.fire(PlannerEvent::StopEditing).map(|t| t.to),
            Some(PlannerState::Selecting)
        );
        assert!(fsm.fire(PlannerEvent::StopEditing).is_none());
        assert!(fsm.fire(PlannerEvent::Start).is_none());
    }
}

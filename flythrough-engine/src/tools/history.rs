//! Linear undo/redo timeline of reversible editor commands.
//!
//! Commands act on an explicit context (`World` inside the app, plain values
//! in tests). The cursor only moves when a command succeeds, so a failed
//! `exec`, `undo` or `redo` leaves the timeline where it was.

use bevy::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("entity {0} no longer exists")]
    MissingEntity(Entity),
    #[error("command failed: {0}")]
    Failed(String),
}

/// Reversible edit.
pub trait Command<Ctx>: Send + Sync {
    fn exec(&mut self, ctx: &mut Ctx) -> Result<(), CommandError>;
    fn undo(&mut self, ctx: &mut Ctx) -> Result<(), CommandError>;
    /// Called once the command leaves the timeline for good.
    fn dispose(&mut self) {}
}

/// Snapshot handed to observers after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryChange {
    pub has_prev: bool,
    pub has_next: bool,
}

pub type HistoryObserver = Box<dyn Fn(HistoryChange) + Send + Sync>;

pub struct History<Ctx> {
    commands: Vec<Box<dyn Command<Ctx>>>,
    /// Number of applied commands; `commands[..applied]` are live.
    applied: usize,
    observers: Vec<HistoryObserver>,
}

impl<Ctx> Default for History<Ctx> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            applied: 0,
            observers: Vec::new(),
        }
    }
}

impl<Ctx> History<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Something can be undone.
    pub fn has_prev(&self) -> bool {
        self.applied > 0
    }

    /// Something was undone and can be redone.
    pub fn has_next(&self) -> bool {
        self.applied < self.commands.len()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn on_history_change(&mut self, observer: HistoryObserver) {
        self.observers.push(observer);
    }

    /// Drop the redo branch, append `command` and run it.
    ///
    /// A command that fails to run is disposed and not kept.
    pub fn exec(&mut self, command: Box<dyn Command<Ctx>>, ctx: &mut Ctx) -> Result<(), CommandError> {
        self.dispose_redo_branch();
        self.commands.push(command);

        if let Err(err) = self.redo(ctx) {
            if let Some(mut rejected) = self.commands.pop() {
                rejected.dispose();
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn undo(&mut self, ctx: &mut Ctx) -> Result<(), CommandError> {
        if !self.has_prev() {
            return Ok(());
        }
        self.commands[self.applied - 1].undo(ctx)?;
        self.applied -= 1;
        self.notify();
        Ok(())
    }

    pub fn redo(&mut self, ctx: &mut Ctx) -> Result<(), CommandError> {
        if !self.has_next() {
            return Ok(());
        }
        self.commands[self.applied].exec(ctx)?;
        self.applied += 1;
        self.notify();
        Ok(())
    }

    /// Undo everything, then dispose and forget every command.
    ///
    /// Stops at the first command that fails to undo; commands undone before
    /// it stay on the timeline as redoable.
    pub fn clear(&mut self, ctx: &mut Ctx) -> Result<(), CommandError> {
        let before = self.applied;
        while self.has_prev() {
            let index = self.applied - 1;
            if let Err(err) = self.commands[index].undo(ctx) {
                if self.applied != before {
                    self.notify();
                }
                return Err(err);
            }
            self.applied = index;
        }

        for command in self.commands.iter_mut().rev() {
            command.dispose();
        }
        self.commands.clear();
        self.notify();
        Ok(())
    }

    fn dispose_redo_branch(&mut self) {
        for mut command in self.commands.drain(self.applied..).rev() {
            command.dispose();
        }
    }

    fn notify(&self) {
        let change = HistoryChange {
            has_prev: self.has_prev(),
            has_next: self.has_next(),
        };
        for observer in &self.observers {
            observer(change);
        }
    }
}

/// Editor history over the ECS world.
#[derive(Resource, Default)]
pub struct EditHistory(pub History<World>);

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRequest {
    Undo,
    Redo,
    Clear,
}

/// Apply queued undo/redo/clear requests against the world.
pub fn apply_history_requests(world: &mut World) {
    let requests: Vec<HistoryRequest> = world
        .resource_mut::<Events<HistoryRequest>>()
        .drain()
        .collect();
    if requests.is_empty() {
        return;
    }

    world.resource_scope(|world, mut history: Mut<EditHistory>| {
        for request in requests {
            let result = match request {
                HistoryRequest::Undo => history.0.undo(world),
                HistoryRequest::Redo => history.0.redo(world),
                HistoryRequest::Clear => history.0.clear(world),
            };
            if let Err(err) = result {
                warn!("{:?} failed: {}", request, err);
            }
        }
    });
}

pub fn log_history_change(change: HistoryChange) {
    debug!(
        "History changed: can undo = {}, can redo = {}",
        change.has_prev, change.has_next
    );
}

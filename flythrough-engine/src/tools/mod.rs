//! Editor tools built on top of the sweep engine.
//!
//! Path builders turn sweeps and user input into a `PathState`. The anchor
//! builder publishes the app-wide one; filter builders keep theirs on the
//! component. The remaining tools cover anchor editing with undo, fly-through
//! preview and session persistence.
//!
//! ## Per-frame flow while editing
//!
//! ```text
//! MoveAnchor / HistoryRequest
//!   └─> apply_anchor_moves() / apply_history_requests()   (exclusive)
//!       └─> update_nearest_sweeps()
//!           └─> update_anchor_path()            ─> PathState + PathUpdated
//!           └─> update_filter_path_builders()   ─> FilterPathBuilder output
//! ```
//!
//! Each builder recomputes only when an input changed and its cooldown has
//! elapsed, so moving an anchor every frame costs one search per second.

/// Nearest sweep tracking for anchor entities.
pub mod nearest_sweep;

/// Sweeps inside an oriented filter region, ordered along its forward axis.
///
/// Falls back to the ordered candidates when the graph search finds no route.
pub mod path_builder;

/// Start/end anchored path with synthetic endpoints at the exact anchor positions.
pub mod anchor_path_builder;

/// Undo/redo command timeline.
pub mod history;

/// Start and end anchor entities, their initial placement and undoable moves.
pub mod anchors;

/// Constant-speed fly-through preview along the published path.
pub mod playback;

/// Save and restore of anchor positions.
pub mod session;

//! Scene-event handling for the connection editor.
//!
//! `wp-core` holds the graph, `wp-render` derives visuals from it; this
//! crate is the glue in between — it translates scene-adapter events into
//! graph mutations and render passes, runs the highlight state machine,
//! and guards the removal paths against re-entrancy.

pub mod controller;
pub mod guard;
pub mod highlight;
pub mod input;
pub mod legacy;

pub use controller::EditorController;
pub use guard::{SuppressGuard, Suppression};
pub use highlight::Highlight;
pub use input::{HitTarget, SceneEvent};
pub use legacy::{CanvasLine, sweep_legacy_lines};

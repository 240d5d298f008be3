//! Derives visual artifacts from connection graph state.

pub mod artifact;
pub mod sync;

pub use artifact::{Artifact, ArtifactStore, TextKey, TextStyle, ZLayer};
pub use sync::{HighlightFlags, RenderSync, format_distance};

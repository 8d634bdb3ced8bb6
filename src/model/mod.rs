//! Document model: the source being split and the artifacts it yields.

mod artifact;
mod document;

#[doc(hidden)]
pub mod fixtures;

pub use artifact::{ArtifactName, OutputArtifact, SplitReport, ARTIFACT_EXTENSION};
pub use document::{DocumentInfo, SourceDocument};

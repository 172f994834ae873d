use thiserror::Error;

use super::config::ConfigError;
use super::measurement::MeasurementKind;
use super::render::{RenderError, RepresentationId};
use crate::core::models::ids::AtomId;
use crate::core::models::residue::ResidueSpecifier;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Residue not found in structure: {spec}")]
    ResidueNotFound { spec: ResidueSpecifier },

    #[error("Atom not found in structure: {0:?}")]
    AtomNotFound(AtomId),

    #[error("Invalid detection options: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Point {index} has non-finite coordinates")]
    InvalidPoint { index: usize },

    #[error("A {kind} measurement needs {expected} points, got {found}")]
    PointCount {
        kind: MeasurementKind,
        expected: usize,
        found: usize,
    },

    #[error("Cannot measure {found} points; expected 2, 3 or 4")]
    UnsupportedArity { found: usize },
}

#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error("A visualization with id '{0}' already exists")]
    DuplicateId(String),

    #[error("No visualization with id '{0}'")]
    NotFound(String),

    #[error("Visualization '{0}' has no representations")]
    EmptyRepresentation(String),

    #[error("Invalid measurement geometry: {source}")]
    Geometry {
        #[from]
        source: GeometryError,
    },

    #[error("Analysis failed: {source}")]
    Analysis {
        #[from]
        source: AnalysisError,
    },

    #[error("Renderer failed for '{id}': {source} ({} representation(s) orphaned)", orphaned.len())]
    Renderer {
        id: String,
        #[source]
        source: RenderError,
        /// Representations the renderer could not clean up during rollback.
        orphaned: Vec<RepresentationId>,
    },
}

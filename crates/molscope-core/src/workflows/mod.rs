//! # Workflows Module
//!
//! This module provides the public entry points of MolScope: a stateless
//! interaction detection run and the per-viewer analysis session.
//!
//! ## Overview
//!
//! Workflows tie the `engine` and `core` layers together. [`detect`] answers a
//! single question about a structure and returns plain records.
//! [`session::AnalysisSession`] keeps the state of one structure shown in one
//! viewer: a reusable spatial index, the registry of displayed measurements and
//! interactions, and the renderer they are drawn with.
//!
//! ## Architecture
//!
//! - **Detection Workflow** ([`detect`]) - Candidate gathering followed by one task
//!   per requested interaction type
//! - **Analysis Session** ([`session`]) - Measurement building, interaction display,
//!   visibility, recoloring and removal with renderer rollback
//!
//! ## Key Capabilities
//!
//! - **Focused detection** limited to the neighborhood of one residue
//! - **Atomic renderer updates** that never leave a visualization half-shown
//! - **Batch operations** that report per-item failures instead of stopping early

pub mod detect;
pub mod session;

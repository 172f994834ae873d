//! # MolScope Core Library
//!
//! Interaction analysis and measurement geometry for static molecular structures.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture so that every layer can be
//! tested on its own and reused without the layers above it.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`, `Atom`,
//!   `Residue`), static chemistry tables, pure geometry math and the `SpatialIndex`
//!   used for every neighbor search.
//!
//! - **[`engine`]: The Logic Core.** Chemistry perception, the interaction detection
//!   tasks, measurement geometry, the renderer boundary (`RendererAdapter`) and the
//!   `VisualizationRegistry` that tracks what is shown.
//!
//! - **[`workflows`]: The Public API.** `detect` runs a complete detection over a
//!   structure, and `AnalysisSession` bundles a structure with its index, registry
//!   and renderer for interactive use.
//!
//! The library performs no I/O and installs no `tracing` subscriber; hosts supply
//! pre-parsed atom records and decide where logs go.

pub mod core;
pub mod engine;
pub mod workflows;

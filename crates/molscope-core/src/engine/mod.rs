//! # Engine Module
//!
//! This module implements the analysis logic of MolScope: chemistry perception,
//! non-covalent interaction detection, measurement geometry and the bookkeeping
//! of what is currently shown for a structure.
//!
//! ## Overview
//!
//! The engine reads an immutable [`Structure`](crate::core::models::structure::Structure)
//! together with its [`SpatialIndex`](crate::core::spatial::SpatialIndex) and
//! produces plain records ([`interactions::Interaction`], [`measurement::Measurement`])
//! and renderable [`render::Primitive`]s. It never talks to a concrete graphics
//! backend; rendering goes through the [`render::RendererAdapter`] trait.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Detection options, geometric criteria and visual style
//! - **Error Handling** ([`error`]) - Analysis, geometry and visualization error types
//! - **Chemistry Perception** ([`chemistry`], [`hydrogens`]) - Donors, acceptors, charged
//!   groups, aromatic rings and inferred hydrogen positions
//! - **Interaction Records** ([`interactions`]) - Interaction types and their classification
//! - **Detection Tasks** (`tasks`) - One search per interaction type over a shared context
//! - **Measurement Geometry** ([`measurement`]) - Lines, arcs, planes and value labels
//! - **Rendering Boundary** ([`render`]) - Primitives and the renderer adapter trait
//! - **Registry** ([`registry`]) - Handles of everything currently shown
//!
//! ## Key Capabilities
//!
//! - **Index-backed pair searches** so detection scales to structures with tens of
//!   thousands of atoms
//! - **Hydrogen inference** for structures without explicit hydrogens
//! - **Parallel donor search** behind the `parallel` feature
//! - **Batch visibility and removal** that attempt every item and report each failure

pub mod chemistry;
pub mod config;
pub(crate) mod context;
pub mod error;
pub mod hydrogens;
pub mod interactions;
pub mod measurement;
pub mod registry;
pub mod render;
pub(crate) mod tasks;

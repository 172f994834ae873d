//! # Core Module
//!
//! Stateless building blocks shared by every analysis: the structure data
//! model, static chemistry knowledge, geometry math and the spatial index.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains and the
//!   [`Structure`](models::structure::Structure) that owns them
//! - **Chemistry Tables and Math** ([`utils`]) - Residue/atom name tables and
//!   pure geometric functions (distances, angles, dihedrals, ring normals)
//! - **Neighbor Search** ([`spatial`]) - Radius queries backed by a kd-tree
//!
//! Nothing in this layer keeps mutable state across calls; a `Structure` is
//! built once from atom records and then only read.

pub mod models;
pub mod spatial;
pub mod utils;

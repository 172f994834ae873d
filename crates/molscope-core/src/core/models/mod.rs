//! # Core Models Module
//!
//! Data structures describing a loaded molecular structure.
//!
//! ## Key Components
//!
//! - [`atom`] - Atoms, elements, atom roles and the flat [`AtomRecord`](atom::AtomRecord) input
//! - [`residue`] - Residues, residue classes and chain/number specifiers
//! - [`chain`] - Chains as ordered lists of residues
//! - [`structure`] - The complete structure with id-based lookups
//! - [`ids`] - Stable slot-map keys for atoms, residues and chains
//!
//! ## Usage
//!
//! ```ignore
//! use molscope::core::models::atom::AtomRecord;
//! use molscope::core::models::structure::Structure;
//!
//! let structure = Structure::from_records(vec![
//!     AtomRecord::new('A', 1, "SER", "OG", "O", [0.0, 0.0, 0.0]),
//! ]);
//! assert_eq!(structure.atom_count(), 1);
//! ```

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod structure;

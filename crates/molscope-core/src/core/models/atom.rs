use super::ids::ResidueId;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the role or classification of an atom within a molecular structure.
///
/// Roles are assigned once when a [`Structure`](super::structure::Structure) is
/// loaded, from the residue class and the atom name. Interaction classification
/// (e.g. backbone-backbone hydrogen bonds or base pairing) is driven entirely by
/// this value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum AtomRole {
    /// Main-chain atom of a polymer (protein N/CA/C/O, nucleic sugar-phosphate).
    Backbone,
    /// Side-chain atom of an amino acid.
    Sidechain,
    /// Atom of a nucleobase ring or its substituents.
    NucleicBase,
    /// Atom of a small molecule or any non-polymer, non-water residue.
    Ligand,
    /// Solvent water atom.
    Water,
    /// Unknown or unclassified atom role.
    #[default]
    Other,
}

impl AtomRole {
    /// Returns `true` for roles that belong to a polymer main chain.
    pub fn is_backbone(self) -> bool {
        self == AtomRole::Backbone
    }
}

/// Chemical element of an atom.
///
/// Only the elements that matter for interaction perception get their own
/// variant; everything else is kept verbatim in [`Element::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    H,
    C,
    N,
    O,
    S,
    P,
    Se,
    Other(String),
}

impl Element {
    /// Parses an element symbol, case-insensitively. Deuterium maps to hydrogen.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "H" | "D" => Element::H,
            "C" => Element::C,
            "N" => Element::N,
            "O" => Element::O,
            "S" => Element::S,
            "P" => Element::P,
            "SE" => Element::Se,
            other => Element::Other(other.to_string()),
        }
    }

    /// Guesses the element from a PDB-style atom name (e.g. `"1HB"` → H, `"OG1"` → O).
    pub fn infer_from_atom_name(atom_name: &str) -> Self {
        let name = atom_name.trim_start_matches(|c: char| c.is_ascii_digit() || c == ' ');
        if name.to_ascii_uppercase().starts_with("SE") {
            return Element::Se;
        }
        name.chars()
            .next()
            .map(|c| Element::from_symbol(&c.to_string()))
            .unwrap_or_else(|| Element::Other(String::new()))
    }

    /// Single-bond covalent radius in Angstroms.
    pub fn covalent_radius(&self) -> f64 {
        match self {
            Element::H => 0.31,
            Element::C => 0.76,
            Element::N => 0.71,
            Element::O => 0.66,
            Element::S => 1.05,
            Element::P => 1.07,
            Element::Se => 1.20,
            Element::Other(_) => 1.50,
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        *self == Element::H
    }

    /// Returns `true` for N and O, the classical hydrogen-bond partners.
    pub fn is_polar(&self) -> bool {
        matches!(self, Element::N | Element::O)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::H => write!(f, "H"),
            Element::C => write!(f, "C"),
            Element::N => write!(f, "N"),
            Element::O => write!(f, "O"),
            Element::S => write!(f, "S"),
            Element::P => write!(f, "P"),
            Element::Se => write!(f, "Se"),
            Element::Other(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// An atom of a loaded structure.
///
/// Atoms are immutable once the structure is built; residue and chain identity
/// is reached through [`Atom::residue_id`].
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the source records.
    pub serial: usize,
    /// The name of the atom (e.g., "CA", "N", "O").
    pub name: String,
    pub element: Element,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    pub role: AtomRole,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(name: &str, element: Element, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            element,
            residue_id,
            role: AtomRole::default(),
            position,
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element.is_hydrogen()
    }
}

/// A flat, pre-parsed atom record as delivered by a file loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomRecord {
    #[serde(default)]
    pub serial: usize,
    pub name: String,
    /// Element symbol; left empty when the source file omits it.
    #[serde(default)]
    pub element: String,
    pub residue_name: String,
    pub residue_number: isize,
    pub chain_id: char,
    pub position: [f64; 3],
}

impl AtomRecord {
    pub fn new(
        chain_id: char,
        residue_number: isize,
        residue_name: &str,
        name: &str,
        element: &str,
        position: [f64; 3],
    ) -> Self {
        Self {
            serial: 0,
            name: name.to_string(),
            element: element.to_string(),
            residue_name: residue_name.to_string(),
            residue_number,
            chain_id,
            position,
        }
    }

    /// Resolves the element, falling back to the atom name when the record has none.
    pub fn resolved_element(&self) -> Element {
        if self.element.trim().is_empty() {
            Element::infer_from_atom_name(&self.name)
        } else {
            Element::from_symbol(&self.element)
        }
    }
}

use super::ids::{AtomId, ChainId};
use crate::core::utils::identifiers;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Broad chemical class of a residue, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResidueClass {
    AminoAcid,
    Nucleotide,
    Water,
    /// Anything else: small molecules, ions, modified residues.
    Ligand,
}

impl ResidueClass {
    pub fn from_residue_name(name: &str) -> Self {
        if identifiers::is_amino_acid(name) {
            ResidueClass::AminoAcid
        } else if identifiers::is_nucleotide(name) {
            ResidueClass::Nucleotide
        } else if identifiers::is_water(name) {
            ResidueClass::Water
        } else {
            ResidueClass::Ligand
        }
    }
}

/// Identifies a residue by chain and sequence number, as selection events do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResidueSpecifier {
    pub chain_id: char,
    pub residue_number: isize,
}

impl ResidueSpecifier {
    pub fn new(chain_id: char, residue_number: isize) -> Self {
        Self {
            chain_id,
            residue_number,
        }
    }
}

impl fmt::Display for ResidueSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_id, self.residue_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,                      // Residue sequence number from source records
    pub name: String,                       // Name of the residue (e.g., "ALA", "HOH")
    pub class: ResidueClass,                // Derived from the name at load time
    pub chain_id: ChainId,                  // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,          // Atoms in record order
    atom_name_map: HashMap<String, AtomId>, // Map from atom name to its stable ID
}

impl Residue {
    pub(crate) fn new(number: isize, name: &str, chain_id: ChainId) -> Self {
        Self {
            number,
            name: name.to_string(),
            class: ResidueClass::from_residue_name(name),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .entry(atom_name.to_string())
            .or_insert(atom_id);
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// Returns the first atom registered under `name` (alternate locations keep the first).
    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map.get(name).copied()
    }

    pub fn is_water(&self) -> bool {
        self.class == ResidueClass::Water
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::KeyData;

    fn dummy_atom_id(n: u64) -> AtomId {
        AtomId::from(KeyData::from_ffi(n))
    }

    fn dummy_chain_id(n: u64) -> ChainId {
        ChainId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn new_residue_initializes_fields_correctly() {
        let chain_id = dummy_chain_id(1);
        let residue = Residue::new(10, "GLY", chain_id);
        assert_eq!(residue.number, 10);
        assert_eq!(residue.name, "GLY");
        assert_eq!(residue.class, ResidueClass::AminoAcid);
        assert_eq!(residue.chain_id, chain_id);
        assert!(residue.atoms().is_empty());
        assert!(residue.get_atom_id_by_name("CA").is_none());
    }

    #[test]
    fn add_atom_adds_atom_and_maps_name() {
        let mut residue = Residue::new(5, "ALA", dummy_chain_id(2));
        let atom_id = dummy_atom_id(42);
        residue.add_atom("CA", atom_id);
        assert_eq!(residue.atoms(), &[atom_id]);
        assert_eq!(residue.get_atom_id_by_name("CA"), Some(atom_id));
    }

    #[test]
    fn duplicate_atom_names_keep_the_first_mapping() {
        let mut residue = Residue::new(7, "SER", dummy_chain_id(3));
        let first = dummy_atom_id(1);
        let second = dummy_atom_id(2);
        residue.add_atom("OG", first);
        residue.add_atom("OG", second);
        assert_eq!(residue.atoms(), &[first, second]);
        assert_eq!(residue.get_atom_id_by_name("OG"), Some(first));
    }

    #[test]
    fn residue_class_is_derived_from_name() {
        assert_eq!(ResidueClass::from_residue_name("DA"), ResidueClass::Nucleotide);
        assert_eq!(ResidueClass::from_residue_name("HOH"), ResidueClass::Water);
        assert_eq!(ResidueClass::from_residue_name("ATP"), ResidueClass::Ligand);
        assert!(Residue::new(1, "WAT", dummy_chain_id(4)).is_water());
    }

    #[test]
    fn residue_specifier_displays_chain_and_number() {
        assert_eq!(ResidueSpecifier::new('B', -3).to_string(), "B:-3");
    }
}

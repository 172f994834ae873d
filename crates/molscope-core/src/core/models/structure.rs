use super::atom::{Atom, AtomRecord, AtomRole};
use super::chain::Chain;
use super::ids::{AtomId, ChainId, ResidueId};
use super::residue::{Residue, ResidueClass, ResidueSpecifier};
use crate::core::utils::identifiers;
use nalgebra::Point3;
use slotmap::SlotMap;
use std::collections::HashMap;

/// A complete molecular structure: atoms, residues and chains.
///
/// This is the read-only input of every analysis. Atoms keep the order in which
/// they were added (record order), and residues can be looked up by chain
/// identifier and sequence number in constant time.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    /// Primary storage for atoms using a slot map for efficient ID management.
    atoms: SlotMap<AtomId, Atom>,
    /// Primary storage for residues using a slot map for efficient ID management.
    residues: SlotMap<ResidueId, Residue>,
    /// Primary storage for chains using a slot map for efficient ID management.
    chains: SlotMap<ChainId, Chain>,
    /// Lookup map for finding residues by chain ID and residue number.
    residue_id_map: HashMap<(ChainId, isize), ResidueId>,
    /// Lookup map for finding chains by their single-character identifier.
    chain_id_map: HashMap<char, ChainId>,
}

impl Structure {
    /// Creates a new, empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a structure from flat atom records, preserving record order.
    ///
    /// Chains and residues are created on first sight; consecutive or scattered
    /// records of the same `(chain, residue_number)` end up in the same residue.
    ///
    /// # Arguments
    ///
    /// * `records` - Pre-parsed atom records, in file order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = AtomRecord>,
    {
        let mut structure = Self::new();
        for record in records {
            let chain_id = structure.add_chain(record.chain_id);
            let residue_id = structure.add_residue(chain_id, record.residue_number, &record.residue_name);

            let [x, y, z] = record.position;
            let mut atom = Atom::new(
                &record.name,
                record.resolved_element(),
                residue_id,
                Point3::new(x, y, z),
            );
            atom.serial = record.serial;
            structure.add_atom_to_residue(residue_id, atom);
        }
        structure
    }

    /// Retrieves an immutable reference to an atom by its ID.
    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    /// Returns an iterator over all atoms in record order.
    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn residue(&self, id: ResidueId) -> Option<&Residue> {
        self.residues.get(id)
    }

    pub fn residues_iter(&self) -> impl Iterator<Item = (ResidueId, &Residue)> {
        self.residues.iter()
    }

    pub fn chain(&self, id: ChainId) -> Option<&Chain> {
        self.chains.get(id)
    }

    pub fn chains_iter(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chains.iter()
    }

    /// Finds a chain ID by its single-character identifier.
    pub fn find_chain_by_id(&self, id: char) -> Option<ChainId> {
        self.chain_id_map.get(&id).copied()
    }

    /// Finds a residue ID by its chain ID and residue number.
    pub fn find_residue_by_id(&self, chain_id: ChainId, residue_number: isize) -> Option<ResidueId> {
        self.residue_id_map.get(&(chain_id, residue_number)).copied()
    }

    /// Resolves a chain/sequence-number selection to a residue ID.
    pub fn find_residue(&self, spec: &ResidueSpecifier) -> Option<ResidueId> {
        let chain_id = self.find_chain_by_id(spec.chain_id)?;
        self.find_residue_by_id(chain_id, spec.residue_number)
    }

    /// Returns the residue that owns `atom_id`.
    pub fn residue_of(&self, atom_id: AtomId) -> Option<&Residue> {
        self.atom(atom_id).and_then(|atom| self.residue(atom.residue_id))
    }

    /// Human-readable atom label of the form `A:SER12:OG`.
    pub fn atom_label(&self, atom_id: AtomId) -> Option<String> {
        let atom = self.atom(atom_id)?;
        let residue = self.residue(atom.residue_id)?;
        let chain = self.chain(residue.chain_id)?;
        Some(format!(
            "{}:{}{}:{}",
            chain.id, residue.name, residue.number, atom.name
        ))
    }

    /// Returns `true` if the residue is the first amino acid of its chain.
    pub fn is_n_terminal(&self, residue_id: ResidueId) -> bool {
        let Some(residue) = self.residue(residue_id) else {
            return false;
        };
        if residue.class != ResidueClass::AminoAcid {
            return false;
        }
        self.chain(residue.chain_id)
            .and_then(|chain| {
                chain.residues().iter().copied().find(|&id| {
                    self.residue(id)
                        .is_some_and(|r| r.class == ResidueClass::AminoAcid)
                })
            })
            .is_some_and(|first| first == residue_id)
    }

    /// Adds a new chain to the structure or returns the existing one.
    ///
    /// This method is idempotent; if a chain with the given ID already exists,
    /// it returns the existing chain ID without creating a duplicate.
    pub fn add_chain(&mut self, id: char) -> ChainId {
        *self
            .chain_id_map
            .entry(id)
            .or_insert_with(|| self.chains.insert(Chain::new(id)))
    }

    /// Adds a new residue to a chain or returns the existing one.
    ///
    /// Idempotent on `(chain_id, residue_number)`; the name of an existing
    /// residue is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `chain_id` does not belong to this structure.
    pub fn add_residue(&mut self, chain_id: ChainId, residue_number: isize, name: &str) -> ResidueId {
        let key = (chain_id, residue_number);

        if let Some(&existing) = self.residue_id_map.get(&key) {
            return existing;
        }

        let residue_id = self
            .residues
            .insert(Residue::new(residue_number, name, chain_id));
        self.residue_id_map.insert(key, residue_id);
        self.chains[chain_id].residues.push(residue_id);
        residue_id
    }

    /// Adds an atom to a residue, assigning its [`AtomRole`] from the residue class.
    ///
    /// # Return
    ///
    /// Returns `Some(AtomId)` if successful, otherwise `None` (if the residue doesn't exist).
    pub fn add_atom_to_residue(&mut self, residue_id: ResidueId, mut atom: Atom) -> Option<AtomId> {
        let residue = self.residues.get(residue_id)?;
        atom.residue_id = residue_id;
        atom.role = classify_role(residue.class, &atom.name);

        let name = atom.name.clone();
        let atom_id = self.atoms.insert(atom);
        self.residues[residue_id].add_atom(&name, atom_id);
        Some(atom_id)
    }
}

fn classify_role(class: ResidueClass, atom_name: &str) -> AtomRole {
    match class {
        ResidueClass::AminoAcid if identifiers::is_backbone_atom(atom_name) => AtomRole::Backbone,
        ResidueClass::AminoAcid => AtomRole::Sidechain,
        ResidueClass::Nucleotide if identifiers::is_nucleic_backbone_atom(atom_name) => {
            AtomRole::Backbone
        }
        ResidueClass::Nucleotide => AtomRole::NucleicBase,
        ResidueClass::Water => AtomRole::Water,
        ResidueClass::Ligand => AtomRole::Ligand,
    }
}

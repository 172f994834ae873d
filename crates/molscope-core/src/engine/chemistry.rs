//! Perception of interaction-relevant chemistry from a structure.
//!
//! Residue and atom names drive the classification for standard residues.
//! Ligands have no name tables, so their donors and acceptors are judged from
//! the element and the number of covalent heavy neighbors found in the
//! [`SpatialIndex`].

use crate::core::models::atom::{Atom, AtomRole, Element};
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::residue::ResidueClass;
use crate::core::models::structure::Structure;
use crate::core::spatial::SpatialIndex;
use crate::core::utils::{geometry, identifiers};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A planar aromatic ring of one residue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AromaticRing {
    pub residue: ResidueId,
    /// Index of the ring within its residue (e.g. 0 and 1 for the two TRP rings).
    pub ring_index: usize,
    pub atoms: Vec<AtomId>,
    pub centroid: Point3<f64>,
    /// Unit normal of the ring plane.
    pub normal: Vector3<f64>,
}

/// Covalent environment of a heavy atom.
#[derive(Debug, Clone, Default)]
pub(crate) struct Neighborhood {
    pub heavy: Vec<AtomId>,
    pub hydrogens: Vec<AtomId>,
}

/// Read-only view combining a structure with its spatial index.
#[derive(Clone, Copy)]
pub(crate) struct Perception<'a> {
    pub structure: &'a Structure,
    pub index: &'a SpatialIndex,
}

impl<'a> Perception<'a> {
    pub fn new(structure: &'a Structure, index: &'a SpatialIndex) -> Self {
        Self { structure, index }
    }

    pub fn neighborhood(&self, atom_id: AtomId) -> Neighborhood {
        let mut neighborhood = Neighborhood::default();
        for neighbor_id in self.index.covalent_neighbors(self.structure, atom_id) {
            let Some(neighbor) = self.structure.atom(neighbor_id) else {
                continue;
            };
            if neighbor.is_hydrogen() {
                neighborhood.hydrogens.push(neighbor_id);
            } else {
                neighborhood.heavy.push(neighbor_id);
            }
        }
        neighborhood
    }

    fn residue_name(&self, atom: &Atom) -> &'a str {
        self.structure
            .residue(atom.residue_id)
            .map(|residue| residue.name.as_str())
            .unwrap_or("")
    }

    fn residue_class(&self, atom: &Atom) -> Option<ResidueClass> {
        self.structure.residue(atom.residue_id).map(|r| r.class)
    }

    /// Returns `true` if the atom is expected to carry a hydrogen that can be
    /// placed by inference when the structure has none.
    pub fn has_inferable_hydrogen(&self, atom_id: AtomId, neighborhood: &Neighborhood) -> bool {
        let Some(atom) = self.structure.atom(atom_id) else {
            return false;
        };
        let residue_name = self.residue_name(atom);
        match self.residue_class(atom) {
            Some(ResidueClass::AminoAcid) => {
                (atom.name == "N" && residue_name != "PRO")
                    || identifiers::is_standard_donor(residue_name, &atom.name)
            }
            Some(ResidueClass::Nucleotide) => {
                identifiers::is_standard_donor(residue_name, &atom.name)
                    || matches!(atom.name.as_str(), "O2'" | "O2*")
            }
            Some(ResidueClass::Water) => atom.element == Element::O,
            Some(ResidueClass::Ligand) => {
                atom.element == Element::N && neighborhood.heavy.len() < 3
            }
            None => false,
        }
    }

    /// Returns `true` if the atom has a lone pair available to accept a hydrogen bond.
    pub fn is_acceptor(&self, atom_id: AtomId) -> bool {
        let Some(atom) = self.structure.atom(atom_id) else {
            return false;
        };
        if atom.element == Element::O {
            return true;
        }
        let residue_name = self.residue_name(atom);
        match self.residue_class(atom) {
            Some(ResidueClass::Ligand) => match atom.element {
                Element::S => true,
                Element::N => self.neighborhood(atom_id).heavy.len() < 3,
                _ => false,
            },
            Some(_) => identifiers::is_standard_acceptor(residue_name, &atom.name),
            None => false,
        }
    }

    pub fn is_cationic(&self, atom_id: AtomId) -> bool {
        let Some(atom) = self.structure.atom(atom_id) else {
            return false;
        };
        identifiers::is_cationic_atom(self.residue_name(atom), &atom.name)
            || (atom.name == "N" && self.structure.is_n_terminal(atom.residue_id))
    }

    pub fn is_anionic(&self, atom_id: AtomId) -> bool {
        self.structure
            .atom(atom_id)
            .is_some_and(|atom| identifiers::is_anionic_atom(self.residue_name(atom), &atom.name))
    }

    pub fn is_cation_center(&self, atom_id: AtomId) -> bool {
        self.structure
            .atom(atom_id)
            .is_some_and(|atom| identifiers::is_cation_center(self.residue_name(atom), &atom.name))
    }

    pub fn is_hydrophobic(&self, atom_id: AtomId) -> bool {
        let Some(atom) = self.structure.atom(atom_id) else {
            return false;
        };
        match atom.role {
            AtomRole::Ligand => atom.element == Element::C,
            AtomRole::Sidechain => {
                identifiers::is_hydrophobic_atom(self.residue_name(atom), &atom.name)
            }
            _ => false,
        }
    }

    /// Perceives every complete aromatic ring of a residue.
    ///
    /// Rings with a missing atom or a degenerate geometry are skipped.
    pub fn aromatic_rings(&self, residue_id: ResidueId) -> Vec<AromaticRing> {
        let Some(residue) = self.structure.residue(residue_id) else {
            return Vec::new();
        };
        identifiers::aromatic_rings(&residue.name)
            .iter()
            .enumerate()
            .filter_map(|(ring_index, names)| {
                let atoms = names
                    .iter()
                    .map(|name| residue.get_atom_id_by_name(name))
                    .collect::<Option<Vec<_>>>()?;
                let points = atoms
                    .iter()
                    .map(|&id| self.structure.atom(id).map(|atom| atom.position))
                    .collect::<Option<Vec<_>>>()?;
                let centroid = geometry::centroid(&points)?;
                let normal = geometry::polygon_normal(&points)?;
                Some(AromaticRing {
                    residue: residue_id,
                    ring_index,
                    atoms,
                    centroid,
                    normal: normal.into_inner(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomRecord;
    use crate::core::models::residue::ResidueSpecifier;

    fn atom_named(structure: &Structure, residue: isize, name: &str) -> AtomId {
        structure
            .atoms_iter()
            .find(|(_, atom)| {
                atom.name == name
                    && structure.residue(atom.residue_id).unwrap().number == residue
            })
            .map(|(id, _)| id)
            .unwrap()
    }

    fn benzene_records(chain: char, number: isize, z: f64) -> Vec<AtomRecord> {
        ["CG", "CD1", "CE1", "CZ", "CE2", "CD2"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let theta = i as f64 * std::f64::consts::PI / 3.0;
                AtomRecord::new(
                    chain,
                    number,
                    "PHE",
                    name,
                    "C",
                    [1.39 * theta.cos(), 1.39 * theta.sin(), z],
                )
            })
            .collect()
    }

    #[test]
    fn phenylalanine_ring_has_centroid_and_normal() {
        let structure = Structure::from_records(benzene_records('A', 1, 2.0));
        let index = SpatialIndex::build(&structure);
        let perception = Perception::new(&structure, &index);
        let residue = structure.find_residue(&ResidueSpecifier::new('A', 1)).unwrap();

        let rings = perception.aromatic_rings(residue);
        assert_eq!(rings.len(), 1);
        let ring = &rings[0];
        assert_eq!(ring.atoms.len(), 6);
        assert!((ring.centroid - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-9);
        assert!((ring.normal.z.abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn incomplete_rings_are_skipped() {
        let mut records = benzene_records('A', 1, 0.0);
        records.pop();
        let structure = Structure::from_records(records);
        let index = SpatialIndex::build(&structure);
        let residue = structure.find_residue(&ResidueSpecifier::new('A', 1)).unwrap();
        assert!(Perception::new(&structure, &index).aromatic_rings(residue).is_empty());
    }

    #[test]
    fn donors_and_acceptors_follow_residue_tables() {
        let structure = Structure::from_records(vec![
            AtomRecord::new('A', 1, "ALA", "N", "N", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 2, "PRO", "N", "N", [10.0, 0.0, 0.0]),
            AtomRecord::new('A', 3, "SER", "OG", "O", [20.0, 0.0, 0.0]),
            AtomRecord::new('A', 4, "HIS", "NE2", "N", [30.0, 0.0, 0.0]),
            AtomRecord::new('A', 5, "LYS", "NZ", "N", [40.0, 0.0, 0.0]),
        ]);
        let index = SpatialIndex::build(&structure);
        let perception = Perception::new(&structure, &index);
        let inferable = |residue, name| {
            let id = atom_named(&structure, residue, name);
            perception.has_inferable_hydrogen(id, &perception.neighborhood(id))
        };

        assert!(inferable(1, "N"));
        assert!(!inferable(2, "N"));
        assert!(inferable(3, "OG"));
        assert!(inferable(5, "NZ"));

        assert!(perception.is_acceptor(atom_named(&structure, 3, "OG")));
        assert!(perception.is_acceptor(atom_named(&structure, 4, "NE2")));
        assert!(!perception.is_acceptor(atom_named(&structure, 5, "NZ")));
        assert!(!perception.is_acceptor(atom_named(&structure, 1, "N")));
    }

    #[test]
    fn charged_groups_include_the_n_terminus() {
        let structure = Structure::from_records(vec![
            AtomRecord::new('A', 1, "GLY", "N", "N", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 2, "GLY", "N", "N", [3.8, 0.0, 0.0]),
            AtomRecord::new('A', 3, "ASP", "OD1", "O", [7.6, 0.0, 0.0]),
            AtomRecord::new('A', 4, "ARG", "CZ", "C", [11.4, 0.0, 0.0]),
        ]);
        let index = SpatialIndex::build(&structure);
        let perception = Perception::new(&structure, &index);

        assert!(perception.is_cationic(atom_named(&structure, 1, "N")));
        assert!(!perception.is_cationic(atom_named(&structure, 2, "N")));
        assert!(perception.is_anionic(atom_named(&structure, 3, "OD1")));
        assert!(perception.is_cation_center(atom_named(&structure, 4, "CZ")));
        assert!(!perception.is_cationic(atom_named(&structure, 4, "CZ")));
    }

    #[test]
    fn ligand_chemistry_is_judged_from_elements() {
        let structure = Structure::from_records(vec![
            AtomRecord::new('L', 1, "LIG", "C1", "C", [0.0, 0.0, 0.0]),
            AtomRecord::new('L', 1, "LIG", "N1", "N", [1.47, 0.0, 0.0]),
            AtomRecord::new('L', 1, "LIG", "S1", "S", [-1.8, 0.0, 0.0]),
        ]);
        let index = SpatialIndex::build(&structure);
        let perception = Perception::new(&structure, &index);
        let c1 = atom_named(&structure, 1, "C1");
        let n1 = atom_named(&structure, 1, "N1");
        let s1 = atom_named(&structure, 1, "S1");

        assert!(perception.is_hydrophobic(c1));
        assert!(!perception.is_hydrophobic(n1));
        assert!(perception.is_acceptor(n1));
        assert!(perception.is_acceptor(s1));
        assert!(perception.has_inferable_hydrogen(n1, &perception.neighborhood(n1)));
        assert_eq!(perception.neighborhood(c1).heavy.len(), 2);
    }
}

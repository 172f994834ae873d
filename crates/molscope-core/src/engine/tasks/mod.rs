//! Detection tasks, one per interaction type.
//!
//! Every task reads a shared [`DetectionContext`](super::context::DetectionContext),
//! restricts itself to the candidate atoms, finds partners through the spatial
//! index and never pairs two atoms of the same residue.

pub mod cation_pi;
pub mod hydrogen_bonds;
pub mod hydrophobic;
pub mod pi_stacking;
pub mod salt_bridges;

use super::chemistry::AromaticRing;
use super::context::DetectionContext;
use crate::core::models::ids::ResidueId;
use std::collections::HashMap;
use std::hash::Hash;

/// Keeps one item per key, replacing the kept item whenever `better` prefers
/// a later one. Output follows first-seen key order.
pub(crate) fn keep_best_by_key<T, K, I>(
    items: I,
    key: impl Fn(&T) -> K,
    better: impl Fn(&T, &T) -> bool,
) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    K: Hash + Eq,
{
    let mut kept: Vec<T> = Vec::new();
    let mut slots: HashMap<K, usize> = HashMap::new();
    for item in items {
        match slots.get(&key(&item)) {
            Some(&slot) => {
                if better(&item, &kept[slot]) {
                    kept[slot] = item;
                }
            }
            None => {
                slots.insert(key(&item), kept.len());
                kept.push(item);
            }
        }
    }
    kept
}

/// Order-independent key of a residue pair.
pub(crate) fn residue_pair(a: ResidueId, b: ResidueId) -> (ResidueId, ResidueId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Aromatic rings of every residue that owns a candidate atom.
pub(crate) fn candidate_rings(context: &DetectionContext) -> Vec<AromaticRing> {
    let perception = context.perception();
    context
        .candidate_residues()
        .into_iter()
        .flat_map(|residue_id| perception.aromatic_rings(residue_id))
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::core::models::atom::AtomRecord;
    use crate::core::models::ids::AtomId;
    use crate::core::models::structure::Structure;
    use nalgebra::{Point3, Rotation3, Vector3};

    /// Six ring atoms of a PHE/TYR side chain around `center`, in the plane
    /// perpendicular to `normal`.
    pub fn ring_records(
        chain: char,
        number: isize,
        residue: &str,
        center: [f64; 3],
        normal: [f64; 3],
    ) -> Vec<AtomRecord> {
        let normal = Vector3::from(normal).normalize();
        let rotation = Rotation3::rotation_between(&Vector3::z(), &normal)
            .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI));
        let center = Point3::from(center);
        ["CG", "CD1", "CE1", "CZ", "CE2", "CD2"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let theta = i as f64 * std::f64::consts::PI / 3.0;
                let local = Vector3::new(1.39 * theta.cos(), 1.39 * theta.sin(), 0.0);
                let p = center + rotation * local;
                AtomRecord::new(chain, number, residue, name, "C", [p.x, p.y, p.z])
            })
            .collect()
    }

    const SIDE_CHAINS: [(&str, &[(&str, &str, [f64; 3])]); 8] = [
        ("SER", &[("OG", "O", [3.4, -0.75, 1.2])]),
        (
            "ASP",
            &[
                ("CG", "C", [2.6, -0.8, 2.6]),
                ("OD1", "O", [3.8, -0.6, 2.8]),
                ("OD2", "O", [1.9, -1.1, 3.6]),
            ],
        ),
        (
            "LYS",
            &[
                ("CG", "C", [2.6, -0.8, 2.6]),
                ("CD", "C", [2.1, -1.0, 4.0]),
                ("CE", "C", [2.7, -1.2, 5.3]),
                ("NZ", "N", [2.2, -1.4, 6.6]),
            ],
        ),
        (
            "LEU",
            &[
                ("CG", "C", [2.6, -0.8, 2.6]),
                ("CD1", "C", [4.1, -0.8, 2.7]),
                ("CD2", "C", [2.0, -1.2, 3.9]),
            ],
        ),
        (
            "PHE",
            &[
                ("CG", "C", [2.6, -0.8, 2.6]),
                ("CD1", "C", [3.9, -0.8, 3.1]),
                ("CE1", "C", [4.5, -0.8, 4.4]),
                ("CZ", "C", [3.7, -0.8, 5.5]),
                ("CE2", "C", [2.3, -0.8, 5.0]),
                ("CD2", "C", [1.8, -0.8, 3.7]),
            ],
        ),
        (
            "ARG",
            &[
                ("CG", "C", [2.6, -0.8, 2.6]),
                ("CD", "C", [2.1, -1.0, 4.0]),
                ("NE", "N", [2.8, -1.2, 5.2]),
                ("CZ", "C", [2.3, -1.4, 6.4]),
                ("NH1", "N", [1.0, -1.5, 6.6]),
                ("NH2", "N", [3.1, -1.5, 7.4]),
            ],
        ),
        (
            "GLU",
            &[
                ("CG", "C", [2.6, -0.8, 2.6]),
                ("CD", "C", [2.1, -1.0, 4.0]),
                ("OE1", "O", [2.9, -1.1, 4.9]),
                ("OE2", "O", [0.9, -1.0, 4.2]),
            ],
        ),
        (
            "VAL",
            &[
                ("CG1", "C", [3.4, -0.8, 1.4]),
                ("CG2", "C", [1.5, -1.2, 2.5]),
            ],
        ),
    ];

    /// A deterministic protein-like lattice of `residue_count` residues.
    ///
    /// Residues sit on a cubic grid with a 6 Å pitch, each rotated about z by
    /// a residue-dependent angle so neighboring side chains meet at varied
    /// geometries. The residue types cycle through charged, polar, aromatic
    /// and aliphatic side chains.
    pub fn synthetic_protein(residue_count: usize) -> Structure {
        let side = (residue_count as f64).cbrt().ceil().max(1.0) as usize;
        let mut records = Vec::new();
        for i in 0..residue_count {
            let origin = Vector3::new(
                (i % side) as f64 * 6.0,
                ((i / side) % side) as f64 * 6.0,
                (i / (side * side)) as f64 * 6.0,
            );
            let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), i as f64 * 0.65);
            let (residue, side_chain) = SIDE_CHAINS[i % SIDE_CHAINS.len()];
            let number = i as isize + 1;
            let backbone: [(&str, &str, [f64; 3]); 5] = [
                ("N", "N", [0.0, 0.0, 0.0]),
                ("CA", "C", [1.46, 0.0, 0.0]),
                ("C", "C", [2.0, 1.42, 0.0]),
                ("O", "O", [1.3, 2.4, 0.0]),
                ("CB", "C", [2.0, -0.75, 1.2]),
            ];
            for (name, element, local) in backbone.iter().chain(side_chain.iter()) {
                let p = rotation * Point3::from(*local) + origin;
                records.push(AtomRecord::new('A', number, residue, name, element, [p.x, p.y, p.z]));
            }
        }
        Structure::from_records(records)
    }

    pub fn find_atom(structure: &Structure, residue_number: isize, name: &str) -> AtomId {
        structure
            .atoms_iter()
            .find(|(_, atom)| {
                atom.name == name
                    && structure
                        .residue(atom.residue_id)
                        .is_some_and(|r| r.number == residue_number)
            })
            .map(|(id, _)| id)
            .unwrap()
    }
}

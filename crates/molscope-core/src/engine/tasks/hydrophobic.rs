use super::{keep_best_by_key, residue_pair};
use crate::core::models::ids::AtomId;
use crate::core::utils::geometry;
use crate::engine::context::DetectionContext;
use crate::engine::interactions::{HydrophobicContact, InteractionKind, atom_key};
use std::collections::HashSet;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Finds contacts between apolar carbons of different residues.
///
/// Each residue pair contributes at most its closest contact.
#[instrument(skip_all, name = "hydrophobic_task")]
pub fn run(context: &DetectionContext) -> Vec<HydrophobicContact> {
    let max_distance = context.options.max_distance_for(InteractionKind::Hydrophobic);
    info!(max_distance, "Detecting hydrophobic contacts.");

    let perception = context.perception();
    let apolar: Vec<AtomId> = context
        .candidates
        .iter()
        .copied()
        .filter(|&id| perception.is_hydrophobic(id))
        .collect();
    let apolar_set: HashSet<AtomId> = apolar.iter().copied().collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = apolar.iter();

    #[cfg(feature = "parallel")]
    let iterator = apolar.par_iter();

    let per_atom: Vec<Vec<HydrophobicContact>> = iterator
        .map(|&atom| contacts_from(context, atom, &apolar_set, max_distance))
        .collect();

    let contacts = keep_best_by_key(
        per_atom.into_iter().flatten(),
        |contact| {
            let a = context.residue_of(contact.atom_a);
            let b = context.residue_of(contact.atom_b);
            a.zip(b).map(|(a, b)| residue_pair(a, b))
        },
        |new, old| new.distance < old.distance,
    );

    info!(num_contacts = contacts.len(), "Hydrophobic detection complete.");
    contacts
}

fn contacts_from(
    context: &DetectionContext,
    atom: AtomId,
    apolar: &HashSet<AtomId>,
    max_distance: f64,
) -> Vec<HydrophobicContact> {
    let Some(origin) = context.structure.atom(atom).map(|a| a.position) else {
        return Vec::new();
    };
    context
        .index
        .query_excluding(&origin, max_distance, atom)
        .into_iter()
        // Each unordered pair is visited from its smaller atom id only.
        .filter(|&other| {
            atom < other && apolar.contains(&other) && context.in_different_residues(atom, other)
        })
        .filter_map(|other| {
            let position = context.structure.atom(other)?.position;
            Some(HydrophobicContact {
                id: format!(
                    "hydrophobic:{}-{}",
                    atom_key(context.structure, atom),
                    atom_key(context.structure, other)
                ),
                atom_a: atom,
                atom_b: other,
                distance: geometry::distance(&origin, &position),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomRecord;
    use crate::core::models::structure::Structure;
    use crate::core::spatial::SpatialIndex;
    use crate::engine::config::DetectionOptions;
    use crate::engine::tasks::test_support::find_atom;

    fn detect(structure: &Structure, options: &DetectionOptions) -> Vec<HydrophobicContact> {
        let index = SpatialIndex::build(structure);
        let context = DetectionContext::new(structure, &index, None, options).unwrap();
        run(&context)
    }

    fn leucine_valine() -> Structure {
        Structure::from_records(vec![
            AtomRecord::new('A', 1, "LEU", "CD1", "C", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 1, "LEU", "CD2", "C", [0.0, 2.5, 0.0]),
            AtomRecord::new('A', 2, "VAL", "CG1", "C", [4.0, 0.0, 0.0]),
            AtomRecord::new('A', 2, "VAL", "CG2", "C", [4.5, 2.5, 0.0]),
        ])
    }

    #[test]
    fn one_contact_per_residue_pair_at_the_shortest_distance() {
        let structure = leucine_valine();
        let contacts = detect(&structure, &DetectionOptions::default());

        assert_eq!(contacts.len(), 1);
        let contact = &contacts[0];
        assert!((contact.distance - 4.0).abs() < 1e-9);
        let pair = [contact.atom_a, contact.atom_b];
        assert!(pair.contains(&find_atom(&structure, 1, "CD1")));
        assert!(pair.contains(&find_atom(&structure, 2, "CG1")));
    }

    #[test]
    fn polar_and_backbone_atoms_are_ignored() {
        let structure = Structure::from_records(vec![
            AtomRecord::new('A', 1, "SER", "OG", "O", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 2, "ALA", "CA", "C", [3.8, 0.0, 0.0]),
            AtomRecord::new('A', 3, "LEU", "CD1", "C", [0.0, 3.8, 0.0]),
        ]);
        assert!(detect(&structure, &DetectionOptions::default()).is_empty());
    }

    #[test]
    fn ligand_carbons_count_as_hydrophobic() {
        let structure = Structure::from_records(vec![
            AtomRecord::new('L', 900, "LIG", "C7", "C", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 3, "ILE", "CD1", "C", [3.9, 0.0, 0.0]),
        ]);
        let contacts = detect(&structure, &DetectionOptions::default());
        assert_eq!(contacts.len(), 1);
    }

    #[test]
    fn max_distance_override_narrows_the_search() {
        let structure = leucine_valine();
        let options = DetectionOptions::builder().max_distance(3.5).build().unwrap();
        assert!(detect(&structure, &options).is_empty());
    }
}

use super::{keep_best_by_key, residue_pair};
use crate::core::models::ids::AtomId;
use crate::core::utils::geometry;
use crate::engine::context::DetectionContext;
use crate::engine::interactions::{InteractionKind, SaltBridge, atom_key};
use std::collections::HashSet;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Finds cationic/anionic atom pairs of different residues within the cutoff.
///
/// Only the closest pair is kept for each residue pair, so a carboxylate
/// facing a guanidinium yields one bridge rather than up to six.
#[instrument(skip_all, name = "salt_bridge_task")]
pub fn run(context: &DetectionContext) -> Vec<SaltBridge> {
    let max_distance = context.options.max_distance_for(InteractionKind::SaltBridge);
    info!(max_distance, "Detecting salt bridges.");

    let perception = context.perception();
    let cations: Vec<AtomId> = context
        .candidates
        .iter()
        .copied()
        .filter(|&id| perception.is_cationic(id))
        .collect();
    let anions: HashSet<AtomId> = context
        .candidates
        .iter()
        .copied()
        .filter(|&id| perception.is_anionic(id))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = cations.iter();

    #[cfg(feature = "parallel")]
    let iterator = cations.par_iter();

    let per_cation: Vec<Vec<SaltBridge>> = iterator
        .map(|&cation| bridges_from(context, cation, &anions, max_distance))
        .collect();

    let bridges = keep_best_by_key(
        per_cation.into_iter().flatten(),
        |bridge| {
            let a = context.residue_of(bridge.cation);
            let b = context.residue_of(bridge.anion);
            a.zip(b).map(|(a, b)| residue_pair(a, b))
        },
        |new, old| new.distance < old.distance,
    );

    info!(num_bridges = bridges.len(), "Salt bridge detection complete.");
    bridges
}

fn bridges_from(
    context: &DetectionContext,
    cation: AtomId,
    anions: &HashSet<AtomId>,
    max_distance: f64,
) -> Vec<SaltBridge> {
    let Some(origin) = context.structure.atom(cation).map(|a| a.position) else {
        return Vec::new();
    };
    context
        .index
        .query_excluding(&origin, max_distance, cation)
        .into_iter()
        .filter(|&anion| anions.contains(&anion) && context.in_different_residues(cation, anion))
        .filter_map(|anion| {
            let position = context.structure.atom(anion)?.position;
            Some(SaltBridge {
                id: format!(
                    "salt-bridge:{}->{}",
                    atom_key(context.structure, cation),
                    atom_key(context.structure, anion)
                ),
                cation,
                anion,
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

    fn detect(structure: &Structure, options: &DetectionOptions) -> Vec<SaltBridge> {
        let index = SpatialIndex::build(structure);
        let context = DetectionContext::new(structure, &index, None, options).unwrap();
        run(&context)
    }

    fn lys_asp(separation: f64) -> Structure {
        Structure::from_records(vec![
            AtomRecord::new('A', 10, "ALA", "CA", "C", [-20.0, 0.0, 0.0]),
            AtomRecord::new('A', 11, "LYS", "NZ", "N", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 20, "ASP", "OD1", "O", [separation, 0.0, 0.0]),
            AtomRecord::new('A', 20, "ASP", "OD2", "O", [separation + 1.0, 1.8, 0.0]),
        ])
    }

    #[test]
    fn closest_pair_per_residue_pair_is_reported() {
        let structure = lys_asp(3.2);
        let bridges = detect(&structure, &DetectionOptions::default());

        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].cation, find_atom(&structure, 11, "NZ"));
        assert_eq!(bridges[0].anion, find_atom(&structure, 20, "OD1"));
        assert!((bridges[0].distance - 3.2).abs() < 1e-9);
        assert_eq!(bridges[0].id, "salt-bridge:A:LYS11:NZ->A:ASP20:OD1");
    }

    #[test]
    fn cutoff_is_inclusive() {
        let options = DetectionOptions::default();
        assert_eq!(detect(&lys_asp(4.0), &options).len(), 1);
        assert!(detect(&lys_asp(4.1), &options).is_empty());
    }

    #[test]
    fn n_terminal_amine_pairs_with_a_carboxylate() {
        let structure = Structure::from_records(vec![
            AtomRecord::new('A', 1, "GLY", "N", "N", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 2, "GLY", "N", "N", [20.0, 0.0, 0.0]),
            AtomRecord::new('B', 5, "GLU", "OE1", "O", [3.5, 0.0, 0.0]),
        ]);
        let bridges = detect(&structure, &DetectionOptions::default());
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].cation, find_atom(&structure, 1, "N"));
    }

    #[test]
    fn like_charges_do_not_pair() {
        let structure = Structure::from_records(vec![
            AtomRecord::new('A', 1, "LYS", "NZ", "N", [0.0, 0.0, 0.0]),
            AtomRecord::new('A', 2, "ARG", "NH1", "N", [3.0, 0.0, 0.0]),
            AtomRecord::new('A', 3, "ASP", "OD1", "O", [0.0, 30.0, 0.0]),
            AtomRecord::new('A', 4, "GLU", "OE1", "O", [3.0, 30.0, 0.0]),
        ]);
        assert!(detect(&structure, &DetectionOptions::default()).is_empty());
    }
}

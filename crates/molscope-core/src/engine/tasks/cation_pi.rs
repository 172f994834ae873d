use super::candidate_rings;
use crate::core::utils::geometry;
use crate::engine::chemistry::AromaticRing;
use crate::engine::context::DetectionContext;
use crate::engine::interactions::{CationPi, InteractionKind, atom_key, ring_key};
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Finds cationic groups sitting over the face of an aromatic ring.
///
/// The cation is represented by one center atom per group (LYS NZ, ARG CZ)
/// and must lie within the cone around the ring normal.
#[instrument(skip_all, name = "cation_pi_task")]
pub fn run(context: &DetectionContext) -> Vec<CationPi> {
    let max_distance = context.options.max_distance_for(InteractionKind::CationPi);
    let max_angle = context.options.criteria.cation_pi_max_angle;
    info!(max_distance, max_angle, "Detecting cation-pi interactions.");

    let rings = candidate_rings(context);

    #[cfg(not(feature = "parallel"))]
    let iterator = rings.iter();

    #[cfg(feature = "parallel")]
    let iterator = rings.par_iter();

    let per_ring: Vec<Vec<CationPi>> = iterator
        .map(|ring| cations_over(context, ring, max_distance, max_angle))
        .collect();
    let contacts: Vec<CationPi> = per_ring.into_iter().flatten().collect();

    info!(num_contacts = contacts.len(), "Cation-pi detection complete.");
    contacts
}

fn cations_over(
    context: &DetectionContext,
    ring: &AromaticRing,
    max_distance: f64,
    max_angle: f64,
) -> Vec<CationPi> {
    let perception = context.perception();
    context
        .index
        .query(&ring.centroid, max_distance)
        .into_iter()
        .filter(|&cation| {
            context.is_candidate(cation)
                && perception.is_cation_center(cation)
                && context.residue_of(cation) != Some(ring.residue)
        })
        .filter_map(|cation| {
            let position = context.structure.atom(cation)?.position;
            let offset = position - ring.centroid;
            let angle =
                geometry::fold_axis_angle(geometry::vector_angle_degrees(&ring.normal, &offset));
            (angle <= max_angle).then(|| CationPi {
                id: format!(
                    "cation-pi:{}->{}",
                    atom_key(context.structure, cation),
                    ring_key(context.structure, ring)
                ),
                cation,
                ring: ring.clone(),
                distance: offset.norm(),
                angle,
            })
        })
        .collect()
}

use super::candidate_rings;
use crate::core::utils::geometry;
use crate::engine::chemistry::AromaticRing;
use crate::engine::config::InteractionCriteria;
use crate::engine::context::DetectionContext;
use crate::engine::interactions::{InteractionKind, PiStacking, StackingGeometry, ring_key};
use itertools::Itertools;
use nalgebra::Vector3;
use tracing::{debug, info, instrument};

/// Finds stacked aromatic ring pairs of different residues.
///
/// A pair is parallel when the ring planes are nearly coplanar and the
/// centroids sit over each other, T-shaped when the planes are close to
/// perpendicular. Anything in between is not reported.
#[instrument(skip_all, name = "pi_stacking_task")]
pub fn run(context: &DetectionContext) -> Vec<PiStacking> {
    let max_distance = context.options.max_distance_for(InteractionKind::PiStacking);
    info!(max_distance, "Detecting pi stacking.");

    let rings = candidate_rings(context);
    debug!(rings = rings.len(), "Perceived aromatic rings.");

    let stacks: Vec<PiStacking> = rings
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.residue != b.residue)
        .filter_map(|(a, b)| {
            let (distance, angle, offset) = stacking_geometry(a, b);
            if distance > max_distance {
                return None;
            }
            let geometry = classify(&context.options.criteria, angle, offset)?;
            Some(PiStacking {
                id: format!(
                    "pi-stacking:{}-{}",
                    ring_key(context.structure, a),
                    ring_key(context.structure, b)
                ),
                ring_a: a.clone(),
                ring_b: b.clone(),
                distance,
                angle,
                offset,
                geometry,
            })
        })
        .collect();

    info!(num_stacks = stacks.len(), "Pi stacking detection complete.");
    stacks
}

/// Centroid distance, folded inter-normal angle and lateral centroid offset.
///
/// The offset is measured against both normals and the smaller one kept, so
/// the result does not depend on pair order.
fn stacking_geometry(a: &AromaticRing, b: &AromaticRing) -> (f64, f64, f64) {
    let between = b.centroid - a.centroid;
    let distance = between.norm();
    let angle = geometry::fold_axis_angle(geometry::vector_angle_degrees(&a.normal, &b.normal));
    let offset = lateral_offset(&between, &a.normal).min(lateral_offset(&between, &b.normal));
    (distance, angle, offset)
}

fn lateral_offset(between: &Vector3<f64>, normal: &Vector3<f64>) -> f64 {
    (between - normal * between.dot(normal)).norm()
}

fn classify(criteria: &InteractionCriteria, angle: f64, offset: f64) -> Option<StackingGeometry> {
    if angle <= criteria.pi_parallel_max_angle && offset <= criteria.pi_max_offset {
        Some(StackingGeometry::Parallel)
    } else if angle >= criteria.pi_tshape_min_angle {
        Some(StackingGeometry::TShaped)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::AtomRecord;
    use crate::core::models::structure::Structure;
    use crate::core::spatial::SpatialIndex;
    use crate::engine::config::DetectionOptions;
    use crate::engine::tasks::test_support::ring_records;

    fn detect(records: Vec<AtomRecord>) -> Vec<PiStacking> {
        let structure = Structure::from_records(records);
        let index = SpatialIndex::build(&structure);
        let options = DetectionOptions::default();
        let context = DetectionContext::new(&structure, &index, None, &options).unwrap();
        run(&context)
    }

    fn pair(center_b: [f64; 3], normal_b: [f64; 3]) -> Vec<AtomRecord> {
        let mut records = ring_records('A', 1, "PHE", [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        records.extend(ring_records('A', 2, "TYR", center_b, normal_b));
        records
    }

    #[test]
    fn face_to_face_rings_stack_in_parallel() {
        let stacks = detect(pair([0.0, 0.0, 3.8], [0.0, 0.0, 1.0]));

        assert_eq!(stacks.len(), 1);
        let stack = &stacks[0];
        assert_eq!(stack.geometry, StackingGeometry::Parallel);
        assert!((stack.distance - 3.8).abs() < 1e-9);
        assert!(stack.angle < 1e-6);
        assert!(stack.offset < 1e-6);
        assert_eq!(stack.id, "pi-stacking:A:PHE1#0-A:TYR2#0");
    }

    #[test]
    fn flipped_normals_still_count_as_parallel() {
        let stacks = detect(pair([1.5, 0.0, 3.5], [0.0, 0.0, -1.0]));
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].geometry, StackingGeometry::Parallel);
        assert!((stacks[0].offset - 1.5).abs() < 1e-9);
    }

    #[test]
    fn perpendicular_rings_are_t_shaped() {
        let stacks = detect(pair([0.0, 0.0, 4.8], [1.0, 0.0, 0.0]));
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].geometry, StackingGeometry::TShaped);
        assert!((stacks[0].angle - 90.0).abs() < 1e-6);
    }

    #[test]
    fn slipped_or_tilted_pairs_are_rejected() {
        assert!(detect(pair([2.5, 0.0, 3.5], [0.0, 0.0, 1.0])).is_empty());
        assert!(detect(pair([0.0, 0.0, 3.8], [1.0, 0.0, 1.0])).is_empty());
    }

    #[test]
    fn distant_rings_are_ignored() {
        assert!(detect(pair([0.0, 0.0, 5.2], [0.0, 0.0, 1.0])).is_empty());
    }

    #[test]
    fn classification_boundaries_are_inclusive() {
        let criteria = InteractionCriteria::default();
        assert_eq!(classify(&criteria, 30.0, 2.0), Some(StackingGeometry::Parallel));
        assert_eq!(classify(&criteria, 60.0, 3.0), Some(StackingGeometry::TShaped));
        assert_eq!(classify(&criteria, 45.0, 0.0), None);
    }
}

use crate::core::utils::geometry;
use nalgebra::{Point3, Unit, Vector3};

/// Places a hydrogen on `donor` pointing away from its covalent heavy neighbors.
///
/// The direction is the negated sum of the unit bond vectors to `heavy_neighbors`.
/// A donor with no heavy neighbors (water oxygen) or with neighbors that cancel
/// out points the hydrogen at `toward` instead.
pub fn infer_hydrogen(
    donor: &Point3<f64>,
    heavy_neighbors: &[Point3<f64>],
    toward: &Point3<f64>,
    bond_length: f64,
) -> Point3<f64> {
    let direction = geometry::dominant_covalent_axis(donor, heavy_neighbors)
        .or_else(|| Unit::try_new(toward - donor, 1e-9))
        .unwrap_or_else(Vector3::x_axis);
    donor + direction.into_inner() * bond_length
}

use nalgebra::{Point3, Unit, Vector3};

const EPSILON: f64 = 1e-9;

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b - a).norm()
}

pub fn midpoint(a: &Point3<f64>, b: &Point3<f64>) -> Point3<f64> {
    Point3::from((a.coords + b.coords) * 0.5)
}

/// Angle between two vectors in degrees, clamped to `[0, 180]`.
///
/// Zero-length input yields `0.0`.
pub fn vector_angle_degrees(u: &Vector3<f64>, v: &Vector3<f64>) -> f64 {
    let norms = u.norm() * v.norm();
    if norms < EPSILON {
        return 0.0;
    }
    (u.dot(v) / norms).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Angle `a-vertex-c` in degrees, clamped to `[0, 180]`.
pub fn angle_degrees(a: &Point3<f64>, vertex: &Point3<f64>, c: &Point3<f64>) -> f64 {
    vector_angle_degrees(&(a - vertex), &(c - vertex))
}

/// Signed torsion angle `p1-p2-p3-p4` in degrees, in `[-180, 180]`.
///
/// The sign follows the IUPAC convention: looking down the p2→p3 axis, a
/// clockwise rotation from the p1 bond to the p4 bond is positive. Degenerate
/// input (zero central bond or collinear atoms) yields `0.0`.
pub fn dihedral_degrees(
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
    p4: &Point3<f64>,
) -> f64 {
    let b1 = p2 - p1;
    let b2 = p3 - p2;
    let b3 = p4 - p3;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let Some(axis) = b2.try_normalize(EPSILON) else {
        return 0.0;
    };
    if n1.norm() < EPSILON || n2.norm() < EPSILON {
        return 0.0;
    }

    let x = n1.dot(&n2);
    let y = axis.dot(&n1.cross(&n2));
    y.atan2(x).to_degrees().clamp(-180.0, 180.0)
}

/// Folds an angle between two undirected axes into `[0, 90]` degrees.
pub fn fold_axis_angle(degrees: f64) -> f64 {
    if degrees > 90.0 { 180.0 - degrees } else { degrees }
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Unit normal of a (near-)planar polygon using Newell's method.
///
/// Returns `None` for fewer than three points or a degenerate polygon.
pub fn polygon_normal(points: &[Point3<f64>]) -> Option<Unit<Vector3<f64>>> {
    if points.len() < 3 {
        return None;
    }
    let mut normal = Vector3::zeros();
    for (i, current) in points.iter().enumerate() {
        let next = &points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    Unit::try_new(normal, EPSILON)
}

/// Any unit vector perpendicular to `direction`.
pub fn any_perpendicular(direction: &Vector3<f64>) -> Unit<Vector3<f64>> {
    let reference = if direction.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    Unit::try_new(direction.cross(&reference), EPSILON).unwrap_or_else(Vector3::z_axis)
}

/// Orthonormal in-plane frame `(x, y)` spanned by two directions.
///
/// `x` points along `u`; `y` is the component of `v` perpendicular to `u`.
/// Collinear or zero-length input falls back to an arbitrary perpendicular.
pub fn plane_frame(
    u: &Vector3<f64>,
    v: &Vector3<f64>,
) -> (Unit<Vector3<f64>>, Unit<Vector3<f64>>) {
    let x = Unit::try_new(*u, EPSILON).unwrap_or_else(Vector3::x_axis);
    let perp = v - x.into_inner() * v.dot(&x.into_inner());
    let y = Unit::try_new(perp, EPSILON).unwrap_or_else(|| any_perpendicular(&x));
    (x, y)
}

/// Direction in which a hydrogen points away from the covalent neighbors of
/// its parent atom: the negated sum of the unit bond vectors.
///
/// This reproduces the bisector construction used for backbone amide
/// hydrogens (`-(n_ca + n_c_prev)`) and generalizes it to any neighbor count.
/// Returns `None` when there are no neighbors or they cancel out.
pub fn dominant_covalent_axis(
    parent: &Point3<f64>,
    neighbors: &[Point3<f64>],
) -> Option<Unit<Vector3<f64>>> {
    if neighbors.is_empty() {
        return None;
    }
    let sum = neighbors
        .iter()
        .filter_map(|p| (p - parent).try_normalize(EPSILON))
        .fold(Vector3::zeros(), |acc, v| acc + v);
    Unit::try_new(-sum, EPSILON)
}

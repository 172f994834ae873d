//! Geometry of distance, angle and dihedral measurements.
//!
//! Everything here is pure: points go in, renderer primitives and the measured
//! value come out. Registration and rendering happen in the session.

use super::config::StyleConfig;
use super::error::GeometryError;
use super::render::{Arc, Color, Label, LabelStyle, Line, LineStyle, Plane, Primitive};
use crate::core::models::ids::AtomId;
use crate::core::utils::geometry;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeasurementKind {
    Distance,
    Angle,
    Dihedral,
}

impl MeasurementKind {
    pub fn point_count(self) -> usize {
        match self {
            MeasurementKind::Distance => 2,
            MeasurementKind::Angle => 3,
            MeasurementKind::Dihedral => 4,
        }
    }

    pub fn from_point_count(count: usize) -> Option<Self> {
        match count {
            2 => Some(MeasurementKind::Distance),
            3 => Some(MeasurementKind::Angle),
            4 => Some(MeasurementKind::Dihedral),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementKind::Distance => write!(f, "distance"),
            MeasurementKind::Angle => write!(f, "angle"),
            MeasurementKind::Dihedral => write!(f, "dihedral"),
        }
    }
}

/// A measurement between atoms of a structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Measurement {
    Distance {
        id: String,
        a: AtomId,
        b: AtomId,
        value: f64,
    },
    Angle {
        id: String,
        a: AtomId,
        vertex: AtomId,
        c: AtomId,
        value: f64,
    },
    Dihedral {
        id: String,
        a: AtomId,
        b: AtomId,
        c: AtomId,
        d: AtomId,
        value: f64,
    },
}

impl Measurement {
    /// Pairs measured atoms with a computed value; the atom count picks the kind.
    pub(crate) fn from_atoms(id: &str, atoms: &[AtomId], value: f64) -> Option<Self> {
        let id = id.to_string();
        match *atoms {
            [a, b] => Some(Measurement::Distance { id, a, b, value }),
            [a, vertex, c] => Some(Measurement::Angle {
                id,
                a,
                vertex,
                c,
                value,
            }),
            [a, b, c, d] => Some(Measurement::Dihedral {
                id,
                a,
                b,
                c,
                d,
                value,
            }),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Measurement::Distance { id, .. }
            | Measurement::Angle { id, .. }
            | Measurement::Dihedral { id, .. } => id,
        }
    }

    pub fn kind(&self) -> MeasurementKind {
        match self {
            Measurement::Distance { .. } => MeasurementKind::Distance,
            Measurement::Angle { .. } => MeasurementKind::Angle,
            Measurement::Dihedral { .. } => MeasurementKind::Dihedral,
        }
    }

    /// Measured value in Angstroms (distance) or degrees (angle, dihedral).
    pub fn value(&self) -> f64 {
        match self {
            Measurement::Distance { value, .. }
            | Measurement::Angle { value, .. }
            | Measurement::Dihedral { value, .. } => *value,
        }
    }
}

/// The two triangles of a dihedral: `{p1, p2, p3}` and `{p2, p3, p4}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanePair {
    pub plane1: [Point3<f64>; 3],
    pub plane2: [Point3<f64>; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceGeometry {
    pub line: Line,
    pub label: Label,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AngleGeometry {
    pub arc: Arc,
    pub label: Label,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DihedralGeometry {
    pub planes: PlanePair,
    pub label: Label,
    pub value: f64,
    color: Color,
    opacity: f32,
}

impl DihedralGeometry {
    pub fn plane_primitives(&self) -> [Plane; 2] {
        [
            Plane {
                corners: self.planes.plane1,
                color: self.color,
                opacity: self.opacity,
            },
            Plane {
                corners: self.planes.plane2,
                color: self.color,
                opacity: self.opacity,
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasurementGeometry {
    Distance(DistanceGeometry),
    Angle(AngleGeometry),
    Dihedral(DihedralGeometry),
}

impl MeasurementGeometry {
    /// Builds the geometry for `kind` from a slice of points, checking the count.
    pub fn build(
        kind: MeasurementKind,
        points: &[Point3<f64>],
        style: &StyleConfig,
        color: Option<Color>,
    ) -> Result<Self, GeometryError> {
        if points.len() != kind.point_count() {
            return Err(GeometryError::PointCount {
                kind,
                expected: kind.point_count(),
                found: points.len(),
            });
        }
        match kind {
            MeasurementKind::Distance => Self::distance(&points[0], &points[1], style, color),
            MeasurementKind::Angle => {
                Self::angle(&points[0], &points[1], &points[2], style, color)
            }
            MeasurementKind::Dihedral => Self::dihedral(
                &points[0], &points[1], &points[2], &points[3], style, color,
            ),
        }
    }

    /// A line between the two points with its length labelled at the midpoint.
    pub fn distance(
        a: &Point3<f64>,
        b: &Point3<f64>,
        style: &StyleConfig,
        color: Option<Color>,
    ) -> Result<Self, GeometryError> {
        validate_points(&[*a, *b])?;
        let value = geometry::distance(a, b);
        Ok(MeasurementGeometry::Distance(DistanceGeometry {
            line: Line {
                start: *a,
                end: *b,
                color: color.unwrap_or(style.measurement_color),
                width: style.line_width,
                style: LineStyle::Dashed,
            },
            label: label(format_distance(value), geometry::midpoint(a, b), style),
            value,
        }))
    }

    /// An arc of `style.arc_radius` around `vertex`, sweeping from the
    /// `vertex→a` direction to the `vertex→c` direction, labelled on its bisector.
    pub fn angle(
        a: &Point3<f64>,
        vertex: &Point3<f64>,
        c: &Point3<f64>,
        style: &StyleConfig,
        color: Option<Color>,
    ) -> Result<Self, GeometryError> {
        validate_points(&[*a, *vertex, *c])?;
        let value = geometry::angle_degrees(a, vertex, c);
        let (x, y) = geometry::plane_frame(&(a - vertex), &(c - vertex));
        let half = value.to_radians() / 2.0;
        let label_position =
            vertex + (x.into_inner() * half.cos() + y.into_inner() * half.sin()) * style.arc_radius;

        Ok(MeasurementGeometry::Angle(AngleGeometry {
            arc: Arc {
                center: *vertex,
                radius: style.arc_radius,
                start_angle: 0.0,
                end_angle: value.to_radians(),
                normal: x.cross(&y.into_inner()),
                axis: x.into_inner(),
                segments: style.arc_segments,
                color: color.unwrap_or(style.measurement_color),
            },
            label: label(format_degrees(value), label_position, style),
            value,
        }))
    }

    /// Two translucent planes through `{p1, p2, p3}` and `{p2, p3, p4}` with the
    /// signed torsion labelled next to the central bond.
    pub fn dihedral(
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        p3: &Point3<f64>,
        p4: &Point3<f64>,
        style: &StyleConfig,
        color: Option<Color>,
    ) -> Result<Self, GeometryError> {
        validate_points(&[*p1, *p2, *p3, *p4])?;
        let value = geometry::dihedral_degrees(p1, p2, p3, p4);
        let (_, outward) = geometry::plane_frame(&(p3 - p2), &(p1 - p2));
        let label_position = geometry::midpoint(p2, p3) + outward.into_inner() * style.label_offset;

        Ok(MeasurementGeometry::Dihedral(DihedralGeometry {
            planes: PlanePair {
                plane1: [*p1, *p2, *p3],
                plane2: [*p2, *p3, *p4],
            },
            label: label(format_degrees(value), label_position, style),
            value,
            color: color.unwrap_or(style.measurement_color),
            opacity: style.plane_opacity,
        }))
    }

    pub fn kind(&self) -> MeasurementKind {
        match self {
            MeasurementGeometry::Distance(_) => MeasurementKind::Distance,
            MeasurementGeometry::Angle(_) => MeasurementKind::Angle,
            MeasurementGeometry::Dihedral(_) => MeasurementKind::Dihedral,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            MeasurementGeometry::Distance(g) => g.value,
            MeasurementGeometry::Angle(g) => g.value,
            MeasurementGeometry::Dihedral(g) => g.value,
        }
    }

    pub fn label(&self) -> &Label {
        match self {
            MeasurementGeometry::Distance(g) => &g.label,
            MeasurementGeometry::Angle(g) => &g.label,
            MeasurementGeometry::Dihedral(g) => &g.label,
        }
    }

    /// Primitives in creation order; the label is always last.
    pub fn primitives(&self) -> Vec<Primitive> {
        match self {
            MeasurementGeometry::Distance(g) => {
                vec![Primitive::Line(g.line.clone()), Primitive::Label(g.label.clone())]
            }
            MeasurementGeometry::Angle(g) => {
                vec![Primitive::Arc(g.arc.clone()), Primitive::Label(g.label.clone())]
            }
            MeasurementGeometry::Dihedral(g) => {
                let [plane1, plane2] = g.plane_primitives();
                vec![
                    Primitive::Plane(plane1),
                    Primitive::Plane(plane2),
                    Primitive::Label(g.label.clone()),
                ]
            }
        }
    }
}

pub fn format_distance(value: f64) -> String {
    format!("{:.1} Å", unsigned_zero(value))
}

pub fn format_degrees(value: f64) -> String {
    format!("{:.1}°", unsigned_zero(value))
}

/// Values that round to zero at one decimal print without a sign.
fn unsigned_zero(value: f64) -> f64 {
    if value.abs() < 0.05 { 0.0 } else { value }
}

pub(crate) fn label(text: String, position: Point3<f64>, style: &StyleConfig) -> Label {
    Label {
        text,
        position,
        billboard: true,
        style: LabelStyle {
            size: style.label_size,
            color: style.label_color,
        },
    }
}

fn validate_points(points: &[Point3<f64>]) -> Result<(), GeometryError> {
    match points
        .iter()
        .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
    {
        Some(index) => Err(GeometryError::InvalidPoint { index }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> StyleConfig {
        StyleConfig::default()
    }

    fn assert_point_close(actual: &Point3<f64>, expected: &Point3<f64>) {
        assert!(
            (actual - expected).norm() < 1e-6,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn distance_line_spans_the_points_and_labels_the_midpoint() {
        let a = Point3::origin();
        let b = Point3::new(3.0, 4.0, 0.0);
        let MeasurementGeometry::Distance(g) =
            MeasurementGeometry::distance(&a, &b, &style(), None).unwrap()
        else {
            panic!("expected distance geometry");
        };
        assert_eq!(g.line.start, a);
        assert_eq!(g.line.end, b);
        assert_eq!(g.label.text, "5.0 Å");
        assert_point_close(&g.label.position, &Point3::new(1.5, 2.0, 0.0));
        assert!(g.label.billboard);
    }

    #[test]
    fn distance_label_sits_at_the_midpoint_in_3d() {
        let geometry = MeasurementGeometry::distance(
            &Point3::origin(),
            &Point3::new(6.0, 8.0, 10.0),
            &style(),
            None,
        )
        .unwrap();
        assert_point_close(&geometry.label().position, &Point3::new(3.0, 4.0, 5.0));
    }

    #[test]
    fn angle_values_match_reference_geometry() {
        let a = Point3::new(1.0, 0.0, 0.0);
        let vertex = Point3::origin();
        for (c, expected) in [
            (Point3::new(0.0, 1.0, 0.0), 90.0),
            (Point3::new(0.5, 0.866, 0.0), 60.0),
            (Point3::new(-0.5, 0.866, 0.0), 120.0),
        ] {
            let geometry = MeasurementGeometry::angle(&a, &vertex, &c, &style(), None).unwrap();
            assert!((geometry.value() - expected).abs() < 0.01);
        }
    }

    #[test]
    fn angle_arc_is_centered_at_the_vertex_with_label_on_the_bisector() {
        let MeasurementGeometry::Angle(g) = MeasurementGeometry::angle(
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::origin(),
            &Point3::new(0.0, 5.0, 0.0),
            &style(),
            None,
        )
        .unwrap() else {
            panic!("expected angle geometry");
        };
        assert_eq!(g.arc.center, Point3::origin());
        assert_eq!(g.arc.radius, 0.8);
        assert!((g.arc.end_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert_point_close(&g.arc.point_at(g.arc.end_angle), &Point3::new(0.0, 0.8, 0.0));

        let d = 0.8 * std::f64::consts::FRAC_1_SQRT_2;
        assert_point_close(&g.label.position, &Point3::new(d, d, 0.0));
        assert_eq!(g.label.text, "90.0°");
    }

    #[test]
    fn degenerate_angle_has_zero_value_and_a_valid_frame() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let MeasurementGeometry::Angle(g) =
            MeasurementGeometry::angle(&p, &p, &p, &style(), None).unwrap()
        else {
            panic!("expected angle geometry");
        };
        assert_eq!(g.value, 0.0);
        assert!((g.arc.normal.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn dihedral_value_stays_in_range_and_builds_two_planes() {
        let p1 = Point3::new(1.0, 0.0, 0.0);
        let p2 = Point3::origin();
        let p3 = Point3::new(0.0, 0.0, 1.5);
        for p4 in [
            Point3::new(0.0, 1.0, 1.5),
            Point3::new(-1.0, -0.2, 1.5),
            Point3::new(0.3, -1.0, 1.5),
        ] {
            let geometry =
                MeasurementGeometry::dihedral(&p1, &p2, &p3, &p4, &style(), None).unwrap();
            assert!((-180.0..=180.0).contains(&geometry.value()));
            assert_eq!(geometry.primitives().len(), 3);
        }
        let MeasurementGeometry::Dihedral(g) = MeasurementGeometry::dihedral(
            &p1,
            &p2,
            &p3,
            &Point3::new(0.0, 1.0, 1.5),
            &style(),
            None,
        )
        .unwrap() else {
            panic!("expected dihedral geometry");
        };
        assert_eq!(g.planes.plane1, [p1, p2, p3]);
        assert_eq!(g.label.text, "90.0°");
        let from_bond = (g.label.position - Point3::new(0.0, 0.0, 0.75)).norm();
        assert!((from_bond - 0.3).abs() < 1e-9);
    }

    #[test]
    fn non_finite_points_are_rejected_with_their_index() {
        let bad = Point3::new(0.0, f64::NAN, 0.0);
        assert_eq!(
            MeasurementGeometry::distance(&Point3::origin(), &bad, &style(), None),
            Err(GeometryError::InvalidPoint { index: 1 })
        );
        assert_eq!(
            MeasurementGeometry::angle(
                &Point3::new(f64::INFINITY, 0.0, 0.0),
                &Point3::origin(),
                &Point3::origin(),
                &style(),
                None
            ),
            Err(GeometryError::InvalidPoint { index: 0 })
        );
    }

    #[test]
    fn build_checks_point_count() {
        let points = [Point3::origin(), Point3::new(1.0, 0.0, 0.0)];
        assert_eq!(
            MeasurementGeometry::build(MeasurementKind::Angle, &points, &style(), None),
            Err(GeometryError::PointCount {
                kind: MeasurementKind::Angle,
                expected: 3,
                found: 2
            })
        );
        let geometry =
            MeasurementGeometry::build(MeasurementKind::Distance, &points, &style(), None).unwrap();
        assert_eq!(geometry.kind(), MeasurementKind::Distance);
        assert_eq!(geometry.value(), 1.0);
    }

    #[test]
    fn custom_color_overrides_style_color() {
        let red = Color::new(1.0, 0.0, 0.0);
        let geometry = MeasurementGeometry::distance(
            &Point3::origin(),
            &Point3::new(1.0, 0.0, 0.0),
            &style(),
            Some(red),
        )
        .unwrap();
        assert_eq!(geometry.primitives()[0].color(), red);
    }

    #[test]
    fn measurement_kind_is_picked_from_atom_count() {
        assert_eq!(MeasurementKind::from_point_count(3), Some(MeasurementKind::Angle));
        assert_eq!(MeasurementKind::from_point_count(5), None);
    }

    #[test]
    fn values_rounding_to_zero_are_labelled_without_sign() {
        assert_eq!(format_degrees(-0.01), "0.0°");
        assert_eq!(format_degrees(-0.0), "0.0°");
        assert_eq!(format_degrees(-0.06), "-0.1°");
        assert_eq!(format_distance(-0.0), "0.0 Å");

        for offset in [1e-4, -1e-4] {
            let geometry = MeasurementGeometry::dihedral(
                &Point3::new(1.0, 0.0, 0.0),
                &Point3::origin(),
                &Point3::new(0.0, 0.0, 1.5),
                &Point3::new(1.0, offset, 1.5),
                &style(),
                None,
            )
            .unwrap();
            assert!(geometry.value().abs() < 0.05);
            assert_eq!(geometry.label().text, "0.0°");
        }
    }
}

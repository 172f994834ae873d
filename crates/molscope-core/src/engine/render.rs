//! The boundary between analysis results and a 3D rendering backend.
//!
//! Everything visible is described as a [`Primitive`]. A backend implements
//! [`RendererAdapter`] and hands back an opaque [`RepresentationId`] for every
//! primitive it creates; the library never inspects backend state beyond that.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    pub color: Color,
    pub width: f32,
    pub style: LineStyle,
}

/// A circular arc in the plane perpendicular to `normal`.
///
/// Angles are in radians, measured from `axis` towards `normal × axis`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arc {
    pub center: Point3<f64>,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub normal: Vector3<f64>,
    pub axis: Vector3<f64>,
    pub segments: u32,
    pub color: Color,
}

impl Arc {
    /// Point on the arc at `angle` radians from the start axis.
    pub fn point_at(&self, angle: f64) -> Point3<f64> {
        let in_plane = self.normal.cross(&self.axis);
        self.center + (self.axis * angle.cos() + in_plane * angle.sin()) * self.radius
    }
}

/// A translucent triangle through three atoms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plane {
    pub corners: [Point3<f64>; 3],
    pub color: Color,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelStyle {
    pub size: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub position: Point3<f64>,
    /// Always faces the camera.
    pub billboard: bool,
    pub style: LabelStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    Line(Line),
    Arc(Arc),
    Plane(Plane),
    Label(Label),
}

impl Primitive {
    pub fn color(&self) -> Color {
        match self {
            Primitive::Line(line) => line.color,
            Primitive::Arc(arc) => arc.color,
            Primitive::Plane(plane) => plane.color,
            Primitive::Label(label) => label.style.color,
        }
    }

    /// Returns a copy with its color replaced. Labels keep their text color.
    pub fn recolored(&self, color: Color) -> Primitive {
        let mut primitive = self.clone();
        match &mut primitive {
            Primitive::Line(line) => line.color = color,
            Primitive::Arc(arc) => arc.color = color,
            Primitive::Plane(plane) => plane.color = color,
            Primitive::Label(_) => {}
        }
        primitive
    }
}

/// Opaque identifier a renderer assigns to one created primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepresentationId(pub u64);

impl fmt::Display for RepresentationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RenderError {
    #[error("Unknown representation {0}")]
    UnknownRepresentation(RepresentationId),

    #[error("Renderer backend failure: {0}")]
    Backend(String),
}

pub trait RendererAdapter {
    fn create(&mut self, primitive: &Primitive) -> Result<RepresentationId, RenderError>;
    fn update(&mut self, id: RepresentationId, primitive: &Primitive) -> Result<(), RenderError>;
    fn set_visible(&mut self, id: RepresentationId, visible: bool) -> Result<(), RenderError>;
    fn remove(&mut self, id: RepresentationId) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredRepresentation {
    pub primitive: Primitive,
    pub visible: bool,
}

/// A headless renderer that keeps every primitive in memory.
///
/// Useful for exporting scene contents and for driving sessions without a
/// graphics backend.
#[derive(Debug, Default)]
pub struct InMemoryRenderer {
    next_id: u64,
    representations: BTreeMap<RepresentationId, StoredRepresentation>,
}

impl InMemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RepresentationId) -> Option<&StoredRepresentation> {
        self.representations.get(&id)
    }

    pub fn is_visible(&self, id: RepresentationId) -> Option<bool> {
        self.representations.get(&id).map(|stored| stored.visible)
    }

    pub fn len(&self) -> usize {
        self.representations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RepresentationId, &StoredRepresentation)> {
        self.representations.iter().map(|(&id, stored)| (id, stored))
    }

    fn stored_mut(&mut self, id: RepresentationId) -> Result<&mut StoredRepresentation, RenderError> {
        self.representations
            .get_mut(&id)
            .ok_or(RenderError::UnknownRepresentation(id))
    }
}

impl RendererAdapter for InMemoryRenderer {
    fn create(&mut self, primitive: &Primitive) -> Result<RepresentationId, RenderError> {
        self.next_id += 1;
        let id = RepresentationId(self.next_id);
        self.representations.insert(
            id,
            StoredRepresentation {
                primitive: primitive.clone(),
                visible: true,
            },
        );
        Ok(id)
    }

    fn update(&mut self, id: RepresentationId, primitive: &Primitive) -> Result<(), RenderError> {
        self.stored_mut(id)?.primitive = primitive.clone();
        Ok(())
    }

    fn set_visible(&mut self, id: RepresentationId, visible: bool) -> Result<(), RenderError> {
        self.stored_mut(id)?.visible = visible;
        Ok(())
    }

    fn remove(&mut self, id: RepresentationId) -> Result<(), RenderError> {
        self.representations
            .remove(&id)
            .map(|_| ())
            .ok_or(RenderError::UnknownRepresentation(id))
    }
}

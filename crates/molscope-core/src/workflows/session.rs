use crate::core::models::ids::AtomId;
use crate::core::models::residue::ResidueSpecifier;
use crate::core::models::structure::Structure;
use crate::core::spatial::SpatialIndex;
use crate::core::utils::geometry;
use crate::engine::config::{DetectionOptions, StyleConfig};
use crate::engine::error::{AnalysisError, GeometryError, VisualizationError};
use crate::engine::interactions::Interaction;
use crate::engine::measurement::{self, Measurement, MeasurementGeometry, MeasurementKind};
use crate::engine::registry::{BatchOutcome, HandleKind, VisualizationHandle, VisualizationRegistry};
use crate::engine::render::{Color, Line, LineStyle, Primitive, RendererAdapter, RepresentationId};
use nalgebra::Point3;
use std::cell::OnceCell;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceHandles {
    pub line_id: RepresentationId,
    pub label_id: RepresentationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AngleHandles {
    pub arc_id: RepresentationId,
    pub label_id: RepresentationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DihedralHandles {
    pub plane1_id: RepresentationId,
    pub plane2_id: RepresentationId,
    pub label_id: RepresentationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementHandles {
    Distance(DistanceHandles),
    Angle(AngleHandles),
    Dihedral(DihedralHandles),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionHandles {
    pub line_id: RepresentationId,
    pub label_id: RepresentationId,
}

/// Analysis state of one structure shown in one viewer.
///
/// A session owns its registry and renderer and borrows the structure, which
/// stays unchanged for the session's lifetime. The spatial index is built on
/// first use and shared by every later detection. Sessions share no state.
pub struct AnalysisSession<'s, R: RendererAdapter> {
    structure: &'s Structure,
    index: OnceCell<SpatialIndex>,
    registry: VisualizationRegistry,
    renderer: R,
    style: StyleConfig,
    /// Last primitive sent to the renderer for each live representation.
    primitives: HashMap<RepresentationId, Primitive>,
}

impl<'s, R: RendererAdapter> AnalysisSession<'s, R> {
    pub fn new(structure: &'s Structure, renderer: R) -> Self {
        Self {
            structure,
            index: OnceCell::new(),
            registry: VisualizationRegistry::new(),
            renderer,
            style: StyleConfig::default(),
            primitives: HashMap::new(),
        }
    }

    pub fn with_style(mut self, style: StyleConfig) -> Self {
        self.style = style;
        self
    }

    pub fn structure(&self) -> &'s Structure {
        self.structure
    }

    pub fn registry(&self) -> &VisualizationRegistry {
        &self.registry
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    fn index(&self) -> &SpatialIndex {
        self.index
            .get_or_init(|| SpatialIndex::build(self.structure))
    }

    /// Detects interactions around `focus` (or in the whole structure).
    pub fn detect(
        &self,
        focus: Option<&ResidueSpecifier>,
        options: &DetectionOptions,
    ) -> Result<Vec<Interaction>, AnalysisError> {
        super::detect::run_with_index(self.structure, self.index(), focus, options)
    }

    /// Draws a distance line between `a` and `b` with its length at the midpoint.
    #[instrument(skip_all, name = "build_distance", fields(id = %id))]
    pub fn build_distance(
        &mut self,
        id: &str,
        a: &Point3<f64>,
        b: &Point3<f64>,
        color: Option<Color>,
    ) -> Result<DistanceHandles, VisualizationError> {
        let geometry = MeasurementGeometry::distance(a, b, &self.style, color)?;
        let ids = self.realize_measurement(id, &geometry)?;
        Ok(DistanceHandles {
            line_id: ids[0],
            label_id: ids[1],
        })
    }

    /// Draws the arc of the angle `a-vertex-c` with its value on the bisector.
    #[instrument(skip_all, name = "build_angle", fields(id = %id))]
    pub fn build_angle(
        &mut self,
        id: &str,
        a: &Point3<f64>,
        vertex: &Point3<f64>,
        c: &Point3<f64>,
        color: Option<Color>,
    ) -> Result<AngleHandles, VisualizationError> {
        let geometry = MeasurementGeometry::angle(a, vertex, c, &self.style, color)?;
        let ids = self.realize_measurement(id, &geometry)?;
        Ok(AngleHandles {
            arc_id: ids[0],
            label_id: ids[1],
        })
    }

    /// Draws the two planes of the torsion `p1-p2-p3-p4` with its signed value.
    #[instrument(skip_all, name = "build_dihedral", fields(id = %id))]
    pub fn build_dihedral(
        &mut self,
        id: &str,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        p3: &Point3<f64>,
        p4: &Point3<f64>,
        color: Option<Color>,
    ) -> Result<DihedralHandles, VisualizationError> {
        let geometry = MeasurementGeometry::dihedral(p1, p2, p3, p4, &self.style, color)?;
        let ids = self.realize_measurement(id, &geometry)?;
        Ok(DihedralHandles {
            plane1_id: ids[0],
            plane2_id: ids[1],
            label_id: ids[2],
        })
    }

    /// Builds a measurement of `kind` from a slice of points.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::PointCount`] if `points` does not match `kind`.
    pub fn build_measurement(
        &mut self,
        id: &str,
        kind: MeasurementKind,
        points: &[Point3<f64>],
        color: Option<Color>,
    ) -> Result<MeasurementHandles, VisualizationError> {
        let geometry = MeasurementGeometry::build(kind, points, &self.style, color)?;
        let ids = self.realize_measurement(id, &geometry)?;
        Ok(match kind {
            MeasurementKind::Distance => MeasurementHandles::Distance(DistanceHandles {
                line_id: ids[0],
                label_id: ids[1],
            }),
            MeasurementKind::Angle => MeasurementHandles::Angle(AngleHandles {
                arc_id: ids[0],
                label_id: ids[1],
            }),
            MeasurementKind::Dihedral => MeasurementHandles::Dihedral(DihedralHandles {
                plane1_id: ids[0],
                plane2_id: ids[1],
                label_id: ids[2],
            }),
        })
    }

    /// Measures between atoms of the structure and draws the result.
    ///
    /// The measurement kind follows from the number of atoms.
    #[instrument(skip_all, name = "measure_atoms", fields(id = %id, atoms = atoms.len()))]
    pub fn measure_atoms(
        &mut self,
        id: &str,
        atoms: &[AtomId],
        color: Option<Color>,
    ) -> Result<Measurement, VisualizationError> {
        let kind = MeasurementKind::from_point_count(atoms.len())
            .ok_or(GeometryError::UnsupportedArity { found: atoms.len() })?;
        let points = atoms
            .iter()
            .map(|&atom_id| {
                self.structure
                    .atom(atom_id)
                    .map(|atom| atom.position)
                    .ok_or(AnalysisError::AtomNotFound(atom_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let geometry = MeasurementGeometry::build(kind, &points, &self.style, color)?;
        self.realize_measurement(id, &geometry)?;
        Measurement::from_atoms(id, atoms, geometry.value())
            .ok_or_else(|| GeometryError::UnsupportedArity { found: atoms.len() }.into())
    }

    /// Draws an interaction as a dashed line between its endpoints with the
    /// distance labelled at the midpoint. The registry id is the interaction id.
    #[instrument(skip_all, name = "show_interaction", fields(id = %interaction.id()))]
    pub fn show_interaction(
        &mut self,
        interaction: &Interaction,
    ) -> Result<InteractionHandles, VisualizationError> {
        let (start, end) = interaction.endpoints(self.structure)?;
        let kind = interaction.kind();
        let line = Primitive::Line(Line {
            start,
            end,
            color: self.style.interaction_color(kind),
            width: self.style.line_width,
            style: LineStyle::Dashed,
        });
        let label = Primitive::Label(measurement::label(
            measurement::format_distance(interaction.distance()),
            geometry::midpoint(&start, &end),
            &self.style,
        ));
        let hbond = interaction.as_hydrogen_bond();
        let handle_kind = HandleKind::Interaction {
            kind,
            strength: hbond.map(|hb| hb.strength),
            bond_type: hbond.map(|hb| hb.bond_type),
        };

        let ids = self.realize(interaction.id(), handle_kind, vec![line, label])?;
        Ok(InteractionHandles {
            line_id: ids[0],
            label_id: ids[1],
        })
    }

    /// Shows every interaction; failures are collected, not fatal.
    pub fn show_interactions(&mut self, interactions: &[Interaction]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for interaction in interactions {
            let result = self.show_interaction(interaction).map(|_| ());
            outcome.record(interaction.id(), result);
        }
        info!(
            shown = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "Displayed interactions."
        );
        outcome
    }

    /// Removes a visualization and every representation it owns.
    ///
    /// The handle leaves the registry even if the renderer fails to remove
    /// some of its representations; those are reported as orphaned.
    pub fn remove(&mut self, id: &str) -> Result<(), VisualizationError> {
        let handle = self.registry.remove(id)?;
        self.release(handle)
    }

    pub fn remove_many<S: AsRef<str>>(&mut self, ids: &[S]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for id in ids {
            let id = id.as_ref();
            let result = self.remove(id);
            outcome.record(id, result);
        }
        outcome
    }

    /// Shows or hides every representation of a visualization.
    ///
    /// Either all representations change or none do: on a renderer failure the
    /// ones already toggled are switched back. Representations that could not
    /// be switched back are reported as orphaned.
    pub fn set_visibility(&mut self, id: &str, visible: bool) -> Result<(), VisualizationError> {
        let handle = self
            .registry
            .get(id)
            .ok_or_else(|| VisualizationError::NotFound(id.to_string()))?;
        let previous = handle.visible;
        let representations = handle.representation_ids.clone();

        for (done, &representation) in representations.iter().enumerate() {
            if let Err(source) = self.renderer.set_visible(representation, visible) {
                let orphaned: Vec<RepresentationId> = representations[..done]
                    .iter()
                    .copied()
                    .filter(|&toggled| self.renderer.set_visible(toggled, previous).is_err())
                    .collect();
                warn!(id, visible, "Renderer failed to change visibility; reverted.");
                return Err(VisualizationError::Renderer {
                    id: id.to_string(),
                    source,
                    orphaned,
                });
            }
        }
        self.registry.set_visibility(id, visible)
    }

    pub fn hide_many<S: AsRef<str>>(&mut self, ids: &[S]) -> BatchOutcome {
        self.set_visibility_many(ids, false)
    }

    pub fn show_many<S: AsRef<str>>(&mut self, ids: &[S]) -> BatchOutcome {
        self.set_visibility_many(ids, true)
    }

    fn set_visibility_many<S: AsRef<str>>(&mut self, ids: &[S], visible: bool) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for id in ids {
            let id = id.as_ref();
            let result = self.set_visibility(id, visible);
            outcome.record(id, result);
        }
        outcome
    }

    /// Changes the color of every representation of a visualization except
    /// its label. Atomic in the same way as [`set_visibility`](Self::set_visibility).
    pub fn recolor(&mut self, id: &str, color: Color) -> Result<(), VisualizationError> {
        let handle = self
            .registry
            .get(id)
            .ok_or_else(|| VisualizationError::NotFound(id.to_string()))?;
        let updates: Vec<(RepresentationId, Primitive, Primitive)> = handle
            .representation_ids
            .iter()
            .filter_map(|representation| {
                let old = self.primitives.get(representation)?;
                Some((*representation, old.clone(), old.recolored(color)))
            })
            .collect();

        for (done, (representation, _, new)) in updates.iter().enumerate() {
            if let Err(source) = self.renderer.update(*representation, new) {
                let orphaned: Vec<RepresentationId> = updates[..done]
                    .iter()
                    .filter(|(updated, old, _)| self.renderer.update(*updated, old).is_err())
                    .map(|(updated, _, _)| *updated)
                    .collect();
                warn!(id, "Renderer failed to recolor; reverted.");
                return Err(VisualizationError::Renderer {
                    id: id.to_string(),
                    source,
                    orphaned,
                });
            }
        }
        for (representation, _, new) in updates {
            self.primitives.insert(representation, new);
        }
        Ok(())
    }

    /// Removes every visualization of the session.
    ///
    /// The registry is emptied in one step; renderer failures are reported per
    /// visualization, in registration order.
    pub fn clear(&mut self) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for handle in self.registry.clear() {
            let id = handle.id.clone();
            let result = self.release(handle);
            outcome.record(&id, result);
        }
        info!(removed = outcome.succeeded.len(), "Cleared session.");
        outcome
    }

    /// Removes the representations of a handle that already left the registry.
    fn release(&mut self, handle: VisualizationHandle) -> Result<(), VisualizationError> {
        let mut orphaned = Vec::new();
        let mut first_error = None;
        for representation in handle.representation_ids {
            self.primitives.remove(&representation);
            if let Err(error) = self.renderer.remove(representation) {
                orphaned.push(representation);
                first_error.get_or_insert(error);
            }
        }
        match first_error {
            None => {
                debug!(id = %handle.id, "Removed visualization.");
                Ok(())
            }
            Some(source) => {
                warn!(id = %handle.id, orphaned = orphaned.len(), "Renderer failed during removal.");
                Err(VisualizationError::Renderer {
                    id: handle.id,
                    source,
                    orphaned,
                })
            }
        }
    }

    fn realize_measurement(
        &mut self,
        id: &str,
        geometry: &MeasurementGeometry,
    ) -> Result<Vec<RepresentationId>, VisualizationError> {
        let ids = self.realize(
            id,
            HandleKind::Measurement(geometry.kind()),
            geometry.primitives(),
        )?;
        debug!(id, kind = %geometry.kind(), value = geometry.value(), "Built measurement.");
        Ok(ids)
    }

    /// Creates one representation per primitive and registers them under `id`.
    ///
    /// Returns the representation ids in primitive order. If the renderer
    /// refuses a primitive, the representations created so far are removed
    /// again and nothing is registered.
    fn realize(
        &mut self,
        id: &str,
        kind: HandleKind,
        primitives: Vec<Primitive>,
    ) -> Result<Vec<RepresentationId>, VisualizationError> {
        if self.registry.contains(id) {
            return Err(VisualizationError::DuplicateId(id.to_string()));
        }
        if primitives.is_empty() {
            return Err(VisualizationError::EmptyRepresentation(id.to_string()));
        }

        let mut created = Vec::with_capacity(primitives.len());
        for primitive in &primitives {
            match self.renderer.create(primitive) {
                Ok(representation) => created.push(representation),
                Err(source) => {
                    let orphaned: Vec<RepresentationId> = created
                        .into_iter()
                        .filter(|&representation| self.renderer.remove(representation).is_err())
                        .collect();
                    warn!(id, orphaned = orphaned.len(), "Renderer failed; rolled back.");
                    return Err(VisualizationError::Renderer {
                        id: id.to_string(),
                        source,
                        orphaned,
                    });
                }
            }
        }

        self.registry.register(id, kind, created.clone())?;
        self.primitives
            .extend(created.iter().copied().zip(primitives));
        Ok(created)
    }
}

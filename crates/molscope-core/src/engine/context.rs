use super::chemistry::Perception;
use super::config::DetectionOptions;
use super::error::AnalysisError;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::residue::ResidueSpecifier;
use crate::core::models::structure::Structure;
use crate::core::spatial::SpatialIndex;
use std::collections::HashSet;
use tracing::debug;

/// Everything a detection task needs for one run.
pub struct DetectionContext<'a> {
    pub structure: &'a Structure,
    pub index: &'a SpatialIndex,
    pub options: &'a DetectionOptions,
    /// Atoms taking part in this run, in record order.
    pub candidates: Vec<AtomId>,
    candidate_set: HashSet<AtomId>,
}

impl<'a> DetectionContext<'a> {
    /// Resolves the focus and gathers the candidate atoms.
    ///
    /// Without a focus every atom is a candidate. With a focus, candidates are
    /// the atoms within `options.search_radius` of any atom of the focal residue.
    pub fn new(
        structure: &'a Structure,
        index: &'a SpatialIndex,
        focus: Option<&ResidueSpecifier>,
        options: &'a DetectionOptions,
    ) -> Result<Self, AnalysisError> {
        let candidates: Vec<AtomId> = match focus {
            None => structure.atoms_iter().map(|(id, _)| id).collect(),
            Some(spec) => {
                let residue_id = structure
                    .find_residue(spec)
                    .ok_or_else(|| AnalysisError::ResidueNotFound { spec: spec.clone() })?;
                let near = gather_near_residue(structure, index, residue_id, options.search_radius);
                structure
                    .atoms_iter()
                    .map(|(id, _)| id)
                    .filter(|id| near.contains(id))
                    .collect()
            }
        };
        debug!(candidates = candidates.len(), "Gathered candidate atoms.");

        let candidate_set = candidates.iter().copied().collect();
        Ok(Self {
            structure,
            index,
            options,
            candidates,
            candidate_set,
        })
    }

    pub fn perception(&self) -> Perception<'a> {
        Perception::new(self.structure, self.index)
    }

    pub fn is_candidate(&self, atom_id: AtomId) -> bool {
        self.candidate_set.contains(&atom_id)
    }

    pub fn residue_of(&self, atom_id: AtomId) -> Option<ResidueId> {
        self.structure.atom(atom_id).map(|atom| atom.residue_id)
    }

    /// Returns `true` if both atoms exist and belong to different residues.
    pub fn in_different_residues(&self, a: AtomId, b: AtomId) -> bool {
        match (self.residue_of(a), self.residue_of(b)) {
            (Some(ra), Some(rb)) => ra != rb,
            _ => false,
        }
    }

    /// Residues owning at least one candidate atom, in first-seen order.
    pub fn candidate_residues(&self) -> Vec<ResidueId> {
        let mut seen = HashSet::new();
        self.candidates
            .iter()
            .filter_map(|&id| self.residue_of(id))
            .filter(|&residue_id| seen.insert(residue_id))
            .collect()
    }
}

fn gather_near_residue(
    structure: &Structure,
    index: &SpatialIndex,
    residue_id: ResidueId,
    radius: f64,
) -> HashSet<AtomId> {
    let mut near = HashSet::new();
    let Some(residue) = structure.residue(residue_id) else {
        return near;
    };
    for &atom_id in residue.atoms() {
        if let Some(atom) = structure.atom(atom_id) {
            near.extend(index.query(&atom.position, radius));
        }
    }
    near
}

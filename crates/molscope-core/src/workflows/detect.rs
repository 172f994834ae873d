use crate::core::models::residue::ResidueSpecifier;
use crate::core::models::structure::Structure;
use crate::core::spatial::SpatialIndex;
use crate::engine::config::DetectionOptions;
use crate::engine::context::DetectionContext;
use crate::engine::error::AnalysisError;
use crate::engine::interactions::{Interaction, InteractionKind};
use crate::engine::tasks;
use tracing::{debug, info, instrument};

/// Detects non-covalent interactions in `structure`.
///
/// Builds a fresh [`SpatialIndex`]; callers that detect repeatedly on the
/// same structure should keep an index and use [`run_with_index`].
///
/// # Errors
///
/// Returns [`AnalysisError::Config`] for invalid options and
/// [`AnalysisError::ResidueNotFound`] if `focus` names no residue.
pub fn run(
    structure: &Structure,
    focus: Option<&ResidueSpecifier>,
    options: &DetectionOptions,
) -> Result<Vec<Interaction>, AnalysisError> {
    let index = SpatialIndex::build(structure);
    run_with_index(structure, &index, focus, options)
}

/// Detects interactions using a prebuilt index of `structure`.
///
/// Interactions are grouped by type in the order of [`InteractionKind::ALL`].
#[instrument(skip_all, name = "detection_workflow")]
pub fn run_with_index(
    structure: &Structure,
    index: &SpatialIndex,
    focus: Option<&ResidueSpecifier>,
    options: &DetectionOptions,
) -> Result<Vec<Interaction>, AnalysisError> {
    options.validate()?;
    if structure.is_empty() {
        debug!("Structure has no atoms; nothing to detect.");
        return Ok(Vec::new());
    }

    info!(
        atoms = structure.atom_count(),
        focus = ?focus,
        filter = ?options.filter,
        "Starting interaction detection."
    );
    let context = DetectionContext::new(structure, index, focus, options)?;

    let mut interactions = Vec::new();
    for kind in InteractionKind::ALL {
        if !options.filter.includes(kind) {
            continue;
        }
        let before = interactions.len();
        match kind {
            InteractionKind::HydrogenBond => interactions.extend(
                tasks::hydrogen_bonds::run(&context)
                    .into_iter()
                    .map(Interaction::HydrogenBond),
            ),
            InteractionKind::SaltBridge => interactions.extend(
                tasks::salt_bridges::run(&context)
                    .into_iter()
                    .map(Interaction::SaltBridge),
            ),
            InteractionKind::Hydrophobic => interactions.extend(
                tasks::hydrophobic::run(&context)
                    .into_iter()
                    .map(Interaction::Hydrophobic),
            ),
            InteractionKind::PiStacking => interactions.extend(
                tasks::pi_stacking::run(&context)
                    .into_iter()
                    .map(Interaction::PiStacking),
            ),
            InteractionKind::CationPi => interactions.extend(
                tasks::cation_pi::run(&context)
                    .into_iter()
                    .map(Interaction::CationPi),
            ),
        }
        debug!(%kind, found = interactions.len() - before, "Task finished.");
    }

    info!(
        "Detection complete. Found {} interaction(s).",
        interactions.len()
    );
    Ok(interactions)
}

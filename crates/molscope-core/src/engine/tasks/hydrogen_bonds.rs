use super::keep_best_by_key;
use crate::core::models::atom::AtomRole;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::utils::geometry;
use crate::engine::context::DetectionContext;
use crate::engine::hydrogens;
use crate::engine::interactions::{
    HBondStrength, HBondType, HydrogenBond, HydrogenSite, InteractionKind, atom_key,
};
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

struct Donor {
    atom: AtomId,
    position: Point3<f64>,
    heavy_neighbors: Vec<Point3<f64>>,
    hydrogens: Vec<(AtomId, Point3<f64>)>,
}

#[derive(Debug, Clone)]
struct Contact {
    donor: AtomId,
    acceptor: AtomId,
    hydrogen: HydrogenSite,
    distance: f64,
    angle: f64,
}

#[instrument(skip_all, name = "hydrogen_bond_task")]
pub fn run(context: &DetectionContext) -> Vec<HydrogenBond> {
    let options = context.options;
    let max_distance = options.max_distance_for(InteractionKind::HydrogenBond);
    let min_distance = options.criteria.hbond_min_distance;
    info!(
        max_distance,
        min_angle = options.min_angle,
        infer_hydrogens = options.infer_hydrogens,
        "Detecting hydrogen bonds."
    );

    if max_distance < min_distance {
        return Vec::new();
    }

    let donors: Vec<Donor> = context
        .candidates
        .iter()
        .filter_map(|&atom_id| donor_site(context, atom_id))
        .collect();
    let perception = context.perception();
    let acceptors: HashSet<AtomId> = context
        .candidates
        .iter()
        .copied()
        .filter(|&atom_id| takes_part(context, atom_id) && perception.is_acceptor(atom_id))
        .collect();
    debug!(
        donors = donors.len(),
        acceptors = acceptors.len(),
        "Partitioned polar atoms."
    );

    #[cfg(not(feature = "parallel"))]
    let iterator = donors.iter();

    #[cfg(feature = "parallel")]
    let iterator = donors.par_iter();

    let per_donor: Vec<Vec<Contact>> = iterator
        .map(|donor| contacts_from_donor(context, donor, &acceptors, min_distance, max_distance))
        .collect();

    let contacts = keep_best_by_key(
        per_donor.into_iter().flatten(),
        |contact| unordered(contact.donor, contact.acceptor),
        |new, old| {
            new.angle > old.angle || (new.angle == old.angle && new.distance < old.distance)
        },
    );

    let bonds = classify(context, contacts);
    info!(num_bonds = bonds.len(), "Hydrogen bond detection complete.");
    bonds
}

fn takes_part(context: &DetectionContext, atom_id: AtomId) -> bool {
    context.structure.atom(atom_id).is_some_and(|atom| {
        !atom.is_hydrogen() && (context.options.include_water || atom.role != AtomRole::Water)
    })
}

fn donor_site(context: &DetectionContext, atom_id: AtomId) -> Option<Donor> {
    let atom = context.structure.atom(atom_id)?;
    if !atom.element.is_polar() || !takes_part(context, atom_id) {
        return None;
    }

    let perception = context.perception();
    let neighborhood = perception.neighborhood(atom_id);
    let position_of = |id: AtomId| context.structure.atom(id).map(|a| a.position);

    let hydrogens: Vec<(AtomId, Point3<f64>)> = neighborhood
        .hydrogens
        .iter()
        .filter_map(|&h| position_of(h).map(|p| (h, p)))
        .collect();
    if hydrogens.is_empty()
        && !(context.options.infer_hydrogens
            && perception.has_inferable_hydrogen(atom_id, &neighborhood))
    {
        return None;
    }

    Some(Donor {
        atom: atom_id,
        position: atom.position,
        heavy_neighbors: neighborhood.heavy.iter().filter_map(|&n| position_of(n)).collect(),
        hydrogens,
    })
}

fn contacts_from_donor(
    context: &DetectionContext,
    donor: &Donor,
    acceptors: &HashSet<AtomId>,
    min_distance: f64,
    max_distance: f64,
) -> Vec<Contact> {
    let min_angle = context.options.min_angle;
    let bond_length = context.options.criteria.inferred_hydrogen_length;

    context
        .index
        .query_excluding(&donor.position, max_distance, donor.atom)
        .into_iter()
        .filter(|&acceptor| {
            acceptors.contains(&acceptor) && context.in_different_residues(donor.atom, acceptor)
        })
        .filter_map(|acceptor| {
            let acceptor_position = context.structure.atom(acceptor)?.position;
            let distance = geometry::distance(&donor.position, &acceptor_position);
            if distance < min_distance {
                return None;
            }

            let (hydrogen, angle) = if donor.hydrogens.is_empty() {
                let position = hydrogens::infer_hydrogen(
                    &donor.position,
                    &donor.heavy_neighbors,
                    &acceptor_position,
                    bond_length,
                );
                let angle = geometry::angle_degrees(&donor.position, &position, &acceptor_position);
                (HydrogenSite::Inferred { position }, angle)
            } else {
                donor
                    .hydrogens
                    .iter()
                    .map(|&(atom, position)| {
                        let angle =
                            geometry::angle_degrees(&donor.position, &position, &acceptor_position);
                        (HydrogenSite::Explicit { atom, position }, angle)
                    })
                    .max_by(|a, b| a.1.total_cmp(&b.1))?
            };

            (angle >= min_angle).then_some(Contact {
                donor: donor.atom,
                acceptor,
                hydrogen,
                distance,
                angle,
            })
        })
        .collect()
}

fn classify(context: &DetectionContext, contacts: Vec<Contact>) -> Vec<HydrogenBond> {
    let structure = context.structure;
    let role = |id: AtomId| structure.atom(id).map(|a| a.role).unwrap_or_default();
    let is_water = |id: AtomId| role(id) == AtomRole::Water;

    // Residues each water bonds to; a bridge needs two different ones.
    let mut water_partners: HashMap<AtomId, HashSet<ResidueId>> = HashMap::new();
    for contact in &contacts {
        for (water, partner) in [
            (contact.donor, contact.acceptor),
            (contact.acceptor, contact.donor),
        ] {
            if is_water(water) && !is_water(partner) {
                if let Some(residue) = context.residue_of(partner) {
                    water_partners.entry(water).or_default().insert(residue);
                }
            }
        }
    }
    let bridges = |water: AtomId, other: AtomId| {
        let other_residue = context.residue_of(other);
        is_water(water)
            && water_partners
                .get(&water)
                .is_some_and(|residues| residues.iter().any(|&r| Some(r) != other_residue))
    };

    contacts
        .into_iter()
        .map(|contact| {
            let water_bridges = bridges(contact.donor, contact.acceptor)
                || bridges(contact.acceptor, contact.donor);
            HydrogenBond {
                id: format!(
                    "hbond:{}->{}",
                    atom_key(structure, contact.donor),
                    atom_key(structure, contact.acceptor)
                ),
                donor: contact.donor,
                acceptor: contact.acceptor,
                strength: HBondStrength::classify(contact.distance, contact.angle),
                bond_type: HBondType::classify(
                    role(contact.donor),
                    role(contact.acceptor),
                    water_bridges,
                ),
                hydrogen: contact.hydrogen,
                distance: contact.distance,
                angle: contact.angle,
            }
        })
        .collect()
}

fn unordered(a: AtomId, b: AtomId) -> (AtomId, AtomId) {
    if a <= b { (a, b) } else { (b, a) }
}

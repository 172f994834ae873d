use super::chemistry::AromaticRing;
use super::error::AnalysisError;
use crate::core::models::atom::AtomRole;
use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionKind {
    HydrogenBond,
    SaltBridge,
    Hydrophobic,
    PiStacking,
    CationPi,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 5] = [
        InteractionKind::HydrogenBond,
        InteractionKind::SaltBridge,
        InteractionKind::Hydrophobic,
        InteractionKind::PiStacking,
        InteractionKind::CationPi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionKind::HydrogenBond => "hydrogen-bond",
            InteractionKind::SaltBridge => "salt-bridge",
            InteractionKind::Hydrophobic => "hydrophobic",
            InteractionKind::PiStacking => "pi-stacking",
            InteractionKind::CationPi => "cation-pi",
        }
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HBondStrength {
    Strong,
    Moderate,
    Weak,
}

impl HBondStrength {
    /// Buckets a hydrogen bond by donor-acceptor distance (Å) and D-H···A angle (°).
    ///
    /// Values on a boundary fall into the weaker bucket.
    pub fn classify(distance: f64, angle: f64) -> Self {
        if distance < 2.8 && angle > 170.0 {
            HBondStrength::Strong
        } else if distance < 3.2 && angle > 140.0 {
            HBondStrength::Moderate
        } else {
            HBondStrength::Weak
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HBondType {
    BackboneBackbone,
    BackboneSidechain,
    SidechainSidechain,
    BasePair,
    WaterMediated,
}

impl HBondType {
    /// Classifies a bond from its partner roles.
    ///
    /// `water_bridges` is set when a water partner also bonds a non-water
    /// atom of a residue other than this bond's partner.
    pub fn classify(donor: AtomRole, acceptor: AtomRole, water_bridges: bool) -> Self {
        if donor == AtomRole::NucleicBase && acceptor == AtomRole::NucleicBase {
            HBondType::BasePair
        } else if water_bridges {
            HBondType::WaterMediated
        } else {
            match (donor.is_backbone(), acceptor.is_backbone()) {
                (true, true) => HBondType::BackboneBackbone,
                (true, false) | (false, true) => HBondType::BackboneSidechain,
                (false, false) => HBondType::SidechainSidechain,
            }
        }
    }
}

/// The hydrogen of a hydrogen bond: either an atom of the structure or a
/// position placed by inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HydrogenSite {
    Explicit { atom: AtomId, position: Point3<f64> },
    Inferred { position: Point3<f64> },
}

impl HydrogenSite {
    pub fn position(&self) -> Point3<f64> {
        match self {
            HydrogenSite::Explicit { position, .. } | HydrogenSite::Inferred { position } => {
                *position
            }
        }
    }

    pub fn is_inferred(&self) -> bool {
        matches!(self, HydrogenSite::Inferred { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrogenBond {
    pub id: String,
    pub donor: AtomId,
    pub hydrogen: HydrogenSite,
    pub acceptor: AtomId,
    /// Donor-acceptor heavy-atom distance.
    pub distance: f64,
    /// D-H···A angle in degrees.
    pub angle: f64,
    pub strength: HBondStrength,
    pub bond_type: HBondType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaltBridge {
    pub id: String,
    pub cation: AtomId,
    pub anion: AtomId,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrophobicContact {
    pub id: String,
    pub atom_a: AtomId,
    pub atom_b: AtomId,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackingGeometry {
    Parallel,
    TShaped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiStacking {
    pub id: String,
    pub ring_a: AromaticRing,
    pub ring_b: AromaticRing,
    /// Centroid-centroid distance.
    pub distance: f64,
    /// Angle between ring normals, folded into `[0, 90]`.
    pub angle: f64,
    /// Lateral displacement of the second centroid from the first ring normal.
    pub offset: f64,
    pub geometry: StackingGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CationPi {
    pub id: String,
    pub cation: AtomId,
    pub ring: AromaticRing,
    pub distance: f64,
    /// Angle between the ring normal and the centroid→cation vector, folded into `[0, 90]`.
    pub angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Interaction {
    HydrogenBond(HydrogenBond),
    SaltBridge(SaltBridge),
    Hydrophobic(HydrophobicContact),
    PiStacking(PiStacking),
    CationPi(CationPi),
}

impl Interaction {
    pub fn id(&self) -> &str {
        match self {
            Interaction::HydrogenBond(hb) => &hb.id,
            Interaction::SaltBridge(sb) => &sb.id,
            Interaction::Hydrophobic(hc) => &hc.id,
            Interaction::PiStacking(ps) => &ps.id,
            Interaction::CationPi(cp) => &cp.id,
        }
    }

    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::HydrogenBond(_) => InteractionKind::HydrogenBond,
            Interaction::SaltBridge(_) => InteractionKind::SaltBridge,
            Interaction::Hydrophobic(_) => InteractionKind::Hydrophobic,
            Interaction::PiStacking(_) => InteractionKind::PiStacking,
            Interaction::CationPi(_) => InteractionKind::CationPi,
        }
    }

    pub fn distance(&self) -> f64 {
        match self {
            Interaction::HydrogenBond(hb) => hb.distance,
            Interaction::SaltBridge(sb) => sb.distance,
            Interaction::Hydrophobic(hc) => hc.distance,
            Interaction::PiStacking(ps) => ps.distance,
            Interaction::CationPi(cp) => cp.distance,
        }
    }

    pub fn angle(&self) -> Option<f64> {
        match self {
            Interaction::HydrogenBond(hb) => Some(hb.angle),
            Interaction::PiStacking(ps) => Some(ps.angle),
            Interaction::CationPi(cp) => Some(cp.angle),
            Interaction::SaltBridge(_) | Interaction::Hydrophobic(_) => None,
        }
    }

    pub fn as_hydrogen_bond(&self) -> Option<&HydrogenBond> {
        match self {
            Interaction::HydrogenBond(hb) => Some(hb),
            _ => None,
        }
    }

    /// The two points an interaction is drawn between.
    ///
    /// Atom endpoints are resolved against `structure`; ring endpoints are
    /// ring centroids.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::AtomNotFound`] if an atom does not belong to `structure`.
    pub fn endpoints(
        &self,
        structure: &Structure,
    ) -> Result<(Point3<f64>, Point3<f64>), AnalysisError> {
        let position = |id: AtomId| {
            structure
                .atom(id)
                .map(|atom| atom.position)
                .ok_or(AnalysisError::AtomNotFound(id))
        };
        match self {
            Interaction::HydrogenBond(hb) => Ok((position(hb.donor)?, position(hb.acceptor)?)),
            Interaction::SaltBridge(sb) => Ok((position(sb.cation)?, position(sb.anion)?)),
            Interaction::Hydrophobic(hc) => Ok((position(hc.atom_a)?, position(hc.atom_b)?)),
            Interaction::PiStacking(ps) => Ok((ps.ring_a.centroid, ps.ring_b.centroid)),
            Interaction::CationPi(cp) => Ok((position(cp.cation)?, cp.ring.centroid)),
        }
    }
}

/// Stable textual key of an atom, used to build interaction ids.
pub(crate) fn atom_key(structure: &Structure, atom_id: AtomId) -> String {
    structure
        .atom_label(atom_id)
        .unwrap_or_else(|| format!("{atom_id:?}"))
}

/// Stable textual key of a ring, e.g. `A:TRP48#1`.
pub(crate) fn ring_key(structure: &Structure, ring: &AromaticRing) -> String {
    let label = structure.residue(ring.residue).and_then(|residue| {
        let chain = structure.chain(residue.chain_id)?;
        Some(format!("{}:{}{}", chain.id, residue.name, residue.number))
    });
    match label {
        Some(label) => format!("{}#{}", label, ring.ring_index),
        None => format!("{:?}#{}", ring.residue, ring.ring_index),
    }
}

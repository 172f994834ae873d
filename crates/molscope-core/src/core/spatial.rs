//! Radius queries over the atoms of a [`Structure`].
//!
//! The index is built once per structure and is immutable afterwards; a changed
//! structure needs a fresh [`SpatialIndex::build`]. Queries are answered by a
//! kd-tree pre-filter followed by an exact distance check, so results contain
//! every atom within the radius (inclusive) and nothing else.
//!
//! Atoms are stored in a fixed rotated frame, so planar sheets and lattices
//! that are aligned with the coordinate axes do not pile up on one splitting
//! value. Distances are unchanged by the rotation. If the rotated coordinates
//! still repeat one value often enough to fill a whole kd-tree leaf, for
//! example dozens of atoms stacked on one position, queries fall back to an
//! exact scan.

use crate::core::models::ids::AtomId;
use crate::core::models::structure::Structure;
use itertools::Itertools;
use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::{Point3, Rotation3};
use slotmap::SecondaryMap;
use tracing::{debug, warn};

/// Tolerance added to the sum of covalent radii when perceiving bonds.
pub const COVALENT_TOLERANCE: f64 = 0.45;
/// Atoms closer than this are treated as alternate locations, not bonded.
const MIN_BONDED_DISTANCE: f64 = 0.4;
/// Largest covalent radius considered when widening neighbor queries.
const MAX_COVALENT_RADIUS: f64 = 1.5;
/// Widening of the kd-tree search radius in Å; the exact check trims it back.
const PREFILTER_MARGIN: f64 = 1e-6;
/// Leaf capacity of `kiddo::KdTree<f64, 3>`. A leaf can only be split if its
/// items do not all share the splitting value.
const BUCKET_SIZE: usize = 32;
/// Euler angles (roll, pitch, yaw) of the indexing frame.
const FRAME_ANGLES: (f64, f64, f64) = (0.6154, 0.4636, 0.2915);

enum Partition {
    Empty,
    Tree(KdTree<f64, 3>),
    Scan,
}

pub struct SpatialIndex {
    ids: Vec<AtomId>,
    positions: Vec<[f64; 3]>,
    slots: SecondaryMap<AtomId, usize>,
    frame: Rotation3<f64>,
    partition: Partition,
}

impl SpatialIndex {
    /// Builds the index over every atom of `structure`.
    ///
    /// Atoms with non-finite coordinates are kept for lookups but never match
    /// a query.
    pub fn build(structure: &Structure) -> Self {
        let mut ids = Vec::with_capacity(structure.atom_count());
        let mut positions = Vec::with_capacity(structure.atom_count());
        let mut slots = SecondaryMap::with_capacity(structure.atom_count());

        for (slot, (atom_id, atom)) in structure.atoms_iter().enumerate() {
            ids.push(atom_id);
            positions.push([atom.position.x, atom.position.y, atom.position.z]);
            slots.insert(atom_id, slot);
        }

        let (roll, pitch, yaw) = FRAME_ANGLES;
        let frame = Rotation3::from_euler_angles(roll, pitch, yaw);
        let framed: Vec<(usize, [f64; 3])> = positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.iter().all(|v| v.is_finite()))
            .map(|(slot, p)| (slot, to_frame(&frame, p)))
            .collect();

        let partition = if framed.is_empty() {
            Partition::Empty
        } else if has_crowded_axis(&framed) {
            warn!(
                atoms = framed.len(),
                "Too many atoms share a coordinate for a kd-tree; using an exact scan."
            );
            Partition::Scan
        } else {
            let mut tree: KdTree<f64, 3> = KdTree::with_capacity(framed.len());
            for (slot, point) in &framed {
                tree.add(point, *slot as u64);
            }
            Partition::Tree(tree)
        };

        debug!(atoms = ids.len(), "Built spatial index.");

        Self {
            ids,
            positions,
            slots,
            frame,
            partition,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` if `atom_id` was part of the indexed structure.
    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.slots.contains_key(atom_id)
    }

    /// Returns every atom within `radius` of `origin` (inclusive), in record order.
    pub fn query(&self, origin: &Point3<f64>, radius: f64) -> Vec<AtomId> {
        self.query_slots(origin, radius)
            .into_iter()
            .map(|slot| self.ids[slot])
            .collect()
    }

    /// Like [`query`](Self::query) but leaves out `excluded` itself.
    pub fn query_excluding(&self, origin: &Point3<f64>, radius: f64, excluded: AtomId) -> Vec<AtomId> {
        let excluded_slot = self.slots.get(excluded).copied();
        self.query_slots(origin, radius)
            .into_iter()
            .filter(|&slot| Some(slot) != excluded_slot)
            .map(|slot| self.ids[slot])
            .collect()
    }

    /// Perceives the covalent neighbors of an atom from interatomic distances.
    ///
    /// Two atoms are bonded when their distance does not exceed the sum of their
    /// covalent radii plus [`COVALENT_TOLERANCE`].
    pub fn covalent_neighbors(&self, structure: &Structure, atom_id: AtomId) -> Vec<AtomId> {
        let Some(atom) = structure.atom(atom_id) else {
            return Vec::new();
        };
        let own_radius = atom.element.covalent_radius();
        let search_radius = own_radius + MAX_COVALENT_RADIUS + COVALENT_TOLERANCE;

        self.query_excluding(&atom.position, search_radius, atom_id)
            .into_iter()
            .filter(|&other_id| {
                structure.atom(other_id).is_some_and(|other| {
                    let d = (other.position - atom.position).norm();
                    let limit = own_radius + other.element.covalent_radius() + COVALENT_TOLERANCE;
                    d > MIN_BONDED_DISTANCE && d <= limit
                })
            })
            .collect()
    }

    fn query_slots(&self, origin: &Point3<f64>, radius: f64) -> Vec<usize> {
        if !(radius >= 0.0) || !radius.is_finite() {
            return Vec::new();
        }

        let query = [origin.x, origin.y, origin.z];
        let radius_sq = radius * radius;
        let within = |slot: &usize| squared_distance(&self.positions[*slot], &query) <= radius_sq;

        match &self.partition {
            Partition::Empty => Vec::new(),
            Partition::Scan => (0..self.positions.len()).filter(within).collect(),
            Partition::Tree(tree) => {
                let prefilter = (radius + PREFILTER_MARGIN).powi(2);
                let mut slots: Vec<usize> = tree
                    .within_unsorted::<SquaredEuclidean>(&to_frame(&self.frame, &query), prefilter)
                    .into_iter()
                    .map(|neighbour| neighbour.item as usize)
                    .filter(within)
                    .collect();
                slots.sort_unstable();
                slots
            }
        }
    }
}

fn to_frame(frame: &Rotation3<f64>, position: &[f64; 3]) -> [f64; 3] {
    let p = frame * Point3::from(*position);
    [p.x, p.y, p.z]
}

/// Returns `true` if some coordinate value repeats on one axis at least as
/// often as a kd-tree leaf holds items.
fn has_crowded_axis(points: &[(usize, [f64; 3])]) -> bool {
    (0..3).any(|axis| {
        points
            .iter()
            // -0.0 and 0.0 compare equal in the tree, so they count as one value.
            .map(|(_, p)| (p[axis] + 0.0).to_bits())
            .counts()
            .values()
            .any(|&count| count >= BUCKET_SIZE)
    })
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

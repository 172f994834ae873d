//! Bookkeeping of everything currently shown for a structure.
//!
//! The registry owns one [`VisualizationHandle`] per registered id and never
//! talks to a renderer; the session pairs each registry mutation with the
//! matching renderer calls.

use super::error::VisualizationError;
use super::interactions::{HBondStrength, HBondType, InteractionKind};
use super::measurement::MeasurementKind;
use super::render::RepresentationId;
use serde::Serialize;
use slotmap::{SlotMap, new_key_type};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

new_key_type! {
    /// Arena slot of a registered visualization.
    pub struct HandleKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HandleKind {
    Measurement(MeasurementKind),
    Interaction {
        kind: InteractionKind,
        strength: Option<HBondStrength>,
        bond_type: Option<HBondType>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationHandle {
    pub id: String,
    pub kind: HandleKind,
    pub representation_ids: Vec<RepresentationId>,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStatistics {
    pub total: usize,
    pub visible: usize,
    pub hidden: usize,
    pub measurements: BTreeMap<MeasurementKind, usize>,
    pub interactions: BTreeMap<InteractionKind, usize>,
    pub hbond_strengths: BTreeMap<HBondStrength, usize>,
    pub hbond_types: BTreeMap<HBondType, usize>,
}

/// Result of a batch operation: every item is attempted.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, VisualizationError)>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn record(&mut self, id: &str, result: Result<(), VisualizationError>) {
        match result {
            Ok(()) => self.succeeded.push(id.to_string()),
            Err(error) => self.failed.push((id.to_string(), error)),
        }
    }
}

#[derive(Debug, Default)]
pub struct VisualizationRegistry {
    handles: SlotMap<HandleKey, VisualizationHandle>,
    keys: HashMap<String, HandleKey>,
    order: Vec<HandleKey>,
}

impl VisualizationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Registers a new visible handle.
    ///
    /// # Errors
    ///
    /// Returns [`VisualizationError::DuplicateId`] if `id` is taken and
    /// [`VisualizationError::EmptyRepresentation`] if `representation_ids` is empty.
    pub fn register(
        &mut self,
        id: &str,
        kind: HandleKind,
        representation_ids: Vec<RepresentationId>,
    ) -> Result<&VisualizationHandle, VisualizationError> {
        if self.keys.contains_key(id) {
            return Err(VisualizationError::DuplicateId(id.to_string()));
        }
        if representation_ids.is_empty() {
            return Err(VisualizationError::EmptyRepresentation(id.to_string()));
        }
        let key = self.handles.insert(VisualizationHandle {
            id: id.to_string(),
            kind,
            representation_ids,
            visible: true,
        });
        self.keys.insert(id.to_string(), key);
        self.order.push(key);
        debug!(id, "Registered visualization.");
        Ok(&self.handles[key])
    }

    pub fn get(&self, id: &str) -> Option<&VisualizationHandle> {
        self.keys.get(id).and_then(|&key| self.handles.get(key))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.keys.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Result<VisualizationHandle, VisualizationError> {
        let key = self
            .keys
            .remove(id)
            .ok_or_else(|| VisualizationError::NotFound(id.to_string()))?;
        self.order.retain(|&k| k != key);
        self.handles
            .remove(key)
            .ok_or_else(|| VisualizationError::NotFound(id.to_string()))
    }

    pub fn set_visibility(&mut self, id: &str, visible: bool) -> Result<(), VisualizationError> {
        let handle = self
            .keys
            .get(id)
            .and_then(|&key| self.handles.get_mut(key))
            .ok_or_else(|| VisualizationError::NotFound(id.to_string()))?;
        handle.visible = visible;
        Ok(())
    }

    /// Ids in registration order.
    pub fn list_all(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter_map(|&key| self.handles.get(key))
            .map(|handle| handle.id.as_str())
            .collect()
    }

    pub fn handles(&self) -> impl Iterator<Item = &VisualizationHandle> {
        self.order.iter().filter_map(|&key| self.handles.get(key))
    }

    pub fn clear(&mut self) -> Vec<VisualizationHandle> {
        self.keys.clear();
        let order = std::mem::take(&mut self.order);
        let cleared = order
            .into_iter()
            .filter_map(|key| self.handles.remove(key))
            .collect();
        self.handles.clear();
        cleared
    }

    pub fn hide_many<S: AsRef<str>>(&mut self, ids: &[S]) -> BatchOutcome {
        self.set_visibility_many(ids, false)
    }

    pub fn show_many<S: AsRef<str>>(&mut self, ids: &[S]) -> BatchOutcome {
        self.set_visibility_many(ids, true)
    }

    pub fn remove_many<S: AsRef<str>>(&mut self, ids: &[S]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for id in ids {
            let id = id.as_ref();
            outcome.record(id, self.remove(id).map(|_| ()));
        }
        outcome
    }

    fn set_visibility_many<S: AsRef<str>>(&mut self, ids: &[S], visible: bool) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for id in ids {
            let id = id.as_ref();
            outcome.record(id, self.set_visibility(id, visible));
        }
        outcome
    }

    pub fn statistics(&self) -> RegistryStatistics {
        let mut stats = RegistryStatistics::default();
        for handle in self.handles.values() {
            stats.total += 1;
            if handle.visible {
                stats.visible += 1;
            } else {
                stats.hidden += 1;
            }
            match handle.kind {
                HandleKind::Measurement(kind) => {
                    *stats.measurements.entry(kind).or_default() += 1;
                }
                HandleKind::Interaction {
                    kind,
                    strength,
                    bond_type,
                } => {
                    *stats.interactions.entry(kind).or_default() += 1;
                    if let Some(strength) = strength {
                        *stats.hbond_strengths.entry(strength).or_default() += 1;
                    }
                    if let Some(bond_type) = bond_type {
                        *stats.hbond_types.entry(bond_type).or_default() += 1;
                    }
                }
            }
        }
        stats
    }
}

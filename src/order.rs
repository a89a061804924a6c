//! Load-order tracking
//!
//! The bootstrap import records, in encounter order, every unit loaded for
//! the first time. The recorder exists only for the duration of bootstrap and
//! is then consumed into an immutable-by-default `LoadOrderIndex`; nothing
//! keeps recording afterwards, so later imports are never mistaken for first
//! loads.
//!
//! The index is the single source of truth for safe re-execution order. It
//! is never rebuilt while the process runs; units it has never seen sort
//! last and may be appended once they have been re-executed.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::UnitId;

/// Sort position for units never seen at startup: always last
pub const UNTRACKED_POSITION: usize = usize::MAX;

/// Records first-load order during the bootstrap import
#[derive(Debug, Default)]
pub struct LoadRecorder {
    order: Vec<UnitId>,
    seen: HashSet<UnitId>,
}

impl LoadRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a unit's first load; repeat records are ignored
    pub fn record(&mut self, id: &UnitId) {
        if self.seen.insert(id.clone()) {
            self.order.push(id.clone());
        }
    }

    /// Number of units recorded so far
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consume the recorder into the canonical load-order index
    pub fn into_index(self) -> LoadOrderIndex {
        LoadOrderIndex::new(self.order)
    }
}

/// Mapping from unit id to first-load position
#[derive(Debug, Clone, Default)]
pub struct LoadOrderIndex {
    positions: HashMap<UnitId, usize>,
}

impl LoadOrderIndex {
    /// Build an index from an ordered list of unit ids
    pub fn new(order: Vec<UnitId>) -> Self {
        let positions = order
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        Self { positions }
    }

    /// Position of a unit, or `UNTRACKED_POSITION` if never seen at startup
    pub fn position(&self, id: &UnitId) -> usize {
        self.positions.get(id).copied().unwrap_or(UNTRACKED_POSITION)
    }

    /// Whether the index has a position for the unit
    pub fn contains(&self, id: &UnitId) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of tracked units
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append a never-seen unit at the next position
    ///
    /// Existing positions are stable for the life of the process; appending
    /// is the only permitted mutation.
    pub fn append(&mut self, id: &UnitId) {
        if !self.positions.contains_key(id) {
            let next = self.positions.len();
            self.positions.insert(id.clone(), next);
        }
    }

    /// Order an invalidation set for re-execution: ascending by position,
    /// ties broken by identifier for determinism
    pub fn sort_for_reload(&self, ids: &BTreeSet<UnitId>) -> Vec<UnitId> {
        let mut ordered: Vec<UnitId> = ids.iter().cloned().collect();
        ordered.sort_by(|a, b| {
            self.position(a)
                .cmp(&self.position(b))
                .then_with(|| a.cmp(b))
        });
        ordered
    }

    /// All tracked units in load order
    pub fn units(&self) -> Vec<UnitId> {
        let mut entries: Vec<(&UnitId, &usize)> = self.positions.iter().collect();
        entries.sort_by_key(|(_, pos)| **pos);
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

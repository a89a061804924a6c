//! Registry of currently-loaded units
//!
//! The registry is an explicit table mapping unit identifiers to ownership of
//! their live bindings: `evict` clears an entry, `import` re-populates it by
//! executing the unit's source. There is no hidden global state; everything a
//! reload touches lives in this table behind the shared lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{MoltError, MoltResult};
use crate::loader::UnitLoader;
use crate::models::{Export, ExportRef, LiveUnit, UnitId};
use crate::order::LoadRecorder;

/// The registry behind the reload lock, shared between the reload engine and
/// the serving façade. At most one of {reload cycle, request dispatch} holds
/// the lock at a time.
pub type SharedRegistry = Arc<Mutex<UnitRegistry>>;

/// Table of currently-loaded units
#[derive(Debug, Default)]
pub struct UnitRegistry {
    loaded: HashMap<UnitId, LiveUnit>,
}

impl UnitRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a registry for sharing behind the reload lock
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(Mutex::new(self))
    }

    /// Whether a unit is currently loaded
    pub fn is_loaded(&self, id: &UnitId) -> bool {
        self.loaded.contains_key(id)
    }

    /// Number of loaded units
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Get a loaded unit
    pub fn get(&self, id: &UnitId) -> Option<&LiveUnit> {
        self.loaded.get(id)
    }

    /// Remove a unit so its next import re-executes top-level code
    ///
    /// Returns whether the unit was loaded; evicting an absent unit is not an
    /// error.
    pub fn evict(&mut self, id: &UnitId) -> bool {
        self.loaded.remove(id).is_some()
    }

    /// Look up an export of a loaded unit
    pub fn export(&self, id: &UnitId, name: &str) -> MoltResult<&Export> {
        let unit = self.loaded.get(id).ok_or_else(|| MoltError::UnitNotLoaded {
            unit: id.to_string(),
        })?;
        unit.exports
            .get(name)
            .ok_or_else(|| MoltError::ExportNotFound {
                unit: id.to_string(),
                name: name.to_string(),
            })
    }

    /// Resolve an export reference to its current value
    ///
    /// Follows `Value` exports only; a handler has no servable value.
    pub fn resolve_value(&self, r: &ExportRef) -> MoltResult<&str> {
        match self.export(&r.unit, &r.name)? {
            Export::Value(v) => Ok(v),
            Export::Handler(_) => Err(MoltError::UnservableExport {
                unit: r.unit.to_string(),
                name: r.name.clone(),
            }),
        }
    }

    /// Import a unit: load its source, import its imports, materialise its
    /// bindings
    ///
    /// Already-loaded units are returned from the table without re-execution.
    /// When a recorder is supplied (bootstrap only), every first load is
    /// recorded in completion order, so a unit's dependencies always record
    /// before the unit itself.
    pub fn import(
        &mut self,
        id: &UnitId,
        loader: &dyn UnitLoader,
        mut recorder: Option<&mut LoadRecorder>,
    ) -> MoltResult<()> {
        let mut in_flight = Vec::new();
        self.import_inner(id, loader, &mut recorder, &mut in_flight)
    }

    fn import_inner(
        &mut self,
        id: &UnitId,
        loader: &dyn UnitLoader,
        recorder: &mut Option<&mut LoadRecorder>,
        in_flight: &mut Vec<UnitId>,
    ) -> MoltResult<()> {
        if self.loaded.contains_key(id) || in_flight.contains(id) {
            // Cached, or a cycle back into a unit currently loading; both are
            // satisfied by the existing (possibly partial) entry.
            return Ok(());
        }

        in_flight.push(id.clone());
        let source = loader.load_source(id)?;

        for dep in &source.manifest.imports {
            self.import_inner(dep, loader, recorder, in_flight)?;
        }

        if let Some(rec) = recorder.as_deref_mut() {
            rec.record(id);
        }

        let unit = LiveUnit::from_source(&source)?;
        self.loaded.insert(id.clone(), unit);
        in_flight.pop();
        Ok(())
    }
}

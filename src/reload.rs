//! Selective reload orchestration
//!
//! `ReloadEngine` consumes debounced batches: it asks the closure provider
//! which loaded units a batch invalidates, evicts them from the registry, and
//! re-executes them in first-load order so a unit's dependencies are fresh
//! before its dependents re-run. The whole resolve→evict→re-execute span
//! holds the reload lock, serializing cycles against request dispatch and
//! against each other.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::closure::ClosureProvider;
use crate::error::MoltResult;
use crate::events::ReloadEvent;
use crate::loader::UnitLoader;
use crate::models::UnitId;
use crate::order::LoadOrderIndex;
use crate::registry::SharedRegistry;

/// Reload cycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadPhase {
    /// No changes pending
    #[default]
    Idle,
    /// Changes pending in the debouncer
    Collecting,
    /// Closure lookup in progress
    Resolving,
    /// Invalidated units being removed from the registry
    Evicting,
    /// Invalidated units re-executing in load order
    Reexecuting,
}

/// Result summary of one reload cycle
#[derive(Debug, Clone, Default)]
pub struct ReloadOutcome {
    /// Size of the invalidation set
    pub invalidated: usize,
    /// Units actually removed from the registry (loaded at the time)
    pub evicted: usize,
    /// Units re-executed successfully, in execution order
    pub reloaded: Vec<UnitId>,
    /// Units that failed to re-execute, with the failure message
    pub failed: Vec<(UnitId, String)>,
    /// Whether the root entry point was re-bound this cycle
    pub entry_refreshed: bool,
}

impl ReloadOutcome {
    /// Whether every invalidated unit re-executed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Orchestrates reload cycles against the shared registry
pub struct ReloadEngine {
    registry: SharedRegistry,
    loader: Arc<dyn UnitLoader>,
    closure: Box<dyn ClosureProvider>,
    order: LoadOrderIndex,
    entry_unit: UnitId,
    phase: ReloadPhase,
}

impl ReloadEngine {
    /// Create an engine over the shared registry
    pub fn new(
        registry: SharedRegistry,
        loader: Arc<dyn UnitLoader>,
        closure: Box<dyn ClosureProvider>,
        order: LoadOrderIndex,
        entry_unit: UnitId,
    ) -> Self {
        Self {
            registry,
            loader,
            closure,
            order,
            entry_unit,
            phase: ReloadPhase::Idle,
        }
    }

    /// Current phase
    pub fn phase(&self) -> ReloadPhase {
        self.phase
    }

    /// Note that changes are collecting in the debouncer
    pub fn mark_collecting(&mut self) {
        if self.phase == ReloadPhase::Idle {
            self.phase = ReloadPhase::Collecting;
        }
    }

    /// Units tracked by the load-order index, in load order
    pub fn load_order(&self) -> Vec<UnitId> {
        self.order.units()
    }

    /// Process one debounced batch
    ///
    /// Called by the watch loop once per flush; cycles are strictly
    /// sequential because the whole cycle holds the reload lock. A closure
    /// provider error aborts only this cycle - the registry is untouched and
    /// the next batch starts fresh. Per-unit re-execution failures do not
    /// abort the cycle.
    pub fn on_batch<F: Fn(ReloadEvent)>(
        &mut self,
        batch: BTreeSet<PathBuf>,
        on_event: &F,
    ) -> MoltResult<ReloadOutcome> {
        let result = self.run_cycle(batch, on_event);
        self.phase = ReloadPhase::Idle;
        result
    }

    fn run_cycle<F: Fn(ReloadEvent)>(
        &mut self,
        batch: BTreeSet<PathBuf>,
        on_event: &F,
    ) -> MoltResult<ReloadOutcome> {
        let started = Instant::now();
        on_event(ReloadEvent::ReloadStarted { files: batch.len() });

        let mut registry = self.registry.lock().expect("reload lock poisoned");

        self.phase = ReloadPhase::Resolving;
        let paths: Vec<PathBuf> = batch.iter().cloned().collect();
        self.closure.register_changed_files(&paths)?;
        let affected = self.closure.compute_closure(&batch)?;

        let mut outcome = ReloadOutcome::default();
        if affected.is_empty() {
            // Expected no-effect outcome: nothing is evicted, nothing
            // re-executes, and already-loaded state stays untouched.
            on_event(ReloadEvent::NoAffectedUnits);
            return Ok(outcome);
        }

        outcome.invalidated = affected.len();
        let names: Vec<String> = affected.iter().map(|u| u.to_string()).collect();
        on_event(ReloadEvent::units_invalidated(&names));

        self.phase = ReloadPhase::Evicting;
        for id in &affected {
            if registry.evict(id) {
                outcome.evicted += 1;
            }
        }

        self.phase = ReloadPhase::Reexecuting;
        for id in self.order.sort_for_reload(&affected) {
            match registry.import(&id, self.loader.as_ref(), None) {
                Ok(()) => {
                    self.order.append(&id);
                    on_event(ReloadEvent::UnitReloaded {
                        unit: id.to_string(),
                    });
                    outcome.reloaded.push(id);
                }
                Err(e) => {
                    on_event(ReloadEvent::UnitReloadFailed {
                        unit: id.to_string(),
                        message: e.to_string(),
                    });
                    outcome.failed.push((id, e.to_string()));
                }
            }
        }

        if affected.contains(&self.entry_unit) {
            outcome.entry_refreshed = outcome.reloaded.contains(&self.entry_unit);
        } else {
            // The entry unit itself was unaffected; re-bind it anyway so the
            // serving façade observes code that referenced reloaded units.
            registry.evict(&self.entry_unit);
            match registry.import(&self.entry_unit, self.loader.as_ref(), None) {
                Ok(()) => outcome.entry_refreshed = true,
                Err(e) => {
                    on_event(ReloadEvent::UnitReloadFailed {
                        unit: self.entry_unit.to_string(),
                        message: e.to_string(),
                    });
                    outcome.failed.push((self.entry_unit.clone(), e.to_string()));
                }
            }
        }
        if outcome.entry_refreshed {
            on_event(ReloadEvent::EntryPointRefreshed {
                unit: self.entry_unit.to_string(),
            });
        }

        on_event(ReloadEvent::ReloadComplete {
            reloaded: outcome.reloaded.len(),
            failed: outcome.failed.len(),
            duration_ms: started.elapsed().as_millis() as u64,
        });

        Ok(outcome)
    }
}

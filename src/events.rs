//! Reload event types for progress reporting
//!
//! The runtime reports progress through a callback taking these events; the
//! CLI renders them human-readable or as NDJSON for CI.

use serde::Serialize;

/// How many invalidated units to list in event previews
const PREVIEW_LIMIT: usize = 5;

/// Events emitted during watch and reload
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReloadEvent {
    /// Watch started
    WatchStarted {
        root: String,
        entry: String,
        units: usize,
    },
    /// A source file changed
    FileChanged { path: String },
    /// A debounced batch entered a reload cycle
    ReloadStarted { files: usize },
    /// The closure provider reported no affected units
    NoAffectedUnits,
    /// Units invalidated by the batch
    UnitsInvalidated {
        count: usize,
        preview: Vec<String>,
    },
    /// A unit re-executed successfully
    UnitReloaded { unit: String },
    /// A unit failed to re-execute; the cycle continues without it
    UnitReloadFailed { unit: String, message: String },
    /// The root entry point was re-bound
    EntryPointRefreshed { unit: String },
    /// Reload cycle finished
    ReloadComplete {
        reloaded: usize,
        failed: usize,
        duration_ms: u64,
    },
    /// Error outside the per-unit policy (e.g. closure failure)
    Error { message: String },
    /// Watch stopped
    Shutdown,
}

impl ReloadEvent {
    /// Build an invalidation event with a bounded preview
    pub fn units_invalidated(units: &[String]) -> Self {
        ReloadEvent::UnitsInvalidated {
            count: units.len(),
            preview: units.iter().take(PREVIEW_LIMIT).cloned().collect(),
        }
    }

    /// Convert to a single NDJSON line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"event":"error"}"#.to_string())
    }
}

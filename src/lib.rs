//! Molt - hot module reloading runtime
//!
//! Molt keeps a long-running request-serving process fresh: when source files
//! change on disk, only the minimal, correctly-ordered set of affected
//! load-units is re-executed, without restarting the process or dropping
//! in-flight requests. Change events are debounced into batches, an
//! invalidation closure decides which units a batch affects, and the reload
//! engine re-executes them in first-load order under a lock shared with
//! request dispatch.

pub mod closure;
pub mod config;
pub mod debounce;
pub mod error;
pub mod events;
pub mod loader;
pub mod models;
pub mod order;
pub mod parser;
pub mod registry;
pub mod reload;
pub mod runtime;
pub mod serve;
pub mod watcher;

// Re-exports for convenience
pub use closure::{ClosureProvider, DependentMap};
pub use config::{Config, ConfigWarning};
pub use debounce::{BatchDebouncer, DEFAULT_DEBOUNCE_MS};
pub use error::{MoltError, MoltResult};
pub use events::ReloadEvent;
pub use loader::{FsUnitLoader, UnitLoader};
pub use models::{EntryPoint, Export, ExportRef, LiveUnit, Request, Response, UnitId, UnitSource};
pub use order::{LoadOrderIndex, LoadRecorder, UNTRACKED_POSITION};
pub use registry::{SharedRegistry, UnitRegistry};
pub use reload::{ReloadEngine, ReloadOutcome, ReloadPhase};
pub use runtime::{Runtime, RuntimeOptions};
pub use serve::ReloadableApp;

//! Runtime assembly
//!
//! `Runtime::bootstrap` wires the pieces together: scan the project into the
//! dependent map, import the root entry unit while recording first-load
//! order, and hand the shared registry to the reload engine and the serving
//! façade. `Runtime::watch` is the blocking watch loop driving
//! watcher → debouncer → engine until the running flag drops.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::closure::DependentMap;
use crate::config::Config;
use crate::debounce::BatchDebouncer;
use crate::error::{MoltError, MoltResult};
use crate::events::ReloadEvent;
use crate::loader::FsUnitLoader;
use crate::models::{EntryPoint, UnitId};
use crate::order::LoadRecorder;
use crate::registry::{SharedRegistry, UnitRegistry};
use crate::reload::ReloadEngine;
use crate::serve::ReloadableApp;
use crate::watcher::{is_source_file, spawn_fs_watcher, ContentTracker};

/// Startup cooldown draining the initial events `notify` sometimes sends for
/// existing files when the watcher is first registered
const STARTUP_COOLDOWN_MS: u64 = 500;

/// Poll interval for the watch loop's channel reads
const POLL_INTERVAL_MS: u64 = 50;

/// Runtime options
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Project root watched for changes
    pub root: PathBuf,
    /// Root entry point (`unit:attribute`)
    pub entry: EntryPoint,
    /// Source-file extensions
    pub extensions: Vec<String>,
    /// Debounce window
    pub debounce: Duration,
}

impl RuntimeOptions {
    /// Create options with config defaults for the remaining fields
    pub fn new(root: impl Into<PathBuf>, entry: EntryPoint) -> Self {
        let config = Config::default();
        Self {
            root: root.into(),
            entry,
            extensions: config.watch.extensions,
            debounce: Duration::from_millis(config.watch.debounce_ms),
        }
    }

    /// Build options from a loaded config
    pub fn from_config(root: impl Into<PathBuf>, config: &Config) -> MoltResult<Self> {
        Ok(Self {
            root: root.into(),
            entry: EntryPoint::parse(&config.serve.entry)?,
            extensions: config.watch.extensions.clone(),
            debounce: Duration::from_millis(config.watch.debounce_ms),
        })
    }

    /// Override the source extensions
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Override the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// An assembled hot-reloading runtime
pub struct Runtime {
    options: RuntimeOptions,
    registry: SharedRegistry,
    loader: Arc<FsUnitLoader>,
    engine: ReloadEngine,
    tracker: ContentTracker,
    units_scanned: usize,
}

impl Runtime {
    /// Bootstrap a runtime: scan, build the dependent map, and import the
    /// root entry unit while recording first-load order
    ///
    /// The load recorder exists only inside this call; it is consumed into
    /// the engine's load-order index before serving begins.
    pub fn bootstrap(options: RuntimeOptions) -> MoltResult<Self> {
        if !options.root.is_dir() {
            return Err(MoltError::DirectoryNotFound {
                path: options.root.clone(),
            });
        }
        // Canonical root keeps unit-id derivation consistent with the
        // canonicalized paths the watch loop reports.
        let root = options.root.canonicalize()?;
        let options = RuntimeOptions {
            root: root.clone(),
            ..options
        };

        let loader = Arc::new(FsUnitLoader::new(root, options.extensions.clone()));
        let dependent_map = DependentMap::scan(loader.as_ref().clone())?;
        let units_scanned = dependent_map.unit_count();

        let mut tracker = ContentTracker::new();
        for id in dependent_map.unit_ids() {
            tracker.prime(&loader.unit_path(&id));
        }

        let mut registry = UnitRegistry::new();
        let mut recorder = LoadRecorder::new();
        registry.import(&options.entry.unit, loader.as_ref(), Some(&mut recorder))?;
        let order = recorder.into_index();

        let registry = registry.into_shared();
        let engine = ReloadEngine::new(
            registry.clone(),
            loader.clone(),
            Box::new(dependent_map),
            order,
            options.entry.unit.clone(),
        );

        Ok(Self {
            options,
            registry,
            loader,
            engine,
            tracker,
            units_scanned,
        })
    }

    /// The canonicalized project root
    pub fn root(&self) -> &PathBuf {
        &self.options.root
    }

    /// Units discovered by the startup scan
    pub fn units_scanned(&self) -> usize {
        self.units_scanned
    }

    /// Units loaded at bootstrap, in first-load order
    pub fn load_order(&self) -> Vec<UnitId> {
        self.engine.load_order()
    }

    /// A serving façade over this runtime's registry
    pub fn app(&self) -> ReloadableApp {
        ReloadableApp::new(
            self.registry.clone(),
            self.loader.clone(),
            self.options.entry.clone(),
        )
    }

    /// Watch for changes until the running flag drops (blocking)
    ///
    /// Reload cycles run on this thread. Errors inside a cycle are reported
    /// through the event callback and do not stop the watch; only watcher
    /// setup failures return early.
    pub fn watch<F: Fn(ReloadEvent)>(
        &mut self,
        running: Arc<AtomicBool>,
        on_event: F,
    ) -> MoltResult<()> {
        on_event(ReloadEvent::WatchStarted {
            root: self.options.root.display().to_string(),
            entry: self.options.entry.to_string(),
            units: self.units_scanned,
        });

        // Keep the watcher alive for the whole loop.
        let (_watcher, rx) = spawn_fs_watcher(&self.options.root)?;
        let debouncer = BatchDebouncer::new(self.options.debounce);
        let poll = Duration::from_millis(POLL_INTERVAL_MS);

        let cooldown_end = Instant::now() + Duration::from_millis(STARTUP_COOLDOWN_MS);
        while Instant::now() < cooldown_end {
            let _ = rx.recv_timeout(poll);
        }

        while running.load(Ordering::SeqCst) {
            if let Ok(path) = rx.recv_timeout(poll) {
                if is_source_file(&path, &self.options.extensions) {
                    let path = path.canonicalize().unwrap_or(path);
                    if self.tracker.content_changed(&path) {
                        on_event(ReloadEvent::FileChanged {
                            path: path.display().to_string(),
                        });
                        debouncer.notify(path);
                        self.engine.mark_collecting();
                    }
                }
            }

            if let Some(batch) = debouncer.poll() {
                if let Err(e) = self.engine.on_batch(batch, &on_event) {
                    on_event(ReloadEvent::Error {
                        message: e.to_string(),
                    });
                }
            }
        }

        on_event(ReloadEvent::Shutdown);
        Ok(())
    }
}

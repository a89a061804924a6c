//! Serving façade
//!
//! `ReloadableApp` is the request-side view of the runtime: each dispatch
//! takes the reload lock, re-resolves the entry point against the live
//! registry (never caching a handler across reloads), delegates, and turns
//! every failure into a structured error response. A dispatch arriving while
//! a reload cycle runs blocks until the cycle completes, then observes the
//! post-reload entry point.

use std::sync::Arc;

use crate::error::{MoltError, MoltResult};
use crate::loader::UnitLoader;
use crate::models::{EntryPoint, Export, HandlerBinding, Request, Response};
use crate::registry::{SharedRegistry, UnitRegistry};

/// Reloadable request-serving façade
#[derive(Clone)]
pub struct ReloadableApp {
    registry: SharedRegistry,
    loader: Arc<dyn UnitLoader>,
    entry: EntryPoint,
}

impl ReloadableApp {
    /// Create a façade over the shared registry
    pub fn new(registry: SharedRegistry, loader: Arc<dyn UnitLoader>, entry: EntryPoint) -> Self {
        Self {
            registry,
            loader,
            entry,
        }
    }

    /// The configured entry point
    pub fn entry(&self) -> &EntryPoint {
        &self.entry
    }

    /// Handle one request
    ///
    /// Never panics on delegate failure; the serving loop stays alive and the
    /// caller receives a structured 500.
    pub fn handle(&self, request: &Request) -> Response {
        let mut registry = self.registry.lock().expect("reload lock poisoned");
        match self.dispatch(&mut registry, request) {
            Ok(response) => response,
            Err(e) => Response::error(e),
        }
    }

    /// Verify the entry point resolves to a handler without serving anything
    pub fn verify_entry(&self) -> MoltResult<()> {
        let mut registry = self.registry.lock().expect("reload lock poisoned");
        self.resolve_handler(&mut registry).map(|_| ())
    }

    fn resolve_handler(&self, registry: &mut UnitRegistry) -> MoltResult<HandlerBinding> {
        // Resolved fresh on every call; the entry unit may have been evicted
        // by a failed cycle, in which case importing it here recovers.
        if !registry.is_loaded(&self.entry.unit) {
            registry.import(&self.entry.unit, self.loader.as_ref(), None)?;
        }
        match registry.export(&self.entry.unit, &self.entry.attr)? {
            Export::Handler(h) => Ok(h.clone()),
            Export::Value(_) => Err(MoltError::NotAHandler {
                unit: self.entry.unit.to_string(),
                name: self.entry.attr.clone(),
            }),
        }
    }

    fn dispatch(&self, registry: &mut UnitRegistry, _request: &Request) -> MoltResult<Response> {
        let handler = self.resolve_handler(registry)?;
        match &handler.serves {
            Some(r) => Ok(Response::ok(registry.resolve_value(r)?)),
            None => Ok(Response::ok(handler.fallback)),
        }
    }
}

//! Load mechanism for units
//!
//! `UnitLoader` is the seam between the registry and unit storage; the
//! bundled `FsUnitLoader` maps dotted unit identifiers onto files under the
//! project root and parses them. Tests substitute instrumented loaders.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MoltError, MoltResult};
use crate::models::{UnitId, UnitSource};
use crate::parser::parse_unit;

/// Abstract load mechanism: fetch a unit's source ready for execution
pub trait UnitLoader: Send + Sync {
    /// Load the source of the given unit
    fn load_source(&self, id: &UnitId) -> MoltResult<UnitSource>;
}

/// Filesystem-backed loader rooted at the project directory
///
/// `api.handlers` maps to `<root>/api/handlers.<ext>`, trying each configured
/// extension in order.
#[derive(Debug, Clone)]
pub struct FsUnitLoader {
    root: PathBuf,
    extensions: Vec<String>,
}

impl FsUnitLoader {
    /// Create a loader for the given project root and source extensions
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            extensions,
        }
    }

    /// The project root this loader reads from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the source path for a unit id
    ///
    /// Returns the first candidate that exists, or the first-extension
    /// candidate when none does (for error reporting).
    pub fn unit_path(&self, id: &UnitId) -> PathBuf {
        let relative: PathBuf = id.as_str().split('.').collect();
        let mut first = None;
        for ext in &self.extensions {
            let candidate = self.root.join(&relative).with_extension(ext);
            if candidate.is_file() {
                return candidate;
            }
            if first.is_none() {
                first = Some(candidate);
            }
        }
        first.unwrap_or_else(|| self.root.join(relative))
    }

    /// Derive the unit id for a source file path, if it is one
    ///
    /// Returns `None` for paths outside the root or with a non-source
    /// extension.
    pub fn unit_id_for(&self, path: &Path) -> Option<UnitId> {
        let relative = path.strip_prefix(&self.root).ok()?;
        // READMEs are documentation, not units.
        if relative.file_stem().is_some_and(|s| s == "README") {
            return None;
        }
        let ext = relative.extension()?.to_str()?;
        if !self.extensions.iter().any(|e| e == ext) {
            return None;
        }
        let stem = relative.with_extension("");
        let parts: Vec<&str> = stem
            .components()
            .filter_map(|c| c.as_os_str().to_str())
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(UnitId::new(parts.join(".")))
    }
}

impl UnitLoader for FsUnitLoader {
    fn load_source(&self, id: &UnitId) -> MoltResult<UnitSource> {
        let path = self.unit_path(id);
        if !path.is_file() {
            return Err(MoltError::UnitNotFound {
                unit: id.to_string(),
                path,
            });
        }

        let content = fs::read_to_string(&path)?;
        let (manifest, body) = parse_unit(&content, &path)?;

        Ok(UnitSource {
            id: id.clone(),
            source_path: path,
            manifest,
            body,
        })
    }
}

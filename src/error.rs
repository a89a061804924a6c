//! Error types for Molt
//!
//! Uses `thiserror` for library errors; the binary wraps these in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Molt operations
pub type MoltResult<T> = Result<T, MoltError>;

/// Main error type for Molt operations
#[derive(Error, Debug)]
pub enum MoltError {
    /// A load-unit's source file could not be found
    #[error("unit '{unit}' not found - expected source file at {path}")]
    UnitNotFound { unit: String, path: PathBuf },

    /// Invalid manifest YAML in a unit file
    #[error("invalid manifest in {file}: {message}")]
    InvalidManifest { file: PathBuf, message: String },

    /// Manifest frontmatter not properly closed
    #[error("unclosed frontmatter in {file} - missing closing '---'")]
    UnclosedFrontmatter { file: PathBuf },

    /// A unit expected in the registry is not currently loaded
    #[error("unit '{unit}' is not loaded")]
    UnitNotLoaded { unit: String },

    /// A unit does not export the requested name
    #[error("unit '{unit}' has no export named '{name}'")]
    ExportNotFound { unit: String, name: String },

    /// The entry-point export is not a handler
    #[error("export '{unit}:{name}' is not a handler")]
    NotAHandler { unit: String, name: String },

    /// A handler serves an export that has no servable value
    #[error("export '{unit}:{name}' cannot be served as a response body")]
    UnservableExport { unit: String, name: String },

    /// Malformed `unit:attribute` entry-point specification
    #[error("invalid entry point '{spec}' - expected 'unit:attribute'")]
    InvalidEntryPoint { spec: String },

    /// Malformed `unit:name` export reference
    #[error("invalid export reference '{spec}' - expected 'unit:name'")]
    InvalidExportRef { spec: String },

    /// Closure provider failure (aborts a single reload cycle)
    #[error("closure computation failed: {message}")]
    Closure { message: String },

    /// Filesystem watch source failure
    #[error("watch error: {0}")]
    Watch(String),

    /// Project root not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

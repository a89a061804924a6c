//! Core data models for Molt
//!
//! Defines the fundamental data structures used throughout Molt:
//! - `UnitId`: identifier of a load-unit (a reloadable source file)
//! - `UnitManifest`: YAML metadata extracted from a unit file
//! - `UnitSource`/`LiveUnit`: a parsed unit and its materialised bindings
//! - `EntryPoint`, `ExportRef`: `unit:name` references resolved at runtime
//! - `Request`/`Response`: the in-process serving contract

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{MoltError, MoltResult};

/// Identifier of a load-unit, derived from its path relative to the project
/// root with separators replaced by dots (`api/handlers.md` → `api.handlers`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    /// Create a new unit identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UnitId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for UnitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Handler declaration in a unit manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HandlerDecl {
    /// Export reference (`unit:name`) whose value this handler serves.
    /// When absent the handler serves the unit's own body.
    #[serde(default)]
    pub serves: Option<String>,
}

/// YAML manifest extracted from a unit file's frontmatter
///
/// Every field is optional; a unit file without frontmatter is a leaf unit
/// with no imports and no exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UnitManifest {
    /// Human description of the unit
    #[serde(default)]
    pub description: Option<String>,

    /// Units this unit imports; imported units load before this one
    #[serde(default)]
    pub imports: Vec<UnitId>,

    /// Named value exports
    #[serde(default)]
    pub exports: BTreeMap<String, String>,

    /// Named handler exports
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerDecl>,
}

/// A parsed unit source file: manifest plus content body
#[derive(Debug, Clone, PartialEq)]
pub struct UnitSource {
    /// Unit identifier
    pub id: UnitId,
    /// Source file path
    pub source_path: PathBuf,
    /// Parsed manifest
    pub manifest: UnitManifest,
    /// Content body (after frontmatter)
    pub body: String,
}

/// Reference to an export of another unit, written `unit:name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRef {
    pub unit: UnitId,
    pub name: String,
}

impl ExportRef {
    /// Parse a `unit:name` reference
    pub fn parse(spec: &str) -> MoltResult<Self> {
        match spec.rsplit_once(':') {
            Some((unit, name)) if !unit.is_empty() && !name.is_empty() => Ok(Self {
                unit: UnitId::new(unit),
                name: name.to_string(),
            }),
            _ => Err(MoltError::InvalidExportRef {
                spec: spec.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.name)
    }
}

/// The root entry point, written `unit:attribute`
///
/// Parsed once at startup and re-resolved against the live registry on every
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub unit: UnitId,
    pub attr: String,
}

impl EntryPoint {
    /// Parse a `unit:attribute` entry-point specification
    pub fn parse(spec: &str) -> MoltResult<Self> {
        match spec.rsplit_once(':') {
            Some((unit, attr)) if !unit.is_empty() && !attr.is_empty() => Ok(Self {
                unit: UnitId::new(unit),
                attr: attr.to_string(),
            }),
            _ => Err(MoltError::InvalidEntryPoint {
                spec: spec.to_string(),
            }),
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.unit, self.attr)
    }
}

/// A live handler binding
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerBinding {
    /// Export whose current value is served, resolved through the registry
    /// at request time so reloaded values are observed immediately
    pub serves: Option<ExportRef>,
    /// Served when `serves` is absent: the unit body as of its last load
    pub fallback: String,
}

/// A live binding exported by a loaded unit
#[derive(Debug, Clone, PartialEq)]
pub enum Export {
    /// A plain value
    Value(String),
    /// A request handler
    Handler(HandlerBinding),
}

/// A loaded unit: the materialised result of executing its source
#[derive(Debug, Clone, PartialEq)]
pub struct LiveUnit {
    /// Unit identifier
    pub id: UnitId,
    /// Live bindings by export name
    pub exports: BTreeMap<String, Export>,
}

impl LiveUnit {
    /// Materialise a parsed source into live bindings
    ///
    /// Value exports and handler exports share one namespace; a name declared
    /// in both is a manifest error.
    pub fn from_source(source: &UnitSource) -> MoltResult<Self> {
        let mut exports = BTreeMap::new();

        for (name, value) in &source.manifest.exports {
            exports.insert(name.clone(), Export::Value(value.clone()));
        }

        for (name, decl) in &source.manifest.handlers {
            let serves = match &decl.serves {
                Some(spec) => Some(ExportRef::parse(spec)?),
                None => None,
            };
            let binding = Export::Handler(HandlerBinding {
                serves,
                fallback: source.body.trim().to_string(),
            });
            if exports.insert(name.clone(), binding).is_some() {
                return Err(MoltError::InvalidManifest {
                    file: source.source_path.clone(),
                    message: format!("export '{}' declared as both value and handler", name),
                });
            }
        }

        Ok(Self {
            id: source.id.clone(),
            exports,
        })
    }
}

/// An incoming request handed to the serving façade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Request target path
    pub path: String,
}

impl Request {
    /// Create a new request for the given target path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A response produced by the serving façade
///
/// Delegation failures become structured error responses; the serving loop
/// never crashes on a broken entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    /// A 200 response with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    /// A structured 500 response carrying the error message
    pub fn error(message: impl fmt::Display) -> Self {
        Self {
            status: 500,
            body: serde_json::json!({ "error": message.to_string() }).to_string(),
        }
    }

    /// Whether this is a success response
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

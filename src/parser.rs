//! Source parser for unit files
//!
//! A unit file is a Markdown file with optional YAML frontmatter holding the
//! unit manifest (`imports`, `exports`, `handlers`). Parsing a unit file is
//! the unit's "top-level execution": the manifest becomes its live bindings.

use std::fs;
use std::path::Path;

use crate::error::{MoltError, MoltResult};
use crate::models::UnitManifest;

/// Delimiter for frontmatter sections
const FRONTMATTER_DELIMITER: &str = "---";

/// Result of splitting a unit file into manifest YAML and content body
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedManifest {
    /// The raw YAML content of the frontmatter (empty if none)
    pub yaml: String,
    /// The content body after the frontmatter
    pub body: String,
}

/// Split file content into frontmatter YAML and body
///
/// Frontmatter must be at the start of the file, delimited by `---` lines.
/// A file that does not start with `---` is a leaf unit: empty manifest,
/// whole content as body. An opened but unclosed frontmatter is an error.
pub fn extract_manifest(content: &str, file: &Path) -> MoltResult<ExtractedManifest> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.is_empty() || lines[0].trim() != FRONTMATTER_DELIMITER {
        return Ok(ExtractedManifest {
            yaml: String::new(),
            body: content.to_string(),
        });
    }

    let mut closing_line: Option<usize> = None;
    for (i, line) in lines.iter().enumerate().skip(1) {
        if line.trim() == FRONTMATTER_DELIMITER {
            closing_line = Some(i);
            break;
        }
    }

    let closing_line = closing_line.ok_or_else(|| MoltError::UnclosedFrontmatter {
        file: file.to_path_buf(),
    })?;

    let yaml = lines[1..closing_line].join("\n");
    let body = if closing_line + 1 < lines.len() {
        lines[closing_line + 1..].join("\n")
    } else {
        String::new()
    };

    Ok(ExtractedManifest { yaml, body })
}

/// Parse manifest YAML into a `UnitManifest`
pub fn parse_manifest(yaml: &str, file: &Path) -> MoltResult<UnitManifest> {
    if yaml.trim().is_empty() {
        return Ok(UnitManifest::default());
    }
    serde_yaml::from_str(yaml).map_err(|e| MoltError::InvalidManifest {
        file: file.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse a unit file into its manifest and body
pub fn parse_unit(content: &str, file: &Path) -> MoltResult<(UnitManifest, String)> {
    let extracted = extract_manifest(content, file)?;
    let manifest = parse_manifest(&extracted.yaml, file)?;
    Ok((manifest, extracted.body))
}

/// Read and parse a unit file from disk
pub fn parse_unit_file(path: &Path) -> MoltResult<(UnitManifest, String)> {
    let content = fs::read_to_string(path)?;
    parse_unit(&content, path)
}

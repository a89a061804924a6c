//! Configuration module for Molt
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (MOLT_*)
//! 3. Project config (`molt.toml` at the project root)
//! 4. Built-in defaults (lowest priority)

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::debounce::DEFAULT_DEBOUNCE_MS;
use crate::error::{MoltError, MoltResult};

/// Config file name looked up at the project root
pub const CONFIG_FILE: &str = "molt.toml";

/// Watch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Source-file extensions passed to the debouncer
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            extensions: default_extensions(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

/// Serve configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServeConfig {
    /// Entry point as `unit:attribute`
    #[serde(default = "default_entry")]
    pub entry: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            entry: default_entry(),
        }
    }
}

fn default_entry() -> String {
    "app:handler".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> MoltResult<Self> {
        let (config, _warnings) = Self::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> MoltResult<(Self, Vec<ConfigWarning>)> {
        let content = fs::read_to_string(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let config: Self = serde_ignored::deserialize(deserializer, |path| {
            unknown_paths.push(path.to_string());
        })
        .map_err(|e| MoltError::InvalidManifest {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|path_str| {
                let key = path_str
                    .split('.')
                    .next_back()
                    .unwrap_or(path_str.as_str())
                    .to_string();
                ConfigWarning {
                    key: key.clone(),
                    file: path.to_path_buf(),
                    line: find_line_number(&content, &key),
                    suggestion: suggest_key(&key),
                }
            })
            .collect();

        Ok((config, warnings))
    }

    /// Load from the project root's `molt.toml`, or defaults
    pub fn load_or_default(project_root: &Path) -> Self {
        let config_path = project_root.join(CONFIG_FILE);
        if config_path.exists() {
            if let Ok(config) = Self::load(&config_path) {
                return config.with_env_overrides();
            }
        }
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides (MOLT_* prefix)
    pub fn with_env_overrides(mut self) -> Self {
        // MOLT_DEBOUNCE_MS
        if let Ok(ms) = std::env::var("MOLT_DEBOUNCE_MS") {
            if let Ok(parsed) = ms.parse::<u64>() {
                self.watch.debounce_ms = parsed;
            }
        }

        // MOLT_EXTENSIONS (comma-separated)
        if let Ok(exts) = std::env::var("MOLT_EXTENSIONS") {
            let parsed: Vec<String> = exts
                .split(',')
                .map(|s| s.trim().trim_start_matches('.').to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !parsed.is_empty() {
                self.watch.extensions = parsed;
            }
        }

        // MOLT_ENTRY
        if let Ok(entry) = std::env::var("MOLT_ENTRY") {
            if !entry.trim().is_empty() {
                self.serve.entry = entry.trim().to_string();
            }
        }

        self
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "watch",
        "debounce_ms",
        "extensions",
        "serve",
        "entry",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] = std::cmp::min(
                std::cmp::min(prev[j + 1] + 1, curr[j] + 1),
                prev[j] + cost,
            );
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.watch.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(config.watch.extensions, vec!["md".to_string()]);
        assert_eq!(config.serve.entry, "app:handler");
    }

    #[test]
    fn test_config_parse_toml() {
        let toml = r#"
[watch]
debounce_ms = 100
extensions = ["md", "unit"]

[serve]
entry = "api.routes:app"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.watch.debounce_ms, 100);
        assert_eq!(config.watch.extensions.len(), 2);
        assert_eq!(config.serve.entry, "api.routes:app");
    }

    #[test]
    fn test_config_partial_sections_keep_defaults() {
        let config: Config = toml::from_str("[serve]\nentry = \"root:main\"\n").unwrap();
        assert_eq!(config.watch.debounce_ms, DEFAULT_DEBOUNCE_MS);
        assert_eq!(config.serve.entry, "root:main");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path());
        assert_eq!(config.serve.entry, "app:handler");
    }

    #[test]
    fn test_load_or_default_reads_project_config() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "[watch]\ndebounce_ms = 42\n",
        )
        .unwrap();
        let config = Config::load_or_default(dir.path());
        assert_eq!(config.watch.debounce_ms, 42);
    }

    #[test]
    fn test_env_override_debounce() {
        // SAFETY: Single-threaded test, no concurrent access to env vars
        unsafe { std::env::set_var("MOLT_DEBOUNCE_MS", "77") };
        let config = Config::default().with_env_overrides();
        assert_eq!(config.watch.debounce_ms, 77);
        unsafe { std::env::remove_var("MOLT_DEBOUNCE_MS") };
    }

    #[test]
    fn test_env_override_extensions() {
        // SAFETY: Single-threaded test, no concurrent access to env vars
        unsafe { std::env::set_var("MOLT_EXTENSIONS", ".md, unit") };
        let config = Config::default().with_env_overrides();
        assert_eq!(
            config.watch.extensions,
            vec!["md".to_string(), "unit".to_string()]
        );
        unsafe { std::env::remove_var("MOLT_EXTENSIONS") };
    }

    #[test]
    fn test_env_override_entry() {
        // SAFETY: Single-threaded test, no concurrent access to env vars
        unsafe { std::env::set_var("MOLT_ENTRY", "root:main") };
        let config = Config::default().with_env_overrides();
        assert_eq!(config.serve.entry, "root:main");
        unsafe { std::env::remove_var("MOLT_ENTRY") };
    }

    #[test]
    fn test_load_with_warnings_reports_unknown_key_with_suggestion() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[watch]\ndebounce_m = 1\n").unwrap();

        let (_config, warnings) = Config::load_with_warnings(&path).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "debounce_m");
        assert_eq!(warnings[0].line, Some(2));
        assert_eq!(warnings[0].suggestion, Some("debounce_ms".to_string()));
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[watch\n").unwrap();
        assert!(Config::load(&path).is_err());
    }
}

//! Common test utilities for Molt integration tests.

use std::fs;
use std::path::Path;

/// Demo project used across integration tests: an entry unit serving a
/// constant through a two-deep import chain.
///
/// Load order at bootstrap: dependency_two, dependency_one, app.
pub fn setup_demo_project(root: &Path) {
    fs::write(
        root.join("molt.toml"),
        r#"[watch]
debounce_ms = 100

[serve]
entry = "app:handler"
"#,
    )
    .unwrap();

    fs::write(
        root.join("app.md"),
        r#"---
description: Entry unit
imports: [dependency_one]
handlers:
  handler:
    serves: "dependency_one:CONSTANT"
---
Serves the constant from dependency_one.
"#,
    )
    .unwrap();

    fs::write(
        root.join("dependency_one.md"),
        r#"---
imports: [dependency_two]
exports:
  CONSTANT: "hello world"
---
"#,
    )
    .unwrap();

    fs::write(root.join("dependency_two.md"), "leaf unit\n").unwrap();
}

/// Rewrite `dependency_one`'s constant, as an edit under watch would.
pub fn set_constant(root: &Path, value: &str) {
    fs::write(
        root.join("dependency_one.md"),
        format!(
            "---\nimports: [dependency_two]\nexports:\n  CONSTANT: \"{}\"\n---\n",
            value
        ),
    )
    .unwrap();
}

//! Property tests for unit-file parsing.

use proptest::prelude::*;

use molt::parser::{extract_manifest, parse_manifest, parse_unit};

fn small_line() -> impl Strategy<Value = String> {
    // Keep generated content small and printable to avoid pathological YAML
    // cases. Exclude lines that are exactly "---" to avoid conflicting with
    // frontmatter delimiters.
    proptest::string::string_regex("[A-Za-z0-9 _:#\\-]{0,40}")
        .unwrap()
        .prop_filter("not a delimiter", |s| s.trim() != "---")
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Well-formed frontmatter splits into exactly the YAML and
    /// body it was built from.
    #[test]
    fn property_extract_manifest_round_trip(
        yaml_lines in proptest::collection::vec(small_line(), 0..=8),
        body_lines in proptest::collection::vec(small_line(), 0..=12),
    ) {
        let yaml = yaml_lines.join("\n");
        let body = body_lines.join("\n");

        let mut content_lines = Vec::new();
        content_lines.push("---".to_string());
        content_lines.extend(yaml_lines.clone());
        content_lines.push("---".to_string());
        content_lines.extend(body_lines.clone());
        let content = content_lines.join("\n");

        let extracted = extract_manifest(&content, std::path::Path::new("test.md"))
            .expect("expected extract_manifest to succeed for constructed content");

        prop_assert_eq!(extracted.yaml, yaml);
        prop_assert_eq!(extracted.body, body);
    }

    /// PROPERTY: `parse_manifest` never panics on arbitrary small YAML input.
    #[test]
    fn property_parse_manifest_never_panics(
        yaml in "(?s).{0,256}"
    ) {
        let _ = parse_manifest(&yaml, std::path::Path::new("test.md"));
    }

    /// PROPERTY: `parse_unit` never panics on arbitrary small input, and a
    /// file that does not open frontmatter always parses as a leaf unit.
    #[test]
    fn property_parse_unit_never_panics(
        content in "(?s).{0,512}"
    ) {
        let result = parse_unit(&content, std::path::Path::new("test.md"));
        if !content.lines().next().map(|l| l.trim() == "---").unwrap_or(false) {
            let (manifest, _body) = result.expect("leaf units always parse");
            prop_assert!(manifest.imports.is_empty());
        }
    }
}

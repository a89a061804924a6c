#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    // Try to convert bytes to a valid UTF-8 string
    if let Ok(content) = std::str::from_utf8(data) {
        let fake_path = Path::new("fuzz.md");

        // Fuzz the manifest extraction
        // This shouldn't panic regardless of input
        let _ = molt::parser::extract_manifest(content, fake_path);

        // Fuzz the full unit parse (frontmatter + YAML manifest)
        let _ = molt::parser::parse_unit(content, fake_path);
    }
});

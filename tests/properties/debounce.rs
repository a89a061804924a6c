//! Property tests for batch debouncing.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use proptest::prelude::*;

use molt::BatchDebouncer;

fn path_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z]{1,4}\\.md").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Any burst of rapid notifies flushes exactly one batch equal
    /// to the set-union of the notified paths, duplicates removed.
    #[test]
    fn property_burst_flushes_one_deduplicated_union(
        names in proptest::collection::vec(path_name(), 1..=32),
    ) {
        let debouncer = BatchDebouncer::new(Duration::from_millis(10));
        for name in &names {
            debouncer.notify(PathBuf::from(name));
        }

        std::thread::sleep(Duration::from_millis(20));
        let batch = debouncer.poll().expect("a non-empty burst must flush");

        let expected: BTreeSet<PathBuf> = names.iter().map(PathBuf::from).collect();
        prop_assert_eq!(batch, expected);

        // Exactly one flush: the debouncer is empty afterwards.
        prop_assert!(debouncer.poll().is_none());
        prop_assert!(!debouncer.has_pending());
    }

    /// PROPERTY: Polling inside the quiescence window never flushes.
    #[test]
    fn property_no_flush_inside_window(
        names in proptest::collection::vec(path_name(), 1..=8),
    ) {
        let debouncer = BatchDebouncer::new(Duration::from_secs(60));
        for name in &names {
            debouncer.notify(PathBuf::from(name));
        }
        prop_assert!(debouncer.poll().is_none());
        prop_assert!(debouncer.has_pending());
    }
}

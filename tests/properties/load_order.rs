//! Property tests for load-order sorting.

use std::collections::BTreeSet;

use proptest::prelude::*;

use molt::{LoadOrderIndex, UnitId, UNTRACKED_POSITION};

fn unit_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z_]{1,8}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Re-execution order is non-decreasing in position, with ties
    /// broken by identifier.
    #[test]
    fn property_sort_is_monotone_in_position(
        startup in proptest::collection::vec(unit_name(), 0..=16),
        invalidated in proptest::collection::btree_set(unit_name(), 0..=16),
    ) {
        let index = LoadOrderIndex::new(startup.iter().map(|n| UnitId::new(n.clone())).collect());
        let set: BTreeSet<UnitId> = invalidated.iter().map(|n| UnitId::new(n.clone())).collect();

        let ordered = index.sort_for_reload(&set);
        prop_assert_eq!(ordered.len(), set.len());

        for pair in ordered.windows(2) {
            let (pa, pb) = (index.position(&pair[0]), index.position(&pair[1]));
            prop_assert!(pa <= pb, "position must be non-decreasing");
            if pa == pb {
                prop_assert!(pair[0] < pair[1], "ties break by identifier");
            }
        }
    }

    /// PROPERTY: A unit never seen at startup sorts after every unit that
    /// was, for any invalidation set mixing both kinds.
    #[test]
    fn property_untracked_units_sort_last(
        startup in proptest::collection::vec(unit_name(), 1..=12),
        invalidated in proptest::collection::btree_set(unit_name(), 1..=12),
    ) {
        let index = LoadOrderIndex::new(startup.iter().map(|n| UnitId::new(n.clone())).collect());
        let set: BTreeSet<UnitId> = invalidated.iter().map(|n| UnitId::new(n.clone())).collect();

        let ordered = index.sort_for_reload(&set);
        let mut seen_untracked = false;
        for id in &ordered {
            if index.position(id) == UNTRACKED_POSITION {
                seen_untracked = true;
            } else {
                prop_assert!(
                    !seen_untracked,
                    "tracked unit ordered after an untracked one"
                );
            }
        }
    }
}

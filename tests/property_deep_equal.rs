use pacer::domain::models::{deep_equal, deep_equal_bounded, Snapshot};
use pacer::services::MemoCell;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

fn leaf() -> impl Strategy<Value = Snapshot> {
    prop_oneof![
        Just(Snapshot::Null),
        any::<bool>().prop_map(Snapshot::Bool),
        any::<i64>().prop_map(Snapshot::Int),
        // Finite floats only: NaN never equals itself
        (-1.0e9f64..1.0e9).prop_map(Snapshot::Float),
        "[a-z]{0,6}".prop_map(Snapshot::Str),
    ]
}

fn snapshot() -> impl Strategy<Value = Snapshot> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Snapshot::List),
            prop::collection::btree_map("[a-z]{1,4}", inner.clone(), 0..6).prop_map(Snapshot::Map),
            inner.prop_map(|s| Snapshot::Shared(Arc::new(s))),
        ]
    })
}

fn nested_lists(depth: usize) -> Snapshot {
    (0..depth).fold(Snapshot::Null, |acc, _| Snapshot::List(vec![acc]))
}

proptest! {
    /// Property: every snapshot equals a structural copy of itself
    #[test]
    fn prop_reflexive(a in snapshot()) {
        prop_assert!(deep_equal(&a, &a));
        prop_assert!(deep_equal(&a, &a.clone()));
    }

    /// Property: comparison does not depend on argument order
    #[test]
    fn prop_symmetric(a in snapshot(), b in snapshot()) {
        prop_assert_eq!(deep_equal(&a, &b), deep_equal(&b, &a));
    }

    /// Property: wrapping a value in a shared reference does not change equality
    #[test]
    fn prop_shared_is_transparent(a in snapshot()) {
        let shared = Snapshot::Shared(Arc::new(a.clone()));
        prop_assert!(deep_equal(&a, &shared));
        prop_assert!(deep_equal(&shared, &a));
    }

    /// Property: a map with an extra key is never equal to the original
    #[test]
    fn prop_extra_key_breaks_equality(
        entries in prop::collection::btree_map("[a-z]{1,4}", leaf(), 0..6),
        value in leaf(),
    ) {
        let mut extended: BTreeMap<String, Snapshot> = entries.clone();
        extended.insert("zzzzz".to_string(), value);
        prop_assert!(!deep_equal(&Snapshot::Map(entries), &Snapshot::Map(extended)));
    }

    /// Property: nesting past the limit is reported as an error
    #[test]
    fn prop_depth_limit_is_enforced(depth in 1usize..64, limit in 1usize..64) {
        let result = deep_equal_bounded(&nested_lists(depth), &nested_lists(depth), limit);
        if depth <= limit {
            prop_assert_eq!(result, Ok(true));
        } else {
            prop_assert!(result.is_err());
        }
    }

    /// Property: a memo cell recomputes exactly when the snapshot changes
    #[test]
    fn prop_memo_recomputes_on_change(seq in prop::collection::vec(snapshot(), 1..12)) {
        let mut cell = MemoCell::new();
        let mut expected = 0u64;
        let mut previous: Option<Snapshot> = None;

        for deps in seq {
            if previous.as_ref().map_or(true, |p| !deep_equal(p, &deps)) {
                expected += 1;
            }
            previous = Some(deps.clone());
            cell.compute(deps, || ());
        }

        prop_assert_eq!(cell.recomputations(), expected);
    }
}

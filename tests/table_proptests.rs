// Table property tests.
//
// Property 1: round trip. Distinct keys put with arbitrary values are all
// retrievable afterwards, and len equals the number of distinct keys.
//
// Property 2: last write wins. For arbitrary key sequences with repeats,
// each put returns the value of the previous put of the same key.
//
// Property 3: iteration. The yielded pairs equal the model map exactly.
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use strtab::Table;

proptest! {
    #[test]
    fn prop_distinct_round_trip(keys in proptest::collection::btree_set("[ -~]{0,12}", 0..400)) {
        let keys: Vec<String> = keys.into_iter().collect();
        let mut t = Table::new();
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(t.put(k.as_str(), i), None);
        }
        prop_assert_eq!(t.len(), keys.len());
        for (i, k) in keys.iter().enumerate() {
            prop_assert_eq!(t.get(k.as_str()), Some(&i));
        }
    }

    #[test]
    fn prop_last_write_wins(ops in proptest::collection::vec(("[a-d]{1,3}", any::<u16>()), 1..300)) {
        let mut t = Table::new();
        let mut model: BTreeMap<&str, u16> = BTreeMap::new();
        for (k, v) in &ops {
            let prev = t.put(k.as_str(), *v);
            prop_assert_eq!(prev, model.insert(k.as_str(), *v));
        }
        prop_assert_eq!(t.len(), model.len());
        for (k, v) in &model {
            prop_assert_eq!(t.get(*k), Some(v));
        }
    }

    #[test]
    fn prop_iteration_matches_model(ops in proptest::collection::vec(("[a-z0-9]{0,4}", any::<i64>()), 0..300)) {
        let mut t = Table::new();
        let mut model: BTreeMap<&str, i64> = BTreeMap::new();
        for (k, v) in &ops {
            t.put(k.as_str(), *v);
            model.insert(k.as_str(), *v);
        }
        let pairs: Vec<(&str, i64)> = t.iter().map(|(k, v)| (k, *v)).collect();
        let keys: BTreeSet<&str> = pairs.iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(keys.len(), pairs.len());
        let got: BTreeMap<&str, i64> = pairs.into_iter().collect();
        prop_assert_eq!(got, model);
    }
}

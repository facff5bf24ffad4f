#![cfg(test)]

// Property tests for Table kept inside the crate so they can inspect the
// directory and chain arena directly.

use crate::hash::{capacity_for, MAXIMUM_CAPACITY};
use crate::table::Table;
use hashbrown::HashMap;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::BTreeSet;

// Pool-indexed operations: indices shrink to earlier keys, the pool shrinks,
// and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Get(usize),
    GetKey(usize),
    Contains(String),
    Mutate(usize, i32),
    Reserve(usize),
    Iterate,
    Cursor,
}

fn arb_scenario(
    pool: impl Strategy<Value = Vec<String>>,
) -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    pool.prop_flat_map(|pool| {
        let idx = 0..pool.len();
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Get),
            1 => idx.clone().prop_map(Op::GetKey),
            1 => prop_oneof![contains_pool, "[a-zAB2]{0,6}"].prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => (0usize..200).prop_map(Op::Reserve),
            1 => Just(Op::Iterate),
            1 => Just(Op::Cursor),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn plain_pool() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40)
}

// Every key is a concatenation of "Aa"/"B2" blocks; keys of equal block
// count share one 32-bit hash.
fn colliding_pool() -> impl Strategy<Value = Vec<String>> {
    let key = proptest::collection::vec(prop_oneof![Just("Aa"), Just("B2")], 1..=4)
        .prop_map(|parts| parts.concat());
    proptest::collection::vec(key, 1..=40)
}

// Model: value per key plus the pool index whose `&str` was stored first.
fn run_scenario(pool: &[String], ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut sut: Table<'_, str, i32> = Table::new();
    let mut model: HashMap<&str, (i32, usize)> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = pool[i].as_str();
                let prev = sut.put(k, v);
                match model.get_mut(k) {
                    Some((mv, _)) => {
                        prop_assert_eq!(prev, Some(*mv));
                        *mv = v;
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        model.insert(k, (v, i));
                    }
                }
            }
            Op::Get(i) => {
                let k = pool[i].as_str();
                prop_assert_eq!(sut.get(k).copied(), model.get(k).map(|(v, _)| *v));
            }
            Op::GetKey(i) => {
                let k = pool[i].as_str();
                match (sut.get_key(k), model.get(k)) {
                    (Some(stored), Some(&(_, origin))) => {
                        prop_assert!(core::ptr::eq(stored, pool[origin].as_str()));
                    }
                    (None, None) => {}
                    (s, m) => {
                        prop_assert!(false, "get_key mismatch: {:?} vs {:?}", s, m);
                    }
                }
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(s.as_str()));
            }
            Op::Mutate(i, d) => {
                let k = pool[i].as_str();
                if let Some(v) = sut.get_mut(k) {
                    *v = v.wrapping_add(d);
                    let (mv, _) = model.get_mut(k).expect("model has key");
                    *mv = mv.wrapping_add(d);
                } else {
                    prop_assert!(!model.contains_key(k));
                }
            }
            Op::Reserve(n) => {
                let before = sut.capacity();
                sut.try_reserve(n).expect("small reservation");
                prop_assert!(sut.capacity() >= before);
                if n > 0 {
                    prop_assert!(sut.capacity() >= capacity_for(sut.len() + n).min(MAXIMUM_CAPACITY));
                }
            }
            Op::Iterate => {
                let seen: Vec<(&str, i32)> = sut.iter().map(|(k, v)| (k, *v)).collect();
                prop_assert_eq!(seen.len(), model.len());
                let keys: BTreeSet<&str> = seen.iter().map(|(k, _)| *k).collect();
                prop_assert_eq!(keys.len(), seen.len(), "a key was yielded twice");
                for (k, v) in seen {
                    prop_assert_eq!(Some(v), model.get(k).map(|(mv, _)| *mv));
                }
            }
            Op::Cursor => {
                let mut cursor = sut.cursor();
                let mut n = 0;
                while cursor.advance() {
                    let (mv, _) = model.get(cursor.key()).expect("cursor key in model");
                    prop_assert_eq!(cursor.value(), mv);
                    n += 1;
                }
                prop_assert_eq!(n, model.len());
                prop_assert!(!cursor.advance());
            }
        }

        // Structural post-conditions after each op.
        prop_assert_eq!(sut.len(), model.len());
        let cap = sut.capacity();
        prop_assert!(cap == 0 || cap.is_power_of_two());
        let inline = sut.directory.iter().filter(|s| s.is_some()).count();
        prop_assert_eq!(inline + sut.links.len(), sut.len());
    }
    Ok(())
}

// Property: state-machine equivalence against a hashbrown model.
// - `put` returns the previous value and keeps the first stored key.
// - `get`/`contains_key`/`get_key` agree with the model.
// - `iter` and the cursor yield each live entry exactly once.
// - Capacity stays a power of two; inline plus chained entries equal `len`.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(plain_pool())) {
        run_scenario(&pool, ops)?;
    }
}

// Property: the same invariants when most keys fully collide, which forces
// long chains through every growth step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario(colliding_pool())) {
        run_scenario(&pool, ops)?;
    }
}

// Table integration tests.
//
// Each test names the behaviour it checks. Core properties:
// - Distinct puts are all retrievable; `len` counts distinct keys.
// - Updates return the previous value and leave `len` unchanged.
// - Lookups on a never-inserted key miss, including on an unallocated table.
// - Iteration yields every live entry exactly once.
// - Growth preserves every association; colliding keys stay distinct.
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::CString;
use strtab::{hash_bytes, Table, TableError};

// Scenario: put "a"->"1", then "a"->"2".
// Verifies: first put returns None, second returns "1"; get sees "2"; len is 1.
#[test_log::test]
fn put_update_get_scenario() {
    let mut t = Table::new();
    assert_eq!(t.put("a", "1"), None);
    assert_eq!(t.put("a", "2"), Some("1"));
    assert_eq!(t.get("a"), Some(&"2"));
    assert_eq!(t.len(), 1);
}

// Test: distinct puts followed by lookups.
// Verifies: every key maps to its own value; len equals the distinct count.
#[test]
fn distinct_puts_are_retrievable() {
    let keys: Vec<String> = (0..5_000).map(|i| format!("sym_{i:05}")).collect();
    let mut t = Table::new();
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.put(k.as_str(), i), None);
    }
    assert_eq!(t.len(), keys.len());
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.get(k.as_str()), Some(&i));
        assert!(t.contains_key(k.as_str()));
    }
}

// Test: misses on an unallocated table.
// Verifies: get/contains_key/get_key return not-found and nothing is allocated.
#[test]
fn lookups_on_unallocated_table_miss() {
    let t: Table<'_, str, u32> = Table::new();
    assert_eq!(t.capacity(), 0);
    assert_eq!(t.get("nope"), None);
    assert!(!t.contains_key("nope"));
    assert_eq!(t.get_key("nope"), None);
    assert_eq!(t.capacity(), 0);
}

// Test: misses on a populated and a pre-sized, empty table.
#[test]
fn lookups_of_absent_keys_miss() {
    let presized: Table<'_, str, u32> = Table::with_capacity(64);
    assert_eq!(presized.capacity(), 64);
    assert_eq!(presized.get("nope"), None);

    let mut t = Table::new();
    t.put("present", 1u32);
    assert_eq!(t.get("absent"), None);
    assert!(!t.contains_key("absent"));
    assert_eq!(t.get_key("absent"), None);
}

// Scenario: keys "key0".."key999" with values "value0".."value999".
// Verifies: the collected (key, value) set equals the input set.
#[test]
fn iteration_yields_input_set() {
    let pairs: Vec<(String, String)> = (0..1000)
        .map(|i| (format!("key{i}"), format!("value{i}")))
        .collect();
    let mut t = Table::new();
    for (k, v) in &pairs {
        t.put(k.as_str(), v.as_str());
    }

    let collected: Vec<(&str, &str)> = t.iter().map(|(k, v)| (k, *v)).collect();
    assert_eq!(collected.len(), pairs.len());
    let got: BTreeSet<(&str, &str)> = collected.into_iter().collect();
    let expected: BTreeSet<(&str, &str)> =
        pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(got, expected);
}

// Test: explicit cursor over the same scenario.
// Verifies: each key appears once and reads back its value.
#[test]
fn cursor_yields_each_key_once() {
    let keys: Vec<String> = (0..1000).map(|i| format!("key{i}")).collect();
    let mut t = Table::new();
    for (i, k) in keys.iter().enumerate() {
        t.put(k.as_str(), i);
    }
    let mut seen = BTreeMap::new();
    let mut cursor = t.cursor();
    while cursor.advance() {
        assert!(seen.insert(cursor.key(), *cursor.value()).is_none());
    }
    assert!(!cursor.advance());
    assert_eq!(seen.len(), keys.len());
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(seen[k.as_str()], i);
    }
}

// Test: adversarial collisions.
// Assumes: "Aa" and "B2" share a hash, so any concatenation of n such blocks
// shares a hash with every other concatenation of n blocks.
// Verifies: all colliding keys keep distinct values.
#[test]
fn colliding_keys_keep_distinct_values() {
    assert_eq!(hash_bytes(b"Aa"), hash_bytes(b"B2"));
    let mut keys = vec![String::new()];
    for _ in 0..6 {
        keys = keys
            .iter()
            .flat_map(|p| [format!("{p}Aa"), format!("{p}B2")])
            .collect();
    }
    assert_eq!(keys.len(), 64);
    let h = hash_bytes(keys[0].as_bytes());
    assert!(keys.iter().all(|k| hash_bytes(k.as_bytes()) == h));

    let mut t = Table::new();
    for (i, k) in keys.iter().enumerate() {
        t.put(k.as_str(), i);
    }
    assert_eq!(t.len(), 64);
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.get(k.as_str()), Some(&i));
    }
    assert_eq!(t.iter().count(), 64);
}

// Test: interning through get_key.
// Verifies: a lookup with an equal but distinct string returns the stored reference.
#[test]
fn get_key_interns() {
    let canonical = String::from("symbol");
    let mut interner: Table<'_, str, ()> = Table::new();
    interner.put(canonical.as_str(), ());
    let probe = String::from("symbol");
    let stored = interner.get_key(probe.as_str()).unwrap();
    assert!(std::ptr::eq(stored, canonical.as_str()));
    assert!(!std::ptr::eq(stored, probe.as_str()));
}

// Test: CStr keys, as the C ABI stores them.
#[test]
fn cstr_keys() {
    let owned: Vec<CString> = (0..50).map(|i| CString::new(format!("c{i}")).unwrap()).collect();
    let mut t = Table::new();
    for (i, k) in owned.iter().enumerate() {
        t.put(k.as_c_str(), i);
    }
    assert_eq!(t.get(owned[7].as_c_str()), Some(&7));
    // Queries can use any key type with the same bytes.
    assert_eq!(t.get("c7"), Some(&7));
}

// Test: try_with_capacity and try_reserve report errors without side effects.
#[test]
fn fallible_sizing() {
    let t: Table<'_, str, ()> = Table::try_with_capacity(1000).expect("small directory");
    assert_eq!(t.capacity(), 1024);

    let mut t: Table<'_, str, ()> = Table::new();
    t.put("x", ());
    let cap = t.capacity();
    match t.try_reserve(usize::MAX - 1) {
        Err(TableError::CapacityOverflow { .. }) => {}
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(t.capacity(), cap);
    assert_eq!(t.get("x"), Some(&()));
}

// Test: draining reclaims every value before the table goes away.
#[test]
fn drain_reclaims_values() {
    let keys: Vec<String> = (0..2000).map(|i| format!("key{i}")).collect();
    let mut t = Table::new();
    for (i, k) in keys.iter().enumerate() {
        t.put(k.as_str(), Box::new(i));
    }
    let mut total = 0usize;
    let mut count = 0usize;
    for (_k, v) in t {
        total += *v;
        count += 1;
    }
    assert_eq!(count, 2000);
    assert_eq!(total, (0..2000).sum());
}

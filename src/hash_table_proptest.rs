#![cfg(all(test, feature = "std"))]

// Property tests for the raw table. They drive random operation sequences
// against a BTreeMap model and walk every chain after each step.

use std::collections::BTreeMap;

use proptest::prelude::*;

use crate::Error;
use crate::hash_table::Entry;
use crate::hash_table::HashTable;

#[derive(Clone, Copy, Debug)]
enum Hashing {
    /// `key % modulus`, which piles keys onto a few chains.
    Clustered(u64),
    /// A multiplicative mix spreading keys over all buckets.
    Spread,
}

impl Hashing {
    fn hash(self, key: u16) -> u64 {
        match self {
            Hashing::Clustered(modulus) => u64::from(key) % modulus,
            Hashing::Spread => u64::from(key).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        }
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Find(u16),
    Rehash(usize),
    Clear,
}

fn arb_hashing() -> impl Strategy<Value = Hashing> {
    prop_oneof![
        (1u64..=12).prop_map(Hashing::Clustered),
        Just(Hashing::Spread),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (0u16..96, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        5 => (0u16..96).prop_map(Op::Remove),
        3 => (0u16..96).prop_map(Op::Find),
        1 => (0usize..80).prop_map(Op::Rehash),
        1 => Just(Op::Clear),
    ]
}

fn assert_matches_model(table: &HashTable<(u16, u32)>, model: &BTreeMap<u16, u32>, hashing: Hashing) {
    table.check_chains();
    assert_eq!(table.len(), model.len());
    assert_eq!(table.iter().count(), model.len());
    for (&key, &value) in model {
        let hash = hashing.hash(key);
        assert_eq!(table.find(hash, |e| e.0 == key), Some(&(key, value)));
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    // Invariants exercised across random operation sequences:
    // - Every live key is reachable from its ideal bucket; no bucket is
    //   reached twice; empty buckets carry no links.
    // - Inserting never duplicates a key, and failed insertions or rehashes
    //   leave every bucket exactly as it was.
    // - `TableFull` is reported exactly when every bucket is occupied.
    #[test]
    fn prop_chains_stay_consistent(
        hashing in arb_hashing(),
        capacity in 1usize..64,
        ops in proptest::collection::vec(arb_op(), 1..120),
    ) {
        let mut table: HashTable<(u16, u32)> = HashTable::with_capacity(capacity).unwrap();
        let mut model = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let hash = hashing.hash(key);
                    let before = table.bucket_snapshot();
                    match table.entry(hash, |e| e.0 == key) {
                        Ok(Entry::Occupied(mut entry)) => {
                            prop_assert!(model.contains_key(&key));
                            entry.get_mut().1 = value;
                            model.insert(key, value);
                        }
                        Ok(Entry::Vacant(entry)) => {
                            prop_assert!(!model.contains_key(&key));
                            entry.insert((key, value));
                            model.insert(key, value);
                        }
                        Err(err) => {
                            prop_assert!(!model.contains_key(&key));
                            prop_assert_eq!(table.bucket_snapshot(), before);
                            let full = table.len() == table.capacity();
                            prop_assert_eq!(
                                matches!(err, Error::TableFull { .. }),
                                full,
                                "unexpected {:?}", err
                            );
                        }
                    }
                }
                Op::Remove(key) => {
                    let removed = table.remove(hashing.hash(key), |e| e.0 == key);
                    prop_assert_eq!(removed.map(|e| e.1), model.remove(&key));
                }
                Op::Find(key) => {
                    let found = table.find(hashing.hash(key), |e| e.0 == key);
                    prop_assert_eq!(found.map(|e| e.1), model.get(&key).copied());
                }
                Op::Rehash(new_capacity) => {
                    let before = table.bucket_snapshot();
                    let old_capacity = table.capacity();
                    match table.rehash(new_capacity) {
                        Ok(()) if new_capacity < model.len() => {
                            prop_assert_eq!(table.capacity(), old_capacity);
                        }
                        Ok(()) => prop_assert_eq!(table.capacity(), new_capacity),
                        Err(err) => {
                            let overflow = matches!(err, Error::ProbeChainOverflow { .. });
                            prop_assert!(new_capacity == 0 || overflow);
                            prop_assert_eq!(table.bucket_snapshot(), before);
                        }
                    }
                }
                Op::Clear => {
                    table.clear();
                    model.clear();
                }
            }

            assert_matches_model(&table, &model, hashing);
        }
    }

    // A clone has the same buckets and yields the same values in the same
    // order, and stays independent of its source.
    #[test]
    fn prop_clone_is_identical(
        hashing in arb_hashing(),
        keys in proptest::collection::vec(0u16..500, 0..60),
    ) {
        let mut table: HashTable<(u16, u32)> = HashTable::with_capacity(64).unwrap();
        for key in keys {
            let hash = hashing.hash(key);
            if let Ok(entry) = table.entry(hash, |e| e.0 == key) {
                entry.or_insert((key, u32::from(key) * 3));
            }
        }

        let mut cloned = table.clone();
        prop_assert_eq!(cloned.bucket_snapshot(), table.bucket_snapshot());
        prop_assert!(cloned.iter().eq(table.iter()));

        cloned.clear();
        prop_assert!(cloned.is_empty());
        table.check_chains();
    }
}

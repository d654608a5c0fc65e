//! Property-based tests for the hash map and set.
//!
//! Every operation sequence is replayed against `std::collections::HashMap`
//! and the structural invariants of the table are checked along the way.

use std::collections::HashMap as StdMap;

use prim_hash::HashMap;
use prim_hash::HashSet;
use prim_hash::KeyHasher;
use prim_hash::hash_table::array_size;
use prim_hash::hash_table::max_fill;
use proptest::prelude::*;

// =============================================================================
// GENERATORS
// =============================================================================

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i32, u32),
    Remove(i32),
    Get(i32),
    AddTo(i32, u32),
    CursorRemoveEvery(usize),
    Trim,
    Clear,
}

/// Keys from a narrow range so that collisions, the zero key and repeated
/// removals are common.
fn key() -> impl Strategy<Value = i32> {
    prop_oneof![
        4 => -64..64i32,
        1 => any::<i32>(),
    ]
}

fn map_ops() -> impl Strategy<Value = Vec<MapOp>> {
    prop::collection::vec(
        prop_oneof![
            8 => (key(), 0..1_000_000u32).prop_map(|(k, v)| MapOp::Insert(k, v)),
            4 => key().prop_map(MapOp::Remove),
            2 => key().prop_map(MapOp::Get),
            2 => (key(), 0..100u32).prop_map(|(k, v)| MapOp::AddTo(k, v)),
            1 => (1..5usize).prop_map(MapOp::CursorRemoveEvery),
            1 => Just(MapOp::Trim),
            1 => Just(MapOp::Clear),
        ],
        0..400,
    )
}

fn load_factor() -> impl Strategy<Value = f32> {
    prop_oneof![Just(0.25f32), Just(0.5f32), Just(0.75f32), Just(0.9f32), 0.05f32..0.95]
}

/// Hashes every key into one of eight buckets before mixing.
#[derive(Clone, Copy, Default)]
struct Bucketed;

impl KeyHasher<i32> for Bucketed {
    fn hash(&self, key: i32) -> u64 {
        (key & 7) as u64
    }

    fn equals(&self, a: i32, b: i32) -> bool {
        a == b
    }
}

fn check_invariants<S: KeyHasher<i32>>(map: &HashMap<i32, u32, S>, floor: usize) {
    let table = map.table();
    let slots = table.slot_count();
    assert!(slots.is_power_of_two());
    assert!(slots >= floor);
    assert_eq!(map.capacity(), max_fill(slots, map.load_factor()));
    assert!(map.len() <= map.capacity() + 1);
    assert_eq!(map.iter().count(), map.len());
}

// =============================================================================
// MODEL TESTS
// =============================================================================

proptest! {
    #[test]
    fn prop_map_matches_std(ops in map_ops(), expected in 0..64usize, f in load_factor()) {
        let mut map: HashMap<i32, u32> =
            HashMap::with_capacity_and_load_factor(expected, f).unwrap();
        let mut floor = map.table().slot_count();
        let mut model: StdMap<i32, u32> = StdMap::new();

        for op in ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(map.insert(k, v), model.insert(k, v));
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(map.remove(k), model.remove(&k));
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(map.get(k), model.get(&k));
                }
                MapOp::AddTo(k, v) => {
                    let old = map.add_to(k, v);
                    let entry = model.entry(k).or_insert(0);
                    prop_assert_eq!(old, *entry);
                    *entry += v;
                }
                MapOp::CursorRemoveEvery(step) => {
                    let mut i = 0;
                    let mut cursor = map.cursor();
                    while let Some(entry) = cursor.next_entry() {
                        let k = entry.key();
                        if i % step == 0 {
                            let (removed, _) = cursor.remove().unwrap();
                            prop_assert_eq!(removed, k);
                            model.remove(&k);
                        }
                        i += 1;
                    }
                }
                MapOp::Trim => {
                    prop_assert!(map.trim());
                    // Trimming may go below the size requested at construction.
                    floor = floor.min(map.table().slot_count());
                }
                MapOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
            check_invariants(&map, floor);
            prop_assert_eq!(map.len(), model.len());
        }

        for (k, v) in &model {
            prop_assert_eq!(map.get(*k), Some(v));
        }
    }

    #[test]
    fn prop_colliding_strategy_matches_std(ops in map_ops()) {
        let mut map: HashMap<i32, u32, Bucketed> =
            HashMap::with_capacity_and_strategy(0, Bucketed);
        let floor = map.table().slot_count();
        let mut model: StdMap<i32, u32> = StdMap::new();

        for op in ops {
            match op {
                MapOp::Insert(k, v) => prop_assert_eq!(map.insert(k, v), model.insert(k, v)),
                MapOp::Remove(k) => prop_assert_eq!(map.remove(k), model.remove(&k)),
                MapOp::Get(k) => prop_assert_eq!(map.get(k), model.get(&k)),
                MapOp::CursorRemoveEvery(step) => {
                    map.retain(|k, _| k.rem_euclid(step as i32) != 0);
                    model.retain(|k, _| k.rem_euclid(step as i32) != 0);
                }
                _ => {}
            }
            check_invariants(&map, floor);
        }

        let mut entries: Vec<_> = map.iter().map(|(k, v)| (k, *v)).collect();
        entries.sort_unstable();
        let mut expected: Vec<_> = model.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(entries, expected);
    }
}

// =============================================================================
// CURSOR AND SPLITTER TESTS
// =============================================================================

proptest! {
    #[test]
    fn prop_cursor_visits_each_entry_once(
        keys in prop::collection::hash_set(any::<i64>(), 0..2000),
        step in 1..6usize,
    ) {
        let mut map: HashMap<i64, i64> = keys.iter().map(|k| (*k, k.wrapping_mul(3))).collect();

        let mut visited = Vec::new();
        let mut removed = 0;
        let mut cursor = map.cursor();
        while let Some(entry) = cursor.next_entry() {
            prop_assert_eq!(*entry.value(), entry.key().wrapping_mul(3));
            visited.push(entry.key());
            if (visited.len() - 1) % step == 0 {
                cursor.remove().unwrap();
                removed += 1;
            }
        }

        visited.sort_unstable();
        let mut expected: Vec<_> = keys.iter().copied().collect();
        expected.sort_unstable();
        prop_assert_eq!(visited, expected);
        prop_assert_eq!(map.len(), keys.len() - removed);
        prop_assert_eq!(map.len(), keys.len() - keys.len().div_ceil(step));
    }

    #[test]
    fn prop_splitter_partitions_entries(
        keys in prop::collection::hash_set(any::<u16>(), 0..3000),
        depth in 0..8u32,
    ) {
        let set: HashSet<u16> = keys.iter().copied().collect();

        let mut parts = vec![set.splitter()];
        for _ in 0..depth {
            let mut next = Vec::new();
            for mut part in parts {
                if let Some(prefix) = part.try_split() {
                    prop_assert!(prefix.exact_size().is_none());
                    next.push(prefix);
                }
                next.push(part);
            }
            parts = next;
        }

        let mut seen = Vec::new();
        for part in parts {
            let estimate = part.estimate_size();
            prop_assert!(estimate <= set.len());
            seen.extend(part);
        }
        seen.sort_unstable();
        let mut expected: Vec<_> = keys.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
    }
}

// =============================================================================
// SIZING TESTS
// =============================================================================

proptest! {
    #[test]
    fn prop_growth_threshold(expected in 0..300usize, f in load_factor()) {
        let mut map: HashMap<u64, u64> =
            HashMap::with_capacity_and_load_factor(expected, f).unwrap();
        let slots = map.table().slot_count();
        prop_assert_eq!(slots, array_size(expected, f).unwrap());

        let fill = map.capacity();
        for k in 1..=fill as u64 {
            map.insert(k, k);
        }
        prop_assert_eq!(map.table().slot_count(), slots);

        map.insert(u64::MAX, 0);
        let grown = map.table().slot_count();
        prop_assert!(grown > slots);
        prop_assert_eq!(grown, array_size(map.len() + 1, f).unwrap());
        prop_assert!(map.len() <= map.capacity());
        for k in 1..=fill as u64 {
            prop_assert_eq!(map.get(k), Some(&k));
        }
    }

    #[test]
    fn prop_trim_is_minimal_and_lossless(
        keys in prop::collection::hash_set(any::<u32>(), 0..500),
        extra in 0..5000usize,
        f in load_factor(),
    ) {
        let mut set: HashSet<u32> =
            HashSet::with_capacity_and_load_factor(keys.len() + extra, f).unwrap();
        set.extend(keys.iter().copied());

        prop_assert!(set.trim());
        let slots = set.table().slot_count();
        prop_assert!(set.len() <= max_fill(slots, f));
        prop_assert_eq!(slots, array_size(set.len(), f).unwrap());
        for k in &keys {
            prop_assert!(set.contains(*k));
        }
        prop_assert_eq!(set.len(), keys.len());
    }

    #[test]
    fn prop_same_strategy_same_layout(keys in prop::collection::vec(any::<i32>(), 0..500)) {
        let a: HashMap<i32, usize, Bucketed> =
            keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();
        let b: HashMap<i32, usize, Bucketed> =
            keys.iter().enumerate().map(|(i, k)| (*k, i)).collect();

        prop_assert_eq!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
        prop_assert!(a == b);
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn expected_four_grows_on_the_seventh_key() {
    let mut map: HashMap<i32, i32> = HashMap::with_capacity(4);
    assert_eq!(map.table().slot_count(), 8);
    assert_eq!(map.capacity(), 6);

    for k in 1..=6 {
        map.insert(k, -k);
    }
    assert_eq!(map.len(), 6);
    assert_eq!(map.table().slot_count(), 8);

    map.insert(7, -7);
    assert_eq!(map.table().slot_count(), 16);
    assert_eq!(map.capacity(), 12);
    for k in 1..=7 {
        assert_eq!(map.get(k), Some(&-k));
    }
}

#[test]
fn zero_key_insert_remove_reinsert() {
    let mut set: HashSet<char> = HashSet::new();
    assert!(set.insert('\0'));
    assert!(set.insert('x'));
    assert!(set.remove('\0'));
    assert!(!set.contains('\0'));
    assert!(set.contains('x'));
    assert!(set.insert('\0'));
    assert_eq!(set.len(), 2);
}

#[test]
fn removing_every_third_entry_through_a_cursor() {
    for n in [0usize, 1, 2, 3, 10, 1000, 4097] {
        let mut map: HashMap<u32, u32> = (0..n as u32)
            .map(|k| (k.wrapping_mul(2_654_435_761), k))
            .collect();

        let mut visited = 0;
        let mut cursor = map.cursor();
        while cursor.next_entry().is_some() {
            visited += 1;
            if visited % 3 == 0 {
                cursor.remove().unwrap();
            }
        }

        assert_eq!(visited, n);
        assert_eq!(map.len(), (2 * n).div_ceil(3));
        assert_eq!(map.iter().count(), map.len());
        for (k, v) in map.iter() {
            assert_eq!(k, v.wrapping_mul(2_654_435_761));
        }
    }
}

//! Property-based testing for rawcoll containers
//!
//! Each container is driven with random operation sequences and checked
//! against a standard-library model after every step.

use proptest::prelude::*;
use rawcoll::{BucketMap, DList, DynArray, ErrorKind};
use std::collections::{HashMap, VecDeque};

// =============================================================================
// PROPERTY TEST GENERATORS
// =============================================================================

/// Operations applied to a sequence container
#[derive(Debug, Clone)]
pub enum SeqOp {
    PushBack(i32),
    PushFront(i32),
    PopBack,
    PopFront,
    Insert(usize, i32),
    Erase(usize),
    Reverse,
    Sort,
    SortDesc,
    Clear,
}

fn seq_ops_strategy() -> impl Strategy<Value = Vec<SeqOp>> {
    prop::collection::vec(
        prop_oneof![
            4 => any::<i32>().prop_map(SeqOp::PushBack),
            2 => any::<i32>().prop_map(SeqOp::PushFront),
            2 => Just(SeqOp::PopBack),
            1 => Just(SeqOp::PopFront),
            2 => (0usize..64, any::<i32>()).prop_map(|(i, v)| SeqOp::Insert(i, v)),
            2 => (0usize..64).prop_map(SeqOp::Erase),
            1 => Just(SeqOp::Reverse),
            1 => Just(SeqOp::Sort),
            1 => Just(SeqOp::SortDesc),
            1 => Just(SeqOp::Clear),
        ],
        0..300,
    )
}

/// Operations applied to a map
#[derive(Debug, Clone)]
pub enum MapOp {
    Assign(u16, u32),
    Vivify(u16),
    Erase(u16),
    Rehash(usize),
    Clear,
}

fn map_ops_strategy() -> impl Strategy<Value = Vec<MapOp>> {
    prop::collection::vec(
        prop_oneof![
            5 => (0u16..200, any::<u32>()).prop_map(|(k, v)| MapOp::Assign(k, v)),
            2 => (0u16..200).prop_map(MapOp::Vivify),
            3 => (0u16..200).prop_map(MapOp::Erase),
            1 => (1usize..64).prop_map(MapOp::Rehash),
            1 => Just(MapOp::Clear),
        ],
        0..400,
    )
}

/// Values with a sort key and an identity used to observe stability
fn keyed_strategy() -> impl Strategy<Value = Vec<(u8, usize)>> {
    prop::collection::vec(0u8..8, 0..200).prop_map(|keys| {
        keys.into_iter()
            .enumerate()
            .map(|(id, key)| (key, id))
            .collect()
    })
}

// =============================================================================
// DYNARRAY PROPERTY TESTS
// =============================================================================

proptest! {
    #[test]
    fn prop_dyn_array_matches_vec_model(ops in seq_ops_strategy()) {
        let mut array = DynArray::new();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                SeqOp::PushBack(v) => {
                    array.push_back(v).unwrap();
                    model.push(v);
                }
                SeqOp::PushFront(v) => {
                    array.insert(0, v).unwrap();
                    model.insert(0, v);
                }
                SeqOp::PopBack => match model.pop() {
                    Some(expected) => prop_assert_eq!(array.pop_back().unwrap(), expected),
                    None => prop_assert_eq!(array.pop_back().unwrap_err().kind(), ErrorKind::Underflow),
                },
                SeqOp::PopFront => {
                    if model.is_empty() {
                        prop_assert_eq!(array.erase(0).unwrap_err().kind(), ErrorKind::OutOfRange);
                    } else {
                        prop_assert_eq!(array.erase(0).unwrap(), model.remove(0));
                    }
                }
                SeqOp::Insert(i, v) => {
                    if i <= model.len() {
                        array.insert(i, v).unwrap();
                        model.insert(i, v);
                    } else {
                        prop_assert_eq!(array.insert(i, v).unwrap_err().kind(), ErrorKind::OutOfRange);
                    }
                }
                SeqOp::Erase(i) => {
                    if i < model.len() {
                        prop_assert_eq!(array.erase(i).unwrap(), model.remove(i));
                    } else {
                        prop_assert_eq!(array.erase(i).unwrap_err().kind(), ErrorKind::OutOfRange);
                    }
                }
                SeqOp::Reverse => {
                    array.reverse();
                    model.reverse();
                }
                SeqOp::Sort => {
                    array.sort().unwrap();
                    model.sort();
                }
                SeqOp::SortDesc => {
                    array.sort_with(|a, b| a > b).unwrap();
                    model.sort_by(|a, b| b.cmp(a));
                }
                SeqOp::Clear => {
                    array.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(array.len(), model.len());
            prop_assert!(array.len() <= array.capacity());
            prop_assert_eq!(array.as_slice(), model.as_slice());
        }
    }

    #[test]
    fn prop_dyn_array_capacity_is_power_of_two(count in 1usize..2000) {
        let mut array = DynArray::new();
        for i in 0..count {
            array.push_back(i).unwrap();
        }
        prop_assert!(array.capacity().is_power_of_two());
        prop_assert!(array.capacity() >= count);
        prop_assert!(array.capacity() < count * 2);
    }

    #[test]
    fn prop_dyn_array_sort_matches_std(elements in prop::collection::vec(any::<i64>(), 0..500)) {
        let mut array: DynArray<i64> = elements.iter().copied().collect();
        array.sort().unwrap();

        let mut expected = elements;
        expected.sort();
        prop_assert_eq!(array.as_slice(), expected.as_slice());
    }

    #[test]
    fn prop_dyn_array_sort_is_stable(items in keyed_strategy()) {
        let mut array: DynArray<(u8, usize)> = items.iter().copied().collect();
        array.sort_with(|a, b| a.0 < b.0).unwrap();

        let mut expected = items;
        expected.sort_by_key(|item| item.0);
        prop_assert_eq!(array.as_slice(), expected.as_slice());
    }

    #[test]
    fn prop_dyn_array_descending_sort(elements in prop::collection::vec(any::<u16>(), 0..300)) {
        let mut array: DynArray<u16> = elements.iter().copied().collect();
        array.sort_with(|a, b| a > b).unwrap();
        prop_assert!(array.windows(2).all(|w| w[0] >= w[1]));
        prop_assert_eq!(array.len(), elements.len());
    }
}

// =============================================================================
// DLIST PROPERTY TESTS
// =============================================================================

proptest! {
    #[test]
    fn prop_dlist_matches_deque_model(ops in seq_ops_strategy()) {
        let mut list = DList::new();
        let mut model: VecDeque<i32> = VecDeque::new();

        for op in ops {
            match op {
                SeqOp::PushBack(v) => {
                    list.push_back(v);
                    model.push_back(v);
                }
                SeqOp::PushFront(v) => {
                    list.push_front(v);
                    model.push_front(v);
                }
                SeqOp::PopBack => match model.pop_back() {
                    Some(expected) => prop_assert_eq!(list.pop_back().unwrap(), expected),
                    None => prop_assert_eq!(list.pop_back().unwrap_err().kind(), ErrorKind::Underflow),
                },
                SeqOp::PopFront => match model.pop_front() {
                    Some(expected) => prop_assert_eq!(list.pop_front().unwrap(), expected),
                    None => prop_assert_eq!(list.pop_front().unwrap_err().kind(), ErrorKind::Underflow),
                },
                SeqOp::Insert(i, v) => {
                    if i <= model.len() {
                        list.insert(i, v).unwrap();
                        model.insert(i, v);
                    } else {
                        prop_assert_eq!(list.insert(i, v).unwrap_err().kind(), ErrorKind::OutOfRange);
                    }
                }
                SeqOp::Erase(i) => {
                    if i < model.len() {
                        prop_assert_eq!(list.erase(i).unwrap(), model.remove(i).unwrap());
                    } else {
                        prop_assert_eq!(list.erase(i).unwrap_err().kind(), ErrorKind::OutOfRange);
                    }
                }
                SeqOp::Reverse => {
                    list.reverse();
                    model.make_contiguous().reverse();
                }
                SeqOp::Sort => {
                    list.sort();
                    model.make_contiguous().sort();
                }
                SeqOp::SortDesc => {
                    list.sort_with(|a, b| a > b);
                    model.make_contiguous().sort_by(|a, b| b.cmp(a));
                }
                SeqOp::Clear => {
                    list.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(list.len(), model.len());
            prop_assert!(list.verify_links());
            prop_assert!(list.iter().eq(model.iter()));
            prop_assert!(list.iter().rev().eq(model.iter().rev()));
            prop_assert_eq!(list.front().ok(), model.front());
            prop_assert_eq!(list.back().ok(), model.back());
        }

        prop_assert!(list.iter().eq(model.iter()));
        prop_assert!(list.iter().rev().eq(model.iter().rev()));
    }

    #[test]
    fn prop_dlist_sort_is_stable(items in keyed_strategy()) {
        let mut list: DList<(u8, usize)> = items.iter().copied().collect();
        list.sort_with(|a, b| a.0 < b.0);

        let mut expected = items;
        expected.sort_by_key(|item| item.0);
        prop_assert!(list.verify_links());
        prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_dlist_sort_matches_std(elements in prop::collection::vec(any::<i32>(), 0..500)) {
        let mut list: DList<i32> = elements.iter().copied().collect();
        list.sort();

        let mut expected = elements;
        expected.sort();
        prop_assert!(list.verify_links());
        prop_assert_eq!(list.len(), expected.len());
        prop_assert!(list.iter().eq(expected.iter()));
        prop_assert_eq!(list.back().ok(), expected.last());
    }

    #[test]
    fn prop_dlist_reverse_twice_is_identity(elements in prop::collection::vec(any::<u8>(), 0..200)) {
        let mut list: DList<u8> = elements.iter().copied().collect();
        list.reverse();
        prop_assert!(list.verify_links());
        prop_assert!(list.iter().eq(elements.iter().rev()));
        list.reverse();
        prop_assert!(list.iter().eq(elements.iter()));
    }
}

// =============================================================================
// BUCKETMAP PROPERTY TESTS
// =============================================================================

proptest! {
    #[test]
    fn prop_bucket_map_matches_hashmap_model(
        initial in 1usize..8,
        ops in map_ops_strategy()
    ) {
        let mut map = BucketMap::with_buckets(initial).unwrap();
        let mut model: HashMap<u16, u32> = HashMap::new();

        for op in ops {
            match op {
                MapOp::Assign(k, v) => {
                    let previous = map.insert_or_assign(k, v).unwrap();
                    prop_assert_eq!(previous, model.insert(k, v));
                }
                MapOp::Vivify(k) => {
                    let value = *map.get_or_insert_default(k).unwrap();
                    prop_assert_eq!(value, *model.entry(k).or_default());
                }
                MapOp::Erase(k) => match model.remove(&k) {
                    Some(expected) => prop_assert_eq!(map.erase(&k).unwrap(), expected),
                    None => prop_assert_eq!(map.erase(&k).unwrap_err().kind(), ErrorKind::KeyNotFound),
                },
                MapOp::Rehash(n) => map.rehash(n).unwrap(),
                MapOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(map.len(), model.len());
        }

        for (k, v) in &model {
            prop_assert_eq!(map.get(k), Some(v));
        }
        let mut keys = map.keys().unwrap();
        keys.sort().unwrap();
        let mut expected: Vec<u16> = model.keys().copied().collect();
        expected.sort();
        prop_assert_eq!(keys.as_slice(), expected.as_slice());
    }

    #[test]
    fn prop_bucket_map_load_factor_bounded(keys in prop::collection::hash_set(any::<u64>(), 0..500)) {
        let mut map = BucketMap::with_buckets(1).unwrap();
        for &key in &keys {
            map.insert_or_assign(key, ()).unwrap();
            prop_assert!(map.load_factor() <= 0.75);
        }
        prop_assert_eq!(map.len(), keys.len());
    }

    #[test]
    fn prop_bucket_map_rehash_retains_entries(
        entries in prop::collection::hash_map(any::<i32>(), any::<i32>(), 0..300),
        target in 1usize..100
    ) {
        let mut map: BucketMap<i32, i32> = entries.iter().map(|(&k, &v)| (k, v)).collect();
        map.rehash(target).unwrap();

        prop_assert_eq!(map.bucket_count(), target);
        prop_assert_eq!(map.len(), entries.len());
        for (k, v) in &entries {
            prop_assert_eq!(map.get(k), Some(v));
        }
    }
}

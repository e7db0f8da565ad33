use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use weak_collections::{WeakArray, WeakDictionary, WeakSet};
use weak_collections_macros::leak_checked_test;
use weak_collections_testing::{Tracked, live_tracked};

#[cfg(not(miri))]
const NUM_OPERATIONS: usize = 5_000;
#[cfg(miri)]
const NUM_OPERATIONS: usize = 100;

const INTERESTING_SEEDS: [u64; 2] = [0, 8_675_309];

#[test]
fn test_random_operations_agree_with_strong_model() {
    for &seed in &INTERESTING_SEEDS {
        run_random_operations_with_seed(seed);
    }

    for _ in 0..10 {
        let random_seed: u64 = rand::rng().random();
        println!("Using random seed: {}", random_seed);
        run_random_operations_with_seed(random_seed);
    }
}

fn run_random_operations_with_seed(seed: u64) {
    let baseline = live_tracked();
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut owners: HashMap<usize, Rc<Tracked>> = HashMap::new();
        let mut next_id = 0;

        let mut array = WeakArray::new();
        let mut set = WeakSet::new();
        let mut dictionary = WeakDictionary::new();

        // Strong models of what each collection should report
        let mut array_model: Vec<usize> = Vec::new();
        let mut set_model: BTreeSet<usize> = BTreeSet::new();
        let mut dictionary_model: BTreeSet<usize> = BTreeSet::new();

        for _ in 0..NUM_OPERATIONS {
            match rng.random_range(0..6) {
                0 => {
                    // New object
                    let object = Tracked::rc(next_id);
                    array.add(&object);
                    set.insert(&object);
                    dictionary.insert(next_id, &object);
                    array_model.push(next_id);
                    set_model.insert(next_id);
                    dictionary_model.insert(next_id);
                    owners.insert(next_id, object);
                    next_id += 1;
                }
                1 => {
                    // Re-add a live object to the array
                    if let Some((&id, object)) = owners.iter().choose(&mut rng) {
                        array.add(object);
                        assert_eq!(set.insert(object), set_model.insert(id));
                        array_model.push(id);
                    }
                }
                2 => {
                    // Reclaim: drop the only strong owner
                    let chosen = owners.keys().copied().choose(&mut rng);
                    if let Some(id) = chosen {
                        owners.remove(&id);
                        array_model.retain(|&entry| entry != id);
                        set_model.remove(&id);
                        dictionary_model.remove(&id);
                    }
                }
                3 => {
                    // Explicit removal from array and set
                    if let Some((&id, object)) = owners.iter().choose(&mut rng) {
                        let expected = array_model.iter().filter(|&&entry| entry == id).count();
                        assert_eq!(array.remove_identical(object), expected);
                        array_model.retain(|&entry| entry != id);
                        assert_eq!(set.remove(object), set_model.remove(&id));
                    }
                }
                4 => {
                    // Unset a key in the dictionary, or put it back
                    if let Some((&id, object)) = owners.iter().choose(&mut rng) {
                        if dictionary_model.contains(&id) {
                            let previous = if rng.random_bool(0.5) {
                                dictionary.remove(&id)
                            } else {
                                dictionary.set(id, None)
                            };
                            assert!(Rc::ptr_eq(&previous.unwrap(), object));
                            dictionary_model.remove(&id);
                            assert!(dictionary.remove(&id).is_none());
                        } else {
                            assert!(dictionary.insert(id, object).is_none());
                            dictionary_model.insert(id);
                        }
                    }
                }
                5 => {
                    // Read everything back
                    let array_ids: Vec<usize> = array.iter().map(|item| item.id()).collect();
                    assert_eq!(array_ids, array_model, "array mismatch with seed {}", seed);

                    let set_ids: BTreeSet<usize> = set.iter().map(|item| item.id()).collect();
                    assert_eq!(set_ids, set_model, "set mismatch with seed {}", seed);

                    assert_eq!(dictionary.len(), dictionary_model.len());
                    for (id, object) in &owners {
                        match dictionary.get(id) {
                            Some(value) => {
                                assert!(dictionary_model.contains(id));
                                assert!(Rc::ptr_eq(&value, object));
                            }
                            None => assert!(!dictionary_model.contains(id)),
                        }
                    }
                }
                _ => unreachable!(),
            }
        }

        // Dropping every owner empties every collection
        owners.clear();
        assert!(array.is_empty());
        assert!(set.is_empty());
        assert!(dictionary.is_empty());
    }
    assert_eq!(live_tracked(), baseline);
}

#[leak_checked_test]
fn test_liveness_after_reclaiming_any_subset() {
    for mask in 0u32..(1 << 5) {
        let mut objects: Vec<Option<Rc<Tracked>>> = (0..5).map(|id| Some(Tracked::rc(id))).collect();
        let array: WeakArray<_> = objects.iter().flatten().collect();
        let set: WeakSet<_> = objects.iter().flatten().collect();
        let dictionary: WeakDictionary<_, _> = objects
            .iter()
            .flatten()
            .map(|object| (object.id(), object))
            .collect();

        for (id, slot) in objects.iter_mut().enumerate() {
            if mask & (1 << id) != 0 {
                *slot = None;
            }
        }
        let expected: Vec<usize> = objects.iter().flatten().map(|object| object.id()).collect();

        let array_ids: Vec<usize> = array.iter().map(|item| item.id()).collect();
        assert_eq!(array_ids, expected);

        let mut set_ids: Vec<usize> = set.iter().map(|item| item.id()).collect();
        set_ids.sort();
        assert_eq!(set_ids, expected);

        let mut keys = dictionary.keys();
        keys.sort();
        assert_eq!(keys, expected);
    }
}

#[leak_checked_test]
fn test_cleanup_is_idempotent() {
    let mut objects: Vec<_> = (0..10).map(Tracked::rc).collect();
    let array: WeakArray<_> = objects.iter().collect();
    let set: WeakSet<_> = objects.iter().collect();
    let dictionary: WeakDictionary<_, _> = objects.iter().enumerate().collect();
    objects.truncate(4);

    assert_eq!(array.clean(), 6);
    assert_eq!(set.clean(), 6);
    assert_eq!(dictionary.clean(), 6);
    let first: Vec<usize> = array.iter().map(|item| item.id()).collect();

    assert_eq!(array.clean(), 0);
    assert_eq!(set.clean(), 0);
    assert_eq!(dictionary.clean(), 0);
    let second: Vec<usize> = array.iter().map(|item| item.id()).collect();
    assert_eq!(first, second);
    assert_eq!(set.len(), 4);
    assert_eq!(dictionary.len(), 4);
    let mut keys = dictionary.keys();
    keys.sort();
    assert_eq!(keys, vec![0, 1, 2, 3]);
}

#[leak_checked_test]
fn test_collections_never_extend_lifetimes() {
    let baseline = live_tracked();
    let object = Tracked::rc(0);
    let mut array = WeakArray::new();
    let mut set = WeakSet::new();
    let mut dictionary = WeakDictionary::new();
    array.add(&object);
    set.insert(&object);
    dictionary.insert("only", &object);
    assert_eq!(live_tracked(), baseline + 1);

    drop(object);
    // The tracked value is gone before any collection has been touched again
    assert_eq!(live_tracked(), baseline);
    assert!(array.is_empty());
    assert!(set.is_empty());
    assert!(dictionary.get("only").is_none());
}

#[leak_checked_test]
fn test_weak_set_scenario() {
    let mut objects: Vec<_> = (0..3).map(Tracked::rc).collect();
    let set: WeakSet<_> = objects.iter().collect();

    let reclaimed = objects.remove(0);
    drop(reclaimed);

    let contents = set.contents();
    assert_eq!(contents.len(), 2);
    assert!(!set.is_empty());
    for object in &objects {
        assert!(set.contains(object));
    }
}

#[leak_checked_test]
fn test_weak_array_scenario() {
    let object = Tracked::rc(0);
    let mut array = WeakArray::new();
    for _ in 0..3 {
        array.add(&object);
    }
    let contents = array.contents();
    assert_eq!(contents.len(), 3);
    assert!(contents.iter().all(|item| Rc::ptr_eq(item, &object)));
    drop(contents);

    array.remove_identical(&object);
    assert_eq!(array.contents().len(), 0);
}

#[leak_checked_test]
fn test_weak_dictionary_scenario() {
    let objects: HashMap<u32, Rc<Tracked>> = (0..3).map(|key| (key, Tracked::rc(key as usize))).collect();
    let mut dictionary = WeakDictionary::from(&objects);

    let extra = Tracked::rc(3);
    dictionary.set(3, Some(&extra));
    assert_eq!(dictionary.len(), 4);

    dictionary.set(3, None);
    assert_eq!(dictionary.len(), 3);
    assert!(dictionary.get(&3).is_none());
}

//! Integration tests for BucketedMap
//!
//! Integer keys use the identity hasher so bucket placement is `key % 16`.

use growmap::{
    BucketedMap, BuildIdentityHasher, ContainerError, Entry, FaultAction, IllegalOpPolicy, MapConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type IntMap = BucketedMap<i64, i64, BuildIdentityHasher>;

fn int_map() -> IntMap {
    BucketedMap::with_config_and_hasher(
        MapConfig::new(16, 1024).on_illegal(FaultAction::Panic),
        BuildIdentityHasher,
    )
    .expect("valid config")
}

#[test]
fn test_num_buckets() {
    assert_eq!(int_map().num_buckets(), 16);
}

#[test]
fn test_set_and_find() {
    let mut map = int_map();
    assert_eq!(map.set(5, 50), None);

    assert_eq!(map.find_ptr(&5), Some(&50));
    assert_eq!(map.find(&5), Some(50));
    assert_eq!(map.count(), 1);
}

#[test]
fn test_set_and_replacement_and_find() {
    let mut map = int_map();
    map.set(5, 50);
    assert_eq!(map.set(5, 20), Some(50));

    assert_eq!(map.find_ptr(&5), Some(&20));
    assert_eq!(map.find(&5), Some(20));
    assert_eq!(map.count(), 1);
}

#[test]
fn test_find_missing_element() {
    let map = int_map();
    assert_eq!(map.find_ptr(&5), None);
    assert_eq!(map.find(&5), None);
    assert_eq!(map.count(), 0);
}

#[test]
fn test_set_and_remove() {
    let mut map = int_map();
    map.set(5, 50);
    assert_eq!(map.remove(&5), Some(50));
    assert_eq!(map.find_ptr(&5), None);
    assert_eq!(map.count(), 0);
}

#[test]
fn test_remove_nothing() {
    let mut map = int_map();
    assert_eq!(map.remove(&5), None);
    assert_eq!(map.count(), 0);
}

#[test]
fn test_set_and_remove_nothing() {
    let mut map = int_map();
    map.set(5, 50);
    assert_eq!(map.remove(&10), None);
    assert_eq!(map.find_ptr(&5), Some(&50));
    assert_eq!(map.count(), 1);
}

#[test]
fn test_add_two_remove_one() {
    let mut map = int_map();
    map.set(5, 50);
    map.set(6, 50);
    map.remove(&5);
    assert_eq!(map.find_ptr(&5), None);
    assert_eq!(map.find_ptr(&6), Some(&50));
    assert_eq!(map.count(), 1);
}

#[test]
fn test_remove_from_loaded_buckets() {
    let mut map = int_map();
    for i in 0..10_000 {
        map.set(i, i + 10);
    }

    map.remove(&5000);

    for i in 0..10_000 {
        if i == 5000 {
            assert_eq!(map.find_ptr(&i), None);
        } else {
            assert_eq!(map.find_ptr(&i), Some(&(i + 10)));
        }
    }
    assert_eq!(map.count(), 9_999);
}

#[test]
fn test_change_key() {
    let mut map = int_map();
    map.set(5, 50);
    assert!(map.change_key(&5, 10));
    assert_eq!(map.find_ptr(&10), Some(&50));
    assert_eq!(map.find_ptr(&5), None);
    assert_eq!(map.count(), 1);
}

#[test]
fn test_change_missing_key() {
    let mut map = int_map();
    assert!(!map.change_key(&5, 10));
    assert_eq!(map.count(), 0);
}

#[test]
fn test_change_one_in_two() {
    let mut map = int_map();
    map.set(5, 50);
    map.set(10, 100);
    map.change_key(&5, 15);
    assert_eq!(map.find_ptr(&15), Some(&50));
    assert_eq!(map.find_ptr(&10), Some(&100));
    assert_eq!(map.count(), 2);
}

#[test]
fn test_change_replace() {
    let mut map = int_map();
    map.set(5, 50);
    map.set(10, 100);
    map.change_key(&5, 10);
    assert_eq!(map.find_ptr(&10), Some(&50));
    assert_eq!(map.count(), 1);
}

#[test]
fn test_change_in_loaded_buckets() {
    let mut map = int_map();
    for i in 0..10_000 {
        map.set(i, i + 10);
    }

    map.change_key(&5000, 0);

    for i in 0..10_000 {
        match i {
            0 => assert_eq!(map.find_ptr(&i), Some(&5010)),
            5000 => assert_eq!(map.find_ptr(&i), None),
            _ => assert_eq!(map.find_ptr(&i), Some(&(i + 10))),
        }
    }
    assert_eq!(map.count(), 9_999);
}

#[test]
fn test_init_many() {
    let mut b = int_map();
    let mut c = int_map();
    let mut d = int_map();

    for i in 0..100 {
        b.set(i, i);
    }
    for i in 0..1_000 {
        c.set(i, i + 1);
    }
    for i in 0..10_000 {
        d.set(i, i + 2);
    }

    for i in 0..100 {
        assert_eq!(b.find(&i).map(|v| v + 1), c.find(&i));
    }
    for i in 0..1_000 {
        assert_eq!(c.find(&i).map(|v| v + 1), d.find(&i));
    }
    for i in 0..10_000 {
        assert_eq!(d.find(&i), Some(i + 2));
    }

    assert_eq!(b.count(), 100);
    assert_eq!(c.count(), 1_000);
    assert_eq!(d.count(), 10_000);
}

#[test]
fn test_general_usage() {
    let mut map = int_map();
    map.set(5, 10);
    map.set(10, 10);
    map.set(5, 50);
    map.set(10, 5);

    assert_eq!(map.find_ptr(&5), Some(&50));
    assert_eq!(map.find_ptr(&10), Some(&5));
    assert_eq!(map.find_ptr(&13_210), None);
    assert_eq!(map.find_ptr(&132_111), None);

    assert_eq!(map.find(&5), Some(50));
    assert_eq!(map.find(&10), Some(5));
    assert_eq!(map.find(&24_123_123), None);
    assert_eq!(map.find(&231_312), None);

    map.remove(&5);
    assert_eq!(map.find_ptr(&5), None);
    assert_eq!(map.find_ptr(&10), Some(&5));

    map.remove(&5);
    assert_eq!(map.find_ptr(&5), None);
    assert_eq!(map.find_ptr(&10), Some(&5));

    map.remove(&10);
    assert_eq!(map.find_ptr(&10), None);
    assert!(map.is_empty());
}

#[test]
fn test_negative_keys_hash_consistently() {
    let mut map = int_map();
    for i in -50..50 {
        map.set(i, i * 3);
    }
    for i in -50..50 {
        assert_eq!(map.find(&i), Some(i * 3));
    }
    assert_eq!(map.count(), 100);
}

#[test]
fn test_bucket_contents_follow_identity_hash() {
    let mut map = int_map();
    for key in [3, 19, 35, 4] {
        map.set(key, key);
    }

    let bucket3: Vec<i64> = map.bucket(3).unwrap().iter().map(|e| e.key).collect();
    assert_eq!(bucket3, vec![3, 19, 35]);
    assert_eq!(map.bucket(4).unwrap(), &[Entry::new(4, 4)]);
    assert!(map.bucket(0).unwrap().is_empty());
}

#[test]
fn test_delete_matching_with_cleanup() {
    let mut map: BucketedMap<u32, Vec<u8>> = BucketedMap::new();
    for key in 0..64u32 {
        map.set(key, vec![key as u8; 4]);
    }

    let mut freed = 0;
    let removed = map.delete_matching_then(|entry| entry.key >= 32, |entry| freed += entry.value.len());
    assert_eq!(removed, 32);
    assert_eq!(freed, 128);
    assert_eq!(map.count(), 32);
    assert!(map.iter().all(|entry| entry.key < 32));
}

#[test]
fn test_string_keys_with_default_hasher() {
    let mut map: BucketedMap<String, usize> =
        BucketedMap::with_config(MapConfig::new(7, 2)).expect("valid config");
    let words = ["one", "two", "three", "four", "five", "six", "seven", "eight"];
    for (i, word) in words.iter().enumerate() {
        map.set(word.to_string(), i);
    }

    assert_eq!(map.num_buckets(), 7);
    assert_eq!(map.count(), words.len());
    for (i, word) in words.iter().enumerate() {
        assert_eq!(map.find_ptr(*word), Some(&i));
    }

    let mut seen: Vec<&str> = map.iter().map(|entry| entry.key.as_str()).collect();
    seen.sort_unstable();
    let mut expected = words.to_vec();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[test]
fn test_release_then_insert_invokes_policy_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let policy = IllegalOpPolicy::handler(move |err| {
        assert!(matches!(err, ContainerError::InvalidContainer { .. }));
        counter.fetch_add(1, Ordering::SeqCst);
        FaultAction::ReturnDefault
    });

    let mut map: IntMap =
        BucketedMap::with_config_hasher_and_policy(MapConfig::default(), BuildIdentityHasher, policy)
            .expect("valid config");
    map.set(1, 1);
    map.release();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    map.set(2, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(map.is_empty());

    map.init();
    map.set(2, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(map.find(&2), Some(2));
}

#[test]
fn test_invalid_configs_rejected() {
    let zero_buckets: growmap::Result<IntMap> =
        BucketedMap::with_config_and_hasher(MapConfig::new(0, 32), BuildIdentityHasher);
    assert!(matches!(zero_buckets, Err(ContainerError::Configuration { .. })));

    let zero_block: growmap::Result<IntMap> =
        BucketedMap::with_config_and_hasher(MapConfig::new(16, 0), BuildIdentityHasher);
    assert!(zero_block.is_err());
}

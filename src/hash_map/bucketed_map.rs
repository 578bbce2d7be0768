//! BucketedMap - fixed bucket count hash map with linear-scan buckets
//!
//! A key is hashed, reduced modulo the bucket count, and its entry lives in
//! that bucket for as long as it is in the map. Each bucket is a
//! [`GrowableBuffer`] of entries scanned front to back, so lookups cost
//! O(bucket length) and the map never rehashes. This suits maps that stay
//! small relative to the bucket count, where a simple layout is as fast as a
//! more elaborate table and far easier to inspect.
//!
//! # Examples
//!
//! ```rust
//! use growmap::BucketedMap;
//!
//! let mut map = BucketedMap::new();
//! map.set("apple", 3);
//! map.set("pear", 5);
//! map.set("apple", 4);
//!
//! assert_eq!(map.find(&"apple"), Some(4));
//! assert_eq!(map.count(), 2);
//!
//! map.change_key(&"pear", "plum");
//! assert_eq!(map.find_ptr(&"plum"), Some(&5));
//! assert!(!map.contains_key(&"pear"));
//! ```

use crate::config::{Config, MapConfig};
use crate::containers::GrowableBuffer;
use crate::error::Result;
use crate::policy::IllegalOpPolicy;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::mem;

/// A key-value pair stored in a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Entry<K, V> {
    /// The key; identifies the entry
    pub key: K,
    /// The associated value
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Create a new entry
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// Hash map with a fixed number of linearly scanned buckets
///
/// # Type Parameters
/// - `K`: Key type (must implement Hash + Eq)
/// - `V`: Value type
/// - `S`: Hash builder, `ahash::RandomState` unless given
///
/// The bucket count comes from [`MapConfig`] and never changes. Every bucket
/// shares the map's [`IllegalOpPolicy`]; in normal use the map never performs
/// an illegal bucket operation, but inserting into a released map does.
#[derive(Clone)]
pub struct BucketedMap<K, V, S = ahash::RandomState> {
    buckets: Box<[GrowableBuffer<Entry<K, V>>]>,
    hash_builder: S,
    config: MapConfig,
}

impl<K, V> BucketedMap<K, V, ahash::RandomState> {
    /// Creates a map with the default configuration and hasher
    pub fn new() -> Self {
        Self::with_hasher(ahash::RandomState::new())
    }

    /// Creates a map from a validated configuration with the default hasher
    pub fn with_config(config: MapConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, ahash::RandomState::new())
    }
}

impl<K, V, S> BucketedMap<K, V, S>
where
    S: BuildHasher,
{
    /// Creates a map with the default configuration and a custom hasher
    pub fn with_hasher(hash_builder: S) -> Self {
        let config = MapConfig::default();
        let policy = config.on_illegal.into();
        let mut map = Self::unallocated(config, hash_builder, policy);
        map.init();
        map
    }

    /// Creates a map from a validated configuration and a custom hasher
    pub fn with_config_and_hasher(config: MapConfig, hash_builder: S) -> Result<Self> {
        let policy = config.on_illegal.into();
        Self::with_config_hasher_and_policy(config, hash_builder, policy)
    }

    /// Creates a map with an injected illegal-operation policy
    ///
    /// `config.on_illegal` is ignored in favour of `policy`.
    pub fn with_config_hasher_and_policy(
        config: MapConfig,
        hash_builder: S,
        policy: IllegalOpPolicy,
    ) -> Result<Self> {
        config.validate()?;
        let mut map = Self::unallocated(config, hash_builder, policy);
        map.try_init()?;
        Ok(map)
    }

    fn unallocated(config: MapConfig, hash_builder: S, policy: IllegalOpPolicy) -> Self {
        let bucket_config = config.bucket_config();
        let buckets = (0..config.bucket_count)
            .map(|_| GrowableBuffer::uninit_with_policy(bucket_config.clone(), policy.clone()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            buckets,
            hash_builder,
            config,
        }
    }

    /// Initialize every bucket, discarding any entries
    #[track_caller]
    pub fn init(&mut self) {
        log::debug!(
            "initializing bucketed map with {} buckets of {} slots",
            self.buckets.len(),
            self.config.bucket_block_size
        );
        for bucket in self.buckets.iter_mut() {
            bucket.init();
        }
    }

    /// Fallible form of [`init`](Self::init)
    pub fn try_init(&mut self) -> Result<()> {
        log::debug!(
            "initializing bucketed map with {} buckets of {} slots",
            self.buckets.len(),
            self.config.bucket_block_size
        );
        for bucket in self.buckets.iter_mut() {
            bucket.try_init()?;
        }
        Ok(())
    }

    /// Release every bucket
    ///
    /// Lookups on a released map find nothing; inserting raises
    /// `InvalidContainer` through the policy until [`init`](Self::init) runs.
    pub fn release(&mut self) {
        log::debug!("releasing bucketed map holding {} entries", self.count());
        for bucket in self.buckets.iter_mut() {
            bucket.release();
        }
    }

    /// Index of the bucket `key` belongs to: `hash(key) % num_buckets()`
    #[inline]
    pub fn bucket_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        (self.hash_builder.hash_one(key) % self.buckets.len() as u64) as usize
    }

    /// Reference to the value for `key`
    ///
    /// The returned borrow keeps the map immutably borrowed, so no insert,
    /// update or removal can move the entry while it is alive.
    pub fn find_ptr<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = &self.buckets[self.bucket_index(key)];
        bucket
            .iter()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| &entry.value)
    }

    /// Mutable reference to the value for `key`, for in-place updates
    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        self.buckets[index]
            .iter_mut()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| &mut entry.value)
    }

    /// Copy of the value for `key`
    pub fn find<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        self.find_ptr(key).cloned()
    }

    /// Whether `key` is present
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.find_ptr(key).is_some()
    }

    /// Removes the entry for `key`, keeping the order of its bucket
    ///
    /// Returns the removed value; an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_index(key);
        let bucket = &mut self.buckets[index];
        let position = bucket.iter().position(|entry| entry.key.borrow() == key)?;
        bucket.try_remove_at(position).ok().map(|entry| entry.value)
    }

    /// Removes every entry for which `matches` returns true
    ///
    /// Returns the number of removed entries.
    pub fn delete_matching<P>(&mut self, matches: P) -> usize
    where
        P: FnMut(&Entry<K, V>) -> bool,
    {
        self.delete_matching_then(matches, drop)
    }

    /// Removes every entry for which `matches` returns true, then hands each
    /// removed entry to `post`
    ///
    /// `post` runs once per removed entry, after that entry has left the map,
    /// so it may release resources the entry owns.
    pub fn delete_matching_then<P, F>(&mut self, mut matches: P, mut post: F) -> usize
    where
        P: FnMut(&Entry<K, V>) -> bool,
        F: FnMut(Entry<K, V>),
    {
        self.buckets
            .iter_mut()
            .map(|bucket| bucket.delete_matching_then(&mut matches, &mut post))
            .sum()
    }

    /// Total number of entries, summed over all buckets
    pub fn count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.size()).sum()
    }

    /// Returns true if the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|bucket| bucket.is_empty())
    }

    /// Number of buckets, fixed at construction
    #[inline]
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Entries of one bucket, in insertion order
    pub fn bucket(&self, index: usize) -> Option<&[Entry<K, V>]> {
        self.buckets.get(index).map(|bucket| bucket.as_slice())
    }

    /// Iterates all entries bucket by bucket
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        self.buckets.iter().flat_map(|bucket| bucket.iter())
    }

    /// Configuration the map was built with
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Returns a reference to the map's hash builder
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }
}

impl<K, V, S> BucketedMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts or replaces the value for `key`
    ///
    /// An existing entry is updated in place and keeps its bucket position;
    /// the previous value is returned. A new key is appended to its bucket.
    #[track_caller]
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.find_mut(&key) {
            return Some(mem::replace(slot, value));
        }
        let index = self.bucket_index(&key);
        self.buckets[index].push(Entry { key, value });
        None
    }

    /// Moves the value stored under `old_key` to `new_key`
    ///
    /// If `new_key` already holds a value it is overwritten, so the map
    /// shrinks by one entry. Returns false, changing nothing, when `old_key`
    /// is absent.
    #[track_caller]
    pub fn change_key<Q>(&mut self, old_key: &Q, new_key: K) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.remove(old_key) {
            Some(value) => {
                self.set(new_key, value);
                true
            }
            None => false,
        }
    }
}

impl<K, V, S> Default for BucketedMap<K, V, S>
where
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> fmt::Debug for BucketedMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.buckets
                    .iter()
                    .flat_map(|bucket| bucket.iter())
                    .map(|entry| (&entry.key, &entry.value)),
            )
            .finish()
    }
}

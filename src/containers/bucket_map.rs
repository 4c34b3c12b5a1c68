//! BucketMap: separate-chaining hash map
//!
//! Keys are distributed over a fixed array of buckets by
//! `hash(key) mod bucket_count`; colliding entries share a bucket and keep
//! their insertion order inside it. Every live key sits in exactly one bucket,
//! the one its hash selects, and no bucket holds two equal keys.
//!
//! Before an insert would push the load factor (`len / bucket_count`) past
//! the configured maximum (0.75 by default), the bucket array is rebuilt with
//! `growth_factor` times as many buckets and every entry is redistributed.
//! Rehashing allocates the complete new bucket array before moving anything,
//! so a failed rehash leaves the map exactly as it was.
//!
//! The default hasher is [`ahash::AHasher`] with fixed keys, which makes
//! bucket placement reproducible for a given bucket count.
//!
//! # Examples
//!
//! ```rust
//! use rawcoll::BucketMap;
//!
//! let mut map = BucketMap::with_buckets(4).unwrap();
//! for i in 0..10 {
//!     *map.get_or_insert_default(i).unwrap() = format!("value{}", i);
//! }
//! assert_eq!(map.len(), 10);
//! assert!(map.bucket_count() > 4);
//!
//! map.insert_or_assign(3, "three".to_string()).unwrap();
//! assert_eq!(map.get(&3).map(String::as_str), Some("three"));
//!
//! map.erase(&3).unwrap();
//! assert!(!map.contains(&3));
//! assert!(map.erase(&3).is_err());
//! ```

use crate::config::{BucketMapConfig, Config};
use crate::containers::DynArray;
use crate::error::{CollectionError, Result};
use ahash::AHasher;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::mem;

/// Hasher builder used when none is supplied
pub type DefaultHashBuilder = BuildHasherDefault<AHasher>;

#[derive(Clone)]
struct Entry<K, V> {
    key: K,
    value: V,
}

type Bucket<K, V> = DynArray<Entry<K, V>>;

/// Hash map resolving collisions by chaining within buckets
#[derive(Clone)]
pub struct BucketMap<K, V, S = DefaultHashBuilder> {
    buckets: DynArray<Bucket<K, V>>,
    len: usize,
    max_load_factor: f64,
    growth_factor: usize,
    hash_builder: S,
}

impl<K, V> BucketMap<K, V, DefaultHashBuilder> {
    /// Create an empty map with 16 buckets
    ///
    /// # Panics
    ///
    /// Panics if the initial bucket array cannot be allocated.
    pub fn new() -> Self {
        match Self::with_config(BucketMapConfig::default()) {
            Ok(map) => map,
            Err(err) => panic!("BucketMap allocation failed: {}", err),
        }
    }

    /// Create an empty map with `bucket_count` buckets
    pub fn with_buckets(bucket_count: usize) -> Result<Self> {
        Self::with_buckets_and_hasher(bucket_count, DefaultHashBuilder::default())
    }

    /// Create an empty map following `config`
    pub fn with_config(config: BucketMapConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> BucketMap<K, V, S> {
    /// Create an empty map with 16 buckets and a custom hasher builder
    pub fn with_hasher(hash_builder: S) -> Result<Self> {
        Self::with_config_and_hasher(BucketMapConfig::default(), hash_builder)
    }

    /// Create an empty map with `bucket_count` buckets and a custom hasher builder
    pub fn with_buckets_and_hasher(bucket_count: usize, hash_builder: S) -> Result<Self> {
        if bucket_count == 0 {
            return Err(CollectionError::invalid_argument(
                "bucket count must be greater than 0",
            ));
        }
        Self::with_config_and_hasher(BucketMapConfig::with_buckets(bucket_count), hash_builder)
    }

    /// Create an empty map following `config` with a custom hasher builder
    pub fn with_config_and_hasher(config: BucketMapConfig, hash_builder: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buckets: empty_buckets(config.initial_buckets)?,
            len: 0,
            max_load_factor: config.max_load_factor,
            growth_factor: config.growth_factor,
            hash_builder,
        })
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the map holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets in the current bucket array
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Current ratio of entries to buckets
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Load factor threshold that triggers a rehash
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// The hasher builder in use
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Remove every entry, keeping the bucket count
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Iterate over entries in bucket order, then insertion order per bucket
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter())
            .map(|entry| (&entry.key, &entry.value))
    }

    /// Iterate over entries with mutable access to the values
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        self.buckets
            .iter_mut()
            .flat_map(|bucket| bucket.iter_mut())
            .map(|entry| (&entry.key, &mut entry.value))
    }

    /// Iterate over values in the same order as [`iter`](Self::iter)
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    /// Collect every key into a new array
    ///
    /// Keys appear in bucket order, then insertion order within a bucket;
    /// callers should treat the order as unspecified.
    pub fn keys(&self) -> Result<DynArray<K>>
    where
        K: Clone,
    {
        let mut keys = DynArray::with_capacity(self.len)?;
        for (key, _) in self.iter() {
            keys.push_back(key.clone())?;
        }
        Ok(keys)
    }
}

impl<K, V, S> BucketMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Check whether `key` is present
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Reference to the value stored for `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_of(key);
        self.buckets[index]
            .iter()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| &entry.value)
    }

    /// Mutable reference to the value stored for `key`
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_of(key);
        self.buckets[index]
            .iter_mut()
            .find(|entry| entry.key.borrow() == key)
            .map(|entry| &mut entry.value)
    }

    /// Mutable reference to the value for `key`, inserting `V::default()` first
    /// when the key is absent
    ///
    /// A lookup through this method can therefore grow the map and trigger
    /// a rehash.
    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut V>
    where
        V: Default,
    {
        let mut index = self.bucket_of(&key);
        if let Some(pos) = self.position_in(index, &key) {
            return Ok(&mut self.buckets[index][pos].value);
        }

        if self.would_overload() {
            self.grow()?;
            index = self.bucket_of(&key);
        }

        self.buckets[index].push_back(Entry {
            key,
            value: V::default(),
        })?;
        self.len += 1;
        Ok(&mut self.buckets[index].back_mut()?.value)
    }

    /// Store `value` under `key`, returning the previous value if any
    ///
    /// The load factor is checked before the lookup: if one more entry would
    /// exceed the threshold, the map rehashes first.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Result<Option<V>> {
        if self.would_overload() {
            self.grow()?;
        }

        let index = self.bucket_of(&key);
        if let Some(pos) = self.position_in(index, &key) {
            let slot = &mut self.buckets[index][pos].value;
            return Ok(Some(mem::replace(slot, value)));
        }

        self.buckets[index].push_back(Entry { key, value })?;
        self.len += 1;
        Ok(None)
    }

    /// Remove `key`, returning its value when it was present
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.bucket_of(key);
        let pos = self.buckets[index]
            .iter()
            .position(|entry| entry.key.borrow() == key)?;
        let entry = self.buckets[index].erase(pos).ok()?;
        self.len -= 1;
        Some(entry.value)
    }

    /// Remove `key`, failing with a key-not-found error when it is absent
    pub fn erase<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        self.remove(key)
            .ok_or_else(|| CollectionError::key_not_found(key))
    }

    /// Rebuild the bucket array with `bucket_count` buckets
    ///
    /// Every bucket of the new array is allocated before any entry moves, so
    /// on error the map is unchanged.
    pub fn rehash(&mut self, bucket_count: usize) -> Result<()> {
        if bucket_count == 0 {
            return Err(CollectionError::invalid_argument(
                "bucket count must be greater than 0",
            ));
        }

        let mut sizes = DynArray::with_size(bucket_count, 0usize)?;
        for (key, _) in self.iter() {
            sizes[slot_for(&self.hash_builder, key, bucket_count)] += 1;
        }

        let mut fresh = DynArray::with_capacity(bucket_count)?;
        for &size in sizes.iter() {
            fresh.push_back(DynArray::with_capacity(size)?)?;
        }

        log::debug!(
            "BucketMap rehash: {} -> {} buckets ({} entries)",
            self.buckets.len(),
            bucket_count,
            self.len
        );

        // nothing below can fail: every bucket already holds its exact count
        let old = mem::replace(&mut self.buckets, fresh);
        for bucket in old {
            for entry in bucket {
                let index = slot_for(&self.hash_builder, &entry.key, bucket_count);
                unsafe { self.buckets[index].push_unchecked(entry) };
            }
        }
        Ok(())
    }

    fn would_overload(&self) -> bool {
        (self.len + 1) as f64 / self.buckets.len() as f64 > self.max_load_factor
    }

    fn grow(&mut self) -> Result<()> {
        let target = self
            .buckets
            .len()
            .checked_mul(self.growth_factor)
            .ok_or_else(|| CollectionError::out_of_memory(usize::MAX))?;
        self.rehash(target)
    }

    fn bucket_of<Q: Hash + ?Sized>(&self, key: &Q) -> usize {
        slot_for(&self.hash_builder, key, self.buckets.len())
    }

    fn position_in(&self, index: usize, key: &K) -> Option<usize> {
        self.buckets[index].iter().position(|entry| entry.key == *key)
    }
}

fn slot_for<S: BuildHasher, Q: Hash + ?Sized>(hash_builder: &S, key: &Q, bucket_count: usize) -> usize {
    (hash_builder.hash_one(key) % bucket_count as u64) as usize
}

fn empty_buckets<K, V>(count: usize) -> Result<DynArray<Bucket<K, V>>> {
    let mut buckets = DynArray::with_capacity(count)?;
    for _ in 0..count {
        buckets.push_back(DynArray::new())?;
    }
    Ok(buckets)
}

impl<K, V> Default for BucketMap<K, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S> fmt::Debug for BucketMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S> Extend<(K, V)> for BucketMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            if let Err(err) = self.insert_or_assign(key, value) {
                panic!("BucketMap extend failed: {}", err);
            }
        }
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for BucketMap<K, V, DefaultHashBuilder> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

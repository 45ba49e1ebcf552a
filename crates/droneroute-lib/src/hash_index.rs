//! Chained hash table used to index clients, orders and visit counters.
//!
//! Keys are compared by their canonical identity ([`IndexKey`]), so a
//! composite value such as a [`Client`](crate::domain::Client) and its plain
//! identifier string address the same entry.

use std::borrow::Cow;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::graph::VertexId;

/// Canonical identity used for hashing and key equality.
pub trait IndexKey {
    fn index_key(&self) -> Cow<'_, str>;
}

impl IndexKey for str {
    fn index_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl IndexKey for String {
    fn index_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl IndexKey for VertexId {
    fn index_key(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

impl<T: IndexKey + ?Sized> IndexKey for &T {
    fn index_key(&self) -> Cow<'_, str> {
        (**self).index_key()
    }
}

macro_rules! integer_index_key {
    ($($ty:ty),*) => {
        $(
            impl IndexKey for $ty {
                fn index_key(&self) -> Cow<'_, str> {
                    Cow::Owned(self.to_string())
                }
            }
        )*
    };
}

integer_index_key!(u32, u64, usize, i32, i64);

/// Sizing policy for [`HashIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct HashIndexConfig {
    /// Bucket count of a fresh table. A prime spreads the positional hash best.
    pub initial_buckets: usize,
    /// The table grows before an insert would bring `len / buckets` to this value.
    pub max_load_factor: f64,
}

impl Default for HashIndexConfig {
    fn default() -> Self {
        Self {
            initial_buckets: 17,
            max_load_factor: 0.75,
        }
    }
}

impl HashIndexConfig {
    /// Validate the sizing policy.
    pub fn validate(&self) -> Result<()> {
        if self.initial_buckets == 0 {
            return Err(Error::config("initial_buckets must be at least 1"));
        }
        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            return Err(Error::config(format!(
                "max_load_factor must be a positive number, got {}",
                self.max_load_factor
            )));
        }
        Ok(())
    }
}

/// Position-weighted character code hash: `Σ code(cᵢ)·(i + 1) mod buckets`.
pub fn positional_hash(key: &str, buckets: usize) -> usize {
    let sum = key.chars().enumerate().fold(0u64, |acc, (index, ch)| {
        acc.wrapping_add(u64::from(ch).wrapping_mul(index as u64 + 1))
    });
    (sum % buckets.max(1) as u64) as usize
}

/// Key to value table with separate chaining and `2n + 1` growth.
#[derive(Debug, Clone)]
pub struct HashIndex<K, V> {
    buckets: Vec<Vec<(K, V)>>,
    len: usize,
    config: HashIndexConfig,
}

impl<K: IndexKey, V> Default for HashIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: IndexKey, V> HashIndex<K, V> {
    /// Create an empty table with the default sizing policy.
    pub fn new() -> Self {
        Self::empty(HashIndexConfig::default())
    }

    /// Create an empty table with a custom sizing policy.
    pub fn with_config(config: HashIndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::empty(config))
    }

    fn empty(config: HashIndexConfig) -> Self {
        Self {
            buckets: (0..config.initial_buckets).map(|_| Vec::new()).collect(),
            len: 0,
            config,
        }
    }

    pub fn config(&self) -> HashIndexConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    /// Insert or update `key`, returning the value it replaced.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let index = self.bucket_of(&key);
        if let Some(slot) = self.find_slot(index, &key) {
            let (_, previous) = std::mem::replace(&mut self.buckets[index][slot], (key, value));
            return Some(previous);
        }

        self.reserve_one();
        let index = self.bucket_of(&key);
        self.buckets[index].push((key, value));
        self.len += 1;
        None
    }

    pub fn get<Q: IndexKey + ?Sized>(&self, key: &Q) -> Option<&V> {
        let index = self.bucket_of(key);
        let slot = self.find_slot(index, key)?;
        Some(&self.buckets[index][slot].1)
    }

    pub fn get_mut<Q: IndexKey + ?Sized>(&mut self, key: &Q) -> Option<&mut V> {
        let index = self.bucket_of(key);
        let slot = self.find_slot(index, key)?;
        Some(&mut self.buckets[index][slot].1)
    }

    pub fn contains_key<Q: IndexKey + ?Sized>(&self, key: &Q) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`; returns whether an entry was present.
    pub fn remove<Q: IndexKey + ?Sized>(&mut self, key: &Q) -> bool {
        let index = self.bucket_of(key);
        match self.find_slot(index, key) {
            Some(slot) => {
                self.buckets[index].swap_remove(slot);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.buckets = (0..self.config.initial_buckets)
            .map(|_| Vec::new())
            .collect();
        self.len = 0;
    }

    /// Entries in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(key, value)| (key, value)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Verify chain placement, identity uniqueness, entry count and load factor.
    pub fn check_invariants(&self) -> Result<()> {
        let mut count = 0usize;
        for (index, bucket) in self.buckets.iter().enumerate() {
            for (position, (key, _)) in bucket.iter().enumerate() {
                let identity = key.index_key();
                if positional_hash(&identity, self.buckets.len()) != index {
                    return Err(Error::invariant(format!(
                        "key {identity:?} stored in bucket {index} but hashes elsewhere"
                    )));
                }
                if bucket[..position]
                    .iter()
                    .any(|(other, _)| other.index_key() == identity)
                {
                    return Err(Error::invariant(format!(
                        "key {identity:?} appears twice in bucket {index}"
                    )));
                }
                count += 1;
            }
        }

        if count != self.len {
            return Err(Error::invariant(format!(
                "table holds {count} entries but reports {}",
                self.len
            )));
        }
        if self.len > 0 && self.load_factor() >= self.config.max_load_factor {
            return Err(Error::invariant(format!(
                "load factor {:.3} reached threshold {}",
                self.load_factor(),
                self.config.max_load_factor
            )));
        }
        Ok(())
    }

    fn bucket_of<Q: IndexKey + ?Sized>(&self, key: &Q) -> usize {
        positional_hash(&key.index_key(), self.buckets.len())
    }

    fn find_slot<Q: IndexKey + ?Sized>(&self, index: usize, key: &Q) -> Option<usize> {
        let identity = key.index_key();
        self.buckets[index]
            .iter()
            .position(|(existing, _)| existing.index_key() == identity)
    }

    /// Grow until one more entry keeps the load factor under the threshold.
    fn reserve_one(&mut self) {
        while (self.len + 1) as f64 / self.buckets.len() as f64 >= self.config.max_load_factor {
            self.resize(self.buckets.len() * 2 + 1);
        }
    }

    fn resize(&mut self, bucket_count: usize) {
        tracing::debug!(
            from = self.buckets.len(),
            to = bucket_count,
            entries = self.len,
            "resizing hash index"
        );
        let old = std::mem::replace(
            &mut self.buckets,
            (0..bucket_count).map(|_| Vec::new()).collect(),
        );
        for (key, value) in old.into_iter().flatten() {
            let index = positional_hash(&key.index_key(), bucket_count);
            self.buckets[index].push((key, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_hash_weights_position() {
        // "ab" = 97*1 + 98*2 = 293, "ba" = 98*1 + 97*2 = 292
        assert_eq!(positional_hash("ab", 1000), 293);
        assert_eq!(positional_hash("ba", 1000), 292);
        assert_eq!(positional_hash("", 17), 0);
    }

    #[test]
    fn put_replaces_existing_value() {
        let mut index: HashIndex<String, u32> = HashIndex::new();
        assert_eq!(index.put("N1".to_string(), 1), None);
        assert_eq!(index.put("N1".to_string(), 2), Some(1));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("N1"), Some(&2));
    }

    #[test]
    fn grows_before_reaching_threshold() {
        let mut index: HashIndex<u32, u32> = HashIndex::new();
        for i in 0..12 {
            index.put(i, i);
        }
        assert_eq!(index.bucket_count(), 17);
        index.put(12, 12);
        assert_eq!(index.bucket_count(), 35);
        index.check_invariants().unwrap();
    }

    #[test]
    fn remove_reports_presence() {
        let mut index: HashIndex<String, ()> = HashIndex::new();
        index.put("a".to_string(), ());
        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert!(index.is_empty());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = HashIndexConfig {
            initial_buckets: 0,
            ..HashIndexConfig::default()
        };
        assert!(HashIndex::<String, u32>::with_config(config).is_err());
        let config = HashIndexConfig {
            max_load_factor: f64::NAN,
            ..HashIndexConfig::default()
        };
        assert!(HashIndex::<String, u32>::with_config(config).is_err());
    }

    #[test]
    fn clear_restores_initial_size() {
        let mut index: HashIndex<u64, u64> = HashIndex::new();
        for i in 0..100 {
            index.put(i, i * 2);
        }
        assert!(index.bucket_count() > 17);
        index.clear();
        assert_eq!(index.bucket_count(), 17);
        assert!(index.is_empty());
    }
}

//! Parallel read-only traversal through `rayon`.
//!
//! The table's [`Splitter`] drives rayon's unindexed bridge: each split hands
//! the lower half of the remaining slot range to another worker.

use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;
use rayon::iter::plumbing::Folder;
use rayon::iter::plumbing::UnindexedConsumer;
use rayon::iter::plumbing::UnindexedProducer;
use rayon::iter::plumbing::bridge_unindexed;

use crate::hash_map::HashMap;
use crate::hash_set::HashSet;
use crate::hash_table::HashTable;
use crate::hash_table::Splitter;
use crate::strategy::KeyHasher;
use crate::strategy::PrimitiveKey;

/// Parallel iterator over the entries of a table or map.
pub struct ParIter<'a, K, V, S> {
    table: &'a HashTable<K, V, S>,
}

/// Parallel iterator over the keys of a set.
pub struct ParKeys<'a, K, S> {
    inner: ParIter<'a, K, (), S>,
}

struct SplitProducer<'a, K, V, S>(Splitter<'a, K, V, S>);

impl<'a, K, V, S> UnindexedProducer for SplitProducer<'a, K, V, S>
where
    K: PrimitiveKey + Send + Sync,
    V: Default + Sync,
    S: KeyHasher<K> + Sync,
{
    type Item = (K, &'a V);

    fn split(mut self) -> (Self, Option<Self>) {
        match self.0.try_split() {
            Some(prefix) => (SplitProducer(prefix), Some(self)),
            None => (self, None),
        }
    }

    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        folder.consume_iter(self.0)
    }
}

impl<'a, K, V, S> ParallelIterator for ParIter<'a, K, V, S>
where
    K: PrimitiveKey + Send + Sync,
    V: Default + Sync,
    S: KeyHasher<K> + Sync,
{
    type Item = (K, &'a V);

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        bridge_unindexed(SplitProducer(self.table.splitter()), consumer)
    }
}

impl<K, S> ParallelIterator for ParKeys<'_, K, S>
where
    K: PrimitiveKey + Send + Sync,
    S: KeyHasher<K> + Sync,
{
    type Item = K;

    fn drive_unindexed<C>(self, consumer: C) -> C::Result
    where
        C: UnindexedConsumer<Self::Item>,
    {
        self.inner.map(|(k, _)| k).drive_unindexed(consumer)
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: PrimitiveKey + Send + Sync,
    V: Default + Sync,
    S: KeyHasher<K> + Sync,
{
    /// Returns a parallel iterator over the entries.
    pub fn par_iter(&self) -> ParIter<'_, K, V, S> {
        ParIter { table: self }
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: PrimitiveKey + Send + Sync,
    V: Default + Sync,
    S: KeyHasher<K> + Sync,
{
    /// Returns a parallel iterator over the entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::HashMap;
    /// use rayon::prelude::*;
    ///
    /// let map: HashMap<u64, u64> = (0..10_000).map(|i| (i, i * 2)).collect();
    /// let sum: u64 = map.par_iter().map(|(_, v)| *v).sum();
    /// assert_eq!(sum, 2 * (0..10_000).sum::<u64>());
    /// ```
    pub fn par_iter(&self) -> ParIter<'_, K, V, S> {
        self.table().par_iter()
    }
}

impl<K, S> HashSet<K, S>
where
    K: PrimitiveKey + Send + Sync,
    S: KeyHasher<K> + Sync,
{
    /// Returns a parallel iterator over the keys.
    pub fn par_iter(&self) -> ParKeys<'_, K, S> {
        ParKeys {
            inner: self.table().par_iter(),
        }
    }
}

impl<'a, K, V, S> IntoParallelIterator for &'a HashMap<K, V, S>
where
    K: PrimitiveKey + Send + Sync,
    V: Default + Sync,
    S: KeyHasher<K> + Sync,
{
    type Item = (K, &'a V);
    type Iter = ParIter<'a, K, V, S>;

    fn into_par_iter(self) -> Self::Iter {
        self.par_iter()
    }
}

impl<'a, K, S> IntoParallelIterator for &'a HashSet<K, S>
where
    K: PrimitiveKey + Send + Sync,
    S: KeyHasher<K> + Sync,
{
    type Item = K;
    type Iter = ParKeys<'a, K, S>;

    fn into_par_iter(self) -> Self::Iter {
        self.par_iter()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rayon::prelude::*;

    use super::*;

    #[test]
    fn parallel_sum_matches_sequential() {
        let map: HashMap<i64, i64> = (-5_000..5_000).map(|i| (i, i * 3)).collect();
        let parallel: i64 = map.par_iter().map(|(k, v)| k + v).sum();
        let sequential: i64 = map.iter().map(|(k, v)| k + v).sum();
        assert_eq!(parallel, sequential);
        assert_eq!(map.par_iter().count(), 10_000);
    }

    #[test]
    fn parallel_keys_visit_each_once() {
        let set: HashSet<u32> = (0..20_000).collect();
        let mut keys: Vec<u32> = (&set).into_par_iter().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..20_000).collect::<Vec<_>>());
    }

    #[test]
    fn zero_key_is_yielded_once() {
        let mut map: HashMap<u8, u8> = HashMap::new();
        map.insert(0, 1);
        map.insert(200, 2);
        let zeros = map.par_iter().filter(|(k, _)| *k == 0).count();
        assert_eq!(zeros, 1);
        assert_eq!(map.par_iter().count(), 2);
    }
}

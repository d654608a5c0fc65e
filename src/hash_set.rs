use core::fmt::Debug;
use core::iter::Chain;
use core::iter::FusedIterator;

use crate::error::Result;
use crate::hash_table;
use crate::hash_table::DEFAULT_INITIAL_SIZE;
use crate::hash_table::HashTable;
use crate::strategy::KeyHasher;
use crate::strategy::Natural;
use crate::strategy::PrimitiveKey;

/// A hash set of primitive keys, backed by an open-addressing
/// [`HashTable`] with `()` values.
///
/// `HashSet<K, S>` takes keys by value and decides membership with the
/// strategy `S` (by default [`Natural`]).
///
/// # Performance Characteristics
///
/// - **Memory**: `(n + 1) * size_of::<K>()` bytes for a table of `n` slots.
#[derive(Clone)]
pub struct HashSet<K, S = Natural> {
    table: HashTable<K, (), S>,
}

impl<K, S, S2> PartialEq<HashSet<K, S2>> for HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
    S2: KeyHasher<K>,
{
    fn eq(&self, other: &HashSet<K, S2>) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|k| other.contains(k))
    }
}

impl<K, S> Eq for HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
}

impl<K, S> Debug for HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K, S> HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    /// Creates an empty set using `strategy` for hashing and equality.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// # use prim_hash::strategy::KeyHasher;
    /// #
    /// # #[derive(Clone, Copy)]
    /// # struct CaseInsensitive;
    /// # impl KeyHasher<char> for CaseInsensitive {
    /// #     fn hash(&self, key: char) -> u64 {
    /// #         key.to_ascii_lowercase() as u64
    /// #     }
    /// #     fn equals(&self, a: char, b: char) -> bool {
    /// #         a.eq_ignore_ascii_case(&b)
    /// #     }
    /// # }
    /// #
    /// let mut set = HashSet::with_strategy(CaseInsensitive);
    /// assert!(set.insert('a'));
    /// assert!(!set.insert('A'));
    /// assert!(set.contains('A'));
    /// ```
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            table: HashTable::with_strategy(strategy),
        }
    }

    /// Creates an empty set sized for `expected` keys, using `strategy`.
    pub fn with_capacity_and_strategy(expected: usize, strategy: S) -> Self {
        Self {
            table: HashTable::with_capacity_and_strategy(expected, strategy),
        }
    }

    /// Creates an empty set sized for `expected` keys at `load_factor`,
    /// using `strategy`.
    ///
    /// # Errors
    ///
    /// See [`HashTable::with_capacity_and_load_factor_and_strategy`].
    pub fn with_capacity_and_load_factor_and_strategy(
        expected: usize,
        load_factor: f32,
        strategy: S,
    ) -> Result<Self> {
        HashTable::with_capacity_and_load_factor_and_strategy(expected, load_factor, strategy)
            .map(|table| Self { table })
    }

    /// Returns the number of keys in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// #
    /// let mut set: HashSet<u32> = HashSet::new();
    /// assert_eq!(set.len(), 0);
    /// set.insert(1);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns how many keys the set holds before it has to grow.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the load factor the set was constructed with.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the hashing strategy.
    pub fn strategy(&self) -> &S {
        self.table.strategy()
    }

    /// Returns the underlying table.
    pub fn table(&self) -> &HashTable<K, (), S> {
        &self.table
    }

    /// Clears the set, keeping its allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Shrinks the set to fit its keys. Returns `false` only if the
    /// allocation failed, leaving the set unchanged.
    pub fn trim(&mut self) -> bool {
        self.table.trim()
    }

    /// Shrinks the set to fit `n` keys if possible.
    pub fn trim_to(&mut self, n: usize) -> bool {
        self.table.trim_to(n)
    }

    /// Grows the set so that it holds `capacity` keys without resizing.
    ///
    /// # Errors
    ///
    /// See [`HashTable::ensure_capacity`].
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        self.table.ensure_capacity(capacity)
    }

    /// Reserves room for `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Reserves room for `additional` more keys, reporting failure.
    ///
    /// # Errors
    ///
    /// See [`HashTable::try_reserve`].
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.table.try_reserve(additional)
    }

    /// Adds `key` to the set. Returns whether it was newly inserted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// #
    /// let mut set: HashSet<i64> = HashSet::new();
    /// assert!(set.insert(2));
    /// assert!(!set.insert(2));
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        self.table.insert(key, ()).is_none()
    }

    /// Like [`insert`](Self::insert), but reports allocation failure.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceExhausted`](crate::Error::ResourceExhausted) if the
    /// set had to grow and could not.
    pub fn try_insert(&mut self, key: K) -> Result<bool> {
        Ok(self.table.try_insert(key, ())?.is_none())
    }

    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: K) -> bool {
        self.table.contains_key(key)
    }

    /// Returns the stored key equivalent to `key`.
    ///
    /// Only differs from `key` under a custom strategy.
    pub fn get(&self, key: K) -> Option<K> {
        self.table.get_key_value(key).map(|(k, _)| k)
    }

    /// Removes `key`. Returns whether it was present.
    pub fn remove(&mut self, key: K) -> bool {
        self.table.remove(key).is_some()
    }

    /// Removes and returns the stored key equivalent to `key`.
    pub fn take(&mut self, key: K) -> Option<K> {
        self.table.remove_entry(key).map(|(k, _)| k)
    }

    /// Returns an iterator over the keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// #
    /// let set: HashSet<u8> = [3, 1, 2].into_iter().collect();
    /// let mut keys: Vec<_> = set.iter().collect();
    /// keys.sort();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, S> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns a cursor that can remove keys while traversing.
    pub fn cursor(&mut self) -> Cursor<'_, K, S> {
        Cursor {
            inner: self.table.cursor(),
        }
    }

    /// Returns a splittable traversal over the keys.
    pub fn splitter(&self) -> Splitter<'_, K, S> {
        Splitter {
            inner: self.table.splitter(),
        }
    }

    /// Calls `f` on every key.
    pub fn for_each(&self, mut f: impl FnMut(K)) {
        self.table.for_each(|k, _| f(k));
    }

    /// Removes every key, yielding them.
    pub fn drain(&mut self) -> Drain<'_, K, S> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Keeps only the keys for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// #
    /// let mut set: HashSet<u32> = (0..10).collect();
    /// set.retain(|k| k % 3 == 0);
    /// assert_eq!(set.len(), 4);
    /// ```
    pub fn retain(&mut self, mut f: impl FnMut(K) -> bool) {
        self.table.retain(|k, _| f(k));
    }

    /// Returns an iterator that removes and yields the keys for which `f`
    /// returns `true`.
    ///
    /// Keys not yet visited when the iterator is dropped stay in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// #
    /// let mut set: HashSet<i32> = (-5..5).collect();
    /// let mut negative: Vec<_> = set.extract_if(|k| k < 0).collect();
    /// negative.sort();
    /// assert_eq!(negative, [-5, -4, -3, -2, -1]);
    /// assert_eq!(set.len(), 5);
    /// ```
    pub fn extract_if<F>(&mut self, f: F) -> ExtractIf<'_, K, S, F>
    where
        F: FnMut(K) -> bool,
    {
        ExtractIf {
            cursor: self.table.cursor(),
            pred: f,
        }
    }

    /// Returns `true` if `self` has no keys in common with `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// #
    /// let a: HashSet<u16> = [1, 2, 3].into_iter().collect();
    /// let b: HashSet<u16> = [4, 5].into_iter().collect();
    /// assert!(a.is_disjoint(&b));
    /// ```
    pub fn is_disjoint(&self, other: &HashSet<K, S>) -> bool {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.iter().all(|k| !large.contains(k))
    }

    /// Returns `true` if every key of `self` is in `other`.
    pub fn is_subset(&self, other: &HashSet<K, S>) -> bool {
        self.len() <= other.len() && self.iter().all(|k| other.contains(k))
    }

    /// Returns `true` if every key of `other` is in `self`.
    pub fn is_superset(&self, other: &HashSet<K, S>) -> bool {
        other.is_subset(self)
    }

    /// Visits the keys in `self` or `other`, without duplicates.
    pub fn union<'a>(&'a self, other: &'a HashSet<K, S>) -> Union<'a, K, S> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            set: self,
        }
    }

    /// Visits the keys in both `self` and `other`.
    pub fn intersection<'a>(&'a self, other: &'a HashSet<K, S>) -> Intersection<'a, K, S> {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Intersection {
            iter: small.iter(),
            other: large,
        }
    }

    /// Visits the keys in `self` but not in `other`.
    pub fn difference<'a>(&'a self, other: &'a HashSet<K, S>) -> Difference<'a, K, S> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Visits the keys in exactly one of `self` and `other`.
    pub fn symmetric_difference<'a>(
        &'a self,
        other: &'a HashSet<K, S>,
    ) -> SymmetricDifference<'a, K, S> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

impl<K, S> HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K> + Default,
{
    /// Creates an empty set with the default expected size and load factor.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_SIZE)
    }

    /// Creates an empty set sized for `expected` keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashSet;
    /// #
    /// let set: HashSet<char> = HashSet::with_capacity(100);
    /// assert!(set.capacity() >= 100);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self::with_capacity_and_strategy(expected, S::default())
    }

    /// Creates an empty set sized for `expected` keys at `load_factor`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`](crate::Error::InvalidArgument) for a load
    /// factor outside `(0, 1)`.
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self> {
        Self::with_capacity_and_load_factor_and_strategy(expected, load_factor, S::default())
    }

    /// Builds a set from a slice of keys.
    pub fn from_slice(keys: &[K]) -> Self {
        let mut set = Self::with_capacity(keys.len());
        for key in keys {
            set.insert(*key);
        }
        set
    }
}

impl<K, S> Default for HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the keys of a [`HashSet`].
pub struct Iter<'a, K, S> {
    inner: hash_table::Iter<'a, K, (), S>,
}

impl<K, S> Iterator for Iter<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: PrimitiveKey, S: KeyHasher<K>> ExactSizeIterator for Iter<'_, K, S> {}

impl<K: PrimitiveKey, S: KeyHasher<K>> FusedIterator for Iter<'_, K, S> {}

/// A cursor over a [`HashSet`] that can remove the key it is on.
pub struct Cursor<'a, K, S> {
    inner: hash_table::Cursor<'a, K, (), S>,
}

impl<K, S> Cursor<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    /// Advances to the next key.
    pub fn next_key(&mut self) -> Option<K> {
        self.inner.next_entry().map(|entry| entry.key())
    }

    /// Removes the key most recently returned by
    /// [`next_key`](Self::next_key).
    ///
    /// # Errors
    ///
    /// [`Error::IllegalState`](crate::Error::IllegalState) if there is no
    /// such key or it was already removed.
    pub fn remove(&mut self) -> Result<K> {
        self.inner.remove().map(|(k, _)| k)
    }

    /// Returns the number of keys not yet visited.
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}

/// A splittable traversal over the keys of a [`HashSet`].
pub struct Splitter<'a, K, S> {
    inner: hash_table::Splitter<'a, K, (), S>,
}

impl<K, S> Splitter<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    /// See [`hash_table::Splitter::try_split`].
    pub fn try_split(&mut self) -> Option<Self> {
        self.inner.try_split().map(|inner| Splitter { inner })
    }

    /// See [`hash_table::Splitter::estimate_size`].
    pub fn estimate_size(&self) -> usize {
        self.inner.estimate_size()
    }

    /// See [`hash_table::Splitter::exact_size`].
    pub fn exact_size(&self) -> Option<usize> {
        self.inner.exact_size()
    }
}

impl<K, S> Iterator for Splitter<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining iterator over the keys of a [`HashSet`].
pub struct Drain<'a, K: PrimitiveKey, S> {
    inner: hash_table::Drain<'a, K, (), S>,
}

impl<K: PrimitiveKey, S> Iterator for Drain<'_, K, S> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning iterator over the keys of a [`HashSet`].
pub struct IntoIter<K> {
    inner: hash_table::IntoIter<K, ()>,
}

impl<K: PrimitiveKey> Iterator for IntoIter<K> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: PrimitiveKey> ExactSizeIterator for IntoIter<K> {}

impl<K, S> IntoIterator for HashSet<K, S>
where
    K: PrimitiveKey,
{
    type IntoIter = IntoIter<K>;
    type Item = K;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, S> IntoIterator for &'a HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    type IntoIter = Iter<'a, K, S>;
    type Item = K;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, S> FromIterator<K> for HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K> + Default,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K, S> Extend<K> for HashSet<K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for key in iter {
            self.insert(key);
        }
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, K, S> {
    iter: Iter<'a, K, S>,
    other_iter: Iter<'a, K, S>,
    set: &'a HashSet<K, S>,
}

impl<K, S> Iterator for Union<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(k) = self.iter.next() {
            return Some(k);
        }
        loop {
            let k = self.other_iter.next()?;
            if !self.set.contains(k) {
                return Some(k);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, K, S> {
    iter: Iter<'a, K, S>,
    other: &'a HashSet<K, S>,
}

impl<K, S> Iterator for Intersection<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let k = self.iter.next()?;
            if self.other.contains(k) {
                return Some(k);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, K, S> {
    iter: Iter<'a, K, S>,
    other: &'a HashSet<K, S>,
}

impl<K, S> Iterator for Difference<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let k = self.iter.next()?;
            if !self.other.contains(k) {
                return Some(k);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, K, S> {
    iter: Chain<Difference<'a, K, S>, Difference<'a, K, S>>,
}

impl<K, S> Iterator for SymmetricDifference<'_, K, S>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// An iterator that removes and yields the keys matching a predicate.
///
/// Created by [`HashSet::extract_if`].
pub struct ExtractIf<'a, K, S, F> {
    cursor: hash_table::Cursor<'a, K, (), S>,
    pred: F,
}

impl<K, S, F> Iterator for ExtractIf<'_, K, S, F>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
    F: FnMut(K) -> bool,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let key = self.cursor.next_entry()?.key();
            if (self.pred)(key) {
                match self.cursor.remove() {
                    Ok((k, ())) => return Some(k),
                    // The entry was just yielded, so this only happens if the
                    // cursor's bookkeeping is broken. Keep scanning.
                    Err(err) => debug_assert!(false, "extract_if lost {key:?}: {err}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::Error;
    use crate::strategy::BuildHasherStrategy;

    fn sorted(iter: impl IntoIterator<Item = i32>) -> Vec<i32> {
        let mut v: Vec<_> = iter.into_iter().collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_new_and_with_capacity() {
        let set: HashSet<i32> = HashSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);

        let set: HashSet<i32> = HashSet::with_capacity(100);
        assert!(set.capacity() >= 100);

        assert!(matches!(
            HashSet::<i32>::with_capacity_and_load_factor(1, 2.0),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set: HashSet<i32> = HashSet::new();

        assert!(set.insert(1));
        assert!(set.insert(2));
        assert!(!set.insert(1));
        assert_eq!(set.len(), 2);

        assert!(set.contains(1));
        assert!(set.contains(2));
        assert!(!set.contains(3));
    }

    #[test]
    fn test_remove_and_take() {
        let mut set: HashSet<i32> = HashSet::from_slice(&[1, 2, 3, 0]);
        assert_eq!(set.len(), 4);

        assert!(set.remove(2));
        assert!(!set.remove(2));
        assert_eq!(set.take(0), Some(0));
        assert_eq!(set.take(0), None);
        assert_eq!(set.get(3), Some(3));
        assert_eq!(sorted(set.iter()), vec![1, 3]);
    }

    #[test]
    fn test_zero_key_roundtrip() {
        let mut set: HashSet<u64> = HashSet::new();
        for _ in 0..3 {
            assert!(set.insert(0));
            assert!(set.contains(0));
            assert_eq!(set.iter().collect::<Vec<_>>(), vec![0]);
            assert!(set.remove(0));
            assert!(!set.contains(0));
            assert!(set.is_empty());
        }
    }

    #[test]
    fn test_random_against_std() {
        let mut rng = SmallRng::seed_from_u64(OsRng.try_next_u64().unwrap());
        let mut set: HashSet<i32> = HashSet::with_capacity(0);
        let mut model = std::collections::HashSet::new();

        for _ in 0..20_000 {
            let k = rng.random_range(-500..500);
            if rng.random_bool(0.6) {
                assert_eq!(set.insert(k), model.insert(k));
            } else {
                assert_eq!(set.remove(k), model.remove(&k));
            }
            assert_eq!(set.len(), model.len());
        }

        assert_eq!(sorted(set.iter()), sorted(model.iter().copied()));
    }

    #[test]
    fn test_cursor_and_extract_if() {
        let mut set: HashSet<i32> = (0..100).collect();

        let mut cursor = set.cursor();
        assert!(matches!(cursor.remove(), Err(Error::IllegalState { .. })));
        let mut seen = Vec::new();
        while let Some(k) = cursor.next_key() {
            seen.push(k);
            if k % 10 == 0 {
                assert_eq!(cursor.remove().unwrap(), k);
            }
        }
        assert_eq!(sorted(seen), (0..100).collect::<Vec<_>>());
        assert_eq!(set.len(), 90);

        let odd = sorted(set.extract_if(|k| k % 2 == 1));
        assert_eq!(odd.len(), 50);
        assert_eq!(set.len(), 40);
        assert!(set.iter().all(|k| k % 2 == 0 && k % 10 != 0));
    }

    #[derive(Clone, Copy)]
    struct Collide(u64);

    impl KeyHasher<i32> for Collide {
        fn hash(&self, _key: i32) -> u64 {
            self.0
        }

        fn equals(&self, a: i32, b: i32) -> bool {
            a == b
        }
    }

    #[test]
    fn test_extract_if_across_wrapped_keys() {
        // Every key starts probing at the top slot, so the run wraps to the
        // bottom of the table and removals shift keys behind the scan.
        let n = 16;
        let top = (0u64..)
            .find(|h| hash_table::mix(*h) as usize & (n - 1) == n - 1)
            .unwrap();
        let mut set = HashSet::with_capacity_and_strategy(10, Collide(top));
        assert_eq!(set.table().slot_count(), n);
        set.extend(1..=8);

        let odd = sorted(set.extract_if(|k| k % 2 == 1));
        assert_eq!(odd, vec![1, 3, 5, 7]);
        assert_eq!(sorted(set.iter()), vec![2, 4, 6, 8]);

        let rest = sorted(set.extract_if(|_| true));
        assert_eq!(rest, vec![2, 4, 6, 8]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_set_algebra() {
        let a: HashSet<i32> = (0..10).collect();
        let b: HashSet<i32> = (5..15).collect();
        let c: HashSet<i32> = (2..4).collect();

        assert_eq!(sorted(a.union(&b)), (0..15).collect::<Vec<_>>());
        assert_eq!(sorted(a.intersection(&b)), (5..10).collect::<Vec<_>>());
        assert_eq!(sorted(a.difference(&b)), (0..5).collect::<Vec<_>>());
        assert_eq!(
            sorted(a.symmetric_difference(&b)),
            vec![0, 1, 2, 3, 4, 10, 11, 12, 13, 14]
        );

        assert!(c.is_subset(&a));
        assert!(a.is_superset(&c));
        assert!(!a.is_subset(&b));
        assert!(c.is_disjoint(&b));
        assert!(!a.is_disjoint(&b));
    }

    #[test]
    fn test_equality_and_debug() {
        let a: HashSet<u8> = [1, 2, 3].into_iter().collect();
        let mut b: HashSet<u8> = HashSet::with_capacity(1000);
        b.extend([3, 2, 1]);
        assert_eq!(a, b);

        let hashed: HashSet<u8, BuildHasherStrategy> = [1, 2, 3].into_iter().collect();
        assert!(a == hashed);

        let single: HashSet<u8> = [9].into_iter().collect();
        assert_eq!(alloc::format!("{single:?}"), "{9}");
    }

    #[test]
    fn test_drain_retain_and_trim() {
        let mut set: HashSet<i32> = (0..1000).collect();
        set.retain(|k| k < 10);
        assert_eq!(set.len(), 10);
        assert!(set.trim());
        assert_eq!(set.table().slot_count(), 16);

        let drained = sorted(set.drain());
        assert_eq!(drained, (0..10).collect::<Vec<_>>());
        assert!(set.is_empty());
    }

    #[test]
    fn test_splitter_halves() {
        let set: HashSet<i32> = (0..300).collect();
        let mut upper = set.splitter();
        assert_eq!(upper.exact_size(), Some(300));
        let lower = upper.try_split().unwrap();
        assert!(upper.estimate_size() <= 300);
        let all = sorted(lower.chain(upper));
        assert_eq!(all, (0..300).collect::<Vec<_>>());
    }

    #[test]
    fn test_into_iter() {
        let set: HashSet<char> = "abcabc".chars().collect();
        let mut chars: Vec<_> = set.into_iter().collect();
        chars.sort_unstable();
        assert_eq!(chars, vec!['a', 'b', 'c']);
    }
}

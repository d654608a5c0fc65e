use core::fmt::Debug;
use core::iter::FusedIterator;
use core::mem;
use core::ops::Add;

use crate::error::Error;
use crate::error::Result;
use crate::hash_table::Cursor;
use crate::hash_table::DEFAULT_INITIAL_SIZE;
use crate::hash_table::DEFAULT_LOAD_FACTOR;
use crate::hash_table::Drain;
use crate::hash_table::HashTable;
use crate::hash_table::IntoIter;
use crate::hash_table::Iter;
use crate::hash_table::IterMut;
use crate::hash_table::Splitter;
use crate::strategy::KeyHasher;
use crate::strategy::Natural;
use crate::strategy::PrimitiveKey;

/// A hash map from primitive keys to values, backed by an open-addressing
/// [`HashTable`].
///
/// `HashMap<K, V, S>` takes keys by value and decides key equivalence with
/// the strategy `S` (by default [`Natural`]: identity hash, bitwise
/// equality).
///
/// Besides the `Option`-returning API familiar from std, the map carries a
/// *default return value*: the sentinel handed back by
/// [`put`](Self::put), [`get_value`](Self::get_value) and
/// [`remove_value`](Self::remove_value) when the key is absent. It starts out
/// as `V::default()`.
///
/// # Performance Characteristics
///
/// - **Memory**: `(n + 1) * (size_of::<K>() + size_of::<V>())` bytes, with
///   `n` the power-of-two slot count; there is no per-entry metadata.
/// - **Lookup**: one mixed hash, then a linear probe over contiguous keys.
///
/// # Examples
///
/// ```rust
/// use prim_hash::HashMap;
///
/// let mut counts: HashMap<char, u32> = HashMap::new();
/// for c in "hello world".chars() {
///     counts.add_to(c, 1);
/// }
/// assert_eq!(counts.get('l'), Some(&3));
/// assert_eq!(counts.get_value('z'), 0);
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = Natural> {
    table: HashTable<K, V, S>,
    default_return_value: V,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Debug + Default,
    S: KeyHasher<K>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(&k, v);
        }
        map.finish()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    /// Creates an empty map using `strategy` for hashing and equality.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// # use prim_hash::strategy::KeyHasher;
    /// #
    /// # #[derive(Clone, Copy)]
    /// # struct Parity;
    /// # impl KeyHasher<u8> for Parity {
    /// #     fn hash(&self, key: u8) -> u64 {
    /// #         (key % 2) as u64
    /// #     }
    /// #     fn equals(&self, a: u8, b: u8) -> bool {
    /// #         a % 2 == b % 2
    /// #     }
    /// # }
    /// #
    /// let mut map: HashMap<u8, &str, _> = HashMap::with_strategy(Parity);
    /// map.insert(1, "odd");
    /// map.insert(2, "even");
    /// assert_eq!(map.get(7), Some(&"odd"));
    /// // 4 is equivalent to the zero key under this strategy.
    /// assert_eq!(map.get(4), Some(&"even"));
    /// ```
    pub fn with_strategy(strategy: S) -> Self {
        Self::from_table(HashTable::with_strategy(strategy))
    }

    /// Creates an empty map sized for `expected` entries, using `strategy`.
    pub fn with_capacity_and_strategy(expected: usize, strategy: S) -> Self {
        Self::from_table(HashTable::with_capacity_and_strategy(expected, strategy))
    }

    /// Creates an empty map sized for `expected` entries at `load_factor`,
    /// using `strategy`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `load_factor` is not strictly between 0
    /// and 1 or `expected` is too large; [`Error::ResourceExhausted`] if the
    /// arrays cannot be allocated.
    pub fn with_capacity_and_load_factor_and_strategy(
        expected: usize,
        load_factor: f32,
        strategy: S,
    ) -> Result<Self> {
        HashTable::with_capacity_and_load_factor_and_strategy(expected, load_factor, strategy)
            .map(Self::from_table)
    }

    fn from_table(table: HashTable<K, V, S>) -> Self {
        Self {
            table,
            default_return_value: V::default(),
        }
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, &str> = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns how many entries the map holds before it has to grow.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the load factor the map was constructed with.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the hashing strategy.
    pub fn strategy(&self) -> &S {
        self.table.strategy()
    }

    /// Returns the underlying table.
    pub fn table(&self) -> &HashTable<K, V, S> {
        &self.table
    }

    /// Returns the value reported for absent keys by [`put`](Self::put),
    /// [`get_value`](Self::get_value) and
    /// [`remove_value`](Self::remove_value).
    pub fn default_return_value(&self) -> &V {
        &self.default_return_value
    }

    /// Sets the value reported for absent keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<u32, i64> = HashMap::new();
    /// map.set_default_return_value(-1);
    ///
    /// assert_eq!(map.get_value(5), -1);
    /// assert_eq!(map.put(5, 50), -1);
    /// assert_eq!(map.put(5, 51), 50);
    /// assert_eq!(map.remove_value(5), 51);
    /// assert_eq!(map.remove_value(5), -1);
    /// ```
    pub fn set_default_return_value(&mut self, value: V) {
        self.default_return_value = value;
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<i64, &str> = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(1), Some(&"a"));
    /// assert_eq!(map.get(2), None);
    /// ```
    pub fn get(&self, key: K) -> Option<&V> {
        self.table.get(key)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    /// Returns the stored key equivalent to `key` together with its value.
    pub fn get_key_value(&self, key: K) -> Option<(K, &V)> {
        self.table.get_key_value(key)
    }

    /// Returns a copy of the value for `key`, or the default return value.
    pub fn get_value(&self, key: K) -> V
    where
        V: Clone,
    {
        self.get_or_default(key, self.default_return_value.clone())
    }

    /// Returns a copy of the value for `key`, or `default` if it is absent.
    pub fn get_or_default(&self, key: K, default: V) -> V
    where
        V: Clone,
    {
        self.table.get(key).cloned().unwrap_or(default)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: K) -> bool {
        self.table.contains_key(key)
    }

    /// Returns `true` if some entry holds `value`. Linear in the slot count.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.table.contains_value(value)
    }

    /// Inserts `key` with `value`, returning the previous value if the key
    /// was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<u16, &str> = HashMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.table.insert(key, value)
    }

    /// Like [`insert`](Self::insert), but reports allocation failure.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceExhausted`] if the map had to grow and could not.
    /// The map is left unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.table.try_insert(key, value)
    }

    /// Inserts `key` with `value`, returning the previous value or the
    /// default return value if the key was absent.
    pub fn put(&mut self, key: K, value: V) -> V
    where
        V: Clone,
    {
        self.table
            .insert(key, value)
            .unwrap_or_else(|| self.default_return_value.clone())
    }

    /// Inserts `value` only if `key` is absent. Returns the existing value,
    /// or the default return value if the insertion happened.
    pub fn put_if_absent(&mut self, key: K, value: V) -> V
    where
        V: Clone,
    {
        if let Some(existing) = self.table.get(key) {
            return existing.clone();
        }
        self.table.insert(key, value);
        self.default_return_value.clone()
    }

    /// Adds `increment` to the value for `key`, returning the value before
    /// the addition. An absent key starts from the default return value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<u64, f64> = HashMap::new();
    /// assert_eq!(map.add_to(9, 1.5), 0.0);
    /// assert_eq!(map.add_to(9, 1.5), 1.5);
    /// assert_eq!(map.get(9), Some(&3.0));
    /// ```
    pub fn add_to(&mut self, key: K, increment: V) -> V
    where
        V: Copy + Add<Output = V>,
    {
        if let Some(value) = self.table.get_mut(key) {
            let old = *value;
            *value = old + increment;
            return old;
        }

        let base = self.default_return_value;
        self.table.insert(key, base + increment);
        base
    }

    /// Replaces the value for `key` only if the key is present, returning
    /// the old value.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        self.table
            .get_mut(key)
            .map(|slot| mem::replace(slot, value))
    }

    /// Replaces the value for `key` with `new` only if it currently equals
    /// `current`.
    pub fn replace_if(&mut self, key: K, current: &V, new: V) -> bool
    where
        V: PartialEq,
    {
        match self.table.get_mut(key) {
            Some(slot) if *slot == *current => {
                *slot = new;
                true
            }
            _ => false,
        }
    }

    /// Removes `key` only if its value equals `value`.
    pub fn remove_if_equals(&mut self, key: K, value: &V) -> bool
    where
        V: PartialEq,
    {
        if self.table.get(key) != Some(value) {
            return false;
        }
        self.table.remove(key);
        true
    }

    /// Returns the value for `key`, computing and inserting it with `f` if
    /// the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut squares: HashMap<i32, i64> = HashMap::new();
    /// assert_eq!(*squares.compute_if_absent(12, |k| (k as i64) * (k as i64)), 144);
    /// assert_eq!(*squares.compute_if_absent(12, |_| unreachable!()), 144);
    /// ```
    pub fn compute_if_absent(&mut self, key: K, f: impl FnOnce(K) -> V) -> &mut V {
        self.table.get_or_insert_with(key, || f(key))
    }

    /// Inserts `value` if `key` is absent; otherwise combines the existing
    /// value with `value` through `remap`. If `remap` returns `None` the
    /// entry is removed.
    ///
    /// Returns the value now stored for `key`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<u8, u32> = HashMap::new();
    /// map.merge(1, 10, |old, new| Some(old + new));
    /// map.merge(1, 5, |old, new| Some(old + new));
    /// assert_eq!(map.get(1), Some(&15));
    ///
    /// map.merge(1, 0, |_, _| None);
    /// assert!(!map.contains_key(1));
    /// ```
    pub fn merge(
        &mut self,
        key: K,
        value: V,
        remap: impl FnOnce(&V, V) -> Option<V>,
    ) -> Option<&mut V> {
        let Some(current) = self.table.get(key) else {
            return Some(self.table.get_or_insert_with(key, || value));
        };

        match remap(current, value) {
            Some(merged) => {
                let slot = self.table.get_mut(key)?;
                *slot = merged;
                Some(slot)
            }
            None => {
                self.table.remove(key);
                None
            }
        }
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<i8, &str> = HashMap::new();
    /// map.insert(-1, "a");
    /// assert_eq!(map.remove(-1), Some("a"));
    /// assert_eq!(map.remove(-1), None);
    /// ```
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.table.remove(key)
    }

    /// Removes `key`, returning the stored key and value.
    pub fn remove_entry(&mut self, key: K) -> Option<(K, V)> {
        self.table.remove_entry(key)
    }

    /// Removes `key`, returning its value or the default return value.
    pub fn remove_value(&mut self, key: K) -> V
    where
        V: Clone,
    {
        self.table
            .remove(key)
            .unwrap_or_else(|| self.default_return_value.clone())
    }

    /// Removes every entry without releasing memory.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Copies every entry of `other` into this map.
    ///
    /// Room is reserved up front: for the entries of `other` alone when the
    /// load factor is at most 0.5, for the combined size otherwise.
    pub fn put_all<S2>(&mut self, other: &HashMap<K, V, S2>)
    where
        V: Clone,
        S2: KeyHasher<K>,
    {
        let target = if self.table.load_factor() <= 0.5 {
            other.len()
        } else {
            self.len().saturating_add(other.len())
        };
        self.table.reserve(target.saturating_sub(self.len()));

        for (k, v) in other.iter() {
            self.table.insert(k, v.clone());
        }
    }

    /// Shrinks the map to fit its entries. Returns `false` if the
    /// allocation failed and the map was left unchanged.
    pub fn trim(&mut self) -> bool {
        self.table.trim()
    }

    /// Shrinks the map to fit `n` entries if possible. Returns `false` if the
    /// allocation failed and the map was left unchanged.
    pub fn trim_to(&mut self, n: usize) -> bool {
        self.table.trim_to(n)
    }

    /// Grows the map so that it holds `capacity` entries without resizing.
    ///
    /// # Errors
    ///
    /// See [`HashTable::ensure_capacity`].
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        self.table.ensure_capacity(capacity)
    }

    /// Reserves room for `additional` more entries.
    pub fn reserve(&mut self, additional: usize) {
        self.table.reserve(additional);
    }

    /// Reserves room for `additional` more entries, reporting failure.
    ///
    /// # Errors
    ///
    /// See [`HashTable::try_reserve`].
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.table.try_reserve(additional)
    }

    /// Returns an iterator over `(key, &value)` pairs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<u32, u32> = HashMap::new();
    /// map.insert(1, 10);
    /// map.insert(2, 20);
    ///
    /// let mut pairs: Vec<_> = map.iter().map(|(k, v)| (k, *v)).collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [(1, 10), (2, 20)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        self.table.iter()
    }

    /// Returns an iterator over `(key, &mut value)` pairs.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.table.iter_mut()
    }

    /// Returns an iterator over the keys.
    pub fn keys(&self) -> Keys<'_, K, V, S> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the values.
    pub fn values(&self) -> Values<'_, K, V, S> {
        Values {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns a cursor that can remove entries while traversing.
    ///
    /// See [`Cursor`] for the guarantees.
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        self.table.cursor()
    }

    /// Returns a splittable traversal for parallel processing.
    pub fn splitter(&self) -> Splitter<'_, K, V, S> {
        self.table.splitter()
    }

    /// Calls `f` on every entry.
    pub fn for_each(&self, f: impl FnMut(K, &V)) {
        self.table.for_each(f);
    }

    /// Removes every entry, yielding them by value.
    pub fn drain(&mut self) -> Drain<'_, K, V, S> {
        self.table.drain()
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let mut map: HashMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|k, _| k % 2 == 0);
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn retain(&mut self, f: impl FnMut(K, &mut V) -> bool) {
        self.table.retain(f);
    }

    /// Returns probe statistics of the underlying table.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::hash_table::DebugStats {
        self.table.debug_stats()
    }

    /// Returns the probe-distance histogram of the underlying table.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::hash_table::ProbeHistogram {
        self.table.probe_histogram()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K> + Default,
{
    /// Creates an empty map with the default expected size and load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let map: HashMap<i32, u8> = HashMap::new();
    /// assert!(map.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_SIZE)
    }

    /// Creates an empty map sized for `expected` entries.
    pub fn with_capacity(expected: usize) -> Self {
        Self::with_capacity_and_strategy(expected, S::default())
    }

    /// Creates an empty map sized for `expected` entries at `load_factor`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a load factor outside `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// # use prim_hash::hash_table::FAST_LOAD_FACTOR;
    /// #
    /// let map = HashMap::<u32, u32>::with_capacity_and_load_factor(10, FAST_LOAD_FACTOR).unwrap();
    /// assert!(map.capacity() >= 10);
    /// assert!(HashMap::<u32, u32>::with_capacity_and_load_factor(10, 1.25).is_err());
    /// ```
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self> {
        Self::with_capacity_and_load_factor_and_strategy(expected, load_factor, S::default())
    }

    /// Builds a map from parallel key and value slices at the default load
    /// factor. Later duplicates overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the slices differ in length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use prim_hash::HashMap;
    /// #
    /// let map: HashMap<u8, char> = HashMap::from_arrays(&[1, 2, 3], &['a', 'b', 'c']).unwrap();
    /// assert_eq!(map.get(2), Some(&'b'));
    ///
    /// assert!(HashMap::<u8, char>::from_arrays(&[1, 2], &['a']).is_err());
    /// ```
    pub fn from_arrays(keys: &[K], values: &[V]) -> Result<Self>
    where
        V: Clone,
    {
        Self::from_arrays_with_load_factor(keys, values, DEFAULT_LOAD_FACTOR)
    }

    /// Builds a map from parallel key and value slices at `load_factor`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the slices differ in length or the load
    /// factor is out of range.
    pub fn from_arrays_with_load_factor(keys: &[K], values: &[V], load_factor: f32) -> Result<Self>
    where
        V: Clone,
    {
        if keys.len() != values.len() {
            return Err(Error::invalid_argument(alloc::format!(
                "the key array and the value array have different lengths ({} and {})",
                keys.len(),
                values.len()
            )));
        }

        let mut map = Self::with_capacity_and_load_factor(keys.len(), load_factor)?;
        for (k, v) in keys.iter().zip(values) {
            map.insert(*k, v.clone());
        }
        Ok(map)
    }

    /// Builds a map holding copies of the entries of `other`, with the same
    /// load factor and default return value.
    pub fn from_map<S2>(other: &HashMap<K, V, S2>) -> Self
    where
        V: Clone,
        S2: KeyHasher<K>,
    {
        let mut map = Self::with_capacity_and_load_factor(other.len(), other.load_factor())
            .unwrap_or_else(|_| Self::with_capacity(other.len()));
        map.set_default_return_value(other.default_return_value().clone());
        for (k, v) in other.iter() {
            map.insert(k, v.clone());
        }
        map
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, S2> PartialEq<HashMap<K, V, S2>> for HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default + PartialEq,
    S: KeyHasher<K>,
    S2: KeyHasher<K>,
{
    fn eq(&self, other: &HashMap<K, V, S2>) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default + Eq,
    S: KeyHasher<K>,
{
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        let iter = iter.into_iter();
        let hint = iter.size_hint().0;
        let additional = if self.is_empty() { hint } else { hint.div_ceil(2) };
        self.reserve(additional);

        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K> + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S>
where
    K: PrimitiveKey,
{
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        self.table.into_iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    type IntoIter = Iter<'a, K, V, S>;
    type Item = (K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    type IntoIter = IterMut<'a, K, V>;
    type Item = (K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<K, V, S> Iterator for Keys<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
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

impl<K, V, S> ExactSizeIterator for Keys<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
}

impl<K, V, S> FusedIterator for Keys<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V, S> {
    inner: Iter<'a, K, V, S>,
}

impl<'a, K, V, S> Iterator for Values<'a, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for Values<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
}

impl<K, V, S> FusedIterator for Values<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
}

/// A mutable iterator over the values of a [`HashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K: PrimitiveKey, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K: PrimitiveKey, V> FusedIterator for ValuesMut<'_, K, V> {}

//! The open-addressing engine behind [`HashMap`](crate::HashMap) and
//! [`HashSet`](crate::HashSet).
//!
//! Keys live in a flat array of `n + 1` slots with `n` a power of two. The
//! probe region `0..n` uses linear probing, with the key type's zero bit
//! pattern marking an empty slot; the last slot is reserved for whichever key
//! the strategy considers equal to zero. Deletion shifts the rest of the
//! collision run backwards instead of leaving tombstones, which is what lets
//! a [`Cursor`] remove entries in place while it walks the table.

use alloc::format;
use alloc::vec::Vec;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::iter::Rev;
use core::iter::Zip;
use core::mem;

use crate::error::Error;
use crate::error::Result;
use crate::strategy::KeyHasher;
use crate::strategy::Natural;
use crate::strategy::PrimitiveKey;

/// Number of elements a table is sized for when none is given.
pub const DEFAULT_INITIAL_SIZE: usize = 16;

/// Load factor used when none is given.
pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;

/// Trades memory for shorter probe sequences.
pub const FAST_LOAD_FACTOR: f32 = 0.5;

/// Trades even more memory for shorter probe sequences.
pub const VERY_FAST_LOAD_FACTOR: f32 = 0.25;

/// Largest number of probe slots a table may allocate.
pub const MAXIMUM_CAPACITY: usize = 1 << (usize::BITS - 2);

/// 2^64 divided by the golden ratio, rounded to odd.
const INV_PHI64: u64 = 0x9e37_79b9_7f4a_7c15;

/// Scrambles a raw key hash so that the low bits used for masking depend on
/// every input bit.
///
/// Strategies are free to return the identity of the key as its hash;
/// sequential integers would otherwise all land in neighbouring slots.
#[inline(always)]
pub fn mix(hash: u64) -> u64 {
    let h = hash.wrapping_mul(INV_PHI64);
    let h = h ^ (h >> 32);
    h ^ (h >> 16)
}

/// `ceil` for non-negative finite values, available without `std`.
#[inline]
fn ceil_to_usize(value: f64) -> usize {
    let truncated = value as usize;
    if (truncated as f64) < value {
        truncated + 1
    } else {
        truncated
    }
}

/// Number of entries a table of `n` probe slots holds before it grows.
///
/// Always leaves at least one empty slot in the probe region so that probing
/// terminates.
#[inline]
pub fn max_fill(n: usize, load_factor: f32) -> usize {
    ceil_to_usize(n as f64 * load_factor as f64).min(n.saturating_sub(1))
}

/// The number of probe slots needed to hold `expected` entries at
/// `load_factor`: the least power of two not smaller than
/// `ceil(expected / load_factor)`, and never less than 2.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if the result would exceed
/// [`MAXIMUM_CAPACITY`].
pub fn array_size(expected: usize, load_factor: f32) -> Result<usize> {
    let required = expected as f64 / load_factor as f64;
    if required > MAXIMUM_CAPACITY as f64 {
        return Err(Error::invalid_argument(format!(
            "{expected} expected elements at load factor {load_factor} exceed the maximum \
             capacity of {MAXIMUM_CAPACITY} slots"
        )));
    }
    Ok(ceil_to_usize(required).next_power_of_two().max(2))
}

fn check_load_factor(load_factor: f32) -> Result<()> {
    // Also rejects NaN.
    if load_factor > 0.0 && load_factor < 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "load factor must be greater than 0 and smaller than 1, got {load_factor}"
        )))
    }
}

#[cold]
#[inline(never)]
fn allocation_failure<T>(slots: usize) -> ! {
    alloc::alloc::handle_alloc_error(Layout::array::<T>(slots).expect("allocation size overflow"))
}

/// Unwraps results of operations whose only failures are capacity overflow
/// and allocation failure, reporting them the way std collections do.
fn or_abort<T, K>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(Error::ResourceExhausted { slots }) => allocation_failure::<K>(slots),
        Err(err) => panic!("capacity overflow: {err}"),
    }
}

/// An open-addressing hash table from primitive keys to values.
///
/// `HashTable<K, V, S>` is the engine shared by the map and set types. It
/// stores keys and values in two parallel arrays and uses the strategy `S`
/// for every hash and equality decision. Values must implement [`Default`]
/// so that empty slots can hold a value without `unsafe` initialization
/// tracking; sets use `()`.
///
/// ## Growth
///
/// The table grows when an insertion finds it already holding
/// [`capacity`](Self::capacity) entries, and shrinks by half on removal once
/// it falls under a quarter of that, never below the size it was constructed
/// with. Every resize allocates the new arrays before touching the old ones:
/// a failed allocation leaves the table as it was.
///
/// ## Example
///
/// ```rust
/// use prim_hash::hash_table::HashTable;
///
/// let mut table: HashTable<i64, u32> = HashTable::with_capacity(4);
/// assert_eq!(table.slot_count(), 8);
/// assert_eq!(table.capacity(), 6);
///
/// for key in 1..=6 {
///     table.insert(key, key as u32 * 10);
/// }
/// assert_eq!(table.slot_count(), 8);
///
/// table.insert(7, 70);
/// assert_eq!(table.slot_count(), 16);
/// assert_eq!(table.get(3), Some(&30));
/// ```
#[derive(Clone)]
pub struct HashTable<K, V, S = Natural> {
    keys: Vec<K>,
    values: Vec<V>,

    n: usize,
    mask: usize,
    max_fill: usize,
    min_n: usize,

    size: usize,
    contains_null_key: bool,

    load_factor: f32,
    strategy: S,
}

impl<K, V, S> Debug for HashTable<K, V, S>
where
    K: PrimitiveKey,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::string::String;
        use alloc::string::ToString;

        let slots = self.keys[..self.n]
            .iter()
            .map(|k| {
                if k.is_zero() {
                    String::from("..")
                } else {
                    format!("{k:?}")
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        f.debug_struct("HashTable")
            .field("size", &self.size)
            .field("slots", &self.n)
            .field("max_fill", &self.max_fill)
            .field(
                "null_slot",
                &if self.contains_null_key {
                    format!("{:?} => {:?}", self.keys[self.n], self.values[self.n])
                } else {
                    "..".to_string()
                },
            )
            .field("probe_region", &slots)
            .finish()
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    /// Creates a table sized for `expected` entries at `load_factor`, using
    /// `strategy` for hashing and equality.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `load_factor` is not strictly between 0
    ///   and 1, or if `expected` is too large to be represented.
    /// - [`Error::ResourceExhausted`] if the arrays cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::Error;
    /// use prim_hash::hash_table::HashTable;
    /// use prim_hash::strategy::Natural;
    ///
    /// let table: HashTable<u32, u32> =
    ///     HashTable::with_capacity_and_load_factor_and_strategy(100, 0.5, Natural).unwrap();
    /// assert_eq!(table.slot_count(), 256);
    ///
    /// let err = HashTable::<u32, u32>::with_capacity_and_load_factor_and_strategy(10, 1.0, Natural)
    ///     .unwrap_err();
    /// assert!(matches!(err, Error::InvalidArgument { .. }));
    /// ```
    pub fn with_capacity_and_load_factor_and_strategy(
        expected: usize,
        load_factor: f32,
        strategy: S,
    ) -> Result<Self> {
        check_load_factor(load_factor)?;
        let n = array_size(expected, load_factor)?;
        let (keys, values) = Self::allocate(n)?;

        Ok(Self {
            keys,
            values,
            n,
            mask: n - 1,
            max_fill: max_fill(n, load_factor),
            min_n: n,
            size: 0,
            contains_null_key: false,
            load_factor,
            strategy,
        })
    }

    /// Creates a table sized for `expected` entries at the default load
    /// factor.
    ///
    /// # Panics
    ///
    /// Panics if `expected` is too large to be represented, and aborts
    /// through the global allocation error handler if the arrays cannot be
    /// allocated.
    pub fn with_capacity_and_strategy(expected: usize, strategy: S) -> Self {
        or_abort::<_, K>(Self::with_capacity_and_load_factor_and_strategy(
            expected,
            DEFAULT_LOAD_FACTOR,
            strategy,
        ))
    }

    /// Creates a table with the default expected size and load factor.
    pub fn with_strategy(strategy: S) -> Self {
        Self::with_capacity_and_strategy(DEFAULT_INITIAL_SIZE, strategy)
    }

    fn allocate(n: usize) -> Result<(Vec<K>, Vec<V>)> {
        let slots = n + 1;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if keys.try_reserve_exact(slots).is_err() || values.try_reserve_exact(slots).is_err() {
            log::debug!("failed to allocate a table of {slots} slots");
            return Err(Error::ResourceExhausted { slots });
        }

        keys.resize(slots, K::ZERO);
        values.resize_with(slots, V::default);
        Ok((keys, values))
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the table contains no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns how many entries the table holds before the next insertion
    /// of a new key grows it.
    pub fn capacity(&self) -> usize {
        self.max_fill
    }

    /// Returns the number of slots in the probe region, always a power of
    /// two. The reserved zero-key slot is not counted.
    pub fn slot_count(&self) -> usize {
        self.n
    }

    /// Returns the load factor the table was constructed with.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the hashing strategy.
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    #[inline]
    fn real_size(&self) -> usize {
        if self.contains_null_key {
            self.size - 1
        } else {
            self.size
        }
    }

    #[inline(always)]
    fn ideal_slot(&self, key: K) -> usize {
        mix(self.strategy.hash(key)) as usize & self.mask
    }

    /// Locates `key`: `Ok(slot)` if present, otherwise `Err(slot)` with the
    /// slot an insertion would use.
    #[inline]
    fn find(&self, key: K) -> core::result::Result<usize, usize> {
        if self.strategy.equals(key, K::ZERO) {
            return if self.contains_null_key {
                Ok(self.n)
            } else {
                Err(self.n)
            };
        }

        let mut pos = self.ideal_slot(key);
        loop {
            let curr = self.keys[pos];
            if curr.is_zero() {
                return Err(pos);
            }
            if self.strategy.equals(key, curr) {
                return Ok(pos);
            }
            pos = (pos + 1) & self.mask;
        }
    }

    /// Returns `true` if the table contains `key`.
    pub fn contains_key(&self, key: K) -> bool {
        self.find(key).is_ok()
    }

    /// Returns a reference to the value stored for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<i32, &str> = HashTable::new();
    /// table.insert(0, "zero");
    /// assert_eq!(table.get(0), Some(&"zero"));
    /// assert_eq!(table.get(1), None);
    /// ```
    pub fn get(&self, key: K) -> Option<&V> {
        self.find(key).ok().map(|pos| &self.values[pos])
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        self.find(key).ok().map(|pos| &mut self.values[pos])
    }

    /// Returns the stored key equal to `key` under the strategy, together
    /// with its value.
    pub fn get_key_value(&self, key: K) -> Option<(K, &V)> {
        self.find(key)
            .ok()
            .map(|pos| (self.keys[pos], &self.values[pos]))
    }

    /// Returns `true` if any entry holds `value`. Runs in time linear in the
    /// number of slots.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        if self.contains_null_key && self.values[self.n] == *value {
            return true;
        }

        self.keys[..self.n]
            .iter()
            .zip(&self.values[..self.n])
            .any(|(k, v)| !k.is_zero() && v == value)
    }

    /// Inserts `key` with `value`, returning the previous value if the key
    /// was present.
    ///
    /// # Panics
    ///
    /// Aborts through the global allocation error handler if growing the
    /// table fails; the table is left unchanged in that case. Use
    /// [`try_insert`](Self::try_insert) to handle the failure instead.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        or_abort::<_, K>(self.try_insert(key, value))
    }

    /// Inserts `key` with `value`, reporting allocation failure instead of
    /// aborting.
    ///
    /// # Errors
    ///
    /// [`Error::ResourceExhausted`] if the table needed to grow and the new
    /// arrays could not be allocated. The table is left unchanged and `value`
    /// is dropped.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        match self.find(key) {
            Ok(pos) => Ok(Some(mem::replace(&mut self.values[pos], value))),
            Err(pos) => {
                let pos = self.reserve_slot(pos, key)?;
                self.place(pos, key, value);
                Ok(None)
            }
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting the
    /// result of `default` first if the key is absent.
    pub fn get_or_insert_with(&mut self, key: K, default: impl FnOnce() -> V) -> &mut V {
        match self.find(key) {
            Ok(pos) => &mut self.values[pos],
            Err(pos) => {
                let pos = or_abort::<_, K>(self.reserve_slot(pos, key));
                self.place(pos, key, default())
            }
        }
    }

    /// Makes room for one more entry. `pos` is the insertion point found
    /// for `key`; the returned slot is valid after any growth.
    fn reserve_slot(&mut self, pos: usize, key: K) -> Result<usize> {
        if self.size < self.max_fill {
            return Ok(pos);
        }

        let new_n = array_size(self.size + 2, self.load_factor)?;
        self.try_rehash(new_n)?;
        match self.find(key) {
            Ok(pos) | Err(pos) => Ok(pos),
        }
    }

    #[inline]
    fn place(&mut self, pos: usize, key: K, value: V) -> &mut V {
        if pos == self.n {
            self.contains_null_key = true;
        }
        self.keys[pos] = key;
        self.values[pos] = value;
        self.size += 1;
        &mut self.values[pos]
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// May shrink the table if it has become sparse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u8, u8> = HashTable::new();
    /// table.insert(1, 10);
    /// assert_eq!(table.remove(1), Some(10));
    /// assert_eq!(table.remove(1), None);
    /// ```
    pub fn remove(&mut self, key: K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and value if it was present.
    pub fn remove_entry(&mut self, key: K) -> Option<(K, V)> {
        let pos = self.find(key).ok()?;
        let entry = self.take_slot(pos, None);
        self.maybe_shrink();
        Some(entry)
    }

    /// Empties the occupied slot `pos` and closes the gap. Keys that the
    /// shift moves from below `pos` to above it are pushed onto `wrapped`.
    fn take_slot(&mut self, pos: usize, wrapped: Option<&mut Vec<K>>) -> (K, V) {
        self.size -= 1;
        let key = self.keys[pos];
        let value = mem::take(&mut self.values[pos]);
        if pos == self.n {
            self.contains_null_key = false;
            self.keys[pos] = K::ZERO;
        } else {
            self.shift_keys(pos, wrapped);
        }
        (key, value)
    }

    /// Backward-shift deletion starting at the empty slot `pos`.
    ///
    /// Walks the collision run after `pos`. An entry whose ideal slot lies
    /// cyclically in `(last, curr]` is already reachable and stays; any other
    /// entry moves back into the gap, which then opens at its old position.
    /// The walk ends at the first empty slot.
    fn shift_keys(&mut self, mut pos: usize, mut wrapped: Option<&mut Vec<K>>) {
        loop {
            let last = pos;
            pos = (last + 1) & self.mask;

            let curr = loop {
                let curr = self.keys[pos];
                if curr.is_zero() {
                    self.keys[last] = K::ZERO;
                    return;
                }

                let slot = self.ideal_slot(curr);
                let moves = if last <= pos {
                    last >= slot || slot > pos
                } else {
                    last >= slot && slot > pos
                };
                if moves {
                    break curr;
                }
                pos = (pos + 1) & self.mask;
            };

            if pos < last {
                if let Some(wrapped) = wrapped.as_deref_mut() {
                    wrapped.push(curr);
                }
            }

            self.keys[last] = curr;
            // The value at `last` was already taken; it travels to `pos` and
            // ends up in the slot that is finally emptied.
            self.values.swap(last, pos);
        }
    }

    fn maybe_shrink(&mut self) {
        if self.n > self.min_n && self.size < self.max_fill / 4 && self.n > DEFAULT_INITIAL_SIZE {
            let target = self.n / 2;
            if let Err(err) = self.try_rehash(target) {
                log::debug!("skipping shrink to {target} slots: {err}");
            }
        }
    }

    /// Moves every entry into freshly allocated arrays of `new_n + 1` slots.
    ///
    /// The only place capacity changes. On allocation failure the table is
    /// untouched.
    fn try_rehash(&mut self, new_n: usize) -> Result<()> {
        let (mut new_keys, mut new_values) = Self::allocate(new_n)?;
        let mask = new_n - 1;

        let mut remaining = self.real_size();
        let mut i = self.n;
        while remaining > 0 {
            i -= 1;
            let key = self.keys[i];
            if key.is_zero() {
                continue;
            }
            remaining -= 1;

            let mut pos = mix(self.strategy.hash(key)) as usize & mask;
            while !new_keys[pos].is_zero() {
                pos = (pos + 1) & mask;
            }
            new_keys[pos] = key;
            new_values[pos] = mem::take(&mut self.values[i]);
        }

        new_keys[new_n] = self.keys[self.n];
        new_values[new_n] = mem::take(&mut self.values[self.n]);

        log::trace!(
            "rehashed {} entries from {} to {} slots",
            self.size,
            self.n,
            new_n
        );

        self.n = new_n;
        self.mask = mask;
        self.max_fill = max_fill(new_n, self.load_factor);
        self.keys = new_keys;
        self.values = new_values;
        Ok(())
    }

    /// Removes every entry. The table keeps its current size; use
    /// [`trim`](Self::trim) to release memory.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u32, u32> = HashTable::new();
    /// for i in 0..100 {
    ///     table.insert(i, i);
    /// }
    /// let slots = table.slot_count();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.slot_count(), slots);
    /// ```
    pub fn clear(&mut self) {
        if self.size == 0 {
            return;
        }

        self.size = 0;
        self.contains_null_key = false;
        self.keys.fill(K::ZERO);
        self.values.iter_mut().for_each(|v| *v = V::default());
    }

    /// Shrinks the table to the smallest size that holds its entries at its
    /// load factor.
    ///
    /// Returns `false` if the smaller arrays could not be allocated, in which
    /// case the table is unchanged. Returns `true` otherwise, including when
    /// no shrinking was needed.
    pub fn trim(&mut self) -> bool {
        self.trim_to(self.size)
    }

    /// Shrinks the table to the smallest size that holds `n` entries at its
    /// load factor, if that is smaller than the current size and still holds
    /// the current entries.
    ///
    /// Returns `false` only if the allocation failed; the table is then
    /// unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u64, u64> = HashTable::with_capacity(10_000);
    /// table.insert(1, 1);
    /// assert!(table.trim());
    /// assert_eq!(table.slot_count(), 2);
    /// assert_eq!(table.get(1), Some(&1));
    ///
    /// // Asking for room the table already lacks is a no-op.
    /// assert!(table.trim_to(1_000));
    /// assert_eq!(table.slot_count(), 2);
    /// ```
    pub fn trim_to(&mut self, n: usize) -> bool {
        let required = n as f64 / self.load_factor as f64;
        if required >= self.n as f64 {
            return true;
        }

        let l = ceil_to_usize(required).next_power_of_two().max(2);
        if l >= self.n || self.size > max_fill(l, self.load_factor) {
            return true;
        }

        match self.try_rehash(l) {
            Ok(()) => {
                log::debug!("trimmed table to {l} slots");
                true
            }
            Err(err) => {
                log::debug!("trim to {l} slots failed: {err}");
                false
            }
        }
    }

    /// Grows the table so that it holds `capacity` entries without further
    /// resizing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `capacity` cannot be represented,
    /// [`Error::ResourceExhausted`] if allocation fails. The table is
    /// unchanged on error.
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        let needed = array_size(capacity, self.load_factor)?;
        if needed > self.n {
            self.try_rehash(needed)?;
        }
        Ok(())
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Errors
    ///
    /// As for [`ensure_capacity`](Self::ensure_capacity).
    pub fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.ensure_capacity(self.size.saturating_add(additional))
    }

    /// Reserves room for at least `additional` more entries.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow and aborts on allocation failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<i32, i32> = HashTable::new();
    /// table.reserve(1000);
    /// assert!(table.capacity() >= 1000);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        or_abort::<_, K>(self.try_reserve(additional));
    }

    /// Returns an iterator over the entries, yielding each key by value and
    /// its value by reference.
    ///
    /// The zero key, if present, comes first; the rest follow in descending
    /// slot order. No particular order should be relied upon.
    pub fn iter(&self) -> Iter<'_, K, V, S> {
        Iter {
            table: self,
            traversal: Traversal::new(self),
        }
    }

    /// Returns an iterator yielding each key with a mutable reference to its
    /// value.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let n = self.n;
        let remaining = self.size;
        let (probe_values, null_value) = self.values.split_at_mut(n);
        let null = if self.contains_null_key {
            null_value.first_mut().map(|v| (self.keys[n], v))
        } else {
            None
        };

        IterMut {
            null,
            slots: self.keys[..n].iter().zip(probe_values.iter_mut()).rev(),
            remaining,
        }
    }

    /// Returns a cursor that visits every entry once and can remove the
    /// entry it is on.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::hash_table::HashTable;
    ///
    /// let mut table: HashTable<u32, u32> = HashTable::new();
    /// for i in 0..30 {
    ///     table.insert(i, i * 2);
    /// }
    ///
    /// let mut cursor = table.cursor();
    /// while let Some(entry) = cursor.next_entry() {
    ///     if entry.key() % 3 == 0 {
    ///         cursor.remove().unwrap();
    ///     }
    /// }
    ///
    /// assert_eq!(table.len(), 20);
    /// assert!(!table.contains_key(9));
    /// assert_eq!(table.get(10), Some(&20));
    /// ```
    pub fn cursor(&mut self) -> Cursor<'_, K, V, S> {
        Cursor {
            traversal: Traversal::new(self),
            table: self,
            last: Last::None,
        }
    }

    /// Returns a splittable traversal over the entries.
    pub fn splitter(&self) -> Splitter<'_, K, V, S> {
        Splitter {
            table: self,
            pos: 0,
            max: self.n,
            count: 0,
            must_return_null: self.contains_null_key,
            has_split: false,
        }
    }

    /// Removes every entry, yielding them by value. The table keeps its size.
    ///
    /// Dropping the iterator early still empties the table.
    pub fn drain(&mut self) -> Drain<'_, K, V, S> {
        Drain {
            pos: self.n + 1,
            table: self,
        }
    }

    /// Keeps only the entries for which `f` returns `true`.
    ///
    /// Removal happens in place through a [`Cursor`].
    pub fn retain(&mut self, mut f: impl FnMut(K, &mut V) -> bool) {
        let mut cursor = self.cursor();
        while let Some(mut entry) = cursor.next_entry() {
            let keep = f(entry.key(), entry.value_mut());
            if !keep {
                // The cursor is positioned on the entry it just yielded.
                let removed = cursor.remove();
                debug_assert!(removed.is_ok(), "retain lost its cursor entry");
            }
        }
    }

    /// Calls `f` on every entry.
    pub fn for_each(&self, mut f: impl FnMut(K, &V)) {
        for (k, v) in self.iter() {
            f(k, v);
        }
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K> + Default,
{
    /// Creates an empty table with the default expected size, load factor
    /// and strategy.
    pub fn new() -> Self {
        Self::with_strategy(S::default())
    }

    /// Creates an empty table sized for `expected` entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use prim_hash::hash_table::HashTable;
    ///
    /// let table: HashTable<i16, f64> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(expected: usize) -> Self {
        Self::with_capacity_and_strategy(expected, S::default())
    }

    /// Creates an empty table sized for `expected` entries at `load_factor`.
    ///
    /// # Errors
    ///
    /// As for
    /// [`with_capacity_and_load_factor_and_strategy`](Self::with_capacity_and_load_factor_and_strategy).
    pub fn with_capacity_and_load_factor(expected: usize, load_factor: f32) -> Result<Self> {
        Self::with_capacity_and_load_factor_and_strategy(expected, load_factor, S::default())
    }
}

impl<K, V, S> Default for HashTable<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> IntoIterator for HashTable<K, V, S>
where
    K: PrimitiveKey,
{
    type IntoIter = IntoIter<K, V>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        let remaining = self.size;
        let mut keys = self.keys;
        let mut values = self.values;
        let null_key = keys.pop();
        let null_value = values.pop();

        let null = match (self.contains_null_key, null_key, null_value) {
            (true, Some(k), Some(v)) => Some((k, v)),
            _ => None,
        };

        IntoIter {
            null,
            slots: keys.into_iter().zip(values).rev(),
            remaining,
        }
    }
}

/// Traversal position shared by [`Iter`] and [`Cursor`].
///
/// Visits the zero-key slot first, then scans the probe region from the top
/// down, then drains `wrapped`: keys that a removal through the cursor moved
/// from below the scan position to above it.
struct Traversal<K> {
    /// Probe-region slots `pos..n` have been scanned.
    pos: usize,
    /// Entries not yet yielded.
    remaining: usize,
    must_return_null: bool,
    wrapped: Vec<K>,
    wrapped_index: usize,
}

enum Step<K> {
    Slot(usize),
    Wrapped(K, usize),
}

impl<K> Traversal<K>
where
    K: PrimitiveKey,
{
    fn new<V, S>(table: &HashTable<K, V, S>) -> Self {
        Self {
            pos: table.n,
            remaining: table.size,
            must_return_null: table.contains_null_key,
            wrapped: Vec::new(),
            wrapped_index: 0,
        }
    }

    fn advance<V, S>(&mut self, table: &HashTable<K, V, S>) -> Option<Step<K>>
    where
        V: Default,
        S: KeyHasher<K>,
    {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        if self.must_return_null {
            self.must_return_null = false;
            return Some(Step::Slot(table.n));
        }

        while self.pos > 0 {
            self.pos -= 1;
            if !table.keys[self.pos].is_zero() {
                return Some(Step::Slot(self.pos));
            }
        }

        let key = *self.wrapped.get(self.wrapped_index)?;
        self.wrapped_index += 1;
        debug_assert!(table.contains_key(key), "wrapped key {key:?} vanished");
        table.find(key).ok().map(|pos| Step::Wrapped(key, pos))
    }
}

/// An iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::iter`].
pub struct Iter<'a, K, V, S> {
    table: &'a HashTable<K, V, S>,
    traversal: Traversal<K>,
}

impl<'a, K, V, S> Iterator for Iter<'a, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        let index = match self.traversal.advance(table)? {
            Step::Slot(index) | Step::Wrapped(_, index) => index,
        };
        Some((table.keys[index], &table.values[index]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.traversal.remaining, Some(self.traversal.remaining))
    }
}

impl<K, V, S> ExactSizeIterator for Iter<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
}

impl<K, V, S> FusedIterator for Iter<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
}

/// A mutable iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, K, V> {
    null: Option<(K, &'a mut V)>,
    slots: Rev<Zip<core::slice::Iter<'a, K>, core::slice::IterMut<'a, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V>
where
    K: PrimitiveKey,
{
    type Item = (K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.null.take() {
            self.remaining -= 1;
            return Some(entry);
        }

        for (k, v) in self.slots.by_ref() {
            if !k.is_zero() {
                self.remaining -= 1;
                return Some((*k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K: PrimitiveKey, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of a [`HashTable`].
pub struct IntoIter<K, V> {
    null: Option<(K, V)>,
    slots: Rev<Zip<alloc::vec::IntoIter<K>, alloc::vec::IntoIter<V>>>,
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V>
where
    K: PrimitiveKey,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.null.take() {
            self.remaining -= 1;
            return Some(entry);
        }

        for (k, v) in self.slots.by_ref() {
            if !k.is_zero() {
                self.remaining -= 1;
                return Some((k, v));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: PrimitiveKey, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K: PrimitiveKey, V> FusedIterator for IntoIter<K, V> {}

#[derive(Clone, Copy)]
enum Last<K> {
    None,
    Slot(usize),
    Wrapped(K),
}

/// A traversal over a [`HashTable`] that can remove the entry it is on.
///
/// Every entry present when the cursor was created, and not removed since,
/// is yielded exactly once, even though removal shifts entries around in
/// place. Entries are handed out as an [`EntryView`] that borrows the
/// cursor, so a view cannot outlive the step that produced it.
///
/// Created by [`HashTable::cursor`].
pub struct Cursor<'a, K, V, S> {
    table: &'a mut HashTable<K, V, S>,
    traversal: Traversal<K>,
    last: Last<K>,
}

impl<K, V, S> Cursor<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    /// Advances to the next entry and returns a view of it, or `None` once
    /// every entry has been visited.
    pub fn next_entry(&mut self) -> Option<EntryView<'_, K, V>> {
        let index = match self.traversal.advance(&*self.table)? {
            Step::Slot(index) => {
                self.last = Last::Slot(index);
                index
            }
            Step::Wrapped(key, index) => {
                self.last = Last::Wrapped(key);
                index
            }
        };
        Some(self.view(index))
    }

    /// Returns a view of the entry the cursor is on.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchElement`] before the first call to
    /// [`next_entry`](Self::next_entry) and after [`remove`](Self::remove).
    pub fn current(&mut self) -> Result<EntryView<'_, K, V>> {
        let index = match self.last {
            Last::None => return Err(Error::NoSuchElement),
            Last::Slot(index) => index,
            Last::Wrapped(key) => self.table.find(key).map_err(|_| Error::NoSuchElement)?,
        };
        Ok(self.view(index))
    }

    fn view(&mut self, index: usize) -> EntryView<'_, K, V> {
        EntryView {
            key: self.table.keys[index],
            value: &mut self.table.values[index],
            index,
        }
    }

    /// Removes the entry most recently returned by
    /// [`next_entry`](Self::next_entry), returning it.
    ///
    /// The table is never shrunk while the cursor scans the probe region.
    ///
    /// # Errors
    ///
    /// [`Error::IllegalState`] if no entry has been returned yet, or if it
    /// was already removed.
    pub fn remove(&mut self) -> Result<(K, V)> {
        match mem::replace(&mut self.last, Last::None) {
            Last::None => Err(Error::IllegalState {
                message: "remove called without a preceding next_entry",
            }),
            Last::Slot(index) => Ok(self
                .table
                .take_slot(index, Some(&mut self.traversal.wrapped))),
            // The scan is past the whole probe region, so the entry can go
            // through the ordinary path; wrapped keys are re-found by value.
            Last::Wrapped(key) => self.table.remove_entry(key).ok_or(Error::NoSuchElement),
        }
    }

    /// Returns the number of entries not yet visited.
    pub fn remaining(&self) -> usize {
        self.traversal.remaining
    }
}

/// A view of one entry, handed out by a [`Cursor`].
///
/// The view points into the table's arrays. It borrows the cursor, so it
/// must be dropped before the cursor advances or removes.
pub struct EntryView<'c, K, V> {
    key: K,
    value: &'c mut V,
    index: usize,
}

impl<K, V> EntryView<'_, K, V>
where
    K: Copy,
{
    /// Returns the key.
    pub fn key(&self) -> K {
        self.key
    }

    /// Returns the value.
    pub fn value(&self) -> &V {
        self.value
    }

    /// Returns the value mutably.
    pub fn value_mut(&mut self) -> &mut V {
        self.value
    }

    /// Replaces the value, returning the old one.
    pub fn set_value(&mut self, value: V) -> V {
        mem::replace(self.value, value)
    }

    /// Returns the slot this entry occupies. The reserved zero-key slot is
    /// [`HashTable::slot_count`].
    pub fn slot(&self) -> usize {
        self.index
    }

    /// Copies the entry out into a detached pair.
    pub fn to_pair(&self) -> (K, V)
    where
        V: Clone,
    {
        (self.key, self.value.clone())
    }
}

impl<K: Debug, V: Debug> Debug for EntryView<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntryView")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("slot", &self.index)
            .finish()
    }
}

/// A traversal over a [`HashTable`] that can be split in two for parallel
/// processing.
///
/// Unlike [`Iter`], a splitter scans slots in ascending order over the range
/// `pos..max`. [`try_split`](Self::try_split) hands the lower half of the
/// remaining range to a new splitter; that half also takes over the
/// zero-key slot if it has not been yielded yet.
///
/// # Examples
///
/// ```rust
/// use prim_hash::hash_table::HashTable;
///
/// let mut table: HashTable<u32, u32> = HashTable::new();
/// for i in 0..1000 {
///     table.insert(i, i);
/// }
///
/// let mut upper = table.splitter();
/// assert_eq!(upper.exact_size(), Some(1000));
/// let lower = upper.try_split().unwrap();
/// assert_eq!(upper.exact_size(), None);
///
/// assert_eq!(lower.count() + upper.count(), 1000);
/// ```
pub struct Splitter<'a, K, V, S> {
    table: &'a HashTable<K, V, S>,
    pos: usize,
    max: usize,
    count: usize,
    must_return_null: bool,
    has_split: bool,
}

impl<'a, K, V, S> Splitter<'a, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    /// Splits off the lower half of the remaining slot range, or returns
    /// `None` if the range is too small to be worth splitting.
    pub fn try_split(&mut self) -> Option<Self> {
        if self.pos + 1 >= self.max {
            return None;
        }
        let half = (self.max - self.pos) >> 1;
        if half <= 1 {
            return None;
        }

        let mid = self.pos + half;
        let prefix = Splitter {
            table: self.table,
            pos: self.pos,
            max: mid,
            count: 0,
            must_return_null: self.must_return_null,
            has_split: true,
        };

        self.pos = mid;
        self.must_return_null = false;
        self.has_split = true;
        Some(prefix)
    }

    /// Estimates the number of entries left.
    ///
    /// Exact for a splitter that has never been split. After a split the
    /// entries are assumed to be spread uniformly over the slots.
    pub fn estimate_size(&self) -> usize {
        let left = self.table.size.saturating_sub(self.count);
        if !self.has_split {
            return left;
        }

        let density = self.table.real_size() as f64 / self.table.n as f64;
        let estimate = (density * (self.max - self.pos) as f64) as usize;
        left.min(estimate + usize::from(self.must_return_null))
    }

    /// The number of entries left, if it is known exactly.
    pub fn exact_size(&self) -> Option<usize> {
        if self.has_split {
            None
        } else {
            Some(self.table.size.saturating_sub(self.count))
        }
    }

    #[inline]
    fn entry(&self, index: usize) -> (K, &'a V) {
        let table = self.table;
        (table.keys[index], &table.values[index])
    }
}

impl<'a, K, V, S> Iterator for Splitter<'a, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.must_return_null {
            self.must_return_null = false;
            self.count += 1;
            return Some(self.entry(self.table.n));
        }

        while self.pos < self.max {
            let index = self.pos;
            self.pos += 1;
            if !self.table.keys[index].is_zero() {
                self.count += 1;
                return Some(self.entry(index));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.exact_size() {
            Some(exact) => (exact, Some(exact)),
            None => (
                0,
                Some(
                    self.table
                        .size
                        .saturating_sub(self.count)
                        .min(self.max - self.pos + usize::from(self.must_return_null)),
                ),
            ),
        }
    }
}

impl<K, V, S> FusedIterator for Splitter<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
}

/// A draining iterator over the entries of a [`HashTable`].
///
/// Created by [`HashTable::drain`].
pub struct Drain<'a, K: PrimitiveKey, V: Default, S> {
    table: &'a mut HashTable<K, V, S>,
    pos: usize,
}

impl<K, V, S> Iterator for Drain<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let table = &mut *self.table;
        while self.pos > 0 {
            self.pos -= 1;
            let index = self.pos;

            if index == table.n {
                if !table.contains_null_key {
                    continue;
                }
                table.contains_null_key = false;
            } else if table.keys[index].is_zero() {
                continue;
            }

            // Every slot is emptied, so no run needs to be shifted back
            // together.
            table.size -= 1;
            let key = mem::replace(&mut table.keys[index], K::ZERO);
            return Some((key, mem::take(&mut table.values[index])));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.size, Some(self.table.size))
    }
}

impl<K, V, S> Drop for Drain<'_, K, V, S>
where
    K: PrimitiveKey,
    V: Default,
{
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<K: PrimitiveKey, V: Default, S> ExactSizeIterator for Drain<'_, K, V, S> {}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of entries currently in the table
    pub populated: usize,
    /// Number of entries the table holds before growing
    pub capacity: usize,
    /// Number of slots in the probe region
    pub total_slots: usize,
    /// Number of occupied probe-region slots
    pub occupied_slots: usize,
    /// Whether the reserved zero-key slot is in use
    pub null_key: bool,
    /// Slot utilization (occupied_slots / total_slots)
    pub slot_utilization: f64,
    /// Longest distance from an entry to its ideal slot
    pub longest_probe: usize,
    /// Mean distance from an entry to its ideal slot
    pub mean_probe: f64,
    /// Bytes held by the key and value arrays
    pub total_bytes: usize,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {}/{} ({} in the zero-key slot)",
            self.populated,
            self.capacity,
            usize::from(self.null_key)
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization)",
            self.occupied_slots,
            self.total_slots,
            self.slot_utilization * 100.0
        );
        println!(
            "Probe Length: {:.2} mean, {} longest",
            self.mean_probe, self.longest_probe
        );
        println!("Total Allocated: {} bytes", self.total_bytes);
    }
}

/// Histogram of probe distances: `bins()[d]` counts the entries stored `d`
/// slots after their ideal slot.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// The per-distance counts.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Pretty-prints the histogram horizontally using stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!(
            "probe histogram ({} entries):",
            self.bins.iter().sum::<usize>()
        );
        for (distance, &count) in self.bins.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", distance, "█".repeat(width), count);
        }
    }
}

#[cfg(any(test, feature = "stats"))]
impl<K, V, S> HashTable<K, V, S>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    /// Computes the histogram of probe distances of the probe region.
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mut bins = Vec::new();
        for (pos, key) in self.keys[..self.n].iter().enumerate() {
            if key.is_zero() {
                continue;
            }
            let distance = pos.wrapping_sub(self.ideal_slot(*key)) & self.mask;
            if bins.len() <= distance {
                bins.resize(distance + 1, 0);
            }
            bins[distance] += 1;
        }
        ProbeHistogram { bins }
    }

    /// Returns detailed utilization statistics for debugging.
    pub fn debug_stats(&self) -> DebugStats {
        let histogram = self.probe_histogram();
        let occupied_slots = self.real_size();
        let total_distance: usize = histogram
            .bins()
            .iter()
            .enumerate()
            .map(|(distance, count)| distance * count)
            .sum();

        DebugStats {
            populated: self.size,
            capacity: self.max_fill,
            total_slots: self.n,
            occupied_slots,
            null_key: self.contains_null_key,
            slot_utilization: occupied_slots as f64 / self.n as f64,
            longest_probe: histogram.bins().len().saturating_sub(1),
            mean_probe: if occupied_slots == 0 {
                0.0
            } else {
                total_distance as f64 / occupied_slots as f64
            },
            total_bytes: (self.n + 1) * (mem::size_of::<K>() + mem::size_of::<V>()),
        }
    }
}

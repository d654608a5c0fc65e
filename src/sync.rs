//! Mutex-wrapped collections for sharing between threads.
//!
//! The tables themselves do no locking. [`Synchronized`] serializes every
//! operation behind one [`Mutex`]; traversals run inside a closure that holds
//! the lock for their whole duration.

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::error::Error;
use crate::error::Result;
use crate::hash_map::HashMap;
use crate::hash_set::HashSet;
use crate::strategy::KeyHasher;
use crate::strategy::PrimitiveKey;

/// A collection behind a mutex.
///
/// Once [`freeze`](Self::freeze) has been called, every mutating operation
/// fails with [`Error::UnsupportedOperation`] and the collection becomes a
/// shared read-only view.
///
/// A panic inside a closure poisons the mutex; later calls ignore the poison
/// and see the collection as the panicking closure left it.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::thread;
///
/// use prim_hash::HashMap;
/// use prim_hash::sync::Synchronized;
///
/// let counts = Arc::new(Synchronized::new(HashMap::<u32, u64>::new()));
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let counts = Arc::clone(&counts);
///         thread::spawn(move || {
///             for i in 0..100 {
///                 counts.with_mut(|map| map.add_to(i % 10, 1)).unwrap();
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(counts.get(3), Some(40));
/// counts.freeze();
/// assert!(counts.insert(3, 0).is_err());
/// ```
#[derive(Debug, Default)]
pub struct Synchronized<T> {
    inner: Mutex<T>,
    frozen: AtomicBool,
}

impl<T> Synchronized<T> {
    /// Wraps `inner`.
    pub fn new(inner: T) -> Self {
        Self {
            inner: Mutex::new(inner),
            frozen: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with shared access to the collection.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock())
    }

    /// Runs `f` with exclusive access to the collection.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] after [`freeze`](Self::freeze).
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        self.mutate("with_mut", f)
    }

    fn mutate<R>(&self, operation: &'static str, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.lock();
        if self.frozen.load(Ordering::Acquire) {
            return Err(Error::UnsupportedOperation { operation });
        }
        Ok(f(&mut guard))
    }

    /// Makes the collection read-only. Irreversible.
    pub fn freeze(&self) {
        let _guard = self.lock();
        self.frozen.store(true, Ordering::Release);
    }

    /// Returns `true` once [`freeze`](Self::freeze) has been called.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Unwraps the collection.
    pub fn into_inner(self) -> T {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V, S> Synchronized<HashMap<K, V, S>>
where
    K: PrimitiveKey,
    V: Default,
    S: KeyHasher<K>,
{
    /// Returns a copy of the value for `key`.
    pub fn get(&self, key: K) -> Option<V>
    where
        V: Clone,
    {
        self.with(|map| map.get(key).cloned())
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key(&self, key: K) -> bool {
        self.with(|map| map.contains_key(key))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.with(HashMap::len)
    }

    /// Returns `true` if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.with(HashMap::is_empty)
    }

    /// Inserts `key` with `value`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] once frozen.
    pub fn insert(&self, key: K, value: V) -> Result<Option<V>> {
        self.mutate("insert", |map| map.insert(key, value))
    }

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] once frozen.
    pub fn remove(&self, key: K) -> Result<Option<V>> {
        self.mutate("remove", |map| map.remove(key))
    }

    /// Removes every entry.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] once frozen.
    pub fn clear(&self) -> Result<()> {
        self.mutate("clear", HashMap::clear)
    }
}

impl<K, S> Synchronized<HashSet<K, S>>
where
    K: PrimitiveKey,
    S: KeyHasher<K>,
{
    /// Returns `true` if the set contains `key`.
    pub fn contains(&self, key: K) -> bool {
        self.with(|set| set.contains(key))
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.with(HashSet::len)
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.with(HashSet::is_empty)
    }

    /// Adds `key`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] once frozen.
    pub fn insert(&self, key: K) -> Result<bool> {
        self.mutate("insert", |set| set.insert(key))
    }

    /// Removes `key`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedOperation`] once frozen.
    pub fn remove(&self, key: K) -> Result<bool> {
        self.mutate("remove", |set| set.remove(key))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn concurrent_inserts_are_serialized() {
        let set = Arc::new(Synchronized::new(HashSet::<u64>::new()));
        let handles: Vec<_> = (0..8u64)
            .map(|t| {
                let set = Arc::clone(&set);
                thread::spawn(move || {
                    for i in 0..1000 {
                        set.insert(t * 1000 + i).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(set.len(), 8000);
        let inner = Arc::try_unwrap(set).unwrap().into_inner();
        assert!((0..8000).all(|k| inner.contains(k)));
    }

    #[test]
    fn frozen_rejects_mutation() {
        let map = Synchronized::new(HashMap::<i32, i32>::new());
        map.insert(1, 2).unwrap();
        map.freeze();
        assert!(map.is_frozen());

        assert_eq!(
            map.insert(3, 4),
            Err(Error::UnsupportedOperation { operation: "insert" })
        );
        assert!(map.remove(1).is_err());
        assert!(map.clear().is_err());
        assert!(map.with_mut(|m| m.len()).is_err());

        assert_eq!(map.get(1), Some(2));
        assert_eq!(map.with(|m| m.iter().count()), 1);
    }

    #[test]
    fn poison_is_ignored() {
        let map = Arc::new(Synchronized::new(HashMap::<i32, i32>::new()));
        let cloned = Arc::clone(&map);
        let result = thread::spawn(move || {
            cloned
                .with_mut(|m| {
                    m.insert(1, 1);
                    if m.len() == 1 {
                        panic!("boom");
                    }
                })
                .ok();
        })
        .join();
        assert!(result.is_err());

        assert_eq!(map.get(1), Some(1));
        map.insert(2, 2).unwrap();
        assert_eq!(map.len(), 2);
    }
}

use core::fmt::Debug;
use core::hash::BuildHasher;

/// A primitive key type the tables can store unboxed.
///
/// The all-zero bit pattern of the type doubles as the "empty slot" marker in
/// the probe region, so every key type must expose it along with a natural
/// hash and equality. Floating point keys hash and compare by bit pattern:
/// `NaN` equals itself and `-0.0` is a different key from `0.0`.
pub trait PrimitiveKey: Copy + Debug {
    /// The value whose bit pattern marks an empty slot.
    const ZERO: Self;

    /// Returns `true` if `self` has the all-zero bit pattern.
    fn is_zero(self) -> bool;

    /// The identity hash of the value, before mixing.
    fn natural_hash(self) -> u64;

    /// Bitwise equality.
    fn natural_eq(self, other: Self) -> bool;
}

macro_rules! impl_integer_key {
    ($($ty:ty => $wide:ty),* $(,)?) => {
        $(
            impl PrimitiveKey for $ty {
                const ZERO: Self = 0;

                #[inline(always)]
                fn is_zero(self) -> bool {
                    self == 0
                }

                #[inline(always)]
                fn natural_hash(self) -> u64 {
                    self as $wide as u64
                }

                #[inline(always)]
                fn natural_eq(self, other: Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_integer_key! {
    i8 => i64,
    i16 => i64,
    i32 => i64,
    i64 => i64,
    isize => i64,
    u8 => u64,
    u16 => u64,
    u32 => u64,
    u64 => u64,
    usize => u64,
}

impl PrimitiveKey for char {
    const ZERO: Self = '\0';

    #[inline(always)]
    fn is_zero(self) -> bool {
        self == '\0'
    }

    #[inline(always)]
    fn natural_hash(self) -> u64 {
        self as u64
    }

    #[inline(always)]
    fn natural_eq(self, other: Self) -> bool {
        self == other
    }
}

impl PrimitiveKey for f32 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn is_zero(self) -> bool {
        self.to_bits() == 0
    }

    #[inline(always)]
    fn natural_hash(self) -> u64 {
        self.to_bits() as u64
    }

    #[inline(always)]
    fn natural_eq(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl PrimitiveKey for f64 {
    const ZERO: Self = 0.0;

    #[inline(always)]
    fn is_zero(self) -> bool {
        self.to_bits() == 0
    }

    #[inline(always)]
    fn natural_hash(self) -> u64 {
        self.to_bits()
    }

    #[inline(always)]
    fn natural_eq(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

/// A hashing strategy: the notion of key equivalence a table uses.
///
/// Tables never compare keys directly; every lookup, insertion, removal and
/// the zero-key check go through `equals`, and every probe start is derived
/// from `hash`. Implementations must be consistent: keys that are `equals`
/// must produce the same `hash`, and `equals` must be an equivalence
/// relation.
///
/// A key that the strategy considers equal to [`PrimitiveKey::ZERO`] is
/// stored in the table's reserved slot rather than in the probe region.
///
/// # Examples
///
/// ```rust
/// use prim_hash::HashMap;
/// use prim_hash::strategy::KeyHasher;
///
/// /// Treats keys as equal when they agree modulo 100.
/// #[derive(Clone, Copy, Default)]
/// struct Mod100;
///
/// impl KeyHasher<i32> for Mod100 {
///     fn hash(&self, key: i32) -> u64 {
///         key.rem_euclid(100) as u64
///     }
///
///     fn equals(&self, a: i32, b: i32) -> bool {
///         a.rem_euclid(100) == b.rem_euclid(100)
///     }
/// }
///
/// let mut map: HashMap<i32, &str, Mod100> = HashMap::with_strategy(Mod100);
/// map.insert(7, "seven");
/// assert_eq!(map.get(107), Some(&"seven"));
/// ```
pub trait KeyHasher<K> {
    /// Hashes `key`. The table mixes the result before masking, so the
    /// identity function is an acceptable hash.
    fn hash(&self, key: K) -> u64;

    /// Returns `true` if `a` and `b` denote the same key.
    fn equals(&self, a: K, b: K) -> bool;
}

/// The natural strategy: identity hash and bitwise equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<K> KeyHasher<K> for Natural
where
    K: PrimitiveKey,
{
    #[inline(always)]
    fn hash(&self, key: K) -> u64 {
        key.natural_hash()
    }

    #[inline(always)]
    fn equals(&self, a: K, b: K) -> bool {
        a.natural_eq(b)
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used by [`BuildHasherStrategy`] when none is
        /// named.
        pub type DefaultBuildHasher = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used by [`BuildHasherStrategy`] when none is
        /// named.
        pub type DefaultBuildHasher = std::collections::hash_map::RandomState;
    }
}

/// Adapts any [`BuildHasher`] into a strategy.
///
/// The key's bit pattern is fed to the hasher, so every [`PrimitiveKey`],
/// floats included, can be used. Equality stays bitwise; only the hash
/// changes. This is useful when keys are attacker controlled and the
/// identity hash would make collision chains trivial to construct.
///
/// Without the `foldhash` or `std` feature there is no default hasher
/// builder and `B` must be named.
///
/// # Examples
///
/// ```rust
/// # #[cfg(any(feature = "std", feature = "foldhash"))]
/// # {
/// use prim_hash::HashSet;
/// use prim_hash::strategy::BuildHasherStrategy;
///
/// let mut set: HashSet<f64, BuildHasherStrategy> = HashSet::new();
/// set.insert(f64::NAN);
/// set.insert(-0.0);
/// assert!(set.contains(f64::NAN));
/// assert!(!set.contains(0.0));
/// # }
/// ```
#[cfg(any(feature = "foldhash", feature = "std"))]
#[derive(Debug, Clone, Default)]
pub struct BuildHasherStrategy<B = DefaultBuildHasher> {
    hash_builder: B,
}

/// Adapts any [`BuildHasher`] into a strategy.
///
/// The key's bit pattern is fed to the hasher; equality stays bitwise.
#[cfg(not(any(feature = "foldhash", feature = "std")))]
#[derive(Debug, Clone, Default)]
pub struct BuildHasherStrategy<B> {
    hash_builder: B,
}

impl<B> BuildHasherStrategy<B> {
    /// Wraps `hash_builder`.
    pub fn new(hash_builder: B) -> Self {
        Self { hash_builder }
    }

    /// Returns the wrapped hasher builder.
    pub fn hasher(&self) -> &B {
        &self.hash_builder
    }
}

impl<K, B> KeyHasher<K> for BuildHasherStrategy<B>
where
    K: PrimitiveKey,
    B: BuildHasher,
{
    #[inline]
    fn hash(&self, key: K) -> u64 {
        self.hash_builder.hash_one(key.natural_hash())
    }

    #[inline(always)]
    fn equals(&self, a: K, b: K) -> bool {
        a.natural_eq(b)
    }
}

#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod error;

/// A map from primitive keys to values.
///
/// This module provides a `HashMap` that wraps the `HashTable` and adds the
/// default-return-value API and the conditional update helpers.
pub mod hash_map;

pub mod hash_table;

/// A set of primitive keys.
///
/// This module provides a `HashSet` that wraps a `HashTable` with `()`
/// values.
pub mod hash_set;

/// Key types and hashing strategies.
pub mod strategy;

#[cfg(feature = "std")]
pub mod sync;

#[cfg(feature = "serde")]
mod serde;

#[cfg(feature = "rayon")]
pub mod rayon;

pub use error::Error;
pub use error::Result;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
pub use hash_table::HashTable;
pub use strategy::KeyHasher;
pub use strategy::Natural;
pub use strategy::PrimitiveKey;

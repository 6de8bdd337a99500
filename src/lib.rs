#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod error;

pub mod hash_fn;

/// A key-value map over the leapfrog table.
///
/// [`HashMap`](hash_map::HashMap) hashes keys with a configurable
/// [`BuildHasher`](core::hash::BuildHasher) and reports capacity problems as
/// [`Error`]s instead of growing.
pub mod hash_map;

/// A set over the leapfrog table.
pub mod hash_set;

pub mod hash_table;
mod hash_table_proptest;

pub mod static_hash_map;
pub mod static_hash_set;
pub mod storage;

pub use error::Error;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
#[cfg(feature = "stats")]
pub use hash_table::ChainStats;
pub use hash_table::HashTable;
pub use hash_table::StaticHashTable;
pub use static_hash_map::StaticHashMap;
pub use static_hash_set::StaticHashSet;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hash builder used when none is named: foldhash's randomly seeded
        /// `RandomState`.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else {
        /// Hash builder used when none is named: 32-bit FNV-1a.
        pub type DefaultHashBuilder = hash_fn::BuildFnv1aHasher;
    }
}

//! A map with a compile-time capacity that never allocates.

use crate::DefaultHashBuilder;
use crate::hash_map::HashMap;
use crate::hash_table::HashTable;
use crate::storage::InlineBuckets;

/// A [`HashMap`] holding exactly `N` buckets inline.
///
/// The buckets live inside the map value, so a `StaticHashMap` can be a
/// `static`, sit on the stack, or be embedded in another struct without any
/// allocation. It shares every operation with the heap-backed map except
/// `rehash` and `take`: once its `N` buckets are exhausted, insertions of new
/// keys fail.
///
/// # Examples
///
/// ```rust
/// # use leapfrog_hash::StaticHashMap;
/// # use leapfrog_hash::Error;
/// # use leapfrog_hash::hash_fn::BuildIdentityHasher;
/// #
/// let mut map: StaticHashMap<u32, &str, 4, BuildIdentityHasher> = StaticHashMap::new();
/// for (key, name) in [(0, "zero"), (1, "one"), (2, "two"), (3, "three")] {
///     map.insert(key, name)?;
/// }
///
/// assert_eq!(map.insert(4, "four"), Err(Error::TableFull { capacity: 4 }));
/// assert_eq!(map.get(&2), Some(&"two"));
/// # Ok::<(), leapfrog_hash::Error>(())
/// ```
pub type StaticHashMap<K, V, const N: usize, S = DefaultHashBuilder> =
    HashMap<K, V, S, InlineBuckets<(K, V), N>>;

impl<K, V, S, const N: usize> HashMap<K, V, S, InlineBuckets<(K, V), N>> {
    /// Creates an empty map with `N` buckets, hashing keys with
    /// `hash_builder`.
    ///
    /// Fails to compile when `N` is zero.
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self::from_table(HashTable::new(), hash_builder)
    }
}

impl<K, V, S: Default, const N: usize> HashMap<K, V, S, InlineBuckets<(K, V), N>> {
    /// Creates an empty map with `N` buckets and a default hash builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S: Default, const N: usize> Default for HashMap<K, V, S, InlineBuckets<(K, V), N>> {
    fn default() -> Self {
        Self::new()
    }
}

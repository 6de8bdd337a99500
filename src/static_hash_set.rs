//! A set with a compile-time capacity that never allocates.

use crate::DefaultHashBuilder;
use crate::hash_set::HashSet;
use crate::hash_table::HashTable;
use crate::storage::InlineBuckets;

/// A [`HashSet`] holding exactly `N` buckets inline.
///
/// See [`StaticHashMap`](crate::StaticHashMap).
///
/// # Examples
///
/// ```rust
/// # use leapfrog_hash::StaticHashSet;
/// #
/// let mut seen: StaticHashSet<char, 8> = StaticHashSet::new();
/// for c in "banana".chars() {
///     seen.insert(c)?;
/// }
/// assert_eq!(seen.len(), 3);
/// # Ok::<(), leapfrog_hash::Error>(())
/// ```
pub type StaticHashSet<T, const N: usize, S = DefaultHashBuilder> =
    HashSet<T, S, InlineBuckets<T, N>>;

impl<T, S, const N: usize> HashSet<T, S, InlineBuckets<T, N>> {
    /// Creates an empty set with `N` buckets, hashing values with
    /// `hash_builder`.
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self::from_table(HashTable::new(), hash_builder)
    }
}

impl<T, S: Default, const N: usize> HashSet<T, S, InlineBuckets<T, N>> {
    /// Creates an empty set with `N` buckets and a default hash builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, S: Default, const N: usize> Default for HashSet<T, S, InlineBuckets<T, N>> {
    fn default() -> Self {
        Self::new()
    }
}

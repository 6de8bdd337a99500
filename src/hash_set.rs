use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;

use crate::DefaultHashBuilder;
use crate::error::Error;
use crate::hash_table;
use crate::hash_table::HashTable;
use crate::storage::BucketStorage;
use crate::storage::HeapBuckets;

/// A hash set built on the leapfrog [`HashTable`].
///
/// `HashSet<T, S, B>` stores values of type `T`, hashes them with `S` and
/// keeps its buckets in `B`. Like [`HashMap`](crate::HashMap), the set never
/// grows by itself: [`insert`](HashSet::insert) reports an [`Error`] when no
/// bucket can take a new value, and heap-backed sets can then be
/// [`rehash`](HashSet::rehash)ed.
///
/// # Examples
///
/// ```rust
/// # use leapfrog_hash::HashSet;
/// #
/// let mut set: HashSet<&str> = HashSet::with_capacity(16)?;
/// assert!(set.insert("apple")?);
/// assert!(!set.insert("apple")?);
/// assert!(set.contains("apple"));
/// # Ok::<(), leapfrog_hash::Error>(())
/// ```
pub struct HashSet<T, S = DefaultHashBuilder, B = HeapBuckets<T>>
where
    B: BucketStorage<T>,
{
    table: HashTable<T, B>,
    hash_builder: S,
}

impl<T, S, B> Clone for HashSet<T, S, B>
where
    T: Clone,
    S: Clone,
    B: BucketStorage<T>,
{
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<T, S, B> PartialEq for HashSet<T, S, B>
where
    T: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<T>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, S, B> Eq for HashSet<T, S, B>
where
    T: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<T>,
{
}

impl<T, S, B> Debug for HashSet<T, S, B>
where
    T: Debug,
    B: BucketStorage<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S> {
    /// Creates a heap-backed set with exactly `capacity` buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashSet;
    /// # use leapfrog_hash::hash_fn::BuildFnv1aHasher;
    /// #
    /// let set: HashSet<i32, _> = HashSet::with_capacity_and_hasher(100, BuildFnv1aHasher::default())?;
    /// assert_eq!(set.capacity(), 100);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::with_capacity(capacity)?,
            hash_builder,
        })
    }

    /// Rebuilds the set with `new_capacity` buckets. See
    /// [`HashMap::rehash`](crate::HashMap::rehash).
    pub fn rehash(&mut self, new_capacity: usize) -> Result<(), Error> {
        self.table.rehash(new_capacity)
    }

    /// Moves every element into a new set, leaving this one with no elements
    /// and zero buckets.
    ///
    /// Named apart from [`take`](HashSet::take), which removes one value.
    pub fn take_all(&mut self) -> Self
    where
        S: Clone,
    {
        Self {
            table: self.table.take(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<T, S: Default> HashSet<T, S> {
    /// Creates a heap-backed set with exactly `capacity` buckets and a
    /// default hash builder.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S: Default> Default for HashSet<T, S> {
    /// Creates a set with zero buckets.
    fn default() -> Self {
        Self {
            table: HashTable::default(),
            hash_builder: S::default(),
        }
    }
}

impl<T, S, B: BucketStorage<T>> HashSet<T, S, B> {
    pub(crate) const fn from_table(table: HashTable<T, B>, hash_builder: S) -> Self {
        Self {
            table,
            hash_builder,
        }
    }

    /// Returns the number of elements in the set.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the set contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns `len() / capacity()`, or `0.0` without buckets.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the set's hash builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every element, keeping the buckets.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the elements, in bucket order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Removes every element, returning them through an iterator.
    pub fn drain(&mut self) -> Drain<'_, T, B> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Cursor on the first element, or past the end if the set is empty.
    pub fn cursor_front(&self) -> Cursor<'_, T> {
        Cursor {
            inner: self.table.cursor_front(),
        }
    }

    /// Cursor on the last element, or before the start if the set is empty.
    pub fn cursor_back(&self) -> Cursor<'_, T> {
        Cursor {
            inner: self.table.cursor_back(),
        }
    }

    /// Cursor past the last element.
    pub fn cursor_after_back(&self) -> Cursor<'_, T> {
        Cursor {
            inner: self.table.cursor_after_back(),
        }
    }

    /// Cursor before the first element.
    pub fn cursor_before_front(&self) -> Cursor<'_, T> {
        Cursor {
            inner: self.table.cursor_before_front(),
        }
    }

    /// Probe-chain statistics of the underlying table.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_stats(&self) -> hash_table::ChainStats {
        self.table.chain_stats()
    }
}

impl<T, S, B> HashSet<T, S, B>
where
    T: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<T>,
{
    /// Adds a value to the set.
    ///
    /// Returns `true` if the value was not present. An equal value already in
    /// the set is kept and `value` is dropped.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TableFull`] or [`Error::ProbeChainOverflow`] if the
    /// value is new and cannot be placed.
    pub fn insert(&mut self, value: T) -> Result<bool, Error> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| *v == value)? {
            hash_table::Entry::Occupied(_) => Ok(false),
            hash_table::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(true)
            }
        }
    }

    /// Adds a value, replacing and returning an equal value already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashSet;
    /// #
    /// let mut set: HashSet<Vec<u8>> = HashSet::with_capacity(4)?;
    /// assert_eq!(set.replace(vec![1])?, None);
    /// assert_eq!(set.replace(vec![1])?, Some(vec![1]));
    /// assert_eq!(set.len(), 1);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn replace(&mut self, value: T) -> Result<Option<T>, Error> {
        let hash = self.hash_builder.hash_one(&value);
        match self.table.entry(hash, |v| *v == value)? {
            hash_table::Entry::Occupied(mut entry) => {
                Ok(Some(core::mem::replace(entry.get_mut(), value)))
            }
            hash_table::Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(None)
            }
        }
    }

    /// Returns `true` if the set contains `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(value).is_some()
    }

    /// Returns the stored value equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v.borrow() == value)
    }

    /// Removes `value`, returning whether it was present.
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.take(value).is_some()
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v.borrow() == value)
    }

    /// Returns `true` if the two sets share no element.
    pub fn is_disjoint<B2: BucketStorage<T>>(&self, other: &HashSet<T, S, B2>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if every element of `self` is in `other`.
    pub fn is_subset<B2: BucketStorage<T>>(&self, other: &HashSet<T, S, B2>) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every element of `other` is in `self`.
    pub fn is_superset<B2: BucketStorage<T>>(&self, other: &HashSet<T, S, B2>) -> bool {
        other.is_subset(self)
    }

    /// Elements of `self`, followed by the elements of `other` missing from
    /// `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashSet;
    /// #
    /// let mut a: HashSet<u32> = HashSet::with_capacity(8)?;
    /// let mut b: HashSet<u32> = HashSet::with_capacity(8)?;
    /// a.insert(1)?;
    /// a.insert(2)?;
    /// b.insert(2)?;
    /// b.insert(3)?;
    ///
    /// let mut union: Vec<u32> = a.union(&b).copied().collect();
    /// union.sort();
    /// assert_eq!(union, [1, 2, 3]);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn union<'a>(&'a self, other: &'a Self) -> Union<'a, T, S, B> {
        Union {
            iter: self.iter(),
            other_iter: other.iter(),
            set: self,
        }
    }

    /// Elements present in both sets.
    pub fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, T, S, B> {
        let (iter, other) = if self.len() <= other.len() {
            (self.iter(), other)
        } else {
            (other.iter(), self)
        };
        Intersection { iter, other }
    }

    /// Elements of `self` missing from `other`.
    pub fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, T, S, B> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Elements present in exactly one of the sets.
    pub fn symmetric_difference<'a>(&'a self, other: &'a Self) -> SymmetricDifference<'a, T, S, B> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

impl<T, S, B: BucketStorage<T>> IntoIterator for HashSet<T, S, B> {
    type IntoIter = IntoIter<T, B>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S, B: BucketStorage<T>> IntoIterator for &'a HashSet<T, S, B> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A cursor over the elements of a set, in bucket order.
///
/// Sits on an element or on one of the two sentinels before the first and
/// after the last element.
pub struct Cursor<'a, T> {
    inner: hash_table::Cursor<'a, T>,
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<'a, T> Cursor<'a, T> {
    /// Moves to the next element, or past the back after the last one.
    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    /// Moves to the previous element, or before the front after the first
    /// one.
    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }

    /// The element under the cursor.
    pub fn get(&self) -> Option<&'a T> {
        self.inner.get()
    }

    /// The bucket index under the cursor.
    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }

    /// Whether the cursor sits before the first element.
    pub fn is_before_front(&self) -> bool {
        self.inner.is_before_front()
    }

    /// Whether the cursor sits past the last element.
    pub fn is_after_back(&self) -> bool {
        self.inner.is_after_back()
    }
}

/// An iterator over the values of a set.
pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// A draining iterator over the values of a set.
pub struct Drain<'a, T, B = HeapBuckets<T>>
where
    B: BucketStorage<T>,
{
    inner: hash_table::Drain<'a, T, B>,
}

impl<T, B: BucketStorage<T>> Iterator for Drain<'_, T, B> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning iterator over the values of a set.
pub struct IntoIter<T, B = HeapBuckets<T>>
where
    B: BucketStorage<T>,
{
    inner: hash_table::IntoIter<T, B>,
}

impl<T, B: BucketStorage<T>> Iterator for IntoIter<T, B> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the union of two sets.
pub struct Union<'a, T, S, B: BucketStorage<T>> {
    iter: Iter<'a, T>,
    other_iter: Iter<'a, T>,
    set: &'a HashSet<T, S, B>,
}

impl<'a, T, S, B> Iterator for Union<'a, T, S, B>
where
    T: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(v) = self.iter.next() {
            return Some(v);
        }
        loop {
            let v = self.other_iter.next()?;
            if !self.set.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the intersection of two sets.
pub struct Intersection<'a, T, S, B: BucketStorage<T>> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, B>,
}

impl<'a, T, S, B> Iterator for Intersection<'a, T, S, B>
where
    T: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the difference of two sets.
pub struct Difference<'a, T, S, B: BucketStorage<T>> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, B>,
}

impl<'a, T, S, B> Iterator for Difference<'a, T, S, B>
where
    T: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let v = self.iter.next()?;
            if !self.other.contains(v) {
                return Some(v);
            }
        }
    }
}

/// An iterator over the symmetric difference of two sets.
pub struct SymmetricDifference<'a, T, S, B: BucketStorage<T>> {
    iter: core::iter::Chain<Difference<'a, T, S, B>, Difference<'a, T, S, B>>,
}

impl<'a, T, S, B> Iterator for SymmetricDifference<'a, T, S, B>
where
    T: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<T>,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use siphasher::sip::SipHasher;

    use super::*;
    use crate::hash_fn::BuildFixedHasher;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    type SipSet<T> = HashSet<T, SipHashBuilder>;

    fn set_of(values: &[i32]) -> SipSet<i32> {
        let mut set = HashSet::with_capacity(32).unwrap();
        for &v in values {
            set.insert(v).unwrap();
        }
        set
    }

    fn sorted<'a>(iter: impl Iterator<Item = &'a i32>) -> Vec<i32> {
        let mut values: Vec<i32> = iter.copied().collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn test_insert_and_contains() {
        let mut set: SipSet<i32> = HashSet::with_capacity(16).unwrap();
        assert!(set.insert(1).unwrap());
        assert!(set.insert(2).unwrap());
        assert!(!set.insert(1).unwrap());

        assert_eq!(set.len(), 2);
        assert!(set.contains(&1));
        assert!(set.contains(&2));
        assert!(!set.contains(&3));
    }

    #[test]
    fn test_remove_and_take() {
        let mut set: SipSet<String> = HashSet::with_capacity(16).unwrap();
        set.insert("hello".to_string()).unwrap();
        set.insert("world".to_string()).unwrap();

        assert!(set.remove("hello"));
        assert!(!set.remove("hello"));
        assert_eq!(set.take("world"), Some("world".to_string()));
        assert_eq!(set.take("world"), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_get_returns_stored_value() {
        let mut set: SipSet<String> = HashSet::with_capacity(4).unwrap();
        set.insert("stored".to_string()).unwrap();
        assert_eq!(set.get("stored").map(String::as_str), Some("stored"));
        assert_eq!(set.get("missing"), None);
    }

    #[test]
    fn full_set_rejects_new_values() {
        let mut set: SipSet<i32> = HashSet::with_capacity(3).unwrap();
        for v in 0..3 {
            set.insert(v).unwrap();
        }
        assert_eq!(set.insert(3), Err(Error::TableFull { capacity: 3 }));
        assert_eq!(set.insert(2), Ok(false));
        assert_eq!(set.replace(1), Ok(Some(1)));

        set.rehash(6).unwrap();
        assert!(set.insert(3).unwrap());
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn single_chain_set() {
        let mut set: HashSet<u32, BuildFixedHasher> = HashSet::with_capacity(40).unwrap();
        for v in 0..40 {
            set.insert(v).unwrap();
        }
        assert_eq!(set.chain_stats().longest_chain, 39);
        for v in (0..40).rev() {
            assert!(set.remove(&v));
            set.table.check_chains();
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_iter_drain_and_into_iter() {
        let mut set = set_of(&[1, 2, 3, 4, 5]);
        assert_eq!(sorted(set.iter()), [1, 2, 3, 4, 5]);
        assert_eq!(set.iter().len(), 5);
        assert_eq!(sorted((&set).into_iter()), [1, 2, 3, 4, 5]);

        let mut drained: Vec<i32> = set.drain().collect();
        drained.sort_unstable();
        assert_eq!(drained, [1, 2, 3, 4, 5]);
        assert!(set.is_empty());

        let set = set_of(&[7, 8]);
        let mut owned: Vec<i32> = set.into_iter().collect();
        owned.sort_unstable();
        assert_eq!(owned, [7, 8]);
    }

    #[test]
    fn test_set_algebra() {
        let a = set_of(&[1, 2, 3, 4]);
        let b = set_of(&[3, 4, 5]);

        assert_eq!(sorted(a.union(&b)), [1, 2, 3, 4, 5]);
        assert_eq!(sorted(a.intersection(&b)), [3, 4]);
        assert_eq!(sorted(a.difference(&b)), [1, 2]);
        assert_eq!(sorted(b.difference(&a)), [5]);
        assert_eq!(sorted(a.symmetric_difference(&b)), [1, 2, 5]);
    }

    #[test]
    fn test_subset_and_disjoint() {
        let small = set_of(&[1, 2]);
        let large = set_of(&[1, 2, 3]);
        let other = set_of(&[9]);

        assert!(small.is_subset(&large));
        assert!(!large.is_subset(&small));
        assert!(large.is_superset(&small));
        assert!(small.is_disjoint(&other));
        assert!(other.is_disjoint(&large));
        assert!(!small.is_disjoint(&large));
    }

    #[test]
    fn test_equality_clone_and_debug() {
        let a = set_of(&[1, 2, 3]);
        let mut b: SipSet<i32> = HashSet::with_capacity(64).unwrap();
        for v in [3, 2, 1] {
            b.insert(v).unwrap();
        }
        assert_eq!(a, b);
        assert_eq!(a.clone(), a);

        b.remove(&1);
        assert_ne!(a, b);

        let single = set_of(&[42]);
        assert_eq!(alloc::format!("{single:?}"), "{42}");
    }

    #[test]
    fn default_set_has_no_buckets() {
        let mut set: SipSet<i32> = HashSet::default();
        assert_eq!(set.capacity(), 0);
        assert!(!set.contains(&1));
        assert_eq!(set.insert(1), Err(Error::TableFull { capacity: 0 }));
        set.rehash(2).unwrap();
        assert!(set.insert(1).unwrap());
    }

    #[test]
    fn take_moves_everything_out() {
        let mut set = set_of(&[1, 2, 3]);
        let taken = set.take_all();

        assert_eq!(taken.len(), 3);
        assert!(taken.contains(&2));
        assert_eq!(set.len(), 0);
        assert_eq!(set.capacity(), 0);
        assert!(!set.contains(&2));
        assert_eq!(set.insert(4), Err(Error::TableFull { capacity: 0 }));
    }

    #[test]
    fn cursor_walks_both_ways_through_the_sentinels() {
        let set = set_of(&[10, 20, 30, 40, 50]);
        let in_order: Vec<i32> = set.iter().copied().collect();

        let mut cursor = set.cursor_before_front();
        assert!(cursor.is_before_front());
        assert_eq!(cursor.get(), None);
        let mut forward = Vec::new();
        cursor.move_next();
        while let Some(&v) = cursor.get() {
            forward.push(v);
            cursor.move_next();
        }
        assert_eq!(forward, in_order);
        assert!(cursor.is_after_back());
        assert_eq!(cursor, set.cursor_after_back());

        cursor.move_next();
        assert!(cursor.is_after_back());

        let mut backward = Vec::new();
        cursor.move_prev();
        assert_eq!(cursor, set.cursor_back());
        while let Some(&v) = cursor.get() {
            backward.push(v);
            cursor.move_prev();
        }
        backward.reverse();
        assert_eq!(backward, in_order);
        assert!(cursor.is_before_front());
        assert_eq!(cursor, set.cursor_before_front());

        cursor.move_next();
        assert_eq!(cursor, set.cursor_front());
        assert_eq!(cursor.get(), in_order.first());

        let empty: SipSet<i32> = HashSet::with_capacity(4).unwrap();
        assert!(empty.cursor_front().is_after_back());
        assert!(empty.cursor_back().is_before_front());
    }
}

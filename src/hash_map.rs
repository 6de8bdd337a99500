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

/// A hash map built on the leapfrog [`HashTable`].
///
/// `HashMap<K, V, S, B>` stores `(K, V)` pairs, hashes keys with the builder
/// `S`, and keeps its buckets in the storage `B`. With the default
/// [`HeapBuckets`] storage the capacity is chosen at construction and only
/// changes through [`rehash`](HashMap::rehash); see
/// [`StaticHashMap`](crate::StaticHashMap) for the inline, fixed-capacity
/// variant.
///
/// Because the map never grows by itself, every operation that can add a key
/// returns a `Result`. A failed insertion leaves the map untouched.
///
/// # Examples
///
/// ```rust
/// # use leapfrog_hash::HashMap;
/// #
/// let mut map: HashMap<&str, u32> = HashMap::with_capacity(32)?;
/// map.insert("one", 1)?;
/// map.insert("two", 2)?;
///
/// assert_eq!(map.get("one"), Some(&1));
/// assert_eq!(map.remove("two"), Some(2));
/// assert_eq!(map.len(), 1);
/// # Ok::<(), leapfrog_hash::Error>(())
/// ```
pub struct HashMap<K, V, S = DefaultHashBuilder, B = HeapBuckets<(K, V)>>
where
    B: BucketStorage<(K, V)>,
{
    table: HashTable<(K, V), B>,
    hash_builder: S,
}

impl<K, V, S, B> Clone for HashMap<K, V, S, B>
where
    K: Clone,
    V: Clone,
    S: Clone,
    B: BucketStorage<(K, V)>,
{
    /// Clones every entry into the same bucket, so the clone iterates in the
    /// same order as the original.
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<K, V, S, B> Debug for HashMap<K, V, S, B>
where
    K: Debug,
    V: Debug,
    B: BucketStorage<(K, V)>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.table.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<K, V, S, B> PartialEq for HashMap<K, V, S, B>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    B: BucketStorage<(K, V)>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| value == v))
    }
}

impl<K, V, S, B> Eq for HashMap<K, V, S, B>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    B: BucketStorage<(K, V)>,
{
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates a heap-backed map with exactly `capacity` buckets, hashing
    /// keys with `hash_builder`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashMap;
    /// # use leapfrog_hash::hash_fn::BuildJenkinsHasher;
    /// #
    /// let map: HashMap<u32, String, _> =
    ///     HashMap::with_capacity_and_hasher(100, BuildJenkinsHasher::default())?;
    /// assert_eq!(map.capacity(), 100);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Result<Self, Error> {
        Ok(Self {
            table: HashTable::with_capacity(capacity)?,
            hash_builder,
        })
    }

    /// Rebuilds the map with `new_capacity` buckets.
    ///
    /// Keys are not hashed again and values are moved, not cloned. Asking for
    /// fewer buckets than there are entries does nothing.
    ///
    /// # Errors
    ///
    /// See [`HashTable::rehash`]. The map is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashMap;
    /// #
    /// let mut map: HashMap<u32, u32> = HashMap::with_capacity(2)?;
    /// map.insert(1, 10)?;
    /// map.insert(2, 20)?;
    /// assert!(map.insert(3, 30).is_err());
    ///
    /// map.rehash(4)?;
    /// map.insert(3, 30)?;
    /// assert_eq!(map.len(), 3);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn rehash(&mut self, new_capacity: usize) -> Result<(), Error> {
        self.table.rehash(new_capacity)
    }

    /// Moves every entry into a new map, leaving this one with no entries and
    /// zero buckets. Both maps share a copy of the hash builder.
    pub fn take(&mut self) -> Self
    where
        S: Clone,
    {
        Self {
            table: self.table.take(),
            hash_builder: self.hash_builder.clone(),
        }
    }
}

impl<K, V, S: Default> HashMap<K, V, S> {
    /// Creates a heap-backed map with exactly `capacity` buckets and a
    /// default hash builder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<K, V, S: Default> Default for HashMap<K, V, S> {
    /// Creates a map with zero buckets. It allocates nothing and every
    /// insertion fails until it is [`rehash`](HashMap::rehash)ed.
    fn default() -> Self {
        Self {
            table: HashTable::default(),
            hash_builder: S::default(),
        }
    }
}

impl<K, V, S, B: BucketStorage<(K, V)>> HashMap<K, V, S, B> {
    pub(crate) const fn from_table(table: HashTable<(K, V), B>, hash_builder: S) -> Self {
        Self {
            table,
            hash_builder,
        }
    }

    /// Returns the number of entries in the map.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the number of buckets, which is also the most entries the map
    /// can hold.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns `len() / capacity()`, or `0.0` for a map without buckets.
    pub fn load_factor(&self) -> f32 {
        self.table.load_factor()
    }

    /// Returns the map's hash builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every entry, keeping the buckets.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator over the entries, in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the entries with mutable values, in bucket
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns an iterator over the keys, in bucket order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values, in bucket order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes every entry, returning them through an iterator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashMap;
    /// #
    /// let mut map: HashMap<u8, char> = HashMap::with_capacity(8)?;
    /// map.insert(1, 'a')?;
    /// map.insert(2, 'b')?;
    ///
    /// let pairs: Vec<_> = map.drain().collect();
    /// assert!(map.is_empty());
    /// assert_eq!(pairs.len(), 2);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V, B> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Cursor on the first entry, or past the end if the map is empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        Cursor {
            inner: self.table.cursor_front(),
        }
    }

    /// Cursor on the last entry, or before the start if the map is empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        Cursor {
            inner: self.table.cursor_back(),
        }
    }

    /// Cursor past the last entry.
    pub fn cursor_after_back(&self) -> Cursor<'_, K, V> {
        Cursor {
            inner: self.table.cursor_after_back(),
        }
    }

    /// Cursor before the first entry.
    pub fn cursor_before_front(&self) -> Cursor<'_, K, V> {
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

impl<K, V, S, B> HashMap<K, V, S, B>
where
    K: Hash + Eq,
    S: BuildHasher,
    B: BucketStorage<(K, V)>,
{
    /// Hashes `key` with the map's hash builder.
    pub fn hash<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + ?Sized,
    {
        self.hash_builder.hash_one(key)
    }

    /// Inserts a key-value pair, returning the previous value of the key.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::TableFull`] or [`Error::ProbeChainOverflow`] if the
    /// key is new and cannot be placed; the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashMap;
    /// #
    /// let mut map: HashMap<u32, &str> = HashMap::with_capacity(8)?;
    /// assert_eq!(map.insert(37, "a")?, None);
    /// assert_eq!(map.insert(37, "b")?, Some("a"));
    /// assert_eq!(map.get(&37), Some(&"b"));
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, Error> {
        match self.entry(key)? {
            Entry::Occupied(mut entry) => Ok(Some(entry.insert(value))),
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(None)
            }
        }
    }

    /// Inserts the value produced by `make` unless `key` is already present.
    ///
    /// Returns `true` if the key was new. `make` only runs in that case, and
    /// an existing value is left as is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashMap;
    /// #
    /// let mut map: HashMap<&str, Vec<u8>> = HashMap::with_capacity(8)?;
    /// assert!(map.emplace("bytes", || vec![1, 2, 3])?);
    /// assert!(!map.emplace("bytes", || unreachable!())?);
    /// assert_eq!(map["bytes"].len(), 3);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn emplace(&mut self, key: K, make: impl FnOnce() -> V) -> Result<bool, Error> {
        match self.entry(key)? {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(make());
                Ok(true)
            }
        }
    }

    /// Returns the value of `key`, inserting `V::default()` first if the key
    /// is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::HashMap;
    /// #
    /// let mut counts: HashMap<char, u32> = HashMap::with_capacity(16)?;
    /// for c in "hello".chars() {
    ///     *counts.get_or_insert_default(c)? += 1;
    /// }
    /// assert_eq!(counts.get(&'l'), Some(&2));
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> Result<&mut V, Error>
    where
        V: Default,
    {
        Ok(self.entry(key)?.or_default())
    }

    /// Gets the entry of `key` for in-place manipulation.
    ///
    /// # Errors
    ///
    /// Fails if the key is absent and no bucket can take it; see
    /// [`HashTable::entry`].
    pub fn entry(&mut self, key: K) -> Result<Entry<'_, K, V, B>, Error> {
        let hash = self.hash_builder.hash_one(&key);
        Ok(match self.table.entry(hash, |(k, _)| *k == key)? {
            hash_table::Entry::Occupied(inner) => Entry::Occupied(OccupiedEntry { key, inner }),
            hash_table::Entry::Vacant(inner) => Entry::Vacant(VacantEntry { key, inner }),
        })
    }

    /// Returns a reference to the value of `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and the value of `key`.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find(hash, |(k, _)| k.borrow() == key)
            .map(|(k, v)| (k, v))
    }

    /// Returns a mutable reference to the value of `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, |(k, _)| k.borrow() == key)
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value. Absent keys are ignored.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes `key`, returning the stored key and its value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, |(k, _)| k.borrow() == key)
    }
}

impl<K, Q, V, S, B> core::ops::Index<&Q> for HashMap<K, V, S, B>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
    B: BucketStorage<(K, V)>,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not present.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not present in map")
    }
}

impl<K, V, S, B: BucketStorage<(K, V)>> IntoIterator for HashMap<K, V, S, B> {
    type IntoIter = IntoIter<K, V, B>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S, B: BucketStorage<(K, V)>> IntoIterator for &'a HashMap<K, V, S, B> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, B: BucketStorage<(K, V)>> IntoIterator for &'a mut HashMap<K, V, S, B> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry of a map, which may be vacant or occupied.
///
/// Created by [`HashMap::entry`].
pub enum Entry<'a, K, V, B = HeapBuckets<(K, V)>>
where
    B: BucketStorage<(K, V)>,
{
    /// The key is absent.
    Vacant(VacantEntry<'a, K, V, B>),
    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V, B>),
}

impl<'a, K, V, B: BucketStorage<(K, V)>> Entry<'a, K, V, B> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Runs `f` on the value if the entry is occupied.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V: Default, B: BucketStorage<(K, V)>> Entry<'a, K, V, B> {
    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A vacant entry of a map. Its bucket is already reserved.
pub struct VacantEntry<'a, K, V, B = HeapBuckets<(K, V)>>
where
    B: BucketStorage<(K, V)>,
{
    key: K,
    inner: hash_table::VacantEntry<'a, (K, V), B>,
}

impl<'a, K, V, B: BucketStorage<(K, V)>> VacantEntry<'a, K, V, B> {
    /// Returns the key that would be inserted.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Takes back the key without inserting anything.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts `value` under the entry's key.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.inner.insert((self.key, value)).1
    }
}

/// An occupied entry of a map.
pub struct OccupiedEntry<'a, K, V, B = HeapBuckets<(K, V)>>
where
    B: BucketStorage<(K, V)>,
{
    key: K,
    inner: hash_table::OccupiedEntry<'a, (K, V), B>,
}

impl<'a, K, V, B: BucketStorage<(K, V)>> OccupiedEntry<'a, K, V, B> {
    /// Returns the key stored in the map.
    pub fn key(&self) -> &K {
        &self.inner.get().0
    }

    /// Returns the key that was used to look the entry up.
    pub fn lookup_key(&self) -> &K {
        &self.key
    }

    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        &self.inner.get().1
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.inner.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.inner.into_mut().1
    }

    /// Replaces the value, returning the old one.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry and returns its value.
    pub fn remove(self) -> V {
        self.inner.remove().1
    }

    /// Removes the entry and returns the stored key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.inner.remove()
    }
}

/// A position in a map. See [`hash_table::Cursor`].
pub struct Cursor<'a, K, V> {
    inner: hash_table::Cursor<'a, (K, V)>,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K, V> Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.inner.fmt(f)
    }
}

impl<'a, K, V> Cursor<'a, K, V> {
    /// Moves to the next entry, or past the back after the last one.
    pub fn move_next(&mut self) {
        self.inner.move_next();
    }

    /// Moves to the previous entry, or before the front after the first one.
    pub fn move_prev(&mut self) {
        self.inner.move_prev();
    }

    /// The key under the cursor.
    pub fn key(&self) -> Option<&'a K> {
        self.inner.get().map(|(k, _)| k)
    }

    /// The value under the cursor.
    pub fn value(&self) -> Option<&'a V> {
        self.inner.get().map(|(_, v)| v)
    }

    /// The key and value under the cursor.
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.inner.get().map(|(k, v)| (k, v))
    }

    /// The stored hash of the entry under the cursor.
    pub fn hash(&self) -> Option<u64> {
        self.inner.hash()
    }

    /// The bucket index under the cursor.
    pub fn index(&self) -> Option<usize> {
        self.inner.index()
    }

    /// Whether the cursor sits before the first entry.
    pub fn is_before_front(&self) -> bool {
        self.inner.is_before_front()
    }

    /// Whether the cursor sits past the last entry.
    pub fn is_after_back(&self) -> bool {
        self.inner.is_after_back()
    }
}

/// An iterator over the entries of a map.
pub struct Iter<'a, K, V> {
    inner: hash_table::Iter<'a, (K, V)>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// An iterator over the entries of a map with mutable values.
pub struct IterMut<'a, K, V> {
    inner: hash_table::IterMut<'a, (K, V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a map.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a map.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// An iterator over mutable references to the values of a map.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// A draining iterator over the entries of a map.
pub struct Drain<'a, K, V, B = HeapBuckets<(K, V)>>
where
    B: BucketStorage<(K, V)>,
{
    inner: hash_table::Drain<'a, (K, V), B>,
}

impl<K, V, B: BucketStorage<(K, V)>> Iterator for Drain<'_, K, V, B> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning iterator over the entries of a map.
pub struct IntoIter<K, V, B = HeapBuckets<(K, V)>>
where
    B: BucketStorage<(K, V)>,
{
    inner: hash_table::IntoIter<(K, V), B>,
}

impl<K, V, B: BucketStorage<(K, V)>> Iterator for IntoIter<K, V, B> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

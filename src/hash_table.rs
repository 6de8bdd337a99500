//! The raw leapfrog table that the maps and sets are built on.
//!
//! Every bucket stores the full hash of its node and two one-byte forward
//! displacements. An entry whose ideal bucket (`hash % capacity`) is taken by
//! someone else is placed in an overflow bucket found by a short linear probe,
//! and linked into the chain anchored at its ideal bucket: `delta1` of the
//! anchor points at the first overflow bucket, `delta2` of each overflow
//! bucket points at the next one. Lookups therefore visit the ideal bucket
//! and then only buckets that belong to the same chain.
//!
//! Removal never leaves tombstones. The freed bucket is refilled from the
//! tail of the chain it belonged to, and if the freed bucket anchors a chain
//! itself, that chain's tail is pulled back into it. This repeats until a
//! bucket with no chain attached is freed.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::marker::PhantomData;
use core::mem::MaybeUninit;

use crate::error::Error;
use crate::storage::Bucket;
use crate::storage::BucketStorage;
use crate::storage::HeapBuckets;
use crate::storage::InlineBuckets;
use crate::storage::RawStorage;

/// Largest displacement a single link can hold.
const MAX_DELTA: usize = u8::MAX as usize;

#[inline(always)]
fn ideal_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// Advances `index` by `delta` buckets, wrapping around the table.
///
/// `delta` is always smaller than `capacity`, so one subtraction is enough.
#[inline(always)]
fn step(index: usize, delta: u8, capacity: usize) -> usize {
    let next = index + delta as usize;
    if next >= capacity { next - capacity } else { next }
}

/// The link through which a bucket was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    /// The bucket is the ideal bucket of the hash.
    Ideal,
    /// Through `delta1` of the anchor at this index.
    Delta1(usize),
    /// Through `delta2` of the chain member at this index.
    Delta2(usize),
}

#[derive(Debug, Clone, Copy)]
struct Found {
    index: usize,
    link: Link,
}

/// An empty bucket chosen for a new node, together with the link that has to
/// be set so the node can be found.
#[derive(Debug, Clone, Copy)]
struct Vacancy {
    index: usize,
    link: Link,
    delta: u8,
}

impl Vacancy {
    fn claim(self, buckets: &mut [Bucket], hash: u64) {
        match self.link {
            Link::Ideal => {}
            Link::Delta1(anchor) => buckets[anchor].set_delta1(self.delta),
            Link::Delta2(tail) => buckets[tail].set_delta2(self.delta),
        }
        buckets[self.index].occupy(hash);
    }
}

enum Slot {
    Occupied(Found),
    Vacant(Vacancy),
}

fn unlink(buckets: &mut [Bucket], link: Link) {
    match link {
        Link::Ideal => {}
        Link::Delta1(anchor) => buckets[anchor].set_delta1(0),
        Link::Delta2(previous) => buckets[previous].set_delta2(0),
    }
}

/// Walks `delta2` links from `start` and returns the last bucket of the chain
/// along with the bucket linking to it. Both are `start` when `start` is
/// already the tail.
fn chain_tail(buckets: &[Bucket], start: usize) -> (usize, usize) {
    let capacity = buckets.len();
    let mut before = start;
    let mut tail = start;
    while buckets[tail].delta2() != 0 {
        before = tail;
        tail = step(tail, buckets[tail].delta2(), capacity);
    }
    (before, tail)
}

/// Linear probe for the first empty bucket after `from` that a one-byte link
/// can still reach.
fn probe_empty(buckets: &[Bucket], from: usize, populated: usize) -> Result<(usize, u8), Error> {
    let capacity = buckets.len();
    let reach = (capacity - 1).min(MAX_DELTA) as u8;
    for delta in 1..=reach {
        let index = step(from, delta, capacity);
        if !buckets[index].is_occupied() {
            return Ok((index, delta));
        }
    }

    if populated == capacity {
        Err(Error::TableFull { capacity })
    } else {
        Err(Error::ProbeChainOverflow { bucket: from })
    }
}

/// Follows the chain of `hash` looking for a node accepted by `matches`.
///
/// `matches` is only called for occupied buckets carrying the same hash.
fn find_in(
    buckets: &[Bucket],
    populated: usize,
    hash: u64,
    mut matches: impl FnMut(usize) -> bool,
) -> Option<Found> {
    if populated == 0 {
        return None;
    }

    let capacity = buckets.len();
    let anchor = ideal_index(hash, capacity);
    let bucket = &buckets[anchor];
    if bucket.is_occupied() && bucket.hash() == hash && matches(anchor) {
        return Some(Found {
            index: anchor,
            link: Link::Ideal,
        });
    }
    if bucket.delta1() == 0 {
        return None;
    }

    let mut link = Link::Delta1(anchor);
    let mut index = step(anchor, bucket.delta1(), capacity);
    loop {
        let current = &buckets[index];
        if current.is_occupied() && current.hash() == hash && matches(index) {
            return Some(Found { index, link });
        }
        if current.delta2() == 0 {
            return None;
        }
        link = Link::Delta2(index);
        index = step(index, current.delta2(), capacity);
    }
}

/// Like [`find_in`], but on a miss picks the bucket a new node with `hash`
/// would go to. Nothing is written.
fn locate(
    buckets: &[Bucket],
    populated: usize,
    hash: u64,
    mut matches: impl FnMut(usize) -> bool,
) -> Result<Slot, Error> {
    let capacity = buckets.len();
    if capacity == 0 {
        return Err(Error::TableFull { capacity });
    }

    let anchor = ideal_index(hash, capacity);
    let bucket = &buckets[anchor];
    if !bucket.is_occupied() {
        return Ok(Slot::Vacant(Vacancy {
            index: anchor,
            link: Link::Ideal,
            delta: 0,
        }));
    }
    if bucket.hash() == hash && matches(anchor) {
        return Ok(Slot::Occupied(Found {
            index: anchor,
            link: Link::Ideal,
        }));
    }
    if bucket.delta1() == 0 {
        let (index, delta) = probe_empty(buckets, anchor, populated)?;
        return Ok(Slot::Vacant(Vacancy {
            index,
            link: Link::Delta1(anchor),
            delta,
        }));
    }

    let mut link = Link::Delta1(anchor);
    let mut index = step(anchor, bucket.delta1(), capacity);
    loop {
        let current = &buckets[index];
        if current.is_occupied() && current.hash() == hash && matches(index) {
            return Ok(Slot::Occupied(Found { index, link }));
        }
        if current.delta2() == 0 {
            break;
        }
        link = Link::Delta2(index);
        index = step(index, current.delta2(), capacity);
    }

    let (vacant, delta) = probe_empty(buckets, index, populated)?;
    Ok(Slot::Vacant(Vacancy {
        index: vacant,
        link: Link::Delta2(index),
        delta,
    }))
}

/// Moves the node in `from` into the freed bucket `to`, which keeps its own
/// links. `from` stays marked occupied until the caller refills or frees it.
fn relocate<V>(buckets: &mut [Bucket], nodes: &mut [MaybeUninit<V>], from: usize, to: usize) {
    let hash = buckets[from].hash();
    buckets[to].occupy(hash);
    // SAFETY: `from` holds a live node and the node in `to` has already been
    // moved out, so nothing is duplicated or leaked.
    unsafe {
        let node = nodes[from].assume_init_read();
        nodes[to].write(node);
    }
}

/// Probe-chain statistics of a table.
///
/// Available with the `stats` feature.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, PartialEq)]
pub struct ChainStats {
    /// Number of live entries.
    pub populated: usize,
    /// Number of buckets.
    pub capacity: usize,
    /// `populated / capacity`.
    pub load_factor: f32,
    /// Entries that do not sit in their ideal bucket.
    pub overflow_entries: usize,
    /// Buckets anchoring a non-empty chain.
    pub chains: usize,
    /// Overflow buckets in the longest chain.
    pub longest_chain: usize,
    /// Largest displacement stored in any link.
    pub max_displacement: u8,
    /// `probe_histogram[n]` counts the entries reached after following `n`
    /// links from their ideal bucket.
    pub probe_histogram: Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ChainStats {
    /// Pretty-prints the statistics and the probe histogram to stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Leapfrog Chain Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Overflow: {} entries in {} chains (longest {}, max displacement {})",
            self.overflow_entries, self.chains, self.longest_chain, self.max_displacement
        );

        let max = self.probe_histogram.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!("probe histogram ({} entries):", self.populated);
        for (hops, &count) in self.probe_histogram.iter().enumerate() {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", hops, "█".repeat(width), count);
        }
    }
}

/// An open-addressing hash table using leapfrog probing.
///
/// `HashTable<V, B>` stores values of type `V` and leaves hashing and key
/// comparison to the caller: every operation takes the value's hash and an
/// equality predicate. The storage `B` decides where the buckets live:
/// [`HeapBuckets`] (the default) allocates once at construction, while
/// [`InlineBuckets`] keeps them inside the table (see [`StaticHashTable`]).
///
/// The table never grows on its own. Inserting into a table whose chains can
/// no longer be extended fails with an [`Error`] and leaves the table as it
/// was; heap-backed tables can then be [`rehash`](HashTable::rehash)ed into
/// more buckets.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use leapfrog_hash::hash_table::Entry;
/// # use leapfrog_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_str(s: &str) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     s.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table = HashTable::with_capacity(64)?;
/// let hash = hash_str("alice");
///
/// match table.entry(hash, |name: &String| name == "alice")? {
///     Entry::Vacant(entry) => {
///         entry.insert("alice".to_string());
///     }
///     Entry::Occupied(_) => unreachable!(),
/// }
///
/// assert_eq!(table.find(hash, |name| name == "alice").map(String::as_str), Some("alice"));
/// assert_eq!(table.remove(hash, |name| name == "alice").as_deref(), Some("alice"));
/// assert!(table.is_empty());
/// # Ok::<(), leapfrog_hash::Error>(())
/// ```
pub struct HashTable<V, B: BucketStorage<V> = HeapBuckets<V>> {
    storage: B,
    populated: usize,
    _phantom: PhantomData<V>,
}

/// A [`HashTable`] with `N` buckets stored inline, without heap allocation.
pub type StaticHashTable<V, const N: usize> = HashTable<V, InlineBuckets<V, N>>;

impl<V, B: BucketStorage<V>> Debug for HashTable<V, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;

        f.debug_struct("HashTable")
            .field("populated", &self.populated)
            .field("capacity", &self.capacity())
            .field(
                "buckets",
                &self
                    .storage
                    .buckets()
                    .iter()
                    .map(|b| {
                        if b.is_occupied() {
                            format!("{:016x} +{:<3} +{:<3}", b.hash(), b.delta1(), b.delta2())
                        } else {
                            String::from("................")
                        }
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<V, B> Clone for HashTable<V, B>
where
    V: Clone,
    B: BucketStorage<V>,
{
    fn clone(&self) -> Self {
        let mut table = Self {
            storage: self.storage.empty_like(),
            populated: 0,
            _phantom: PhantomData,
        };

        let src_nodes = self.storage.nodes();
        let (buckets, nodes) = table.storage.split_mut();
        for (index, bucket) in self.storage.buckets().iter().enumerate() {
            if bucket.is_occupied() {
                // SAFETY: The source bucket is occupied, so its node is live.
                let value = unsafe { src_nodes[index].assume_init_ref() }.clone();
                nodes[index].write(value);
                table.populated += 1;
            }
            // Only copied once the node is in place, so a panicking `clone`
            // leaves `table` safe to drop.
            buckets[index] = *bucket;
        }

        debug_assert_eq!(table.populated, self.populated);
        table
    }
}

impl<V, B: BucketStorage<V>> Drop for HashTable<V, B> {
    fn drop(&mut self) {
        if core::mem::needs_drop::<V>() && self.populated > 0 {
            let (buckets, nodes) = self.storage.split_mut();
            for (bucket, node) in buckets.iter().zip(nodes.iter_mut()) {
                if bucket.is_occupied() {
                    // SAFETY: Occupied buckets hold live nodes, each dropped once.
                    unsafe { node.assume_init_drop() };
                }
            }
        }
    }
}

impl<V> Default for HashTable<V> {
    /// Creates a table with zero buckets. It allocates nothing and every
    /// insertion fails until it is [`rehash`](HashTable::rehash)ed.
    fn default() -> Self {
        Self {
            storage: HeapBuckets::new(0),
            populated: 0,
            _phantom: PhantomData,
        }
    }
}

impl<V> HashTable<V> {
    /// Creates a heap-backed table with exactly `capacity` buckets.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::Error;
    /// # use leapfrog_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<u64> = HashTable::with_capacity(100)?;
    /// assert_eq!(table.capacity(), 100);
    ///
    /// assert_eq!(HashTable::<u64>::with_capacity(0).unwrap_err(), Error::ZeroCapacity);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn with_capacity(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }

        Ok(Self {
            storage: HeapBuckets::new(capacity),
            populated: 0,
            _phantom: PhantomData,
        })
    }

    /// Rebuilds the table with `new_capacity` buckets.
    ///
    /// Entries are placed again from their stored hashes, visiting the old
    /// buckets in order; no equality checks run and nothing is cloned. Asking
    /// for fewer buckets than there are entries does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `new_capacity` is zero, or
    /// [`Error::ProbeChainOverflow`] if some entry cannot be linked in the new
    /// layout. The table is left untouched on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(4)?;
    /// for n in 0..4u64 {
    ///     table.entry(n, |v: &u64| *v == n)?.or_insert(n);
    /// }
    /// assert!(table.entry(4, |v| *v == 4).is_err());
    ///
    /// table.rehash(8)?;
    /// table.entry(4, |v| *v == 4)?.or_insert(4);
    /// assert_eq!(table.len(), 5);
    /// assert_eq!(table.capacity(), 8);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn rehash(&mut self, new_capacity: usize) -> Result<(), Error> {
        if new_capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if new_capacity < self.populated {
            return Ok(());
        }

        log::debug!(
            "rehashing {} entries from {} to {} buckets",
            self.populated,
            self.capacity(),
            new_capacity
        );

        let mut fresh = HeapBuckets::<V>::new(new_capacity);
        let mut moves = Vec::with_capacity(self.populated);
        {
            let (new_buckets, _) = fresh.split_mut();
            for (old_index, bucket) in self.storage.buckets().iter().enumerate() {
                if !bucket.is_occupied() {
                    continue;
                }

                // Keys are already unique, so the new chains never need to
                // look at the nodes.
                match locate(new_buckets, moves.len(), bucket.hash(), |_| false) {
                    Ok(Slot::Vacant(vacancy)) => {
                        vacancy.claim(new_buckets, bucket.hash());
                        moves.push((old_index, vacancy.index));
                    }
                    Ok(Slot::Occupied(_)) => unreachable!("rehash never matches a node"),
                    Err(err) => {
                        log::debug!("rehash to {new_capacity} buckets abandoned: {err}");
                        return Err(err);
                    }
                }
            }
        }

        {
            let old_nodes = self.storage.nodes();
            let (_, new_nodes) = fresh.split_mut();
            for &(from, to) in &moves {
                // SAFETY: `from` is occupied in the old storage, and every node is
                // read exactly once. The old storage is released below without
                // dropping nodes.
                new_nodes[to].write(unsafe { old_nodes[from].assume_init_read() });
            }
        }

        drop(core::mem::replace(&mut self.storage, fresh));
        Ok(())
    }

    /// Moves every entry into a new table, leaving this one with no entries
    /// and zero buckets.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8)?;
    /// table.entry(1, |v: &u32| *v == 1)?.or_insert(1);
    ///
    /// let taken = table.take();
    /// assert_eq!(taken.len(), 1);
    /// assert_eq!(table.len(), 0);
    /// assert_eq!(table.capacity(), 0);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

impl<V, const N: usize> Default for HashTable<V, InlineBuckets<V, N>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, const N: usize> HashTable<V, InlineBuckets<V, N>> {
    /// Creates an empty table with `N` inline buckets.
    ///
    /// `N` must not be zero; this is checked at compile time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::hash_table::StaticHashTable;
    /// #
    /// let table: StaticHashTable<u32, 16> = StaticHashTable::new();
    /// assert_eq!(table.capacity(), 16);
    /// ```
    pub const fn new() -> Self {
        Self {
            storage: InlineBuckets::new(),
            populated: 0,
            _phantom: PhantomData,
        }
    }
}

impl<V, B: BucketStorage<V>> HashTable<V, B> {
    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the number of buckets.
    ///
    /// Every bucket can hold an entry, so this is also the most entries the
    /// table can ever hold.
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Returns `len() / capacity()`, or `0.0` for a table without buckets.
    pub fn load_factor(&self) -> f32 {
        if self.capacity() == 0 {
            0.0
        } else {
            self.populated as f32 / self.capacity() as f32
        }
    }

    /// Removes every entry, keeping the buckets.
    pub fn clear(&mut self) {
        let populated = core::mem::replace(&mut self.populated, 0);
        if populated == 0 {
            return;
        }

        let (buckets, nodes) = self.storage.split_mut();
        for (bucket, node) in buckets.iter_mut().zip(nodes.iter_mut()) {
            let occupied = bucket.is_occupied();
            *bucket = Bucket::EMPTY;
            if occupied {
                // SAFETY: The bucket was occupied and is now marked empty, so the
                // node is dropped exactly once.
                unsafe { node.assume_init_drop() };
            }
        }
    }

    /// Finds the value with `hash` accepted by `eq`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8)?;
    /// table.entry(7, |v: &(u32, &str)| v.0 == 7)?.or_insert((7, "seven"));
    ///
    /// assert_eq!(table.find(7, |v| v.0 == 7), Some(&(7, "seven")));
    /// assert_eq!(table.find(7, |v| v.0 == 8), None);
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let nodes = self.storage.nodes();
        let found = find_in(self.storage.buckets(), self.populated, hash, |index| {
            // SAFETY: `find_in` only asks about occupied buckets.
            eq(unsafe { nodes[index].assume_init_ref() })
        })?;

        // SAFETY: The found bucket is occupied.
        Some(unsafe { nodes[found.index].assume_init_ref() })
    }

    /// Finds the value with `hash` accepted by `eq`, mutably.
    ///
    /// The part of the value that `eq` and `hash` depend on must not change.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        let (_, nodes) = self.storage.split_mut();
        // SAFETY: The found bucket is occupied.
        Some(unsafe { nodes[index].assume_init_mut() })
    }

    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        self.find_found(hash, eq).map(|found| found.index)
    }

    fn find_found(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<Found> {
        let nodes = self.storage.nodes();
        find_in(self.storage.buckets(), self.populated, hash, |index| {
            // SAFETY: `find_in` only asks about occupied buckets.
            eq(unsafe { nodes[index].assume_init_ref() })
        })
    }

    /// Gets the entry for `hash`/`eq`, for in-place insertion or update.
    ///
    /// When the value is absent, the bucket it would go to is chosen now, so
    /// an [`Entry::Vacant`] is guaranteed to accept the value.
    ///
    /// # Errors
    ///
    /// If the value is absent and no bucket can take it, returns
    /// [`Error::TableFull`] when every bucket is occupied or
    /// [`Error::ProbeChainOverflow`] when the free buckets are out of reach of
    /// a one-byte link. The table is unchanged either way.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use leapfrog_hash::hash_table::Entry;
    /// # use leapfrog_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(8)?;
    /// match table.entry(3, |v: &u8| *v == 3)? {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert(3);
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    /// assert!(matches!(table.entry(3, |v| *v == 3)?, Entry::Occupied(_)));
    /// # Ok::<(), leapfrog_hash::Error>(())
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Result<Entry<'_, V, B>, Error> {
        let slot = {
            let nodes = self.storage.nodes();
            locate(self.storage.buckets(), self.populated, hash, |index| {
                // SAFETY: `locate` only asks about occupied buckets.
                eq(unsafe { nodes[index].assume_init_ref() })
            })
        };

        match slot {
            Ok(Slot::Occupied(found)) => Ok(Entry::Occupied(OccupiedEntry { table: self, found })),
            Ok(Slot::Vacant(vacancy)) => Ok(Entry::Vacant(VacantEntry {
                table: self,
                hash,
                vacancy,
            })),
            Err(err) => {
                log::debug!("cannot place hash {hash:#018x}: {err}");
                Err(err)
            }
        }
    }

    /// Removes and returns the value with `hash` accepted by `eq`.
    ///
    /// Removing an absent value returns `None` and changes nothing.
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let found = self.find_found(hash, eq)?;
        Some(self.remove_found(found))
    }

    fn remove_found(&mut self, found: Found) -> V {
        let (buckets, nodes) = self.storage.split_mut();
        let capacity = buckets.len();

        // SAFETY: `found` comes from a lookup, so the node is live. The bucket is
        // refilled or marked empty below.
        let value = unsafe { nodes[found.index].assume_init_read() };

        let mut vacant = found.index;
        if ideal_index(buckets[vacant].hash(), capacity) != vacant {
            if buckets[vacant].delta2() == 0 {
                unlink(buckets, found.link);
            } else {
                // Refill from the tail of the same chain so the links into
                // `vacant` stay valid.
                let (before_tail, tail) = chain_tail(buckets, vacant);
                buckets[before_tail].set_delta2(0);
                relocate(buckets, nodes, tail, vacant);
                vacant = tail;
            }
        }

        // A freed anchor pulls the tail of its chain home. Every round unlinks
        // one overflow bucket.
        while buckets[vacant].delta1() != 0 {
            let first = step(vacant, buckets[vacant].delta1(), capacity);
            let (before_tail, tail) = chain_tail(buckets, first);
            if tail == first {
                buckets[vacant].set_delta1(0);
            } else {
                buckets[before_tail].set_delta2(0);
            }
            relocate(buckets, nodes, tail, vacant);
            vacant = tail;
        }

        buckets[vacant].vacate();
        self.populated -= 1;
        value
    }

    /// Returns an iterator over the values, in bucket order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.storage.buckets().iter().zip(self.storage.nodes()),
            remaining: self.populated,
        }
    }

    /// Returns an iterator over mutable references to the values, in bucket
    /// order.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        let remaining = self.populated;
        let (buckets, nodes) = self.storage.split_mut();
        IterMut {
            inner: buckets.iter().zip(nodes.iter_mut()),
            remaining,
        }
    }

    /// Removes every value, returning them through an iterator. Values not
    /// consumed are dropped when the iterator is.
    ///
    /// The table is emptied before the first value is yielded: its buckets
    /// are swapped for empty ones and handed back once the iterator is
    /// dropped. Leaking the iterator leaks the drained values but leaves an
    /// empty, consistent table behind.
    pub fn drain(&mut self) -> Drain<'_, V, B> {
        let storage = self.storage.empty_like();
        let drained = HashTable {
            storage: core::mem::replace(&mut self.storage, storage),
            populated: core::mem::replace(&mut self.populated, 0),
            _phantom: PhantomData,
        };
        Drain {
            table: self,
            drained,
            next_index: 0,
        }
    }

    /// Moves the next live node at or after `*next_index` out of the table.
    fn take_next(&mut self, next_index: &mut usize) -> Option<V> {
        if self.populated == 0 {
            return None;
        }

        let (buckets, nodes) = self.storage.split_mut();
        while *next_index < buckets.len() {
            let index = *next_index;
            *next_index += 1;
            if buckets[index].is_occupied() {
                buckets[index] = Bucket::EMPTY;
                self.populated -= 1;
                // SAFETY: The bucket was occupied and has just been emptied.
                return Some(unsafe { nodes[index].assume_init_read() });
            }
        }

        None
    }

    /// Cursor on the first entry, or past the end if the table is empty.
    pub fn cursor_front(&self) -> Cursor<'_, V> {
        let mut cursor = self.cursor_before_front();
        cursor.move_next();
        cursor
    }

    /// Cursor on the last entry, or before the start if the table is empty.
    pub fn cursor_back(&self) -> Cursor<'_, V> {
        let mut cursor = self.cursor_after_back();
        cursor.move_prev();
        cursor
    }

    /// Cursor past the last entry.
    pub fn cursor_after_back(&self) -> Cursor<'_, V> {
        Cursor {
            buckets: self.storage.buckets(),
            nodes: self.storage.nodes(),
            position: Position::AfterBack,
        }
    }

    /// Cursor before the first entry.
    pub fn cursor_before_front(&self) -> Cursor<'_, V> {
        Cursor {
            buckets: self.storage.buckets(),
            nodes: self.storage.nodes(),
            position: Position::BeforeFront,
        }
    }

    /// Collects probe-chain statistics.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_stats(&self) -> ChainStats {
        let buckets = self.storage.buckets();
        let capacity = buckets.len();

        let mut histogram = alloc::vec![0usize; 1];
        let mut chains = 0;
        let mut longest_chain = 0;
        let mut overflow_entries = 0;
        let mut max_displacement = 0;

        for (index, bucket) in buckets.iter().enumerate() {
            max_displacement = max_displacement.max(bucket.delta1()).max(bucket.delta2());
            if bucket.is_occupied() && ideal_index(bucket.hash(), capacity) == index {
                histogram[0] += 1;
            }
            if bucket.delta1() == 0 {
                continue;
            }

            chains += 1;
            let mut hops = 1;
            let mut member = step(index, bucket.delta1(), capacity);
            loop {
                if histogram.len() <= hops {
                    histogram.resize(hops + 1, 0);
                }
                histogram[hops] += 1;
                overflow_entries += 1;

                let delta = buckets[member].delta2();
                if delta == 0 {
                    break;
                }
                hops += 1;
                member = step(member, delta, capacity);
            }
            longest_chain = longest_chain.max(hops);
        }

        ChainStats {
            populated: self.populated,
            capacity,
            load_factor: self.load_factor(),
            overflow_entries,
            chains,
            longest_chain,
            max_displacement,
            probe_histogram: histogram,
        }
    }

    /// Walks every chain and panics if the bucket metadata is inconsistent.
    #[cfg(test)]
    pub(crate) fn check_chains(&self) {
        let buckets = self.storage.buckets();
        let capacity = buckets.len();
        let mut reached = alloc::vec![false; capacity];
        let mut occupied = 0;

        for (index, bucket) in buckets.iter().enumerate() {
            if !bucket.is_occupied() {
                assert_eq!(
                    (bucket.delta1(), bucket.delta2()),
                    (0, 0),
                    "empty bucket {index} carries links: {self:#?}"
                );
                continue;
            }

            occupied += 1;
            if ideal_index(bucket.hash(), capacity) == index {
                assert_eq!(bucket.delta2(), 0, "home bucket {index} continues a chain");
            }

            if bucket.delta1() == 0 {
                continue;
            }
            let mut member = step(index, bucket.delta1(), capacity);
            loop {
                assert!(
                    !reached[member],
                    "bucket {member} reached twice (chain of {index}): {self:#?}"
                );
                reached[member] = true;
                assert!(buckets[member].is_occupied(), "chain of {index} reaches empty bucket {member}");
                assert_eq!(
                    ideal_index(buckets[member].hash(), capacity),
                    index,
                    "bucket {member} sits in the wrong chain"
                );
                match buckets[member].delta2() {
                    0 => break,
                    delta => member = step(member, delta, capacity),
                }
            }
        }

        assert_eq!(occupied, self.populated, "populated count drifted");
        for (index, bucket) in buckets.iter().enumerate() {
            if bucket.is_occupied() && ideal_index(bucket.hash(), capacity) != index {
                assert!(reached[index], "overflow bucket {index} is unreachable: {self:#?}");
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn bucket_snapshot(&self) -> Vec<Bucket> {
        self.storage.buckets().to_vec()
    }
}

/// A view into a single entry of a [`HashTable`], which may be vacant or
/// occupied.
///
/// Created by [`HashTable::entry`].
pub enum Entry<'a, V, B: BucketStorage<V> = HeapBuckets<V>> {
    /// The value is absent.
    Vacant(VacantEntry<'a, V, B>),
    /// The value is present.
    Occupied(OccupiedEntry<'a, V, B>),
}

impl<'a, V, B: BucketStorage<V>> Entry<'a, V, B> {
    /// Inserts `default` if the entry is vacant, and returns a mutable
    /// reference to the value either way.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Inserts the result of `default` if the entry is vacant, and returns a
    /// mutable reference to the value either way.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default()),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Runs `f` on the value if the entry is occupied.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }
}

impl<'a, V: Default, B: BucketStorage<V>> Entry<'a, V, B> {
    /// Inserts `V::default()` if the entry is vacant, and returns a mutable
    /// reference to the value either way.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(V::default)
    }
}

/// A vacant entry of a [`HashTable`]. Its bucket is already chosen.
pub struct VacantEntry<'a, V, B: BucketStorage<V> = HeapBuckets<V>> {
    table: &'a mut HashTable<V, B>,
    hash: u64,
    vacancy: Vacancy,
}

impl<'a, V, B: BucketStorage<V>> VacantEntry<'a, V, B> {
    /// The hash the entry was looked up with.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// The bucket the value will be stored in.
    pub fn index(&self) -> usize {
        self.vacancy.index
    }

    /// Stores `value` and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        table.populated += 1;
        let (buckets, nodes) = table.storage.split_mut();
        self.vacancy.claim(buckets, self.hash);
        nodes[self.vacancy.index].write(value)
    }
}

/// An occupied entry of a [`HashTable`].
pub struct OccupiedEntry<'a, V, B: BucketStorage<V> = HeapBuckets<V>> {
    table: &'a mut HashTable<V, B>,
    found: Found,
}

impl<'a, V, B: BucketStorage<V>> OccupiedEntry<'a, V, B> {
    /// The hash stored with the value.
    pub fn hash(&self) -> u64 {
        self.table.storage.buckets()[self.found.index].hash()
    }

    /// The bucket holding the value.
    pub fn index(&self) -> usize {
        self.found.index
    }

    /// Gets a reference to the value.
    pub fn get(&self) -> &V {
        // SAFETY: The entry's bucket is occupied for as long as the entry lives.
        unsafe { self.table.storage.nodes()[self.found.index].assume_init_ref() }
    }

    /// Gets a mutable reference to the value.
    pub fn get_mut(&mut self) -> &mut V {
        let (_, nodes) = self.table.storage.split_mut();
        // SAFETY: The entry's bucket is occupied for as long as the entry lives.
        unsafe { nodes[self.found.index].assume_init_mut() }
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut V {
        let table = self.table;
        let (_, nodes) = table.storage.split_mut();
        // SAFETY: The entry's bucket is occupied.
        unsafe { nodes[self.found.index].assume_init_mut() }
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        self.table.remove_found(self.found)
    }
}

/// An iterator over the values of a [`HashTable`], in bucket order.
///
/// Created by [`HashTable::iter`]. Iterates from either end.
pub struct Iter<'a, V> {
    inner: core::iter::Zip<core::slice::Iter<'a, Bucket>, core::slice::Iter<'a, MaybeUninit<V>>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (bucket, node) in self.inner.by_ref() {
            if bucket.is_occupied() {
                self.remaining -= 1;
                // SAFETY: Occupied buckets hold live nodes.
                return Some(unsafe { node.assume_init_ref() });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while let Some((bucket, node)) = self.inner.next_back() {
            if bucket.is_occupied() {
                self.remaining -= 1;
                // SAFETY: Occupied buckets hold live nodes.
                return Some(unsafe { node.assume_init_ref() });
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> core::iter::FusedIterator for Iter<'_, V> {}

/// A mutable iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`].
pub struct IterMut<'a, V> {
    inner:
        core::iter::Zip<core::slice::Iter<'a, Bucket>, core::slice::IterMut<'a, MaybeUninit<V>>>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        for (bucket, node) in self.inner.by_ref() {
            if bucket.is_occupied() {
                self.remaining -= 1;
                // SAFETY: Occupied buckets hold live nodes, and each node is
                // handed out once.
                return Some(unsafe { node.assume_init_mut() });
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while let Some((bucket, node)) = self.inner.next_back() {
            if bucket.is_occupied() {
                self.remaining -= 1;
                // SAFETY: As in `next`.
                return Some(unsafe { node.assume_init_mut() });
            }
        }
        None
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

/// A draining iterator over the values of a [`HashTable`].
///
/// Created by [`HashTable::drain`]. The table is empty once the iterator is
/// dropped.
pub struct Drain<'a, V, B: BucketStorage<V> = HeapBuckets<V>> {
    table: &'a mut HashTable<V, B>,
    drained: HashTable<V, B>,
    next_index: usize,
}

impl<V, B: BucketStorage<V>> Iterator for Drain<'_, V, B> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.drained.take_next(&mut self.next_index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.drained.populated, Some(self.drained.populated))
    }
}

impl<V, B: BucketStorage<V>> ExactSizeIterator for Drain<'_, V, B> {}

impl<V, B: BucketStorage<V>> Drop for Drain<'_, V, B> {
    fn drop(&mut self) {
        self.drained.clear();
        // Hand the original, now empty, buckets back to the table.
        core::mem::swap(&mut self.table.storage, &mut self.drained.storage);
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V, B: BucketStorage<V> = HeapBuckets<V>> {
    table: HashTable<V, B>,
    next_index: usize,
}

impl<V, B: BucketStorage<V>> Iterator for IntoIter<V, B> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.take_next(&mut self.next_index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V, B: BucketStorage<V>> ExactSizeIterator for IntoIter<V, B> {}

impl<V, B: BucketStorage<V>> IntoIterator for HashTable<V, B> {
    type IntoIter = IntoIter<V, B>;
    type Item = V;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            table: self,
            next_index: 0,
        }
    }
}

impl<'a, V, B: BucketStorage<V>> IntoIterator for &'a HashTable<V, B> {
    type IntoIter = Iter<'a, V>;
    type Item = &'a V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V, B: BucketStorage<V>> IntoIterator for &'a mut HashTable<V, B> {
    type IntoIter = IterMut<'a, V>;
    type Item = &'a mut V;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    BeforeFront,
    At(usize),
    AfterBack,
}

/// A position in a [`HashTable`]: on an entry, before the first one, or
/// past the last one.
///
/// Moving past either end parks the cursor on the matching sentinel
/// position. Two cursors compare equal when they are both before the front,
/// both past the back, or on the same bucket of the same table.
pub struct Cursor<'a, V> {
    buckets: &'a [Bucket],
    nodes: &'a [MaybeUninit<V>],
    position: Position,
}

impl<V> Clone for Cursor<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Cursor<'_, V> {}

impl<V> PartialEq for Cursor<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self.position, other.position) {
            (Position::BeforeFront, Position::BeforeFront) => true,
            (Position::AfterBack, Position::AfterBack) => true,
            (Position::At(a), Position::At(b)) => {
                core::ptr::eq(self.buckets.as_ptr(), other.buckets.as_ptr()) && a == b
            }
            _ => false,
        }
    }
}

impl<V> Eq for Cursor<'_, V> {}

impl<V> Debug for Cursor<'_, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Cursor").field(&self.position).finish()
    }
}

impl<'a, V> Cursor<'a, V> {
    /// Moves to the next entry, or past the back after the last one.
    pub fn move_next(&mut self) {
        let start = match self.position {
            Position::BeforeFront => 0,
            Position::At(index) => index + 1,
            Position::AfterBack => return,
        };
        self.position = self.buckets[start..]
            .iter()
            .position(Bucket::is_occupied)
            .map_or(Position::AfterBack, |offset| Position::At(start + offset));
    }

    /// Moves to the previous entry, or before the front after the first one.
    pub fn move_prev(&mut self) {
        let end = match self.position {
            Position::BeforeFront => return,
            Position::At(index) => index,
            Position::AfterBack => self.buckets.len(),
        };
        self.position = self.buckets[..end]
            .iter()
            .rposition(Bucket::is_occupied)
            .map_or(Position::BeforeFront, Position::At);
    }

    /// The value under the cursor.
    pub fn get(&self) -> Option<&'a V> {
        match self.position {
            // SAFETY: Cursors only stop on occupied buckets.
            Position::At(index) => Some(unsafe { self.nodes[index].assume_init_ref() }),
            _ => None,
        }
    }

    /// The bucket index under the cursor.
    pub fn index(&self) -> Option<usize> {
        match self.position {
            Position::At(index) => Some(index),
            _ => None,
        }
    }

    /// The hash stored with the value under the cursor.
    pub fn hash(&self) -> Option<u64> {
        self.index().map(|index| self.buckets[index].hash())
    }

    /// Whether the cursor sits before the first entry.
    pub fn is_before_front(&self) -> bool {
        self.position == Position::BeforeFront
    }

    /// Whether the cursor sits past the last entry.
    pub fn is_after_back(&self) -> bool {
        self.position == Position::AfterBack
    }
}

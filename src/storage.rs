//! Bucket storage backends.
//!
//! A table keeps two parallel arrays of the same length: the bucket metadata
//! ([`Bucket`]) and the node payloads. [`HeapBuckets`] places both in a single
//! heap allocation sized at runtime, while [`InlineBuckets`] embeds them in
//! the table value itself with the capacity fixed at compile time.
//!
//! Storages never drop payloads. Which nodes are initialized is tracked by
//! the metadata, and the owning table is responsible for dropping them.

use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::fmt::Debug;
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

/// Metadata for one bucket of a table.
///
/// `delta1` links the bucket, as the ideal position of its chain, to the
/// first overflow bucket of that chain. `delta2` links a bucket that is
/// itself part of a chain to the next bucket of the same chain. Both are
/// forward displacements modulo the capacity, with `0` meaning "no link".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    hash: u64,
    delta1: u8,
    delta2: u8,
    occupied: bool,
}

impl Bucket {
    /// An unoccupied bucket with no links.
    pub const EMPTY: Bucket = Bucket {
        hash: 0,
        delta1: 0,
        delta2: 0,
        occupied: false,
    };

    /// Hash of the node stored in this bucket.
    ///
    /// Meaningless while the bucket is unoccupied.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Displacement to the first overflow bucket of the chain anchored here.
    #[inline]
    pub fn delta1(&self) -> u8 {
        self.delta1
    }

    /// Displacement to the next bucket of the chain this bucket belongs to.
    #[inline]
    pub fn delta2(&self) -> u8 {
        self.delta2
    }

    /// Whether a node is stored in this bucket.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    #[inline]
    pub(crate) fn set_delta1(&mut self, delta: u8) {
        self.delta1 = delta;
    }

    #[inline]
    pub(crate) fn set_delta2(&mut self, delta: u8) {
        self.delta2 = delta;
    }

    /// Marks the bucket occupied by a node with `hash`, keeping its links.
    #[inline]
    pub(crate) fn occupy(&mut self, hash: u64) {
        self.hash = hash;
        self.occupied = true;
    }

    #[inline]
    pub(crate) fn vacate(&mut self) {
        self.occupied = false;
    }
}

mod private {
    use core::mem::MaybeUninit;

    use super::Bucket;

    /// Raw access used by the table. Not reachable from outside the crate.
    pub trait RawStorage<V> {
        fn capacity(&self) -> usize;

        fn buckets(&self) -> &[Bucket];

        fn nodes(&self) -> &[MaybeUninit<V>];

        fn split_mut(&mut self) -> (&mut [Bucket], &mut [MaybeUninit<V>]);

        /// Fresh storage with the same capacity and every bucket empty.
        fn empty_like(&self) -> Self
        where
            Self: Sized;
    }
}

pub(crate) use private::RawStorage;

/// Backing storage of a table.
///
/// Implemented by [`HeapBuckets`] and [`InlineBuckets`] only.
pub trait BucketStorage<V>: RawStorage<V> {}

#[derive(Debug, Clone, Copy)]
struct DataLayout {
    layout: Layout,
    nodes_offset: usize,
}

impl DataLayout {
    fn new<V>(capacity: usize) -> Self {
        let buckets_layout = Layout::array::<Bucket>(capacity).expect("allocation size overflow");
        let nodes_layout =
            Layout::array::<MaybeUninit<V>>(capacity).expect("allocation size overflow");

        let (layout, nodes_offset) = buckets_layout
            .extend(nodes_layout)
            .expect("allocation size overflow");

        DataLayout {
            layout,
            nodes_offset,
        }
    }
}

/// Heap-allocated storage whose capacity is chosen at runtime.
pub struct HeapBuckets<V> {
    layout: DataLayout,
    alloc: NonNull<u8>,
    capacity: usize,
    _phantom: PhantomData<V>,
}

// SAFETY: `HeapBuckets` uniquely owns its allocation, like a `Box<[V]>`.
unsafe impl<V: Send> Send for HeapBuckets<V> {}
// SAFETY: Shared access only hands out shared references.
unsafe impl<V: Sync> Sync for HeapBuckets<V> {}

impl<V> HeapBuckets<V> {
    /// Allocates `capacity` empty buckets. A capacity of zero allocates
    /// nothing.
    pub(crate) fn new(capacity: usize) -> Self {
        let layout = DataLayout::new::<V>(capacity);
        let alloc = if capacity == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: `capacity > 0` and `Bucket` is not zero-sized, so the layout
            // has a non-zero size. Allocation failure is routed to
            // `handle_alloc_error`. Every bucket is initialized before the
            // pointer escapes.
            unsafe {
                let raw_alloc = alloc::alloc::alloc(layout.layout);
                if raw_alloc.is_null() {
                    handle_alloc_error(layout.layout);
                }

                let buckets = raw_alloc.cast::<Bucket>();
                for index in 0..capacity {
                    buckets.add(index).write(Bucket::EMPTY);
                }

                NonNull::new_unchecked(raw_alloc)
            }
        };

        Self {
            layout,
            alloc,
            capacity,
            _phantom: PhantomData,
        }
    }
}

impl<V> Drop for HeapBuckets<V> {
    fn drop(&mut self) {
        if self.capacity != 0 {
            // SAFETY: The allocation was made in `new` with this exact layout.
            unsafe {
                alloc::alloc::dealloc(self.alloc.as_ptr(), self.layout.layout);
            }
        }
    }
}

impl<V> Debug for HeapBuckets<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeapBuckets")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<V> RawStorage<V> for HeapBuckets<V> {
    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn buckets(&self) -> &[Bucket] {
        if self.capacity == 0 {
            return &[];
        }
        // SAFETY: The allocation starts with `capacity` initialized buckets.
        unsafe { core::slice::from_raw_parts(self.alloc.as_ptr().cast(), self.capacity) }
    }

    #[inline]
    fn nodes(&self) -> &[MaybeUninit<V>] {
        if self.capacity == 0 {
            return &[];
        }
        // SAFETY: The node array lives at `nodes_offset` and holds `capacity`
        // elements. `MaybeUninit` has no validity requirements.
        unsafe {
            core::slice::from_raw_parts(
                self.alloc.as_ptr().add(self.layout.nodes_offset).cast(),
                self.capacity,
            )
        }
    }

    #[inline]
    fn split_mut(&mut self) -> (&mut [Bucket], &mut [MaybeUninit<V>]) {
        if self.capacity == 0 {
            return (&mut [], &mut []);
        }
        // SAFETY: The two arrays occupy disjoint ranges of the allocation, so
        // the mutable slices never alias.
        unsafe {
            let base = self.alloc.as_ptr();
            (
                core::slice::from_raw_parts_mut(base.cast(), self.capacity),
                core::slice::from_raw_parts_mut(
                    base.add(self.layout.nodes_offset).cast(),
                    self.capacity,
                ),
            )
        }
    }

    fn empty_like(&self) -> Self {
        Self::new(self.capacity)
    }
}

impl<V> BucketStorage<V> for HeapBuckets<V> {}

/// Storage embedded in the table value, holding exactly `N` buckets.
///
/// Tables backed by this storage never allocate.
pub struct InlineBuckets<V, const N: usize> {
    buckets: [Bucket; N],
    nodes: [MaybeUninit<V>; N],
}

impl<V, const N: usize> InlineBuckets<V, N> {
    pub(crate) const fn new() -> Self {
        const { assert!(N > 0, "inline storage needs at least one bucket") };

        Self {
            buckets: [Bucket::EMPTY; N],
            nodes: [const { MaybeUninit::uninit() }; N],
        }
    }
}

impl<V, const N: usize> Debug for InlineBuckets<V, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InlineBuckets")
            .field("capacity", &N)
            .finish_non_exhaustive()
    }
}

impl<V, const N: usize> RawStorage<V> for InlineBuckets<V, N> {
    #[inline]
    fn capacity(&self) -> usize {
        N
    }

    #[inline]
    fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    #[inline]
    fn nodes(&self) -> &[MaybeUninit<V>] {
        &self.nodes
    }

    #[inline]
    fn split_mut(&mut self) -> (&mut [Bucket], &mut [MaybeUninit<V>]) {
        (&mut self.buckets, &mut self.nodes)
    }

    fn empty_like(&self) -> Self {
        Self::new()
    }
}

impl<V, const N: usize> BucketStorage<V> for InlineBuckets<V, N> {}

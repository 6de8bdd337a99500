/// Errors reported by table construction and insertion.
///
/// Looking up, or removing, a key that is not present is not an error; those
/// operations return `Option` or `bool`. Every failing operation leaves the
/// table exactly as it was before the call.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A table was requested with zero buckets.
    #[error("zero is not a valid capacity")]
    ZeroCapacity,

    /// Linking a new entry would need a displacement that does not fit in
    /// a single byte.
    ///
    /// The chain that needed extending ends at `bucket`, and no empty bucket
    /// lies within 255 buckets after it. Rehashing into a larger table and
    /// retrying is the usual remedy.
    #[error("probe chain ending at bucket {bucket} cannot reach a free bucket within 255 slots")]
    ProbeChainOverflow {
        /// Index of the bucket whose displacement would have overflowed.
        bucket: usize,
    },

    /// Every bucket is occupied.
    #[error("all {capacity} buckets are occupied")]
    TableFull {
        /// Number of buckets in the table.
        capacity: usize,
    },
}

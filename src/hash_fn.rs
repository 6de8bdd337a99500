//! Hash strategies that can be plugged into the tables.
//!
//! Each strategy is a [`Hasher`] fed with the key's bytes through the regular
//! [`Hash`](core::hash::Hash) machinery, so a fixed-size key contributes its
//! raw bytes and a container key (such as `str` or `[u8]`) contributes its
//! elements. Use them through the `Build*` aliases, which are
//! [`BuildHasherDefault`] instances.
//!
//! The shift-add-XOR, Jenkins and FNV-1a mixes work on a 32-bit state. The
//! identity, fixed and modulo strategies exist to provoke clustering on
//! purpose and are mostly useful for testing.

use core::hash::BuildHasherDefault;
use core::hash::Hasher;

/// Shift-add-XOR hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct SaxHasher {
    state: u32,
}

impl Hasher for SaxHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= (self.state << 5)
                .wrapping_add(self.state >> 2)
                .wrapping_add(u32::from(byte));
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }
}

/// Jenkins one-at-a-time hasher.
///
/// The final avalanche step is applied in [`finish`](Hasher::finish), so more
/// bytes may still be written afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct JenkinsHasher {
    state: u32,
}

impl Hasher for JenkinsHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = self.state.wrapping_add(u32::from(byte));
            self.state = self.state.wrapping_add(self.state << 10);
            self.state ^= self.state >> 6;
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        let mut hash = self.state;
        hash = hash.wrapping_add(hash << 3);
        hash ^= hash >> 11;
        hash = hash.wrapping_add(hash << 15);
        u64::from(hash)
    }
}

const FNV1A_SEED: u32 = 0x811C_9DC5;
const FNV1A_PRIME: u32 = 0x0100_0193;

/// 32-bit Fowler-Noll-Vo (FNV-1a) hasher.
#[derive(Debug, Clone, Copy)]
pub struct Fnv1aHasher {
    state: u32,
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self { state: FNV1A_SEED }
    }
}

impl Hasher for Fnv1aHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state = (self.state ^ u32::from(byte)).wrapping_mul(FNV1A_PRIME);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        u64::from(self.state)
    }
}

/// Returns integer keys unchanged.
///
/// A single integer written into a fresh hasher comes back as-is. Further
/// input is shifted in after it, so multi-part keys such as strings still
/// depend on (at least) their last eight bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityHasher {
    state: u64,
}

impl IdentityHasher {
    #[inline]
    fn fold(&mut self, value: u64, bits: u32) {
        self.state = self.state.checked_shl(bits).unwrap_or(0) | value;
    }
}

impl Hasher for IdentityHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.fold(u64::from(byte), 8);
        }
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.fold(u64::from(i), u8::BITS);
    }

    #[inline]
    fn write_u16(&mut self, i: u16) {
        self.fold(u64::from(i), u16::BITS);
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.fold(u64::from(i), u32::BITS);
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.fold(i, u64::BITS);
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.fold(i as u64, usize::BITS);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.state
    }
}

/// Sends every key to the first bucket.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedHasher;

impl Hasher for FixedHasher {
    #[inline]
    fn write(&mut self, _bytes: &[u8]) {}

    #[inline]
    fn finish(&self) -> u64 {
        0
    }
}

/// Identity hash reduced modulo `M`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ModuloHasher<const M: u64> {
    inner: IdentityHasher,
}

impl<const M: u64> Hasher for ModuloHasher<M> {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        self.inner.write(bytes);
    }

    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.inner.write_u8(i);
    }

    #[inline]
    fn write_u16(&mut self, i: u16) {
        self.inner.write_u16(i);
    }

    #[inline]
    fn write_u32(&mut self, i: u32) {
        self.inner.write_u32(i);
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.inner.write_u64(i);
    }

    #[inline]
    fn write_usize(&mut self, i: usize) {
        self.inner.write_usize(i);
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.inner.finish() % M
    }
}

/// Builder for [`SaxHasher`].
pub type BuildSaxHasher = BuildHasherDefault<SaxHasher>;
/// Builder for [`JenkinsHasher`].
pub type BuildJenkinsHasher = BuildHasherDefault<JenkinsHasher>;
/// Builder for [`Fnv1aHasher`].
pub type BuildFnv1aHasher = BuildHasherDefault<Fnv1aHasher>;
/// Builder for [`IdentityHasher`].
pub type BuildIdentityHasher = BuildHasherDefault<IdentityHasher>;
/// Builder for [`FixedHasher`].
pub type BuildFixedHasher = BuildHasherDefault<FixedHasher>;
/// Builder for [`ModuloHasher`].
pub type BuildModuloHasher<const M: u64> = BuildHasherDefault<ModuloHasher<M>>;

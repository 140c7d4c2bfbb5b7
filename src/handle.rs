//! `Option<BitSet>` as a nullable bitset handle.
//!
//! A `None` handle reads as an empty bitset: nothing is set, the popcount
//! is 0 and there is no capacity. Operations that only ever remove bits are
//! no-ops on `None`. Setting a bit through a `None` heap handle allocates a
//! fresh heap bitset first.

use crate::bitset::{BitSet, HeapBitSet, byte_count};
use crate::buffer::ByteBuffer;
use crate::error::Result;

/// Read and shrink operations on a possibly absent bitset.
///
/// # Examples
/// ```
/// use lazy_bitset::{BitSetHandle, HeapBitSet};
///
/// let mut handle: Option<HeapBitSet> = None;
/// assert_eq!(handle.popcount(), 0);
/// assert!(!handle.test(7));
/// handle.reset(7);
/// handle.clear();
/// assert!(handle.shrink().is_none());
/// ```
pub trait BitSetHandle {
    /// The buffer type of the bitset behind the handle.
    type Buffer: ByteBuffer;

    /// Number of set bits, 0 for `None`.
    fn popcount(&self) -> usize;

    /// Whether the bit at `idx` is set, `false` for `None`.
    fn test(&self, idx: usize) -> bool;

    /// Addressable bits without another allocation, 0 for `None`.
    fn capacity(&self) -> usize;

    /// Unsets the bit at `idx`; no-op for `None`.
    fn reset(&mut self, idx: usize);

    /// Unsets every bit; no-op for `None`.
    fn clear(&mut self);

    /// Releases unused capacity and returns the bitset, `None` for `None`.
    fn shrink(&mut self) -> Option<&mut BitSet<Self::Buffer>>;

    /// Copies the bitset onto the heap; `None` duplicates to `None`.
    fn duplicate(&self) -> Result<Option<HeapBitSet>>;
}

impl<B: ByteBuffer> BitSetHandle for Option<BitSet<B>> {
    type Buffer = B;

    #[inline]
    fn popcount(&self) -> usize {
        self.as_ref().map_or(0, BitSet::popcount)
    }

    #[inline]
    fn test(&self, idx: usize) -> bool {
        self.as_ref().is_some_and(|bitset| bitset.test(idx))
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.as_ref().map_or(0, BitSet::capacity)
    }

    fn reset(&mut self, idx: usize) {
        if let Some(bitset) = self {
            bitset.reset(idx);
        }
    }

    fn clear(&mut self) {
        if let Some(bitset) = self {
            bitset.clear();
        }
    }

    fn shrink(&mut self) -> Option<&mut BitSet<B>> {
        self.as_mut().map(BitSet::shrink)
    }

    fn duplicate(&self) -> Result<Option<HeapBitSet>> {
        self.as_ref().map(BitSet::duplicate).transpose()
    }
}

/// Growing operations on a possibly absent heap bitset.
///
/// Only heap handles get these: a `None` handle is replaced by a freshly
/// allocated heap bitset before the bit is written. Stack bitsets need a
/// caller-provided region and so are never created implicitly.
///
/// # Examples
/// ```
/// use lazy_bitset::{BitSetHandle, HeapBitSet, HeapBitSetHandle};
///
/// let mut handle: Option<HeapBitSet> = None;
/// handle.set(12).unwrap();
/// assert!(handle.test(12));
/// assert_eq!(handle.popcount(), 1);
/// ```
pub trait HeapBitSetHandle {
    /// Sets the bit at `idx`, allocating the bitset if the handle is `None`.
    ///
    /// On failure the handle is left as it was: still `None` if the initial
    /// allocation failed, or the unchanged bitset if growing failed.
    fn set(&mut self, idx: usize) -> Result<()>;

    /// Materializes storage up to bit `idx` without changing its value,
    /// allocating the bitset if the handle is `None`.
    fn eval(&mut self, idx: usize) -> Result<()>;
}

impl HeapBitSetHandle for Option<HeapBitSet> {
    fn set(&mut self, idx: usize) -> Result<()> {
        materialized(self, idx)?.set(idx)
    }

    fn eval(&mut self, idx: usize) -> Result<()> {
        materialized(self, idx)?.eval(idx)
    }
}

/// Returns the bitset behind `handle`, first allocating one with room for
/// bit `idx` if the handle is `None`.
fn materialized(handle: &mut Option<HeapBitSet>, idx: usize) -> Result<&mut HeapBitSet> {
    let bitset = match handle.take() {
        Some(bitset) => bitset,
        None => HeapBitSet::with_capacity(byte_count(idx.saturating_add(1)).saturating_mul(8))?,
    };
    Ok(handle.insert(bitset))
}

/// Releases every bitset in `handles`, leaving each handle `None`.
///
/// Dropping a bitset releases it too; this is for callers holding several
/// nullable handles that should all read as empty afterwards.
///
/// # Examples
/// ```
/// use lazy_bitset::{BitSetHandle, HeapBitSet, HeapBitSetHandle, free_all};
///
/// let mut a: Option<HeapBitSet> = None;
/// let mut b: Option<HeapBitSet> = None;
/// a.set(1).unwrap();
/// b.set(2).unwrap();
/// free_all([&mut a, &mut b]);
/// assert!(a.is_none() && b.is_none());
/// assert_eq!(b.popcount(), 0);
/// ```
pub fn free_all<'a, I>(handles: I)
where
    I: IntoIterator<Item = &'a mut Option<HeapBitSet>>,
{
    for handle in handles {
        drop(handle.take());
    }
}

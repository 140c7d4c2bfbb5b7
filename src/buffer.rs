//! Growable byte storage underneath a [`BitSet`](crate::BitSet).
//!
//! A bitset only ever talks to its storage through [`ByteBuffer`]. Two
//! implementations ship with the crate: [`HeapBuffer`], which owns a
//! heap allocation and can grow, and [`ArenaBuffer`], which borrows a
//! fixed region of caller memory (typically a local array on the stack).

use crate::error::{Error, Result};
use alloc::vec::Vec;

/// Byte-addressed storage with a logical length and a reserved capacity.
///
/// `len` bytes are materialized and readable; `capacity` bytes can be
/// materialized without another allocation.
pub trait ByteBuffer {
    /// Number of materialized bytes.
    fn len(&self) -> usize;

    /// Returns `true` if no bytes are materialized.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sets the number of materialized bytes.
    ///
    /// `len` must not exceed [`capacity`](ByteBuffer::capacity). Bytes exposed
    /// by growing the length have unspecified contents; callers that need them
    /// zeroed write the zeroes themselves.
    fn set_len(&mut self, len: usize);

    /// Number of bytes reserved, materialized or not.
    fn capacity(&self) -> usize;

    /// The materialized bytes, `[0, len)`.
    fn as_bytes(&self) -> &[u8];

    /// The materialized bytes, `[0, len)`, writable.
    fn as_bytes_mut(&mut self) -> &mut [u8];

    /// Ensures a capacity of at least `bytes` and returns the capacity reached.
    ///
    /// The returned value may exceed `bytes`. On failure the buffer is left
    /// untouched.
    fn reserve(&mut self, bytes: usize) -> Result<usize>;

    /// Releases reserved capacity beyond `len`, where the storage allows it.
    fn shrink(&mut self);
}

/// Heap-backed, growable byte buffer.
///
/// Growth doubles the current capacity when that is enough to satisfy a
/// request, and falls back to an exact allocation when doubling fails.
///
/// # Examples
/// ```
/// use lazy_bitset::{ByteBuffer, HeapBuffer};
///
/// let mut buf = HeapBuffer::with_capacity(4).unwrap();
/// assert!(buf.capacity() >= 4);
/// assert_eq!(buf.len(), 0);
/// assert!(buf.reserve(100).unwrap() >= 100);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct HeapBuffer(Vec<u8>);

impl HeapBuffer {
    /// Creates an empty buffer that does not allocate.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates an empty buffer with room for at least `bytes` bytes.
    pub fn with_capacity(bytes: usize) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes)
            .map_err(|e| Error::from_reserve(bytes, e))?;
        Ok(Self(buf))
    }

    /// Creates a buffer holding a copy of `bytes`, with capacity for exactly
    /// that many.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut buf = Self::with_capacity(bytes.len())?;
        buf.0.extend_from_slice(bytes);
        Ok(buf)
    }
}

impl ByteBuffer for HeapBuffer {
    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.0.capacity());
        self.0.resize(len, 0);
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.0.capacity()
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    fn reserve(&mut self, bytes: usize) -> Result<usize> {
        let capacity = self.0.capacity();
        if bytes <= capacity {
            return Ok(capacity);
        }
        let len = self.0.len();
        let doubled = bytes.max(capacity.saturating_mul(2));
        if self.0.try_reserve_exact(doubled - len).is_err() {
            self.0
                .try_reserve_exact(bytes - len)
                .map_err(|e| Error::from_reserve(bytes, e))?;
        }
        tracing::trace!(from = capacity, to = self.0.capacity(), "heap buffer grown");
        Ok(self.0.capacity())
    }

    fn shrink(&mut self) {
        let before = self.0.capacity();
        self.0.shrink_to_fit();
        tracing::trace!(from = before, to = self.0.capacity(), "heap buffer shrunk");
    }
}

/// Fixed-capacity byte buffer carved out of caller-provided memory.
///
/// The region is borrowed for the buffer's lifetime, so the memory is released
/// when the owner of the region goes out of scope. It never grows: requests
/// beyond the initial capacity fail with [`Error::OutOfMemory`].
///
/// # Examples
/// ```
/// use lazy_bitset::{ArenaBuffer, ByteBuffer};
///
/// let mut region = [0u8; 16];
/// let mut buf = ArenaBuffer::new(&mut region, 4).unwrap();
/// assert_eq!(buf.capacity(), 4);
/// assert!(buf.reserve(8).is_err());
/// ```
pub struct ArenaBuffer<'a> {
    region: &'a mut [u8],
    len: usize,
}

impl<'a> ArenaBuffer<'a> {
    /// Takes the first `bytes` bytes of `region` as the buffer's storage.
    ///
    /// Fails if `region` is shorter than `bytes`.
    pub fn new(region: &'a mut [u8], bytes: usize) -> Result<Self> {
        if region.len() < bytes {
            return Err(Error::out_of_memory(bytes));
        }
        let (region, _) = region.split_at_mut(bytes);
        Ok(Self { region, len: 0 })
    }
}

impl ByteBuffer for ArenaBuffer<'_> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.region.len());
        self.len = len;
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.region.len()
    }

    #[inline]
    fn as_bytes(&self) -> &[u8] {
        &self.region[..self.len]
    }

    #[inline]
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.region[..self.len]
    }

    fn reserve(&mut self, bytes: usize) -> Result<usize> {
        if bytes <= self.region.len() {
            Ok(self.region.len())
        } else {
            Err(Error::out_of_memory(bytes))
        }
    }

    // arena memory is returned with the region, not piecemeal
    fn shrink(&mut self) {}
}

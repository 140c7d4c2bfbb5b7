use crate::buffer::{ArenaBuffer, ByteBuffer, HeapBuffer};
use crate::error::{Error, Result};
use core::fmt::{Debug, Formatter};
use core::iter::{FusedIterator, Iterator};

/// Computes the number of bytes needed to store `bit_count` bits.
///
/// # Examples
/// ```
/// use lazy_bitset::byte_count;
///
/// assert_eq!(byte_count(0), 0);
/// assert_eq!(byte_count(9), 2);
/// assert_eq!(byte_count(16), 2);
/// assert_eq!(byte_count(17), 3);
/// ```
pub const fn byte_count(bit_count: usize) -> usize {
    bit_count.div_ceil(8)
}

/// Strips trailing zero bytes, which carry no set bits.
fn trim_zeros(mut bytes: &[u8]) -> &[u8] {
    while let [rest @ .., 0] = bytes {
        bytes = rest;
    }
    bytes
}

/// A growable bitset that always knows how many of its bits are set.
///
/// Bits live in a [`ByteBuffer`]. Only the bytes up to the highest byte ever
/// written are materialized; every bit past them reads as unset without
/// needing storage. Writing past the materialized region grows it and zeroes
/// just the newly covered bytes.
///
/// The number of set bits is tracked on every 0 -> 1 and 1 -> 0 transition,
/// so [`popcount`] never scans.
///
/// Operations that may grow storage take `&mut self` and return a
/// [`Result`]; if they fail the bitset is left untouched.
///
/// [`popcount`]: BitSet::popcount
#[derive(Clone, Default)]
pub struct BitSet<B: ByteBuffer = HeapBuffer> {
    buf: B,
    popcount: usize,
}

/// A bitset that owns heap storage and can grow without limit.
pub type HeapBitSet = BitSet<HeapBuffer>;

/// A bitset living in a caller-provided memory region, usually a local array.
pub type StackBitSet<'a> = BitSet<ArenaBuffer<'a>>;

impl BitSet<HeapBuffer> {
    /// Creates an empty heap bitset without allocating.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let bitset = HeapBitSet::new();
    /// assert_eq!(bitset.popcount(), 0);
    /// assert_eq!(bitset.capacity(), 0);
    /// ```
    pub const fn new() -> Self {
        Self {
            buf: HeapBuffer::new(),
            popcount: 0,
        }
    }

    /// Creates an empty heap bitset with room for at least `bits` bits.
    ///
    /// Storage is reserved but not zeroed.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let bitset = HeapBitSet::with_capacity(100).unwrap();
    /// assert!(bitset.capacity() >= 100);
    /// assert_eq!(bitset.len_bytes(), 0);
    /// ```
    pub fn with_capacity(bits: usize) -> Result<Self> {
        Ok(Self::from_buffer(HeapBuffer::with_capacity(byte_count(
            bits,
        ))?))
    }

    /// Builds a heap bitset with exactly the bits at the given indices set.
    ///
    /// Duplicate indices are counted once.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let bitset = HeapBitSet::try_from_ones([1, 9, 9, 40]).unwrap();
    /// assert_eq!(bitset.popcount(), 3);
    /// assert!(bitset.test(40));
    /// ```
    pub fn try_from_ones<I: IntoIterator<Item = usize>>(iter: I) -> Result<Self> {
        let mut bitset = Self::new();
        for idx in iter {
            bitset.set(idx)?;
        }
        Ok(bitset)
    }
}

impl<'a> BitSet<ArenaBuffer<'a>> {
    /// Creates an empty bitset inside `region`, with room for `bits` bits.
    ///
    /// The first `byte_count(bits)` bytes of `region` become the bitset's
    /// storage. A stack bitset cannot grow past that: setting a higher bit
    /// fails with [`Error::OutOfMemory`].
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::StackBitSet;
    ///
    /// let mut region = [0u8; 8];
    /// let mut bitset = StackBitSet::new_in(64, &mut region).unwrap();
    /// bitset.set(63).unwrap();
    /// assert!(bitset.set(64).is_err());
    /// assert_eq!(bitset.popcount(), 1);
    /// ```
    pub fn new_in(bits: usize, region: &'a mut [u8]) -> Result<Self> {
        Ok(Self::from_buffer(ArenaBuffer::new(region, byte_count(bits))?))
    }
}

impl<B: ByteBuffer> BitSet<B> {
    /// Wraps `buf` as an empty bitset, discarding whatever it held.
    pub fn from_buffer(mut buf: B) -> Self {
        buf.set_len(0);
        Self { buf, popcount: 0 }
    }

    /// Copies this bitset into a new, independent heap bitset.
    ///
    /// The copy has the same materialized bytes and the same popcount. Stack
    /// bitsets duplicate onto the heap too.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::StackBitSet;
    ///
    /// let mut region = [0u8; 4];
    /// let mut bitset = StackBitSet::new_in(32, &mut region).unwrap();
    /// bitset.set(7).unwrap();
    /// let copy = bitset.duplicate().unwrap();
    /// assert_eq!(copy, bitset);
    /// ```
    pub fn duplicate(&self) -> Result<BitSet<HeapBuffer>> {
        Ok(BitSet {
            buf: HeapBuffer::from_bytes(self.buf.as_bytes())?,
            popcount: self.popcount,
        })
    }

    /// Returns the number of set bits. Runs in O(1).
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::new();
    /// bitset.set(3).unwrap();
    /// bitset.set(100).unwrap();
    /// assert_eq!(bitset.popcount(), 2);
    /// ```
    #[inline]
    pub fn popcount(&self) -> usize {
        self.popcount
    }

    /// Returns `true` if no bit is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.popcount == 0
    }

    /// Number of materialized bytes. Bits at or past `8 * len_bytes()` are
    /// unset.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.buf.len()
    }

    /// The materialized bytes, least significant bit first within each byte.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Number of bits addressable without another allocation.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity().saturating_mul(8)
    }

    /// Returns `true` if the bit at `idx` is set.
    ///
    /// Never fails: any index past the materialized bytes reads as unset.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::new();
    /// bitset.set(5).unwrap();
    /// assert!(bitset.test(5));
    /// assert!(!bitset.test(4));
    /// assert!(!bitset.test(usize::MAX));
    /// ```
    #[inline]
    pub fn test(&self, idx: usize) -> bool {
        let (byte_idx, bit_idx) = Self::idxs(idx);
        self.buf
            .as_bytes()
            .get(byte_idx)
            .is_some_and(|byte| byte & 1 << bit_idx != 0)
    }

    /// Sets the bit at `idx`.
    ///
    /// Grows the materialized region to cover `idx` if needed, zeroing only
    /// the newly covered bytes. Setting a bit that is already set changes
    /// nothing.
    ///
    /// # Errors
    /// Returns [`Error::OutOfMemory`] if the storage cannot grow. The bitset
    /// is unchanged in that case.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::new();
    /// bitset.set(100).unwrap();
    /// bitset.set(100).unwrap();
    /// assert_eq!(bitset.popcount(), 1);
    /// assert!(bitset.capacity() >= 101);
    /// ```
    pub fn set(&mut self, idx: usize) -> Result<()> {
        let (byte_idx, bit_idx) = Self::idxs(idx);
        self.materialize(byte_idx + 1)?;
        let byte = &mut self.buf.as_bytes_mut()[byte_idx];
        if *byte & 1 << bit_idx == 0 {
            *byte |= 1 << bit_idx;
            self.popcount += 1;
        }
        Ok(())
    }

    /// Unsets the bit at `idx`.
    ///
    /// Indices past the materialized bytes are already unset, so this never
    /// allocates.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::try_from_ones([3, 5]).unwrap();
    /// bitset.reset(5);
    /// bitset.reset(5000);
    /// assert!(!bitset.test(5));
    /// assert_eq!(bitset.popcount(), 1);
    /// ```
    pub fn reset(&mut self, idx: usize) {
        let (byte_idx, bit_idx) = Self::idxs(idx);
        if let Some(byte) = self.buf.as_bytes_mut().get_mut(byte_idx) {
            if *byte & 1 << bit_idx != 0 {
                *byte &= !(1 << bit_idx);
                self.popcount -= 1;
            }
        }
    }

    /// Unsets every bit in O(1), keeping the reserved capacity.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::try_from_ones([1, 2, 300]).unwrap();
    /// let capacity = bitset.capacity();
    /// bitset.clear();
    /// assert_eq!(bitset.popcount(), 0);
    /// assert!(!bitset.test(300));
    /// assert_eq!(bitset.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.buf.set_len(0);
        self.popcount = 0;
    }

    /// Materializes storage up to bit `idx` without changing its value.
    ///
    /// Afterwards every bit up to `idx` is backed by zeroed or previously
    /// written bytes, and `capacity() > idx`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfMemory`] if the storage cannot grow. The bitset
    /// is unchanged in that case.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::new();
    /// bitset.eval(50).unwrap();
    /// assert!(!bitset.test(50));
    /// assert_eq!(bitset.popcount(), 0);
    /// assert!(bitset.capacity() >= 51);
    /// ```
    pub fn eval(&mut self, idx: usize) -> Result<()> {
        let was_set = self.test(idx);
        self.set(idx)?;
        if !was_set {
            self.reset(idx);
        }
        Ok(())
    }

    /// Ensures room for at least `bits` bits and returns the capacity in bits.
    ///
    /// The result may exceed `bits`. Set bits and the materialized region
    /// are not touched.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::new();
    /// assert!(bitset.reserve(1000).unwrap() >= 1000);
    /// assert_eq!(bitset.len_bytes(), 0);
    /// ```
    pub fn reserve(&mut self, bits: usize) -> Result<usize> {
        let bytes = self.buf.reserve(byte_count(bits))?;
        Ok(bytes.saturating_mul(8))
    }

    /// Releases reserved capacity that is not needed for the materialized
    /// bytes. An all-zero bitset gives up its materialized bytes first.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::with_capacity(4096).unwrap();
    /// bitset.set(10).unwrap();
    /// bitset.reset(10);
    /// bitset.shrink();
    /// assert_eq!(bitset.len_bytes(), 0);
    /// assert!(bitset.capacity() < 4096);
    /// ```
    pub fn shrink(&mut self) -> &mut Self {
        if self.popcount == 0 {
            self.buf.set_len(0);
        }
        self.buf.shrink();
        self
    }

    /// Returns an iterator over the indices of all set bits, in ascending
    /// order.
    ///
    /// The iterator knows its exact length up front, since the bitset tracks
    /// its popcount.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let bitset = HeapBitSet::try_from_ones([17, 2, 9]).unwrap();
    /// let mut ones = bitset.iter_ones();
    /// assert_eq!(ones.len(), 3);
    /// assert_eq!(ones.next(), Some(2));
    /// assert_eq!(ones.next(), Some(9));
    /// assert_eq!(ones.next(), Some(17));
    /// assert_eq!(ones.next(), None);
    /// ```
    #[inline]
    pub fn iter_ones(&self) -> IterOnes<'_> {
        let bytes = self.buf.as_bytes();
        IterOnes {
            bytes,
            byte_idx: 0,
            current: bytes.first().copied().unwrap_or(0),
            base_bit_idx: 0,
            remaining: self.popcount,
        }
    }

    /// Returns the index of the first set bit or `None` if all bits are unset.
    ///
    /// # Examples
    /// ```
    /// use lazy_bitset::HeapBitSet;
    ///
    /// let mut bitset = HeapBitSet::new();
    /// assert_eq!(bitset.first_set_bit(), None);
    /// bitset.set(42).unwrap();
    /// assert_eq!(bitset.first_set_bit(), Some(42));
    /// ```
    pub fn first_set_bit(&self) -> Option<usize> {
        if self.popcount == 0 {
            return None;
        }
        for (i, byte) in self.buf.as_bytes().iter().enumerate() {
            if *byte != 0 {
                let bit = byte.trailing_zeros() as usize;
                return Some(i * 8 + bit);
            }
        }
        None
    }

    #[inline]
    fn idxs(idx: usize) -> (usize, usize) {
        (idx / 8, idx % 8)
    }

    /// Grows the materialized region to `bytes` bytes, zeroing the new span.
    fn materialize(&mut self, bytes: usize) -> Result<()> {
        let len = self.buf.len();
        if bytes <= len {
            return Ok(());
        }
        if self.buf.reserve(bytes)? < bytes {
            return Err(Error::out_of_memory(bytes));
        }
        self.buf.set_len(bytes);
        self.buf.as_bytes_mut()[len..].fill(0);
        tracing::trace!(from = len, to = bytes, "bitset materialized");
        Ok(())
    }
}

impl<A: ByteBuffer, B: ByteBuffer> PartialEq<BitSet<B>> for BitSet<A> {
    /// Two bitsets are equal when the same bits are set, whatever their
    /// storage, capacity or materialized length.
    fn eq(&self, other: &BitSet<B>) -> bool {
        self.popcount == other.popcount
            && trim_zeros(self.buf.as_bytes()) == trim_zeros(other.buf.as_bytes())
    }
}

impl<B: ByteBuffer> Eq for BitSet<B> {}

impl<B: ByteBuffer> Debug for BitSet<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "LSB -> ")?;
        for (i, byte) in self.buf.as_bytes().iter().enumerate() {
            write!(f, "{}: ", i * 8)?;
            for bit in 0..8 {
                write!(f, "{}", if byte & 1 << bit != 0 { '1' } else { '0' })?;
            }
            write!(f, " ")?;
        }
        write!(f, "<- MSB")
    }
}

impl<'bitset, B: ByteBuffer> IntoIterator for &'bitset BitSet<B> {
    type Item = usize;
    type IntoIter = IterOnes<'bitset>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_ones()
    }
}

/// Iterator over the indices of set bits in a bitset.
///
/// Yields the positions of all bits that are set, in ascending order.
///
/// Returned by [`BitSet::iter_ones()`].
#[derive(Clone, Copy)]
pub struct IterOnes<'bitset> {
    bytes: &'bitset [u8],
    byte_idx: usize,
    current: u8,
    base_bit_idx: usize,
    remaining: usize,
}

impl Iterator for IterOnes<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 && self.byte_idx < self.bytes.len() {
            if self.current != 0 {
                let tz = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1; // unset LSB
                self.remaining -= 1;
                return Some(self.base_bit_idx + tz);
            }

            self.byte_idx += 1;
            self.base_bit_idx += 8;
            self.current = self.bytes.get(self.byte_idx).copied().unwrap_or(0);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for IterOnes<'_> {}

impl FusedIterator for IterOnes<'_> {}

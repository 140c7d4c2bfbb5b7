//! A growable bitset with O(1) population count, written in pure Rust.
//! `no_std` + `alloc`, no `unsafe`.
//!
//! [`BitSet`] is the main struct in this library. Its [features](#features)
//! are listed below.
//!
//! # Examples
//! ```
//! use lazy_bitset::HeapBitSet;
//!
//! let mut bitset = HeapBitSet::new();
//! bitset.set(3).unwrap();
//! bitset.set(5).unwrap();
//! bitset.set(100).unwrap();
//! assert_eq!(bitset.popcount(), 3);
//! bitset.reset(5);
//! assert_eq!(bitset.popcount(), 2);
//! assert!(bitset.test(100));
//! assert!(!bitset.test(5));
//! assert!(bitset.capacity() >= 101);
//! ```
//!
//! A bitset can also live in caller memory, e.g. a local array:
//! ```
//! use lazy_bitset::StackBitSet;
//!
//! let mut region = [0u8; 32];
//! let mut bitset = StackBitSet::new_in(256, &mut region).unwrap();
//! bitset.set(255).unwrap();
//! assert!(bitset.set(256).is_err());
//! ```
//!
//! # Use Cases
//!
//! - Membership sets over dense integer ids where the count of members is
//!   queried often
//! - Sparse-to-moderate sets whose highest index is not known up front
//! - Scratch sets on the stack that must never touch the allocator
//!
//! # Features
//!
//! - `#![no_std]` compatible (needs `alloc`)
//! - O(1) `popcount`, kept up to date on every bit transition
//! - Lazy storage: nothing is zeroed or allocated until a bit past the
//!   current extent is written, and then only the new span is zeroed
//! - Bounds-safe reads: any index past the stored bits reads as unset
//! - Heap ([`HeapBitSet`]) or caller-provided memory ([`StackBitSet`])
//!   behind the same API
//! - Fallible growth: allocation failures come back as [`Error`], never as a
//!   panic, and leave the bitset unchanged
//! - `Option<BitSet>` as a nullable handle via [`BitSetHandle`] and
//!   [`HeapBitSetHandle`]
//!
//! # Cargo features
//!
//! - `std`: enables `std` support in `tracing`. Off by default.
//!
//! Growth and shrink events are logged through `tracing` at `trace` level,
//! failed allocations at `debug` level.

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![no_std]

extern crate alloc;

mod bitset;
pub mod buffer;
mod error;
mod handle;
#[cfg(test)]
mod tests;

pub use bitset::{BitSet, HeapBitSet, IterOnes, StackBitSet, byte_count};
pub use buffer::{ArenaBuffer, ByteBuffer, HeapBuffer};
pub use error::{Error, Result};
pub use handle::{BitSetHandle, HeapBitSetHandle, free_all};

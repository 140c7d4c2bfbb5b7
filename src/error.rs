use alloc::collections::TryReserveError;
use thiserror::Error;

/// The only way a bitset operation can fail.
///
/// Out-of-range reads and empty (`None`) handles are not errors. Whenever this
/// is returned, the bitset involved is exactly as it was before the call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The backing buffer could not provide the requested number of bytes.
    #[error("not enough memory: could not reserve {requested_bytes} bytes")]
    OutOfMemory {
        /// Total byte capacity that was asked for.
        requested_bytes: usize,
    },
}

impl Error {
    pub(crate) fn out_of_memory(requested_bytes: usize) -> Self {
        tracing::debug!(requested_bytes, "bitset allocation failed");
        Error::OutOfMemory { requested_bytes }
    }

    pub(crate) fn from_reserve(requested_bytes: usize, _source: TryReserveError) -> Self {
        Self::out_of_memory(requested_bytes)
    }
}

/// Result alias used by every fallible operation in this crate.
pub type Result<T> = core::result::Result<T, Error>;

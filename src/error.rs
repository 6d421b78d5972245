//! Errors returned by bit stores and Bloom filters.
use std::io;

use thiserror::Error;

/// A specialized result type for filter and store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error from a [`crate::store::BitStore`] or a [`crate::BloomFilter`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The store has no buffer, either because `init` was never called or
    /// because it could not allocate one.
    #[error("bit store is not initialized")]
    NotInitialized,

    /// A bit position outside of `[0, bits)`.
    #[error("bit position {position} is out of range for a store of {bits} bits")]
    OutOfRange {
        /// The requested position.
        position: u64,
        /// The capacity of the store.
        bits: u64,
    },

    /// An I/O or resource error from a non-memory backend.
    #[error("backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Every bit of the store is set, so the number of items can't be
    /// estimated.
    #[error("all {bits} bits are set")]
    Saturated {
        /// The capacity of the store.
        bits: u64,
    },

    /// A filter parameter that can't be used, eg. zero hashes.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),
}

impl Error {
    /// Wrap an arbitrary backend error.
    pub fn backend<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Backend(err.into())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Backend(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::NotInitialized.to_string(), "bit store is not initialized");
        assert_eq!(
            Error::OutOfRange {
                position: 9,
                bits: 8
            }
            .to_string(),
            "bit position 9 is out of range for a store of 8 bits"
        );
        assert_eq!(Error::Saturated { bits: 64 }.to_string(), "all 64 bits are set");
    }

    #[test]
    fn test_backend_keeps_source() {
        let err = Error::from(io::Error::new(io::ErrorKind::Other, "disk on fire"));

        assert_eq!(err.to_string(), "backend failure: disk on fire");
        assert!(err.source().is_some());
        assert!(matches!(Error::backend("timeout"), Error::Backend(_)));
    }
}

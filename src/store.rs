//! Bit storage backends.
//!
//! A [`BitStore`] is a fixed-size, bit-addressable array. The Bloom filter only
//! ever talks to its storage through this trait, so any backend that upholds
//! the contract (in-memory, on disk, over the network) can be swapped in.
use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::bitvec::BitVec;
use crate::error::{Error, Result};

/// A capacity-addressable array of bits.
///
/// A filter takes its store by value and is its only user for as long as the
/// filter lives; two filters never write to the same store.
///
/// Every method takes `&self`: implementations are expected to serialize
/// access internally, so that a single store can be used from several threads
/// at once. Each call is atomic on its own, but there is no atomicity across
/// calls.
pub trait BitStore: Send + Sync {
    /// Allocate storage for `bits` positions, all unset.
    ///
    /// Calling this on a store that is already initialized is a no-op: the
    /// existing contents and size are kept.
    fn init(&self, bits: u64) -> Result<()>;

    /// Set the bit at `position` to `value`.
    fn set_bit(&self, position: u64, value: bool) -> Result<()>;

    /// Get the value of the bit at `position`.
    fn get_bit(&self, position: u64) -> Result<bool>;
}

impl<S: BitStore + ?Sized> BitStore for Box<S> {
    fn init(&self, bits: u64) -> Result<()> {
        (**self).init(bits)
    }

    fn set_bit(&self, position: u64, value: bool) -> Result<()> {
        (**self).set_bit(position, value)
    }

    fn get_bit(&self, position: u64) -> Result<bool> {
        (**self).get_bit(position)
    }
}

/// An in-memory bit store, guarded by a single lock.
#[derive(Default)]
pub struct MemStore {
    bits: Mutex<Option<BitVec>>,
}

impl MemStore {
    /// Create an empty, uninitialized store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `init` has allocated a buffer.
    pub fn is_initialized(&self) -> bool {
        self.bits.lock().is_some()
    }

    /// The number of addressable bits, or `None` before initialization.
    pub fn capacity(&self) -> Option<u64> {
        self.bits.lock().as_ref().map(BitVec::len)
    }

    /// The size of the underlying buffer, in bytes.
    pub fn byte_len(&self) -> Option<usize> {
        self.bits.lock().as_ref().map(BitVec::byte_len)
    }

    /// Count the number of bits currently set.
    pub fn count_ones(&self) -> Result<u64> {
        self.bits
            .lock()
            .as_ref()
            .map(BitVec::count_ones)
            .ok_or(Error::NotInitialized)
    }
}

impl BitStore for MemStore {
    fn init(&self, bits: u64) -> Result<()> {
        let mut guard = self.bits.lock();

        if let Some(existing) = guard.as_ref() {
            trace!(
                target: "bitbloom::store",
                requested = bits,
                capacity = existing.len(),
                "store already initialized"
            );
            return Ok(());
        }
        let bitvec = BitVec::try_new(bits).ok_or(Error::NotInitialized)?;

        debug!(
            target: "bitbloom::store",
            bits,
            bytes = bitvec.byte_len(),
            "allocated in-memory bit store"
        );
        *guard = Some(bitvec);

        Ok(())
    }

    fn set_bit(&self, position: u64, value: bool) -> Result<()> {
        self.bits
            .lock()
            .as_mut()
            .ok_or(Error::NotInitialized)?
            .set(position, value)
    }

    fn get_bit(&self, position: u64) -> Result<bool> {
        self.bits
            .lock()
            .as_ref()
            .ok_or(Error::NotInitialized)?
            .is_set(position)
    }
}

impl fmt::Debug for MemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemStore")
            .field("bits", &*self.bits.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn store(bits: u64) -> MemStore {
        let store = MemStore::new();
        store.init(bits).unwrap();
        store
    }

    #[test]
    fn test_uninitialized() {
        let store = MemStore::new();

        assert!(!store.is_initialized());
        assert_eq!(store.capacity(), None);
        assert!(matches!(store.get_bit(0), Err(Error::NotInitialized)));
        assert!(matches!(store.set_bit(1, true), Err(Error::NotInitialized)));
        assert!(matches!(store.count_ones(), Err(Error::NotInitialized)));
    }

    #[test]
    fn test_init_sizes_buffer() {
        assert_eq!(store(1).byte_len(), Some(1));
        assert_eq!(store(8).byte_len(), Some(1));
        assert_eq!(store(9).byte_len(), Some(2));
        assert_eq!(store(1024).byte_len(), Some(128));
        assert_eq!(store(1025).capacity(), Some(1025));
    }

    #[test]
    fn test_init_is_idempotent() {
        let store = store(16);
        store.set_bit(3, true).unwrap();

        store.init(16).unwrap();
        assert_eq!(store.capacity(), Some(16));
        assert!(store.get_bit(3).unwrap());

        // A second init with another size neither resizes nor clears.
        store.init(4096).unwrap();
        assert_eq!(store.capacity(), Some(16));
        assert_eq!(store.byte_len(), Some(2));
        assert!(store.get_bit(3).unwrap());
        assert_eq!(store.count_ones().unwrap(), 1);
    }

    #[test]
    fn test_boundaries() {
        let store = store(1000);

        for position in [0, 999] {
            store.set_bit(position, true).unwrap();
            assert!(store.get_bit(position).unwrap());
            store.set_bit(position, false).unwrap();
            assert!(!store.get_bit(position).unwrap());
        }
        assert!(matches!(
            store.get_bit(1000),
            Err(Error::OutOfRange {
                position: 1000,
                bits: 1000
            })
        ));
        assert!(matches!(
            store.set_bit(u64::MAX, true),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_addressing_is_linear() {
        // Each position must map to its own bit, position 0 included.
        let store = store(64);

        for position in (0..64).step_by(3) {
            store.set_bit(position, true).unwrap();
        }
        for position in 0..64 {
            assert_eq!(store.get_bit(position).unwrap(), position % 3 == 0);
        }
        assert_eq!(store.count_ones().unwrap(), 22);
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(store(8 * 1024));

        std::thread::scope(|s| {
            for t in 0..8u64 {
                let store = store.clone();
                s.spawn(move || {
                    // Writers share bytes, so lost updates would show up here.
                    for i in 0..1024u64 {
                        store.set_bit(i * 8 + t, true).unwrap();
                    }
                });
            }
        });
        assert_eq!(store.count_ones().unwrap(), 8 * 1024);
    }

    #[test]
    fn test_dyn_store() {
        let store: Box<dyn BitStore> = Box::new(MemStore::new());

        store.init(10).unwrap();
        store.set_bit(9, true).unwrap();
        assert!(store.get_bit(9).unwrap());
    }

    proptest! {
        #[test]
        fn prop_bit_round_trip(bits in 1u64..4096, seed in any::<u64>(), value in any::<bool>()) {
            let store = store(bits);
            let position = seed % bits;

            store.set_bit(position, value).unwrap();
            prop_assert_eq!(store.get_bit(position).unwrap(), value);

            store.set_bit(position, !value).unwrap();
            prop_assert_eq!(store.get_bit(position).unwrap(), !value);
        }
    }
}

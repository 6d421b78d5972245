// Copyright (c) 2018 Aleksandr Bezobchuk
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! A Bloom filter over a pluggable bit store, using a seeded hash family.

use std::f64;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::hash::{Fnv64, Hash64, SipHash64};
use crate::store::{BitStore, MemStore};

/// The default false positive probability value, 1%.
pub const DEFAULT_FALSE_POSITIVE_RATE: f64 = 0.01;

/// Seed used by [`BloomFilter::new_default`].
pub const DEFAULT_SEED: u64 = 1337;

/// Key used by the sizing constructors, eg. [`BloomFilter::with_rate`].
pub const SIP_HASH_KEY: [u8; 16] = [
    136, 168, 28, 251, 141, 239, 69, 38, 166, 209, 98, 201, 2, 169, 146, 170,
];

/// `ln` squared.
const LN_SQR: f64 = f64::consts::LN_2 * f64::consts::LN_2;

/// A Bloom filter of `bits` positions, backed by the store `S` and hashed with `H`.
///
/// Every key is mapped to `hashes` bit positions. The `i`-th position is the
/// digest of `key || seed || i` (seed as 8 little-endian bytes, `i` as 4),
/// reduced modulo `bits`.
///
/// All operations take `&self`. The store and the hash function each carry
/// their own lock, so a filter can be shared between threads. A lookup that
/// runs concurrently with an insert of the same key may see only part of
/// that key's bits.
#[derive(Debug)]
pub struct BloomFilter<S = MemStore, H = Fnv64> {
    store: S,
    hasher: Mutex<H>,
    nhashes: u32,
    seed: [u8; 8],
    nbits: u64,
}

impl BloomFilter {
    /// Return an in-memory filter using FNV-1 and [`DEFAULT_SEED`].
    ///
    /// The choice of hash and seed is not a stable format: filters built here
    /// are only meant to be queried by the same version of this crate.
    ///
    /// FNV-1 mixes the trailing `seed || i` bytes poorly, so the `k` positions
    /// of a key are correlated and the false positive rate ends up well above
    /// [`BloomFilter::false_positive_rate`]. Use [`BloomFilter::with_rate`], or
    /// [`BloomFilter::new`] with a [`SipHash64`], when the rate matters.
    pub fn new_default(hashes: u32, bits: u64) -> Result<Self> {
        BloomFilter::new(MemStore::new(), Fnv64::new(), hashes, DEFAULT_SEED, bits)
    }
}

impl BloomFilter<MemStore, SipHash64> {
    /// Return an in-memory filter with a given approximate item capacity.
    /// The false positive probability is [`DEFAULT_FALSE_POSITIVE_RATE`].
    pub fn with_capacity(capacity: u64) -> Result<Self> {
        BloomFilter::with_rate(capacity, DEFAULT_FALSE_POSITIVE_RATE)
    }

    /// Return an in-memory filter sized for `capacity` items at the given
    /// false positive rate, hashed with SipHash-1-3 under [`SIP_HASH_KEY`].
    pub fn with_rate(capacity: u64, fp_rate: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidParameter("capacity must be non-zero"));
        }
        if !(fp_rate > 0. && fp_rate < 1.) {
            return Err(Error::InvalidParameter(
                "false positive rate must be between 0 and 1",
            ));
        }
        let nbits = optimal_bits(capacity, fp_rate);
        let nhashes = optimal_hashes(nbits, capacity);
        let hasher = SipHash64::new_with_key(&SIP_HASH_KEY);

        BloomFilter::new(MemStore::new(), hasher, nhashes, DEFAULT_SEED, nbits)
    }
}

impl<S: BitStore, H: Hash64> BloomFilter<S, H> {
    /// Return a filter over the given store and hash function.
    ///
    /// The store is initialized with `bits` positions. If it was already
    /// initialized, it keeps its existing size, and positions past the end of
    /// it are reported as [`Error::OutOfRange`] when used.
    pub fn new(store: S, hasher: H, hashes: u32, seed: u64, bits: u64) -> Result<Self> {
        if hashes == 0 {
            return Err(Error::InvalidParameter("number of hashes must be at least 1"));
        }
        if bits == 0 {
            return Err(Error::InvalidParameter("number of bits must be non-zero"));
        }
        store.init(bits)?;

        debug!(target: "bitbloom", hashes, seed, bits, "created bloom filter");

        Ok(Self {
            store,
            hasher: Mutex::new(hasher),
            nhashes: hashes,
            seed: seed.to_le_bytes(),
            nbits: bits,
        })
    }

    /// Insert a key.
    ///
    /// If the store fails part of the way through, the error is returned and
    /// the bits already set stay set.
    pub fn insert<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<()> {
        self.set_key(key.as_ref(), true)
    }

    /// Remove a key by clearing all of its bits.
    ///
    /// This is not safe in general: any other key sharing one of these bits
    /// will stop being reported as present, ie. deleting can introduce false
    /// negatives for unrelated keys.
    pub fn delete<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<()> {
        self.set_key(key.as_ref(), false)
    }

    /// Return whether or not a given key is likely in the filter. A false
    /// positive is possible; a false negative is not, unless a `delete`
    /// cleared one of the key's bits.
    ///
    /// Stops at the first unset bit.
    pub fn contains<K: AsRef<[u8]> + ?Sized>(&self, key: &K) -> Result<bool> {
        let key = key.as_ref();

        for i in 0..self.nhashes {
            if !self.store.get_bit(self.hash_payload(key, i))? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Iterate over the bit positions of a key, in hashing order.
    pub fn positions<'a, K: AsRef<[u8]> + ?Sized>(
        &'a self,
        key: &'a K,
    ) -> impl Iterator<Item = u64> + 'a {
        let key = key.as_ref();
        (0..self.nhashes).map(move |i| self.hash_payload(key, i))
    }

    /// Return the number of bits in this filter.
    pub fn bits(&self) -> u64 {
        self.nbits
    }

    /// Number of hashes used (`k` parameter).
    pub fn hashes(&self) -> u32 {
        self.nhashes
    }

    /// The seed mixed into every hash.
    pub fn seed(&self) -> u64 {
        u64::from_le_bytes(self.seed)
    }

    /// The underlying bit store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Expected false positive rate once `items` distinct keys are inserted.
    ///
    /// Assumes the hash spreads the `k` positions of a key independently.
    pub fn false_positive_rate(&self, items: u64) -> f64 {
        false_positive_rate(self.nbits, self.nhashes, items)
    }

    fn set_key(&self, key: &[u8], value: bool) -> Result<()> {
        for i in 0..self.nhashes {
            let position = self.hash_payload(key, i);

            if let Err(err) = self.store.set_bit(position, value) {
                if i > 0 {
                    warn!(
                        target: "bitbloom",
                        written = i,
                        hashes = self.nhashes,
                        value,
                        "bit store failed part way through a key: {err}"
                    );
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn hash_payload(&self, key: &[u8], index: u32) -> u64 {
        let mut payload = Vec::with_capacity(key.len() + self.seed.len() + 4);
        payload.extend_from_slice(key);
        payload.extend_from_slice(&self.seed);
        payload.extend_from_slice(&index.to_le_bytes());

        self.digest(&payload) % self.nbits
    }

    fn digest(&self, payload: &[u8]) -> u64 {
        let mut hasher = self.hasher.lock();

        hasher.write(payload);
        let sum = hasher.sum64();
        hasher.reset();

        sum
    }
}

impl<H: Hash64> BloomFilter<MemStore, H> {
    /// Count the approximate number of items in the filter.
    ///
    /// Uses the capacity of the store, which is larger or smaller than
    /// [`BloomFilter::bits`] if it was initialized before the filter. Fails
    /// with [`Error::Saturated`] once every bit is set.
    pub fn count(&self) -> Result<u64> {
        let capacity = self.store.capacity().ok_or(Error::NotInitialized)?;
        let ones = self.store.count_ones()?;

        if capacity == 0 {
            return Ok(0);
        }
        if ones >= capacity {
            return Err(Error::Saturated { bits: capacity });
        }
        let nbits = capacity as f64;
        let nbits_set = ones as f64;
        let nhashes = self.nhashes as f64;
        let count = -(nbits / nhashes) * (1. - (nbits_set / nbits)).ln();

        Ok(count.round() as u64)
    }
}

/// Return the optimal bit vector size for a Bloom filter given an approximate
/// size and a desired false positive rate.
pub fn optimal_bits(capacity: u64, fp_rate: f64) -> u64 {
    (-((fp_rate.ln() * (capacity as f64)) / LN_SQR)).ceil() as u64
}

/// Return the optimal item capacity of a filter given a bit vector size and false positive rate.
pub fn optimal_capacity(nbits: u64, fp_rate: f64) -> u64 {
    ((-(nbits as f64) * LN_SQR) / fp_rate.ln()).round() as u64
}

/// Return the optimal number of hash functions for a Bloom filter given a
/// bit vector size and an approximate set size.
///
/// Also called `k`. Never less than one. A capacity of zero is treated as one.
pub fn optimal_hashes(nbits: u64, capacity: u64) -> u32 {
    let k = (((nbits / capacity.max(1)) as f64) * f64::consts::LN_2).ceil() as u32;
    k.max(1)
}

/// Expected false positive rate, `(1 - e^(-kn/m))^k`, of a filter with `nbits`
/// bits and `nhashes` hashes holding `items` keys.
pub fn false_positive_rate(nbits: u64, nhashes: u32, items: u64) -> f64 {
    let k = nhashes as f64;
    let exponent = -k * items as f64 / nbits as f64;

    (1. - exponent.exp()).powf(k)
}

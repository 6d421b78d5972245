//! A Bloom filter over a pluggable, thread-safe bit store.
//!
//! # Bloom Filters
//!
//! A Bloom filter is a space-efficient probabilistic data structure that is
//! used to test whether an element is a member of a set. It allows for queries
//! to return: "possibly in set" or "definitely not in set". The more elements
//! that are added to the set, the larger the probability of false positives:
//! with `n` keys, `m` bits and `k` hashes it is about `(1 - e^(-kn/m))^k`.
//!
//! # Seeded hashing
//!
//! The `k` bit positions of a key come from a single 64-bit hash function,
//! turned into a family by hashing `key || seed || i` for `i` in `0..k`, where
//! the seed is encoded as 8 little-endian bytes and `i` as 4. Each digest is
//! reduced modulo the number of bits.
//!
//! # Storage
//!
//! Bits live behind the [`BitStore`] trait. [`MemStore`] keeps them in memory;
//! other backends only need to provide `init`, `set_bit` and `get_bit`.
//!
//! # Deleting
//!
//! [`BloomFilter::delete`] clears every bit of a key. Other keys sharing any of
//! those bits stop being reported, so deleting can cause false negatives.
//!
//! # Example
//!
//! ```
//! use bitbloom::BloomFilter;
//!
//! let filter = BloomFilter::new_default(5, 1 << 20)?;
//!
//! filter.insert("foo")?;
//! filter.insert("bar")?;
//!
//! assert!(filter.contains("foo")?);
//! assert!(filter.contains("bar")?);
//!
//! filter.delete("foo")?;
//! assert!(!filter.contains("foo")?);
//! # Ok::<(), bitbloom::Error>(())
//! ```
#![warn(missing_docs)]
#![allow(clippy::bool_assert_comparison)]

pub mod bitvec;
pub mod bloom;
pub mod error;
pub mod hash;
pub mod store;

pub use bloom::BloomFilter;
pub use error::{Error, Result};
pub use hash::{Fnv64, Hash64, SipHash64};
pub use store::{BitStore, MemStore};

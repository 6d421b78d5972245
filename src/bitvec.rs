// Copyright (c) 2020 Helge Wrede, Alexander Schultheiß, Lukas Simon
// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Bit vector functionality.
use std::fmt::Debug;

use crate::error::{Error, Result};

/// A packed bit vector, addressed with 64-bit positions.
///
/// Bit `i` lives in byte `i / 8`, under the mask `1 << (i % 8)`.
#[derive(Clone, PartialEq, Eq)]
pub struct BitVec {
    bytes: Vec<u8>,
    nbits: u64,
}

impl BitVec {
    /// Try to allocate a zeroed bit vector of the given capacity, in bits.
    ///
    /// Returns `None` if the capacity is not addressable on this platform or
    /// the allocation fails.
    pub fn try_new(capacity: u64) -> Option<Self> {
        let byte_length = if capacity % 8 == 0 {
            capacity / 8
        } else {
            1 + capacity / 8
        };
        let byte_length = usize::try_from(byte_length).ok()?;

        let mut bytes = Vec::new();
        bytes.try_reserve_exact(byte_length).ok()?;
        bytes.resize(byte_length, 0);

        Some(Self {
            nbits: capacity,
            bytes,
        })
    }

    /// Get the length in bits of the vector.
    pub fn len(&self) -> u64 {
        self.nbits
    }

    /// Check whether this vector is empty, ie. has a length of zero.
    pub fn is_empty(&self) -> bool {
        self.nbits == 0
    }

    /// Get the length in bytes of the underlying storage.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Set a single bit to `1` or `0`.
    pub fn set(&mut self, index: u64, value: bool) -> Result<()> {
        let (byte_index, mask) = self.locate(index)?;

        if value {
            self.bytes[byte_index] |= mask;
        } else {
            self.bytes[byte_index] &= !mask;
        }
        Ok(())
    }

    /// Check whether a bit is set.
    pub fn is_set(&self, index: u64) -> Result<bool> {
        let (byte_index, mask) = self.locate(index)?;

        Ok(self.bytes[byte_index] & mask == mask)
    }

    /// Count the number of `1` bits.
    pub fn count_ones(&self) -> u64 {
        self.bytes.iter().map(|b| b.count_ones() as u64).sum()
    }

    /// Count the number of `0` bits.
    pub fn count_zeros(&self) -> u64 {
        self.len() - self.count_ones()
    }

    /// Return the underlying bytes storage.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn locate(&self, index: u64) -> Result<(usize, u8)> {
        if index >= self.nbits {
            return Err(Error::OutOfRange {
                position: index,
                bits: self.nbits,
            });
        }
        // Fits, since `bytes.len()` is a `usize` and `index / 8 < bytes.len()`.
        let byte_index = (index / 8) as usize;
        let mask = 0x01 << (index % 8);

        Ok((byte_index, mask))
    }
}

impl Debug for BitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.nbits > 64 {
            return write!(f, "BitVec(len={}, ones={})", self.nbits, self.count_ones());
        }
        let bits: String = self
            .bytes
            .iter()
            .flat_map(|b| (0..8).map(move |i| b & (1 << i) != 0))
            .take(self.nbits as usize)
            .map(|set| if set { '1' } else { '0' })
            .collect();
        write!(f, "BitVec({})", bits)
    }
}

//! Stateful 64-bit hash functions.
use std::hash::Hasher;

use siphasher::sip::SipHasher13;

/// A 64-bit hash function that accumulates bytes until its digest is read.
///
/// The filter writes one payload, reads the digest, then resets. A hash that
/// isn't reset between payloads would fold the previous key into the next one.
pub trait Hash64: Send {
    /// Feed bytes into the hash state.
    fn write(&mut self, bytes: &[u8]);

    /// Return the digest of everything written since the last reset.
    fn sum64(&self) -> u64;

    /// Return to the initial state.
    fn reset(&mut self);
}

impl<H: Hash64 + ?Sized> Hash64 for Box<H> {
    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }

    fn sum64(&self) -> u64 {
        (**self).sum64()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1 (multiply, then xor).
///
/// Not cryptographic, but fast and stable across platforms and releases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fnv64 {
    state: u64,
}

impl Fnv64 {
    /// Create a hash in its initial state.
    pub fn new() -> Self {
        Self { state: FNV_OFFSET }
    }
}

impl Default for Fnv64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Hash64 for Fnv64 {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state = self.state.wrapping_mul(FNV_PRIME);
            self.state ^= *byte as u64;
        }
    }

    fn sum64(&self) -> u64 {
        self.state
    }

    fn reset(&mut self) {
        self.state = FNV_OFFSET;
    }
}

/// SipHash-1-3 with a fixed 128-bit key.
#[derive(Clone, Debug)]
pub struct SipHash64 {
    key: [u8; 16],
    hasher: SipHasher13,
}

impl SipHash64 {
    /// Create a keyed hash.
    pub fn new_with_key(key: &[u8; 16]) -> Self {
        Self {
            key: *key,
            hasher: SipHasher13::new_with_key(key),
        }
    }

    /// The key this hash was created with.
    pub fn key(&self) -> [u8; 16] {
        self.key
    }
}

impl Hash64 for SipHash64 {
    fn write(&mut self, bytes: &[u8]) {
        self.hasher.write(bytes);
    }

    fn sum64(&self) -> u64 {
        self.hasher.finish()
    }

    fn reset(&mut self) {
        self.hasher = SipHasher13::new_with_key(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest<H: Hash64>(hash: &mut H, bytes: &[u8]) -> u64 {
        hash.write(bytes);
        let sum = hash.sum64();
        hash.reset();
        sum
    }

    #[test]
    fn test_fnv_known_values() {
        let mut fnv = Fnv64::new();

        assert_eq!(fnv.sum64(), 14695981039346656037);
        assert_eq!(digest(&mut fnv, b"a"), 12638153115695167422);
        assert_eq!(digest(&mut fnv, b""), 14695981039346656037);
    }

    #[test]
    fn test_fnv_accumulates() {
        let mut split = Fnv64::new();
        split.write(b"david ");
        split.write(b"huie");

        let mut whole = Fnv64::new();
        whole.write(b"david huie");

        assert_eq!(split.sum64(), whole.sum64());
    }

    #[test]
    fn test_reset() {
        let mut fnv = Fnv64::new();
        let first = digest(&mut fnv, b"key");
        assert_eq!(digest(&mut fnv, b"key"), first);

        // Without a reset, the next digest depends on what came before.
        fnv.write(b"key");
        fnv.write(b"key");
        assert_ne!(fnv.sum64(), first);

        let mut sip = SipHash64::new_with_key(&[7; 16]);
        let first = digest(&mut sip, b"key");
        assert_eq!(digest(&mut sip, b"key"), first);
        assert_eq!(sip.key(), [7; 16]);
    }

    #[test]
    fn test_sip_is_keyed() {
        let mut a = SipHash64::new_with_key(&[1; 16]);
        let mut b = SipHash64::new_with_key(&[2; 16]);

        assert_ne!(digest(&mut a, b"key"), digest(&mut b, b"key"));
    }

    #[test]
    fn test_boxed() {
        let mut hash: Box<dyn Hash64> = Box::new(Fnv64::new());
        assert_eq!(digest(&mut hash, b"a"), 12638153115695167422);
    }
}

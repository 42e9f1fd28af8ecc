use std::io::Cursor;

/// A 32-bit non-cryptographic hash function used to place targets into percentage buckets.
///
/// Implementations must be deterministic and should distribute their output uniformly.
pub trait Hasher32: Sync + Send {
    /// Hashes the given payload.
    fn hash32(&self, payload: &[u8]) -> u32;
}

/// MurmurHash3 (x86, 32-bit) with seed `0`. This is the default [`Hasher32`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Murmur3Hasher;

impl Hasher32 for Murmur3Hasher {
    fn hash32(&self, payload: &[u8]) -> u32 {
        // Reading from an in-memory cursor can't fail.
        murmur3::murmur3_32(&mut Cursor::new(payload), 0).unwrap_or_default()
    }
}

#[cfg(test)]
mod hash_tests {
    use super::*;

    #[test]
    fn murmur3_empty_payload() {
        assert_eq!(Murmur3Hasher.hash32(b""), 0);
    }

    #[test]
    fn murmur3_is_deterministic() {
        let first = Murmur3Hasher.hash32(b"user-1checkout");
        let second = Murmur3Hasher.hash32(b"user-1checkout");
        assert_eq!(first, second);
        assert_ne!(first, Murmur3Hasher.hash32(b"user-2checkout"));
    }
}

//! Identifier hashing for shard routing.
//!
//! The hash is part of the wire contract: changing it re-routes every
//! identifier to a different shard, so it must stay byte-for-byte stable
//! across versions and platforms.

/// Hash an identifier into the 32-bit shard routing space.
///
/// CRC-32C over the identifier's string form. Deterministic and evenly
/// spread even for near-sequential human-readable identifiers.
pub fn hash(identifier: &str) -> u32 {
    crc32c::crc32c(identifier.as_bytes())
}

/// Index of the shard owning `hash` in a sorted list of range starts.
///
/// Picks the greatest start that is less than or equal to the hash. The
/// caller guarantees `starts` is sorted and begins with 0, so a shard
/// always exists.
pub fn select(starts: &[u32], hash: u32) -> usize {
    match starts.binary_search(&hash) {
        Ok(index) => index,
        Err(index) => index - 1,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(hash("user1"), hash("user1"));
        assert_ne!(hash("user1"), hash("user2"));
    }

    #[test]
    fn test_stable() {
        // Locked: changing these re-routes production data.
        assert_eq!(hash(""), 0);
        assert_eq!(hash("a"), 0xc1d04330u32);
        assert_eq!(hash("user1"), 0x8e120919u32);
        assert_eq!(hash("123456789"), 0xe3069283u32);
    }

    #[test]
    fn test_spread() {
        // 1000 sequential identifiers should land on both halves of a
        // two-shard split.
        let half = (0..1000)
            .filter(|i| hash(&format!("user{}", i)) >= 0x8000_0000)
            .count();
        assert!(half > 350 && half < 650, "skewed split: {}", half);
    }

    #[test]
    fn test_select() {
        let starts = [0u32, 100, 200];
        assert_eq!(select(&starts, 0), 0);
        assert_eq!(select(&starts, 99), 0);
        assert_eq!(select(&starts, 100), 1);
        assert_eq!(select(&starts, 150), 1);
        assert_eq!(select(&starts, 200), 2);
        assert_eq!(select(&starts, u32::MAX), 2);
    }
}

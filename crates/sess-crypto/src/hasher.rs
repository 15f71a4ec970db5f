/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"sess-id-v1"`) that is prepended
/// to every hash computation, so digests computed for different purposes can
/// never collide even over identical bytes.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for session identifiers.
    pub const SESSION_ID: Self = Self {
        domain: "sess-id-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> [u8; 32] {
        self.hash_parts(&[data])
    }

    /// Hash a sequence of fields with domain separation.
    ///
    /// Every part is prefixed with its length (u64, little-endian), so
    /// `["ab", "c"]` and `["a", "bc"]` hash differently.
    pub fn hash_parts(&self, parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        *hasher.finalize().as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let data = b"hello world";
        assert_eq!(
            ContentHasher::SESSION_ID.hash(data),
            ContentHasher::SESSION_ID.hash(data)
        );
    }

    #[test]
    fn different_domains_produce_different_hashes() {
        let other = ContentHasher::new("sess-other-v1");
        assert_ne!(
            ContentHasher::SESSION_ID.hash(b"same content"),
            other.hash(b"same content")
        );
    }

    #[test]
    fn part_boundaries_are_significant() {
        let h = ContentHasher::SESSION_ID;
        assert_ne!(h.hash_parts(&[b"ab", b"c"]), h.hash_parts(&[b"a", b"bc"]));
        assert_ne!(h.hash_parts(&[b"abc"]), h.hash_parts(&[b"abc", b""]));
    }
}

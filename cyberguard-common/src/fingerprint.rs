//! Content fingerprinting
//!
//! A fingerprint identifies "the same content analysed the same way" so a
//! history store can upsert instead of duplicating entries.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest
pub const FINGERPRINT_LEN: usize = 16;

/// Fingerprint raw content for a given analysis kind
///
/// SHA-256 over `"{kind}:"` followed by the content bytes, truncated to
/// [`FINGERPRINT_LEN`] lowercase hex characters.
pub fn content_fingerprint(kind: &str, content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(b":");
    hasher.update(content);
    let digest = hasher.finalize();

    digest[..FINGERPRINT_LEN / 2]
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Normalise text before fingerprinting (trim + collapse whitespace runs)
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_length_and_hex() {
        let fp = content_fingerprint("text", b"hello");
        assert_eq!(fp.len(), FINGERPRINT_LEN);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_kind_changes_fingerprint() {
        assert_ne!(
            content_fingerprint("text", b"same"),
            content_fingerprint("image", b"same")
        );
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let fp = content_fingerprint("text", b"abc");
        assert_eq!(fp, content_fingerprint("text", b"abc"));
        assert_ne!(fp, content_fingerprint("text", b"abd"));
    }

    #[test]
    fn test_normalize_text_collapses_whitespace() {
        assert_eq!(normalize_text("  a \n\t b  c "), "a b c");
        assert_eq!(normalize_text(""), "");
    }
}

//! Salted SHA-1 hashing for fields marked `hash: true`.

use sha1::{Digest, Sha1};
use std::fmt::Write as _;

/// Hash `value` with `salt` appended, rendering the digest as lowercase hex.
/// This is the raw primitive: it hashes an absent salt as well, since the
/// decision to refuse a `hash: true` field with no configured salt is made
/// by the caller before a row ever reaches here (see
/// `sirad_pipeline::splitter`'s salt-presence check).
pub fn salted_hash(value: &str, salt: Option<&str>) -> String {
    let mut hasher = Sha1::new();
    hasher.update(value.as_bytes());
    if let Some(salt) = salt {
        hasher.update(salt.as_bytes());
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        write!(hex, "{byte:02x}").expect("writing to a String never fails");
    }
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_sha1_with_salt() {
        // SHA1("Smith" ++ "testcode")
        let hashed = salted_hash("Smith", Some("testcode"));
        assert_eq!(hashed.len(), 40);
        assert!(hashed.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_salts_produce_different_digests() {
        let a = salted_hash("Smith", Some("testcode"));
        let b = salted_hash("Smith", Some("othercode"));
        assert_ne!(a, b);
    }

    #[test]
    fn missing_salt_hashes_raw_value() {
        let with_empty_salt = salted_hash("Smith", Some(""));
        let no_salt = salted_hash("Smith", None);
        assert_ne!(with_empty_salt, no_salt);
    }
}

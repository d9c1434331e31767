//! Schema digest.
//!
//! The relation map records a content hash of the raw schema bytes so that
//! consumers can detect schema changes without diffing the whole map. The hash
//! is taken over the bytes exactly as read: no newline or encoding
//! normalization is applied first.

use sha2::{Digest, Sha256};

/// Hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha256,
}

/// Hash raw bytes using the selected algorithm.
pub fn hash_bytes(alg: HashAlg, bytes: &[u8]) -> Vec<u8> {
    match alg {
        HashAlg::Sha256 => {
            let mut h = Sha256::new();
            h.update(bytes);
            h.finalize().to_vec()
        }
    }
}

/// SHA-256 of the raw schema, as 64 lowercase hex characters.
pub fn schema_hash_hex(raw_schema: &[u8]) -> String {
    hex::encode(hash_bytes(HashAlg::Sha256, raw_schema))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_hash_stable() {
        let h1 = schema_hash_hex(b"definition user {}");
        let h2 = schema_hash_hex(b"definition user {}");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn known_vector() {
        assert_eq!(
            schema_hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn empty_input_hashes() {
        assert_eq!(
            schema_hash_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of a byte slice, returning a lowercase hex string.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compare a hex digest against the SHA-256 of `data`, ignoring case.
pub fn sha256_matches(data: &[u8], expected: &str) -> bool {
    sha256_bytes(data).eq_ignore_ascii_case(expected.trim())
}

use sha2::{Digest, Sha256};

/// Returns the checksum byte appended to a seed before mnemonic encoding:
/// the first byte of the double SHA-256 of `data`.
pub fn checksum_byte(data: &[u8]) -> u8 {
    let intermediate = Sha256::digest(data);
    Sha256::digest(intermediate)[0]
}

/// Checks that the last byte of `input` is the checksum of everything before it.
///
/// An empty buffer has no checksum byte and never validates.
pub fn validate_seed(input: &[u8]) -> bool {
    match input.split_last() {
        Some((checksum, seed)) => checksum_byte(seed) == *checksum,
        None => false,
    }
}

//! Test utilities: leaf hash generators.

use sha2::{Digest, Sha256};

/// `n` hex-encoded SHA-256 digests of random numbers.
pub(crate) fn random_leaf_hashes(n: usize) -> Vec<String> {
    (0..n)
        .map(|_| hex::encode(Sha256::digest(rand::random::<u64>().to_string())))
        .collect()
}

/// `n` hex-encoded SHA-256 digests derived from `seed`, reproducible across
/// runs.
pub(crate) fn seeded_leaf_hashes(seed: u64, n: usize) -> Vec<String> {
    (0..n as u64)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(seed.to_be_bytes());
            hasher.update(i.to_be_bytes());
            hex::encode(hasher.finalize())
        })
        .collect()
}

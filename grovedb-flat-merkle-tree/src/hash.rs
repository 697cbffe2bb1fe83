//! Hash adapter: hex-decode, SHA-256, hex-encode.
//!
//! Every pair combination in the tree goes through a [`MerkleHasher`]. The
//! inputs are concatenated as hex text *before* decoding, so two well-formed
//! digests always decode to their 64 raw bytes, while malformed input fails
//! with [`HashError::InvalidEncoding`].

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors raised by a [`MerkleHasher`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HashError {
    /// The input is not an even-length hex string.
    #[error("input is not valid hex ({len} chars): {source}")]
    InvalidEncoding {
        /// Length of the rejected input.
        len: usize,
        /// Decoder error.
        #[source]
        source: hex::FromHexError,
    },
    /// Failure reported by a custom adapter.
    #[error("hash adapter failure: {0}")]
    Adapter(String),
}

/// Hex-in, hex-out hash function used to combine tree nodes.
pub trait MerkleHasher {
    /// Hash the bytes encoded by `data` and return the hex-encoded digest.
    fn hash_hex(&self, data: &str) -> Result<String, HashError>;

    /// Hash the concatenation `left ++ right`.
    fn combine(&self, left: &str, right: &str) -> Result<String, HashError> {
        let mut data = String::with_capacity(left.len() + right.len());
        data.push_str(left);
        data.push_str(right);
        self.hash_hex(&data)
    }
}

/// The default adapter: lowercase hex SHA-256 over the hex-decoded input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Hex;

impl MerkleHasher for Sha256Hex {
    fn hash_hex(&self, data: &str) -> Result<String, HashError> {
        let bytes = hex::decode(data).map_err(|source| HashError::InvalidEncoding {
            len: data.len(),
            source,
        })?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

/// Hash `data` with the default [`Sha256Hex`] adapter.
pub fn merkle_hash(data: &str) -> Result<String, HashError> {
    Sha256Hex.hash_hex(data)
}

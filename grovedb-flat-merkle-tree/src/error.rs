use thiserror::Error;

use crate::hash::HashError;

/// Errors from flat Merkle tree operations.
#[derive(Debug, Error)]
pub enum FlatMerkleError {
    /// The tree has no leaves.
    #[error("merkle tree is empty")]
    EmptyTree,
    /// Leaf index at or beyond the leaf count.
    #[error("leaf index {index} is out of range (item count {item_count})")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leaves in the tree.
        item_count: usize,
    },
    /// The hash adapter rejected its input.
    #[error("hash computation failed: {0}")]
    HashComputation(#[from] HashError),
    /// Stored state that does not fit the flat layout.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// A proof that could not be encoded, decoded or validated.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
}

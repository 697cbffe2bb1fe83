//! Flat-array Merkle tree over hex-encoded SHA-256 leaf hashes.
//!
//! The whole tree lives in one root-first `Vec<String>`: index 0 is the root
//! and the last `item_count` entries are the leaves. Layer boundaries are
//! derived arithmetically, so a node is only ever referred to by its array
//! index.
//!
//! Parent hashes are `hash(left ++ right)` over the hex-decoded
//! concatenation. When a layer has odd width its last node is paired with
//! itself: `hash(node ++ node)`.
//!
//! ```text
//!            0
//!        1       2
//!      3   4     5
//!     6 7 8 9   10      (leaf 10 self-pairs, as does node 5)
//! ```

#![warn(missing_docs)]

mod error;
pub mod hash;
pub mod layer;
mod path;
mod proof;
mod tree;
mod update;
mod verify;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::FlatMerkleError;
pub use hash::{HashError, MerkleHasher, Sha256Hex, merkle_hash};
pub use layer::tree_element_count;
pub use path::{PathStep, PathWalker};
pub use proof::{InclusionProof, ProofItem, ProofSibling};
pub use tree::FlatMerkleTree;

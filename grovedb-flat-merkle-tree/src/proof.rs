//! Inclusion proofs.
//!
//! [`generate_proof`](FlatMerkleTree::generate_proof) returns the raw
//! `(direction, sibling index)` path, which is only meaningful next to the
//! tree it came from. [`InclusionProof`] resolves those indices into hashes so
//! that a party holding only the root can check a leaf.

use bincode::{Decode, Encode};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    FlatMerkleError, FlatMerkleTree,
    hash::MerkleHasher,
    layer::{Layer, checked_tree_element_count, layer_depth},
    path::PathWalker,
};

/// One entry of a proof path.
///
/// `is_left` means the sibling goes before the running hash
/// (`hash(sibling ++ current)`); otherwise after (`hash(current ++ sibling)`).
/// `index` is the sibling's absolute array index at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProofItem {
    /// Whether the sibling is concatenated before the running hash.
    pub is_left: bool,
    /// Absolute array index of the sibling.
    pub index: usize,
}

impl<H> FlatMerkleTree<H> {
    /// Proof path for the leaf at `leaf_index`, in leaf-to-root order.
    ///
    /// A single-leaf tree yields one self-paired item `(false, 1)`.
    pub fn generate_proof(&self, leaf_index: usize) -> Result<Vec<ProofItem>, FlatMerkleError> {
        Ok(self.walk(leaf_index)?.map(|step| step.item).collect())
    }

    /// Proof for the leaf at `leaf_index` with sibling hashes resolved.
    pub fn inclusion_proof(&self, leaf_index: usize) -> Result<InclusionProof, FlatMerkleError> {
        let mut position = self.leaf_position(leaf_index)?;
        let mut siblings = Vec::with_capacity(self.depth());
        if self.item_count > 1 {
            for step in self.walk(leaf_index)? {
                let sibling = if step.item.index == position {
                    ProofSibling::SelfPair
                } else if step.item.is_left {
                    ProofSibling::Left(self.hash_array[step.item.index].clone())
                } else {
                    ProofSibling::Right(self.hash_array[step.item.index].clone())
                };
                siblings.push(sibling);
                position = step.parent;
            }
        }
        Ok(InclusionProof {
            leaf_index,
            item_count: self.item_count,
            siblings,
        })
    }
}

/// A sibling hash on an inclusion proof path.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProofSibling {
    /// Concatenated before the running hash.
    Left(String),
    /// Concatenated after the running hash.
    Right(String),
    /// The node is the last of an odd-width layer and pairs with itself.
    SelfPair,
}

/// A self-contained inclusion proof for one leaf.
///
/// Fields are `pub(crate)` so proofs are only obtained through
/// [`FlatMerkleTree::inclusion_proof`] or
/// [`decode_from_slice`](InclusionProof::decode_from_slice), both of which
/// guarantee a path shape consistent with `(leaf_index, item_count)`.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InclusionProof {
    pub(crate) leaf_index: usize,
    pub(crate) item_count: usize,
    pub(crate) siblings: Vec<ProofSibling>,
}

impl InclusionProof {
    /// Index of the proved leaf.
    pub fn leaf_index(&self) -> usize {
        self.leaf_index
    }

    /// Number of leaves in the tree the proof was taken from.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Sibling hashes in leaf-to-root order. Empty for a single-leaf tree.
    pub fn siblings(&self) -> &[ProofSibling] {
        &self.siblings
    }

    /// Recompute the root implied by `leaf_hash` and this path.
    pub fn root_from_leaf<H: MerkleHasher>(
        &self,
        leaf_hash: &str,
        hasher: &H,
    ) -> Result<String, FlatMerkleError> {
        let mut running = leaf_hash.to_owned();
        for sibling in &self.siblings {
            running = match sibling {
                ProofSibling::Left(hash) => hasher.combine(hash, &running)?,
                ProofSibling::Right(hash) => hasher.combine(&running, hash)?,
                ProofSibling::SelfPair => hasher.combine(&running, &running)?,
            };
        }
        Ok(running)
    }

    /// Whether `leaf_hash` at this proof's leaf index hashes up to
    /// `expected_root`.
    pub fn verify<H: MerkleHasher>(
        &self,
        expected_root: &str,
        leaf_hash: &str,
        hasher: &H,
    ) -> Result<bool, FlatMerkleError> {
        Ok(self.root_from_leaf(leaf_hash, hasher)? == expected_root)
    }

    /// Check that the sibling sequence has the shape the flat layout
    /// dictates for `(leaf_index, item_count)`.
    fn validate(&self) -> Result<(), FlatMerkleError> {
        if self.item_count == 0 {
            return Err(FlatMerkleError::InvalidProof(
                "proof for an empty tree".into(),
            ));
        }
        if self.leaf_index >= self.item_count {
            return Err(FlatMerkleError::InvalidProof(format!(
                "leaf index {} is out of range (item count {})",
                self.leaf_index, self.item_count
            )));
        }
        let array_len = checked_tree_element_count(self.item_count).ok_or_else(|| {
            FlatMerkleError::InvalidProof(format!(
                "item count {} overflows the tree layout",
                self.item_count
            ))
        })?;
        let expected_len = if self.item_count == 1 {
            0
        } else {
            layer_depth(self.item_count)
        };
        if self.siblings.len() != expected_len {
            return Err(FlatMerkleError::InvalidProof(format!(
                "expected {} siblings for {} leaves, got {}",
                expected_len,
                self.item_count,
                self.siblings.len()
            )));
        }
        if self.item_count == 1 {
            return Ok(());
        }

        let leaves = Layer::leaves(array_len, self.item_count);
        let mut position = leaves.start + self.leaf_index;
        let walker = PathWalker::new(position, leaves);
        for (depth, (step, sibling)) in walker.zip(&self.siblings).enumerate() {
            let consistent = match sibling {
                ProofSibling::SelfPair => step.item.index == position,
                ProofSibling::Left(_) => step.item.index != position && step.item.is_left,
                ProofSibling::Right(_) => step.item.index != position && !step.item.is_left,
            };
            if !consistent {
                return Err(FlatMerkleError::InvalidProof(format!(
                    "sibling at depth {} does not match the tree layout",
                    depth
                )));
            }
            position = step.parent;
        }
        Ok(())
    }

    /// Encode to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, FlatMerkleError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| FlatMerkleError::InvalidProof(format!("encode error: {}", e)))
    }

    /// Decode from bytes using bincode.
    ///
    /// Rejects proofs whose path shape does not match their leaf index and
    /// item count.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self, FlatMerkleError> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 100 * 1024 * 1024 }>(); // 100MB limit
        let (proof, _): (Self, _) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| FlatMerkleError::InvalidProof(format!("decode error: {}", e)))?;
        proof.validate()?;
        Ok(proof)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{hash::Sha256Hex, test_utils::random_leaf_hashes};

    fn items(pairs: &[(bool, usize)]) -> Vec<ProofItem> {
        pairs
            .iter()
            .map(|&(is_left, index)| ProofItem { is_left, index })
            .collect()
    }

    #[test]
    fn test_generate_proof_five_leaves() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(5)).expect("build");
        assert_eq!(
            tree.generate_proof(3).expect("proof 3"),
            items(&[(true, 8), (true, 3), (false, 2)])
        );
        assert_eq!(
            tree.generate_proof(0).expect("proof 0"),
            items(&[(false, 7), (false, 4), (false, 2)])
        );
        assert_eq!(
            tree.generate_proof(4).expect("proof 4"),
            items(&[(false, 10), (false, 5), (true, 1)])
        );
    }

    #[test]
    fn test_generate_proof_six_leaves() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(6)).expect("build");
        assert_eq!(
            tree.generate_proof(4).expect("proof 4"),
            items(&[(false, 11), (false, 5), (true, 1)])
        );
        assert_eq!(
            tree.generate_proof(5).expect("proof 5"),
            items(&[(true, 10), (false, 5), (true, 1)])
        );
    }

    #[test]
    fn test_generate_proof_single_leaf() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(1)).expect("build");
        assert_eq!(tree.generate_proof(0).expect("proof"), items(&[(false, 1)]));
    }

    #[test]
    fn test_generate_proof_errors() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(3)).expect("build");
        assert_matches!(
            tree.generate_proof(3),
            Err(FlatMerkleError::IndexOutOfRange {
                index: 3,
                item_count: 3
            })
        );

        let empty = FlatMerkleTree::build(Vec::<String>::new()).expect("build empty");
        assert_matches!(empty.generate_proof(3), Err(FlatMerkleError::EmptyTree));
    }

    #[test]
    fn test_inclusion_proof_round_trip() {
        let leaves = random_leaf_hashes(7);
        let tree = FlatMerkleTree::build(leaves.clone()).expect("build");
        let root = tree.root().expect("root");
        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.inclusion_proof(i).expect("proof");
            assert_eq!(proof.siblings().len(), tree.depth());
            assert!(proof.verify(root, leaf, &Sha256Hex).expect("verify"));
        }
    }

    #[test]
    fn test_inclusion_proof_self_pair_marker() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(5)).expect("build");
        let proof = tree.inclusion_proof(4).expect("proof");
        assert_matches!(
            proof.siblings(),
            [ProofSibling::SelfPair, ProofSibling::SelfPair, ProofSibling::Left(_)]
        );
    }

    #[test]
    fn test_inclusion_proof_rejects_wrong_leaf() {
        let leaves = random_leaf_hashes(4);
        let tree = FlatMerkleTree::build(leaves.clone()).expect("build");
        let proof = tree.inclusion_proof(1).expect("proof");
        let root = tree.root().expect("root");
        assert!(!proof.verify(root, &leaves[2], &Sha256Hex).expect("verify"));
    }

    #[test]
    fn test_inclusion_proof_single_leaf() {
        let leaves = random_leaf_hashes(1);
        let tree = FlatMerkleTree::build(leaves.clone()).expect("build");
        let proof = tree.inclusion_proof(0).expect("proof");
        assert!(proof.siblings().is_empty());
        assert!(proof
            .verify(tree.root().expect("root"), &leaves[0], &Sha256Hex)
            .expect("verify"));
    }

    #[test]
    fn test_inclusion_proof_encode_decode() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(9)).expect("build");
        let proof = tree.inclusion_proof(8).expect("proof");
        let bytes = proof.encode_to_vec().expect("encode");
        let decoded = InclusionProof::decode_from_slice(&bytes).expect("decode");
        assert_eq!(decoded, proof);
    }

    #[test]
    fn test_decode_rejects_truncated_path() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(9)).expect("build");
        let mut proof = tree.inclusion_proof(2).expect("proof");
        proof.siblings.pop();
        let bytes = proof.encode_to_vec().expect("encode");
        assert_matches!(
            InclusionProof::decode_from_slice(&bytes),
            Err(FlatMerkleError::InvalidProof(_))
        );
    }

    #[test]
    fn test_decode_rejects_flipped_direction() {
        let tree = FlatMerkleTree::build(random_leaf_hashes(4)).expect("build");
        let mut proof = tree.inclusion_proof(0).expect("proof");
        let ProofSibling::Right(hash) = proof.siblings[0].clone() else {
            panic!("leaf 0 has its sibling on the right");
        };
        proof.siblings[0] = ProofSibling::Left(hash);
        let bytes = proof.encode_to_vec().expect("encode");
        assert_matches!(
            InclusionProof::decode_from_slice(&bytes),
            Err(FlatMerkleError::InvalidProof(_))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_matches!(
            InclusionProof::decode_from_slice(&[0xff, 0xff, 0xff]),
            Err(FlatMerkleError::InvalidProof(_))
        );
    }
}

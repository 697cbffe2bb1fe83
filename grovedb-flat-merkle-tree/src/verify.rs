//! Verification: whole-tree consistency and single leaf against the root.

use log::debug;

use crate::{FlatMerkleError, FlatMerkleTree, hash::MerkleHasher, layer::layers};

impl<H: MerkleHasher> FlatMerkleTree<H> {
    /// Check that every internal node equals the hash of its children.
    ///
    /// Each layer is recomputed from the stored layer below it. Returns
    /// `Ok(false)` at the first mismatch. An empty or single-leaf tree has
    /// no internal nodes and is always consistent.
    pub fn verify_tree(&self) -> Result<bool, FlatMerkleError> {
        let mut consistent = true;
        self.scan_internal_nodes(|_| {
            consistent = false;
            false
        })?;
        Ok(consistent)
    }

    /// Every internal array position whose stored hash differs from the
    /// recomputation, in descending position order.
    pub fn find_mismatches(&self) -> Result<Vec<usize>, FlatMerkleError> {
        let mut mismatches = Vec::new();
        self.scan_internal_nodes(|position| {
            mismatches.push(position);
            true
        })?;
        Ok(mismatches)
    }

    /// Recompute internal nodes bottom-up, calling `on_mismatch` with the
    /// position of each stored node that disagrees. The scan stops when the
    /// callback returns `false`.
    fn scan_internal_nodes<F>(&self, mut on_mismatch: F) -> Result<(), FlatMerkleError>
    where
        F: FnMut(usize) -> bool,
    {
        for layer in layers(self.hash_array.len(), self.item_count) {
            if layer.is_root() {
                break;
            }
            let parent = layer.parent();
            let children = &self.hash_array[layer.start..=layer.end];
            // Walk right to left so positions come out in descending order.
            for (offset, pair) in children.chunks(2).enumerate().rev() {
                let recomputed = match pair {
                    [left, right] => self.hasher.combine(left, right)?,
                    [last] => self.hasher.combine(last, last)?,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                };
                let position = parent.start + offset;
                if self.hash_array[position] != recomputed {
                    debug!("hash mismatch at position {}", position);
                    if !on_mismatch(position) {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Whether `leaf_hash`, placed at `leaf_index`, hashes up to the stored
    /// root.
    ///
    /// The stored value of the leaf is ignored, so this checks an externally
    /// obtained hash against the tree's recorded root. A non-matching hash
    /// yields `Ok(false)`.
    pub fn verify_leaf(&self, leaf_index: usize, leaf_hash: &str) -> Result<bool, FlatMerkleError> {
        let computed = self.root_from_leaf(leaf_index, leaf_hash)?;
        Ok(self.hash_array[0] == computed)
    }

    /// Root implied by `leaf_hash` at `leaf_index` and the stored siblings.
    ///
    /// In a single-leaf tree the leaf is the root, so `leaf_hash` is
    /// returned as is.
    pub fn root_from_leaf(
        &self,
        leaf_index: usize,
        leaf_hash: &str,
    ) -> Result<String, FlatMerkleError> {
        let mut position = self.leaf_position(leaf_index)?;
        let mut running = leaf_hash.to_owned();
        if self.item_count == 1 {
            return Ok(running);
        }
        for step in self.walk(leaf_index)? {
            running = self.combine_with_sibling(&step.item, position, &running)?;
            position = step.parent;
        }
        debug_assert_eq!(position, 0);
        Ok(running)
    }
}

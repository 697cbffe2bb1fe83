//! Leaf replacement with ancestor recomputation.

use log::debug;

use crate::{FlatMerkleError, FlatMerkleTree, hash::MerkleHasher};

impl<H: MerkleHasher> FlatMerkleTree<H> {
    /// Replace the leaf at `leaf_index` with `new_hash` and recompute every
    /// ancestor up to the root.
    ///
    /// All new values are computed before anything is written: if hashing
    /// fails anywhere on the path the tree is left unchanged.
    pub fn update_leaf(
        &mut self,
        leaf_index: usize,
        new_hash: impl Into<String>,
    ) -> Result<(), FlatMerkleError> {
        let staged = self.stage_update(leaf_index, new_hash.into())?;
        debug!(
            "updating leaf {}: writing {} nodes",
            leaf_index,
            staged.len()
        );
        for (position, hash) in staged {
            self.hash_array[position] = hash;
        }
        Ok(())
    }

    /// New `(position, hash)` values for the leaf and each of its ancestors,
    /// leaf first.
    fn stage_update(
        &self,
        leaf_index: usize,
        new_hash: String,
    ) -> Result<Vec<(usize, String)>, FlatMerkleError> {
        let mut position = self.leaf_position(leaf_index)?;
        let mut staged = Vec::with_capacity(self.depth() + 1);
        if self.item_count == 1 {
            // The lone leaf is the root.
            staged.push((position, new_hash));
            return Ok(staged);
        }

        let mut running = new_hash.clone();
        staged.push((position, new_hash));
        for step in self.walk(leaf_index)? {
            running = self.combine_with_sibling(&step.item, position, &running)?;
            staged.push((step.parent, running.clone()));
            position = step.parent;
        }
        Ok(staged)
    }
}

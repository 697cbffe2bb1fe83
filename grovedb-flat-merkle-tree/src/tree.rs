use log::{debug, trace};

use crate::{
    FlatMerkleError,
    hash::{MerkleHasher, Sha256Hex},
    layer::{Layer, checked_tree_element_count, layer_depth, tree_element_count},
    path::PathWalker,
    proof::ProofItem,
};

/// A Merkle tree stored as one flat, root-first array of hex hashes.
///
/// Index 0 holds the root and the last `item_count` slots hold the leaves in
/// their original order. Every layer in between is `ceil(width / 2)` nodes
/// wide, the last node of an odd-width layer being hashed with itself.
///
/// The shape is fixed at construction. Only leaf values (and with them their
/// ancestors) change, through [`update_leaf`](Self::update_leaf).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatMerkleTree<H = Sha256Hex> {
    pub(crate) hash_array: Vec<String>,
    pub(crate) item_count: usize,
    pub(crate) hasher: H,
}

impl FlatMerkleTree<Sha256Hex> {
    /// Build a tree over `leaf_hashes` with the default SHA-256 adapter.
    ///
    /// An empty input produces an empty tree, which every leaf operation
    /// rejects with [`FlatMerkleError::EmptyTree`].
    pub fn build<I>(leaf_hashes: I) -> Result<Self, FlatMerkleError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::build_with_hasher(leaf_hashes, Sha256Hex)
    }

    /// Reconstitute a tree from an exported array, see
    /// [`from_parts_with_hasher`](Self::from_parts_with_hasher).
    pub fn from_parts(hash_array: Vec<String>, item_count: usize) -> Result<Self, FlatMerkleError> {
        Self::from_parts_with_hasher(hash_array, item_count, Sha256Hex)
    }
}

impl<H: MerkleHasher> FlatMerkleTree<H> {
    /// Build a tree over `leaf_hashes`, combining nodes with `hasher`.
    pub fn build_with_hasher<I>(leaf_hashes: I, hasher: H) -> Result<Self, FlatMerkleError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let leaves: Vec<String> = leaf_hashes.into_iter().map(Into::into).collect();
        let item_count = leaves.len();

        // Layers bottom-up; flattened root-first once complete.
        let mut built: Vec<Vec<String>> = vec![leaves];
        while let Some(current) = built.last().filter(|layer| layer.len() > 1) {
            let next = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hasher.combine(left, right),
                    [last] => hasher.combine(last, last),
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect::<Result<Vec<String>, _>>()?;
            trace!("built layer of {} nodes", next.len());
            built.push(next);
        }

        let mut hash_array = Vec::with_capacity(tree_element_count(item_count));
        for layer in built.into_iter().rev() {
            hash_array.extend(layer);
        }
        debug_assert_eq!(hash_array.len(), tree_element_count(item_count));

        debug!(
            "built flat merkle tree: {} leaves, {} nodes",
            item_count,
            hash_array.len()
        );
        Ok(FlatMerkleTree {
            hash_array,
            item_count,
            hasher,
        })
    }

    /// Reconstitute a tree from a previously exported array.
    ///
    /// Only the layout is checked: `hash_array` must have exactly
    /// `tree_element_count(item_count)` entries. Node contents are taken as
    /// given; run [`verify_tree`](Self::verify_tree) to check them.
    pub fn from_parts_with_hasher(
        hash_array: Vec<String>,
        item_count: usize,
        hasher: H,
    ) -> Result<Self, FlatMerkleError> {
        let expected = checked_tree_element_count(item_count).ok_or_else(|| {
            FlatMerkleError::InvalidData(format!("{} leaves do not fit in memory", item_count))
        })?;
        if hash_array.len() != expected {
            return Err(FlatMerkleError::InvalidData(format!(
                "array of {} entries does not fit {} leaves (expected {})",
                hash_array.len(),
                item_count,
                expected
            )));
        }
        Ok(FlatMerkleTree {
            hash_array,
            item_count,
            hasher,
        })
    }

    /// Combine `running` (the hash currently at `position`) with the sibling
    /// described by `item`.
    ///
    /// A self-paired node is combined with `running` itself rather than its
    /// stored value, so the result depends only on the caller's hash.
    pub(crate) fn combine_with_sibling(
        &self,
        item: &ProofItem,
        position: usize,
        running: &str,
    ) -> Result<String, FlatMerkleError> {
        let sibling = if item.index == position {
            running
        } else {
            self.hash_array[item.index].as_str()
        };
        let combined = if item.is_left {
            self.hasher.combine(sibling, running)?
        } else {
            self.hasher.combine(running, sibling)?
        };
        Ok(combined)
    }

    /// Hasher used to combine nodes.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }
}

impl<H> FlatMerkleTree<H> {
    /// Number of leaves.
    pub fn item_count(&self) -> usize {
        self.item_count
    }

    /// Total number of stored nodes.
    pub fn len(&self) -> usize {
        self.hash_array.len()
    }

    /// Whether the tree has no leaves.
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    /// The root hash, or `None` for an empty tree.
    pub fn root(&self) -> Option<&str> {
        self.hash_array.first().map(String::as_str)
    }

    /// Number of steps in the proof of any leaf.
    pub fn depth(&self) -> usize {
        match self.item_count {
            0 => 0,
            1 => 1,
            n => layer_depth(n),
        }
    }

    /// The whole array, root first.
    pub fn hash_array(&self) -> &[String] {
        &self.hash_array
    }

    /// The stored hash at absolute array index `position`.
    pub fn node(&self, position: usize) -> Option<&str> {
        self.hash_array.get(position).map(String::as_str)
    }

    /// The leaf hashes in their original order.
    pub fn leaves(&self) -> &[String] {
        &self.hash_array[self.hash_array.len() - self.item_count..]
    }

    /// The stored hash of leaf `leaf_index`.
    pub fn leaf(&self, leaf_index: usize) -> Result<&str, FlatMerkleError> {
        let position = self.leaf_position(leaf_index)?;
        Ok(&self.hash_array[position])
    }

    /// Absolute array index of leaf `leaf_index`.
    pub fn leaf_position(&self, leaf_index: usize) -> Result<usize, FlatMerkleError> {
        if self.item_count == 0 {
            return Err(FlatMerkleError::EmptyTree);
        }
        if leaf_index >= self.item_count {
            return Err(FlatMerkleError::IndexOutOfRange {
                index: leaf_index,
                item_count: self.item_count,
            });
        }
        Ok(self.hash_array.len() - self.item_count + leaf_index)
    }

    /// Walk from the leaf at `leaf_index` to the root.
    pub fn walk(&self, leaf_index: usize) -> Result<PathWalker, FlatMerkleError> {
        let position = self.leaf_position(leaf_index)?;
        Ok(PathWalker::new(position, self.leaf_layer()))
    }

    /// Split the tree into its array and leaf count.
    pub fn into_parts(self) -> (Vec<String>, usize) {
        (self.hash_array, self.item_count)
    }

    pub(crate) fn leaf_layer(&self) -> Layer {
        Layer::leaves(self.hash_array.len(), self.item_count)
    }
}

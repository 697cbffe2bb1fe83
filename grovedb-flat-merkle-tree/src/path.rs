//! Leaf-to-root traversal.

use std::iter::FusedIterator;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{layer::Layer, proof::ProofItem};

/// One step of a leaf-to-root walk: the sibling combined with the current
/// node, and the array index of the parent they produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathStep {
    /// Direction and array index of the sibling.
    pub item: ProofItem,
    /// Array index of the parent node.
    pub parent: usize,
}

/// Iterator over the [`PathStep`]s from a leaf to the root.
///
/// Created by [`FlatMerkleTree::walk`](crate::FlatMerkleTree::walk), which
/// validates the leaf index, so iteration itself never fails.
#[derive(Debug, Clone)]
pub struct PathWalker {
    current: usize,
    layer: Layer,
    single_leaf_step: Option<PathStep>,
}

impl PathWalker {
    /// Start a walk at absolute array index `position` inside `leaves`.
    pub(crate) fn new(position: usize, leaves: Layer) -> Self {
        debug_assert!(leaves.contains(position));
        // A lone leaf is also the root; it is reported as paired with itself
        // so callers always see at least one step.
        let single_leaf_step = (leaves.width == 1).then_some(PathStep {
            item: ProofItem {
                is_left: false,
                index: 1,
            },
            parent: 0,
        });
        PathWalker {
            current: position,
            layer: leaves,
            single_leaf_step,
        }
    }
}

impl Iterator for PathWalker {
    type Item = PathStep;

    fn next(&mut self) -> Option<PathStep> {
        if self.current == 0 {
            return self.single_leaf_step.take();
        }
        let item = self.layer.resolve_sibling(self.current);
        let parent = self.layer.parent_position(self.current);
        self.layer = self.layer.parent();
        self.current = parent;
        log::trace!(
            "path step: sibling {} (left: {}), parent {}",
            item.index,
            item.is_left,
            parent
        );
        Some(PathStep { item, parent })
    }
}

impl FusedIterator for PathWalker {}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(array_len: usize, item_count: usize, leaf_index: usize) -> Vec<(bool, usize, usize)> {
        let leaves = Layer::leaves(array_len, item_count);
        PathWalker::new(leaves.start + leaf_index, leaves)
            .map(|s| (s.item.is_left, s.item.index, s.parent))
            .collect()
    }

    #[test]
    fn test_walk_five_leaves() {
        assert_eq!(
            steps(11, 5, 3),
            vec![(true, 8, 4), (true, 3, 1), (false, 2, 0)]
        );
        assert_eq!(
            steps(11, 5, 4),
            vec![(false, 10, 5), (false, 5, 2), (true, 1, 0)]
        );
    }

    #[test]
    fn test_walk_two_leaves() {
        assert_eq!(steps(3, 2, 0), vec![(false, 2, 0)]);
        assert_eq!(steps(3, 2, 1), vec![(true, 1, 0)]);
    }

    #[test]
    fn test_walk_single_leaf_is_self_paired() {
        assert_eq!(steps(1, 1, 0), vec![(false, 1, 0)]);
    }

    #[test]
    fn test_walk_is_fused() {
        let leaves = Layer::leaves(3, 2);
        let mut walker = PathWalker::new(2, leaves);
        assert!(walker.next().is_some());
        assert!(walker.next().is_none());
        assert!(walker.next().is_none());
    }
}

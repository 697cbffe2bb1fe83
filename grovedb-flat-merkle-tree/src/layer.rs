//! Layer arithmetic for the flat, root-first array layout.
//!
//! A tree over `n` leaves stores its layers back to back, root first:
//!
//! ```text
//! n = 5:   [ r | a b | c d e | l0 l1 l2 l3 l4 ]
//! index:     0   1 2   3 4 5   6  7  8  9  10
//! ```
//!
//! Each parent layer is `ceil(width / 2)` wide. When a layer has odd width its
//! last node pairs with itself.

use crate::proof::ProofItem;

/// Width of the layer above a layer of `width` nodes.
#[inline]
pub const fn parent_width(width: usize) -> usize {
    width.div_ceil(2)
}

/// Total number of array slots needed for a tree over `item_count` leaves.
///
/// Returns 0 for an empty tree and 1 for a single leaf. Saturates at
/// `usize::MAX` for leaf counts no array could hold; use
/// [`checked_tree_element_count`] on untrusted counts.
pub fn tree_element_count(item_count: usize) -> usize {
    checked_tree_element_count(item_count).unwrap_or(usize::MAX)
}

/// [`tree_element_count`], or `None` if the total overflows `usize`.
pub fn checked_tree_element_count(item_count: usize) -> Option<usize> {
    let mut width = item_count;
    let mut total = width;
    while width > 1 {
        width = parent_width(width);
        total = total.checked_add(width)?;
    }
    Some(total)
}

/// Number of parent layers above the leaves, i.e. the proof length for any
/// leaf of a tree with at least two leaves.
pub fn layer_depth(item_count: usize) -> usize {
    let mut width = item_count;
    let mut depth = 0;
    while width > 1 {
        width = parent_width(width);
        depth += 1;
    }
    depth
}

/// One horizontal slice of the tree: the inclusive array range
/// `start..=end` holding `width` nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    /// Array index of the first node.
    pub start: usize,
    /// Array index of the last node.
    pub end: usize,
    /// Number of nodes.
    pub width: usize,
}

impl Layer {
    /// The leaf layer of an array of `array_len` slots holding `item_count`
    /// leaves. `item_count` must be non-zero.
    pub fn leaves(array_len: usize, item_count: usize) -> Self {
        debug_assert!(item_count > 0 && item_count <= array_len);
        Layer {
            start: array_len - item_count,
            end: array_len - 1,
            width: item_count,
        }
    }

    /// True for the single-node layer at index 0.
    pub fn is_root(&self) -> bool {
        self.start == 0
    }

    /// The layer directly above this one. Must not be called on the root.
    pub fn parent(&self) -> Self {
        debug_assert!(!self.is_root(), "root layer has no parent");
        let width = parent_width(self.width);
        Layer {
            start: self.start - width,
            end: self.start - 1,
            width,
        }
    }

    /// Absolute index of the parent of `position` (a node of this layer).
    pub fn parent_position(&self, position: usize) -> usize {
        debug_assert!(self.contains(position));
        self.parent().start + (position - self.start) / 2
    }

    /// Whether `position` falls inside this layer.
    pub fn contains(&self, position: usize) -> bool {
        (self.start..=self.end).contains(&position)
    }

    /// Decide which node `position` is combined with to form its parent.
    ///
    /// The last node of an odd-width layer pairs with itself; every other
    /// node pairs with its neighbour, to the right when its offset inside the
    /// layer is even and to the left when odd.
    pub fn resolve_sibling(&self, position: usize) -> ProofItem {
        debug_assert!(self.contains(position));
        if self.width % 2 == 1 && position == self.end {
            return ProofItem {
                is_left: false,
                index: position,
            };
        }
        if (position - self.start) % 2 == 0 {
            ProofItem {
                is_left: false,
                index: position + 1,
            }
        } else {
            ProofItem {
                is_left: true,
                index: position - 1,
            }
        }
    }
}

/// All layers of a non-empty tree, from the leaves up to and including the
/// root.
pub fn layers(array_len: usize, item_count: usize) -> impl Iterator<Item = Layer> {
    let first = (item_count > 0).then(|| Layer::leaves(array_len, item_count));
    std::iter::successors(first, |layer| {
        (!layer.is_root()).then(|| layer.parent())
    })
}

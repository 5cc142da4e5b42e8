//! Equal path lengths in a plain binary tree.
//!
//! This module is independent of [`AvlTree`](crate::AvlTree): it works on any owned binary tree,
//! balanced or not.

use alloc::boxed::Box;

/// An owned, unordered binary tree node.
///
/// Checking and dropping a tree both recurse once per level, so a degenerate tree (a chain of
/// single children) is limited in depth by the thread's stack size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryTree<T> {
    pub value: T,
    pub left: Option<Box<BinaryTree<T>>>,
    pub right: Option<Box<BinaryTree<T>>>,
}

impl<T> BinaryTree<T> {
    /// A node without children.
    pub fn leaf(value: T) -> Self {
        BinaryTree {
            value,
            left: None,
            right: None,
        }
    }

    /// A node with the given children.
    pub fn new(value: T, left: Option<BinaryTree<T>>, right: Option<BinaryTree<T>>) -> Self {
        BinaryTree {
            value,
            left: left.map(Box::new),
            right: right.map(Box::new),
        }
    }

    /// Returns `true` if every root-to-leaf path below this node has the same length.
    ///
    /// Only sibling subtrees are compared: a node with a single child is fine no matter how deep
    /// that child goes.
    pub fn has_equal_paths(&self) -> bool {
        !matches!(depth(Some(self)), Depth::Unequal)
    }
}

/// Returns `true` if every root-to-leaf path of the tree has the same length.
///
/// An empty tree has no paths to compare and returns `false`.
pub fn equal_paths<T>(root: Option<&BinaryTree<T>>) -> bool {
    matches!(depth(root), Depth::Height(_))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Depth {
    Empty,
    Height(usize),
    Unequal,
}

// Post-order: a leaf has height 0, a node with one child is one above it, and a node with two
// children requires both to be the same height.
fn depth<T>(node: Option<&BinaryTree<T>>) -> Depth {
    let Some(node) = node else {
        return Depth::Empty;
    };

    let left = depth(node.left.as_deref());
    if left == Depth::Unequal {
        return Depth::Unequal;
    }

    let right = depth(node.right.as_deref());

    match (left, right) {
        (_, Depth::Unequal) => Depth::Unequal,
        (Depth::Empty, Depth::Empty) => Depth::Height(0),
        (Depth::Height(h), Depth::Empty) | (Depth::Empty, Depth::Height(h)) => Depth::Height(h + 1),
        (Depth::Height(l), Depth::Height(r)) if l == r => Depth::Height(l + 1),
        _ => Depth::Unequal,
    }
}

use thiserror::Error;

/// A violated structural invariant, as reported by [`AvlTree::check_invariants`].
///
/// Nodes are identified by their position in key order, starting at 0.
///
/// [`AvlTree::check_invariants`]: crate::AvlTree::check_invariants
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantError {
    #[error("the root node has a parent link")]
    RootHasParent,

    #[error("node #{position} does not link back to its parent")]
    BrokenParentLink { position: usize },

    #[error("node #{position} is not greater than its predecessor")]
    OutOfOrder { position: usize },

    #[error("node #{position} stores balance {stored} but its subtrees differ by {actual}")]
    BalanceMismatch {
        position: usize,
        stored: i8,
        actual: isize,
    },

    #[error("node #{position} has subtrees differing in height by {balance}")]
    Unbalanced { position: usize, balance: isize },

    #[error("tree records {len} elements but {counted} are linked")]
    LengthMismatch { len: usize, counted: usize },
}

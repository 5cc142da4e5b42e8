use core::ptr::NonNull;

use crate::{
    balance::Balance,
    tracing_helpers::{debug_log, trace_log},
    AvlTree, Dir, Links, TreeNode,
};

/// How a subtree's height compares, after [`AvlTree::rebalance_at`], with its height while the
/// root was overweight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Rebalanced {
    /// The subtree is one level shorter.
    Shrunk,
    /// The subtree kept its height. Only possible after a removal.
    Unchanged,
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Rotates `node` down toward `dir`, promoting its child on the other side into its position.
    ///
    /// The promoted child's `dir` subtree is handed across to become `node`'s `!dir` subtree. If
    /// `node` was the root, the promoted child becomes the root. Balance factors are not updated.
    /// Returns the promoted child.
    ///
    /// # Panics
    ///
    /// Panics if `node` has no child on the `!dir` side.
    pub(crate) unsafe fn rotate(&mut self, node: NonNull<T>, dir: Dir) -> NonNull<T> {
        unsafe {
            let up = T::links(node)
                .as_ref()
                .child(!dir)
                .expect("rotation requires a child on the promoted side");

            trace_log!(?dir, "rotate");

            let across = T::links(up).as_ref().child(dir);
            T::links(node).as_mut().set_child(!dir, across);
            self.maybe_set_parent(across, Some(node));

            let parent = T::links(node).as_mut().set_parent(Some(up));
            T::links(up).as_mut().set_parent(parent);
            T::links(up).as_mut().set_child(dir, Some(node));

            self.replace_child_or_set_root(parent, node, Some(up));

            up
        }
    }

    /// Promotes the right child of `node` into its position.
    #[inline]
    pub(crate) unsafe fn rotate_left(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe { self.rotate(node, Dir::Left) }
    }

    /// Promotes the left child of `node` into its position.
    #[inline]
    pub(crate) unsafe fn rotate_right(&mut self, node: NonNull<T>) -> NonNull<T> {
        unsafe { self.rotate(node, Dir::Right) }
    }

    // Restores the balance of `node`, which is overweight toward `heavy`.
    //
    // Let `c` be the child of `node` on the heavy side.
    //
    // - If `c` does not lean away from `heavy`, a single rotation lifts `c` into `node`'s place.
    //   Both become even, unless `c` was even to begin with (which only happens after a removal),
    //   in which case `node` still leans toward `heavy`, `c` leans back, and the height holds.
    //
    // - Otherwise `c`'s inner child `g` is lifted over both by a double rotation and becomes
    //   even. `node` and `c` inherit the sides of `g`'s subtrees: whichever of them received the
    //   shorter half of `g` leans away from it.
    //
    // Returns the new root of the subtree.
    pub(crate) unsafe fn rebalance_at(
        &mut self,
        node: NonNull<T>,
        heavy: Dir,
    ) -> (NonNull<T>, Rebalanced) {
        unsafe {
            debug_assert!(T::links(node).as_ref().balance().is_overweight());

            let child = T::links(node)
                .as_ref()
                .child(heavy)
                .expect("an overweight node has a child on its heavy side");
            let child_balance = T::links(child).as_ref().balance();

            if !child_balance.leans(!heavy) {
                debug_log!(?heavy, even = child_balance.is_even(), "single rotation");

                self.rotate(node, !heavy);

                if child_balance.is_even() {
                    T::links(node).as_mut().set_balance(Balance::leaning(heavy));
                    T::links(child).as_mut().set_balance(Balance::leaning(!heavy));
                    return (child, Rebalanced::Unchanged);
                }

                T::links(node).as_mut().set_balance(Balance::EVEN);
                T::links(child).as_mut().set_balance(Balance::EVEN);
                return (child, Rebalanced::Shrunk);
            }

            let grandchild = T::links(child)
                .as_ref()
                .child(!heavy)
                .expect("a child leaning inward has an inner child");
            let grandchild_balance = T::links(grandchild).as_ref().balance();

            debug_log!(?heavy, "double rotation");

            self.rotate(child, heavy);
            self.rotate(node, !heavy);

            let (node_balance, child_balance) = if grandchild_balance.leans(heavy) {
                (Balance::leaning(!heavy), Balance::EVEN)
            } else if grandchild_balance.leans(!heavy) {
                (Balance::EVEN, Balance::leaning(heavy))
            } else {
                (Balance::EVEN, Balance::EVEN)
            };

            T::links(node).as_mut().set_balance(node_balance);
            T::links(child).as_mut().set_balance(child_balance);
            T::links(grandchild).as_mut().set_balance(Balance::EVEN);

            (grandchild, Rebalanced::Shrunk)
        }
    }
}

#[cfg(test)]
mod tests {
    use cordyceps::Linked;

    use super::*;
    use crate::model::TestNode;

    unsafe fn links<'a>(node: NonNull<TestNode>) -> &'a Links<TestNode> {
        unsafe { TestNode::links(node).as_ref() }
    }

    #[test]
    fn rotate_left_promotes_right_child() {
        let mut tree: AvlTree<TestNode> = AvlTree::new();

        // 1 -> 2 -> 3 as a right spine, linked without rebalancing.
        let one = TestNode::link_raw(&mut tree, 1, None);
        let two = TestNode::link_raw(&mut tree, 2, Some((one, Dir::Right)));
        let three = TestNode::link_raw(&mut tree, 3, Some((two, Dir::Right)));

        unsafe {
            let up = tree.rotate_left(one);
            assert_eq!(up, two);
            assert_eq!(tree.root, Some(two));
            assert_eq!(links(two).parent(), None);
            assert_eq!(links(two).left(), Some(one));
            assert_eq!(links(two).right(), Some(three));
            assert_eq!(links(one).parent(), Some(two));
            assert_eq!(links(one).right(), None);
            assert_eq!(links(three).parent(), Some(two));
        }
    }

    #[test]
    fn rotate_right_hands_across_subtree() {
        let mut tree: AvlTree<TestNode> = AvlTree::new();

        //       4
        //      /
        //     2
        //    / \
        //   1   3
        let four = TestNode::link_raw(&mut tree, 4, None);
        let two = TestNode::link_raw(&mut tree, 2, Some((four, Dir::Left)));
        let one = TestNode::link_raw(&mut tree, 1, Some((two, Dir::Left)));
        let three = TestNode::link_raw(&mut tree, 3, Some((two, Dir::Right)));

        unsafe {
            tree.rotate_right(four);
            assert_eq!(tree.root, Some(two));
            assert_eq!(links(two).left(), Some(one));
            assert_eq!(links(two).right(), Some(four));
            assert_eq!(links(four).left(), Some(three));
            assert_eq!(links(four).right(), None);
            assert_eq!(links(three).parent(), Some(four));
            assert_eq!(links(four).parent(), Some(two));
        }
    }

    #[test]
    fn rotate_below_root_relinks_parent() {
        let mut tree: AvlTree<TestNode> = AvlTree::new();

        let five = TestNode::link_raw(&mut tree, 5, None);
        let two = TestNode::link_raw(&mut tree, 2, Some((five, Dir::Left)));
        let three = TestNode::link_raw(&mut tree, 3, Some((two, Dir::Right)));

        unsafe {
            tree.rotate_left(two);
            assert_eq!(tree.root, Some(five));
            assert_eq!(links(five).left(), Some(three));
            assert_eq!(links(three).parent(), Some(five));
            assert_eq!(links(three).left(), Some(two));
        }
    }

    #[test]
    #[should_panic(expected = "rotation requires a child")]
    fn rotate_without_child_panics() {
        let mut tree: AvlTree<TestNode> = AvlTree::new();
        let one = TestNode::link_raw(&mut tree, 1, None);

        unsafe { tree.rotate_left(one) };
    }
}

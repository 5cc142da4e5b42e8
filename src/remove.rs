use core::{borrow::Borrow, ptr::NonNull};

use crate::{rotate::Rebalanced, tracing_helpers::debug_log, AvlTree, Dir, Links, TreeNode};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Removes the item corresponding to `key` from the tree and returns it.
    ///
    /// Returns `None`, leaving the tree untouched, if no item has the key.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = self.find_raw(key)?;
        Some(unsafe { self.remove_at(node) })
    }

    /// Removes an arbitrary node from the tree.
    ///
    /// # Safety
    ///
    /// It is the caller's responsibility to ensure that `node` is an element of `self`, and not any
    /// other tree.
    pub unsafe fn remove_at(&mut self, node: NonNull<T>) -> T::Handle {
        // If `node` has two children it trades places with its in-order predecessor, the maximum
        // of its left subtree. The predecessor has no right child, so afterward `node` has at most
        // one child and can be spliced out directly. The balance factors are traded back so that
        // each one describes the position it sits at.
        unsafe {
            let links = T::links(node).as_ref();
            if let (Some(left), Some(_)) = (links.left(), links.right()) {
                let predecessor = self.max_in_subtree(left);
                self.swap_positions(node, predecessor);

                let balance = T::links(node).as_ref().balance();
                let balance = T::links(predecessor).as_mut().set_balance(balance);
                T::links(node).as_mut().set_balance(balance);
            }

            let links = T::links(node).as_ref();
            let parent = links.parent();
            let child = links.left().or(links.right());
            let shrunk = parent.map(|p| self.which_child(p, node));

            self.replace_child_or_set_root(parent, node, child);
            self.maybe_set_parent(child, parent);

            T::links(node).as_mut().clear();
            self.len -= 1;

            if let (Some(parent), Some(shrunk)) = (parent, shrunk) {
                self.rebalance_removed(parent, shrunk);
            }

            T::from_ptr(node)
        }
    }

    // The `shrunk` subtree of `node` lost a level. Walks up the tree shifting each ancestor away
    // from the side that shrank:
    //
    // - An ancestor that becomes even has itself lost a level, so the walk continues.
    // - An ancestor that now leans one way kept its height, so the walk stops.
    // - An overweight ancestor is rotated. If that restores its subtree's former height the walk
    //   stops; otherwise it continues from the new subtree root.
    //
    // Unlike insertion, this may rotate at every level up to the root.
    unsafe fn rebalance_removed(&mut self, mut node: NonNull<T>, mut shrunk: Dir) {
        unsafe {
            loop {
                // Read the position of `node` before any rotation moves it.
                let parent = T::links(node).as_ref().parent();
                let side = parent.map(|p| self.which_child(p, node));

                let balance = T::links(node).as_ref().balance().toward(!shrunk);
                T::links(node).as_mut().set_balance(balance);

                if balance.is_overweight() {
                    debug_log!(heavy = ?!shrunk, len = self.len, "rebalancing after removal");

                    let (_, rebalanced) = self.rebalance_at(node, !shrunk);
                    if rebalanced == Rebalanced::Unchanged {
                        return;
                    }
                } else if !balance.is_even() {
                    return;
                }

                match (parent, side) {
                    (Some(parent), Some(side)) => {
                        node = parent;
                        shrunk = side;
                    }
                    _ => return,
                }
            }
        }
    }
}

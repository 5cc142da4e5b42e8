use core::ptr::NonNull;

use crate::{
    balance::Balance,
    bst::{InsertAs, Search},
    tracing_helpers::debug_log,
    AvlTree, Dir, Links, TreeNode,
};

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Inserts an item into the tree.
    ///
    /// If the tree already holds an item with an equal key, `item` takes over its position and
    /// balance and the old item is returned; the shape of the tree does not change. Otherwise
    /// `item` is linked as a new leaf, the tree is rebalanced and `None` is returned.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, item: T::Handle) -> Option<T::Handle> {
        let ptr = T::into_ptr(item);

        // SAFETY: `ptr` was just produced from a live handle, and the reference does not outlive
        // the search.
        let search = self.search(unsafe { ptr.as_ref() }.key());

        match search {
            Search::Occupied(old) => Some(unsafe { self.replace_node(old, ptr) }),
            Search::Vacant(at) => {
                unsafe { self.insert_at(ptr, at) };
                None
            }
        }
    }

    /// Links `node` at the position found by an insertion search and rebalances.
    ///
    /// # Safety
    ///
    /// `node` must not be linked into any tree and `at` must be the result of searching `self` for
    /// `node`'s key, with no modification of `self` since.
    pub(crate) unsafe fn insert_at(&mut self, node: NonNull<T>, at: InsertAs<T>) {
        unsafe { T::links(node).as_mut().clear() };

        match at {
            InsertAs::Root => {
                debug_assert!(self.root.is_none());
                self.root = Some(node);
            }

            InsertAs::Child { parent, dir } => unsafe {
                debug_assert!(T::links(parent).as_ref().child(dir).is_none());

                T::links(parent).as_mut().set_child(dir, Some(node));
                T::links(node).as_mut().set_parent(Some(parent));

                self.rebalance_inserted(parent, dir);
            },
        }

        self.len += 1;
    }

    // Rebalances after a new leaf was linked as the `dir` child of `parent`.
    //
    // The new leaf's own balance is 0. Its parent either absorbs the new level (it leaned the other
    // way), or grows by a level and the growth is passed upward.
    unsafe fn rebalance_inserted(&mut self, parent: NonNull<T>, dir: Dir) {
        unsafe {
            let balance = T::links(parent).as_ref().balance().toward(dir);
            T::links(parent).as_mut().set_balance(balance);

            if balance.is_even() {
                return;
            }

            if balance.is_overweight() {
                // The `dir` slot of `parent` was empty, so `parent` could only have leaned toward
                // `dir` if its balance factor was already wrong. `parent` then holds only the
                // new leaf, and rotating it up leaves a valid two-node subtree in every build, so
                // the stale factor is repaired here. Anything else below `parent` is a panic.
                let leaf = T::links(parent)
                    .as_ref()
                    .child(dir)
                    .expect("new leaf is linked below its parent");
                assert!(
                    T::links(parent).as_ref().child(!dir).is_none()
                        && T::links(leaf).as_ref().is_leaf(),
                    "overweight parent of a new leaf has other children"
                );

                match dir {
                    Dir::Left => self.rotate_right(parent),
                    Dir::Right => self.rotate_left(parent),
                };

                T::links(parent).as_mut().set_balance(Balance::EVEN);
                T::links(leaf).as_mut().set_balance(Balance::EVEN);
                return;
            }

            self.bubble_up(parent);
        }
    }

    // `node` grew by one level. Walks up the tree shifting each ancestor toward the side the
    // growth came from, until an ancestor absorbs it or becomes overweight and is rotated.
    //
    // After a rotation the subtree is back to its height before the insertion, so at most one
    // (single or double) rotation takes place.
    unsafe fn bubble_up(&mut self, mut node: NonNull<T>) {
        unsafe {
            while let Some(parent) = T::links(node).as_ref().parent() {
                let dir = self.which_child(parent, node);
                let balance = T::links(parent).as_ref().balance().toward(dir);
                T::links(parent).as_mut().set_balance(balance);

                if balance.is_even() {
                    return;
                }

                if balance.is_overweight() {
                    debug_log!(?dir, len = self.len, "rebalancing after insertion");
                    self.rebalance_at(parent, dir);
                    return;
                }

                node = parent;
            }
        }
    }

    // Puts `new` in the place of `old`, which holds an equal key, and returns `old`.
    pub(crate) unsafe fn replace_node(
        &mut self,
        old: NonNull<T>,
        new: NonNull<T>,
    ) -> T::Handle {
        unsafe {
            let old_links = T::links(old).as_ref();
            let parent = old_links.parent();
            let left = old_links.left();
            let right = old_links.right();
            let balance = old_links.balance();

            self.replace_child_or_set_root(parent, old, Some(new));
            self.maybe_set_parent(left, Some(new));
            self.maybe_set_parent(right, Some(new));

            let new_links = T::links(new).as_mut();
            new_links.set_parent(parent);
            new_links.set_child(Dir::Left, left);
            new_links.set_child(Dir::Right, right);
            new_links.set_balance(balance);

            T::links(old).as_mut().clear();

            T::from_ptr(old)
        }
    }
}

use core::{borrow::Borrow, mem, pin::Pin, ptr::NonNull};

use crate::{
    bst::{InsertAs, Search},
    AvlTree, Links, TreeNode,
};

/// A view into a single entry in an [`AvlTree`], which may be either vacant or occupied.
///
/// Returned by [`AvlTree::entry`].
pub enum Entry<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    Vacant(VacantEntry<'tree, T>),
    Occupied(OccupiedEntry<'tree, T>),
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Gets the entry for `key`.
    ///
    /// A vacant entry remembers where a node with `key` belongs, so inserting through it does not
    /// search the tree again.
    pub fn entry<Q>(&mut self, key: &Q) -> Entry<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Occupied(node) => Entry::Occupied(OccupiedEntry { tree: self, node }),
            Search::Vacant(insert_as) => Entry::Vacant(VacantEntry {
                tree: self,
                insert_as,
            }),
        }
    }
}

/// A vacant [`Entry`].
pub struct VacantEntry<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree mut AvlTree<T>,
    insert_as: InsertAs<T>,
}

impl<'tree, T> VacantEntry<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Inserts `item` at the position of this entry and rebalances the tree.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the key returned by `item.key()` is equal to the key used to
    /// retrieve this entry.
    pub unsafe fn insert(self, item: T::Handle) -> Pin<&'tree mut T> {
        let mut ptr = T::into_ptr(item);

        unsafe {
            self.tree.insert_at(ptr, self.insert_as);
            Pin::new_unchecked(ptr.as_mut())
        }
    }
}

/// An occupied [`Entry`].
pub struct OccupiedEntry<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: &'tree mut AvlTree<T>,
    node: NonNull<T>,
}

impl<'tree, T> OccupiedEntry<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a reference to the item in the entry.
    pub fn get(&self) -> Pin<&T> {
        // SAFETY: `self.tree` is mutably borrowed for `'tree`, and linked nodes are pinned.
        unsafe { Pin::new_unchecked(self.node.as_ref()) }
    }

    /// Returns a pinned mutable reference to the item in the entry.
    ///
    /// The key of the item must not be changed in a way that alters its ordering.
    pub fn get_mut(&mut self) -> Pin<&mut T> {
        unsafe { Pin::new_unchecked(self.node.as_mut()) }
    }

    /// Converts the entry into a pinned mutable reference to its item, bound to the tree borrow.
    pub fn into_mut(self) -> Pin<&'tree mut T> {
        let mut node = self.node;
        unsafe { Pin::new_unchecked(node.as_mut()) }
    }

    /// Puts `item` in the place of the entry's item and returns the previous item.
    ///
    /// The shape and balance of the tree do not change.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `item`'s key is equal to the key of the existing item.
    pub unsafe fn replace(&mut self, item: T::Handle) -> T::Handle {
        let new = T::into_ptr(item);
        let old = mem::replace(&mut self.node, new);

        unsafe { self.tree.replace_node(old, new) }
    }

    /// Removes and returns the item of this entry.
    pub fn remove(self) -> T::Handle {
        unsafe { self.tree.remove_at(self.node) }
    }
}

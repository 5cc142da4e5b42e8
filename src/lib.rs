//! An intrusive AVL tree.
#![cfg_attr(not(feature = "std"), no_std)]

// Conventions used in comments:
// - The height `h(x)` of a missing node is 0 and of a leaf is 1.
// - The balance factor of a node `x` is `h(right(x)) - h(left(x))`.
// - A node "leans" toward the side with the taller subtree, and is "overweight" when the
//   balance factor is ±2.
//
// The invariants of an AVL tree are:
// 1. Keys are in strict search-tree order.
// 2. Every balance factor is -1, 0 or 1.
//
// Rebalancing never recomputes heights. Each node stores its balance factor, and an insertion or
// removal adjusts the factors on the path to the root until the height change it causes is
// absorbed. See `insert.rs` and `remove.rs`.

#[cfg(feature = "alloc")]
extern crate alloc;

mod tracing_helpers;

mod balance;
mod bst;
mod cursor;
mod entry;
mod error;
mod insert;
mod iter;
mod remove;
mod rotate;

#[cfg(feature = "alloc")]
pub mod equal_paths;
#[cfg(feature = "alloc")]
pub mod map;

#[cfg(any(test, feature = "model"))]
pub mod model;

#[cfg(test)]
mod tests;

use core::{
    borrow::Borrow, cell::UnsafeCell, fmt, marker::PhantomPinned, mem, ops::Not, pin::Pin,
    ptr::NonNull,
};

use cordyceps::Linked;

use crate::balance::Balance;

pub use crate::{
    cursor::{Cursor, CursorMut},
    entry::{Entry, OccupiedEntry, VacantEntry},
    error::InvariantError,
    iter::Iter,
};

#[cfg(feature = "alloc")]
pub use crate::{equal_paths::BinaryTree, map::AvlMap};

/// An item which can be linked into an [`AvlTree`].
pub trait TreeNode<L>: Linked<L> {
    type Key: Ord;

    fn key(&self) -> &Self::Key;
}

/// An intrusive AVL tree.
///
/// Nodes are ordered by [`TreeNode::key`] and each key is present at most once. Lookup, insertion
/// and removal complete in _O(log(n))_ time.
pub struct AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    root: Link<T>,
    len: usize,
}

/// The links embedded in every node of an [`AvlTree`].
pub struct Links<T: ?Sized> {
    inner: UnsafeCell<LinksInner<T>>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[repr(C)]
struct LinksInner<T: ?Sized> {
    parent: Link<T>,
    children: [Link<T>; 2],
    balance: Balance,
    _unpin: PhantomPinned,
}

type Link<T> = Option<NonNull<T>>;

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<T> {
        AvlTree { root: None, len: 0 }
    }

    /// Returns `true` if the tree contains no elements.
    pub const fn is_empty(&self) -> bool {
        let empty = self.len() == 0;

        if cfg!(debug_assertions) {
            // Can't use assert_eq!() in const fn.
            assert!(empty == self.root.is_none());
        }

        empty
    }

    /// Returns the number of elements in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the height of the tree: the number of nodes on its longest root-to-leaf path.
    ///
    /// This follows the balance factors down the taller side and completes in _O(log(n))_ time.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            height += 1;

            let links = unsafe { T::links(cur).as_ref() };
            opt_cur = if links.balance().leans(Dir::Right) {
                links.right()
            } else {
                links.left()
            };
        }

        height
    }

    /// Returns the root element of the tree.
    pub fn root(&self) -> Option<Pin<&T>> {
        self.root
            .map(|root| unsafe { Pin::new_unchecked(root.as_ref()) })
    }

    /// Returns a reference to the element corresponding to `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let ptr = self.find_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_ref())) }
    }

    /// Returns a pinned mutable reference to the element corresponding to `key`.
    ///
    /// The key of the element must not be changed in a way that alters its ordering.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<Pin<&mut T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut ptr = self.find_raw(key)?;
        unsafe { Some(Pin::new_unchecked(ptr.as_mut())) }
    }

    /// Returns `true` if the tree contains an element corresponding to `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_raw(key).is_some()
    }

    /// Returns the minimum element of the tree.
    pub fn first(&self) -> Option<Pin<&T>> {
        self.first_raw()
            .map(|first| unsafe { Pin::new_unchecked(first.as_ref()) })
    }

    /// Returns the maximum element of the tree.
    pub fn last(&self) -> Option<Pin<&T>> {
        self.last_raw()
            .map(|last| unsafe { Pin::new_unchecked(last.as_ref()) })
    }

    /// Removes and returns the minimum element of the tree.
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        let first = self.first_raw()?;
        Some(unsafe { self.remove_at(first) })
    }

    /// Removes and returns the maximum element of the tree.
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        let last = self.last_raw()?;
        Some(unsafe { self.remove_at(last) })
    }

    /// Returns an iterator over the elements of the tree, in key order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Returns a cursor pointing to the minimum element of the tree.
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        Cursor::first(self)
    }

    /// Returns a cursor pointing to the maximum element of the tree.
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        Cursor::last(self)
    }

    /// Returns an editing cursor pointing to the minimum element of the tree.
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::first(self)
    }

    /// Returns an editing cursor pointing to the maximum element of the tree.
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::last(self)
    }

    /// Clears the tree, removing and dropping all elements.
    ///
    /// No rebalancing takes place; the nodes are unlinked bottom-up.
    pub fn clear(&mut self) {
        let mut opt_cur = self.root;

        while let Some(cur) = opt_cur {
            unsafe {
                // Descend to the minimum node.
                let cur = self.min_in_subtree(cur);
                let parent = T::links(cur).as_ref().parent();
                let right = T::links(cur).as_ref().right();

                // Elevate the node's right child (which may be None).
                self.replace_child_or_set_root(parent, cur, right);
                self.maybe_set_parent(right, parent);

                T::links(cur).as_mut().clear();
                drop(T::from_ptr(cur));
                self.len -= 1;

                opt_cur = right.or(parent);
            }
        }

        debug_assert!(self.root.is_none());
        debug_assert_eq!(self.len(), 0);
    }

    /// Verifies the structure of the entire tree.
    ///
    /// Checks key order, parent back-links, that every stored balance factor equals the actual
    /// difference in subtree heights, that no node is out of balance, and that the recorded length
    /// matches the number of linked nodes. This walks every node and takes _O(n)_ time.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut walk = InvariantWalk {
            position: 0,
            prev: None,
        };

        if let Some(root) = self.root {
            if unsafe { T::links(root).as_ref().parent() }.is_some() {
                return Err(InvariantError::RootHasParent);
            }

            unsafe { self.check_subtree(root, None, &mut walk)? };
        }

        if walk.position != self.len {
            return Err(InvariantError::LengthMismatch {
                len: self.len,
                counted: walk.position,
            });
        }

        Ok(())
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn assert_invariants(&self) {
        if let Err(error) = self.check_invariants() {
            panic!("AVL invariant violated: {error}");
        }
    }

    // Checks the subtree rooted at `node` in key order and returns its height.
    #[allow(clippy::only_used_in_recursion)]
    unsafe fn check_subtree(
        &self,
        node: NonNull<T>,
        parent: Link<T>,
        walk: &mut InvariantWalk<T>,
    ) -> Result<usize, InvariantError> {
        unsafe {
            let links = T::links(node).as_ref();

            let left_height = match links.left() {
                Some(left) => self.check_subtree(left, Some(node), walk)?,
                None => 0,
            };

            let position = walk.position;
            walk.position += 1;

            if links.parent() != parent {
                return Err(InvariantError::BrokenParentLink { position });
            }

            if let Some(prev) = walk.prev {
                if prev.as_ref().key() >= node.as_ref().key() {
                    return Err(InvariantError::OutOfOrder { position });
                }
            }
            walk.prev = Some(node);

            let right_height = match links.right() {
                Some(right) => self.check_subtree(right, Some(node), walk)?,
                None => 0,
            };

            let actual = right_height as isize - left_height as isize;
            let stored = links.balance().get();

            if stored as isize != actual {
                return Err(InvariantError::BalanceMismatch {
                    position,
                    stored,
                    actual,
                });
            }

            if actual.abs() > 1 {
                return Err(InvariantError::Unbalanced {
                    position,
                    balance: actual,
                });
            }

            Ok(1 + left_height.max(right_height))
        }
    }
}

struct InvariantWalk<T: ?Sized> {
    position: usize,
    prev: Link<T>,
}

impl<T> Default for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> Links<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: UnsafeCell::new(LinksInner {
                parent: None,
                children: [None; 2],
                balance: Balance::EVEN,
                _unpin: PhantomPinned,
            }),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.left().is_none() && self.right().is_none()
    }

    #[inline]
    fn balance(&self) -> Balance {
        unsafe { (*self.inner.get()).balance }
    }

    #[inline]
    fn parent(&self) -> Link<T> {
        unsafe { (*self.inner.get()).parent }
    }

    #[inline]
    fn child(&self, dir: Dir) -> Link<T> {
        unsafe { (*self.inner.get()).children[dir as usize] }
    }

    #[inline]
    fn left(&self) -> Link<T> {
        self.child(Dir::Left)
    }

    #[inline]
    fn right(&self) -> Link<T> {
        self.child(Dir::Right)
    }

    #[inline]
    fn set_parent(&mut self, parent: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().parent, parent)
    }

    #[inline]
    fn set_child(&mut self, dir: Dir, child: Link<T>) -> Link<T> {
        mem::replace(&mut self.inner.get_mut().children[dir as usize], child)
    }

    #[inline]
    fn set_balance(&mut self, balance: Balance) -> Balance {
        mem::replace(&mut self.inner.get_mut().balance, balance)
    }

    #[inline]
    fn clear(&mut self) {
        let inner = self.inner.get_mut();
        inner.parent = None;
        inner.children = [None; 2];
        inner.balance = Balance::EVEN;
    }
}

impl<T: ?Sized> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Links<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Links")
            .field("parent", &self.parent())
            .field("left", &self.left())
            .field("right", &self.right())
            .field("balance", &self.balance())
            .finish()
    }
}

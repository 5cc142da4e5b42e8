use core::{marker::PhantomData, pin::Pin, ptr::NonNull};

use crate::{AvlTree, Link, Links, TreeNode};

/// A read-only cursor over an [`AvlTree`].
///
/// The cursor rests either on an element or on a "ghost" position between the last element and
/// the first. Moving past either end lands on the ghost; moving again wraps around.
pub struct Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    curs: CursorRaw<T>,
    phantom: PhantomData<&'tree AvlTree<T>>,
}

impl<'tree, T> Cursor<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn first(tree: &'tree AvlTree<T>) -> Cursor<'tree, T> {
        Cursor {
            curs: CursorRaw::first(tree.into()),
            phantom: PhantomData,
        }
    }

    pub(crate) fn last(tree: &'tree AvlTree<T>) -> Cursor<'tree, T> {
        Cursor {
            curs: CursorRaw::last(tree.into()),
            phantom: PhantomData,
        }
    }

    /// Moves to the in-order successor, or from the ghost to the first element.
    pub fn move_next(&mut self) {
        unsafe { self.curs.move_next() }
    }

    /// Moves to the in-order predecessor, or from the ghost to the last element.
    pub fn move_prev(&mut self) {
        unsafe { self.curs.move_prev() }
    }

    /// Returns the current element, or `None` at the ghost position.
    pub fn get(&self) -> Option<Pin<&'tree T>> {
        unsafe { self.curs.get() }
    }

    /// Returns the element [`move_next`](Self::move_next) would land on.
    pub fn peek_next(&self) -> Option<Pin<&'tree T>> {
        unsafe { self.curs.peek_next() }
    }

    /// Returns the element [`move_prev`](Self::move_prev) would land on.
    pub fn peek_prev(&self) -> Option<Pin<&'tree T>> {
        unsafe { self.curs.peek_prev() }
    }
}

/// A cursor over an [`AvlTree`] which can remove elements.
///
/// Positions and movement are as for [`Cursor`].
pub struct CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    curs: CursorRaw<T>,
    phantom: PhantomData<&'tree mut AvlTree<T>>,
}

impl<'tree, T> CursorMut<'tree, T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn first(tree: &'tree mut AvlTree<T>) -> CursorMut<'tree, T> {
        CursorMut {
            curs: CursorRaw::first(tree.into()),
            phantom: PhantomData,
        }
    }

    pub(crate) fn last(tree: &'tree mut AvlTree<T>) -> CursorMut<'tree, T> {
        CursorMut {
            curs: CursorRaw::last(tree.into()),
            phantom: PhantomData,
        }
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    pub fn as_cursor(&self) -> Cursor<'_, T> {
        Cursor {
            curs: CursorRaw {
                tree: self.curs.tree,
                ptr: self.curs.ptr,
            },
            phantom: PhantomData,
        }
    }

    /// Moves to the in-order successor, or from the ghost to the first element.
    pub fn move_next(&mut self) {
        unsafe { self.curs.move_next() }
    }

    /// Moves to the in-order predecessor, or from the ghost to the last element.
    pub fn move_prev(&mut self) {
        unsafe { self.curs.move_prev() }
    }

    /// Returns the current element, or `None` at the ghost position.
    pub fn get(&self) -> Option<Pin<&T>> {
        unsafe { self.curs.get() }
    }

    /// Returns a pinned mutable reference to the current element.
    ///
    /// The key of the element must not be changed in a way that alters its ordering.
    pub fn get_mut(&mut self) -> Option<Pin<&mut T>> {
        unsafe { self.curs.get_mut() }
    }

    /// Returns the element [`move_next`](Self::move_next) would land on.
    pub fn peek_next(&self) -> Option<Pin<&T>> {
        unsafe { self.curs.peek_next() }
    }

    /// Returns the element [`move_prev`](Self::move_prev) would land on.
    pub fn peek_prev(&self) -> Option<Pin<&T>> {
        unsafe { self.curs.peek_prev() }
    }

    /// Removes the current element and moves to its successor.
    ///
    /// At the ghost position this returns `None` and changes nothing.
    pub fn remove_current(&mut self) -> Option<T::Handle> {
        unsafe { self.curs.remove_current() }
    }

    /// Removes the current element and moves to its predecessor.
    ///
    /// At the ghost position this returns `None` and changes nothing.
    pub fn remove_current_and_move_prev(&mut self) -> Option<T::Handle> {
        unsafe { self.curs.remove_current_and_move_prev() }
    }
}

struct CursorRaw<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: NonNull<AvlTree<T>>,
    ptr: Link<T>,
}

impl<T> CursorRaw<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn first(tree: NonNull<AvlTree<T>>) -> CursorRaw<T> {
        CursorRaw {
            tree,
            ptr: unsafe { tree.as_ref().first_raw() },
        }
    }

    fn last(tree: NonNull<AvlTree<T>>) -> CursorRaw<T> {
        CursorRaw {
            tree,
            ptr: unsafe { tree.as_ref().last_raw() },
        }
    }

    unsafe fn next_of(&self, ptr: Link<T>) -> Link<T> {
        let tree = unsafe { self.tree.as_ref() };

        match ptr {
            Some(p) => unsafe { tree.successor_raw(p) },
            None => tree.first_raw(),
        }
    }

    unsafe fn prev_of(&self, ptr: Link<T>) -> Link<T> {
        let tree = unsafe { self.tree.as_ref() };

        match ptr {
            Some(p) => unsafe { tree.predecessor_raw(p) },
            None => tree.last_raw(),
        }
    }

    unsafe fn move_next(&mut self) {
        self.ptr = unsafe { self.next_of(self.ptr) };
    }

    unsafe fn move_prev(&mut self) {
        self.ptr = unsafe { self.prev_of(self.ptr) };
    }

    unsafe fn get<'a>(&self) -> Option<Pin<&'a T>> {
        self.ptr
            .map(|p| unsafe { Pin::new_unchecked(p.as_ref()) })
    }

    unsafe fn get_mut<'a>(&mut self) -> Option<Pin<&'a mut T>> {
        self.ptr
            .map(|mut p| unsafe { Pin::new_unchecked(p.as_mut()) })
    }

    unsafe fn peek_next<'a>(&self) -> Option<Pin<&'a T>> {
        unsafe { self.next_of(self.ptr) }.map(|p| unsafe { Pin::new_unchecked(p.as_ref()) })
    }

    unsafe fn peek_prev<'a>(&self) -> Option<Pin<&'a T>> {
        unsafe { self.prev_of(self.ptr) }.map(|p| unsafe { Pin::new_unchecked(p.as_ref()) })
    }

    unsafe fn remove_current(&mut self) -> Option<T::Handle> {
        let remove = self.ptr?;

        unsafe {
            self.move_next();
            Some(self.tree.as_mut().remove_at(remove))
        }
    }

    unsafe fn remove_current_and_move_prev(&mut self) -> Option<T::Handle> {
        let remove = self.ptr?;

        unsafe {
            self.move_prev();
            Some(self.tree.as_mut().remove_at(remove))
        }
    }
}

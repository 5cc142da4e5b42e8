//! Plain binary-search-tree operations: search, navigation and relinking.
//!
//! Nothing in this module reads or writes balance factors.

use core::{borrow::Borrow, cmp::Ordering, ptr::NonNull};

use crate::{AvlTree, Dir, Link, Links, TreeNode};

/// The outcome of an insertion search.
pub(crate) enum Search<T: ?Sized> {
    /// A node with the searched key already exists.
    Occupied(NonNull<T>),
    /// No node has the searched key; a new node belongs at this position.
    Vacant(InsertAs<T>),
}

pub(crate) enum InsertAs<T: ?Sized> {
    Root,
    Child { parent: NonNull<T>, dir: Dir },
}

impl<T> AvlTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    pub(crate) fn find_raw<Q>(&self, key: &Q) -> Link<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Occupied(node) => Some(node),
            Search::Vacant(_) => None,
        }
    }

    /// Descends from the root toward `key`, stopping at the node holding it or at the empty slot a
    /// node with that key would occupy.
    pub(crate) fn search<Q>(&self, key: &Q) -> Search<T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(mut cur) = self.root else {
            return Search::Vacant(InsertAs::Root);
        };

        loop {
            let dir = match key.cmp(unsafe { cur.as_ref() }.key().borrow()) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Search::Occupied(cur),
                Ordering::Greater => Dir::Right,
            };

            match unsafe { T::links(cur).as_ref().child(dir) } {
                Some(child) => cur = child,
                None => return Search::Vacant(InsertAs::Child { parent: cur, dir }),
            }
        }
    }

    pub(crate) fn first_raw(&self) -> Link<T> {
        self.root.map(|root| unsafe { self.min_in_subtree(root) })
    }

    pub(crate) fn last_raw(&self) -> Link<T> {
        self.root.map(|root| unsafe { self.max_in_subtree(root) })
    }

    #[inline]
    pub(crate) unsafe fn min_in_subtree(&self, root: NonNull<T>) -> NonNull<T> {
        unsafe { self.extreme_in_subtree(root, Dir::Left) }
    }

    #[inline]
    pub(crate) unsafe fn max_in_subtree(&self, root: NonNull<T>) -> NonNull<T> {
        unsafe { self.extreme_in_subtree(root, Dir::Right) }
    }

    unsafe fn extreme_in_subtree(&self, root: NonNull<T>, dir: Dir) -> NonNull<T> {
        let mut cur = root;

        while let Some(next) = unsafe { T::links(cur).as_ref().child(dir) } {
            cur = next;
        }

        cur
    }

    /// Returns the in-order predecessor of `node`.
    pub(crate) unsafe fn predecessor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Left) }
    }

    /// Returns the in-order successor of `node`.
    pub(crate) unsafe fn successor_raw(&self, node: NonNull<T>) -> Link<T> {
        unsafe { self.neighbor_raw(node, Dir::Right) }
    }

    // The neighbor toward `dir` is the extreme node on the `!dir` side of the `dir` subtree, or
    // failing that, the first ancestor reached from its `!dir` side.
    unsafe fn neighbor_raw(&self, node: NonNull<T>, dir: Dir) -> Link<T> {
        unsafe {
            if let Some(child) = T::links(node).as_ref().child(dir) {
                return Some(self.extreme_in_subtree(child, !dir));
            }

            let mut cur = node;
            while let Some(parent) = T::links(cur).as_ref().parent() {
                if self.which_child(parent, cur) == !dir {
                    return Some(parent);
                }

                cur = parent;
            }

            None
        }
    }

    #[inline]
    pub(crate) unsafe fn which_child(&self, parent: NonNull<T>, child: NonNull<T>) -> Dir {
        if unsafe { T::links(parent).as_ref().left() } == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(unsafe { T::links(parent).as_ref().right() }, Some(child));
            Dir::Right
        }
    }

    #[inline]
    pub(crate) unsafe fn maybe_set_parent(&mut self, opt_node: Link<T>, parent: Link<T>) {
        let Some(node) = opt_node else {
            return;
        };

        unsafe { T::links(node).as_mut().set_parent(parent) };
    }

    #[inline]
    pub(crate) unsafe fn replace_child_or_set_root(
        &mut self,
        parent: Link<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        match parent {
            Some(parent) => unsafe { self.replace_child(parent, old_child, new_child) },
            None => self.root = new_child,
        }
    }

    // Replaces the child pointer of `parent` pointing at `old_child` with `new_child`.
    //
    // `new_child`'s parent pointer is not updated.
    //
    // # Safety
    //
    // The caller must ensure that `old_child` is a child node of `parent` and `new_child` is not.
    unsafe fn replace_child(
        &mut self,
        parent: NonNull<T>,
        old_child: NonNull<T>,
        new_child: Link<T>,
    ) {
        unsafe {
            let dir = self.which_child(parent, old_child);

            if let Some(new_child) = new_child {
                debug_assert_ne!(
                    T::links(parent).as_ref().child(!dir),
                    Some(new_child),
                    "`new_child` must not be a child of `parent`"
                );
            }

            T::links(parent).as_mut().set_child(dir, new_child);
        }
    }

    /// Exchanges the tree positions of `a` and `b`.
    ///
    /// Each node takes over the other's parent and children, including the case where one is the
    /// parent of the other. Balance factors stay with the nodes; callers that want them to stay
    /// with the positions must swap them separately.
    ///
    /// # Safety
    ///
    /// `a` and `b` must be distinct nodes of `self`.
    pub(crate) unsafe fn swap_positions(&mut self, a: NonNull<T>, b: NonNull<T>) {
        debug_assert_ne!(a, b);

        let swap = |link: Link<T>| match link {
            Some(n) if n == a => Some(b),
            Some(n) if n == b => Some(a),
            other => other,
        };

        unsafe {
            let a_parent = T::links(a).as_ref().parent();
            let b_parent = T::links(b).as_ref().parent();
            let a_children = [T::links(a).as_ref().left(), T::links(a).as_ref().right()];
            let b_children = [T::links(b).as_ref().left(), T::links(b).as_ref().right()];

            // Repoint the outside parents first, while the directions can still be read.
            let a_dir = a_parent.map(|p| self.which_child(p, a));
            let b_dir = b_parent.map(|p| self.which_child(p, b));

            match (a_parent, a_dir) {
                (Some(p), Some(dir)) if p != b => {
                    T::links(p).as_mut().set_child(dir, Some(b));
                }
                (None, _) => self.root = Some(b),
                _ => {}
            }

            match (b_parent, b_dir) {
                (Some(p), Some(dir)) if p != a => {
                    T::links(p).as_mut().set_child(dir, Some(a));
                }
                (None, _) => self.root = Some(a),
                _ => {}
            }

            let a_links = T::links(a).as_mut();
            a_links.set_parent(swap(b_parent));
            a_links.set_child(Dir::Left, swap(b_children[0]));
            a_links.set_child(Dir::Right, swap(b_children[1]));

            let b_links = T::links(b).as_mut();
            b_links.set_parent(swap(a_parent));
            b_links.set_child(Dir::Left, swap(a_children[0]));
            b_links.set_child(Dir::Right, swap(a_children[1]));

            for (node, children) in [(a, b_children), (b, a_children)] {
                for child in children.into_iter().filter_map(swap) {
                    T::links(child).as_mut().set_parent(Some(node));
                }
            }
        }
    }
}

use core::fmt;

use crate::Dir;

/// The balance factor of a node: the height of its right subtree minus the height of its left
/// subtree.
///
/// Between operations every node is in `-1..=1`. Rebalancing may push a node to `±2` for the span
/// of a single step; any value outside `-2..=2` is a bug and panics.
#[derive(Copy, Clone, PartialEq, Eq)]
pub(crate) struct Balance(i8);

impl Balance {
    pub(crate) const EVEN: Balance = Balance(0);

    /// A balance leaning one level toward `dir`.
    #[inline]
    pub(crate) const fn leaning(dir: Dir) -> Balance {
        match dir {
            Dir::Left => Balance(-1),
            Dir::Right => Balance(1),
        }
    }

    #[inline]
    pub(crate) const fn get(self) -> i8 {
        self.0
    }

    /// Returns the balance after the subtree on the `dir` side grew by one level.
    #[inline]
    pub(crate) fn toward(self, dir: Dir) -> Balance {
        let shifted = match dir {
            Dir::Left => self.0 - 1,
            Dir::Right => self.0 + 1,
        };

        assert!(
            (-2..=2).contains(&shifted),
            "balance factor {shifted} out of range"
        );

        Balance(shifted)
    }

    #[inline]
    pub(crate) fn is_even(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the node leans (by one or two levels) toward `dir`.
    #[inline]
    pub(crate) fn leans(self, dir: Dir) -> bool {
        match dir {
            Dir::Left => self.0 < 0,
            Dir::Right => self.0 > 0,
        }
    }

    /// Returns `true` if the node violates the AVL bound and must be rotated.
    #[inline]
    pub(crate) fn is_overweight(self) -> bool {
        self.0.abs() == 2
    }
}

impl fmt::Debug for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}

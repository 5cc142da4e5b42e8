extern crate std;

use std::{ops::Range, prelude::v1::*};

use proptest::prelude::*;

use crate::model::{self, TestNode};

use super::*;

// Pre-order listing of (key, balance factor).
fn shape(tree: &AvlTree<TestNode>) -> Vec<(u32, i8)> {
    fn walk(node: Link<TestNode>, out: &mut Vec<(u32, i8)>) {
        let Some(node) = node else {
            return;
        };

        unsafe {
            let links = TestNode::links(node).as_ref();
            out.push((node.as_ref().key, links.balance().get()));
            walk(links.left(), out);
            walk(links.right(), out);
        }
    }

    let mut out = Vec::new();
    walk(tree.root, &mut out);
    out
}

fn tree_of(keys: &[u32]) -> AvlTree<TestNode> {
    let mut tree = AvlTree::new();

    for &key in keys {
        assert!(tree.insert(TestNode::new(key)).is_none());
        tree.assert_invariants();
    }

    tree
}

fn insert_find_all(keys: &[u32]) {
    let tree = tree_of(keys);

    for key in keys {
        let node = tree.get(key).expect("item not found");
        assert_eq!(node.key(), key);
    }

    assert_eq!(tree.len(), keys.len());
}

fn insert_remove_all(keys: &[u32]) {
    let mut tree = tree_of(keys);

    for key in keys {
        let node = tree.remove(key).expect("item not found");
        assert_eq!(node.key, *key);
        tree.assert_invariants();
    }
    assert!(tree.is_empty());

    for &key in keys {
        tree.insert(TestNode::new(key));
        tree.assert_invariants();
    }

    for key in keys.iter().rev() {
        let node = tree.get(key).expect("item not found");
        let ptr = NonNull::from(node.get_ref());
        unsafe { tree.remove_at(ptr) };
        tree.assert_invariants();
    }
    assert!(tree.is_empty());
}

// Calls `f` with every permutation of `0..n`.
fn for_each_permutation(n: u32, f: fn(&[u32])) {
    fn go(prefix: &mut Vec<u32>, rest: &mut Vec<u32>, f: fn(&[u32])) {
        if rest.is_empty() {
            f(prefix);
            return;
        }

        for i in 0..rest.len() {
            let key = rest.remove(i);
            prefix.push(key);
            go(prefix, rest, f);
            prefix.pop();
            rest.insert(i, key);
        }
    }

    go(&mut Vec::new(), &mut (0..n).collect(), f);
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn permutations_find() {
    for n in 2..=5 {
        for_each_permutation(n, insert_find_all);
    }
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn permutations_remove() {
    for n in 2..=5 {
        for_each_permutation(n, insert_remove_all);
    }
}

#[test]
fn ascending_inserts_build_perfect_tree() {
    let tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(tree.height(), 3);
    assert_eq!(tree.root().map(|root| root.key), Some(4));
    assert_eq!(
        shape(&tree),
        [(4, 0), (2, 0), (1, 0), (3, 0), (6, 0), (5, 0), (7, 0)]
    );
}

#[test]
fn insert_double_rotation() {
    let tree = tree_of(&[3, 1, 2]);
    assert_eq!(shape(&tree), [(2, 0), (1, 0), (3, 0)]);

    let tree = tree_of(&[1, 3, 2]);
    assert_eq!(shape(&tree), [(2, 0), (1, 0), (3, 0)]);
}

#[test]
fn remove_leaf_without_rotation() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(tree.remove(&1).map(|node| node.key), Some(1));
    tree.assert_invariants();
    assert_eq!(tree.height(), 3);
    assert_eq!(
        shape(&tree),
        [(4, 0), (2, 1), (3, 0), (6, 0), (5, 0), (7, 0)]
    );
}

#[test]
fn remove_root_swaps_with_predecessor() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(tree.remove(&4).map(|node| node.key), Some(4));
    tree.assert_invariants();
    assert_eq!(
        shape(&tree),
        [(3, 0), (2, -1), (1, 0), (6, 0), (5, 0), (7, 0)]
    );
}

#[test]
fn remove_internal_swaps_with_predecessor() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);

    assert_eq!(tree.remove(&6).map(|node| node.key), Some(6));
    tree.assert_invariants();
    assert_eq!(
        shape(&tree),
        [(4, 0), (2, 0), (1, 0), (3, 0), (5, 1), (7, 0)]
    );
}

#[test]
fn remove_single_rotation() {
    let mut tree = tree_of(&[2, 1, 3, 4]);
    assert_eq!(shape(&tree), [(2, 1), (1, 0), (3, 1), (4, 0)]);

    tree.remove(&1);
    tree.assert_invariants();
    assert_eq!(shape(&tree), [(3, 0), (2, 0), (4, 0)]);
}

#[test]
fn remove_single_rotation_over_even_child() {
    let mut tree = tree_of(&[2, 1, 4, 3, 5]);
    assert_eq!(shape(&tree), [(2, 1), (1, 0), (4, 0), (3, 0), (5, 0)]);

    tree.remove(&1);
    tree.assert_invariants();
    assert_eq!(tree.height(), 3);
    assert_eq!(shape(&tree), [(4, -1), (2, 1), (3, 0), (5, 0)]);
}

#[test]
fn remove_double_rotation() {
    let mut tree = tree_of(&[3, 1, 5, 4]);

    tree.remove(&1);
    tree.assert_invariants();
    assert_eq!(shape(&tree), [(4, 0), (3, 0), (5, 0)]);
}

#[test]
fn remove_rotates_at_two_levels() {
    // The sparsest tree of height 5, built without any rotations.
    let mut tree = tree_of(&[8, 5, 11, 3, 6, 10, 12, 2, 4, 7, 9, 1]);
    assert_eq!(tree.height(), 5);
    assert_eq!(
        shape(&tree),
        [
            (8, -1),
            (5, -1),
            (3, -1),
            (2, -1),
            (1, 0),
            (4, 0),
            (6, 1),
            (7, 0),
            (11, -1),
            (10, -1),
            (9, 0),
            (12, 0),
        ]
    );

    tree.remove(&12);
    tree.assert_invariants();
    assert_eq!(tree.height(), 4);
    assert_eq!(
        shape(&tree),
        [
            (5, 0),
            (3, -1),
            (2, -1),
            (1, 0),
            (4, 0),
            (8, 0),
            (6, 1),
            (7, 0),
            (10, 0),
            (9, 0),
            (11, 0),
        ]
    );
}

#[test]
fn insert_duplicate_replaces_node_in_place() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5, 6, 7]);
    let before = shape(&tree);
    let old_root = tree.root.expect("tree is not empty");

    let old = tree.insert(TestNode::new(4)).expect("key was present");
    assert_eq!(NonNull::from(&*old), old_root);
    assert_eq!(old.links.parent(), None);
    assert!(old.links.is_leaf());

    assert_ne!(tree.root, Some(old_root));
    assert_eq!(tree.len(), 7);
    assert_eq!(shape(&tree), before);
    tree.assert_invariants();
}

#[test]
fn remove_absent_key_is_noop() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5]);
    let before = shape(&tree);

    assert!(tree.remove(&0).is_none());
    assert!(tree.remove(&6).is_none());
    assert_eq!(tree.len(), 5);
    assert_eq!(shape(&tree), before);

    let mut empty: AvlTree<TestNode> = AvlTree::new();
    assert!(empty.remove(&0).is_none());
    assert!(empty.pop_first().is_none());
    assert!(empty.pop_last().is_none());
}

#[test]
fn round_trip_empties_tree() {
    let keys: Vec<u32> = (0..64).map(|i| (i * 37) % 64).collect();
    let mut tree = tree_of(&keys);

    for key in keys.iter().rev() {
        assert!(tree.remove(key).is_some());
        tree.assert_invariants();
    }

    assert!(tree.root.is_none());
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
}

#[test]
fn height_stays_logarithmic() {
    let keys: Vec<u32> = (0..1000).collect();
    let tree = tree_of(&keys);

    // An AVL tree with n nodes is less than 1.45 * log2(n + 2) tall.
    assert!(tree.height() <= 14, "height {}", tree.height());
}

#[test]
fn ends_and_iteration() {
    let mut tree = tree_of(&[5, 3, 8, 1, 4, 9]);

    assert_eq!(tree.first().map(|n| n.key), Some(1));
    assert_eq!(tree.last().map(|n| n.key), Some(9));

    let keys: Vec<u32> = tree.iter().map(|n| n.key).collect();
    assert_eq!(keys, [1, 3, 4, 5, 8, 9]);
    let rev: Vec<u32> = tree.iter().rev().map(|n| n.key).collect();
    assert_eq!(rev, [9, 8, 5, 4, 3, 1]);

    let mut iter = tree.iter();
    assert_eq!(iter.len(), 6);
    assert_eq!(iter.next().map(|n| n.key), Some(1));
    assert_eq!(iter.next_back().map(|n| n.key), Some(9));
    assert_eq!(iter.len(), 4);
    assert_eq!((&tree).into_iter().count(), 6);

    assert_eq!(tree.pop_first().map(|n| n.key), Some(1));
    assert_eq!(tree.pop_last().map(|n| n.key), Some(9));
    tree.assert_invariants();
    assert_eq!(tree.len(), 4);
}

#[test]
fn cursor_wraps_through_ghost() {
    let tree = tree_of(&[2, 1, 3]);

    let mut cursor = tree.cursor_first();
    assert_eq!(cursor.get().map(|n| n.key), Some(1));
    assert_eq!(cursor.peek_prev().map(|n| n.key), None);

    cursor.move_prev();
    assert!(cursor.get().is_none());
    assert_eq!(cursor.peek_next().map(|n| n.key), Some(1));
    assert_eq!(cursor.peek_prev().map(|n| n.key), Some(3));

    cursor.move_prev();
    assert_eq!(cursor.get().map(|n| n.key), Some(3));

    let cursor = tree.cursor_last();
    assert_eq!(cursor.get().map(|n| n.key), Some(3));
    assert_eq!(cursor.peek_prev().map(|n| n.key), Some(2));
}

#[test]
fn cursor_mut_removes() {
    let mut tree = tree_of(&[1, 2, 3, 4, 5]);

    let mut cursor = tree.cursor_last_mut();
    assert_eq!(cursor.remove_current().map(|n| n.key), Some(5));
    assert!(cursor.get().is_none());

    cursor.move_prev();
    assert_eq!(cursor.as_cursor().get().map(|n| n.key), Some(4));
    assert_eq!(cursor.remove_current_and_move_prev().map(|n| n.key), Some(4));
    assert_eq!(cursor.get().map(|n| n.key), Some(3));
    drop(cursor);

    tree.assert_invariants();
    assert_eq!(tree.iter().map(|n| n.key).collect::<Vec<_>>(), [1, 2, 3]);
}

#[test]
fn entry_api() {
    let mut tree = tree_of(&[10, 20, 30]);

    match tree.entry(&25) {
        Entry::Vacant(entry) => {
            let node = unsafe { entry.insert(TestNode::new(25)) };
            assert_eq!(node.key, 25);
        }
        Entry::Occupied(_) => panic!("25 is not in the tree"),
    }
    tree.assert_invariants();
    assert_eq!(tree.len(), 4);

    match tree.entry(&20) {
        Entry::Occupied(mut entry) => {
            assert_eq!(entry.get().key, 20);
            let old = unsafe { entry.replace(TestNode::new(20)) };
            assert_eq!(old.key, 20);
            assert_eq!(entry.get_mut().key, 20);
        }
        Entry::Vacant(_) => panic!("20 is in the tree"),
    }
    tree.assert_invariants();
    assert_eq!(tree.len(), 4);

    match tree.entry(&10) {
        Entry::Occupied(entry) => assert_eq!(entry.remove().key, 10),
        Entry::Vacant(_) => panic!("10 is in the tree"),
    }
    tree.assert_invariants();
    assert_eq!(tree.iter().map(|n| n.key).collect::<Vec<_>>(), [20, 25, 30]);
}

#[test]
fn clear_and_reuse() {
    let mut tree = tree_of(&[4, 2, 6, 1, 3, 5, 7]);

    tree.clear();
    assert!(tree.is_empty());
    assert!(tree.first().is_none());
    tree.assert_invariants();

    tree.insert(TestNode::new(9));
    assert_eq!(tree.root().map(|n| n.key), Some(9));
    tree.assert_invariants();
}

#[test]
fn insert_repairs_stale_lean_at_leaf_parent() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let one = TestNode::link_raw(&mut tree, 1, None);
    unsafe {
        TestNode::links(one)
            .as_mut()
            .set_balance(Balance::leaning(Dir::Right));
    }

    assert!(tree.insert(TestNode::new(2)).is_none());
    tree.assert_invariants();
    assert_eq!(shape(&tree), [(2, 0), (1, 0)]);
}

#[test]
fn check_invariants_reports_stale_balance() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let one = TestNode::link_raw(&mut tree, 1, None);
    TestNode::link_raw(&mut tree, 2, Some((one, Dir::Right)));

    assert_eq!(
        tree.check_invariants(),
        Err(InvariantError::BalanceMismatch {
            position: 0,
            stored: 0,
            actual: 1,
        })
    );
}

#[test]
fn check_invariants_reports_overweight_node() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let one = TestNode::link_raw(&mut tree, 1, None);
    let two = TestNode::link_raw(&mut tree, 2, Some((one, Dir::Right)));
    TestNode::link_raw(&mut tree, 3, Some((two, Dir::Right)));

    unsafe {
        TestNode::links(two)
            .as_mut()
            .set_balance(Balance::leaning(Dir::Right));
        TestNode::links(one)
            .as_mut()
            .set_balance(Balance::leaning(Dir::Right).toward(Dir::Right));
    }

    assert_eq!(
        tree.check_invariants(),
        Err(InvariantError::Unbalanced {
            position: 0,
            balance: 2,
        })
    );
}

#[test]
fn check_invariants_reports_order_and_length() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let two = TestNode::link_raw(&mut tree, 2, None);
    TestNode::link_raw(&mut tree, 1, Some((two, Dir::Right)));
    unsafe {
        TestNode::links(two)
            .as_mut()
            .set_balance(Balance::leaning(Dir::Right));
    }

    assert_eq!(
        tree.check_invariants(),
        Err(InvariantError::OutOfOrder { position: 1 })
    );

    let mut tree = tree_of(&[1, 2, 3]);
    tree.len += 1;
    assert_eq!(
        tree.check_invariants(),
        Err(InvariantError::LengthMismatch { len: 4, counted: 3 })
    );
    tree.len -= 1;
}

#[test]
#[should_panic(expected = "AVL invariant violated")]
fn assert_invariants_panics() {
    let mut tree: AvlTree<TestNode> = AvlTree::new();
    let one = TestNode::link_raw(&mut tree, 1, None);
    TestNode::link_raw(&mut tree, 2, Some((one, Dir::Left)));

    tree.assert_invariants();
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        values in proptest::collection::vec(0u32..1000, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(values, ops);
    }
}

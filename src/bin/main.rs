use cordyceps_avl::{equal_paths::equal_paths, AvlMap, BinaryTree};

fn main() {
    // RUST_LOG=cordyceps_avl=trace shows every rotation.
    #[cfg(feature = "tracing")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut map = AvlMap::new();

    for key in [2, 0, 3, 4, 5, 1, 6] {
        map.insert(key, key * key);
        map.check_invariants().expect("tree is consistent after insert");
        println!("insert {key}: height {} {:?}", map.height(), map);
    }

    for key in [3, 0, 6] {
        let value = map.remove(&key);
        map.check_invariants().expect("tree is consistent after remove");
        println!("remove {key} -> {value:?}: height {} {:?}", map.height(), map);
    }

    //     1
    //    / \
    //   2   3
    //        \
    //         4
    let tree = BinaryTree::new(
        1,
        Some(BinaryTree::leaf(2)),
        Some(BinaryTree::new(3, None, Some(BinaryTree::leaf(4)))),
    );
    println!("equal paths: {}", equal_paths(Some(&tree)));
}

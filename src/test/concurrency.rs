use std::sync::Arc;
use std::thread;

use crate::kdtree::{KDTree, KDTreeIndex};
use crate::test::fixtures::{random_queries, random_records};
use crate::PointRecord;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn tree_is_shareable() {
    assert_send_sync::<KDTree<PointRecord>>();
    assert_send_sync::<crate::ReverseGeocoder>();
}

#[test]
fn concurrent_queries_match_sequential() {
    let tree = KDTree::build(random_records(10_000, 30));
    let queries = random_queries(400, 31);
    let expected: Vec<u64> = queries
        .iter()
        .map(|&(lat, lon)| tree.nearest(lat, lon).unwrap().id)
        .collect();

    thread::scope(|scope| {
        for chunk in 0..4 {
            let tree = &tree;
            let queries = &queries;
            let expected = &expected;
            scope.spawn(move || {
                for (i, &(lat, lon)) in queries.iter().enumerate().skip(chunk).step_by(4) {
                    assert_eq!(tree.nearest(lat, lon).unwrap().id, expected[i]);
                }
            });
        }
    });
}

#[test]
fn arc_shared_tree() {
    let tree = Arc::new(KDTree::build(random_records(1000, 32)));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || tree.nearest(i as f64 * 10., i as f64 * -20.).map(|r| r.id).ok())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let found = handle.join().unwrap();
        let expected = tree.nearest(i as f64 * 10., i as f64 * -20.).unwrap().id;
        assert_eq!(found, Some(expected));
    }
}

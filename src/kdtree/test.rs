use geo::{coord, Rect};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::kdtree::{
    DistanceMetric, EquirectangularDistance, EuclideanDistance, KDTree, KDTreeBuilder,
    KDTreeIndex, Node,
};
use crate::test::fixtures::{
    abc_records, brute_force_distance, brute_force_distances, gridded_records, random_queries,
    random_records,
};
use crate::{Axis, Coord, GeocodeError, Located, PointRecord};

fn make_index(records: &[PointRecord]) -> KDTree<PointRecord> {
    let mut builder = KDTreeBuilder::new(records.len());
    for record in records {
        builder.add(record.clone());
    }
    builder.finish()
}

/// Walk every node and check that its subtrees lie on the right side of its split.
fn assert_split_invariant<T: Located>(node: &Node<T>, expected_axis: Axis) {
    assert_eq!(node.axis(), expected_axis, "axis alternates by depth");

    let mut lat_min = node.item().coord().lat;
    let mut lat_max = lat_min;

    if let Some(left) = node.left_child() {
        for item in subtree_items(left) {
            let coord = item.coord();
            assert!(coord.get(node.axis()) <= node.split(), "left side is <= split");
            lat_min = lat_min.min(coord.lat);
            lat_max = lat_max.max(coord.lat);
        }
        assert_split_invariant(left, expected_axis.next());
    }
    if let Some(right) = node.right_child() {
        for item in subtree_items(right) {
            let coord = item.coord();
            assert!(coord.get(node.axis()) >= node.split(), "right side is >= split");
            lat_min = lat_min.min(coord.lat);
            lat_max = lat_max.max(coord.lat);
        }
        assert_split_invariant(right, expected_axis.next());
    }

    assert_eq!(node.lat_bounds(), (lat_min, lat_max), "latitude bounds cover subtree");
}

fn subtree_items<T>(node: &Node<T>) -> Vec<&T> {
    let mut items = vec![];
    let mut stack = vec![node];
    while let Some(node) = stack.pop() {
        items.push(node.item());
        stack.extend(node.left_child());
        stack.extend(node.right_child());
    }
    items
}

fn expected_depth(n: usize) -> usize {
    // ceil(log2(n + 1))
    (usize::BITS - n.leading_zeros()) as usize
}

#[test]
fn abc_scenario() {
    let tree = make_index(&abc_records());

    assert_eq!(tree.nearest(1., 1.).unwrap().name, "A");
    assert_eq!(tree.nearest(9., 9.).unwrap().name, "B");
    assert_eq!(tree.nearest(-4., 2.).unwrap().name, "C");
    assert_eq!(tree.nearest_coord(&Coord::new(9., 9.)).unwrap().id, 2);

    let root = tree.root().unwrap();
    assert!(root.is_parent());
    assert_eq!(root.item().name, "A", "median latitude of -5, 0, 10");
    assert!(root.left_child().unwrap().is_leaf());
    assert!(root.right_child().unwrap().is_leaf());
}

#[test]
fn creates_a_balanced_index() {
    for n in [1, 2, 3, 4, 7, 8, 9, 100, 1000, 4097] {
        let tree = make_index(&random_records(n, n as u64));
        assert_eq!(tree.num_items(), n);
        assert_eq!(tree.iter().count(), n, "one node per item");
        assert_eq!(tree.depth(), expected_depth(n), "depth for {n} items");
        assert!(tree.depth() <= 2 * expected_depth(n));
    }
}

#[test]
fn split_invariant_holds() {
    for records in [random_records(3000, 1), gridded_records(3000, 2)] {
        let tree = make_index(&records);
        assert_split_invariant(tree.root().unwrap(), Axis::Lat);
    }
}

#[test]
fn balanced_with_identical_points() {
    let records: Vec<PointRecord> = (0..1000)
        .map(|id| PointRecord::new(id, "same", 12.5, -7.25, crate::FeatureClass::Spot))
        .collect();
    let tree = make_index(&records);
    assert_eq!(tree.depth(), expected_depth(records.len()));

    let (found, dist) = tree.nearest_with_distance(12.5, -7.25).unwrap();
    assert_eq!(found.name, "same");
    assert_eq!(dist, 0.0);
}

#[test]
fn every_point_finds_itself() {
    let records = random_records(5000, 42);
    let tree = make_index(&records);

    for record in &records {
        let (found, dist) = tree
            .nearest_with_distance(record.latitude, record.longitude)
            .unwrap();
        assert_eq!(dist, 0.0);
        assert_eq!(found.latitude, record.latitude);
        assert_eq!(found.longitude, record.longitude);
        assert_eq!(found.id, record.id);
    }
}

#[test]
fn matches_brute_force() {
    for records in [
        random_records(2000, 5),
        gridded_records(2000, 6),
        random_records(17, 7),
    ] {
        let tree = make_index(&records);
        for (lat, lon) in random_queries(500, 8) {
            let (_, dist) = tree.nearest_with_distance(lat, lon).unwrap();
            let expected = brute_force_distance(&records, lat, lon, &EquirectangularDistance);
            assert_eq!(dist, expected, "query ({lat}, {lon})");
        }
    }
}

#[test]
fn matches_brute_force_euclidean() {
    let records = random_records(2000, 9);
    let tree = make_index(&records);
    for (lat, lon) in random_queries(500, 10) {
        let (found, dist) = tree
            .nearest_with_metric(lat, lon, &EuclideanDistance)
            .unwrap();
        let expected = brute_force_distance(&records, lat, lon, &EuclideanDistance);
        assert_eq!(dist, expected);
        assert_eq!(
            EuclideanDistance.distance(Coord::new(lat, lon), found.coord()),
            dist
        );
    }
}

#[test]
fn high_latitude_queries() {
    // Longitude differences matter little near the poles; the pruning bound must still hold.
    let records = random_records(3000, 12)
        .into_iter()
        .map(|mut record| {
            record.latitude = 70. + (record.latitude + 90.) / 9.;
            record
        })
        .collect::<Vec<_>>();
    let tree = make_index(&records);
    for (lat, lon) in random_queries(300, 13) {
        let lat = 60. + lat.abs() / 3.;
        let (_, dist) = tree.nearest_with_distance(lat, lon).unwrap();
        let expected = brute_force_distance(&records, lat, lon, &EquirectangularDistance);
        assert_eq!(dist, expected, "query ({lat}, {lon})");
    }
}

#[test]
fn neighbors_match_brute_force() {
    let records = random_records(1500, 14);
    let tree = make_index(&records);
    for (lat, lon) in random_queries(100, 15) {
        let found = tree
            .neighbors_with_metric(lat, lon, 10, &EquirectangularDistance)
            .unwrap();
        let distances: Vec<f64> = found.iter().map(|(_, dist)| *dist).collect();
        let expected = brute_force_distances(&records, lat, lon, &EquirectangularDistance);
        assert_eq!(distances, &expected[..10]);

        let nearest = tree.nearest(lat, lon).unwrap();
        assert_eq!(found[0].0.id, nearest.id, "first neighbor is the nearest");
    }
}

#[test]
fn neighbors_edge_cases() {
    let tree = make_index(&abc_records());
    assert!(tree.neighbors(0., 0., 0).unwrap().is_empty());

    let all = tree.neighbors(0., 0., 10).unwrap();
    let names: Vec<&str> = all.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, vec!["A", "C", "B"]);
}

#[test]
fn empty_index() {
    let tree: KDTree<PointRecord> = KDTree::build(vec![]);
    assert!(tree.is_empty());
    assert_eq!(tree.depth(), 0);
    assert!(tree.root().is_none());

    assert!(matches!(tree.nearest(0., 0.), Err(GeocodeError::EmptyIndex)));
    assert!(matches!(
        tree.neighbors(10., 10., 3),
        Err(GeocodeError::EmptyIndex)
    ));
    assert!(tree.range(-90., -180., 90., 180.).is_empty());
    assert_eq!(tree.iter().count(), 0);
}

#[test]
fn single_item() {
    let tree: KDTree<Coord> = [Coord::new(51.5, -0.12)].into_iter().collect();
    assert_eq!(tree.depth(), 1);
    assert!(tree.root().unwrap().is_leaf());
    assert!(!tree.root().unwrap().is_parent());
    assert_eq!(
        *tree.nearest(-33.9, 151.2).unwrap(),
        Coord::new(51.5, -0.12)
    );
}

#[test]
fn ties_keep_the_first_item_reached() {
    // The root is the upper median, (1, 0), and is visited before the equally distant (-1, 0).
    let tree = KDTree::build([Coord::new(1., 0.), Coord::new(-1., 0.)]);
    assert_eq!(*tree.root().unwrap().item(), Coord::new(1., 0.));
    for _ in 0..3 {
        assert_eq!(*tree.nearest(0., 0.).unwrap(), Coord::new(1., 0.));
    }
}

#[test]
fn input_order_does_not_change_distances() {
    let records = gridded_records(1000, 16);
    let mut shuffled = records.clone();
    shuffled.shuffle(&mut StdRng::seed_from_u64(17));

    let a = make_index(&records);
    let b = make_index(&shuffled);
    assert_eq!(a.depth(), b.depth());

    for (lat, lon) in random_queries(300, 18) {
        let (_, dist_a) = a.nearest_with_distance(lat, lon).unwrap();
        let (_, dist_b) = b.nearest_with_distance(lat, lon).unwrap();
        assert_eq!(dist_a, dist_b);
    }

    // Same input order, same answers down to identity.
    let c = make_index(&records);
    for (lat, lon) in random_queries(50, 19) {
        assert_eq!(a.nearest(lat, lon).unwrap().id, c.nearest(lat, lon).unwrap().id);
    }
}

#[test]
fn garbage_coordinates_do_not_panic() {
    let mut records = random_records(200, 20);
    records.push(PointRecord::new(1000, "nan", f64::NAN, 0., crate::FeatureClass::Spot));
    records.push(PointRecord::new(1001, "far north", 400., 900., crate::FeatureClass::Spot));
    records.push(PointRecord::new(1002, "inf", 0., f64::INFINITY, crate::FeatureClass::Spot));
    let tree = make_index(&records);
    assert_eq!(tree.num_items(), records.len());

    assert!(tree.nearest(10., 10.).is_ok());
    assert!(tree.nearest(f64::NAN, f64::NAN).is_ok());
    assert!(tree.nearest(500., -500.).is_ok());
    assert!(tree.neighbors(f64::NAN, 3., 5).is_ok());
}

#[test]
fn range_search() {
    let records = random_records(3000, 21);
    let tree = make_index(&records);

    let (min_lat, min_lon, max_lat, max_lon) = (-20., 30., 50., 70.);
    let mut result: Vec<u64> = tree
        .range(min_lat, min_lon, max_lat, max_lon)
        .into_iter()
        .map(|record| record.id)
        .collect();
    result.sort_unstable();

    let expected: Vec<u64> = records
        .iter()
        .filter(|r| {
            r.latitude >= min_lat
                && r.latitude <= max_lat
                && r.longitude >= min_lon
                && r.longitude <= max_lon
        })
        .map(|r| r.id)
        .collect();

    assert!(!expected.is_empty());
    assert_eq!(result, expected);
}

#[test]
fn range_rect_uses_lon_lat_order() {
    let tree = make_index(&abc_records());
    // x is longitude, y is latitude
    let rect = Rect::new(coord! { x: 2., y: -6. }, coord! { x: 11., y: 1. });
    let found: Vec<&str> = tree
        .range_rect(&rect)
        .into_iter()
        .map(|record| record.name.as_str())
        .collect();
    assert_eq!(found, vec!["C"]);
}

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo_traits::{CoordTrait, RectTrait};
use tinyvec::TinyVec;

use crate::error::{GeocodeError, Result};
use crate::kdtree::distance::{DistanceMetric, EquirectangularDistance};
use crate::kdtree::{KDTree, Node};
use crate::r#type::{Axis, Coord, Located};

/// A trait for searching and accessing data out of a KDTree.
///
/// Every query only reads the tree, so a tree shared between threads can be queried from all of
/// them at once.
pub trait KDTreeIndex<T: Located>: Sized {
    /// The root node, or `None` for an empty tree.
    fn root(&self) -> Option<&Node<T>>;

    /// The number of items in this KDTree
    fn num_items(&self) -> usize;

    /// Returns `true` if the tree holds no items.
    fn is_empty(&self) -> bool {
        self.num_items() == 0
    }

    /// The number of levels of the tree. An empty tree has depth 0, a single item depth 1.
    fn depth(&self) -> usize {
        self.root().map_or(0, Node::depth)
    }

    /// Find the item closest to the given position under [`EquirectangularDistance`].
    ///
    /// Among items at exactly the same distance, the first one reached by the search wins.
    ///
    /// Returns [`GeocodeError::EmptyIndex`] if the tree holds no items.
    fn nearest(&self, lat: f64, lon: f64) -> Result<&T> {
        self.nearest_with_distance(lat, lon).map(|(item, _)| item)
    }

    /// Like [`nearest`][KDTreeIndex::nearest], also returning the squared distance to the item.
    fn nearest_with_distance(&self, lat: f64, lon: f64) -> Result<(&T, f64)> {
        self.nearest_with_metric(lat, lon, &EquirectangularDistance)
    }

    /// Find the item closest to `coord`, read as `x` = longitude and `y` = latitude.
    fn nearest_coord(&self, coord: &impl CoordTrait<T = f64>) -> Result<&T> {
        let coord = Coord::from_coord_trait(coord);
        self.nearest(coord.lat, coord.lon)
    }

    /// Find the item closest to the given position under a caller-chosen metric.
    ///
    /// Returns the item and its distance as computed by `metric`.
    fn nearest_with_metric<M: DistanceMetric>(
        &self,
        lat: f64,
        lon: f64,
        metric: &M,
    ) -> Result<(&T, f64)> {
        let root = self.root().ok_or(GeocodeError::EmptyIndex)?;
        let query = Coord::new(lat, lon);

        let mut best = root.item();
        let mut best_dist = f64::INFINITY;

        // Use TinyVec to avoid heap allocations. Entries are a node and a lower bound on the
        // distance to anything in its subtree.
        let mut stack: TinyVec<[(Option<&Node<T>>, f64); 32]> = TinyVec::new();
        stack.push((Some(root), 0.0));

        while let Some((node, bound)) = stack.pop() {
            let Some(node) = node else { continue };
            if bound >= best_dist {
                continue;
            }

            let dist = metric.distance(query, node.item().coord());
            if dist < best_dist {
                best = node.item();
                best_dist = dist;
            }

            // Note: far is pushed first so that the near side is searched before it
            let (near, far) = near_far(node, query);
            if let Some(far) = far {
                let bound = metric.split_distance(query, node.axis, node.split, far.lat_bounds());
                stack.push((Some(far), bound));
            }
            if let Some(near) = near {
                stack.push((Some(near), 0.0));
            }
        }

        Ok((best, best_dist))
    }

    /// Find the `k` items closest to the given position, closest first.
    ///
    /// Returns fewer than `k` items only when the tree holds fewer than `k`.
    fn neighbors(&self, lat: f64, lon: f64, k: usize) -> Result<Vec<&T>> {
        let found = self.neighbors_with_metric(lat, lon, k, &EquirectangularDistance)?;
        Ok(found.into_iter().map(|(item, _)| item).collect())
    }

    /// Find the `k` items closest to the given position under a caller-chosen metric, closest
    /// first, together with their distances.
    fn neighbors_with_metric<M: DistanceMetric>(
        &self,
        lat: f64,
        lon: f64,
        k: usize,
        metric: &M,
    ) -> Result<Vec<(&T, f64)>> {
        let root = self.root().ok_or(GeocodeError::EmptyIndex)?;
        if k == 0 {
            return Ok(vec![]);
        }
        let query = Coord::new(lat, lon);

        // max-heap: the worst of the current k best is on top
        let mut heap: BinaryHeap<Candidate<'_, T>> = BinaryHeap::with_capacity(k + 1);
        let mut visited = 0;

        let mut stack: TinyVec<[(Option<&Node<T>>, f64); 32]> = TinyVec::new();
        stack.push((Some(root), 0.0));

        while let Some((node, bound)) = stack.pop() {
            let Some(node) = node else { continue };
            let worst = worst_distance(&heap, k);
            if bound >= worst {
                continue;
            }

            let dist = metric.distance(query, node.item().coord());
            if dist < worst {
                heap.push(Candidate {
                    dist,
                    order: visited,
                    item: node.item(),
                });
                if heap.len() > k {
                    heap.pop();
                }
            }
            visited += 1;

            let (near, far) = near_far(node, query);
            if let Some(far) = far {
                let bound = metric.split_distance(query, node.axis, node.split, far.lat_bounds());
                stack.push((Some(far), bound));
            }
            if let Some(near) = near {
                stack.push((Some(near), 0.0));
            }
        }

        Ok(heap
            .into_sorted_vec()
            .into_iter()
            .map(|candidate| (candidate.item, candidate.dist))
            .collect())
    }

    /// Search the index for items within a given bounding box, edges included.
    ///
    /// Returns an empty list for an empty tree.
    fn range(&self, min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Vec<&T> {
        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[Option<&Node<T>>; 32]> = TinyVec::new();
        stack.push(self.root());

        let mut result = vec![];

        while let Some(node) = stack.pop() {
            let Some(node) = node else { continue };

            let coord = node.item().coord();
            if coord.lat >= min_lat
                && coord.lat <= max_lat
                && coord.lon >= min_lon
                && coord.lon <= max_lon
            {
                result.push(node.item());
            }

            // queue search in halves that intersect the query
            let (low, high) = match node.axis {
                Axis::Lat => (min_lat, max_lat),
                Axis::Lon => (min_lon, max_lon),
            };
            if low <= node.split {
                stack.push(node.left_child());
            }
            if high >= node.split {
                stack.push(node.right_child());
            }
        }

        result
    }

    /// Search the index for items within a given rectangle (`x` = longitude, `y` = latitude).
    fn range_rect(&self, rect: &impl RectTrait<T = f64>) -> Vec<&T> {
        self.range(
            rect.min().y(),
            rect.min().x(),
            rect.max().y(),
            rect.max().x(),
        )
    }
}

impl<T: Located> KDTreeIndex<T> for KDTree<T> {
    fn root(&self) -> Option<&Node<T>> {
        self.root.as_deref()
    }

    fn num_items(&self) -> usize {
        self.num_items
    }
}

/// The child on the query's side of the split, then the other one.
#[inline]
fn near_far<T>(node: &Node<T>, query: Coord) -> (Option<&Node<T>>, Option<&Node<T>>) {
    if query.get(node.axis) < node.split {
        (node.left_child(), node.right_child())
    } else {
        (node.right_child(), node.left_child())
    }
}

#[inline]
fn worst_distance<T>(heap: &BinaryHeap<Candidate<'_, T>>, k: usize) -> f64 {
    if heap.len() < k {
        f64::INFINITY
    } else {
        heap.peek().map_or(f64::INFINITY, |candidate| candidate.dist)
    }
}

/// An entry in the k-nearest result heap. Ordered by distance, then by visit order so that among
/// equal distances the item found later is evicted first.
struct Candidate<'a, T> {
    dist: f64,
    order: usize,
    item: &'a T,
}

impl<T> PartialEq for Candidate<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Candidate<'_, T> {}

impl<T> PartialOrd for Candidate<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Candidate<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.order.cmp(&other.order))
    }
}

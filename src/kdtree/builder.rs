use std::cmp;

use tracing::debug;

use crate::kdtree::{KDTree, KDTreeIndex, Node};
use crate::r#type::{Axis, Located};

/// Partitions at or below this size are built on the calling thread.
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 4096;

/// A builder to create a [`KDTree`].
///
/// Items are buffered as they are added; the tree itself is built in one go by
/// [`finish`][KDTreeBuilder::finish].
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<T: Located> {
    items: Vec<T>,
}

impl<T: Located> KDTreeBuilder<T> {
    /// Create a new builder with room for the provided number of items.
    ///
    /// More items than `num_items` may be added; the capacity is only a hint.
    pub fn new(num_items: usize) -> Self {
        Self {
            items: Vec::with_capacity(num_items),
        }
    }

    /// Add an item to the index. Returns the insertion index of the item.
    pub fn add(&mut self, item: T) -> usize {
        let index = self.items.len();
        self.items.push(item);
        index
    }

    /// The number of items added so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no item has been added yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Consume this builder, performing the median partition and generating a KDTree ready for
    /// queries.
    pub fn finish(self) -> KDTree<T> {
        let num_items = self.items.len();
        let tree = KDTree {
            root: build_subtree(self.items, Axis::Lat),
            num_items,
        };
        debug!(num_items, depth = tree.depth(), "built k-d tree");
        tree
    }

    /// Like [`finish`][KDTreeBuilder::finish], but builds the two halves of large partitions on
    /// the rayon thread pool. The resulting tree is identical.
    #[cfg(feature = "rayon")]
    pub fn finish_parallel(self) -> KDTree<T>
    where
        T: Send,
    {
        let num_items = self.items.len();
        let tree = KDTree {
            root: build_subtree_parallel(self.items, Axis::Lat),
            num_items,
        };
        debug!(num_items, depth = tree.depth(), "built k-d tree in parallel");
        tree
    }
}

impl<T: Located> Default for KDTreeBuilder<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T: Located> Extend<T> for KDTreeBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

fn build_subtree<T: Located>(items: Vec<T>, axis: Axis) -> Option<Box<Node<T>>> {
    let (left, item, right) = partition(items, axis)?;
    let left = build_subtree(left, axis.next());
    let right = build_subtree(right, axis.next());
    Some(Box::new(Node::new(item, axis, left, right)))
}

#[cfg(feature = "rayon")]
fn build_subtree_parallel<T: Located + Send>(items: Vec<T>, axis: Axis) -> Option<Box<Node<T>>> {
    if items.len() <= PARALLEL_THRESHOLD {
        return build_subtree(items, axis);
    }

    let (left, item, right) = partition(items, axis)?;
    let (left, right) = rayon::join(
        || build_subtree_parallel(left, axis.next()),
        || build_subtree_parallel(right, axis.next()),
    );
    Some(Box::new(Node::new(item, axis, left, right)))
}

/// Split `items` around their median along `axis`.
///
/// Returns the items before the median (all `<=` on `axis`), the median itself, and the items after
/// it (all `>=`). Returns `None` for an empty input.
fn partition<T: Located>(mut items: Vec<T>, axis: Axis) -> Option<(Vec<T>, T, Vec<T>)> {
    if items.is_empty() {
        return None;
    }

    // middle index
    let m = items.len() >> 1;
    if items.len() > 1 {
        let right = items.len() - 1;
        select(&mut items, m, 0, right, axis);
    }

    let after = items.split_off(m + 1);
    let median = items.pop()?;
    Some((items, median, after))
}

#[inline]
fn key<T: Located>(item: &T, axis: Axis) -> f64 {
    item.coord().get(axis)
}

/// Custom Floyd-Rivest selection algorithm: reorder items so that `[left..k-1]` are not greater
/// than the k-th item along `axis`, and `[k+1..=right]` are not smaller.
fn select<T: Located>(items: &mut [T], k: usize, mut left: usize, mut right: usize, axis: Axis) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(items, k, new_left, new_right, axis);
        }

        let t = key(&items[k], axis);
        let mut i = left;
        let mut j = right;

        items.swap(left, k);
        if key(&items[right], axis) > t {
            items.swap(left, right);
        }

        while i < j {
            items.swap(i, j);
            i += 1;
            j -= 1;
            while key(&items[i], axis) < t {
                i += 1;
            }
            while key(&items[j], axis) > t {
                j -= 1;
            }
        }

        if key(&items[left], axis) == t {
            items.swap(left, j);
        } else {
            j += 1;
            items.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

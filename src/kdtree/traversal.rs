//! Utilities to traverse the KDTree structure.

use crate::r#type::{Axis, Located};

/// A node in the KDTree.
///
/// Every node holds exactly one item and exclusively owns its children. For a node splitting on
/// axis `A` at value `v`, every item in the left subtree has an `A` coordinate `<= v` and every
/// item in the right subtree has one `>= v`.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub(crate) item: T,

    /// The axis that the children of this node are split over.
    pub(crate) axis: Axis,

    /// The coordinate of `item` along `axis`.
    pub(crate) split: f64,

    /// Smallest and largest latitude of any item in this subtree, this node included.
    pub(crate) min_lat: f64,
    pub(crate) max_lat: f64,

    pub(crate) left: Option<Box<Node<T>>>,
    pub(crate) right: Option<Box<Node<T>>>,
}

impl<T: Located> Node<T> {
    pub(crate) fn new(
        item: T,
        axis: Axis,
        left: Option<Box<Node<T>>>,
        right: Option<Box<Node<T>>>,
    ) -> Self {
        let coord = item.coord();
        let mut min_lat = coord.lat;
        let mut max_lat = coord.lat;
        for child in [&left, &right].into_iter().flatten() {
            min_lat = min_lat.min(child.min_lat);
            max_lat = max_lat.max(child.max_lat);
        }

        Self {
            split: coord.get(axis),
            item,
            axis,
            min_lat,
            max_lat,
            left,
            right,
        }
    }
}

impl<T> Node<T> {
    /// The item stored at this node.
    #[inline]
    pub fn item(&self) -> &T {
        &self.item
    }

    /// The axis this node splits its children on.
    #[inline]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The splitting value: the coordinate of this node's item along [`axis`][Node::axis].
    #[inline]
    pub fn split(&self) -> f64 {
        self.split
    }

    /// The `(min, max)` latitude over every item in this subtree.
    #[inline]
    pub fn lat_bounds(&self) -> (f64, f64) {
        (self.min_lat, self.max_lat)
    }

    /// The child node holding items on the low side of the split.
    ///
    /// Note that this **does not include** the item of the current node.
    #[inline]
    pub fn left_child(&self) -> Option<&Node<T>> {
        self.left.as_deref()
    }

    /// The child node holding items on the high side of the split.
    ///
    /// Note that this **does not include** the item of the current node.
    #[inline]
    pub fn right_child(&self) -> Option<&Node<T>> {
        self.right.as_deref()
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The number of levels in this subtree. A leaf has depth 1.
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            stack.extend(node.left_child().map(|child| (child, depth + 1)));
            stack.extend(node.right_child().map(|child| (child, depth + 1)));
        }
        max_depth
    }
}

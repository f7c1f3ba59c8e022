use crate::kdtree::{KDTreeBuilder, Node};
use crate::r#type::Located;

/// An owned, immutable KDTree.
///
/// Usually this will be created from scratch via [`KDTreeBuilder`] or [`KDTree::build`]. Queries
/// live on the [`KDTreeIndex`][crate::kdtree::KDTreeIndex] trait.
#[derive(Debug, Clone)]
pub struct KDTree<T> {
    pub(crate) root: Option<Box<Node<T>>>,
    pub(crate) num_items: usize,
}

impl<T: Located> KDTree<T> {
    /// Bulk load a tree from `points`. An empty input yields an empty tree.
    ///
    /// Items are assumed to be distinct; duplicates are kept as separate nodes.
    pub fn build<I: IntoIterator<Item = T>>(points: I) -> Self {
        let mut builder = KDTreeBuilder::default();
        builder.extend(points);
        builder.finish()
    }
}

impl<T> KDTree<T> {
    /// Iterate over every item in depth-first order, root first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            stack: self.root.as_deref().into_iter().collect(),
        }
    }
}

impl<T> Default for KDTree<T> {
    fn default() -> Self {
        Self {
            root: None,
            num_items: 0,
        }
    }
}

impl<T: Located> FromIterator<T> for KDTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::build(iter)
    }
}

impl<'a, T> IntoIterator for &'a KDTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Depth-first iterator over the items of a [`KDTree`].
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Pushed in reverse so that the left subtree is yielded first
        self.stack.extend(node.right_child());
        self.stack.extend(node.left_child());
        Some(node.item())
    }
}

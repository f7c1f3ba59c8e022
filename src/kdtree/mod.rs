//! An immutable, owned k-d tree over latitude/longitude points.
//!
//! The tree is bulk loaded once with [`KDTreeBuilder`] (or [`KDTree::build`]) and is read-only
//! afterwards, so any number of threads can query it at once without locking.

#![warn(missing_docs)]

mod builder;
pub mod distance;
mod index;
mod r#trait;
mod traversal;

pub use builder::KDTreeBuilder;
pub use distance::{DistanceMetric, EquirectangularDistance, EuclideanDistance};
pub use index::{Iter, KDTree};
pub use r#trait::KDTreeIndex;
pub use traversal::Node;

#[cfg(test)]
mod test;

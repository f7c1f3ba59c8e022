#![doc = include_str!("../README.md")]

mod error;
pub mod geocoder;
pub mod ingest;
pub mod kdtree;
mod record;
mod r#type;

pub use error::{GeocodeError, ParseRecordError, Result};
pub use geocoder::ReverseGeocoder;
pub use record::{FeatureClass, PointRecord};
pub use r#type::{Axis, Coord, Located};

#[cfg(test)]
pub(crate) mod test;

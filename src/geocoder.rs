//! Nearest named place lookups over geonames data.

use std::io::BufRead;
use std::path::Path;

use crate::error::Result;
use crate::ingest::{IngestOptions, RecordReader};
use crate::kdtree::{KDTree, KDTreeIndex};
use crate::record::{FeatureClass, PointRecord};

/// Finds the nearest named place to a coordinate.
///
/// ```
/// use reverse_geocode::{FeatureClass, PointRecord, ReverseGeocoder};
///
/// let geocoder = ReverseGeocoder::from_records(vec![
///     PointRecord::new(1, "A", 0., 0., FeatureClass::PopulatedPlace),
///     PointRecord::new(2, "B", 10., 10., FeatureClass::PopulatedPlace),
///     PointRecord::new(3, "C", -5., 3., FeatureClass::PopulatedPlace),
/// ]);
/// assert_eq!(geocoder.nearest_place(1., 1.).unwrap().name, "A");
/// assert_eq!(geocoder.nearest_place(9., 9.).unwrap().name, "B");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReverseGeocoder {
    index: KDTree<PointRecord>,
}

impl ReverseGeocoder {
    /// Index already ingested records. Ids are expected to be unique.
    pub fn from_records(records: impl IntoIterator<Item = PointRecord>) -> Self {
        Self {
            index: KDTree::build(records),
        }
    }

    /// Read geonames dumps, keeping places of the given feature classes, or populated places when
    /// `feature_classes` is empty.
    ///
    /// Malformed lines are an error.
    pub fn from_readers<R: BufRead>(
        readers: impl IntoIterator<Item = R>,
        feature_classes: &[FeatureClass],
    ) -> Result<Self> {
        let options = IngestOptions::new(feature_classes.iter().copied());
        Self::from_readers_with_options(readers, options)
    }

    pub fn from_readers_with_options<R: BufRead>(
        readers: impl IntoIterator<Item = R>,
        options: IngestOptions,
    ) -> Result<Self> {
        let (records, _) = RecordReader::new(options).read(readers)?;
        Ok(Self::from_records(records))
    }

    /// Read geonames dumps from disk, plain text or zipped.
    pub fn from_paths<P: AsRef<Path>>(
        paths: impl IntoIterator<Item = P>,
        options: IngestOptions,
    ) -> Result<Self> {
        let (records, _) = RecordReader::new(options).read_paths(paths)?;
        Ok(Self::from_records(records))
    }

    /// The place closest to the given coordinate.
    ///
    /// Fails with [`GeocodeError::EmptyIndex`][crate::GeocodeError::EmptyIndex] if no place was
    /// loaded.
    pub fn nearest_place(&self, latitude: f64, longitude: f64) -> Result<&PointRecord> {
        self.index.nearest(latitude, longitude)
    }

    /// The `k` places closest to the given coordinate, closest first.
    pub fn nearest_places(
        &self,
        latitude: f64,
        longitude: f64,
        k: usize,
    ) -> Result<Vec<&PointRecord>> {
        self.index.neighbors(latitude, longitude, k)
    }

    pub fn len(&self) -> usize {
        self.index.num_items()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The underlying spatial index.
    pub fn index(&self) -> &KDTree<PointRecord> {
        &self.index
    }
}

//! Distance metrics for nearest-neighbor queries.
//!
//! A metric provides two things: the distance between the query and a candidate, and a lower bound
//! on that distance for every item on the far side of a splitting line. The search prunes a subtree
//! when the bound is not below the best distance found so far, so the bound has to use the same
//! scaling as the candidate distance or results become wrong.
//!
//! Distances are squared: they are only ever compared, never reported.

use crate::r#type::{Axis, Coord};

/// A trait for calculating distances between a query and indexed points.
pub trait DistanceMetric {
    /// Squared distance between `query` and `point`.
    fn distance(&self, query: Coord, point: Coord) -> f64;

    /// A lower bound on [`distance`][DistanceMetric::distance] from `query` to any point lying on
    /// the other side of the line `axis == split` from the query, given that those points have
    /// latitudes within `lat_bounds` (`(min, max)`).
    fn split_distance(&self, query: Coord, axis: Axis, split: f64, lat_bounds: (f64, f64)) -> f64;
}

/// Squared equirectangular distance in degrees.
///
/// `Δlat² + (Δlon · cos(φm))²`, where `φm` is the mean latitude of the two points. Scaling the
/// longitude difference accounts for meridians converging towards the poles. Longitudes are not
/// wrapped around the antimeridian.
///
/// This is the default metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct EquirectangularDistance;

impl DistanceMetric for EquirectangularDistance {
    #[inline]
    fn distance(&self, query: Coord, point: Coord) -> f64 {
        let dlat = query.lat - point.lat;
        let dlon = (query.lon - point.lon) * mean_lat_cos(query.lat, point.lat);
        dlat * dlat + dlon * dlon
    }

    #[inline]
    fn split_distance(&self, query: Coord, axis: Axis, split: f64, lat_bounds: (f64, f64)) -> f64 {
        match axis {
            Axis::Lat => {
                let d = query.lat - split;
                d * d
            }
            Axis::Lon => {
                // cos is concave on [-90°, 90°], so its minimum over a range of mean latitudes is
                // at one of the ends.
                let (min_lat, max_lat) = lat_bounds;
                let scale = mean_lat_cos(query.lat, min_lat)
                    .min(mean_lat_cos(query.lat, max_lat))
                    .max(0.0);
                let d = (query.lon - split) * scale;
                d * d
            }
        }
    }
}

#[inline]
fn mean_lat_cos(a: f64, b: f64) -> f64 {
    ((a + b) * 0.5).to_radians().cos()
}

/// Plain squared Euclidean distance in degrees, treating latitude and longitude as a flat grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceMetric for EuclideanDistance {
    #[inline]
    fn distance(&self, query: Coord, point: Coord) -> f64 {
        let dlat = query.lat - point.lat;
        let dlon = query.lon - point.lon;
        dlat * dlat + dlon * dlon
    }

    #[inline]
    fn split_distance(&self, query: Coord, axis: Axis, split: f64, _lat_bounds: (f64, f64)) -> f64 {
        let d = query.get(axis) - split;
        d * d
    }
}

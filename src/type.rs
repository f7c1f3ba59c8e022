use geo_traits::CoordTrait;

/// One of the two coordinate axes a k-d tree node can split on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Latitude, the axis of the root node and of every even depth.
    #[default]
    Lat,
    /// Longitude, used at odd depths.
    Lon,
}

impl Axis {
    /// The axis used by the children of a node splitting on `self`.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Axis::Lat => Axis::Lon,
            Axis::Lon => Axis::Lat,
        }
    }

    /// The axis of a node at the given depth, where the root is depth 0.
    #[inline]
    pub fn for_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            Axis::Lat
        } else {
            Axis::Lon
        }
    }
}

/// A latitude/longitude pair in degrees.
///
/// When viewed through [`CoordTrait`], `x` is the longitude and `y` the latitude, following the
/// usual GIS axis order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// The value of this coordinate along `axis`.
    #[inline]
    pub fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Lat => self.lat,
            Axis::Lon => self.lon,
        }
    }

    /// Build a coordinate from anything implementing [`CoordTrait`] (`x` = lon, `y` = lat).
    pub fn from_coord_trait(coord: &impl CoordTrait<T = f64>) -> Self {
        Self {
            lat: coord.y(),
            lon: coord.x(),
        }
    }
}

impl From<(f64, f64)> for Coord {
    /// Interprets the tuple as `(lat, lon)`.
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl CoordTrait for Coord {
    type T = f64;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.lon
    }

    fn y(&self) -> Self::T {
        self.lat
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.lon,
            1 => self.lat,
            _ => panic!("Invalid index of coord"),
        }
    }
}

/// Anything with a position that can be stored in a [`KDTree`][crate::kdtree::KDTree].
pub trait Located {
    /// The position of this item.
    fn coord(&self) -> Coord;
}

impl Located for Coord {
    #[inline]
    fn coord(&self) -> Coord {
        *self
    }
}

impl<L: Located + ?Sized> Located for &L {
    #[inline]
    fn coord(&self) -> Coord {
        (**self).coord()
    }
}

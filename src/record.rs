use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use geo_traits::CoordTrait;

use crate::error::ParseRecordError;
use crate::r#type::{Coord, Located};

/// The geonames feature classes.
///
/// See <http://www.geonames.org/export/codes.html>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureClass {
    /// A: country, state, region
    Administrative,
    /// H: stream, lake
    Hydrographic,
    /// L: parks, area
    Area,
    /// P: city, village
    PopulatedPlace,
    /// R: road, railroad
    Road,
    /// S: spot, building, farm
    Spot,
    /// T: mountain, hill, rock
    Terrain,
    /// U: undersea
    Undersea,
    /// V: forest, heath
    Vegetation,
}

impl FeatureClass {
    pub const ALL: [FeatureClass; 9] = [
        FeatureClass::Administrative,
        FeatureClass::Hydrographic,
        FeatureClass::Area,
        FeatureClass::PopulatedPlace,
        FeatureClass::Road,
        FeatureClass::Spot,
        FeatureClass::Terrain,
        FeatureClass::Undersea,
        FeatureClass::Vegetation,
    ];

    /// The single-letter code used in geonames dumps.
    pub fn as_char(self) -> char {
        match self {
            FeatureClass::Administrative => 'A',
            FeatureClass::Hydrographic => 'H',
            FeatureClass::Area => 'L',
            FeatureClass::PopulatedPlace => 'P',
            FeatureClass::Road => 'R',
            FeatureClass::Spot => 'S',
            FeatureClass::Terrain => 'T',
            FeatureClass::Undersea => 'U',
            FeatureClass::Vegetation => 'V',
        }
    }
}

impl TryFrom<char> for FeatureClass {
    type Error = ParseRecordError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        FeatureClass::ALL
            .into_iter()
            .find(|class| class.as_char() == value.to_ascii_uppercase())
            .ok_or_else(|| ParseRecordError::UnknownFeatureClass(value.to_string()))
    }
}

impl FromStr for FeatureClass {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => FeatureClass::try_from(c),
            _ => Err(ParseRecordError::UnknownFeatureClass(s.to_string())),
        }
    }
}

impl fmt::Display for FeatureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Feature codes of populated places that are seats of government.
const MAJOR_PLACE_CODES: [&str; 5] = ["PPLA", "PPLA2", "PPLA3", "PPLA4", "PPLC"];

/// A named place.
///
/// Identity is the geonames `id`: two records with the same id compare equal and hash the same,
/// whatever their other fields hold.
#[derive(Debug, Clone)]
pub struct PointRecord {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub feature_class: FeatureClass,
    /// Finer grained geonames code, e.g. `PPLC` for a capital. Empty if unknown.
    pub feature_code: String,
    /// ISO-3166 two letter country code. Empty if unknown.
    pub country_code: String,
    pub population: u64,
}

impl PointRecord {
    /// Create a record with only the fields the index needs. The geonames detail fields are left
    /// empty.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        feature_class: FeatureClass,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            latitude,
            longitude,
            feature_class,
            feature_code: String::new(),
            country_code: String::new(),
            population: 0,
        }
    }

    /// Whether this is an administrative area or a seat of government (regional seat or capital).
    pub fn is_major_place(&self) -> bool {
        self.feature_class == FeatureClass::Administrative
            || MAJOR_PLACE_CODES.contains(&self.feature_code.as_str())
    }
}

impl PartialEq for PointRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PointRecord {}

impl Hash for PointRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Located for PointRecord {
    #[inline]
    fn coord(&self) -> Coord {
        Coord::new(self.latitude, self.longitude)
    }
}

impl CoordTrait for PointRecord {
    type T = f64;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.longitude
    }

    fn y(&self) -> Self::T {
        self.latitude
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.longitude,
            1 => self.latitude,
            _ => panic!("Invalid index of coord"),
        }
    }
}

impl fmt::Display for PointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country_code.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country_code)
        }
    }
}

use std::ops::RangeInclusive;

use crate::error::ParseRecordError;
use crate::record::{FeatureClass, PointRecord};

// Columns of the geonames "geoname" table. Only the ones we keep are listed.
const ID: usize = 0;
const NAME: usize = 1;
const LATITUDE: usize = 4;
const LONGITUDE: usize = 5;
const FEATURE_CLASS: usize = 6;
const FEATURE_CODE: usize = 7;
const COUNTRY_CODE: usize = 8;
const POPULATION: usize = 14;

/// Lines with fewer columns than this cannot be turned into a record.
const MIN_COLUMNS: usize = FEATURE_CLASS + 1;

/// Parse one tab separated geonames line.
///
/// Columns after the feature class (feature code, country code, population) are optional and
/// default to empty or zero when missing.
///
/// ```
/// use reverse_geocode::ingest::parse_line;
/// use reverse_geocode::FeatureClass;
///
/// let record = parse_line("2158177\tMelbourne\tMelbourne\t\t-37.814\t144.96332\tP\tPPLA\tAU").unwrap();
/// assert_eq!(record.id, 2158177);
/// assert_eq!(record.feature_class, FeatureClass::PopulatedPlace);
/// assert_eq!(record.country_code, "AU");
/// ```
pub fn parse_line(line: &str) -> Result<PointRecord, ParseRecordError> {
    let fields: Vec<&str> = line.trim_end_matches(&['\r', '\n'][..]).split('\t').collect();
    parse_fields(&fields)
}

pub(crate) fn parse_fields(fields: &[&str]) -> Result<PointRecord, ParseRecordError> {
    if fields.len() < MIN_COLUMNS {
        return Err(ParseRecordError::MissingColumns {
            expected: MIN_COLUMNS,
            found: fields.len(),
        });
    }

    let id = fields[ID]
        .trim()
        .parse::<u64>()
        .map_err(|_| ParseRecordError::InvalidId(fields[ID].to_string()))?;
    let latitude = parse_degrees(fields[LATITUDE], -90.0..=90.0)
        .ok_or_else(|| ParseRecordError::InvalidLatitude(fields[LATITUDE].to_string()))?;
    let longitude = parse_degrees(fields[LONGITUDE], -180.0..=180.0)
        .ok_or_else(|| ParseRecordError::InvalidLongitude(fields[LONGITUDE].to_string()))?;
    let population = match optional(fields, POPULATION) {
        "" => 0,
        value => value
            .parse::<u64>()
            .map_err(|_| ParseRecordError::InvalidPopulation(value.to_string()))?,
    };
    // Checked last: an unknown class on an otherwise valid line is not a malformed line.
    let feature_class = fields[FEATURE_CLASS].parse::<FeatureClass>()?;

    Ok(PointRecord {
        id,
        name: fields[NAME].to_string(),
        latitude,
        longitude,
        feature_class,
        feature_code: optional(fields, FEATURE_CODE).to_string(),
        country_code: optional(fields, COUNTRY_CODE).to_string(),
        population,
    })
}

fn optional<'a>(fields: &[&'a str], column: usize) -> &'a str {
    fields.get(column).map_or("", |value| value.trim())
}

fn parse_degrees(value: &str, valid: RangeInclusive<f64>) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|degrees| valid.contains(degrees))
}

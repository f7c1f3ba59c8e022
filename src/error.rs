use std::fmt::Debug;
use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// A nearest-neighbor query was issued against an index built from zero points.
    #[error("Cannot query an empty index")]
    EmptyIndex,

    /// A source line could not be turned into a [`PointRecord`][crate::PointRecord].
    #[error("Malformed record in input {input}, line {line}: {source}")]
    Parse {
        /// Position of the source among the inputs of one ingestion run, starting at 0.
        input: usize,
        /// Line number within that source, starting at 1.
        line: usize,
        #[source]
        source: ParseRecordError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("General error: {0}")]
    General(String),
}

/// Why a single geonames line was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseRecordError {
    #[error("expected at least {expected} tab-separated columns, found {found}")]
    MissingColumns { expected: usize, found: usize },

    #[error("invalid id {0:?}")]
    InvalidId(String),

    #[error("invalid latitude {0:?}")]
    InvalidLatitude(String),

    #[error("invalid longitude {0:?}")]
    InvalidLongitude(String),

    #[error("invalid population {0:?}")]
    InvalidPopulation(String),

    #[error("unknown feature class {0:?}")]
    UnknownFeatureClass(String),
}

pub type Result<T> = std::result::Result<T, GeocodeError>;

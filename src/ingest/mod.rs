//! Reading geonames dumps into [`PointRecord`][crate::PointRecord]s.
//!
//! The dumps from <http://download.geonames.org/export/dump/> are tab separated text, one place
//! per line, and are usually distributed zipped. Ingestion parses every line, keeps records whose
//! feature class was asked for, and drops any record whose id was already accepted.

mod parse;
mod reader;
mod source;

pub use parse::parse_line;
pub use reader::{filter_records, IngestOptions, IngestStats, MalformedPolicy, RecordReader};
pub use source::{open_source, open_zip};

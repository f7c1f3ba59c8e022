use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{GeocodeError, ParseRecordError, Result};
use crate::ingest::parse::parse_fields;
use crate::ingest::source::open_source;
use crate::record::{FeatureClass, PointRecord};

/// What to do with a line that cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Stop and return the parse error.
    #[default]
    Fail,
    /// Log a warning, count the line and carry on.
    Skip,
}

/// Configuration of an ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Records of any other class are dropped.
    pub feature_classes: HashSet<FeatureClass>,
    pub on_malformed: MalformedPolicy,
}

impl IngestOptions {
    /// Keep the given feature classes. An empty list keeps populated places (`P`).
    pub fn new(feature_classes: impl IntoIterator<Item = FeatureClass>) -> Self {
        let mut feature_classes: HashSet<FeatureClass> = feature_classes.into_iter().collect();
        if feature_classes.is_empty() {
            feature_classes.insert(FeatureClass::PopulatedPlace);
        }
        Self {
            feature_classes,
            on_malformed: MalformedPolicy::default(),
        }
    }

    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }
}

impl Default for IngestOptions {
    /// Populated places only, failing on malformed lines.
    fn default() -> Self {
        Self::new([FeatureClass::PopulatedPlace])
    }
}

/// Line counts of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestStats {
    /// Every line read, including blank and comment lines.
    pub lines: usize,
    pub accepted: usize,
    pub malformed: usize,
    /// Lines whose feature class was not requested.
    pub filtered: usize,
    /// Lines whose id had already been accepted earlier in the run.
    pub duplicates: usize,
}

/// Streams geonames sources into a filtered, duplicate-free list of records.
#[derive(Debug, Clone, Default)]
pub struct RecordReader {
    options: IngestOptions,
}

impl RecordReader {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Read every source in order.
    ///
    /// Deduplication spans all sources: when the same id shows up twice, the first accepted
    /// occurrence is kept.
    pub fn read<R: BufRead>(
        &self,
        sources: impl IntoIterator<Item = R>,
    ) -> Result<(Vec<PointRecord>, IngestStats)> {
        let mut ingest = Ingest::new(&self.options);
        for (input, source) in sources.into_iter().enumerate() {
            ingest.consume(input, source)?;
        }
        Ok(ingest.finish())
    }

    /// Like [`read`][RecordReader::read], opening each path with [`open_source`] just before it is
    /// read.
    pub fn read_paths<P: AsRef<Path>>(
        &self,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<(Vec<PointRecord>, IngestStats)> {
        let mut ingest = Ingest::new(&self.options);
        for (input, path) in paths.into_iter().enumerate() {
            let path = path.as_ref();
            debug!(input, path = %path.display(), "reading geonames source");
            ingest.consume(input, open_source(path)?)?;
        }
        Ok(ingest.finish())
    }
}

/// State of one ingestion run. The seen-id set lives only as long as the run.
struct Ingest<'a> {
    options: &'a IngestOptions,
    seen: HashSet<u64>,
    records: Vec<PointRecord>,
    stats: IngestStats,
}

impl<'a> Ingest<'a> {
    fn new(options: &'a IngestOptions) -> Self {
        Self {
            options,
            seen: HashSet::new(),
            records: vec![],
            stats: IngestStats::default(),
        }
    }

    fn consume<R: BufRead>(&mut self, input: usize, source: R) -> Result<()> {
        for (index, line) in source.lines().enumerate() {
            let line = line?;
            self.stats.lines += 1;

            let trimmed = line.trim_end_matches('\r');
            if trimmed.trim().is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split('\t').collect();
            let record = match parse_fields(&fields) {
                Ok(record) => record,
                Err(ParseRecordError::UnknownFeatureClass(_)) => {
                    self.stats.filtered += 1;
                    continue;
                }
                Err(source) => match self.options.on_malformed {
                    MalformedPolicy::Fail => {
                        return Err(GeocodeError::Parse {
                            input,
                            line: index + 1,
                            source,
                        })
                    }
                    MalformedPolicy::Skip => {
                        warn!(input, line = index + 1, error = %source, "skipping malformed record");
                        self.stats.malformed += 1;
                        continue;
                    }
                },
            };

            if !self.options.feature_classes.contains(&record.feature_class) {
                self.stats.filtered += 1;
                continue;
            }

            if !self.seen.insert(record.id) {
                self.stats.duplicates += 1;
                continue;
            }
            self.records.push(record);
        }
        Ok(())
    }

    fn finish(mut self) -> (Vec<PointRecord>, IngestStats) {
        self.stats.accepted = self.records.len();
        let stats = self.stats;
        info!(
            accepted = stats.accepted,
            lines = stats.lines,
            filtered = stats.filtered,
            duplicates = stats.duplicates,
            malformed = stats.malformed,
            "ingested geonames records"
        );
        (self.records, stats)
    }
}

/// Keep the records whose feature class is in `accepted`, dropping any record whose id was already
/// kept. The first occurrence of an id wins.
pub fn filter_records(
    records: impl IntoIterator<Item = PointRecord>,
    accepted: &HashSet<FeatureClass>,
) -> Vec<PointRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| accepted.contains(&record.feature_class) && seen.insert(record.id))
        .collect()
}

//! Reads a city's trip source and keeps the rows matching a [`FilterSpec`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Deref;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use tracing::{debug, info, warn};

use crate::city::{City, Schema};
use crate::error::{BikeshareError, Result};
use crate::filter::FilterSpec;
use crate::record::TripRecord;

/// What to do with a row whose text, timestamp or duration cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Fail the whole load on the first bad row.
    #[default]
    Abort,
    /// Log and count the row, then continue.
    Skip,
}

/// Records matching a filter, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredSet {
    records: Vec<TripRecord>,
    /// Data rows read from the source, header excluded.
    pub scanned: usize,
    /// Rows dropped under [`MalformedPolicy::Skip`].
    pub skipped: usize,
}

impl FilteredSet {
    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }
}

impl Deref for FilteredSet {
    type Target = [TripRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// Resolves city sources under a data directory and loads them.
#[derive(Debug, Clone)]
pub struct Loader {
    data_dir: PathBuf,
    policy: MalformedPolicy,
}

impl Loader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            policy: MalformedPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MalformedPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the source for `city`, preferring plain CSV over `.csv.gz`.
    pub fn source_path(&self, city: City) -> Result<PathBuf> {
        let plain = self.data_dir.join(city.file_name());
        if plain.is_file() {
            return Ok(plain);
        }

        let gzipped = self.data_dir.join(format!("{}.gz", city.file_name()));
        if gzipped.is_file() {
            return Ok(gzipped);
        }

        Err(BikeshareError::MissingSource {
            city,
            dir: self.data_dir.clone(),
        })
    }

    /// Loads the records for `spec.city` that satisfy the month and day filters.
    ///
    /// # Errors
    ///
    /// Fails if the source is missing or unreadable, or (under
    /// [`MalformedPolicy::Abort`]) on the first row with a bad timestamp or duration.
    #[tracing::instrument(skip(self, spec), fields(spec = %spec))]
    pub fn load(&self, spec: &FilterSpec) -> Result<FilteredSet> {
        let path = self.source_path(spec.city)?;
        debug!(path = %path.display(), "Opening trip source");

        let file = BufReader::new(File::open(&path)?);
        let is_gzip = path.extension().and_then(|e| e.to_str()) == Some("gz");

        let set = if is_gzip {
            load_from_reader(GzDecoder::new(file), spec, self.policy)?
        } else {
            load_from_reader(file, spec, self.policy)?
        };

        info!(
            scanned = set.scanned,
            kept = set.len(),
            skipped = set.skipped,
            "Trip source loaded"
        );
        Ok(set)
    }
}

/// Reads CSV trip rows from `reader`, skipping the header row.
pub fn load_from_reader<R: Read>(
    reader: R,
    spec: &FilterSpec,
    policy: MalformedPolicy,
) -> Result<FilteredSet> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut set = FilteredSet::default();

    for result in rdr.byte_records() {
        let raw = result?;
        set.scanned += 1;

        let line = raw.position().map(|p| p.line()).unwrap_or_default();
        let record = match decode_row(raw, line).and_then(|row| TripRecord::from_row(&row, line)) {
            Ok(record) => record,
            Err(e) if policy == MalformedPolicy::Skip && e.is_malformed_record() => {
                warn!(error = %e, "Skipping malformed trip row");
                set.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if spec.matches(&record.start_time) {
            set.records.push(record);
        }
    }

    Ok(set)
}

/// Decodes a raw row as UTF-8, reporting the first undecodable column.
fn decode_row(raw: ByteRecord, line: u64) -> Result<StringRecord> {
    StringRecord::from_byte_record(raw).map_err(|e| {
        let index = e.utf8_error().field();
        let raw = e.into_byte_record();
        BikeshareError::MalformedField {
            line,
            field: Schema::Full.columns().get(index).copied().unwrap_or("column"),
            value: String::from_utf8_lossy(raw.get(index).unwrap_or_default()).into_owned(),
        }
    })
}

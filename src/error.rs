//! Error taxonomy for loading and analysing trip data.

use std::path::PathBuf;

use thiserror::Error;

use crate::city::City;

#[derive(Debug, Error)]
pub enum BikeshareError {
    #[error("unknown city '{0}', expected Chicago, New York or Washington")]
    UnknownCity(String),

    #[error("unknown month '{0}', expected All or January through June")]
    UnknownMonth(String),

    #[error("unknown day '{0}', expected All, a weekday name or 1-7 (1 = Sunday)")]
    UnknownDay(String),

    #[error("line {line}: malformed start time '{value}'")]
    MalformedTimestamp {
        line: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("line {line}: malformed {field} '{value}'")]
    MalformedField {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("no data source for {city} in {}", .dir.display())]
    MissingSource { city: City, dir: PathBuf },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BikeshareError {
    /// `true` for errors caused by a single bad source row.
    pub fn is_malformed_record(&self) -> bool {
        matches!(
            self,
            BikeshareError::MalformedTimestamp { .. } | BikeshareError::MalformedField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BikeshareError>;

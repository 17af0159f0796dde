//! A single trip row and the fields derived from its start time.

use chrono::NaiveDateTime;
use csv::StringRecord;
use serde::Serialize;

use crate::error::{BikeshareError, Result};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Column positions in the source layout.
const RIDE_ID: usize = 0;
const START_TIME: usize = 1;
const END_TIME: usize = 2;
const TRIP_DURATION: usize = 3;
const START_STATION: usize = 4;
const END_STATION: usize = 5;
const USER_TYPE: usize = 6;
const GENDER: usize = 7;
const BIRTH_YEAR: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub ride_id: String,
    pub start_time: NaiveDateTime,
    pub end_time: String,
    /// Seconds.
    pub trip_duration: f64,
    pub start_station: String,
    pub end_station: String,
    pub user_type: String,
    pub gender: Option<String>,
    /// Raw text; see [`TripRecord::birth_year`] for the numeric value.
    pub birth_year: Option<String>,
}

impl TripRecord {
    /// Builds a record from a source row. `line` is only used for error reports.
    ///
    /// # Errors
    ///
    /// `MalformedTimestamp` if the start time does not match [`TIMESTAMP_FORMAT`],
    /// `MalformedField` if the duration is not a number or a required column is
    /// missing.
    pub fn from_row(row: &StringRecord, line: u64) -> Result<Self> {
        let required = |index: usize, field: &'static str| {
            row.get(index).ok_or_else(|| BikeshareError::MalformedField {
                line,
                field,
                value: String::new(),
            })
        };

        let raw_start = required(START_TIME, "start_time")?;
        let start_time = parse_timestamp(raw_start).map_err(|source| {
            BikeshareError::MalformedTimestamp {
                line,
                value: raw_start.to_string(),
                source,
            }
        })?;

        let raw_duration = required(TRIP_DURATION, "trip_duration")?;
        let trip_duration = raw_duration
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .ok_or_else(|| BikeshareError::MalformedField {
                line,
                field: "trip_duration",
                value: raw_duration.to_string(),
            })?;

        Ok(TripRecord {
            ride_id: row.get(RIDE_ID).unwrap_or_default().to_string(),
            start_time,
            end_time: row.get(END_TIME).unwrap_or_default().to_string(),
            trip_duration,
            start_station: required(START_STATION, "start_station")?.to_string(),
            end_station: required(END_STATION, "end_station")?.to_string(),
            user_type: required(USER_TYPE, "user_type")?.to_string(),
            gender: row.get(GENDER).map(str::to_string),
            birth_year: row.get(BIRTH_YEAR).map(str::to_string),
        })
    }

    /// Full month name, e.g. `March`.
    pub fn month_name(&self) -> String {
        self.start_time.format("%B").to_string()
    }

    /// Full weekday name, e.g. `Monday`.
    pub fn day_name(&self) -> String {
        self.start_time.format("%A").to_string()
    }

    /// Zero-padded 24h hour, e.g. `08`.
    pub fn hour(&self) -> String {
        self.start_time.format("%H").to_string()
    }

    /// Numeric birth year, if the column holds one.
    ///
    /// Accepts integral values written either way (`1990`, `1990.0`); anything
    /// blank, non-numeric or fractional counts as missing.
    pub fn birth_year(&self) -> Option<i32> {
        let year = self.birth_year.as_deref()?.trim().parse::<f64>().ok()?;
        if !year.is_finite() || year.fract() != 0.0 {
            return None;
        }
        if year < f64::from(i32::MIN) || year > f64::from(i32::MAX) {
            return None;
        }
        Some(year as i32)
    }

    /// Values in source column order, for raw display.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = vec![
            self.ride_id.clone(),
            self.start_time.format(TIMESTAMP_FORMAT).to_string(),
            self.end_time.clone(),
            self.trip_duration.to_string(),
            self.start_station.clone(),
            self.end_station.clone(),
            self.user_type.clone(),
        ];
        if let Some(gender) = &self.gender {
            row.push(gender.clone());
            row.push(self.birth_year.clone().unwrap_or_default());
        }
        row
    }
}

pub fn parse_timestamp(raw: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
}

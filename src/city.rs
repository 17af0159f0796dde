//! Supported cities and the shape of their trip data.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::BikeshareError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Chicago,
    NewYork,
    Washington,
}

/// Which optional columns a city's source carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// Includes gender and birth year.
    Full,
    /// Trip, station and user type columns only.
    Reduced,
}

impl Schema {
    pub fn has_demographics(self) -> bool {
        matches!(self, Schema::Full)
    }

    /// Header names for the logical column layout.
    pub fn columns(self) -> &'static [&'static str] {
        const FULL: &[&str] = &[
            "ride_id",
            "start_time",
            "end_time",
            "trip_duration",
            "start_station",
            "end_station",
            "user_type",
            "gender",
            "birth_year",
        ];
        match self {
            Schema::Full => FULL,
            Schema::Reduced => &FULL[..7],
        }
    }
}

impl City {
    pub const ALL: [City; 3] = [City::Chicago, City::NewYork, City::Washington];

    /// Base name of the CSV source for this city.
    pub fn file_name(self) -> &'static str {
        match self {
            City::Chicago => "chicago.csv",
            City::NewYork => "new_york_city.csv",
            City::Washington => "washington.csv",
        }
    }

    pub fn schema(self) -> Schema {
        match self {
            City::Chicago | City::NewYork => Schema::Full,
            City::Washington => Schema::Reduced,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            City::Chicago => "Chicago",
            City::NewYork => "New York",
            City::Washington => "Washington",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for City {
    type Err = BikeshareError;

    /// Case-insensitive; `_` and `-` are accepted in place of spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .trim()
            .to_uppercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "CHICAGO" => Ok(City::Chicago),
            "NEW YORK" | "NEW YORK CITY" | "NYC" => Ok(City::NewYork),
            "WASHINGTON" | "WASHINGTON DC" => Ok(City::Washington),
            _ => Err(BikeshareError::UnknownCity(s.trim().to_string())),
        }
    }
}

//! Report types produced by the statistics engine.

use serde::Serialize;

use crate::city::City;

/// A value together with how many times it occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked<T> {
    pub value: T,
    pub count: usize,
}

impl<T> Ranked<T> {
    pub fn new(value: T, count: usize) -> Self {
        Self { value, count }
    }
}

/// Most popular start month, weekday and hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TravelTimes {
    pub month: Option<Ranked<String>>,
    pub day: Option<Ranked<String>>,
    pub hour: Option<Ranked<String>>,
}

/// Trip duration aggregates, in seconds. `None` means no trips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub total: f64,
    pub count: usize,
    pub mean: Option<f64>,
    pub shortest: Option<f64>,
    pub longest: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct StationPair {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub start: Option<Ranked<String>>,
    pub end: Option<Ranked<String>>,
    pub trip: Option<Ranked<StationPair>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserTypeCounts {
    pub subscriber: usize,
    pub customer: usize,
    pub dependent: usize,
    /// Blank or unrecognised user types.
    pub other: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenderCounts {
    pub male: usize,
    pub female: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub latest: i32,
    pub most_common: Ranked<i32>,
}

/// Rider demographics; only computed for cities whose source has them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub gender: GenderCounts,
    /// `None` when no row carries a usable birth year.
    pub birth_year: Option<BirthYearStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub city: City,
    pub trips: usize,
    pub travel_times: TravelTimes,
    pub durations: DurationStats,
    pub stations: StationStats,
    pub user_types: UserTypeCounts,
    pub demographics: Option<Demographics>,
}

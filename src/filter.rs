//! Month and weekday predicates applied while loading.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Month, NaiveDateTime, Weekday};

use crate::city::City;
use crate::error::BikeshareError;

/// Months present in the trip sources.
pub const MONTHS: [Month; 6] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
];

/// Weekdays in prompt order, so `DAYS[n - 1]` is day number `n`.
pub const DAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Only(Month),
}

impl MonthFilter {
    pub fn matches(&self, start_time: &NaiveDateTime) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(month) => month.number_from_month() == start_time.month(),
        }
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("All"),
            MonthFilter::Only(month) => f.write_str(month.name()),
        }
    }
}

impl FromStr for MonthFilter {
    type Err = BikeshareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(MonthFilter::All);
        }

        s.parse::<Month>()
            .ok()
            .filter(|month| MONTHS.contains(month))
            .map(MonthFilter::Only)
            .ok_or_else(|| BikeshareError::UnknownMonth(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl DayFilter {
    pub fn matches(&self, start_time: &NaiveDateTime) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(day) => start_time.weekday() == *day,
        }
    }

    /// Maps `1..=7` to Sunday through Saturday.
    pub fn from_number(n: u32) -> Option<Self> {
        let index = usize::try_from(n).ok()?.checked_sub(1)?;
        DAYS.get(index).copied().map(DayFilter::Only)
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("All"),
            DayFilter::Only(day) => f.write_str(weekday_name(*day)),
        }
    }
}

impl FromStr for DayFilter {
    type Err = BikeshareError;

    /// Accepts `All`, a weekday name or abbreviation, or a day number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(DayFilter::All);
        }

        if let Ok(n) = s.parse::<u32>() {
            return DayFilter::from_number(n).ok_or_else(|| BikeshareError::UnknownDay(s.to_string()));
        }

        s.parse::<Weekday>()
            .map(DayFilter::Only)
            .map_err(|_| BikeshareError::UnknownDay(s.to_string()))
    }
}

/// The (city, month, day) selection driving one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub city: City,
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterSpec {
    pub fn new(city: City) -> Self {
        Self {
            city,
            month: MonthFilter::All,
            day: DayFilter::All,
        }
    }

    pub fn with_month(mut self, month: MonthFilter) -> Self {
        self.month = month;
        self
    }

    pub fn with_day(mut self, day: DayFilter) -> Self {
        self.day = day;
        self
    }

    pub fn matches(&self, start_time: &NaiveDateTime) -> bool {
        self.month.matches(start_time) && self.day.matches(start_time)
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (month: {}, day: {})", self.city, self.month, self.day)
    }
}

//! Statistics over a filtered set of trips.
//!
//! [`compute_statistics`] makes a single pass over the records into a fresh
//! [`Accumulator`], then reads every aggregate from that one snapshot. Gender
//! and birth-year accumulation is switched on by the city's [`Schema`].

mod tally;
mod types;

pub use tally::Tally;
pub use types::{
    BirthYearStats, Demographics, DurationStats, GenderCounts, Ranked, StationPair, StationStats,
    StatisticsReport, TravelTimes, UserTypeCounts,
};

use tracing::debug;

use crate::city::{City, Schema};
use crate::record::TripRecord;

pub const SUBSCRIBER: &str = "Subscriber";
pub const CUSTOMER: &str = "Customer";
pub const DEPENDENT: &str = "Dependent";

/// Computes every aggregate for `records`, which were loaded for `city`.
#[tracing::instrument(skip(records), fields(records = records.len()))]
pub fn compute_statistics(records: &[TripRecord], city: City) -> StatisticsReport {
    let mut acc = Accumulator::new(city.schema());
    for record in records {
        acc.push(record);
    }
    let report = acc.finish(city);

    debug!(trips = report.trips, "Statistics computed");
    report
}

/// Per-run state for one pass over the records.
#[derive(Debug)]
pub struct Accumulator<'a> {
    trips: usize,
    months: Tally<String>,
    days: Tally<String>,
    hours: Tally<String>,
    durations: DurationSum,
    start_stations: Tally<&'a str>,
    end_stations: Tally<&'a str>,
    trips_by_pair: Tally<(&'a str, &'a str)>,
    user_types: Tally<&'a str>,
    demographics: Option<DemographicsAccumulator<'a>>,
}

#[derive(Debug, Default)]
struct DurationSum {
    total: f64,
    count: usize,
    shortest: Option<f64>,
    longest: Option<f64>,
}

#[derive(Debug, Default)]
struct DemographicsAccumulator<'a> {
    genders: Tally<&'a str>,
    birth_years: Tally<i32>,
}

impl<'a> Accumulator<'a> {
    pub fn new(schema: Schema) -> Self {
        Self {
            trips: 0,
            months: Tally::new(),
            days: Tally::new(),
            hours: Tally::new(),
            durations: DurationSum::default(),
            start_stations: Tally::new(),
            end_stations: Tally::new(),
            trips_by_pair: Tally::new(),
            user_types: Tally::new(),
            demographics: schema
                .has_demographics()
                .then(DemographicsAccumulator::default),
        }
    }

    pub fn push(&mut self, record: &'a TripRecord) {
        self.trips += 1;

        self.months.add(record.month_name());
        self.days.add(record.day_name());
        self.hours.add(record.hour());

        let d = record.trip_duration;
        self.durations.total += d;
        self.durations.count += 1;
        self.durations.shortest = Some(self.durations.shortest.map_or(d, |s| s.min(d)));
        self.durations.longest = Some(self.durations.longest.map_or(d, |l| l.max(d)));

        self.start_stations.add(record.start_station.as_str());
        self.end_stations.add(record.end_station.as_str());
        self.trips_by_pair
            .add((record.start_station.as_str(), record.end_station.as_str()));

        self.user_types.add(record.user_type.as_str());

        if let Some(demo) = &mut self.demographics {
            if let Some(gender) = record.gender.as_deref() {
                demo.genders.add(gender);
            }
            if let Some(year) = record.birth_year() {
                demo.birth_years.add(year);
            }
        }
    }

    pub fn finish(&self, city: City) -> StatisticsReport {
        StatisticsReport {
            city,
            trips: self.trips,
            travel_times: TravelTimes {
                month: ranked(&self.months),
                day: ranked(&self.days),
                hour: ranked(&self.hours),
            },
            durations: DurationStats {
                total: self.durations.total,
                count: self.durations.count,
                mean: mean(self.durations.total, self.durations.count),
                shortest: self.durations.shortest,
                longest: self.durations.longest,
            },
            stations: StationStats {
                start: ranked_str(&self.start_stations),
                end: ranked_str(&self.end_stations),
                trip: self
                    .trips_by_pair
                    .most_common_by_key()
                    .map(|(&(start, end), count)| {
                        Ranked::new(
                            StationPair {
                                start: start.to_string(),
                                end: end.to_string(),
                            },
                            count,
                        )
                    }),
            },
            user_types: self.user_type_counts(),
            demographics: self.demographics.as_ref().map(|demo| demo.finish()),
        }
    }

    fn user_type_counts(&self) -> UserTypeCounts {
        let subscriber = self.user_types.get(&SUBSCRIBER);
        let customer = self.user_types.get(&CUSTOMER);
        let dependent = self.user_types.get(&DEPENDENT);
        UserTypeCounts {
            subscriber,
            customer,
            dependent,
            other: self.user_types.total() - subscriber - customer - dependent,
        }
    }
}

impl DemographicsAccumulator<'_> {
    fn finish(&self) -> Demographics {
        Demographics {
            gender: GenderCounts {
                male: self.genders.get(&"Male"),
                female: self.genders.get(&"Female"),
            },
            birth_year: self.birth_year_stats(),
        }
    }

    fn birth_year_stats(&self) -> Option<BirthYearStats> {
        let (&year, count) = self.birth_years.most_common()?;
        let mut years = self.birth_years.keys().copied();
        let first = years.next()?;
        let (earliest, latest) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));

        Some(BirthYearStats {
            earliest,
            latest,
            most_common: Ranked::new(year, count),
        })
    }
}

fn ranked(tally: &Tally<String>) -> Option<Ranked<String>> {
    tally
        .most_common()
        .map(|(value, count)| Ranked::new(value.clone(), count))
}

fn ranked_str(tally: &Tally<&str>) -> Option<Ranked<String>> {
    tally
        .most_common()
        .map(|(value, count)| Ranked::new(value.to_string(), count))
}

/// Arithmetic mean, or `None` for an empty set.
fn mean(total: f64, count: usize) -> Option<f64> {
    (count > 0).then(|| total / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn trip(start_time: &str, duration: f64, start: &str, end: &str, user: &str) -> TripRecord {
        TripRecord {
            ride_id: String::new(),
            start_time: NaiveDateTime::parse_from_str(start_time, "%Y-%m-%d %H:%M:%S").unwrap(),
            end_time: String::new(),
            trip_duration: duration,
            start_station: start.to_string(),
            end_station: end.to_string(),
            user_type: user.to_string(),
            gender: None,
            birth_year: None,
        }
    }

    fn with_demographics(mut t: TripRecord, gender: &str, birth_year: &str) -> TripRecord {
        t.gender = Some(gender.to_string());
        t.birth_year = Some(birth_year.to_string());
        t
    }

    #[test]
    fn test_march_scenario() {
        let records = vec![
            trip("2017-03-01 08:00:00", 100.0, "A", "B", SUBSCRIBER),
            trip("2017-03-02 08:30:00", 200.0, "A", "C", SUBSCRIBER),
            trip("2017-03-03 17:00:00", 300.0, "B", "C", CUSTOMER),
        ];
        let report = compute_statistics(&records, City::Washington);

        assert_eq!(report.trips, 3);
        assert_eq!(report.travel_times.month, Some(Ranked::new("March".to_string(), 3)));
        assert_eq!(report.travel_times.hour, Some(Ranked::new("08".to_string(), 2)));
        assert_eq!(report.durations.total, 600.0);
        assert_eq!(report.durations.mean, Some(200.0));
        assert_eq!(report.durations.shortest, Some(100.0));
        assert_eq!(report.durations.longest, Some(300.0));
        assert_eq!(report.stations.start, Some(Ranked::new("A".to_string(), 2)));
        assert_eq!(report.stations.end, Some(Ranked::new("C".to_string(), 2)));
    }

    #[test]
    fn test_empty_set_reports_no_data() {
        let report = compute_statistics(&[], City::Chicago);

        assert_eq!(report.trips, 0);
        assert_eq!(report.travel_times.month, None);
        assert_eq!(report.durations.total, 0.0);
        assert_eq!(report.durations.count, 0);
        assert_eq!(report.durations.mean, None);
        assert_eq!(report.stations.trip, None);
        assert_eq!(report.user_types, UserTypeCounts::default());

        let demographics = report.demographics.unwrap();
        assert_eq!(demographics.gender, GenderCounts::default());
        assert_eq!(demographics.birth_year, None);
    }

    #[test]
    fn test_reduced_schema_has_no_demographics() {
        let records = vec![with_demographics(
            trip("2017-01-01 00:00:00", 60.0, "A", "B", SUBSCRIBER),
            "Male",
            "1990",
        )];
        let report = compute_statistics(&records, City::Washington);
        assert_eq!(report.demographics, None);
    }

    #[test]
    fn test_birth_year_scenario() {
        let base = trip("2017-01-01 00:00:00", 60.0, "A", "B", SUBSCRIBER);
        let records: Vec<_> = ["1990", "1985", "1990", "", "abc"]
            .into_iter()
            .map(|year| with_demographics(base.clone(), "Male", year))
            .collect();

        let report = compute_statistics(&records, City::NewYork);
        let birth_year = report.demographics.unwrap().birth_year.unwrap();

        assert_eq!(birth_year.earliest, 1985);
        assert_eq!(birth_year.latest, 1990);
        assert_eq!(birth_year.most_common, Ranked::new(1990, 2));
    }

    #[test]
    fn test_gender_counts_ignore_blank_and_other() {
        let base = trip("2017-01-01 00:00:00", 60.0, "A", "B", SUBSCRIBER);
        let records: Vec<_> = ["Male", "Female", "", "Male", "Unknown"]
            .into_iter()
            .map(|g| with_demographics(base.clone(), g, "1980"))
            .collect();

        let report = compute_statistics(&records, City::Chicago);
        assert_eq!(
            report.demographics.unwrap().gender,
            GenderCounts { male: 2, female: 1 }
        );
    }

    #[test]
    fn test_user_type_counts() {
        let records = vec![
            trip("2017-01-01 00:00:00", 1.0, "A", "B", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "A", "B", CUSTOMER),
            trip("2017-01-01 00:00:00", 1.0, "A", "B", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "A", "B", ""),
        ];
        let counts = compute_statistics(&records, City::Chicago).user_types;

        assert_eq!(
            counts,
            UserTypeCounts {
                subscriber: 2,
                customer: 1,
                dependent: 0,
                other: 1,
            }
        );
        assert!(counts.subscriber + counts.customer + counts.dependent <= records.len());
    }

    #[test]
    fn test_station_tie_goes_to_first_seen() {
        let records = vec![
            trip("2017-01-01 00:00:00", 1.0, "Zeta", "B", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "Alpha", "B", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "Alpha", "B", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "Zeta", "B", SUBSCRIBER),
        ];
        let report = compute_statistics(&records, City::Washington);
        assert_eq!(report.stations.start, Some(Ranked::new("Zeta".to_string(), 2)));
    }

    #[test]
    fn test_station_pair_tie_goes_to_smallest_pair() {
        let records = vec![
            trip("2017-01-01 00:00:00", 1.0, "Zeta", "Alpha", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "Alpha", "Zeta", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "Zeta", "Alpha", SUBSCRIBER),
            trip("2017-01-01 00:00:00", 1.0, "Alpha", "Zeta", SUBSCRIBER),
        ];
        let trip_pair = compute_statistics(&records, City::Washington).stations.trip;
        assert_eq!(
            trip_pair,
            Some(Ranked::new(
                StationPair {
                    start: "Alpha".to_string(),
                    end: "Zeta".to_string(),
                },
                2
            ))
        );
    }

    #[test]
    fn test_repeated_runs_are_independent() {
        let records = vec![
            trip("2017-02-01 10:00:00", 10.0, "A", "B", SUBSCRIBER),
            trip("2017-02-02 11:00:00", 20.0, "B", "A", CUSTOMER),
        ];
        let first = compute_statistics(&records, City::Chicago);
        let second = compute_statistics(&records, City::Chicago);

        assert_eq!(first, second);
        assert_eq!(second.durations.count, 2);
        assert_eq!(second.travel_times.month, Some(Ranked::new("February".to_string(), 2)));
    }
}

//! Output formatting and persistence for trip statistics.
//!
//! Supports plain-text reports, pretty-printing, JSON serialization, CSV
//! append of a one-row summary, and CSV rendering of raw record pages.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::city::Schema;
use crate::filter::FilterSpec;
use crate::record::TripRecord;
use crate::stats::{Ranked, StatisticsReport};

const NO_DATA: &str = "no data";

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &StatisticsReport) {
    debug!("{:#?}", report);
}

/// Writes a report as pretty-printed JSON.
pub fn write_json<W: Write>(mut out: W, report: &StatisticsReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Writes the human-readable report shown by the CLI.
pub fn write_report<W: Write>(mut out: W, report: &StatisticsReport) -> Result<()> {
    let times = &report.travel_times;
    writeln!(out, "Trips analysed: {}", report.trips)?;
    writeln!(out)?;
    writeln!(out, "Most Popular Start Month: {}", ranked(&times.month))?;
    writeln!(out, "Most Popular Start Day: {}", ranked(&times.day))?;
    writeln!(out, "Most Popular Start Hour: {}", ranked(&times.hour))?;
    writeln!(out)?;

    let d = &report.durations;
    writeln!(out, "Total Trip Duration: {}, Count: {}", d.total, d.count)?;
    writeln!(out, "Average Trip Duration: {}", or_no_data(d.mean))?;
    writeln!(
        out,
        "Shortest Trip: {}, Longest Trip: {}",
        or_no_data(d.shortest),
        or_no_data(d.longest)
    )?;
    writeln!(out)?;

    let s = &report.stations;
    match &s.trip {
        Some(trip) => writeln!(
            out,
            "Most Popular Trip: begins at {}, ends at {}, Count: {}",
            trip.value.start, trip.value.end, trip.count
        )?,
        None => writeln!(out, "Most Popular Trip: {NO_DATA}")?,
    }
    writeln!(out, "Most Popular Start Station: {}", ranked(&s.start))?;
    writeln!(out, "Most Popular End Station: {}", ranked(&s.end))?;
    writeln!(out)?;

    let u = &report.user_types;
    writeln!(out, "User statistics:")?;
    writeln!(out, "  Subscriber: {}", u.subscriber)?;
    writeln!(out, "  Customer: {}", u.customer)?;
    writeln!(out, "  Dependent: {}", u.dependent)?;
    if u.other > 0 {
        writeln!(out, "  Other: {}", u.other)?;
    }

    if let Some(demo) = &report.demographics {
        writeln!(out)?;
        writeln!(out, "Gender statistics:")?;
        writeln!(out, "  Male: {}", demo.gender.male)?;
        writeln!(out, "  Female: {}", demo.gender.female)?;
        writeln!(out)?;
        match &demo.birth_year {
            Some(by) => {
                writeln!(
                    out,
                    "Earliest Birth Year: {}, Latest Birth Year: {}",
                    by.earliest, by.latest
                )?;
                writeln!(
                    out,
                    "Most Common Birth Year: {}, Count: {}",
                    by.most_common.value, by.most_common.count
                )?;
            }
            None => writeln!(out, "Birth years: {NO_DATA}")?,
        }
    }

    Ok(())
}

/// Writes raw records as CSV, headed by the schema's column names.
pub fn write_page<W: Write>(out: W, schema: Schema, records: &[TripRecord]) -> Result<()> {
    let columns = schema.columns();
    let mut writer = WriterBuilder::new().flexible(true).from_writer(out);

    writer.write_record(columns)?;
    for record in records {
        let mut row = record.to_row();
        row.resize(columns.len(), String::new());
        writer.write_record(&row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Flattened summary of one run, one CSV row per run.
#[derive(Debug, Serialize)]
pub struct ReportRow {
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub month_filter: String,
    pub day_filter: String,
    pub trips: usize,
    pub popular_month: Option<String>,
    pub popular_day: Option<String>,
    pub popular_hour: Option<String>,
    pub total_duration: f64,
    pub mean_duration: Option<f64>,
    pub popular_start_station: Option<String>,
    pub popular_end_station: Option<String>,
    pub subscribers: usize,
    pub customers: usize,
    pub dependents: usize,
    pub male: Option<usize>,
    pub female: Option<usize>,
    pub earliest_birth_year: Option<i32>,
    pub latest_birth_year: Option<i32>,
}

impl ReportRow {
    pub fn new(spec: &FilterSpec, report: &StatisticsReport) -> Self {
        let value = |r: &Option<Ranked<String>>| r.as_ref().map(|r| r.value.clone());
        let demo = report.demographics.as_ref();
        let birth_year = demo.and_then(|d| d.birth_year.as_ref());

        Self {
            timestamp: Utc::now(),
            city: spec.city.to_string(),
            month_filter: spec.month.to_string(),
            day_filter: spec.day.to_string(),
            trips: report.trips,
            popular_month: value(&report.travel_times.month),
            popular_day: value(&report.travel_times.day),
            popular_hour: value(&report.travel_times.hour),
            total_duration: report.durations.total,
            mean_duration: report.durations.mean,
            popular_start_station: value(&report.stations.start),
            popular_end_station: value(&report.stations.end),
            subscribers: report.user_types.subscriber,
            customers: report.user_types.customer,
            dependents: report.user_types.dependent,
            male: demo.map(|d| d.gender.male),
            female: demo.map(|d| d.gender.female),
            earliest_birth_year: birth_year.map(|b| b.earliest),
            latest_birth_year: birth_year.map(|b| b.latest),
        }
    }
}

/// Appends a [`ReportRow`] to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, row: &ReportRow) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(row)?;
    writer.flush()?;

    Ok(())
}

fn ranked<T: Display>(r: &Option<Ranked<T>>) -> String {
    match r {
        Some(r) => format!("{}, Count: {}", r.value, r.count),
        None => NO_DATA.to_string(),
    }
}

fn or_no_data(v: Option<f64>) -> String {
    v.map_or_else(|| NO_DATA.to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::City;
    use crate::stats::compute_statistics;
    use chrono::NaiveDateTime;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn record(gender: Option<&str>, birth_year: Option<&str>) -> TripRecord {
        TripRecord {
            ride_id: "7".to_string(),
            start_time: NaiveDateTime::parse_from_str("2017-05-02 07:45:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            end_time: "2017-05-02 07:55:00".to_string(),
            trip_duration: 600.0,
            start_station: "Canal St & Adams St".to_string(),
            end_station: "Clinton St & Madison St".to_string(),
            user_type: "Subscriber".to_string(),
            gender: gender.map(str::to_string),
            birth_year: birth_year.map(str::to_string),
        }
    }

    fn render(report: &StatisticsReport) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, report).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_report_full_schema() {
        let records = vec![record(Some("Female"), Some("1988"))];
        let text = render(&compute_statistics(&records, City::Chicago));

        assert!(text.contains("Most Popular Start Month: May, Count: 1"));
        assert!(text.contains("Most Popular Start Day: Tuesday, Count: 1"));
        assert!(text.contains("Most Popular Start Hour: 07, Count: 1"));
        assert!(text.contains("begins at Canal St & Adams St, ends at Clinton St & Madison St"));
        assert!(text.contains("Female: 1"));
        assert!(text.contains("Most Common Birth Year: 1988, Count: 1"));
    }

    #[test]
    fn test_write_report_reduced_schema_omits_demographics() {
        let records = vec![record(None, None)];
        let text = render(&compute_statistics(&records, City::Washington));

        assert!(text.contains("Subscriber: 1"));
        assert!(!text.contains("Gender"));
        assert!(!text.contains("Birth"));
    }

    #[test]
    fn test_write_report_empty_set() {
        let text = render(&compute_statistics(&[], City::NewYork));

        assert!(text.contains("Most Popular Start Month: no data"));
        assert!(text.contains("Average Trip Duration: no data"));
        assert!(text.contains("Most Popular Trip: no data"));
        assert!(text.contains("Birth years: no data"));
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&compute_statistics(&[], City::Chicago));
    }

    #[test]
    fn test_write_json() {
        let records = vec![record(None, None)];
        let mut buf = Vec::new();
        write_json(&mut buf, &compute_statistics(&records, City::Washington)).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["city"], "washington");
        assert_eq!(json["trips"], 1);
        assert_eq!(json["durations"]["mean"], 600.0);
        assert!(json["demographics"].is_null());
    }

    #[test]
    fn test_write_page() {
        let records = vec![record(None, None), record(None, None)];
        let mut buf = Vec::new();
        write_page(&mut buf, Schema::Reduced, &records).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ride_id,start_time"));
        assert!(lines[1].contains("2017-05-02 07:45:00"));
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("bikeshare_stats_test_header.csv");
        let _ = fs::remove_file(&path);

        let spec = FilterSpec::new(City::Chicago);
        let report = compute_statistics(&[record(Some("Male"), Some("1990"))], City::Chicago);
        let row = ReportRow::new(&spec, &report);
        append_record(&path, &row).unwrap();
        append_record(&path, &row).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // 1 header + 2 data rows
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines.iter().filter(|l| l.contains("timestamp")).count(), 1);
        assert!(lines[1].contains("Chicago,All,All,1,May,Tuesday,07"));

        fs::remove_file(&path).unwrap();
    }
}

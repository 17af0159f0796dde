//! CLI entry point for the bikeshare statistics tool.
//!
//! Runs the interactive prompt loop by default, or one-shot subcommands that
//! print the statistics report or a page of raw trip records.

mod interactive;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use bikeshare_stats::config::Settings;
use bikeshare_stats::output::{self, ReportRow};
use bikeshare_stats::paginate::{DEFAULT_BATCH_SIZE, page};
use bikeshare_stats::{
    City, DayFilter, FilterSpec, FilteredSet, Loader, MalformedPolicy, MonthFilter,
    StatisticsReport, compute_statistics,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "bikeshare_stats")]
#[command(about = "Explore bikeshare trip statistics for Chicago, New York and Washington", long_about = None)]
struct Cli {
    /// Directory containing chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Skip rows with a malformed start time or duration instead of failing
    #[arg(long, global = true, default_value_t = false)]
    skip_malformed: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prompt for a city and filters, then show statistics (default)
    Interactive,
    /// Print the statistics report for one city and filter
    Stats {
        #[arg(value_name = "CITY")]
        city: City,

        /// January through June, or All
        #[arg(short, long, default_value = "All")]
        month: MonthFilter,

        /// Weekday name, 1-7 (1 = Sunday), or All
        #[arg(short, long, default_value = "All")]
        day: DayFilter,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,

        /// CSV file to append a summary row to
        #[arg(short, long = "output", value_name = "FILE")]
        summary_csv: Option<PathBuf>,
    },
    /// Print one page of the raw trip records matching a filter
    Raw {
        #[arg(value_name = "CITY")]
        city: City,

        #[arg(short, long, default_value = "All")]
        month: MonthFilter,

        #[arg(short, long, default_value = "All")]
        day: DayFilter,

        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: usize,

        /// Records per page
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = settings
        .log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = settings
        .log_file_path
        .file_name()
        .unwrap_or(OsStr::new("bikeshare_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or(settings.data_dir);
    let policy = if cli.skip_malformed {
        MalformedPolicy::Skip
    } else {
        settings.malformed_policy
    };
    let loader = Loader::new(data_dir).with_policy(policy);
    info!(data_dir = %loader.data_dir().display(), ?policy, "Loader ready");

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => interactive::run(&loader)?,
        Commands::Stats {
            city,
            month,
            day,
            json,
            summary_csv,
        } => {
            let spec = FilterSpec::new(city).with_month(month).with_day(day);
            let (_, report) = analyze(&loader, &spec)?;

            output::print_pretty(&report);
            let stdout = std::io::stdout().lock();
            if json {
                output::write_json(stdout, &report)?;
            } else {
                output::write_report(stdout, &report)?;
            }

            if let Some(path) = summary_csv {
                output::append_record(&path, &ReportRow::new(&spec, &report))?;
                info!(path = %path.display(), "Summary row appended");
            }
        }
        Commands::Raw {
            city,
            month,
            day,
            page: page_index,
            batch_size,
        } => {
            let spec = FilterSpec::new(city).with_month(month).with_day(day);
            let set = loader.load(&spec)?;
            let batch = page(set.records(), page_index, batch_size.max(1));
            if batch.is_empty() {
                warn!(page = page_index, total = set.len(), "Page is past the end of the trip data");
            }
            output::write_page(std::io::stdout().lock(), city.schema(), batch)?;
        }
    }

    Ok(())
}

/// Loads the trips selected by `spec` and computes their statistics.
#[tracing::instrument(skip(loader, spec), fields(spec = %spec))]
pub(crate) fn analyze(loader: &Loader, spec: &FilterSpec) -> Result<(FilteredSet, StatisticsReport)> {
    let set = loader.load(spec)?;
    if set.skipped > 0 {
        warn!(skipped = set.skipped, "Malformed rows were skipped; totals exclude them");
    }
    if set.is_empty() {
        info!("No trips match the selected filters");
    }

    let report = compute_statistics(set.records(), spec.city);
    Ok((set, report))
}

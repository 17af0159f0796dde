pub mod city;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod paginate;
pub mod record;
pub mod stats;

pub use city::{City, Schema};
pub use error::{BikeshareError, Result};
pub use filter::{DayFilter, FilterSpec, MonthFilter};
pub use loader::{FilteredSet, Loader, MalformedPolicy};
pub use record::TripRecord;
pub use stats::{StatisticsReport, compute_statistics};

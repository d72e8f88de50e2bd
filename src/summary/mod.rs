use chrono::NaiveDate;
use thiserror::Error;

pub mod aggregate;
pub mod cache;
pub mod dataset;
pub mod rows;
pub mod vendor;


pub use aggregate::{summarize, DateRange, Summary, Totals, VendorSummary};
pub use cache::SummaryCache;
pub use dataset::Dataset;

#[derive(Debug, PartialEq, Error)]
pub enum SummaryError {
    #[error("start date {start} is after end date {end}")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("{0} is out of range")]
    Overflow(String),
}

use chrono::NaiveDate;
use enum_dispatch::enum_dispatch;
use thiserror::Error;

pub mod command;
pub mod events;
pub mod interactive;

use crate::data::LoadError;
use crate::summary::{Dataset, DateRange, Summary, SummaryCache, SummaryError};
use events::{SetEndDate, SetStartDate, Upload};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Load(#[from] LoadError),
    #[error("{0}")]
    Summary(#[from] SummaryError),
}

/// A user input that changes the `(file, start_date, end_date)` tuple.
#[enum_dispatch]
pub trait SessionEvent {
    fn apply(&self, session: &mut Session) -> Result<(), SessionError>;
}

#[enum_dispatch(SessionEvent)]
#[derive(Debug)]
pub enum Event {
    Upload,
    SetStartDate,
    SetEndDate,
}

/// What the user sees after a pipeline run.
#[derive(Debug)]
pub enum Outcome {
    AwaitingFile,
    AwaitingDates,
    Report(Summary),
    /// Valid window, nothing in it.
    NoData(DateRange),
    Rejected(SessionError),
}

/// Inputs of one user session plus the summaries computed from them.
#[derive(Debug, Default)]
pub struct Session {
    dataset: Option<Dataset>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    cache: SummaryCache,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Applies an event without running the pipeline.
    pub fn apply(&mut self, event: Event) -> Result<(), SessionError> {
        event.apply(self)
    }

    /// Applies an event and re-runs the pipeline on the new inputs.
    pub fn handle(&mut self, event: Event) -> Outcome {
        match self.apply(event) {
            Ok(()) => self.run(),
            Err(err) => Outcome::Rejected(err),
        }
    }

    /// Runs filter and aggregation on the current inputs.
    pub fn run(&mut self) -> Outcome {
        let Some(dataset) = self.dataset.as_ref() else {
            return Outcome::AwaitingFile;
        };
        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Outcome::AwaitingDates;
        };

        let range = match DateRange::new(start, end) {
            Ok(range) => range,
            Err(err) => return Outcome::Rejected(err.into()),
        };

        let summary = match self.cache.summarize(dataset, range) {
            Ok(summary) => summary,
            Err(err) => return Outcome::Rejected(err.into()),
        };
        if summary.is_empty() {
            Outcome::NoData(range)
        } else {
            Outcome::Report(summary.clone())
        }
    }

    fn replace_dataset(&mut self, dataset: Option<Dataset>) {
        if let Some((first, last)) = dataset.as_ref().and_then(Dataset::date_span) {
            self.start.get_or_insert(first);
            self.end.get_or_insert(last);
        }
        self.dataset = dataset;
    }

    fn set_start(&mut self, date: NaiveDate) {
        self.start = Some(date);
    }

    fn set_end(&mut self, date: NaiveDate) {
        self.end = Some(date);
    }
}

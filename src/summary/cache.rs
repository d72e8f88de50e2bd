use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::NaiveDate;
use log::debug;

use super::aggregate::{summarize, DateRange, Summary};
use super::dataset::Dataset;
use super::SummaryError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    fingerprint: String,
    start: NaiveDate,
    end: NaiveDate,
}

/// Memoizes summaries by dataset identity and window.
///
/// Entries are never evicted; a cache lives as long as one session.
#[derive(Debug, Default)]
pub struct SummaryCache {
    entries: HashMap<CacheKey, Summary>,
}

impl SummaryCache {
    pub fn new() -> SummaryCache {
        SummaryCache {
            entries: HashMap::new(),
        }
    }

    /// Failed runs are not cached.
    pub fn summarize(&mut self, dataset: &Dataset, range: DateRange) -> Result<&Summary, SummaryError> {
        let key = CacheKey {
            fingerprint: dataset.fingerprint().clone(),
            start: range.start(),
            end: range.end(),
        };

        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                debug!("summary cache hit for {} to {}", range.start(), range.end());
                Ok(entry.into_mut())
            },
            Entry::Vacant(entry) => {
                debug!("summary cache miss for {} to {}", range.start(), range.end());
                Ok(entry.insert(summarize(dataset.rows(), range)?))
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

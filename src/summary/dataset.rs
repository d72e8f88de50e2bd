use chrono::NaiveDate;
use getset::Getters;

use super::rows::{normalize, NormalizedRow, TransactionRow};

/// The normalized rows of one upload.
///
/// `fingerprint` identifies the uploaded content, two uploads of the same
/// bytes share it.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct Dataset {
    source: String,
    fingerprint: String,
    rows: Vec<NormalizedRow>,
}

impl Dataset {
    pub fn new(source: &str, fingerprint: String, rows: Vec<TransactionRow>) -> Dataset {
        Dataset {
            source: source.to_string(),
            fingerprint,
            rows: normalize(rows),
        }
    }

    /// First and last transaction day, `None` for an empty upload.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut days = self.rows.iter().map(|row| row.date().date());
        let first = days.next()?;

        Some(days.fold((first, first), |(min, max), day| (min.min(day), max.max(day))))
    }
}

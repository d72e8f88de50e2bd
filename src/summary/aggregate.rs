use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use getset::{CopyGetters, Getters};
use log::debug;
use rust_decimal::Decimal;

use super::rows::NormalizedRow;
use super::SummaryError;

/// An inclusive window of calendar days, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<DateRange, SummaryError> {
        if start > end {
            return Err(SummaryError::DateRange { start, end });
        }

        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `at` falls between 00:00:00 of the first day and the last
    /// instant of the final day.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let day = at.date();
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VendorSummary {
    pub vendor: String,
    pub credit_total: Decimal,
    pub debit_total: Decimal,
    pub net_total: Decimal,
}

impl VendorSummary {
    fn new(vendor: String) -> VendorSummary {
        VendorSummary {
            vendor,
            credit_total: Decimal::ZERO,
            debit_total: Decimal::ZERO,
            net_total: Decimal::ZERO,
        }
    }

    fn add(&mut self, row: &NormalizedRow) -> Result<(), SummaryError> {
        let overflow = || SummaryError::Overflow(format!("total for vendor {:?}", self.vendor));

        let credit_total = self.credit_total.checked_add(row.credit()).ok_or_else(overflow)?;
        let debit_total = self.debit_total.checked_add(row.debit()).ok_or_else(overflow)?;
        let net_total = self.net_total.checked_add(row.net()).ok_or_else(overflow)?;

        self.credit_total = credit_total;
        self.debit_total = debit_total;
        self.net_total = net_total;

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub credit: Decimal,
    pub debit: Decimal,
    pub net: Decimal,
}

/// Result of filtering one dataset to a window and grouping it by vendor.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct Summary {
    #[getset(get_copy = "pub")]
    range: DateRange,
    #[getset(get_copy = "pub")]
    row_count: usize,
    #[getset(get = "pub")]
    vendors: Vec<VendorSummary>,
    #[getset(get_copy = "pub")]
    totals: Totals,
}

impl Summary {
    /// No row fell inside the window.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Vendors paired with their 1-based display rank.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &VendorSummary)> {
        self.vendors.iter().enumerate().map(|(index, vendor)| (index + 1, vendor))
    }
}

pub fn filter_rows<'a>(rows: &'a [NormalizedRow], range: DateRange) -> impl Iterator<Item = &'a NormalizedRow> {
    rows.iter().filter(move |row| range.contains(row.date()))
}

/// Groups the rows in the window by vendor label, highest net first.
pub fn summarize_vendors(rows: &[NormalizedRow], range: DateRange) -> Result<Vec<VendorSummary>, SummaryError> {
    let mut groups: BTreeMap<&str, VendorSummary> = BTreeMap::new();
    for row in filter_rows(rows, range) {
        groups
            .entry(row.vendor().as_str())
            .or_insert_with(|| VendorSummary::new(row.vendor().clone()))
            .add(row)?;
    }

    let mut vendors: Vec<VendorSummary> = groups.into_values().collect();
    vendors.sort_by(|a, b| b.net_total.cmp(&a.net_total));

    Ok(vendors)
}

pub fn summarize_totals(rows: &[NormalizedRow], range: DateRange) -> Result<Totals, SummaryError> {
    let overflow = || SummaryError::Overflow("window total".to_string());

    filter_rows(rows, range).try_fold(Totals::default(), |totals, row| -> Result<Totals, SummaryError> {
        Ok(Totals {
            credit: totals.credit.checked_add(row.credit()).ok_or_else(overflow)?,
            debit: totals.debit.checked_add(row.debit()).ok_or_else(overflow)?,
            net: totals.net.checked_add(row.net()).ok_or_else(overflow)?,
        })
    })
}

/// Fails with [`SummaryError::Overflow`] when a sum leaves the decimal range.
pub fn summarize(rows: &[NormalizedRow], range: DateRange) -> Result<Summary, SummaryError> {
    let row_count = filter_rows(rows, range).count();
    let vendors = summarize_vendors(rows, range)?;
    let totals = summarize_totals(rows, range)?;

    debug!(
        "summarized {} rows into {} vendors for {} to {}",
        row_count,
        vendors.len(),
        range.start(),
        range.end()
    );

    Ok(Summary {
        range,
        row_count,
        vendors,
        totals,
    })
}

use chrono::NaiveDateTime;
use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;

use super::vendor::extract_vendor;

/// A row as it appears in the upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub date: NaiveDateTime,
    pub company: String,
    pub credit: Option<Decimal>,
    pub debit: Option<Decimal>,
}

/// A row with absent amounts zeroed, its net and its vendor label derived.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct NormalizedRow {
    #[getset(get_copy = "pub")]
    date: NaiveDateTime,
    #[getset(get = "pub")]
    company: String,
    #[getset(get_copy = "pub")]
    credit: Decimal,
    #[getset(get_copy = "pub")]
    debit: Decimal,
    #[getset(get_copy = "pub")]
    net: Decimal,
    #[getset(get = "pub")]
    vendor: String,
}

impl From<TransactionRow> for NormalizedRow {
    fn from(row: TransactionRow) -> Self {
        let credit = row.credit.unwrap_or(Decimal::ZERO);
        let debit = row.debit.unwrap_or(Decimal::ZERO);

        NormalizedRow {
            date: row.date,
            vendor: extract_vendor(&row.company),
            company: row.company,
            credit,
            debit,
            net: credit - debit,
        }
    }
}

pub fn normalize(rows: Vec<TransactionRow>) -> Vec<NormalizedRow> {
    rows.into_iter().map(NormalizedRow::from).collect()
}

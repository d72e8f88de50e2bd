use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::summary::dataset::Dataset;
use crate::summary::rows::TransactionRow;
use crate::summary::Summary;

/// Decimal places of exported amounts.
const PRECISION: u32 = 2;

/// Uploads larger than this are rejected before parsing.
pub const MAX_UPLOAD_BYTES: u64 = 5_000_000;

pub const DATE_COLUMN: &str = "Transaction date";
pub const COMPANY_COLUMN: &str = "Company";
pub const CREDIT_COLUMN: &str = "Credit";
pub const DEBIT_COLUMN: &str = "Debit";

pub const REQUIRED_COLUMNS: [&str; 4] = [DATE_COLUMN, COMPANY_COLUMN, CREDIT_COLUMN, DEBIT_COLUMN];

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
// `%y` goes first: `%Y` would also accept a two-digit year.
const DATE_FORMATS: [&str; 6] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%y", "%m/%d/%Y", "%d-%b-%Y", "%b %d, %Y"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("missing required column(s): {}", .0.join(", "))]
    Schema(Vec<String>),
    #[error("upload is {size} bytes, the limit is {limit} bytes")]
    SizeLimit { size: u64, limit: u64 },
    #[error("line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
pub struct TransactionRecord {
    #[serde(rename = "Transaction date")]
    pub date: String,
    #[serde(rename = "Company", default)]
    pub company: Option<String>,
    #[serde(rename = "Credit", default)] // Default to `None` if the field is empty
    pub credit: Option<String>,
    #[serde(rename = "Debit", default)]
    pub debit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryRecord<'a> {
    #[serde(rename = "#")]
    pub rank: usize,
    #[serde(rename = "Vendor")]
    pub vendor: &'a str,
    #[serde(rename = "Credit")]
    pub credit: Decimal,
    #[serde(rename = "Debit")]
    pub debit: Decimal,
    #[serde(rename = "Net")]
    pub net: Decimal,
}

impl TransactionRecord {
    fn into_row(self, line: u64) -> Result<TransactionRow, LoadError> {
        let malformed = |reason: String| LoadError::MalformedRow { line, reason };

        let date = parse_transaction_date(&self.date)
            .ok_or_else(|| malformed(format!("unrecognized transaction date {:?}", self.date)))?;
        let credit = parse_amount("credit", self.credit.as_deref()).map_err(malformed)?;
        let debit = parse_amount("debit", self.debit.as_deref()).map_err(malformed)?;

        Ok(TransactionRow {
            date,
            company: self.company.unwrap_or_default(),
            credit,
            debit,
        })
    }
}

/// Parses a transaction timestamp. Date-only values land on midnight.
pub fn parse_transaction_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Credit and debit are unsigned; the column says which way the money went.
fn parse_amount(column: &str, value: Option<&str>) -> Result<Option<Decimal>, String> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };

    match Decimal::from_str(value) {
        Ok(amount) if amount.is_sign_negative() && !amount.is_zero() => Err(format!("negative {column} {value:?}")),
        // Drops the sign of `-0`.
        Ok(amount) => Ok(Some(amount.abs())),
        Err(_) => Err(format!("invalid {column} {value:?}")),
    }
}

fn check_size(size: u64) -> Result<(), LoadError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(LoadError::SizeLimit {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(())
}

/// Reads an upload from disk, refusing oversized files before reading them.
pub fn read_upload(path: &Path) -> Result<Vec<u8>, LoadError> {
    let file = File::open(path)?;
    check_size(file.metadata()?.len())?;

    let mut bytes = Vec::new();
    // The file may have grown since the metadata call.
    file.take(MAX_UPLOAD_BYTES + 1).read_to_end(&mut bytes)?;
    check_size(bytes.len() as u64)?;

    Ok(bytes)
}

/// Parses raw CSV bytes into transaction rows, in file order.
///
/// The size ceiling and the required columns are both checked before any row
/// is looked at.
pub fn load_csv(bytes: &[u8]) -> Result<Vec<TransactionRow>, LoadError> {
    check_size(bytes.len() as u64)?;

    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(bytes);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|header| header == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::Schema(missing));
    }

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|position| position.line()).unwrap_or_default();
        let transaction: TransactionRecord = record.deserialize(Some(&headers))?;
        rows.push(transaction.into_row(line)?);
    }

    debug!("parsed {} transaction rows", rows.len());

    Ok(rows)
}

/// Hex SHA-256 of the upload, used as the dataset identity.
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Loads and normalizes one upload.
pub fn load_dataset(source: &str, bytes: &[u8]) -> Result<Dataset, LoadError> {
    let rows = load_csv(bytes)?;
    let dataset = Dataset::new(source, fingerprint(bytes), rows);

    info!("loaded {} rows from {}", dataset.rows().len(), source);

    Ok(dataset)
}

fn to_cents(amount: Decimal) -> Decimal {
    let mut cents = amount.round_dp(PRECISION);
    cents.rescale(PRECISION);
    cents
}

/// Writes the ranked vendor table as CSV with a header row. Amounts always
/// carry two decimal places.
pub fn export_csv<W: Write>(summary: &Summary, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    for (rank, vendor) in summary.ranked() {
        csv_writer.serialize(SummaryRecord {
            rank,
            vendor: &vendor.vendor,
            credit: to_cents(vendor.credit_total),
            debit: to_cents(vendor.debit_total),
            net: to_cents(vendor.net_total),
        })?;
    }

    csv_writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::{bail, Result};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const SAMPLE_CSV: &str = "\
Transaction date,Company,Credit,Debit,Account
2024-03-01,1234567 MEMO EMPTX-998877 PAYROLL DEPOSIT CO,2500.00,,chequing
2024-03-02,4506****8888547 COFFEE SHOP DOWNTOWN LOCATION,,4.75,chequing
2024-03-03,,10,1.5,chequing
";

    fn at_midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_load_csv_rows_in_file_order() -> Result<()> {
        let rows = load_csv(SAMPLE_CSV.as_bytes())?;

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, at_midnight(2024, 3, 1));
        assert_eq!(rows[0].company, "1234567 MEMO EMPTX-998877 PAYROLL DEPOSIT CO");
        assert_eq!(rows[0].credit, Some(dec!(2500.00)));
        assert_eq!(rows[0].debit, None);
        assert_eq!(rows[1].credit, None);
        assert_eq!(rows[1].debit, Some(dec!(4.75)));
        assert_eq!(rows[2].company, "");

        Ok(())
    }

    #[test]
    fn test_load_csv_missing_columns() -> Result<()> {
        let csv = "Transaction date,company,Credit\n2024-03-01,ACME,1\n";
        match load_csv(csv.as_bytes()) {
            Err(LoadError::Schema(missing)) => assert_eq!(missing, vec!["Company", "Debit"]),
            other => bail!("expected a schema error, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_load_csv_schema_checked_before_rows() -> Result<()> {
        // The bad date would fail row parsing, the schema error must win.
        let csv = "Transaction date,Company,Credit\nnot a date,ACME,x\n";
        assert!(matches!(load_csv(csv.as_bytes()), Err(LoadError::Schema(_))));

        Ok(())
    }

    #[test]
    fn test_load_csv_empty_input_is_schema_error() {
        assert!(matches!(load_csv(b""), Err(LoadError::Schema(missing)) if missing.len() == 4));
    }

    #[test]
    fn test_load_csv_header_only() -> Result<()> {
        let rows = load_csv(b"Transaction date,Company,Credit,Debit\n")?;
        assert!(rows.is_empty());

        Ok(())
    }

    #[test]
    fn test_load_csv_size_limit() -> Result<()> {
        let mut csv = b"Transaction date,Company,Credit,Debit\n".to_vec();
        csv.resize(MAX_UPLOAD_BYTES as usize + 1, b' ');

        match load_csv(&csv) {
            Err(LoadError::SizeLimit { size, limit }) => {
                assert_eq!(size, MAX_UPLOAD_BYTES + 1);
                assert_eq!(limit, MAX_UPLOAD_BYTES);
            },
            other => bail!("expected a size limit error, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_load_csv_malformed_amount() -> Result<()> {
        let csv = "Transaction date,Company,Credit,Debit\n2024-03-01,ACME,1.00,\n2024-03-02,ACME,abc,\n";
        match load_csv(csv.as_bytes()) {
            Err(LoadError::MalformedRow { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("credit"));
            },
            other => bail!("expected a malformed row, got {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_load_csv_malformed_date() {
        let csv = "Transaction date,Company,Credit,Debit\nyesterday,ACME,1.00,\n";
        assert!(matches!(
            load_csv(csv.as_bytes()),
            Err(LoadError::MalformedRow { line: 2, .. })
        ));
    }

    #[test]
    fn test_load_csv_negative_amount() -> Result<()> {
        let csv = "Transaction date,Company,Credit,Debit\n2024-03-01,ACME,,-12.50\n";
        match load_csv(csv.as_bytes()) {
            Err(LoadError::MalformedRow { line, reason }) => {
                assert_eq!(line, 2);
                assert_eq!(reason, "negative debit \"-12.50\"");
            },
            other => bail!("expected a malformed row, got {:?}", other),
        }

        // A signed zero is still zero.
        let rows = load_csv("Transaction date,Company,Credit,Debit\n2024-03-01,ACME,-0.00,1\n".as_bytes())?;
        assert_eq!(rows[0].credit.map(|credit| credit.to_string()), Some("0.00".to_string()));

        Ok(())
    }

    #[test]
    fn test_read_upload_size_limit() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let at_limit = dir.path().join("at_limit.csv");
        std::fs::write(&at_limit, vec![b'x'; MAX_UPLOAD_BYTES as usize])?;
        assert_eq!(read_upload(&at_limit)?.len(), MAX_UPLOAD_BYTES as usize);

        let over_limit = dir.path().join("over_limit.csv");
        std::fs::write(&over_limit, vec![b'x'; MAX_UPLOAD_BYTES as usize + 1])?;
        match read_upload(&over_limit) {
            Err(LoadError::SizeLimit { size, limit }) => {
                assert_eq!(size, MAX_UPLOAD_BYTES + 1);
                assert_eq!(limit, MAX_UPLOAD_BYTES);
            },
            other => bail!("expected a size limit error, got {:?}", other.map(|bytes| bytes.len())),
        }

        assert!(matches!(read_upload(&dir.path().join("missing.csv")), Err(LoadError::Io(_))));

        Ok(())
    }

    #[test]
    fn test_to_cents_fixed_scale() {
        assert_eq!(to_cents(dec!(0)).to_string(), "0.00");
        assert_eq!(to_cents(dec!(6400)).to_string(), "6400.00");
        assert_eq!(to_cents(dec!(1250.5)).to_string(), "1250.50");
        assert_eq!(to_cents(dec!(-8.00)).to_string(), "-8.00");
        assert_eq!(to_cents(dec!(2.345)).to_string(), "2.34");
        assert_eq!(to_cents(dec!(2.355)).to_string(), "2.36");
    }

    #[test]
    fn test_parse_transaction_date_formats() {
        let expected = at_midnight(2024, 12, 26);
        assert_eq!(parse_transaction_date("2024-12-26"), Some(expected));
        assert_eq!(parse_transaction_date("2024/12/26"), Some(expected));
        assert_eq!(parse_transaction_date("12/26/2024"), Some(expected));
        assert_eq!(parse_transaction_date("12/26/24"), Some(expected));
        assert_eq!(parse_transaction_date("26-Dec-2024"), Some(expected));
        assert_eq!(parse_transaction_date("Dec 26, 2024"), Some(expected));
        assert_eq!(
            parse_transaction_date("2024-12-26 18:30:00"),
            NaiveDate::from_ymd_opt(2024, 12, 26).unwrap().and_hms_opt(18, 30, 0)
        );
        assert_eq!(parse_transaction_date("2024-13-01"), None);
        assert_eq!(parse_transaction_date(""), None);
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        assert_eq!(fingerprint(b"abc"), fingerprint(b"abc"));
        assert_ne!(fingerprint(b"abc"), fingerprint(b"abd"));
        assert_eq!(fingerprint(b"").len(), 64);
    }
}

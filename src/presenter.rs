use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Table};
use rust_decimal::Decimal;

use crate::data::export_csv;
use crate::summary::{DateRange, Summary, Totals};

/// Default name of the exported vendor table.
pub const EXPORT_FILE_NAME: &str = "vendor_summary.csv";

/// Formats an amount as `$1,234.56`. Negative amounts keep the sign after the
/// dollar sign: `$-1,234.56`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let digits = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    format!("${sign}{grouped}.{dec_part}")
}

pub fn metrics(totals: &Totals) -> [(&'static str, String); 3] {
    [
        ("Total Credit", format_currency(totals.credit)),
        ("Total Debit", format_currency(totals.debit)),
        ("Net", format_currency(totals.net)),
    ]
}

pub fn heading(range: DateRange) -> String {
    format!("Processing transactions from {} to {}", range.start(), range.end())
}

pub fn no_data_notice(range: DateRange) -> String {
    format!("No transactions found between {} and {}.", range.start(), range.end())
}

fn amount_cell(value: Decimal) -> Cell {
    Cell::new(format_currency(value)).set_alignment(CellAlignment::Right)
}

pub fn summary_table(summary: &Summary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Vendor", "Credit", "Debit", "Net"]);
    for (rank, vendor) in summary.ranked() {
        table.add_row(vec![
            Cell::new(rank).set_alignment(CellAlignment::Right),
            Cell::new(&vendor.vendor),
            amount_cell(vendor.credit_total),
            amount_cell(vendor.debit_total),
            amount_cell(vendor.net_total),
        ]);
    }
    table
}

/// Renders the report for one window: the table and the three metrics, or
/// the no-data notice when nothing matched.
pub fn render_summary(summary: &Summary) -> String {
    let mut out = heading(summary.range());
    out.push('\n');

    if summary.is_empty() {
        out.push_str(&no_data_notice(summary.range()));
        return out;
    }

    out.push_str(&summary_table(summary).to_string());
    out.push('\n');
    for (label, value) in metrics(&summary.totals()) {
        out.push_str(&format!("{label}: {value}\n"));
    }

    out
}

/// CSV bytes of the ranked vendor table. `None` when the window is empty.
pub fn csv_export(summary: &Summary) -> Result<Option<Vec<u8>>> {
    if summary.is_empty() {
        return Ok(None);
    }

    let mut bytes = Vec::new();
    export_csv(summary, &mut bytes)?;

    Ok(Some(bytes))
}

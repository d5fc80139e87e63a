//! CSV ingest of broker order exports.
//!
//! Expected header:
//! `Date,Time,Symbol,Name,Type,Side,AveragePrice,Qty,State,Fees`
//!
//! Dates are `MM/DD/YYYY` and are stored as `YYYY-MM-DD`. Numeric columns
//! that are empty, `null` or unparsable become `0.0`. Rows that cannot be
//! read are logged and skipped; the rest are inserted in one transaction.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::config;
use crate::connection::Connection;
use crate::error::{Result, StockbookError};
use crate::models::NewTransaction;
use crate::queries::transactions::TransactionQuery;

/// Whether an import replaces the table contents or adds to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
    #[default]
    Replace,
    Append,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time", default)]
    time: String,
    #[serde(rename = "Symbol")]
    symbol: String,
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Type", default)]
    order_type: String,
    #[serde(rename = "Side", default)]
    side: String,
    #[serde(rename = "AveragePrice", default)]
    average_price: String,
    #[serde(rename = "Qty", default)]
    qty: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Fees", default)]
    fees: String,
}

/// Import a CSV file from disk.
pub fn import_csv<P: AsRef<Path>>(
    conn: &Connection,
    path: P,
    mode: ImportMode,
) -> Result<ImportSummary> {
    let path = path.as_ref();
    log::info!("Importing transactions from {}", path.display());
    let file = File::open(path)?;
    import_reader(conn, BufReader::new(file), mode)
}

/// Import CSV data from any reader.
pub fn import_reader<R: Read>(
    conn: &Connection,
    reader: R,
    mode: ImportMode,
) -> Result<ImportSummary> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for required in ["Date", "Symbol"] {
        if !headers.iter().any(|h| h == required) {
            return Err(StockbookError::InvalidArgument(format!(
                "CSV is missing the {:?} column",
                required
            )));
        }
    }

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (line, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                log::warn!("Skipping CSV record {}: {}", line + 1, e);
                skipped += 1;
                continue;
            }
        };
        match to_new_transaction(row) {
            Ok(tx) => rows.push(tx),
            Err(msg) => {
                log::warn!("Skipping CSV record {}: {}", line + 1, msg);
                skipped += 1;
            }
        }
    }

    let imported = conn.transaction(|conn| {
        let query = TransactionQuery::new(conn);
        if mode == ImportMode::Replace {
            query.clear()?;
        }
        for tx in &rows {
            query.insert(tx)?;
        }
        Ok(rows.len())
    })?;

    log::info!("Imported {} transactions ({} skipped)", imported, skipped);
    Ok(ImportSummary { imported, skipped })
}

fn to_new_transaction(row: CsvRow) -> std::result::Result<NewTransaction, String> {
    let date = NaiveDate::parse_from_str(&row.date, config::CSV_DATE_FORMAT)
        .map_err(|e| format!("bad date {:?}: {}", row.date, e))?;
    if row.symbol.is_empty() {
        return Err("missing symbol".to_string());
    }
    Ok(NewTransaction {
        date: date.format(config::DATE_FORMAT).to_string(),
        time: row.time,
        symbol: row.symbol,
        name: row.name,
        order_type: row.order_type,
        side: row.side,
        average_price: lenient_f64(&row.average_price),
        qty: lenient_f64(&row.qty),
        state: row.state,
        fees: lenient_f64(&row.fees),
    })
}

/// Parse a broker numeric cell; empty, `null` or garbage become `0.0`.
pub fn lenient_f64(value: &str) -> f64 {
    let v = value.trim().trim_start_matches('$').replace(',', "");
    if v.is_empty() || v.eq_ignore_ascii_case("null") {
        return 0.0;
    }
    v.parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0)
}

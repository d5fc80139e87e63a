//! Shared fixtures for the integration tests.
//!
//! `setup_sample_book()` builds a [`Stockbook`] over a temporary DuckDB file,
//! loads a small broker export through the CSV importer and plugs in a
//! [`ScriptedProvider`] so nothing touches the network.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stockbook::{
    ImportMode, PriceHistory, PricePoint, PriceProvider, Quote, Result, SplitEvent, Stockbook,
    StockbookError,
};
use tempfile::NamedTempFile;

pub const SAMPLE_CSV: &str = "\
Date,Time,Symbol,Name,Type,Side,AveragePrice,Qty,State,Fees
08/03/2020,09:35,AAPL,Apple Inc,Market,Buy,400.00,5,Filled,0
01/04/2021,10:02,AAPL,Apple Inc,Limit,Sell,130.00,8,Filled,1.00
07/03/2023,11:15,AAPL,Apple Inc,Market,Buy,190.00,4,Filled,
01/03/2023,09:45,MSFT,Microsoft Corp,Market,Buy,240.00,10,Filled,0
07/03/2023,13:20,MSFT,Microsoft Corp,Limit,sell,330.00,4,Filled,0
02/01/2023,10:00,MSFT,Microsoft Corp,Limit,Buy,250.00,100,Cancelled,0
03/15/2022,14:00,TSLA,Tesla Inc,Market,Buy,800.00,1,Filled,null
13/45/2022,10:00,BAD,Bad Row,Market,Buy,1,1,Filled,0
";

/// Rows in [`SAMPLE_CSV`] that import cleanly.
pub const SAMPLE_ROWS: usize = 7;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The date every fixture-based test treats as "today".
pub fn today() -> NaiveDate {
    day(2024, 1, 2)
}

pub fn write_csv(contents: &str) -> NamedTempFile {
    let mut f = NamedTempFile::with_suffix(".csv").unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.flush().unwrap();
    f
}

// ---------------------------------------------------------------------------
// ScriptedProvider
// ---------------------------------------------------------------------------

/// In-memory provider serving canned series. Unknown symbols fail.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    histories: HashMap<String, PriceHistory>,
    quotes: HashMap<String, Quote>,
    sectors: HashMap<String, String>,
    history_calls: Arc<AtomicUsize>,
    quote_calls: Arc<AtomicUsize>,
    sector_calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// AAPL with its 2020 4-for-1 split and MSFT without splits. Only AAPL
    /// has a known sector.
    pub fn sample() -> Self {
        let mut p = Self::default();
        p.histories.insert(
            "AAPL".to_string(),
            PriceHistory {
                symbol: "AAPL".to_string(),
                points: vec![
                    PricePoint::new("2020-08-03", 100.0),
                    PricePoint::new("2020-08-28", 125.0),
                    PricePoint::new("2020-08-31", 129.0),
                    PricePoint::new("2021-01-04", 130.0),
                    PricePoint::new("2023-07-03", 190.0),
                ],
                splits: vec![SplitEvent::new("2020-08-31", 4.0)],
            },
        );
        p.histories.insert(
            "MSFT".to_string(),
            PriceHistory {
                symbol: "MSFT".to_string(),
                points: vec![
                    PricePoint::new("2023-01-03", 240.0),
                    PricePoint::new("2023-07-03", 330.0),
                ],
                splits: Vec::new(),
            },
        );
        p.quotes.insert(
            "AAPL".to_string(),
            Quote::new("AAPL", Some(190.0), Some(180.0)),
        );
        p.quotes.insert(
            "MSFT".to_string(),
            Quote::new("MSFT", Some(330.0), Some(320.0)),
        );
        p.sectors.insert("AAPL".to_string(), "Technology".to_string());
        p
    }

    /// Shared counters of `(history, quote)` calls; they survive boxing.
    pub fn counters(&self) -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        (self.history_calls.clone(), self.quote_calls.clone())
    }

    pub fn sector_calls(&self) -> Arc<AtomicUsize> {
        self.sector_calls.clone()
    }
}

impl PriceProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn history(&self, symbol: &str, start: Option<NaiveDate>) -> Result<PriceHistory> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let full = self
            .histories
            .get(&symbol.to_uppercase())
            .ok_or_else(|| StockbookError::Provider(format!("No data found for {}", symbol)))?;

        let since = start.map(|d| d.format("%Y-%m-%d").to_string());
        let in_window = |date: &str| since.as_deref().map_or(true, |s| date >= s);
        Ok(PriceHistory {
            symbol: full.symbol.clone(),
            points: full
                .points
                .iter()
                .filter(|p| in_window(&p.date))
                .cloned()
                .collect(),
            splits: full
                .splits
                .iter()
                .filter(|s| in_window(&s.date))
                .cloned()
                .collect(),
        })
    }

    fn quote(&self, symbol: &str) -> Result<Quote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .get(&symbol.to_uppercase())
            .cloned()
            .ok_or_else(|| StockbookError::Provider(format!("No quote for {}", symbol)))
    }

    fn sector(&self, symbol: &str) -> Result<Option<String>> {
        self.sector_calls.fetch_add(1, Ordering::SeqCst);
        if symbol.eq_ignore_ascii_case("TSLA") {
            return Err(StockbookError::Provider("search unavailable".to_string()));
        }
        Ok(self.sectors.get(&symbol.to_uppercase()).cloned())
    }
}

// ---------------------------------------------------------------------------
// Stockbook fixtures
// ---------------------------------------------------------------------------

/// A book over a temp DuckDB file with [`SAMPLE_CSV`] imported.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn setup_sample_book() -> (Stockbook, tempfile::TempDir) {
    setup_with_provider(ScriptedProvider::sample())
}

pub fn setup_with_provider(provider: ScriptedProvider) -> (Stockbook, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let book = Stockbook::builder()
        .database_path(tmp_dir.path().join("book.duckdb"))
        .provider(Box::new(provider))
        .build()
        .unwrap();

    let csv = write_csv(SAMPLE_CSV);
    let summary = book.import_csv(csv.path(), ImportMode::Replace).unwrap();
    assert_eq!(summary.imported, SAMPLE_ROWS);

    (book, tmp_dir)
}

/// An offline in-memory book with [`SAMPLE_CSV`] imported.
pub fn setup_offline_book() -> Stockbook {
    let book = Stockbook::builder()
        .in_memory(true)
        .offline(true)
        .build()
        .unwrap();
    let csv = write_csv(SAMPLE_CSV);
    book.import_csv(csv.path(), ImportMode::Replace).unwrap();
    book
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

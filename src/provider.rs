//! Price-history providers.
//!
//! [`PriceProvider`] is the seam between the ledger and an external market
//! data source. [`YahooProvider`] implements it over the public v8 chart
//! endpoint, which returns daily closes that are already split-adjusted
//! together with the split events used for the adjustment. Sectors come from
//! the v1 search endpoint.

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config;
use crate::error::{Result, StockbookError};
use crate::models::{PriceHistory, PricePoint, Quote, SplitEvent};

/// A source of daily closes, split events and latest quotes.
pub trait PriceProvider {
    /// Short identifier used in log messages.
    fn name(&self) -> &str {
        "custom"
    }

    /// Daily split-adjusted closes from `start` (inclusive) to today, plus split events.
    ///
    /// `None` requests the full available history.
    fn history(&self, symbol: &str, start: Option<NaiveDate>) -> Result<PriceHistory>;

    /// Latest price and previous close.
    fn quote(&self, symbol: &str) -> Result<Quote>;

    /// Industry sector of the company, if the source knows it.
    fn sector(&self, _symbol: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// YahooProvider
// ---------------------------------------------------------------------------

pub struct YahooProvider {
    client: Client,
    base_url: String,
    search_url: String,
}

impl YahooProvider {
    /// Create a provider whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(config::USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            base_url: config::CHART_BASE.to_string(),
            search_url: config::SEARCH_URL.to_string(),
        })
    }

    /// Point the provider at a different chart endpoint (a proxy or a mirror).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_search_url(mut self, search_url: &str) -> Self {
        self.search_url = search_url.trim_end_matches('/').to_string();
        self
    }

    fn fetch_chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<Value> {
        validate_symbol(symbol)?;
        let url = format!("{}/{}", self.base_url, symbol);
        log::debug!("Fetching {} chart for {} {:?}", self.name(), symbol, query);

        let resp = self.client.get(&url).query(query).send()?;
        let status = resp.status();

        let data: Value = match resp.json() {
            Ok(v) => v,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(StockbookError::Provider(format!(
                    "HTTP {} for {}",
                    status, symbol
                )))
            }
        };

        check_chart_error(symbol, &data)?;

        if !status.is_success() {
            return Err(StockbookError::Provider(format!(
                "HTTP {} for {}",
                status, symbol
            )));
        }

        Ok(data)
    }
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn history(&self, symbol: &str, start: Option<NaiveDate>) -> Result<PriceHistory> {
        let query = history_query(start, Utc::now());
        let data = self.fetch_chart(symbol, &query)?;
        let history = parse_history(symbol, &data)?;

        if !history.splits.is_empty() {
            log::info!("Found {} split events for {}", history.splits.len(), symbol);
        }

        Ok(history)
    }

    fn quote(&self, symbol: &str) -> Result<Quote> {
        let query = [
            ("interval", "1d".to_string()),
            ("range", "1d".to_string()),
        ];
        let data = self.fetch_chart(symbol, &query)?;
        parse_quote(symbol, &data)
    }

    fn sector(&self, symbol: &str) -> Result<Option<String>> {
        validate_symbol(symbol)?;
        let query = [
            ("q", symbol.to_string()),
            ("quotesCount", "5".to_string()),
            ("newsCount", "0".to_string()),
        ];
        log::debug!("Yahoo search for sector of {}", symbol);

        let resp = self.client.get(&self.search_url).query(&query).send()?;
        if !resp.status().is_success() {
            return Err(StockbookError::Provider(format!(
                "HTTP {} searching for {}",
                resp.status(),
                symbol
            )));
        }
        let data: Value = resp.json()?;
        parse_sector(symbol, data)
    }
}

/// Query parameters for a daily history request starting at `start`.
pub fn history_query(
    start: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("interval", "1d".to_string()),
        ("events", "history,splits".to_string()),
    ];
    match start.and_then(|d| d.and_hms_opt(0, 0, 0)) {
        Some(dt) => {
            query.push(("period1", dt.and_utc().timestamp().to_string()));
            query.push(("period2", now.timestamp().to_string()));
        }
        None => query.push(("range", "max".to_string())),
    }
    query
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parse a v8 chart response into a [`PriceHistory`].
///
/// Null closes (halted days, partial rows) are skipped. Split events are
/// returned sorted by date.
pub fn parse_history(symbol: &str, data: &Value) -> Result<PriceHistory> {
    check_chart_error(symbol, data)?;
    let result = chart_result(symbol, data)?;
    let offset = gmt_offset(result);

    let timestamps = result
        .get("timestamp")
        .and_then(|t| t.as_array())
        .cloned()
        .unwrap_or_default();
    let closes = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.get(0))
        .and_then(|q| q.get("close"))
        .and_then(|c| c.as_array())
        .cloned()
        .unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let (Some(ts), Some(close)) = (ts.as_i64(), close.as_f64()) else {
            continue;
        };
        if let Some(date) = timestamp_to_date(ts, offset) {
            points.push(PricePoint { date, close });
        }
    }

    let mut splits = Vec::new();
    if let Some(events) = result
        .get("events")
        .and_then(|e| e.get("splits"))
        .and_then(|s| s.as_object())
    {
        for split in events.values() {
            let Some(ts) = split.get("date").and_then(|d| d.as_i64()) else {
                continue;
            };
            let Some(date) = timestamp_to_date(ts, offset) else {
                continue;
            };
            let numerator = split.get("numerator").and_then(|n| n.as_f64()).unwrap_or(1.0);
            let denominator = split.get("denominator").and_then(|d| d.as_f64()).unwrap_or(1.0);
            match SplitEvent::from_fraction(&date, numerator, denominator) {
                Some(event) => splits.push(event),
                None => log::warn!("Skipping invalid split for {} on {}", symbol, date),
            }
        }
    }
    splits.sort_by(|a, b| a.date.cmp(&b.date));

    Ok(PriceHistory {
        symbol: symbol.to_string(),
        points,
        splits,
    })
}

/// Parse the `meta` block of a v8 chart response into a [`Quote`].
pub fn parse_quote(symbol: &str, data: &Value) -> Result<Quote> {
    check_chart_error(symbol, data)?;
    let result = chart_result(symbol, data)?;
    let meta = result
        .get("meta")
        .ok_or_else(|| StockbookError::Provider(format!("Missing meta for {}", symbol)))?;

    let current = meta.get("regularMarketPrice").and_then(|p| p.as_f64());
    let previous = meta
        .get("previousClose")
        .and_then(|p| p.as_f64())
        .or_else(|| meta.get("chartPreviousClose").and_then(|p| p.as_f64()));

    Ok(Quote::new(symbol, current, previous))
}

fn check_chart_error(symbol: &str, data: &Value) -> Result<()> {
    if let Some(error) = data
        .get("chart")
        .and_then(|c| c.get("error"))
        .and_then(|e| e.as_object())
    {
        let code = error.get("code").and_then(|c| c.as_str()).unwrap_or("unknown");
        let desc = error
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("no description");
        return Err(StockbookError::Provider(format!(
            "{}: {} - {}",
            symbol, code, desc
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    quotes: Option<Vec<SearchQuote>>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: String,
    sector: Option<String>,
}

/// Pick the sector of the search hit whose symbol matches exactly.
pub fn parse_sector(symbol: &str, data: Value) -> Result<Option<String>> {
    let response: SearchResponse = serde_json::from_value(data)?;
    Ok(response
        .quotes
        .unwrap_or_default()
        .into_iter()
        .find(|q| q.symbol.eq_ignore_ascii_case(symbol))
        .and_then(|q| q.sector)
        .filter(|s| !s.trim().is_empty()))
}

fn chart_result<'a>(symbol: &str, data: &'a Value) -> Result<&'a Value> {
    data.get("chart")
        .and_then(|c| c.get("result"))
        .and_then(|r| r.get(0))
        .ok_or_else(|| StockbookError::Provider(format!("Empty chart response for {}", symbol)))
}

/// Exchange offset from UTC in seconds, so timestamps map to the exchange's trading day.
fn gmt_offset(result: &Value) -> i64 {
    result
        .get("meta")
        .and_then(|m| m.get("gmtoffset"))
        .and_then(|o| o.as_i64())
        .unwrap_or(0)
}

fn timestamp_to_date(ts: i64, offset: i64) -> Option<String> {
    DateTime::from_timestamp(ts.checked_add(offset)?, 0)
        .map(|dt| dt.date_naive().format(config::DATE_FORMAT).to_string())
}

fn validate_symbol(symbol: &str) -> Result<()> {
    let ok = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=' | '_'));
    if ok {
        Ok(())
    } else {
        Err(StockbookError::InvalidArgument(format!(
            "Invalid ticker symbol: {:?}",
            symbol
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_symbol_rejects_path_characters() {
        assert!(validate_symbol("AAPL").is_ok());
        assert!(validate_symbol("BRK-B").is_ok());
        assert!(validate_symbol("^GSPC").is_ok());
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("AAPL/../x").is_err());
        assert!(validate_symbol("A B").is_err());
    }

    #[test]
    fn timestamp_respects_exchange_offset() {
        // 2020-08-31 03:00 UTC is still 2020-08-30 in New York
        let ts = 1_598_842_800;
        assert_eq!(timestamp_to_date(ts, 0).unwrap(), "2020-08-31");
        assert_eq!(timestamp_to_date(ts, -14_400).unwrap(), "2020-08-30");
    }

    #[test]
    fn timestamp_overflow_is_skipped() {
        assert_eq!(timestamp_to_date(i64::MAX, 3_600), None);
        assert_eq!(timestamp_to_date(i64::MIN, -3_600), None);
    }

    #[test]
    fn history_query_requests_split_events() {
        let now = DateTime::from_timestamp(1_704_153_600, 0).unwrap();

        let full = history_query(None, now);
        assert!(full.contains(&("events", "history,splits".to_string())));
        assert!(full.contains(&("range", "max".to_string())));

        let windowed = history_query(NaiveDate::from_ymd_opt(2023, 1, 1), now);
        assert!(windowed.contains(&("events", "history,splits".to_string())));
        assert!(windowed.contains(&("period1", "1672531200".to_string())));
        assert!(windowed.contains(&("period2", "1704153600".to_string())));
        assert!(!windowed.iter().any(|(k, _)| *k == "range"));
    }
}

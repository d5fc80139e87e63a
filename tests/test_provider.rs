//! Chart-response parsing tests for the Yahoo provider.

use serde_json::json;
use std::time::Duration;

use stockbook::provider::{parse_history, parse_quote, parse_sector};
use stockbook::{PriceProvider, SplitEvent, StockbookError, YahooProvider};

// 2020-08-28, 2020-08-31 and 2022-07-18, 13:30 UTC (09:30 New York)
const AUG_28_2020: i64 = 1_598_621_400;
const AUG_31_2020: i64 = 1_598_880_600;
const JUL_18_2022: i64 = 1_658_151_000;

fn chart(result: serde_json::Value) -> serde_json::Value {
    json!({ "chart": { "result": [result], "error": null } })
}

// ---------------------------------------------------------------------------
// parse_history
// ---------------------------------------------------------------------------

#[test]
fn history_dates_use_exchange_offset() {
    let data = chart(json!({
        "meta": { "symbol": "AAPL", "gmtoffset": -14400 },
        "timestamp": [AUG_28_2020, AUG_31_2020],
        "indicators": { "quote": [{ "close": [124.8075, 129.04] }] }
    }));

    let history = parse_history("AAPL", &data).unwrap();
    assert_eq!(history.symbol, "AAPL");
    assert_eq!(history.points.len(), 2);
    assert_eq!(history.points[0].date, "2020-08-28");
    assert_eq!(history.points[1].date, "2020-08-31");
    assert_eq!(history.points[1].close, 129.04);
}

#[test]
fn history_skips_null_closes() {
    let data = chart(json!({
        "meta": { "gmtoffset": -14400 },
        "timestamp": [AUG_28_2020, AUG_31_2020],
        "indicators": { "quote": [{ "close": [null, 129.04] }] }
    }));

    let history = parse_history("AAPL", &data).unwrap();
    assert_eq!(history.points.len(), 1);
    assert_eq!(history.points[0].date, "2020-08-31");
}

#[test]
fn history_splits_are_sorted_ratios() {
    let data = chart(json!({
        "meta": { "gmtoffset": -14400 },
        "timestamp": [],
        "indicators": { "quote": [{ "close": [] }] },
        "events": {
            "splits": {
                "1658151000": { "date": JUL_18_2022, "numerator": 20, "denominator": 1, "splitRatio": "20:1" },
                "1598880600": { "date": AUG_31_2020, "numerator": 4, "denominator": 1, "splitRatio": "4:1" }
            }
        }
    }));

    let history = parse_history("GOOGL", &data).unwrap();
    assert!(history.is_empty());
    assert_eq!(
        history.splits,
        vec![
            SplitEvent::new("2020-08-31", 4.0),
            SplitEvent::new("2022-07-18", 20.0),
        ]
    );
}

#[test]
fn history_reverse_split_and_invalid_split() {
    let data = chart(json!({
        "timestamp": [],
        "indicators": { "quote": [{ "close": [] }] },
        "events": {
            "splits": {
                "a": { "date": AUG_31_2020, "numerator": 1, "denominator": 10 },
                "b": { "date": JUL_18_2022, "numerator": 0, "denominator": 1 }
            }
        }
    }));

    let history = parse_history("GE", &data).unwrap();
    assert_eq!(history.splits, vec![SplitEvent::new("2020-08-31", 0.1)]);
}

#[test]
fn history_chart_error_is_provider_error() {
    let data = json!({
        "chart": {
            "result": null,
            "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
        }
    });

    let err = parse_history("ZZZZ", &data).unwrap_err();
    match err {
        StockbookError::Provider(msg) => {
            assert!(msg.contains("ZZZZ"));
            assert!(msg.contains("Not Found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn history_empty_result_is_error() {
    let data = json!({ "chart": { "result": [], "error": null } });
    assert!(parse_history("AAPL", &data).is_err());
}

// ---------------------------------------------------------------------------
// parse_quote
// ---------------------------------------------------------------------------

#[test]
fn quote_prefers_previous_close() {
    let data = chart(json!({
        "meta": {
            "regularMarketPrice": 190.0,
            "previousClose": 180.0,
            "chartPreviousClose": 170.0
        }
    }));

    let quote = parse_quote("AAPL", &data).unwrap();
    assert_eq!(quote.current_price, Some(190.0));
    assert_eq!(quote.previous_close, Some(180.0));
    assert_eq!(quote.change, Some(10.0));
    assert_eq!(quote.error, None);
}

#[test]
fn quote_falls_back_to_chart_previous_close() {
    let data = chart(json!({
        "meta": { "regularMarketPrice": 50.0, "chartPreviousClose": 40.0 }
    }));

    let quote = parse_quote("F", &data).unwrap();
    assert_eq!(quote.previous_close, Some(40.0));
    assert_eq!(quote.change_percent, Some(25.0));
}

#[test]
fn quote_without_previous_close_has_no_change() {
    let data = chart(json!({ "meta": { "regularMarketPrice": 50.0 } }));

    let quote = parse_quote("F", &data).unwrap();
    assert_eq!(quote.current_price, Some(50.0));
    assert_eq!(quote.change, None);
    assert_eq!(quote.change_percent, None);
}

// ---------------------------------------------------------------------------
// parse_sector
// ---------------------------------------------------------------------------

#[test]
fn sector_comes_from_exact_symbol_match() {
    let data = json!({
        "quotes": [
            { "symbol": "AAPL.MX", "sector": "Consumer Cyclical" },
            { "symbol": "AAPL", "shortname": "Apple Inc.", "sector": "Technology" }
        ]
    });

    let sector = parse_sector("aapl", data).unwrap();
    assert_eq!(sector.as_deref(), Some("Technology"));
}

#[test]
fn sector_missing_or_blank_is_none() {
    let blank = json!({ "quotes": [{ "symbol": "SPY", "sector": " " }] });
    assert_eq!(parse_sector("SPY", blank).unwrap(), None);

    let no_quotes = json!({ "news": [] });
    assert_eq!(parse_sector("SPY", no_quotes).unwrap(), None);

    let malformed = json!({ "quotes": "nope" });
    assert!(parse_sector("SPY", malformed).is_err());
}

// ---------------------------------------------------------------------------
// YahooProvider
// ---------------------------------------------------------------------------

#[test]
fn invalid_symbol_is_rejected_before_any_request() {
    let provider = YahooProvider::new(Duration::from_secs(1))
        .unwrap()
        .with_base_url("http://127.0.0.1:9/");

    let err = provider.history("AAPL/../x", None).unwrap_err();
    assert!(matches!(err, StockbookError::InvalidArgument(_)));
    let err = provider.sector("A B").unwrap_err();
    assert!(matches!(err, StockbookError::InvalidArgument(_)));
    assert_eq!(provider.name(), "yahoo");
}

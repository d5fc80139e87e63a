//! Async wrapper tests. Run with `--features async`.

#![cfg(feature = "async")]

mod common;

use std::time::Duration;

use chrono::NaiveDate;
use stockbook::{
    AsyncStockbook, ChartMode, ChartRange, PriceHistory, PriceProvider, Quote, Result,
    StockbookError,
};

/// A provider that takes longer than any caller is willing to wait.
struct SlowProvider;

impl PriceProvider for SlowProvider {
    fn history(&self, symbol: &str, _start: Option<NaiveDate>) -> Result<PriceHistory> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(PriceHistory::empty(symbol))
    }

    fn quote(&self, symbol: &str) -> Result<Quote> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(Quote::new(symbol, Some(1.0), Some(1.0)))
    }
}

#[tokio::test]
async fn run_executes_on_blocking_pool() {
    let book = AsyncStockbook::builder()
        .in_memory(true)
        .provider(Box::new(common::ScriptedProvider::sample()))
        .build()
        .await
        .unwrap();

    let count = book.run(|b| b.transactions().count()).await.unwrap();
    assert_eq!(count, 0);

    let quote = book.run(|b| Ok(b.quotes().get("AAPL"))).await.unwrap();
    assert_eq!(quote.current_price, Some(190.0));
}

#[tokio::test]
async fn run_with_timeout_returns_result_in_time() {
    let book = AsyncStockbook::builder()
        .in_memory(true)
        .provider(Box::new(common::ScriptedProvider::sample()))
        .build()
        .await
        .unwrap();

    let chart = book
        .run_with_timeout(Duration::from_secs(5), |b| {
            b.charts()
                .chart_as_of("MSFT", ChartRange::Max, ChartMode::Nominal, common::today())
        })
        .await
        .unwrap();
    assert_eq!(chart.prices, vec![240.0, 330.0]);
}

#[tokio::test]
async fn run_with_timeout_gives_up_on_slow_provider() {
    let book = AsyncStockbook::builder()
        .in_memory(true)
        .provider(Box::new(SlowProvider))
        .build()
        .await
        .unwrap();

    let err = book
        .run_with_timeout(Duration::from_millis(50), |b| Ok(b.quotes().get("AAPL")))
        .await
        .unwrap_err();
    assert!(matches!(err, StockbookError::Timeout(_)));
}

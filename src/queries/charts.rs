//! Price charts with trade markers.

use chrono::{Local, NaiveDate};

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::market::MarketData;
use crate::models::{
    ChartData, ChartMode, ChartPoint, ChartSplit, PricePoint, SplitEvent, Transaction,
};
use crate::queries::transactions::TransactionQuery;
use crate::range::ChartRange;
use crate::splits::{parse_date, SplitSchedule};

// ---------------------------------------------------------------------------
// ChartQuery
// ---------------------------------------------------------------------------

/// Builds [`ChartData`] from the provider series and the stored trades.
///
/// Price series come through the market-data cache; trades are always read
/// fresh from the store.
pub struct ChartQuery<'a> {
    conn: &'a Connection,
    market: &'a MarketData,
}

impl<'a> ChartQuery<'a> {
    pub fn new(conn: &'a Connection, market: &'a MarketData) -> Self {
        Self { conn, market }
    }

    /// Chart for `symbol` over `range` as of today's local date.
    pub fn chart(&self, symbol: &str, range: ChartRange, mode: ChartMode) -> Result<ChartData> {
        self.chart_as_of(symbol, range, mode, Local::now().date_naive())
    }

    /// Chart for `symbol` over `range`, treating `today` as the current date.
    ///
    /// A provider failure yields an empty price series with `error` set;
    /// store failures are returned as errors.
    pub fn chart_as_of(
        &self,
        symbol: &str,
        range: ChartRange,
        mode: ChartMode,
        today: NaiveDate,
    ) -> Result<ChartData> {
        let since = range
            .start_date(today)
            .map(|d| d.format(config::DATE_FORMAT).to_string());
        let transactions =
            TransactionQuery::new(self.conn).for_symbol_since(symbol, since.as_deref())?;
        log::debug!(
            "Found {} transactions for {} since {:?}",
            transactions.len(),
            symbol,
            since
        );

        let lookup = self.market.history(symbol, range, today);
        let history = lookup.history;

        // Every split after a trade inside the window is one of the window's own events
        let schedule = SplitSchedule::new(&history.splits);
        let points = match mode {
            ChartMode::Nominal => schedule.unadjust(&history.points),
            ChartMode::Adjusted => history.points,
        };

        let (buys, sells) = trade_markers(&transactions, mode, &schedule);
        log::debug!(
            "Charted {} buy and {} sell transactions for {}",
            buys.len(),
            sells.len(),
            symbol
        );

        let splits = split_markers(&history.splits, &points);
        let (dates, prices): (Vec<String>, Vec<f64>) =
            points.into_iter().map(|p| (p.date, p.close)).unzip();

        Ok(ChartData {
            symbol: symbol.to_string(),
            range: range.as_str().to_string(),
            mode,
            dates,
            prices,
            buy_transactions: buys,
            sell_transactions: sells,
            splits,
            error: lookup.error,
        })
    }
}

/// Attach to each split the plotted close of its effective date, or of the
/// first trading day after it.
fn split_markers(splits: &[SplitEvent], points: &[PricePoint]) -> Vec<ChartSplit> {
    splits
        .iter()
        .map(|split| {
            let price = parse_date(&split.date).and_then(|date| {
                points
                    .iter()
                    .find(|p| parse_date(&p.date).is_some_and(|d| d >= date))
                    .map(|p| p.close)
            });
            ChartSplit {
                date: split.date.clone(),
                ratio: split.ratio,
                price,
            }
        })
        .collect()
}

/// Split trades into buy and sell markers. Zero-priced rows are skipped and
/// any side other than buy is drawn as a sell.
fn trade_markers(
    transactions: &[Transaction],
    mode: ChartMode,
    schedule: &SplitSchedule,
) -> (Vec<ChartPoint>, Vec<ChartPoint>) {
    let mut buys = Vec::new();
    let mut sells = Vec::new();

    for tx in transactions {
        if tx.average_price == 0.0 {
            continue;
        }
        let (price, qty) = match mode {
            ChartMode::Nominal => (tx.average_price, tx.qty),
            ChartMode::Adjusted => {
                let restated = schedule.restate(tx.average_price, tx.qty, &tx.date);
                (restated.price, restated.qty)
            }
        };
        let point = ChartPoint {
            id: tx.id,
            date: tx.date.clone(),
            time: tx.time.clone(),
            price,
            qty,
        };
        if tx.is_buy() {
            buys.push(point);
        } else {
            sells.push(point);
        }
    }

    (buys, sells)
}

//! Open positions, concentration and ESG summaries.
//!
//! Positions use the average-cost method. Share counts are restated in
//! today's shares by multiplying each trade's quantity by the ratios of the
//! splits that happened after it, so pre-split buys and post-split sells
//! net out correctly. Cost basis is unaffected by splits.

use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use crate::config;
use crate::connection::Connection;
use crate::error::Result;
use crate::esg;
use crate::market::MarketData;
use crate::models::{EsgSummary, PortfolioSummary, Position, Side, Transaction};
use crate::queries::transactions::TransactionQuery;
use crate::splits::SplitSchedule;

/// Positions at or below this share count are treated as closed.
const DUST: f64 = 1e-9;

pub struct PortfolioQuery<'a> {
    conn: &'a Connection,
    market: &'a MarketData,
}

#[derive(Default)]
struct Lot {
    name: String,
    shares: f64,
    cost: f64,
}

impl<'a> PortfolioQuery<'a> {
    pub fn new(conn: &'a Connection, market: &'a MarketData) -> Self {
        Self { conn, market }
    }

    /// Open positions as of today, ordered by symbol. Prices are left unset.
    pub fn positions(&self) -> Result<Vec<Position>> {
        self.positions_as_of(Local::now().date_naive())
    }

    pub fn positions_as_of(&self, today: NaiveDate) -> Result<Vec<Position>> {
        let transactions = TransactionQuery::new(self.conn).all()?;
        Ok(self.fold_with_splits(&transactions, today))
    }

    fn fold_with_splits(&self, transactions: &[Transaction], today: NaiveDate) -> Vec<Position> {
        let mut schedules: HashMap<String, SplitSchedule> = HashMap::new();
        for tx in transactions {
            if !schedules.contains_key(&tx.symbol) {
                let splits = self.market.splits(&tx.symbol, today);
                schedules.insert(tx.symbol.clone(), SplitSchedule::new(&splits));
            }
        }
        fold_positions(transactions, &schedules)
    }

    /// Positions valued at the latest quotes, with weights and concentration.
    pub fn summary(&self) -> Result<PortfolioSummary> {
        self.summary_as_of(Local::now().date_naive())
    }

    pub fn summary_as_of(&self, today: NaiveDate) -> Result<PortfolioSummary> {
        let mut positions = self.positions_as_of(today)?;
        let mut unpriced = Vec::new();

        for pos in positions.iter_mut() {
            let quote = self.market.quote(&pos.symbol);
            match quote.current_price.filter(|p| *p > 0.0) {
                Some(price) => {
                    let value = pos.shares * price;
                    pos.last_price = Some(price);
                    pos.market_value = Some(value);
                    pos.unrealized_gain = Some(value - pos.cost_basis);
                }
                None => unpriced.push(pos.symbol.clone()),
            }
        }

        Ok(summarize(positions, unpriced))
    }

    /// Value-weighted ESG profile of the priced open positions.
    pub fn esg_summary(&self) -> Result<EsgSummary> {
        self.esg_summary_as_of(Local::now().date_naive())
    }

    /// Positions without a quote are counted against coverage and left out
    /// of the weighted scores. A failed sector lookup scores against the
    /// default baseline.
    pub fn esg_summary_as_of(&self, today: NaiveDate) -> Result<EsgSummary> {
        let transactions = TransactionQuery::new(self.conn).all()?;
        let positions = self.fold_with_splits(&transactions, today);

        let mut holdings = Vec::new();
        let mut unscored = Vec::new();
        for pos in &positions {
            let quote = self.market.quote(&pos.symbol);
            let Some(price) = quote.current_price.filter(|p| *p > 0.0) else {
                unscored.push(pos.symbol.clone());
                continue;
            };
            let sector = self.market.sector(&pos.symbol);
            let history: Vec<&Transaction> = transactions
                .iter()
                .filter(|t| t.symbol == pos.symbol && is_active(t))
                .collect();
            holdings.push(esg::score_holding(pos, &sector, price, &history));
        }
        log::debug!(
            "Scored {} of {} open positions for ESG",
            holdings.len(),
            positions.len()
        );

        Ok(esg::summarize(holdings, unscored, positions.len()))
    }
}

fn is_active(tx: &Transaction) -> bool {
    let state = tx.state.trim().to_ascii_lowercase();
    !config::INACTIVE_STATES.contains(&state.as_str())
}

fn fold_positions(
    transactions: &[Transaction],
    schedules: &HashMap<String, SplitSchedule>,
) -> Vec<Position> {
    let mut lots: BTreeMap<String, Lot> = BTreeMap::new();

    for tx in transactions {
        if !is_active(tx) || tx.qty <= 0.0 {
            continue;
        }
        let Some(side) = tx.side_kind() else {
            log::debug!("Ignoring transaction {} with side {:?}", tx.id, tx.side);
            continue;
        };

        let ratio = schedules
            .get(&tx.symbol)
            .map(|s| s.ratio_after(&tx.date))
            .unwrap_or(1.0);
        let shares = tx.qty * ratio;

        let lot = lots.entry(tx.symbol.clone()).or_default();
        if !tx.name.is_empty() {
            lot.name = tx.name.clone();
        }

        match side {
            Side::Buy => {
                lot.shares += shares;
                lot.cost += tx.average_price * tx.qty + tx.fees;
            }
            Side::Sell => {
                if lot.shares <= DUST {
                    log::warn!("Sell of {} {} without an open position", tx.qty, tx.symbol);
                    continue;
                }
                let sold = shares.min(lot.shares);
                let average = lot.cost / lot.shares;
                lot.cost -= average * sold;
                lot.shares -= sold;
            }
        }
    }

    lots.into_iter()
        .filter(|(_, lot)| lot.shares > DUST)
        .map(|(symbol, lot)| Position {
            symbol,
            name: lot.name,
            shares: lot.shares,
            cost_basis: lot.cost,
            average_cost: lot.cost / lot.shares,
            last_price: None,
            market_value: None,
            weight: None,
            unrealized_gain: None,
        })
        .collect()
}

fn summarize(mut positions: Vec<Position>, unpriced: Vec<String>) -> PortfolioSummary {
    let total_cost: f64 = positions.iter().map(|p| p.cost_basis).sum();
    let total_value: f64 = positions.iter().filter_map(|p| p.market_value).sum();

    let mut largest: Option<(String, f64)> = None;
    let mut concentration = None;

    if total_value > 0.0 {
        let mut hhi = 0.0;
        for pos in positions.iter_mut() {
            let Some(value) = pos.market_value else {
                continue;
            };
            let weight = value / total_value;
            pos.weight = Some(weight);
            hhi += weight * weight;
            if largest.as_ref().map_or(true, |(_, w)| weight > *w) {
                largest = Some((pos.symbol.clone(), weight));
            }
        }
        concentration = Some(hhi);
    }

    let (largest_symbol, largest_weight) = match largest {
        Some((symbol, weight)) => (Some(symbol), Some(weight)),
        None => (None, None),
    };

    PortfolioSummary {
        positions,
        total_cost,
        total_value,
        largest_symbol,
        largest_weight,
        concentration,
        unpriced,
    }
}

//! Latest-quote lookups through the market-data cache.

use crate::market::MarketData;
use crate::models::Quote;

pub struct QuoteQuery<'a> {
    market: &'a MarketData,
}

impl<'a> QuoteQuery<'a> {
    pub fn new(market: &'a MarketData) -> Self {
        Self { market }
    }

    /// Latest quote for `symbol`. Never fails: provider errors are reported in `Quote::error`.
    pub fn get(&self, symbol: &str) -> Quote {
        self.market.quote(symbol)
    }

    /// Quotes for several symbols, in the order given.
    pub fn get_many(&self, symbols: &[&str]) -> Vec<Quote> {
        symbols.iter().map(|s| self.market.quote(s)).collect()
    }
}

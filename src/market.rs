//! Cached, failure-tolerant access to a [`PriceProvider`].
//!
//! Provider errors never propagate past this layer: they are logged and
//! replaced with an empty series or an error-carrying quote, so callers can
//! always render something. Only successful responses are cached.

use chrono::NaiveDate;
use std::cell::RefCell;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::config;
use crate::models::{PriceHistory, Quote, SplitEvent};
use crate::provider::PriceProvider;
use crate::range::ChartRange;

/// A price history lookup result; `error` is set when the provider failed.
#[derive(Debug, Clone, Default)]
pub struct HistoryLookup {
    pub history: PriceHistory,
    pub error: Option<String>,
}

/// Owns the price provider and the history, quote and sector caches.
pub struct MarketData {
    provider: Option<Box<dyn PriceProvider + Send>>,
    histories: RefCell<TtlCache<String, PriceHistory>>,
    quotes: RefCell<TtlCache<String, Quote>>,
    sectors: RefCell<TtlCache<String, String>>,
}

impl MarketData {
    pub fn new(
        provider: Option<Box<dyn PriceProvider + Send>>,
        ttl: Duration,
        capacity: usize,
    ) -> Self {
        Self {
            provider,
            histories: RefCell::new(TtlCache::new(ttl, capacity)),
            quotes: RefCell::new(TtlCache::new(ttl, capacity)),
            sectors: RefCell::new(TtlCache::new(ttl, capacity)),
        }
    }

    /// Whether a provider is configured (`false` in offline mode).
    pub fn is_online(&self) -> bool {
        self.provider.is_some()
    }

    /// Price history for `symbol` over `range`, cached under
    /// `"SYMBOL:range:start"` so windows ending on different days never collide.
    pub fn history(&self, symbol: &str, range: ChartRange, today: NaiveDate) -> HistoryLookup {
        let start = range.start_date(today);
        let key = format!(
            "{}:{}:{}",
            symbol.to_uppercase(),
            range.as_str(),
            start.map_or_else(|| "all".to_string(), |d| d.to_string())
        );
        if let Some(history) = self.histories.borrow_mut().get(&key) {
            log::debug!("Price history cache hit for {}", key);
            return HistoryLookup {
                history,
                error: None,
            };
        }

        let Some(provider) = self.provider.as_ref() else {
            return HistoryLookup {
                history: PriceHistory::empty(symbol),
                error: Some("offline".to_string()),
            };
        };

        match provider.history(symbol, start) {
            Ok(history) => {
                self.histories.borrow_mut().insert(key, history.clone());
                HistoryLookup {
                    history,
                    error: None,
                }
            }
            Err(e) => {
                log::error!(
                    "Error fetching price history for {} from {}: {}",
                    symbol,
                    provider.name(),
                    e
                );
                HistoryLookup {
                    history: PriceHistory::empty(symbol),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Every known split for `symbol`, read from the full-history series.
    ///
    /// Empty when the provider fails or is absent.
    pub fn splits(&self, symbol: &str, today: NaiveDate) -> Vec<SplitEvent> {
        self.history(symbol, ChartRange::Max, today).history.splits
    }

    /// Latest quote for `symbol`; on failure a quote with only `error` set.
    pub fn quote(&self, symbol: &str) -> Quote {
        let key = symbol.to_uppercase();
        if let Some(quote) = self.quotes.borrow_mut().get(&key) {
            return quote;
        }

        let Some(provider) = self.provider.as_ref() else {
            return Quote::unavailable(symbol, "offline");
        };

        match provider.quote(symbol) {
            Ok(quote) => {
                self.quotes.borrow_mut().insert(key, quote.clone());
                quote
            }
            Err(e) => {
                log::error!("Error fetching quote for {}: {}", symbol, e);
                Quote::unavailable(symbol, e.to_string())
            }
        }
    }

    /// Sector of `symbol`, or `Unknown` when the provider fails, is absent
    /// or has no answer.
    pub fn sector(&self, symbol: &str) -> String {
        let key = symbol.to_uppercase();
        if let Some(sector) = self.sectors.borrow_mut().get(&key) {
            return sector;
        }

        let Some(provider) = self.provider.as_ref() else {
            return config::UNKNOWN_SECTOR.to_string();
        };

        match provider.sector(symbol) {
            Ok(found) => {
                let sector = found.unwrap_or_else(|| config::UNKNOWN_SECTOR.to_string());
                self.sectors.borrow_mut().insert(key, sector.clone());
                sector
            }
            Err(e) => {
                log::error!("Error fetching sector for {}: {}", symbol, e);
                config::UNKNOWN_SECTOR.to_string()
            }
        }
    }

    /// Drop cached entries for one symbol across all ranges and windows.
    pub fn invalidate(&self, symbol: &str) {
        let upper = symbol.to_uppercase();
        let prefix = format!("{}:", upper);
        let dropped = self
            .histories
            .borrow_mut()
            .invalidate_where(|k| k.starts_with(&prefix));
        log::debug!("Dropped {} cached histories for {}", dropped, upper);
        self.quotes.borrow_mut().invalidate(&upper);
        self.sectors.borrow_mut().invalidate(&upper);
    }

    pub fn clear(&self) {
        self.histories.borrow_mut().clear();
        self.quotes.borrow_mut().clear();
        self.sectors.borrow_mut().clear();
    }

    /// Number of cached `(histories, quotes)` entries.
    pub fn cached(&self) -> (usize, usize) {
        (self.histories.borrow().len(), self.quotes.borrow().len())
    }
}

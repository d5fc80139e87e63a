//! Stockbook: a personal stock-portfolio ledger.
//!
//! Stores brokerage transactions in DuckDB, fetches daily price history,
//! split events and quotes from a price provider, and reconciles the
//! nominal prices the broker recorded with the provider's split-adjusted
//! series so both can be charted on the same axis.
//!
//! # Quick start
//!
//! ```no_run
//! use stockbook::{ChartMode, ChartRange, ImportMode, Stockbook};
//!
//! let book = Stockbook::builder().build().unwrap();
//! book.import_csv("orders.csv", ImportMode::Replace).unwrap();
//!
//! // Newest trades first, 20 per page
//! let page = book.transactions().list(1, 20).unwrap();
//!
//! // Trades divided through later splits so they sit on the adjusted closes
//! let chart = book
//!     .charts()
//!     .chart("AAPL", ChartRange::OneYear, ChartMode::Adjusted)
//!     .unwrap();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod esg;
pub mod import;
pub mod market;
pub mod models;
pub mod provider;
pub mod queries;
pub mod range;
pub mod splits;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncStockbook;
pub use cache::TtlCache;
pub use connection::Connection;
pub use error::{Result, StockbookError};
pub use import::{ImportMode, ImportSummary};
pub use market::MarketData;
pub use models::{
    ChartData, ChartMode, ChartPoint, ChartSplit, EsgRecommendation, EsgScore, EsgSummary,
    NewTransaction, PortfolioSummary, Position, PriceHistory, PricePoint, Quote, Side, SplitEvent,
    StockListing, Transaction, TransactionFilter, TransactionPage,
};
pub use provider::{PriceProvider, YahooProvider};
pub use range::ChartRange;
pub use splits::{AdjustedTrade, SplitSchedule};
pub use sql_builder::SqlBuilder;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// StockbookBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`Stockbook`].
///
/// Use [`Stockbook::builder()`] to obtain one, chain configuration methods,
/// and call [`build()`](StockbookBuilder::build).
pub struct StockbookBuilder {
    database_path: Option<PathBuf>,
    in_memory: bool,
    offline: bool,
    timeout: Duration,
    cache_ttl: Duration,
    cache_capacity: usize,
    provider: Option<Box<dyn PriceProvider + Send>>,
}

impl Default for StockbookBuilder {
    fn default() -> Self {
        Self {
            database_path: None,
            in_memory: false,
            offline: false,
            timeout: config::DEFAULT_TIMEOUT,
            cache_ttl: config::CACHE_TTL,
            cache_capacity: config::CACHE_CAPACITY,
            provider: None,
        }
    }
}

impl StockbookBuilder {
    /// Store transactions in this DuckDB file.
    ///
    /// Defaults to [`config::default_database_path()`].
    pub fn database_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Keep the store in memory. Overrides `database_path`.
    pub fn in_memory(mut self, in_memory: bool) -> Self {
        self.in_memory = in_memory;
        self
    }

    /// Never contact a price provider. Charts come back empty with
    /// `error = "offline"` and quotes carry the same error.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for the default provider. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How long provider responses stay cached. Defaults to 5 minutes.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Maximum number of cached histories (and, separately, quotes).
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Use a custom price provider instead of [`YahooProvider`].
    pub fn provider(mut self, provider: Box<dyn PriceProvider + Send>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Open the store and set up the market-data layer.
    ///
    /// No network request is made here.
    pub fn build(self) -> Result<Stockbook> {
        let conn = if self.in_memory {
            Connection::open_in_memory()?
        } else {
            let path = self
                .database_path
                .unwrap_or_else(config::default_database_path);
            Connection::open(path)?
        };

        let provider: Option<Box<dyn PriceProvider + Send>> = if self.offline {
            None
        } else {
            match self.provider {
                Some(p) => Some(p),
                None => Some(Box::new(YahooProvider::new(self.timeout)?)),
            }
        };

        let market = MarketData::new(provider, self.cache_ttl, self.cache_capacity);
        Ok(Stockbook { conn, market })
    }
}

// ---------------------------------------------------------------------------
// Stockbook
// ---------------------------------------------------------------------------

/// The main entry point.
///
/// Owns the transaction store and the market-data layer and hands out
/// lightweight query wrappers that borrow from them.
pub struct Stockbook {
    conn: Connection,
    market: MarketData,
}

impl Stockbook {
    pub fn builder() -> StockbookBuilder {
        StockbookBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Stored transactions: pagination, filters, stock list.
    pub fn transactions(&self) -> queries::TransactionQuery<'_> {
        queries::TransactionQuery::new(&self.conn)
    }

    /// Price charts with buy/sell markers.
    pub fn charts(&self) -> queries::ChartQuery<'_> {
        queries::ChartQuery::new(&self.conn, &self.market)
    }

    pub fn quotes(&self) -> queries::QuoteQuery<'_> {
        queries::QuoteQuery::new(&self.market)
    }

    /// Open positions and concentration.
    pub fn portfolio(&self) -> queries::PortfolioQuery<'_> {
        queries::PortfolioQuery::new(&self.conn, &self.market)
    }

    // -- Ingest and utility methods ----------------------------------------

    /// Load a broker CSV export into the store.
    pub fn import_csv<P: AsRef<Path>>(&self, path: P, mode: ImportMode) -> Result<ImportSummary> {
        import::import_csv(&self.conn, path, mode)
    }

    /// Drop cached market data for `symbol`, or everything when `None`.
    pub fn refresh(&self, symbol: Option<&str>) {
        match symbol {
            Some(s) => self.market.invalidate(s),
            None => self.market.clear(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn market(&self) -> &MarketData {
        &self.market
    }

    /// Consume the client and close the store.
    pub fn close(self) {
        drop(self);
    }
}

impl fmt::Display for Stockbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = match self.conn.path() {
            Some(p) => p.display().to_string(),
            None => ":memory:".to_string(),
        };
        let (histories, quotes) = self.market.cached();
        write!(
            f,
            "Stockbook(store={}, online={}, cached_histories={}, cached_quotes={})",
            store,
            self.market.is_online(),
            histories,
            quotes
        )
    }
}

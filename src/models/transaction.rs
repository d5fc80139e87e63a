use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Parse a broker side string, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Side> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Transaction — A stored brokerage order (query result)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub time: String,
    pub symbol: String,
    pub name: String,
    pub order_type: String,
    /// Side as reported by the broker (usually `Buy`/`Sell`).
    pub side: String,
    pub average_price: f64,
    pub qty: f64,
    pub state: String,
    pub fees: f64,
}

impl Transaction {
    pub fn side_kind(&self) -> Option<Side> {
        Side::parse(&self.side)
    }

    pub fn is_buy(&self) -> bool {
        self.side_kind() == Some(Side::Buy)
    }
}

// ---------------------------------------------------------------------------
// NewTransaction — Insert payload (id assigned by the store)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: String,
    pub time: String,
    pub symbol: String,
    pub name: String,
    pub order_type: String,
    pub side: String,
    pub average_price: f64,
    pub qty: f64,
    pub state: String,
    pub fees: f64,
}

// ---------------------------------------------------------------------------
// StockListing — Distinct (symbol, name) pair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockListing {
    pub symbol: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// TransactionPage — One page of a paginated listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl TransactionPage {
    pub fn total_pages(total: usize, per_page: usize) -> usize {
        if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionFilter — Filters for per-symbol listings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub symbol: String,
    pub side: Option<Side>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub since: Option<String>,
}

impl TransactionFilter {
    pub fn symbol(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    pub fn side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    pub fn since(mut self, date: &str) -> Self {
        self.since = Some(date.to_string());
        self
    }
}

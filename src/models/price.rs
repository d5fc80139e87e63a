use serde::{Deserialize, Serialize};

use super::split::SplitEvent;

// ---------------------------------------------------------------------------
// PricePoint — Single daily close
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: &str, close: f64) -> Self {
        Self {
            date: date.to_string(),
            close,
        }
    }
}

// ---------------------------------------------------------------------------
// PriceHistory — Provider series plus the splits it was adjusted for
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    /// Split-adjusted closes in ascending date order.
    pub points: Vec<PricePoint>,
    pub splits: Vec<SplitEvent>,
}

impl PriceHistory {
    pub fn empty(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Quote — Latest price with day change
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub error: Option<String>,
}

impl Quote {
    /// Build a quote, deriving the change fields when both prices are known and non-zero.
    pub fn new(symbol: &str, current_price: Option<f64>, previous_close: Option<f64>) -> Self {
        let change = match (current_price, previous_close) {
            (Some(cur), Some(prev)) if cur != 0.0 && prev != 0.0 => Some(cur - prev),
            _ => None,
        };
        let change_percent = match (change, previous_close) {
            (Some(ch), Some(prev)) if ch != 0.0 => Some(ch / prev * 100.0),
            _ => None,
        };
        Self {
            symbol: symbol.to_string(),
            current_price,
            previous_close,
            change,
            change_percent,
            error: None,
        }
    }

    /// Placeholder quote carrying only an error message.
    pub fn unavailable(symbol: &str, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

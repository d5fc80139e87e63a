use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Position — Open holding in one symbol
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub name: String,
    /// Shares held, restated in today's share count.
    pub shares: f64,
    /// Remaining cost including buy fees.
    pub cost_basis: f64,
    pub average_cost: f64,
    pub last_price: Option<f64>,
    pub market_value: Option<f64>,
    /// Share of the total valued portfolio, `0.0..=1.0`.
    pub weight: Option<f64>,
    pub unrealized_gain: Option<f64>,
}

// ---------------------------------------------------------------------------
// PortfolioSummary — Valued positions plus concentration figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub positions: Vec<Position>,
    pub total_cost: f64,
    pub total_value: f64,
    pub largest_symbol: Option<String>,
    pub largest_weight: Option<f64>,
    /// Herfindahl index over position weights; 1.0 means a single holding.
    pub concentration: Option<f64>,
    /// Symbols without a usable quote, excluded from weights.
    pub unpriced: Vec<String>,
}

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChartMode — Which price basis a chart is drawn in
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    /// Closes restated to the price quoted on the day; trades shown as reported.
    #[default]
    Nominal,
    /// Closes as the provider returns them; trades restated in today's shares.
    Adjusted,
}

// ---------------------------------------------------------------------------
// ChartPoint — A trade marker on a price chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub id: i64,
    pub date: String,
    pub time: String,
    pub price: f64,
    pub qty: f64,
}

// ---------------------------------------------------------------------------
// ChartSplit — A split marker placed on the plotted series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSplit {
    pub date: String,
    pub ratio: f64,
    /// Plotted close on the split date; `None` when the series has no point there.
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// ChartData — Price series plus trade markers for one symbol/range
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub symbol: String,
    pub range: String,
    pub mode: ChartMode,
    pub dates: Vec<String>,
    pub prices: Vec<f64>,
    pub buy_transactions: Vec<ChartPoint>,
    pub sell_transactions: Vec<ChartPoint>,
    pub splits: Vec<ChartSplit>,
    pub error: Option<String>,
}

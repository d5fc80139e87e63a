use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SplitEvent — A corporate split on its effective date
// ---------------------------------------------------------------------------

/// A stock split. A 4-for-1 split has `ratio = 4.0`; a 1-for-10 reverse split `0.1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitEvent {
    /// Effective date, `YYYY-MM-DD`.
    pub date: String,
    pub ratio: f64,
}

impl SplitEvent {
    pub fn new(date: &str, ratio: f64) -> Self {
        Self {
            date: date.to_string(),
            ratio,
        }
    }

    /// Build from a `numerator:denominator` pair. Returns `None` when either side is zero.
    pub fn from_fraction(date: &str, numerator: f64, denominator: f64) -> Option<Self> {
        if numerator == 0.0 || denominator == 0.0 {
            return None;
        }
        Some(Self::new(date, numerator / denominator))
    }
}

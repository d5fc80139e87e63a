//! Named chart ranges and their start dates.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartRange {
    #[default]
    Ytd,
    OneMonth,
    OneYear,
    TwoYears,
    FiveYears,
    Max,
}

impl ChartRange {
    /// Parse a range name. Unknown names fall back to one month.
    pub fn parse(s: &str) -> ChartRange {
        match s.trim().to_ascii_lowercase().as_str() {
            "ytd" => ChartRange::Ytd,
            "1y" => ChartRange::OneYear,
            "2y" => ChartRange::TwoYears,
            "5y" => ChartRange::FiveYears,
            "max" | "all" => ChartRange::Max,
            _ => ChartRange::OneMonth,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartRange::Ytd => "ytd",
            ChartRange::OneMonth => "1mo",
            ChartRange::OneYear => "1y",
            ChartRange::TwoYears => "2y",
            ChartRange::FiveYears => "5y",
            ChartRange::Max => "max",
        }
    }

    /// First date covered by the range, or `None` for the full history.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            ChartRange::Ytd => NaiveDate::from_ymd_opt(today.year(), 1, 1),
            ChartRange::OneMonth => Some(today - Duration::days(30)),
            ChartRange::OneYear => Some(today - Duration::days(365)),
            ChartRange::TwoYears => Some(today - Duration::days(2 * 365)),
            ChartRange::FiveYears => Some(today - Duration::days(5 * 365)),
            ChartRange::Max => None,
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

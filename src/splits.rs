//! Split adjustment between broker-reported trades and provider price series.
//!
//! Price providers return closes restated as if every later split had
//! already happened. A [`SplitSchedule`] holds a symbol's splits in date
//! order and converts in both directions:
//!
//! - [`SplitSchedule::adjust`] restates a trade's price and quantity by the
//!   cumulative ratio of the splits strictly before the trade date.
//! - [`SplitSchedule::restate`] puts a trade on the provider's basis:
//!   price divided by, and quantity multiplied by, the ratios of the splits
//!   strictly after the trade date.
//! - [`SplitSchedule::unadjust`] recovers nominal closes by multiplying each
//!   close by the ratios of the splits strictly after its date.
//!
//! A split on the same day as a trade or close counts as not yet applied.
//! Malformed dates are logged and treated as a ratio of 1.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::models::{PricePoint, SplitEvent};

/// Parse a `YYYY-MM-DD` date, tolerating a trailing time component.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, config::DATE_FORMAT).ok().or_else(|| {
        s.get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, config::DATE_FORMAT).ok())
    })
}

/// A trade restated through a split schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedTrade {
    pub price: f64,
    pub qty: f64,
    /// Cumulative ratio that was applied.
    pub ratio: f64,
}

/// A symbol's split history sorted ascending by effective date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSchedule {
    events: Vec<(NaiveDate, f64)>,
}

impl SplitSchedule {
    /// Build a schedule from events in any order.
    ///
    /// Events with an unparsable date or a non-positive ratio are skipped.
    pub fn new(events: &[SplitEvent]) -> Self {
        let mut parsed: Vec<(NaiveDate, f64)> = Vec::with_capacity(events.len());
        for event in events {
            let Some(date) = parse_date(&event.date) else {
                log::warn!("Ignoring split with malformed date {:?}", event.date);
                continue;
            };
            if !event.ratio.is_finite() || event.ratio <= 0.0 {
                log::warn!("Ignoring split on {} with ratio {}", date, event.ratio);
                continue;
            }
            parsed.push((date, event.ratio));
        }
        parsed.sort_by_key(|(date, _)| *date);
        Self { events: parsed }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// The parsed events as `(date, ratio)` in ascending order.
    pub fn events(&self) -> &[(NaiveDate, f64)] {
        &self.events
    }

    /// Product of the ratios of every split strictly before `date`.
    pub fn ratio_before_date(&self, date: NaiveDate) -> f64 {
        self.events
            .iter()
            .take_while(|(d, _)| *d < date)
            .map(|(_, r)| r)
            .product()
    }

    /// Product of the ratios of every split strictly after `date`.
    pub fn ratio_after_date(&self, date: NaiveDate) -> f64 {
        self.events
            .iter()
            .rev()
            .take_while(|(d, _)| *d > date)
            .map(|(_, r)| r)
            .product()
    }

    /// String-date form of [`ratio_before_date`](Self::ratio_before_date).
    ///
    /// A malformed date is logged and yields `1.0`.
    pub fn ratio_before(&self, date: &str) -> f64 {
        match parse_date(date) {
            Some(d) => self.ratio_before_date(d),
            None => {
                log::warn!("Cannot split-adjust malformed date {:?}", date);
                1.0
            }
        }
    }

    /// String-date form of [`ratio_after_date`](Self::ratio_after_date).
    ///
    /// A malformed date is logged and yields `1.0`.
    pub fn ratio_after(&self, date: &str) -> f64 {
        match parse_date(date) {
            Some(d) => self.ratio_after_date(d),
            None => {
                log::warn!("Cannot split-adjust malformed date {:?}", date);
                1.0
            }
        }
    }

    /// Restate a trade: price times the cumulative ratio, quantity divided by it.
    pub fn adjust(&self, price: f64, qty: f64, date: &str) -> AdjustedTrade {
        let ratio = self.ratio_before(date);
        AdjustedTrade {
            price: price * ratio,
            qty: qty / ratio,
            ratio,
        }
    }

    /// Restate a trade in today's shares, on the same basis as provider closes.
    pub fn restate(&self, price: f64, qty: f64, date: &str) -> AdjustedTrade {
        let ratio = self.ratio_after(date);
        AdjustedTrade {
            price: price / ratio,
            qty: qty * ratio,
            ratio,
        }
    }

    /// Recover nominal closes from a split-adjusted series.
    pub fn unadjust(&self, points: &[PricePoint]) -> Vec<PricePoint> {
        if self.is_empty() {
            return points.to_vec();
        }
        points
            .iter()
            .map(|p| PricePoint {
                date: p.date.clone(),
                close: p.close * self.ratio_after(&p.date),
            })
            .collect()
    }

    /// Restate nominal closes the way a provider does: divide by later split ratios.
    pub fn apply_provider_adjustment(&self, points: &[PricePoint]) -> Vec<PricePoint> {
        if self.is_empty() {
            return points.to_vec();
        }
        points
            .iter()
            .map(|p| PricePoint {
                date: p.date.clone(),
                close: p.close / self.ratio_after(&p.date),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> SplitSchedule {
        // Deliberately unordered
        SplitSchedule::new(&[
            SplitEvent::new("2022-07-18", 20.0),
            SplitEvent::new("2020-08-31", 4.0),
        ])
    }

    fn close_enough(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * a.abs().max(1.0)
    }

    #[test]
    fn events_are_sorted() {
        let s = schedule();
        let dates: Vec<String> = s.events().iter().map(|(d, _)| d.to_string()).collect();
        assert_eq!(dates, vec!["2020-08-31", "2022-07-18"]);
    }

    #[test]
    fn no_splits_is_identity() {
        let s = SplitSchedule::new(&[]);
        let t = s.adjust(150.0, 10.0, "2021-01-04");
        assert_eq!(t.price, 150.0);
        assert_eq!(t.qty, 10.0);
        assert_eq!(t.ratio, 1.0);
        assert_eq!(s.ratio_after("1999-01-01"), 1.0);
    }

    #[test]
    fn adjust_uses_splits_strictly_before_trade() {
        let s = schedule();
        assert_eq!(s.adjust(100.0, 8.0, "2019-06-01").ratio, 1.0);

        let mid = s.adjust(100.0, 8.0, "2021-03-01");
        assert_eq!(mid.ratio, 4.0);
        assert_eq!(mid.price, 400.0);
        assert_eq!(mid.qty, 2.0);

        assert_eq!(s.adjust(100.0, 80.0, "2023-01-03").ratio, 80.0);
    }

    #[test]
    fn split_on_trade_date_is_not_yet_applied() {
        let s = schedule();
        assert_eq!(s.ratio_before("2020-08-31"), 1.0);
        assert_eq!(s.ratio_before("2020-09-01"), 4.0);
    }

    #[test]
    fn adjusted_price_never_below_reported_for_forward_splits() {
        let s = schedule();
        for date in ["2019-01-01", "2020-08-31", "2021-05-05", "2024-02-02"] {
            assert!(s.adjust(42.0, 1.0, date).price >= 42.0);
        }
    }

    #[test]
    fn ratio_after_counts_splits_strictly_after() {
        let s = schedule();
        assert_eq!(s.ratio_after("2019-01-01"), 80.0);
        assert_eq!(s.ratio_after("2020-08-31"), 20.0);
        assert_eq!(s.ratio_after("2022-07-18"), 1.0);
        assert_eq!(s.ratio_after("2024-01-01"), 1.0);
    }

    #[test]
    fn malformed_trade_date_is_a_no_op() {
        let s = schedule();
        let t = s.adjust(10.0, 3.0, "07/18/2022");
        assert_eq!((t.price, t.qty, t.ratio), (10.0, 3.0, 1.0));
        assert_eq!(s.ratio_after("not a date"), 1.0);
    }

    #[test]
    fn malformed_and_non_positive_events_are_skipped() {
        let s = SplitSchedule::new(&[
            SplitEvent::new("bogus", 2.0),
            SplitEvent::new("2021-01-01", 0.0),
            SplitEvent::new("2021-01-02", f64::NAN),
            SplitEvent::new("2021-06-01", 3.0),
        ]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.ratio_after("2021-01-01"), 3.0);
    }

    #[test]
    fn reverse_split_lowers_adjusted_price() {
        let s = SplitSchedule::new(&[SplitEvent::new("2023-05-01", 0.1)]);
        let t = s.adjust(2.0, 100.0, "2023-06-01");
        assert!(close_enough(t.price, 0.2));
        assert!(close_enough(t.qty, 1000.0));
    }

    #[test]
    fn restate_lands_on_provider_basis() {
        let s = schedule();
        let before_both = s.restate(400.0, 5.0, "2020-08-03");
        assert_eq!(before_both.ratio, 80.0);
        assert!(close_enough(before_both.price, 5.0));
        assert!(close_enough(before_both.qty, 400.0));

        // Split on the trade date is already reflected in the reported price
        let on_split = s.restate(130.0, 8.0, "2020-08-31");
        assert_eq!(on_split.ratio, 20.0);
        assert_eq!(s.restate(150.0, 1.0, "2022-07-18").price, 150.0);

        // Same factor the provider divides the close of that day by
        let nominal = vec![PricePoint::new("2020-08-03", 400.0)];
        let adjusted = s.apply_provider_adjustment(&nominal);
        assert!(close_enough(adjusted[0].close, before_both.price));
    }

    #[test]
    fn unadjust_recovers_nominal_prices() {
        let s = schedule();
        let adjusted = vec![
            PricePoint::new("2020-08-28", 6.25),
            PricePoint::new("2020-08-31", 6.40),
            PricePoint::new("2022-07-15", 7.50),
            PricePoint::new("2022-07-18", 7.40),
        ];
        let nominal = s.unadjust(&adjusted);
        assert!(close_enough(nominal[0].close, 500.0));
        assert!(close_enough(nominal[1].close, 128.0));
        assert!(close_enough(nominal[2].close, 150.0));
        assert!(close_enough(nominal[3].close, 7.40));
    }

    #[test]
    fn provider_adjustment_round_trips() {
        let s = schedule();
        let nominal = vec![
            PricePoint::new("2020-08-28", 499.23),
            PricePoint::new("2021-01-04", 129.41),
            PricePoint::new("2022-07-15", 150.17),
            PricePoint::new("2022-07-19", 7.62),
        ];
        let adjusted = s.apply_provider_adjustment(&nominal);

        // Pre-split segment differs by exactly the cumulative ratio
        assert!(close_enough(nominal[0].close / adjusted[0].close, 80.0));
        assert!(close_enough(nominal[1].close / adjusted[1].close, 20.0));
        assert!(close_enough(nominal[3].close, adjusted[3].close));

        let restored = s.unadjust(&adjusted);
        for (a, b) in nominal.iter().zip(&restored) {
            assert_eq!(a.date, b.date);
            assert!(close_enough(a.close, b.close));
        }
    }

    #[test]
    fn parse_date_accepts_timestamp_suffix() {
        assert_eq!(
            parse_date("2024-03-01 00:00:00"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_date(""), None);
    }
}

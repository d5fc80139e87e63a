//! Sector-baseline ESG scoring.
//!
//! A holding starts from the baseline of its sector and moves by a small,
//! deterministic amount derived from the account's own trading in it:
//! net buying lifts every component, and trading less than twice a month
//! lifts governance. Each adjustment is bounded to ±10 points and each
//! score to `0..=100`. Portfolio figures are weighted by position value.

use crate::models::{
    EsgComponents, EsgRatings, EsgRecommendation, EsgScore, EsgSummary, GradeCount, Impact,
    Position, Side, Transaction,
};
use crate::splits::parse_date;

/// Lowest score for each letter grade, best first.
pub const GRADE_THRESHOLDS: [(f64, &str); 13] = [
    (95.0, "A+"),
    (90.0, "A"),
    (85.0, "A-"),
    (80.0, "B+"),
    (75.0, "B"),
    (70.0, "B-"),
    (65.0, "C+"),
    (60.0, "C"),
    (55.0, "C-"),
    (50.0, "D+"),
    (45.0, "D"),
    (40.0, "D-"),
    (0.0, "F"),
];

const SECTOR_BASELINES: [(&str, EsgComponents); 11] = [
    ("Technology", EsgComponents::new(72.5, 68.3, 65.7)),
    ("Consumer Cyclical", EsgComponents::new(65.8, 70.2, 63.5)),
    ("Communication Services", EsgComponents::new(68.9, 66.4, 64.2)),
    ("Healthcare", EsgComponents::new(67.2, 72.8, 69.3)),
    ("Consumer Defensive", EsgComponents::new(64.7, 66.9, 65.8)),
    ("Financial Services", EsgComponents::new(61.3, 63.5, 70.4)),
    ("Industrials", EsgComponents::new(58.7, 63.2, 66.8)),
    ("Basic Materials", EsgComponents::new(53.2, 59.7, 62.3)),
    ("Real Estate", EsgComponents::new(59.8, 62.4, 64.5)),
    ("Utilities", EsgComponents::new(56.3, 64.7, 67.2)),
    ("Energy", EsgComponents::new(48.5, 58.3, 62.7)),
];

const DEFAULT_BASELINE: EsgComponents = EsgComponents::new(60.0, 60.0, 60.0);

const MAX_ADJUSTMENT: f64 = 10.0;

/// Trades per month below which governance is rewarded.
const STEADY_TRADES_PER_MONTH: f64 = 2.0;

const HIGH_BAR: f64 = 60.0;
const MEDIUM_BAR: f64 = 75.0;
const MIN_COVERAGE: f64 = 80.0;

/// Letter grade for a score; anything below 40 (or NaN) is `F`.
pub fn grade(score: f64) -> &'static str {
    GRADE_THRESHOLDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map_or("F", |(_, g)| *g)
}

/// Baseline scores for a sector name, matched ignoring case.
pub fn sector_baseline(sector: &str) -> EsgComponents {
    let sector = sector.trim();
    SECTOR_BASELINES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(sector))
        .map_or(DEFAULT_BASELINE, |(_, b)| *b)
}

/// Weighted total: `0.4 E + 0.3 S + 0.3 G`.
pub fn total_score(c: &EsgComponents) -> f64 {
    c.environmental * 0.4 + c.social * 0.3 + c.governance * 0.3
}

/// Score movement derived from the trades recorded for one symbol.
pub fn trading_adjustment(transactions: &[&Transaction]) -> EsgComponents {
    if transactions.is_empty() {
        return EsgComponents::default();
    }

    let buys = transactions
        .iter()
        .filter(|t| t.side_kind() == Some(Side::Buy))
        .count() as f64;
    let sells = transactions
        .iter()
        .filter(|t| t.side_kind() == Some(Side::Sell))
        .count() as f64;
    let sentiment = (buys - sells) / (buys + sells).max(1.0);

    let dates: Vec<_> = transactions.iter().filter_map(|t| parse_date(&t.date)).collect();
    let span_days = match (dates.iter().min(), dates.iter().max()) {
        (Some(first), Some(last)) => (*last - *first).num_days().max(1),
        _ => 1,
    };
    let per_month = transactions.len() as f64 / span_days as f64 * 30.0;
    let stability = ((STEADY_TRADES_PER_MONTH - per_month) * 2.0).clamp(-5.0, 5.0);

    EsgComponents {
        environmental: bound(sentiment * 3.0),
        social: bound(sentiment * 2.5),
        governance: bound(sentiment * 2.0 + stability),
    }
}

fn bound(adjustment: f64) -> f64 {
    adjustment.clamp(-MAX_ADJUSTMENT, MAX_ADJUSTMENT)
}

fn ratings(c: &EsgComponents) -> EsgRatings {
    let spread = |score: f64| (score * 0.1).clamp(-5.0, 5.0);
    let (e, s, g) = (
        spread(c.environmental),
        spread(c.social),
        spread(c.governance),
    );
    EsgRatings {
        carbon_emissions: grade(c.environmental + e).to_string(),
        resource_use: grade(c.environmental - e).to_string(),
        human_rights: grade(c.social + s).to_string(),
        board_diversity: grade(c.governance - g).to_string(),
        business_ethics: grade(c.governance + g).to_string(),
    }
}

/// Score one valued position from its sector and its own trades.
pub fn score_holding(
    position: &Position,
    sector: &str,
    price: f64,
    transactions: &[&Transaction],
) -> EsgScore {
    let base = sector_baseline(sector);
    let adj = trading_adjustment(transactions);
    let scores = EsgComponents {
        environmental: (base.environmental + adj.environmental).clamp(0.0, 100.0),
        social: (base.social + adj.social).clamp(0.0, 100.0),
        governance: (base.governance + adj.governance).clamp(0.0, 100.0),
    };
    let total = total_score(&scores);

    EsgScore {
        symbol: position.symbol.clone(),
        name: position.name.clone(),
        sector: sector.to_string(),
        environmental: scores.environmental,
        social: scores.social,
        governance: scores.governance,
        total,
        environmental_grade: grade(scores.environmental).to_string(),
        social_grade: grade(scores.social).to_string(),
        governance_grade: grade(scores.governance).to_string(),
        overall_grade: grade(total).to_string(),
        ratings: ratings(&scores),
        shares: position.shares,
        current_price: price,
        position_value: position.shares * price,
    }
}

/// Value-weight the scored holdings into a portfolio profile.
///
/// `open_positions` counts every open position, scored or not, and is the
/// denominator of the coverage figure.
pub fn summarize(
    holdings: Vec<EsgScore>,
    unscored: Vec<String>,
    open_positions: usize,
) -> EsgSummary {
    let total_value: f64 = holdings.iter().map(|h| h.position_value).sum();

    let mut weighted = EsgComponents::default();
    let mut weighted_total = 0.0;
    if total_value > 0.0 {
        for h in &holdings {
            let w = h.position_value / total_value;
            weighted.environmental += h.environmental * w;
            weighted.social += h.social * w;
            weighted.governance += h.governance * w;
            weighted_total += h.total * w;
        }
    }

    let coverage_percent = if open_positions > 0 {
        holdings.len() as f64 / open_positions as f64 * 100.0
    } else {
        0.0
    };

    let grade_distribution = GRADE_THRESHOLDS
        .iter()
        .map(|(_, g)| GradeCount {
            grade: g.to_string(),
            count: holdings.iter().filter(|h| h.overall_grade == *g).count(),
        })
        .collect();

    let mut summary = EsgSummary {
        holdings,
        weighted_environmental: weighted.environmental,
        weighted_social: weighted.social,
        weighted_governance: weighted.governance,
        weighted_total,
        environmental_grade: grade(weighted.environmental).to_string(),
        social_grade: grade(weighted.social).to_string(),
        governance_grade: grade(weighted.governance).to_string(),
        total_grade: grade(weighted_total).to_string(),
        coverage_percent,
        grade_distribution,
        total_value,
        recommendations: Vec::new(),
        unscored,
    };
    summary.recommendations = recommendations(&summary);
    summary
}

fn recommendation(
    category: &str,
    title: &str,
    description: String,
    impact: Impact,
) -> EsgRecommendation {
    EsgRecommendation {
        category: category.to_string(),
        title: title.to_string(),
        description,
        impact,
    }
}

fn component_advice(category: &str, score: f64) -> Option<EsgRecommendation> {
    let impact = if score < HIGH_BAR {
        Impact::High
    } else if score < MEDIUM_BAR {
        Impact::Medium
    } else {
        return None;
    };
    Some(recommendation(
        category,
        &format!("Raise the {} score", category),
        format!(
            "The value-weighted {} score is {:.1}. \
             Shift weight toward holdings that score higher on it.",
            category, score
        ),
        impact,
    ))
}

/// Suggestions keyed off the weighted scores and the coverage figure.
pub fn recommendations(summary: &EsgSummary) -> Vec<EsgRecommendation> {
    let mut out: Vec<EsgRecommendation> = [
        ("environmental", summary.weighted_environmental),
        ("social", summary.weighted_social),
        ("governance", summary.weighted_governance),
    ]
    .into_iter()
    .filter_map(|(category, score)| component_advice(category, score))
    .collect();

    if summary.weighted_total < HIGH_BAR {
        out.push(recommendation(
            "overall",
            "Rebalance toward ESG leaders",
            format!(
                "The overall weighted score is {:.1}. Trim the lowest-scoring positions.",
                summary.weighted_total
            ),
            Impact::High,
        ));
    }

    if summary.coverage_percent < MIN_COVERAGE {
        out.push(recommendation(
            "coverage",
            "Expand ESG coverage",
            format!(
                "Only {:.1}% of open positions could be scored.",
                summary.coverage_percent
            ),
            Impact::Medium,
        ));
    }

    if out.len() < 2 {
        out.push(recommendation(
            "diversification",
            "Spread ESG exposure across sectors",
            "Holding several sectors keeps the profile balanced as scores change.".to_string(),
            Impact::Medium,
        ));
    }

    out
}

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EsgComponents — Environmental, social and governance figures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EsgComponents {
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
}

impl EsgComponents {
    pub const fn new(environmental: f64, social: f64, governance: f64) -> Self {
        Self {
            environmental,
            social,
            governance,
        }
    }
}

// ---------------------------------------------------------------------------
// EsgRatings — Letter grades for the sub-categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsgRatings {
    pub carbon_emissions: String,
    pub resource_use: String,
    pub human_rights: String,
    pub board_diversity: String,
    pub business_ethics: String,
}

// ---------------------------------------------------------------------------
// EsgScore — One valued holding with its sector-baseline scores
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsgScore {
    pub symbol: String,
    pub name: String,
    /// Sector the baseline came from; `Unknown` when the lookup failed.
    pub sector: String,
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
    /// `0.4 E + 0.3 S + 0.3 G`.
    pub total: f64,
    pub environmental_grade: String,
    pub social_grade: String,
    pub governance_grade: String,
    pub overall_grade: String,
    pub ratings: EsgRatings,
    pub shares: f64,
    pub current_price: f64,
    pub position_value: f64,
}

// ---------------------------------------------------------------------------
// GradeCount — Holdings per overall grade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeCount {
    pub grade: String,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// EsgRecommendation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EsgRecommendation {
    /// `environmental`, `social`, `governance`, `overall`, `coverage` or `diversification`.
    pub category: String,
    pub title: String,
    pub description: String,
    pub impact: Impact,
}

// ---------------------------------------------------------------------------
// EsgSummary — Value-weighted portfolio ESG profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsgSummary {
    pub holdings: Vec<EsgScore>,
    pub weighted_environmental: f64,
    pub weighted_social: f64,
    pub weighted_governance: f64,
    pub weighted_total: f64,
    pub environmental_grade: String,
    pub social_grade: String,
    pub governance_grade: String,
    pub total_grade: String,
    /// Scored holdings as a percentage of open positions.
    pub coverage_percent: f64,
    /// Every grade from `A+` down to `F`, including empty ones.
    pub grade_distribution: Vec<GradeCount>,
    pub total_value: f64,
    pub recommendations: Vec<EsgRecommendation>,
    /// Open positions left out for lack of a quote.
    pub unscored: Vec<String>,
}

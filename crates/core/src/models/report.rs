use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CalculationWarning;

use super::asset_class::{ClassSelection, PerClass};
use super::candidate::CandidateLists;
use super::holding::HoldingsSnapshot;
use super::plan::AllocationPlan;
use super::projection::ProjectedPortfolio;
use super::recommendation::RecommendationsByClass;

/// Everything one calculation needs, captured as a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// New money to invest
    pub contribution: f64,

    /// Classes the user opted into
    #[serde(default)]
    pub selection: ClassSelection,

    #[serde(default)]
    pub holdings: HoldingsSnapshot,

    #[serde(default)]
    pub candidates: CandidateLists,
}

impl CalculationRequest {
    pub fn new(contribution: f64) -> Self {
        Self {
            contribution,
            ..Self::default()
        }
    }

    pub fn with_selection(mut self, selection: ClassSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_holdings(mut self, holdings: HoldingsSnapshot) -> Self {
        self.holdings = holdings;
        self
    }

    pub fn with_candidates(mut self, candidates: CandidateLists) -> Self {
        self.candidates = candidates;
        self
    }
}

/// The complete, self-contained result of one calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub id: Uuid,
    pub computed_at: DateTime<Utc>,

    pub contribution: f64,

    /// Value per class before the contribution
    pub current_values: PerClass<f64>,

    /// Σ current_values
    pub current_total: f64,

    /// current_total + contribution
    pub future_total: f64,

    /// Percentage per class before the contribution
    pub current_distribution: PerClass<f64>,

    /// Target percentage per class for the selected classes
    pub target_distribution: PerClass<f64>,

    pub plan: AllocationPlan,

    pub recommendations: RecommendationsByClass,

    /// Money actually committed per class (purchases, or the allocation
    /// itself for fixed income)
    pub recommended_totals: PerClass<f64>,

    /// recommended_totals / contribution × 100
    pub recommended_shares: PerClass<f64>,

    /// Cash below the cheapest remaining unit price
    pub leftover_unallocated: f64,

    pub projection: ProjectedPortfolio,

    pub warnings: Vec<CalculationWarning>,
}

impl RecommendationReport {
    /// Money committed across all classes.
    pub fn recommended_total(&self) -> f64 {
        self.recommended_totals.sum()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

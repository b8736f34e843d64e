pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

pub use errors::{CalculationWarning, CoreError};
pub use models::asset_class::{AssetClass, ClassSelection, PerClass};
pub use models::candidate::{Candidate, CandidateLists, CandidateSpec, CandidateSpecLists};
pub use models::holding::{FixedIncomePosition, Holding, HoldingsSnapshot, InstrumentProfile};
pub use models::money::parse_brl_amount;
pub use models::plan::{AllocationPlan, SplitBranch};
pub use models::projection::{Breakdown, ProjectedPortfolio, ProjectedPosition, ProjectionSummary};
pub use models::recommendation::{Recommendation, RecommendationsByClass, WeightSnapshot};
pub use models::report::{CalculationRequest, RecommendationReport};
pub use models::settings::{QuoteSettings, Settings};
pub use services::market_data_service::MarketDataService;

use services::{
    distribution_service::DistributionService, leftover_service::LeftoverService,
    projection_service::ProjectionService, recommender_service::RecommenderService,
    splitter_service::SplitterService,
};

/// Main entry point for the contribution planner core library.
///
/// Holds the validated settings and the pure calculation services. A
/// calculation never fails: anomalies are reported as warnings in the
/// returned report.
#[must_use]
pub struct RecommendationEngine {
    settings: Settings,
    distribution_service: DistributionService,
    splitter_service: SplitterService,
    recommender_service: RecommenderService,
    leftover_service: LeftoverService,
    projection_service: ProjectionService,
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine")
            .field("target_weights", &self.settings.target_weights)
            .field("split_tolerance", &self.settings.split_tolerance)
            .finish()
    }
}

impl RecommendationEngine {
    /// Create an engine from validated settings.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    /// Create an engine with the default 30/30/20/20 target table.
    pub fn with_defaults() -> Self {
        Self::build(Settings::default())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Calculation ─────────────────────────────────────────────────

    /// Compute the full recommendation report for one contribution.
    ///
    /// Stages: class distributions → class split → per-class instrument
    /// purchases → leftover spending → projected portfolio.
    pub fn compute_recommendations(&self, request: &CalculationRequest) -> RecommendationReport {
        let mut warnings = Vec::new();

        let contribution = if request.contribution.is_finite() && request.contribution > 0.0 {
            request.contribution
        } else {
            warnings.push(
                CalculationWarning::InvalidInput(format!(
                    "contribution must be a positive amount, got {}; nothing allocated",
                    request.contribution
                ))
                .logged(),
            );
            0.0
        };

        // One line per instrument, whatever the casing or repetition.
        let holdings = request.holdings.consolidated();
        let candidates = request.candidates.normalized();

        // 1. Where the portfolio stands and where it should go.
        let current_values = holdings.class_values();
        let current_total = current_values.sum();
        if current_total <= 0.0 {
            warnings.push(
                CalculationWarning::ZeroDenominator(
                    "portfolio has no value; current distribution is all zeros".to_string(),
                )
                .logged(),
            );
        }
        let current_distribution = self
            .distribution_service
            .current_distribution(&current_values, current_total);

        let mut target_distribution = self
            .distribution_service
            .target_distribution(&request.selection, &self.settings.target_weights);
        if request.selection.is_empty() {
            warnings.push(
                CalculationWarning::InvalidInput(
                    "no asset class selected; contribution left unallocated".to_string(),
                )
                .logged(),
            );
        } else if target_distribution.sum() <= 0.0 {
            warnings.push(
                CalculationWarning::InvalidInput(
                    "selected classes have no target weight; contribution left unallocated"
                        .to_string(),
                )
                .logged(),
            );
            target_distribution = PerClass::default();
        }
        debug!(
            current_total,
            ?current_distribution,
            ?target_distribution,
            "distributions computed"
        );

        // 2. Split across classes.
        let plan = if target_distribution.sum() > 0.0 {
            let shortfalls =
                self.splitter_service
                    .shortfalls(&current_values, contribution, &target_distribution);
            self.splitter_service
                .split(contribution, &shortfalls, &target_distribution)
        } else {
            AllocationPlan::empty(contribution)
        };

        // 3. Instruments per class.
        let mut recommendations = RecommendationsByClass::default();
        for class in AssetClass::INSTRUMENT_CLASSES {
            if *target_distribution.get(class) <= 0.0 {
                continue;
            }
            let result = self.recommender_service.recommend(
                class,
                plan.amount_for(class),
                holdings.instruments(class),
                candidates.for_class(class),
            );
            debug!(
                %class,
                budget = plan.amount_for(class),
                lines = result.recommendations.len(),
                spent = result.total(),
                "class recommended"
            );
            warnings.extend(result.warnings);
            if let Some(lines) = recommendations.for_class_mut(class) {
                *lines = result.recommendations;
            }
        }
        let fixed_income_allocation = plan.amount_for(AssetClass::FixedIncome);

        // 4. Spend what did not convert into whole units.
        let committed = recommendations.totals().sum() + fixed_income_allocation;
        let leftover = (contribution - committed).max(0.0);
        let outcome = self.leftover_service.optimize(
            leftover,
            recommendations,
            &candidates,
            &target_distribution,
        );
        let mut recommendations = outcome.recommendations;

        // 5. Post-trade portfolio.
        self.projection_service
            .fill_missing_weights(&holdings, &mut recommendations);
        let projection = self.projection_service.project(
            &holdings,
            &recommendations,
            &candidates,
            fixed_income_allocation,
        );

        let mut recommended_totals = outcome.class_totals;
        recommended_totals.fixed_income = fixed_income_allocation;
        let recommended_shares = recommended_totals.map(|_, total| {
            if contribution > 0.0 {
                total / contribution * 100.0
            } else {
                0.0
            }
        });

        info!(
            contribution,
            committed = recommended_totals.sum(),
            leftover = outcome.unallocated,
            lines = recommendations.line_count(),
            warnings = warnings.len(),
            "recommendations computed"
        );

        RecommendationReport {
            id: Uuid::new_v4(),
            computed_at: Utc::now(),
            contribution,
            current_values,
            current_total,
            future_total: current_total + contribution,
            current_distribution,
            target_distribution,
            plan,
            recommendations,
            recommended_totals,
            recommended_shares,
            leftover_unallocated: outcome.unallocated,
            projection,
            warnings,
        }
    }

    // ── Live Quotes ─────────────────────────────────────────────────

    /// Price the recommendation lists through `market` and compute the report.
    ///
    /// Candidates that could not be priced are dropped; their
    /// `UpstreamDataUnavailable` warnings lead the report's warning list.
    pub async fn compute_with_market_data(
        &self,
        market: &mut MarketDataService,
        mut request: CalculationRequest,
        specs: CandidateSpecLists,
    ) -> RecommendationReport {
        let (candidates, mut warnings) = market
            .resolve_candidate_lists(specs, &request.selection)
            .await;
        request.candidates = candidates;

        let mut report = self.compute_recommendations(&request);
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        report
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(settings: Settings) -> Self {
        Self {
            splitter_service: SplitterService::new(settings.split_tolerance),
            distribution_service: DistributionService::new(),
            recommender_service: RecommenderService::new(),
            leftover_service: LeftoverService::new(),
            projection_service: ProjectionService::new(),
            settings,
        }
    }
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::models::asset_class::{AssetClass, PerClass};
use crate::models::candidate::CandidateLists;
use crate::models::holding::{HoldingsSnapshot, InstrumentProfile};
use crate::models::projection::{Breakdown, ProjectedPortfolio, ProjectedPosition, ProjectionSummary};
use crate::models::recommendation::{RecommendationsByClass, WeightSnapshot};

/// Label for funds without a type or segment.
pub const UNCLASSIFIED: &str = "Other";

/// Projects the portfolio after every recommended purchase and computes the
/// post-trade weights, distribution and income figures.
///
/// Pure business logic: no I/O, no API calls.
pub struct ProjectionService;

impl ProjectionService {
    pub fn new() -> Self {
        Self
    }

    /// Compute the weight snapshot of every line that has none yet
    /// (lines opened by the leftover optimizer).
    ///
    /// The current weight comes from the holdings; the projected weight is
    /// measured against the projected class total (current class value +
    /// every purchase of the class).
    pub fn fill_missing_weights(
        &self,
        holdings: &HoldingsSnapshot,
        recommendations: &mut RecommendationsByClass,
    ) {
        for class in AssetClass::INSTRUMENT_CLASSES {
            let class_value = holdings.class_value(class);
            let projected_total = class_value + recommendations.class_total(class);
            let Some(lines) = recommendations.for_class_mut(class) else {
                continue;
            };

            for line in lines.iter_mut().filter(|r| r.weights.is_none()) {
                let held_value = holdings.find(class, &line.ticker).map_or(0.0, |h| h.value());
                let current = percent_of(held_value, class_value);
                let projected = percent_of(held_value + line.purchase_value, projected_total);
                line.weights = Some(WeightSnapshot {
                    current,
                    delta: line.ideal_weight - current,
                    projected,
                });
            }
        }
    }

    /// Merge holdings with purchases into the projected portfolio.
    ///
    /// Each instrument class lists held instruments (with any matching
    /// purchase added) followed by brand-new purchases, sorted by weight,
    /// descending. Fixed income grows by its allocation.
    pub fn project(
        &self,
        holdings: &HoldingsSnapshot,
        recommendations: &RecommendationsByClass,
        candidates: &CandidateLists,
        fixed_income_allocation: f64,
    ) -> ProjectedPortfolio {
        let mut portfolio = ProjectedPortfolio {
            funds_of_real_estate: self.project_class(
                AssetClass::FundsOfRealEstate,
                holdings,
                recommendations,
                candidates,
            ),
            stocks: self.project_class(AssetClass::Stocks, holdings, recommendations, candidates),
            etfs: self.project_class(AssetClass::Etfs, holdings, recommendations, candidates),
            ..ProjectedPortfolio::default()
        };

        portfolio.class_totals = PerClass::from_fn(|class| match class {
            AssetClass::FixedIncome => {
                holdings.class_value(class) + fixed_income_allocation.max(0.0)
            }
            _ => holdings.class_value(class) + recommendations.class_total(class),
        });
        portfolio.total_value = portfolio.class_totals.sum();
        let total = portfolio.total_value;
        portfolio.distribution = portfolio
            .class_totals
            .map(|_, value| percent_of(*value, total));
        portfolio.summary = self.summarize(
            &portfolio.funds_of_real_estate,
            &portfolio.stocks,
            portfolio.class_totals.funds_of_real_estate,
        );

        debug!(
            total_value = portfolio.total_value,
            positions = portfolio.funds_of_real_estate.len()
                + portfolio.stocks.len()
                + portfolio.etfs.len(),
            "portfolio projected"
        );

        portfolio
    }

    fn project_class(
        &self,
        class: AssetClass,
        holdings: &HoldingsSnapshot,
        recommendations: &RecommendationsByClass,
        candidates: &CandidateLists,
    ) -> Vec<ProjectedPosition> {
        let held = holdings.instruments(class);
        let lines = recommendations.for_class(class);
        let projected_total = holdings.class_value(class) + recommendations.class_total(class);

        let mut positions = Vec::with_capacity(held.len() + lines.len());

        // A repeated holding takes the purchases only once.
        let mut credited: HashSet<&str> = HashSet::new();
        for holding in held {
            let first = credited.insert(holding.ticker.as_str());
            let bought = lines
                .iter()
                .filter(|r| first && r.ticker == holding.ticker);
            let quantity_bought: u64 = bought.clone().map(|r| r.quantity).sum();
            let purchase_value: f64 = bought.map(|r| r.purchase_value).sum();
            let unit_price = if holding.value() > 0.0 {
                holding.unit_price
            } else {
                lines
                    .iter()
                    .find(|r| r.ticker == holding.ticker)
                    .map_or(0.0, |r| r.price)
            };
            let ideal_weight = candidates
                .find(class, &holding.ticker)
                .map_or(0.0, |c| c.ideal_weight);

            positions.push(position(
                class,
                holding.ticker.clone(),
                holding.name.clone(),
                unit_price,
                holding.quantity,
                quantity_bought,
                holding.value() + purchase_value,
                ideal_weight,
                holding.profile.clone(),
                projected_total,
            ));
        }

        for line in lines
            .iter()
            .filter(|r| !held.iter().any(|h| h.ticker == r.ticker))
        {
            let profile = candidates
                .find(class, &line.ticker)
                .map(|c| c.profile.clone())
                .unwrap_or_default();

            positions.push(position(
                class,
                line.ticker.clone(),
                line.name.clone(),
                line.price,
                0,
                line.quantity,
                line.purchase_value,
                line.ideal_weight,
                profile,
                projected_total,
            ));
        }

        positions.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        positions
    }

    /// Yield, dividend and composition figures.
    pub fn summarize(
        &self,
        funds: &[ProjectedPosition],
        stocks: &[ProjectedPosition],
        funds_total: f64,
    ) -> ProjectionSummary {
        let funds_monthly_dividends: f64 = funds.iter().map(|p| p.monthly_dividends).sum();
        let funds_monthly_income: f64 = funds.iter().map(|p| p.monthly_income).sum();
        let funds_annual_income = funds_monthly_income * 12.0;

        let mut funds_by_type: BTreeMap<String, Breakdown> = BTreeMap::new();
        let mut funds_by_segment: BTreeMap<String, Breakdown> = BTreeMap::new();
        for fund in funds {
            add_to_breakdown(&mut funds_by_type, fund.profile.fund_type.as_deref(), fund);
            add_to_breakdown(&mut funds_by_segment, fund.profile.segment.as_deref(), fund);
        }
        for entry in funds_by_type.values_mut().chain(funds_by_segment.values_mut()) {
            entry.percentage = percent_of(entry.value, funds_total);
        }

        ProjectionSummary {
            funds_weighted_yield: weighted_yield(funds),
            stocks_weighted_yield: weighted_yield(stocks),
            funds_monthly_dividends,
            funds_annual_dividends: funds_monthly_dividends * 12.0,
            stocks_annual_dividends: stocks
                .iter()
                .map(|p| p.profile.dividend_yield.unwrap_or(0.0) / 100.0 * p.value)
                .sum(),
            funds_monthly_income,
            funds_annual_income,
            funds_average_yield: percent_of(funds_annual_income, funds_total),
            funds_by_type,
            funds_by_segment,
        }
    }
}

impl Default for ProjectionService {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::too_many_arguments)]
fn position(
    class: AssetClass,
    ticker: String,
    name: String,
    unit_price: f64,
    quantity_before: u64,
    quantity_bought: u64,
    value: f64,
    ideal_weight: f64,
    profile: InstrumentProfile,
    projected_total: f64,
) -> ProjectedPosition {
    let quantity = quantity_before + quantity_bought;
    let last_dividend = profile.last_dividend.unwrap_or(0.0);
    let monthly_dividends = profile.dividend_yield.unwrap_or(0.0) / 100.0 / 12.0 * value;
    let yield_on_cost = if unit_price > 0.0 {
        last_dividend * 12.0 / unit_price * 100.0
    } else {
        0.0
    };

    ProjectedPosition {
        ticker,
        name,
        asset_class: class,
        unit_price,
        quantity_before,
        quantity_bought,
        quantity,
        value,
        weight: percent_of(value, projected_total),
        ideal_weight,
        profile,
        monthly_dividends,
        monthly_income: last_dividend * quantity as f64,
        yield_on_cost,
    }
}

/// Σ(yield × value) / Σ value, 0 for an empty class.
fn weighted_yield(positions: &[ProjectedPosition]) -> f64 {
    let total: f64 = positions.iter().map(|p| p.value).sum();
    if total <= 0.0 {
        return 0.0;
    }
    positions
        .iter()
        .map(|p| p.profile.dividend_yield.unwrap_or(0.0) * p.value)
        .sum::<f64>()
        / total
}

fn add_to_breakdown(
    groups: &mut BTreeMap<String, Breakdown>,
    label: Option<&str>,
    fund: &ProjectedPosition,
) {
    let label = match label.map(str::trim) {
        Some(l) if !l.is_empty() => l,
        _ => UNCLASSIFIED,
    };
    let entry = groups.entry(label.to_string()).or_default();
    entry.value += fund.value;
    entry.monthly_dividends += fund.monthly_dividends;
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::asset_class::{AssetClass, PerClass};
use super::holding::InstrumentProfile;

/// One instrument in the post-purchase portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPosition {
    pub ticker: String,
    pub name: String,
    pub asset_class: AssetClass,
    pub unit_price: f64,

    /// Units held before the purchase
    pub quantity_before: u64,

    /// Units bought in this contribution
    pub quantity_bought: u64,

    /// quantity_before + quantity_bought
    pub quantity: u64,

    /// quantity × unit_price
    pub value: f64,

    /// value / projected class total × 100
    pub weight: f64,

    /// Ideal weight from the recommendation list, 0 when not listed
    pub ideal_weight: f64,

    pub profile: InstrumentProfile,

    /// dividend_yield / 100 / 12 × value
    pub monthly_dividends: f64,

    /// last_dividend × quantity
    pub monthly_income: f64,

    /// last_dividend × 12 / unit_price × 100
    pub yield_on_cost: f64,
}

/// Value, share and income aggregated under one label
/// (a fund type or a fund segment).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub value: f64,

    /// value / fund class total × 100
    pub percentage: f64,

    pub monthly_dividends: f64,
}

/// Income and composition figures across the projected portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    /// Value-weighted average dividend yield of the fund class, in percent
    pub funds_weighted_yield: f64,

    /// Value-weighted average dividend yield of the stock class, in percent
    pub stocks_weighted_yield: f64,

    /// Σ fund monthly dividends (yield based)
    pub funds_monthly_dividends: f64,

    /// funds_monthly_dividends × 12
    pub funds_annual_dividends: f64,

    /// Σ dividend_yield / 100 × value over stocks
    pub stocks_annual_dividends: f64,

    /// Σ fund monthly income (last-dividend based)
    pub funds_monthly_income: f64,

    /// funds_monthly_income × 12
    pub funds_annual_income: f64,

    /// funds_annual_income / fund class total × 100
    pub funds_average_yield: f64,

    /// Fund value grouped by fund type
    pub funds_by_type: BTreeMap<String, Breakdown>,

    /// Fund value grouped by segment
    pub funds_by_segment: BTreeMap<String, Breakdown>,
}

/// The hypothetical portfolio after every recommended purchase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPortfolio {
    /// Positions of the unit-quantized classes, each list sorted by weight, descending
    pub funds_of_real_estate: Vec<ProjectedPosition>,
    pub stocks: Vec<ProjectedPosition>,
    pub etfs: Vec<ProjectedPosition>,

    /// current class value + recommended class total
    pub class_totals: PerClass<f64>,

    /// Σ class_totals
    pub total_value: f64,

    /// class total / total value × 100
    pub distribution: PerClass<f64>,

    pub summary: ProjectionSummary,
}

impl ProjectedPortfolio {
    pub fn positions(&self, class: AssetClass) -> &[ProjectedPosition] {
        match class {
            AssetClass::FundsOfRealEstate => &self.funds_of_real_estate,
            AssetClass::Stocks => &self.stocks,
            AssetClass::Etfs => &self.etfs,
            AssetClass::FixedIncome => &[],
        }
    }

    pub fn find(&self, class: AssetClass, ticker: &str) -> Option<&ProjectedPosition> {
        self.positions(class).iter().find(|p| p.ticker == ticker)
    }
}

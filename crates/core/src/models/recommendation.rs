use serde::{Deserialize, Serialize};

use super::asset_class::{AssetClass, PerClass};
use super::candidate::Candidate;

/// Weight figures of a recommendation line, all in percent of the class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightSnapshot {
    /// Weight of the instrument in its class before the purchase
    pub current: f64,

    /// ideal_weight − current
    pub delta: f64,

    /// Weight after the purchase
    pub projected: f64,
}

/// A single "buy N units of X" line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub ticker: String,
    pub name: String,
    pub asset_class: AssetClass,
    pub price: f64,
    pub ideal_weight: f64,

    /// Units to buy
    pub quantity: u64,

    /// quantity × price
    pub purchase_value: f64,

    /// `None` until the weights have been computed. Lines opened by the
    /// leftover optimizer start without one; the projector fills it.
    pub weights: Option<WeightSnapshot>,
}

impl Recommendation {
    /// A one-unit line for a candidate, with weights not yet computed.
    pub fn single_unit(class: AssetClass, candidate: &Candidate) -> Self {
        Self {
            ticker: candidate.ticker.clone(),
            name: candidate.name.clone(),
            asset_class: class,
            price: candidate.price,
            ideal_weight: candidate.ideal_weight,
            quantity: 1,
            purchase_value: candidate.price,
            weights: None,
        }
    }

    /// Add one unit at the line's price.
    pub fn add_unit(&mut self) {
        self.quantity += 1;
        self.purchase_value += self.price;
    }
}

/// Recommendation lines for the unit-quantized classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationsByClass {
    pub funds_of_real_estate: Vec<Recommendation>,
    pub stocks: Vec<Recommendation>,
    pub etfs: Vec<Recommendation>,
}

impl RecommendationsByClass {
    pub fn for_class(&self, class: AssetClass) -> &[Recommendation] {
        match class {
            AssetClass::FundsOfRealEstate => &self.funds_of_real_estate,
            AssetClass::Stocks => &self.stocks,
            AssetClass::Etfs => &self.etfs,
            AssetClass::FixedIncome => &[],
        }
    }

    pub fn for_class_mut(&mut self, class: AssetClass) -> Option<&mut Vec<Recommendation>> {
        match class {
            AssetClass::FundsOfRealEstate => Some(&mut self.funds_of_real_estate),
            AssetClass::Stocks => Some(&mut self.stocks),
            AssetClass::Etfs => Some(&mut self.etfs),
            AssetClass::FixedIncome => None,
        }
    }

    /// Σ purchase value of a class.
    pub fn class_total(&self, class: AssetClass) -> f64 {
        self.for_class(class).iter().map(|r| r.purchase_value).sum()
    }

    /// Σ purchase value per class; fixed income is always 0 here.
    pub fn totals(&self) -> PerClass<f64> {
        PerClass::from_fn(|c| self.class_total(c))
    }

    pub fn find(&self, class: AssetClass, ticker: &str) -> Option<&Recommendation> {
        self.for_class(class).iter().find(|r| r.ticker == ticker)
    }

    pub fn line_count(&self) -> usize {
        self.funds_of_real_estate.len() + self.stocks.len() + self.etfs.len()
    }
}

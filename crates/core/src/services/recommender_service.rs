use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::errors::CalculationWarning;
use crate::models::asset_class::AssetClass;
use crate::models::candidate::Candidate;
use crate::models::holding::Holding;
use crate::models::recommendation::{Recommendation, WeightSnapshot};

/// Recommendation lines for one class, plus the anomalies met on the way.
#[derive(Debug, Clone, Default)]
pub struct ClassRecommendation {
    pub recommendations: Vec<Recommendation>,
    pub warnings: Vec<CalculationWarning>,
}

impl ClassRecommendation {
    /// Σ purchase value of the lines.
    pub fn total(&self) -> f64 {
        self.recommendations.iter().map(|r| r.purchase_value).sum()
    }
}

/// Turns a class budget into whole-unit purchases of the listed candidates.
///
/// Pure business logic: no I/O, no API calls.
pub struct RecommenderService;

impl RecommenderService {
    pub fn new() -> Self {
        Self
    }

    /// Recommend purchases for one unit-quantized class.
    ///
    /// Each candidate aims at `ideal_weight`% of the future class value
    /// (current class value + budget). Wanted amounts are scaled down
    /// together when they exceed the budget, then floored to whole units,
    /// so the total purchase value never exceeds `budget`.
    ///
    /// Candidates with a non-positive price are skipped with a warning.
    /// Fixed income has no instrument lines and yields an empty result.
    pub fn recommend(
        &self,
        class: AssetClass,
        budget: f64,
        holdings: &[Holding],
        candidates: &[Candidate],
    ) -> ClassRecommendation {
        let mut result = ClassRecommendation::default();
        if !class.is_unit_quantized() {
            return result;
        }

        let budget = if budget.is_finite() { budget.max(0.0) } else { 0.0 };
        // (units, value) per ticker; repeated tickers add up.
        let mut held: HashMap<&str, (u64, f64)> = HashMap::new();
        for h in holdings {
            let entry = held.entry(h.ticker.as_str()).or_default();
            entry.0 += h.quantity;
            entry.1 += h.value();
        }
        let class_value: f64 = holdings.iter().map(|h| h.value()).sum();
        let future_value = class_value + budget;

        if future_value <= 0.0 {
            debug!(%class, "future class value is zero, nothing to recommend");
            return result;
        }

        // 1. Keep the recommendable candidates, first listing wins on duplicates.
        let mut seen = HashSet::new();
        let mut eligible: Vec<&Candidate> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !candidate.has_valid_price() {
                result.warnings.push(
                    CalculationWarning::InvalidInput(format!(
                        "{class} candidate {} has invalid price {}; skipped",
                        candidate.ticker, candidate.price
                    ))
                    .logged(),
                );
                continue;
            }
            if !seen.insert(candidate.ticker.as_str()) {
                result.warnings.push(
                    CalculationWarning::InvalidInput(format!(
                        "{class} candidate {} is listed more than once; later listing ignored",
                        candidate.ticker
                    ))
                    .logged(),
                );
                continue;
            }
            eligible.push(candidate);
        }

        // 2. How much each candidate wants to reach its ideal value.
        // Held units are valued at the candidate's quote.
        let current_value_of = |c: &Candidate| {
            held.get(c.ticker.as_str())
                .map_or(0.0, |(units, _)| *units as f64 * c.price)
        };
        let mut desired: Vec<f64> = eligible
            .iter()
            .map(|c| {
                let ideal_value = future_value * c.ideal_weight.max(0.0) / 100.0;
                (ideal_value - current_value_of(*c)).max(0.0)
            })
            .collect();

        // 3. Never plan beyond the budget.
        let total_desired: f64 = desired.iter().sum();
        if total_desired > budget {
            let factor = if total_desired > 0.0 { budget / total_desired } else { 0.0 };
            debug!(%class, total_desired, budget, factor, "scaling purchases down to budget");
            for d in &mut desired {
                *d *= factor;
            }
        }

        // 4. Whole units only.
        for (candidate, wanted) in eligible.iter().zip(desired) {
            if wanted <= 0.0 {
                continue;
            }
            let mut quantity = (wanted / candidate.price).floor() as u64;
            // The division can round up across an integer boundary.
            if quantity > 0 && quantity as f64 * candidate.price > wanted {
                quantity -= 1;
            }
            if quantity == 0 {
                continue;
            }

            let purchase_value = quantity as f64 * candidate.price;
            let current_value = current_value_of(*candidate);
            let held_value = held.get(candidate.ticker.as_str()).map_or(0.0, |(_, value)| *value);
            let current_weight = if class_value > 0.0 {
                held_value / class_value * 100.0
            } else {
                0.0
            };
            let projected_weight = (current_value + purchase_value) / future_value * 100.0;

            debug!(
                %class,
                ticker = %candidate.ticker,
                quantity,
                purchase_value,
                "purchase recommended"
            );

            result.recommendations.push(Recommendation {
                ticker: candidate.ticker.clone(),
                name: candidate.name.clone(),
                asset_class: class,
                price: candidate.price,
                ideal_weight: candidate.ideal_weight,
                quantity,
                purchase_value,
                weights: Some(WeightSnapshot {
                    current: current_weight,
                    delta: candidate.ideal_weight - current_weight,
                    projected: projected_weight,
                }),
            });
        }

        result
    }
}

impl Default for RecommenderService {
    fn default() -> Self {
        Self::new()
    }
}

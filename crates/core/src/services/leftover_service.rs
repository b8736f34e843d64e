use tracing::debug;

use crate::models::asset_class::{AssetClass, PerClass};
use crate::models::candidate::{Candidate, CandidateLists};
use crate::models::recommendation::{Recommendation, RecommendationsByClass};

/// Result of spending leftover cash.
#[derive(Debug, Clone, PartialEq)]
pub struct LeftoverOutcome {
    pub recommendations: RecommendationsByClass,

    /// Σ purchase value per class after the extra units
    pub class_totals: PerClass<f64>,

    /// Cash no remaining pool entry could use
    pub unallocated: f64,

    /// Extra units bought by this pass
    pub units_bought: u64,
}

/// One buyable unit in the leftover pool.
struct PoolEntry<'a> {
    class: AssetClass,
    candidate: &'a Candidate,
}

/// Spends cash that did not convert into whole units during the per-class
/// pass, one unit at a time, cheapest first.
///
/// Pure business logic: no I/O, no API calls.
pub struct LeftoverService;

impl LeftoverService {
    pub fn new() -> Self {
        Self
    }

    /// Greedily buy single units with `leftover`.
    ///
    /// The pool holds every validly priced candidate of the instrument classes
    /// with a positive target weight, sorted by ascending price (input order
    /// breaks ties). Each round buys the first entry that still fits, removes
    /// it from the pool and restarts the scan. A ticker that already has a
    /// line gets one more unit; otherwise a one-unit line is appended.
    pub fn optimize(
        &self,
        leftover: f64,
        mut recommendations: RecommendationsByClass,
        candidates: &CandidateLists,
        target: &PerClass<f64>,
    ) -> LeftoverOutcome {
        let mut class_totals = recommendations.totals();
        let mut remaining = if leftover.is_finite() { leftover.max(0.0) } else { 0.0 };
        let mut units_bought = 0;

        let mut pool: Vec<PoolEntry<'_>> = AssetClass::INSTRUMENT_CLASSES
            .into_iter()
            .filter(|class| *target.get(*class) > 0.0)
            .flat_map(move |class| {
                candidates
                    .for_class(class)
                    .iter()
                    .filter(|c| c.has_valid_price())
                    .map(move |candidate| PoolEntry { class, candidate })
            })
            .collect();
        // Stable sort keeps listing order among equal prices.
        pool.sort_by(|a, b| a.candidate.price.total_cmp(&b.candidate.price));

        debug!(leftover = remaining, pool = pool.len(), "spending leftover");

        while let Some(pos) = pool.iter().position(|e| e.candidate.price <= remaining) {
            let PoolEntry { class, candidate } = pool.remove(pos);

            let Some(lines) = recommendations.for_class_mut(class) else {
                continue;
            };
            match lines.iter().position(|r| r.ticker == candidate.ticker) {
                Some(idx) => lines[idx].add_unit(),
                None => lines.push(Recommendation::single_unit(class, candidate)),
            }

            *class_totals.get_mut(class) += candidate.price;
            remaining -= candidate.price;
            units_bought += 1;

            debug!(
                %class,
                ticker = %candidate.ticker,
                price = candidate.price,
                remaining,
                "leftover unit bought"
            );
        }

        LeftoverOutcome {
            recommendations,
            class_totals,
            unallocated: remaining.max(0.0),
            units_bought,
        }
    }
}

impl Default for LeftoverService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_weights() -> PerClass<f64> {
        PerClass::new(30.0, 30.0, 20.0, 20.0)
    }

    #[test]
    fn buys_cheapest_until_nothing_fits() {
        let candidates = CandidateLists {
            funds_of_real_estate: vec![
                Candidate::new("AAA11", "A", 34.0, 70.0),
                Candidate::new("BBB11", "B", 33.0, 30.0),
                Candidate::new("CCC11", "C", 33.0, 45.0),
            ],
            ..CandidateLists::default()
        };
        let outcome = LeftoverService::new().optimize(
            100.0,
            RecommendationsByClass::default(),
            &candidates,
            &all_weights(),
        );

        assert_eq!(outcome.units_bought, 2);
        assert!((outcome.unallocated - 25.0).abs() < 1e-9);
        let funds = &outcome.recommendations.funds_of_real_estate;
        assert_eq!(funds[0].ticker, "BBB11");
        assert_eq!(funds[1].ticker, "CCC11");
        assert!(funds.iter().all(|r| r.quantity == 1 && r.weights.is_none()));
        assert!((outcome.class_totals.funds_of_real_estate - 75.0).abs() < 1e-9);
    }

    #[test]
    fn existing_line_gets_an_extra_unit() {
        let candidate = Candidate::new("ITSA4", "Itaúsa", 100.0, 10.0);
        let mut existing = RecommendationsByClass::default();
        let mut line = Recommendation::single_unit(AssetClass::Stocks, &candidate);
        line.quantity = 5;
        line.purchase_value = 50.0;
        existing.stocks.push(line);

        let candidates = CandidateLists {
            stocks: vec![candidate],
            ..CandidateLists::default()
        };
        let outcome =
            LeftoverService::new().optimize(15.0, existing, &candidates, &all_weights());

        assert_eq!(outcome.recommendations.stocks.len(), 1);
        assert_eq!(outcome.recommendations.stocks[0].quantity, 6);
        assert_eq!(outcome.recommendations.stocks[0].purchase_value, 60.0);
        assert_eq!(outcome.class_totals.stocks, 60.0);
        assert!((outcome.unallocated - 5.0).abs() < 1e-9);
    }

    #[test]
    fn unselected_classes_and_bad_prices_stay_out_of_the_pool() {
        let candidates = CandidateLists {
            stocks: vec![Candidate::new("ITSA4", "Itaúsa", 100.0, 1.0)],
            etfs: vec![Candidate::new("BOVA11", "Ibovespa", 100.0, 0.0)],
            ..CandidateLists::default()
        };
        let target = PerClass::new(100.0, 0.0, 0.0, 0.0);
        let outcome = LeftoverService::new().optimize(
            50.0,
            RecommendationsByClass::default(),
            &candidates,
            &target,
        );

        assert_eq!(outcome.units_bought, 0);
        assert_eq!(outcome.unallocated, 50.0);
    }

    #[test]
    fn equal_prices_keep_listing_order() {
        let candidates = CandidateLists {
            funds_of_real_estate: vec![Candidate::new("ZZZ11", "Z", 50.0, 10.0)],
            etfs: vec![Candidate::new("AAA11", "A", 50.0, 10.0)],
            ..CandidateLists::default()
        };
        let outcome = LeftoverService::new().optimize(
            10.0,
            RecommendationsByClass::default(),
            &candidates,
            &all_weights(),
        );

        assert_eq!(outcome.recommendations.funds_of_real_estate.len(), 1);
        assert!(outcome.recommendations.etfs.is_empty());
    }
}

use tracing::{debug, info};

use crate::models::asset_class::{AssetClass, PerClass};
use crate::models::plan::{AllocationPlan, SplitBranch};

/// Splits a contribution across asset classes to close allocation gaps.
///
/// Pure business logic: no I/O, no API calls.
pub struct SplitterService {
    tolerance: f64,
}

impl SplitterService {
    /// `tolerance` is the largest accepted gap between the split amounts and
    /// the contribution before the final rescale kicks in.
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// How much each class is missing to reach its target share of the
    /// future portfolio (current total + contribution). Never negative.
    pub fn shortfalls(
        &self,
        current_values: &PerClass<f64>,
        contribution: f64,
        target: &PerClass<f64>,
    ) -> PerClass<f64> {
        let future_total = current_values.sum() + contribution.max(0.0);
        PerClass::from_fn(|class| {
            let ideal_future = future_total * target.get(class) / 100.0;
            (ideal_future - current_values.get(class)).max(0.0)
        })
    }

    /// Divide `contribution` across classes.
    ///
    /// - No gap anywhere: split by target weight.
    /// - Gaps fit in the contribution: close them all, split the remainder by
    ///   target weight among classes with a weight.
    /// - Gaps exceed the contribution: split in proportion to each gap.
    ///
    /// A final pass rescales all amounts when their sum drifted from the
    /// contribution by more than the tolerance.
    pub fn split(
        &self,
        contribution: f64,
        shortfalls: &PerClass<f64>,
        target: &PerClass<f64>,
    ) -> AllocationPlan {
        let contribution = if contribution.is_finite() { contribution.max(0.0) } else { 0.0 };
        let shortfalls = shortfalls.map(|_, s| if s.is_finite() { s.max(0.0) } else { 0.0 });
        let total_shortfall = shortfalls.sum();

        let (branch, mut amounts) = if total_shortfall <= 0.0 {
            (SplitBranch::AtTarget, Self::by_weight(contribution, target))
        } else if total_shortfall <= contribution {
            let remainder = contribution - total_shortfall;
            let extra = Self::by_weight(remainder, target);
            (
                SplitBranch::GapsClosed,
                shortfalls.map(|class, s| s + extra.get(class)),
            )
        } else {
            (
                SplitBranch::ProportionalToShortfall,
                shortfalls.map(|_, s| {
                    if *s > 0.0 {
                        contribution * (s / total_shortfall)
                    } else {
                        0.0
                    }
                }),
            )
        };

        amounts = amounts.map(|_, a| a.max(0.0));

        let allocated = amounts.sum();
        let mut rescaled = false;
        if allocated > 0.0 && (allocated - contribution).abs() > self.tolerance {
            let factor = contribution / allocated;
            debug!(allocated, contribution, factor, "rescaling class amounts");
            amounts = amounts.map(|_, a| (a * factor).max(0.0));
            rescaled = true;
        }

        info!(
            ?branch,
            contribution,
            total_shortfall,
            funds = amounts.funds_of_real_estate,
            stocks = amounts.stocks,
            etfs = amounts.etfs,
            fixed_income = amounts.fixed_income,
            "contribution split across classes"
        );

        AllocationPlan {
            contribution,
            amounts,
            shortfalls,
            total_shortfall,
            branch,
            rescaled,
        }
    }

    /// `amount × weight / 100` for every class with a positive weight.
    fn by_weight(amount: f64, target: &PerClass<f64>) -> PerClass<f64> {
        PerClass::from_fn(|class: AssetClass| {
            let weight = *target.get(class);
            if weight > 0.0 && amount > 0.0 {
                amount * weight / 100.0
            } else {
                0.0
            }
        })
    }
}

impl Default for SplitterService {
    fn default() -> Self {
        Self::new(0.01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fifty_fifty() -> PerClass<f64> {
        PerClass::new(50.0, 50.0, 0.0, 0.0)
    }

    #[test]
    fn at_target_splits_by_weight() {
        let plan = SplitterService::default().split(500.0, &PerClass::default(), &fifty_fifty());
        assert_eq!(plan.branch, SplitBranch::AtTarget);
        assert_eq!(plan.amounts, PerClass::new(250.0, 250.0, 0.0, 0.0));
    }

    #[test]
    fn gaps_closed_then_remainder_by_weight() {
        let shortfalls = PerClass::new(100.0, 0.0, 0.0, 0.0);
        let plan = SplitterService::default().split(300.0, &shortfalls, &fifty_fifty());
        assert_eq!(plan.branch, SplitBranch::GapsClosed);
        assert!((plan.amounts.funds_of_real_estate - 200.0).abs() < 1e-9);
        assert!((plan.amounts.stocks - 100.0).abs() < 1e-9);
    }

    #[test]
    fn insufficient_contribution_is_proportional_to_gap() {
        let shortfalls = PerClass::new(300.0, 100.0, 0.0, 0.0);
        let plan = SplitterService::default().split(200.0, &shortfalls, &fifty_fifty());
        assert_eq!(plan.branch, SplitBranch::ProportionalToShortfall);
        assert!((plan.amounts.funds_of_real_estate - 150.0).abs() < 1e-9);
        assert!((plan.amounts.stocks - 50.0).abs() < 1e-9);
        assert!(!plan.rescaled);
    }

    #[test]
    fn drifted_amounts_are_rescaled() {
        // Weights summing to 90 leave 10% of the remainder unassigned.
        let target = PerClass::new(45.0, 45.0, 0.0, 0.0);
        let plan = SplitterService::default().split(1000.0, &PerClass::default(), &target);
        assert!(plan.rescaled);
        assert!((plan.allocated_total() - 1000.0).abs() < 0.01);
    }

    #[test]
    fn shortfalls_use_future_total() {
        let svc = SplitterService::default();
        let current = PerClass::new(1000.0, 0.0, 0.0, 0.0);
        let shortfalls = svc.shortfalls(&current, 1000.0, &fifty_fifty());
        assert_eq!(shortfalls.funds_of_real_estate, 0.0);
        assert_eq!(shortfalls.stocks, 1000.0);
    }
}

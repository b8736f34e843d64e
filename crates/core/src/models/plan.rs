use serde::{Deserialize, Serialize};

use super::asset_class::{AssetClass, PerClass};

/// Which rule the splitter used to divide the contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitBranch {
    /// Portfolio already at target: contribution split by target weight.
    AtTarget,
    /// Every gap closed, remainder split by target weight.
    GapsClosed,
    /// Contribution smaller than the total gap: split by share of the gap.
    ProportionalToShortfall,
}

/// How the contribution is divided across asset classes.
///
/// Invariant: `amounts.sum()` equals the contribution within the configured
/// tolerance, unless no class could receive money (empty selection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationPlan {
    pub contribution: f64,

    /// Money assigned to each class
    pub amounts: PerClass<f64>,

    /// max(0, ideal future value − current value) per class
    pub shortfalls: PerClass<f64>,

    pub total_shortfall: f64,

    pub branch: SplitBranch,

    /// True when the final rescale toward the contribution was applied
    pub rescaled: bool,
}

impl AllocationPlan {
    /// A plan that assigns nothing anywhere.
    pub fn empty(contribution: f64) -> Self {
        Self {
            contribution,
            amounts: PerClass::default(),
            shortfalls: PerClass::default(),
            total_shortfall: 0.0,
            branch: SplitBranch::AtTarget,
            rescaled: false,
        }
    }

    pub fn amount_for(&self, class: AssetClass) -> f64 {
        *self.amounts.get(class)
    }

    pub fn allocated_total(&self) -> f64 {
        self.amounts.sum()
    }
}

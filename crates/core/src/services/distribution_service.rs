use crate::models::asset_class::{ClassSelection, PerClass};

/// Computes class-level percentage distributions.
///
/// Pure business logic: no I/O, no API calls.
pub struct DistributionService;

impl DistributionService {
    pub fn new() -> Self {
        Self
    }

    /// Share of each class in the portfolio, in percent.
    ///
    /// A zero (or negative) total yields 0 for every class instead of
    /// dividing by zero.
    pub fn current_distribution(&self, class_values: &PerClass<f64>, total: f64) -> PerClass<f64> {
        if total <= 0.0 || !total.is_finite() {
            return PerClass::default();
        }
        class_values.map(|_, value| (value / total) * 100.0)
    }

    /// Target share of each class for the selected classes, in percent.
    ///
    /// With every class selected the base table is returned as-is. Otherwise
    /// the selected classes' base weights are rescaled to sum to 100 and the
    /// rest get 0.
    pub fn target_distribution(
        &self,
        selection: &ClassSelection,
        base_weights: &PerClass<f64>,
    ) -> PerClass<f64> {
        if selection.is_empty() {
            return PerClass::default();
        }
        if selection.is_all() {
            return *base_weights;
        }

        let selected_total: f64 = selection.selected().map(|c| *base_weights.get(c)).sum();
        if selected_total <= 0.0 {
            return PerClass::default();
        }

        base_weights.map(|class, weight| {
            if selection.is_selected(class) {
                (weight / selected_total) * 100.0
            } else {
                0.0
            }
        })
    }
}

impl Default for DistributionService {
    fn default() -> Self {
        Self::new()
    }
}

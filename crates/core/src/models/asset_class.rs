use serde::{Deserialize, Serialize};

/// The four investable asset classes.
/// Determines which recommendation list, holdings snapshot and quote
/// provider apply to an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetClass {
    /// Real-estate investment funds (FIIs), e.g. "HGLG11"
    FundsOfRealEstate,
    /// Listed equities, e.g. "ITSA4"
    Stocks,
    /// Exchange-traded funds, e.g. "BOVA11"
    Etfs,
    /// Fixed-income positions, held as monetary amounts
    FixedIncome,
}

impl AssetClass {
    /// Every class, in presentation order.
    pub const ALL: [AssetClass; 4] = [
        AssetClass::FundsOfRealEstate,
        AssetClass::Stocks,
        AssetClass::Etfs,
        AssetClass::FixedIncome,
    ];

    /// The classes bought in whole units.
    pub const INSTRUMENT_CLASSES: [AssetClass; 3] = [
        AssetClass::FundsOfRealEstate,
        AssetClass::Stocks,
        AssetClass::Etfs,
    ];

    /// Whether purchases in this class are quantized to whole units.
    /// Fixed income takes monetary amounts directly.
    pub fn is_unit_quantized(&self) -> bool {
        !matches!(self, AssetClass::FixedIncome)
    }
}

impl std::fmt::Display for AssetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetClass::FundsOfRealEstate => write!(f, "FundsOfRealEstate"),
            AssetClass::Stocks => write!(f, "Stocks"),
            AssetClass::Etfs => write!(f, "ETFs"),
            AssetClass::FixedIncome => write!(f, "FixedIncome"),
        }
    }
}

/// One value per asset class.
///
/// Lookups go through an exhaustive `match`, so adding a class is a compile
/// error everywhere a slot would be missed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerClass<T> {
    pub funds_of_real_estate: T,
    pub stocks: T,
    pub etfs: T,
    pub fixed_income: T,
}

impl<T> PerClass<T> {
    pub fn new(funds_of_real_estate: T, stocks: T, etfs: T, fixed_income: T) -> Self {
        Self {
            funds_of_real_estate,
            stocks,
            etfs,
            fixed_income,
        }
    }

    /// Build a table by evaluating `f` once per class.
    pub fn from_fn(mut f: impl FnMut(AssetClass) -> T) -> Self {
        Self {
            funds_of_real_estate: f(AssetClass::FundsOfRealEstate),
            stocks: f(AssetClass::Stocks),
            etfs: f(AssetClass::Etfs),
            fixed_income: f(AssetClass::FixedIncome),
        }
    }

    pub fn get(&self, class: AssetClass) -> &T {
        match class {
            AssetClass::FundsOfRealEstate => &self.funds_of_real_estate,
            AssetClass::Stocks => &self.stocks,
            AssetClass::Etfs => &self.etfs,
            AssetClass::FixedIncome => &self.fixed_income,
        }
    }

    pub fn get_mut(&mut self, class: AssetClass) -> &mut T {
        match class {
            AssetClass::FundsOfRealEstate => &mut self.funds_of_real_estate,
            AssetClass::Stocks => &mut self.stocks,
            AssetClass::Etfs => &mut self.etfs,
            AssetClass::FixedIncome => &mut self.fixed_income,
        }
    }

    /// Iterate `(class, &value)` pairs in [`AssetClass::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (AssetClass, &T)> {
        AssetClass::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(AssetClass, &T) -> U) -> PerClass<U> {
        PerClass::from_fn(|c| f(c, self.get(c)))
    }
}

impl PerClass<f64> {
    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, v)| *v).sum()
    }
}

/// The set of classes the user opted into for this contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSelection(PerClass<bool>);

impl ClassSelection {
    /// All four classes selected (the default when no custom split is asked for).
    pub fn all() -> Self {
        Self(PerClass::from_fn(|_| true))
    }

    pub fn none() -> Self {
        Self(PerClass::from_fn(|_| false))
    }

    pub fn only(classes: &[AssetClass]) -> Self {
        Self(PerClass::from_fn(|c| classes.contains(&c)))
    }

    pub fn with(mut self, class: AssetClass) -> Self {
        *self.0.get_mut(class) = true;
        self
    }

    pub fn is_selected(&self, class: AssetClass) -> bool {
        *self.0.get(class)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|(_, s)| **s).count()
    }

    pub fn is_all(&self) -> bool {
        self.count() == AssetClass::ALL.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn selected(&self) -> impl Iterator<Item = AssetClass> + '_ {
        AssetClass::ALL.into_iter().filter(|c| self.is_selected(*c))
    }
}

impl Default for ClassSelection {
    fn default() -> Self {
        Self::all()
    }
}

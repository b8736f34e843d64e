use serde::{Deserialize, Deserializer, Serialize};

use super::asset_class::{AssetClass, PerClass};

/// Canonical form of a ticker: trimmed and uppercased.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Serde hook so tickers read from JSON match the ones built in code.
pub(crate) fn deserialize_ticker<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_ticker(&raw))
}

/// Descriptive, class-specific fields of an instrument.
/// None of these influence the allocation math; they flow through to the
/// projection summaries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentProfile {
    /// Fund segment (e.g. "Logística"). Funds only.
    #[serde(default)]
    pub segment: Option<String>,

    /// Fund type (e.g. "Tijolo", "Papel"). Funds only.
    #[serde(default)]
    pub fund_type: Option<String>,

    /// Trailing dividend yield, in percent per year.
    #[serde(default)]
    pub dividend_yield: Option<f64>,

    /// Price-to-book ratio.
    #[serde(default)]
    pub price_to_book: Option<f64>,

    /// Price-to-earnings ratio. Stocks only.
    #[serde(default)]
    pub price_to_earnings: Option<f64>,

    /// Last dividend paid per unit.
    #[serde(default)]
    pub last_dividend: Option<f64>,
}

/// An owned, unit-quantized instrument (fund, stock or ETF).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker, uppercased (e.g. "HGLG11")
    #[serde(deserialize_with = "deserialize_ticker")]
    pub ticker: String,

    /// Human-readable name; falls back to the ticker when the source has none
    pub name: String,

    /// Units held
    pub quantity: u64,

    /// Current unit price
    pub unit_price: f64,

    #[serde(default)]
    pub profile: InstrumentProfile,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, quantity: u64, unit_price: f64) -> Self {
        let ticker = normalize_ticker(&ticker.into());
        Self {
            name: ticker.clone(),
            ticker,
            quantity,
            unit_price,
            profile: InstrumentProfile::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_profile(mut self, profile: InstrumentProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Market value of the position. A non-positive or non-finite price
    /// counts as zero value.
    pub fn value(&self) -> f64 {
        if self.unit_price.is_finite() && self.unit_price > 0.0 {
            self.unit_price * self.quantity as f64
        } else {
            0.0
        }
    }
}

/// A fixed-income position. Held as a monetary amount, never in units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedIncomePosition {
    pub name: String,
    pub ticker: String,

    /// Current market value of the position
    pub amount: f64,

    #[serde(default)]
    pub indexer: Option<String>,
    #[serde(default)]
    pub emitter: Option<String>,
    #[serde(default)]
    pub investment_type: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl FixedIncomePosition {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            amount,
            indexer: None,
            emitter: None,
            investment_type: None,
            due_date: None,
        }
    }

    pub fn value(&self) -> f64 {
        if self.amount.is_finite() && self.amount > 0.0 {
            self.amount
        } else {
            0.0
        }
    }
}

/// Everything the investor currently owns, split by class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    #[serde(default)]
    pub funds_of_real_estate: Vec<Holding>,
    #[serde(default)]
    pub stocks: Vec<Holding>,
    #[serde(default)]
    pub etfs: Vec<Holding>,
    #[serde(default)]
    pub fixed_income: Vec<FixedIncomePosition>,
}

impl HoldingsSnapshot {
    /// Unit-quantized holdings of a class. Empty for fixed income.
    pub fn instruments(&self, class: AssetClass) -> &[Holding] {
        match class {
            AssetClass::FundsOfRealEstate => &self.funds_of_real_estate,
            AssetClass::Stocks => &self.stocks,
            AssetClass::Etfs => &self.etfs,
            AssetClass::FixedIncome => &[],
        }
    }

    /// Current value of a class (Σ unit price × quantity, or Σ amount).
    pub fn class_value(&self, class: AssetClass) -> f64 {
        match class {
            AssetClass::FixedIncome => self.fixed_income.iter().map(|p| p.value()).sum(),
            _ => self.instruments(class).iter().map(|h| h.value()).sum(),
        }
    }

    pub fn class_values(&self) -> PerClass<f64> {
        PerClass::from_fn(|c| self.class_value(c))
    }

    pub fn total_value(&self) -> f64 {
        self.class_values().sum()
    }

    /// Find a holding by ticker (case-insensitive).
    pub fn find(&self, class: AssetClass, ticker: &str) -> Option<&Holding> {
        let key = normalize_ticker(ticker);
        self.instruments(class)
            .iter()
            .find(|h| normalize_ticker(&h.ticker) == key)
    }

    /// One holding per ticker and class, tickers normalized.
    ///
    /// Repeated tickers are merged: quantities add up and the first listing
    /// keeps its name and profile. The unit price is the first valid one.
    pub fn consolidated(&self) -> Self {
        Self {
            funds_of_real_estate: merge_by_ticker(&self.funds_of_real_estate),
            stocks: merge_by_ticker(&self.stocks),
            etfs: merge_by_ticker(&self.etfs),
            fixed_income: self.fixed_income.clone(),
        }
    }
}

fn merge_by_ticker(holdings: &[Holding]) -> Vec<Holding> {
    let mut merged: Vec<Holding> = Vec::with_capacity(holdings.len());
    for holding in holdings {
        let ticker = normalize_ticker(&holding.ticker);
        match merged.iter().position(|h| h.ticker == ticker) {
            Some(idx) => {
                let existing = &mut merged[idx];
                existing.quantity += holding.quantity;
                if existing.value() <= 0.0 && holding.value() > 0.0 {
                    existing.unit_price = holding.unit_price;
                }
            }
            None => merged.push(Holding {
                ticker,
                ..holding.clone()
            }),
        }
    }
    merged
}

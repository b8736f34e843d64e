use serde::{Deserialize, Serialize};

use super::asset_class::AssetClass;
use super::holding::{deserialize_ticker, normalize_ticker, InstrumentProfile};

/// A recommendable instrument as listed in a recommendation list,
/// before its price has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSpec {
    #[serde(deserialize_with = "deserialize_ticker")]
    pub ticker: String,
    pub name: String,

    /// Target share of this instrument within its class, in percent
    pub ideal_weight: f64,

    #[serde(default)]
    pub profile: InstrumentProfile,
}

impl CandidateSpec {
    pub fn new(ticker: impl Into<String>, name: impl Into<String>, ideal_weight: f64) -> Self {
        Self {
            ticker: normalize_ticker(&ticker.into()),
            name: name.into(),
            ideal_weight,
            profile: InstrumentProfile::default(),
        }
    }

    /// Attach a resolved unit price.
    pub fn priced(self, price: f64) -> Candidate {
        Candidate {
            ticker: self.ticker,
            name: self.name,
            ideal_weight: self.ideal_weight,
            price,
            profile: self.profile,
        }
    }
}

/// A priced, recommendable instrument. Read-only input to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(deserialize_with = "deserialize_ticker")]
    pub ticker: String,
    pub name: String,

    /// Target share of this instrument within its class, in percent
    pub ideal_weight: f64,

    /// Unit price; must be finite and > 0 to be recommendable
    pub price: f64,

    #[serde(default)]
    pub profile: InstrumentProfile,
}

impl Candidate {
    pub fn new(
        ticker: impl Into<String>,
        name: impl Into<String>,
        ideal_weight: f64,
        price: f64,
    ) -> Self {
        CandidateSpec::new(ticker, name, ideal_weight).priced(price)
    }

    pub fn with_profile(mut self, profile: InstrumentProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Candidate lists for the unit-quantized classes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateLists {
    #[serde(default)]
    pub funds_of_real_estate: Vec<Candidate>,
    #[serde(default)]
    pub stocks: Vec<Candidate>,
    #[serde(default)]
    pub etfs: Vec<Candidate>,
}

impl CandidateLists {
    /// Candidates of a class. Fixed income has no instrument list.
    pub fn for_class(&self, class: AssetClass) -> &[Candidate] {
        match class {
            AssetClass::FundsOfRealEstate => &self.funds_of_real_estate,
            AssetClass::Stocks => &self.stocks,
            AssetClass::Etfs => &self.etfs,
            AssetClass::FixedIncome => &[],
        }
    }

    pub fn for_class_mut(&mut self, class: AssetClass) -> Option<&mut Vec<Candidate>> {
        match class {
            AssetClass::FundsOfRealEstate => Some(&mut self.funds_of_real_estate),
            AssetClass::Stocks => Some(&mut self.stocks),
            AssetClass::Etfs => Some(&mut self.etfs),
            AssetClass::FixedIncome => None,
        }
    }

    /// Look up a candidate's listing by ticker (case-insensitive).
    pub fn find(&self, class: AssetClass, ticker: &str) -> Option<&Candidate> {
        let key = normalize_ticker(ticker);
        self.for_class(class)
            .iter()
            .find(|c| normalize_ticker(&c.ticker) == key)
    }

    /// Copy of the lists with every ticker normalized.
    pub fn normalized(&self) -> Self {
        let normalize = |list: &[Candidate]| -> Vec<Candidate> {
            list.iter()
                .map(|c| Candidate {
                    ticker: normalize_ticker(&c.ticker),
                    ..c.clone()
                })
                .collect()
        };
        Self {
            funds_of_real_estate: normalize(&self.funds_of_real_estate),
            stocks: normalize(&self.stocks),
            etfs: normalize(&self.etfs),
        }
    }
}

/// Unpriced recommendation lists for the unit-quantized classes, as read
/// from the recommendation files before quotes are resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateSpecLists {
    #[serde(default)]
    pub funds_of_real_estate: Vec<CandidateSpec>,
    #[serde(default)]
    pub stocks: Vec<CandidateSpec>,
    #[serde(default)]
    pub etfs: Vec<CandidateSpec>,
}

impl CandidateSpecLists {
    /// Take the list of a class out, leaving it empty.
    pub fn take(&mut self, class: AssetClass) -> Vec<CandidateSpec> {
        match class {
            AssetClass::FundsOfRealEstate => std::mem::take(&mut self.funds_of_real_estate),
            AssetClass::Stocks => std::mem::take(&mut self.stocks),
            AssetClass::Etfs => std::mem::take(&mut self.etfs),
            AssetClass::FixedIncome => Vec::new(),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

use super::asset_class::PerClass;

/// Tolerance when checking that the target table sums to 100.
const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Settings of the quote data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    /// Base URL of the brapi quote API
    pub brapi_base_url: String,

    /// Per-request timeout, in seconds
    pub timeout_secs: u64,

    /// How long a fetched quote stays fresh, in minutes
    pub cache_ttl_minutes: i64,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            brapi_base_url: "https://brapi.dev/api".to_string(),
            timeout_secs: 10,
            cache_ttl_minutes: 30,
        }
    }
}

/// Engine and data-access configuration.
///
/// Missing fields in a JSON document fall back to [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target share of each class when all four are selected, in percent.
    /// Must sum to 100.
    pub target_weights: PerClass<f64>,

    /// Allowed gap between the split amounts and the contribution before
    /// the splitter rescales
    pub split_tolerance: f64,

    /// API keys for providers that require them.
    /// Keys: provider name (e.g., "brapi"). Values: the key/token.
    pub api_keys: HashMap<String, String>,

    pub quotes: QuoteSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_weights: PerClass::new(30.0, 30.0, 20.0, 20.0),
            split_tolerance: 0.01,
            api_keys: HashMap::new(),
            quotes: QuoteSettings::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a JSON settings file (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn with_target_weights(mut self, weights: PerClass<f64>) -> Self {
        self.target_weights = weights;
        self
    }

    pub fn with_api_key(mut self, provider: impl Into<String>, key: impl Into<String>) -> Self {
        self.api_keys.insert(provider.into(), key.into());
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        for (class, weight) in self.target_weights.iter() {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(CoreError::InvalidSettings(format!(
                    "Target weight for {class} must be a non-negative number, got {weight}"
                )));
            }
        }

        let total = self.target_weights.sum();
        if (total - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(CoreError::InvalidSettings(format!(
                "Target weights must sum to 100, got {total}"
            )));
        }

        if !self.split_tolerance.is_finite() || self.split_tolerance <= 0.0 {
            return Err(CoreError::InvalidSettings(format!(
                "split_tolerance must be positive, got {}",
                self.split_tolerance
            )));
        }

        if self.quotes.timeout_secs == 0 {
            return Err(CoreError::InvalidSettings(
                "quotes.timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.quotes.cache_ttl_minutes < 0 {
            return Err(CoreError::InvalidSettings(format!(
                "quotes.cache_ttl_minutes must not be negative, got {}",
                self.quotes.cache_ttl_minutes
            )));
        }

        Ok(())
    }
}

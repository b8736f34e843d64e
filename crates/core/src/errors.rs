use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::asset_class::AssetClass;

/// Unified error type for the contribution-planner-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
///
/// The recommendation engine itself never returns this type: anomalies seen
/// during a calculation degrade to a [`CalculationWarning`] instead.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No quote provider available for asset class: {0}")]
    NoProvider(String),

    #[error("Quote not available for {symbol}")]
    QuoteNotAvailable { symbol: String },

    // ── Input validation ────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// A non-fatal anomaly observed while computing recommendations.
///
/// Warnings are collected into the report and logged at `warn` level; they
/// never abort the calculation.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum CalculationWarning {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Zero denominator: {0}")]
    ZeroDenominator(String),

    #[error("Upstream data unavailable for {ticker} ({class}): {reason}")]
    UpstreamDataUnavailable {
        ticker: String,
        class: AssetClass,
        reason: String,
    },
}

impl CalculationWarning {
    /// Log the warning and hand it back, so call sites can `push(w.logged())`.
    pub fn logged(self) -> Self {
        tracing::warn!(warning = %self, "calculation anomaly");
        self
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL, and the quote API token travels
        // in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::asset_class::AssetClass;

const PROVIDER: &str = "brapi";

/// brapi.dev provider for B3 quotes (funds, stocks, ETFs).
///
/// - **Requires**: API token (set via settings as "brapi").
/// - **Coverage**: every instrument listed on B3.
/// - **Strategy**: one daily-range quote per ticker; callers cache it.
pub struct BrapiProvider {
    client: Client,
    base_url: String,
    token: String,
}

impl BrapiProvider {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout_secs: u64) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn quote_url(&self, symbol: &str) -> String {
        format!("{}/quote/{}", self.base_url, symbol.to_uppercase())
    }
}

// ── brapi API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    results: Vec<QuoteResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteResult {
    regular_market_price: Option<f64>,
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl QuoteProvider for BrapiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        AssetClass::INSTRUMENT_CLASSES.to_vec()
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let resp = self
            .client
            .get(self.quote_url(symbol))
            .query(&[
                ("token", self.token.as_str()),
                ("range", "1d"),
                ("interval", "1d"),
            ])
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Quote request for {symbol} returned status {status}"),
            });
        }

        let body: QuoteResponse = resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse quote for {symbol}: {e}"),
        })?;

        body.results
            .first()
            .and_then(|r| r.regular_market_price)
            .ok_or_else(|| CoreError::QuoteNotAvailable {
                symbol: symbol.to_uppercase(),
            })
    }
}

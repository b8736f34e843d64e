use async_trait::async_trait;

use super::traits::QuoteProvider;
use crate::errors::CoreError;
use crate::models::asset_class::AssetClass;

const PROVIDER: &str = "Yahoo Finance";

/// Yahoo Finance provider for B3 quotes.
///
/// - **Free**: No API key required.
/// - **Coverage**: B3 funds, stocks and ETFs under the `.SA` suffix.
///
/// Uses the `yahoo_finance_api` crate. Serves as the fallback when brapi is
/// not configured or fails.
///
/// **Note**: Not WASM-compatible (uses native reqwest/tokio).
pub struct YahooFinanceProvider {
    connector: yahoo_finance_api::YahooConnector,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        let connector = yahoo_finance_api::YahooConnector::new().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to create connector: {e}"),
        })?;
        Ok(Self { connector })
    }

    /// B3 tickers live under the ".SA" suffix on Yahoo.
    pub fn yahoo_symbol(symbol: &str) -> String {
        let upper = symbol.trim().to_uppercase();
        if upper.ends_with(".SA") {
            upper
        } else {
            format!("{upper}.SA")
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn supported_classes(&self) -> Vec<AssetClass> {
        AssetClass::INSTRUMENT_CLASSES.to_vec()
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        let yahoo_symbol = Self::yahoo_symbol(symbol);
        let resp = self
            .connector
            .get_latest_quotes(&yahoo_symbol, "1d")
            .await
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to fetch latest quote for {yahoo_symbol}: {e}"),
            })?;

        let quote = resp.last_quote().map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {yahoo_symbol}: {e}"),
        })?;

        Ok(quote.close)
    }
}

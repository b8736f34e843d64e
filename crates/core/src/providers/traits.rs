use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::asset_class::AssetClass;

/// Trait abstraction for all quote data providers.
///
/// Each upstream API (brapi, Yahoo Finance) implements this trait, so a
/// provider that stops working is replaced without touching the engine or
/// the market data service.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Which asset classes this provider can quote.
    fn supported_classes(&self) -> Vec<AssetClass>;

    /// Latest unit price of a B3 ticker (e.g. "HGLG11"), in BRL.
    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError>;
}

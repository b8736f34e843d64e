use tracing::debug;

use crate::models::asset_class::AssetClass;
use crate::models::settings::Settings;

use super::brapi::BrapiProvider;
use super::traits::QuoteProvider;
#[cfg(not(target_arch = "wasm32"))]
use super::yahoo_finance::YahooFinanceProvider;

/// Registry of all available quote providers.
///
/// Registration order is fallback order: the market data service asks the
/// first provider that supports a class, then the next one on failure.
pub struct QuoteProviderRegistry {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with all default providers pre-configured.
    pub fn new_with_defaults(settings: &Settings) -> Self {
        let mut registry = Self::new();

        // brapi: primary, requires a token
        if let Some(token) = settings.api_keys.get("brapi") {
            registry.register(Box::new(BrapiProvider::new(
                settings.quotes.brapi_base_url.clone(),
                token.clone(),
                settings.quotes.timeout_secs,
            )));
        }

        // Yahoo Finance: no key needed (fallback)
        // Not available on WASM (uses native reqwest/tokio connectors)
        #[cfg(not(target_arch = "wasm32"))]
        {
            match YahooFinanceProvider::new() {
                Ok(yahoo) => registry.register(Box::new(yahoo)),
                Err(e) => debug!(error = %e, "Yahoo Finance provider unavailable"),
            }
        }

        registry
    }

    /// Register a new quote provider.
    pub fn register(&mut self, provider: Box<dyn QuoteProvider>) {
        debug!(provider = provider.name(), "quote provider registered");
        self.providers.push(provider);
    }

    /// Find the first provider that supports the given class.
    pub fn get_provider_for(&self, class: AssetClass) -> Option<&dyn QuoteProvider> {
        self.providers
            .iter()
            .find(|p| p.supported_classes().contains(&class))
            .map(|p| p.as_ref())
    }

    /// Return ALL providers that support the given class, ordered by registration priority.
    pub fn get_providers_for(&self, class: AssetClass) -> Vec<&dyn QuoteProvider> {
        self.providers
            .iter()
            .filter(|p| p.supported_classes().contains(&class))
            .map(|p| p.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for QuoteProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

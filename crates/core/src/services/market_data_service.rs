use chrono::{Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::errors::{CalculationWarning, CoreError};
use crate::models::asset_class::{AssetClass, ClassSelection};
use crate::models::candidate::{Candidate, CandidateLists, CandidateSpec, CandidateSpecLists};
use crate::models::quote::{CacheStatus, QuoteCache};
use crate::models::settings::Settings;
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches current quotes from API providers with a TTL cache in front.
///
/// Cache strategy:
/// - A quote younger than the TTL is served from the cache.
/// - Anything older is re-fetched and replaces the entry.
/// - `refresh_price` skips the cache for one ticker.
///
/// Owned by the host and driven explicitly; the recommendation engine never
/// performs I/O itself and only sees the priced candidates this produces.
pub struct MarketDataService {
    registry: QuoteProviderRegistry,
    cache: QuoteCache,
}

impl MarketDataService {
    pub fn new(registry: QuoteProviderRegistry, cache_ttl: Duration) -> Self {
        Self {
            registry,
            cache: QuoteCache::new(cache_ttl),
        }
    }

    /// Default providers and cache TTL from settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            QuoteProviderRegistry::new_with_defaults(settings),
            Duration::minutes(settings.quotes.cache_ttl_minutes),
        )
    }

    /// Check if at least one provider is available for a given class.
    pub fn has_provider_for(&self, class: AssetClass) -> bool {
        self.registry.get_provider_for(class).is_some()
    }

    /// Get the names of all providers available for a given class.
    pub fn get_provider_names(&self, class: AssetClass) -> Vec<String> {
        self.registry
            .get_providers_for(class)
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Get the current price of a ticker.
    ///
    /// 1. Fresh cache entry → return it.
    /// 2. Otherwise fetch from the providers (with fallback) → cache → return.
    pub async fn get_price(&mut self, class: AssetClass, symbol: &str) -> Result<f64, CoreError> {
        let now = Utc::now();
        if let Some(price) = self.cache.get_fresh(symbol, now) {
            debug!(ticker = %symbol, price, "quote cache hit");
            return Ok(price);
        }

        debug!(ticker = %symbol, "quote cache miss");
        let price = self.fetch_price(class, symbol).await?;
        self.cache.insert(symbol, price, Utc::now());
        Ok(price)
    }

    /// Drop the cached quote and fetch a new one.
    pub async fn refresh_price(
        &mut self,
        class: AssetClass,
        symbol: &str,
    ) -> Result<f64, CoreError> {
        self.cache.invalidate(symbol);
        self.get_price(class, symbol).await
    }

    /// Prices for several tickers of one class, keyed by uppercase ticker.
    /// Fails on the first ticker that cannot be priced.
    pub async fn get_prices(
        &mut self,
        class: AssetClass,
        symbols: &[&str],
    ) -> Result<HashMap<String, f64>, CoreError> {
        let mut prices = HashMap::with_capacity(symbols.len());
        for symbol in symbols {
            let price = self.get_price(class, symbol).await?;
            prices.insert(symbol.to_uppercase(), price);
        }
        Ok(prices)
    }

    /// Price every listed candidate of a class.
    ///
    /// A listing whose quote cannot be obtained is dropped and reported as an
    /// [`CalculationWarning::UpstreamDataUnavailable`] instead of failing the
    /// whole list.
    pub async fn resolve_candidates(
        &mut self,
        class: AssetClass,
        specs: Vec<CandidateSpec>,
    ) -> (Vec<Candidate>, Vec<CalculationWarning>) {
        let mut candidates = Vec::with_capacity(specs.len());
        let mut warnings = Vec::new();

        for spec in specs {
            match self.get_price(class, &spec.ticker).await {
                Ok(price) => candidates.push(spec.priced(price)),
                Err(e) => warnings.push(
                    CalculationWarning::UpstreamDataUnavailable {
                        ticker: spec.ticker.clone(),
                        class,
                        reason: e.to_string(),
                    }
                    .logged(),
                ),
            }
        }

        info!(
            %class,
            priced = candidates.len(),
            dropped = warnings.len(),
            "candidates resolved"
        );
        (candidates, warnings)
    }

    /// Price the lists of the selected classes. Unselected classes stay
    /// empty and cost no quote requests.
    pub async fn resolve_candidate_lists(
        &mut self,
        mut specs: CandidateSpecLists,
        selection: &ClassSelection,
    ) -> (CandidateLists, Vec<CalculationWarning>) {
        let mut lists = CandidateLists::default();
        let mut warnings = Vec::new();

        for class in AssetClass::INSTRUMENT_CLASSES {
            if !selection.is_selected(class) {
                continue;
            }
            let (candidates, class_warnings) =
                self.resolve_candidates(class, specs.take(class)).await;
            if let Some(list) = lists.for_class_mut(class) {
                *list = candidates;
            }
            warnings.extend(class_warnings);
        }

        (lists, warnings)
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status(Utc::now())
    }

    /// Drop the cached quote of one ticker. Returns whether one was cached.
    pub fn invalidate(&mut self, symbol: &str) -> bool {
        self.cache.invalidate(symbol)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        info!("quote cache cleared");
    }

    /// Internal: fetch a single price from API providers with automatic fallback.
    ///
    /// Tries providers in registration order. If the primary fails (API down,
    /// rate limited, etc.), automatically falls back to the next provider.
    /// Validates that returned prices are finite and positive.
    async fn fetch_price(&self, class: AssetClass, symbol: &str) -> Result<f64, CoreError> {
        let providers = self.registry.get_providers_for(class);
        if providers.is_empty() {
            return Err(CoreError::NoProvider(class.to_string()));
        }

        let mut last_error = None;

        for provider in &providers {
            match provider.get_current_price(symbol).await {
                Ok(price) => {
                    if !price.is_finite() || price <= 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: provider.name().to_string(),
                            message: format!(
                                "Invalid price returned for {symbol}: {price} (must be finite and positive)"
                            ),
                        });
                        continue;
                    }
                    debug!(ticker = %symbol, provider = provider.name(), price, "quote fetched");
                    return Ok(price);
                }
                Err(e) => {
                    debug!(ticker = %symbol, provider = provider.name(), error = %e, "provider failed");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoProvider(class.to_string())))
    }
}

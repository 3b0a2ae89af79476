//! Subcommand implementations.

pub mod cache;
pub mod lookup;
pub mod migrate;
pub mod render;
pub mod validate;

use amazon_product_widget::Result;
use amazon_product_widget::amazon::ProductAdvertisingClient;
use amazon_product_widget::cache::ItemCache;
use amazon_product_widget::config::WidgetConfig;
use amazon_product_widget::store::OptionBackend;

/// Item cache wired to the configured option store and the live API.
pub type LiveCache = ItemCache<OptionBackend, ProductAdvertisingClient>;

/// Build the API client from configuration.
pub fn client(config: &WidgetConfig) -> Result<ProductAdvertisingClient> {
    Ok(ProductAdvertisingClient::new(
        config.amazon.credentials(),
        &config.client_options(),
    )?)
}

/// Open the option store and build an item cache over it.
pub async fn open_cache(config: &WidgetConfig) -> Result<LiveCache> {
    if !config.is_complete() {
        tracing::warn!("AWS credentials incomplete; uncached lookups will return empty records");
    }

    let store = OptionBackend::connect(&config.storage).await?;
    tracing::debug!(backend = store.kind(), "Option store ready");

    Ok(ItemCache::new(store, client(config)?))
}

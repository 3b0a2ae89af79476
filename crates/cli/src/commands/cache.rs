//! Item cache maintenance.
//!
//! # Usage
//!
//! ```bash
//! apw-cli cache clear
//! ```

use amazon_product_widget::Result;
use amazon_product_widget::config::WidgetConfig;

use super::open_cache;

/// Remove every cached record from memory and the option store.
pub async fn clear(config: &WidgetConfig) -> Result<()> {
    let cache = open_cache(config).await?;
    let count = cache.len().await;

    cache.clear().await?;

    tracing::info!(count, "Item cache cleared");
    Ok(())
}

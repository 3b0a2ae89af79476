//! Product lookup command.
//!
//! # Usage
//!
//! ```bash
//! apw-cli lookup 0132350882 0439136369
//! ```
//!
//! Prints one JSON document per ASIN. Records not yet cached are fetched
//! from the Product Advertising API and persisted; a failed fetch prints
//! the identifier-only record.

use amazon_product_widget::Result;
use amazon_product_widget::config::WidgetConfig;
use amazon_product_widget_core::Asin;

use super::open_cache;

/// Look up `asins` through the item cache and print each record.
pub async fn run(config: &WidgetConfig, asins: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let asins = asins
        .iter()
        .map(|value| Asin::parse(value))
        .collect::<Result<Vec<_>, _>>()
        .map_err(amazon_product_widget::Error::from)?;

    let cache = open_cache(config).await?;

    for asin in &asins {
        let record = cache.get(asin).await;
        if record.is_empty() {
            tracing::warn!(asin = %asin, "No product data available");
        }

        let json = serde_json::to_string_pretty(&record)?;
        #[allow(clippy::print_stdout)]
        {
            println!("{json}");
        }
    }

    Ok(())
}

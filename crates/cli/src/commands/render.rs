//! Widget rendering command.
//!
//! # Usage
//!
//! ```bash
//! # Built-in cover shot template, default ASIN
//! apw-cli render
//!
//! # Custom title, list and template
//! apw-cli render -t "Reading" -l "0132350882
//! 0439136369" --template widget.html
//! ```

use std::path::Path;
use std::sync::Arc;

use amazon_product_widget::config::WidgetConfig;
use amazon_product_widget::template::DEFAULT_TEMPLATE;
use amazon_product_widget::widget::{WidgetChrome, WidgetInstance, WidgetRenderer};

use super::open_cache;

/// Render the widget for a randomly chosen ASIN from `list` and print it.
pub async fn run(
    config: &WidgetConfig,
    title: &str,
    list: &str,
    template: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let template = match template {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => DEFAULT_TEMPLATE.to_string(),
    };

    let instance = WidgetInstance::from_form(title, list, &template);
    if instance.asins.is_empty() {
        tracing::warn!("No valid ASINs in list; rendering without a product");
    }

    let renderer = WidgetRenderer::new(
        Arc::new(open_cache(config).await?),
        config.amazon.marketplace,
        config.amazon.associate_tag.clone(),
    );
    let html = renderer.render(&instance, &WidgetChrome::default()).await;

    #[allow(clippy::print_stdout)]
    {
        println!("{html}");
    }

    Ok(())
}

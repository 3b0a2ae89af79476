//! Widget instances and HTML rendering.

use std::sync::Arc;

use amazon_product_widget_core::{Asin, Marketplace};
use rand::seq::IndexedRandom;
use tracing::{debug, instrument, warn};

use crate::cache::{ItemCache, ItemFetcher};
use crate::store::OptionStore;
use crate::template::{DEFAULT_TEMPLATE, render};

/// Display name of the widget, also the default title.
pub const PLUGIN_NAME: &str = "Amazon Product Widget";

/// ASIN shown by a freshly added widget.
pub const DEFAULT_ASIN: &str = "0132350882";

/// Settings of one widget placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetInstance {
    /// Heading shown above the product. Empty hides the heading.
    pub title: String,
    /// Candidate products; one is picked at random per render.
    pub asins: Vec<Asin>,
    /// Product markup. Empty renders only the heading.
    pub template: String,
}

impl Default for WidgetInstance {
    fn default() -> Self {
        Self {
            title: PLUGIN_NAME.to_string(),
            asins: Asin::parse(DEFAULT_ASIN).into_iter().collect(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl WidgetInstance {
    /// Build an instance from submitted settings.
    ///
    /// Markup is stripped from `title` and `list`. The list holds one ASIN
    /// per line; blank lines are dropped and unparseable entries are logged
    /// and skipped. `template` is kept verbatim.
    #[must_use]
    pub fn from_form(title: &str, list: &str, template: &str) -> Self {
        let asins = strip_tags(list)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| match Asin::parse(line) {
                Ok(asin) => Some(asin),
                Err(e) => {
                    warn!(entry = %line, error = %e, "Skipping invalid ASIN");
                    None
                }
            })
            .collect();

        Self {
            title: strip_tags(title),
            asins,
            template: template.to_string(),
        }
    }
}

/// Markup the host page wraps around a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetChrome {
    /// Emitted before everything else.
    pub before_widget: String,
    /// Emitted after everything else.
    pub after_widget: String,
    /// Emitted before the title.
    pub before_title: String,
    /// Emitted after the title.
    pub after_title: String,
}

/// Renders widget instances through an item cache.
pub struct WidgetRenderer<S, F> {
    cache: Arc<ItemCache<S, F>>,
    marketplace: Marketplace,
    associate_tag: String,
}

impl<S: OptionStore, F: ItemFetcher> WidgetRenderer<S, F> {
    /// Create a renderer linking products to `marketplace` under `associate_tag`.
    #[must_use]
    pub fn new(
        cache: Arc<ItemCache<S, F>>,
        marketplace: Marketplace,
        associate_tag: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            marketplace,
            associate_tag: associate_tag.into(),
        }
    }

    /// Render `instance` with a randomly chosen product.
    pub async fn render(&self, instance: &WidgetInstance, chrome: &WidgetChrome) -> String {
        let asin = instance.asins.choose(&mut rand::rng()).cloned();
        self.render_with(instance, chrome, asin.as_ref()).await
    }

    /// Render `instance` showing `asin`.
    pub async fn render_asin(
        &self,
        instance: &WidgetInstance,
        chrome: &WidgetChrome,
        asin: &Asin,
    ) -> String {
        self.render_with(instance, chrome, Some(asin)).await
    }

    #[instrument(skip(self, instance, chrome), fields(asin = ?asin.map(Asin::as_str)))]
    async fn render_with(
        &self,
        instance: &WidgetInstance,
        chrome: &WidgetChrome,
        asin: Option<&Asin>,
    ) -> String {
        let mut html = chrome.before_widget.clone();

        if !instance.title.is_empty() {
            html.push_str(&chrome.before_title);
            html.push_str(&instance.title);
            html.push_str(&chrome.after_title);
        }

        match asin {
            Some(asin) if !instance.template.is_empty() => {
                let record = self.cache.get(asin).await;

                let mut values = record.placeholders();
                values.insert("associate-id".to_string(), self.associate_tag.clone());
                values.insert(
                    "product-url".to_string(),
                    self.marketplace.product_url(asin, &self.associate_tag),
                );
                values.insert(
                    "image-tracking-url".to_string(),
                    self.marketplace.tracking_url(asin, &self.associate_tag),
                );
                values.insert("plugin-name".to_string(), PLUGIN_NAME.to_string());

                html.push_str(&render(&instance.template, &values));
            }
            Some(_) => {}
            None => debug!("Widget has no products configured"),
        }

        html.push_str(&chrome.after_widget);
        html
    }
}

/// Remove markup tags, keeping the text between them.
///
/// An unterminated tag swallows the rest of the input.
#[must_use]
pub fn strip_tags(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match (in_tag, c) {
            (false, '<') => in_tag = true,
            (false, c) => output.push(c),
            (true, '>') => in_tag = false,
            (true, _) => {}
        }
    }

    output
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Books</b> I <i>like</i>"), "Books I like");
        assert_eq!(strip_tags("a < b"), "a ");
        assert_eq!(strip_tags("plain"), "plain");
    }

    #[test]
    fn test_default_instance() {
        let instance = WidgetInstance::default();
        assert_eq!(instance.title, "Amazon Product Widget");
        assert_eq!(instance.asins, vec![Asin::parse("0132350882").unwrap()]);
        assert_eq!(instance.template, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_from_form_splits_and_filters_list() {
        let instance = WidgetInstance::from_form(
            "<em>Reading</em> list",
            "0439136369\r\n\n  <b>0132350882</b>  \nnot-an-asin\n\n",
            "<p>[[ASIN]]</p>",
        );

        assert_eq!(instance.title, "Reading list");
        assert_eq!(
            instance.asins,
            vec![
                Asin::parse("0439136369").unwrap(),
                Asin::parse("0132350882").unwrap(),
            ]
        );
        assert_eq!(instance.template, "<p>[[ASIN]]</p>");
    }

    #[test]
    fn test_from_form_empty_list() {
        let instance = WidgetInstance::from_form("", " \n \n", "");
        assert!(instance.title.is_empty());
        assert!(instance.asins.is_empty());
    }
}

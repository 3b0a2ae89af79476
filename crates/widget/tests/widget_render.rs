//! Integration tests for widget rendering through the item cache.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use amazon_product_widget::amazon::AmazonError;
use amazon_product_widget::cache::{ItemCache, ItemFetcher};
use amazon_product_widget::store::MemoryStore;
use amazon_product_widget::template::DEFAULT_TEMPLATE;
use amazon_product_widget::widget::{WidgetChrome, WidgetInstance, WidgetRenderer};
use amazon_product_widget_core::{Asin, ImageVariant, Marketplace, ProductRecord};

struct BookFetcher;

impl ItemFetcher for BookFetcher {
    async fn fetch_item(&self, asin: &Asin) -> Result<ProductRecord, AmazonError> {
        Ok(ProductRecord {
            author: "Robert C. Martin".to_string(),
            description: "Clean Code".to_string(),
            tiny: ImageVariant {
                url: "http://ecx.images-amazon.com/images/I/tiny.jpg".to_string(),
                width: "84".to_string(),
                height: "110".to_string(),
            },
            ..ProductRecord::empty(asin.clone())
        })
    }
}

struct DownFetcher;

impl ItemFetcher for DownFetcher {
    async fn fetch_item(&self, _asin: &Asin) -> Result<ProductRecord, AmazonError> {
        Err(AmazonError::Status {
            status: 503,
            body: String::new(),
        })
    }
}

fn renderer<F: ItemFetcher>(fetcher: F) -> WidgetRenderer<MemoryStore, F> {
    WidgetRenderer::new(
        Arc::new(ItemCache::new(MemoryStore::new(), fetcher)),
        Marketplace::for_region("de").unwrap(),
        "shop-21",
    )
}

fn chrome() -> WidgetChrome {
    WidgetChrome {
        before_widget: "<li class=\"widget\">".to_string(),
        after_widget: "</li>".to_string(),
        before_title: "<h2>".to_string(),
        after_title: "</h2>".to_string(),
    }
}

fn instance(template: &str) -> WidgetInstance {
    WidgetInstance::from_form("Reading", "0132350882", template)
}

#[tokio::test]
async fn test_render_wraps_title_and_template_in_chrome() {
    let html = renderer(BookFetcher)
        .render(&instance("<p>[[AUTHOR]]: [[DESCRIPTION]]</p>"), &chrome())
        .await;

    assert_eq!(
        html,
        "<li class=\"widget\"><h2>Reading</h2><p>Robert C. Martin: Clean Code</p></li>"
    );
}

#[tokio::test]
async fn test_render_fills_link_placeholders() {
    let asin = Asin::parse("0132350882").unwrap();
    let html = renderer(BookFetcher)
        .render_asin(
            &instance("[[PRODUCT-URL]] [[IMAGE-TRACKING-URL]] [[ASSOCIATE-ID]] [[PLUGIN-NAME]]"),
            &WidgetChrome::default(),
            &asin,
        )
        .await;

    assert_eq!(
        html,
        "Reading\
         http://www.amazon.de/dp/0132350882/?tag=shop-21 \
         http://www.assoc-amazon.de/e/ir?t=shop-21&l=as2&o=3&a=0132350882 \
         shop-21 Amazon Product Widget"
    );
}

#[tokio::test]
async fn test_render_default_template_resolves_every_token() {
    let html = renderer(BookFetcher)
        .render(&WidgetInstance::default(), &chrome())
        .await;

    assert!(!html.contains("[["));
    assert!(html.contains(r#"id="apw_covershot_0132350882""#));
    assert!(html.contains(r#"<img src="http://ecx.images-amazon.com/images/I/tiny.jpg" width="84" height="110""#));
    assert!(html.contains("<b>Robert C. Martin</b> Clean Code"));
}

#[tokio::test]
async fn test_render_survives_upstream_failure() {
    let html = renderer(DownFetcher)
        .render(&instance("[[ASIN]]|[[AUTHOR]]|[[IMAGE-TINY-URL]]"), &chrome())
        .await;

    assert_eq!(html, "<li class=\"widget\"><h2>Reading</h2>0132350882||</li>");
}

#[tokio::test]
async fn test_render_without_title_or_template() {
    let mut widget = WidgetInstance::from_form("", "0132350882", "");
    let html = renderer(BookFetcher).render(&widget, &chrome()).await;
    assert_eq!(html, "<li class=\"widget\"></li>");

    widget.template = DEFAULT_TEMPLATE.to_string();
    widget.asins.clear();
    let html = renderer(BookFetcher).render(&widget, &chrome()).await;
    assert_eq!(html, "<li class=\"widget\"></li>");
}

#[tokio::test]
async fn test_render_picks_from_configured_list() {
    let widget = WidgetInstance::from_form("", "0132350882\n0439136369\nB00005N5PF", "[[ASIN]]");
    let renderer = renderer(BookFetcher);

    for _ in 0..20 {
        let html = renderer.render(&widget, &WidgetChrome::default()).await;
        let shown = Asin::parse(&html).unwrap();
        assert!(widget.asins.contains(&shown));
    }
}

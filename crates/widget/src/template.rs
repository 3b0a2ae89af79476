//! `[[TOKEN]]` placeholder templates.

use std::collections::BTreeMap;

/// Stock widget markup: cover image linked to the product page, a tracking
/// pixel, and the author and title.
pub const DEFAULT_TEMPLATE: &str = r#"<div class="apw_covershot" id="apw_covershot_[[ASIN]]">
<a href="[[PRODUCT-URL]]" title="Picture of [[DESCRIPTION]]" rel="external" target="_blank">
<img src="[[IMAGE-TINY-URL]]" width="[[IMAGE-TINY-WIDTH]]" height="[[IMAGE-TINY-HEIGHT]]" border="0" alt="Picture of [[DESCRIPTION]]" /></a><img src="[[IMAGE-TRACKING-URL]]" border="0" width="1" height="1" /></div><div class="apw_description"><a href="[[PRODUCT-URL]]" rel="external" target="_blank" id="apw_description_[[ASIN]]">
<b>[[AUTHOR]]</b> [[DESCRIPTION]]</a></div>"#;

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// Replace every `[[NAME]]` in `template` with `values[name]`.
///
/// Keys of `values` are upper-cased before matching, so `image-tiny-url`
/// fills `[[IMAGE-TINY-URL]]`. Substituted values are not scanned again.
/// Unknown tokens and an unterminated `[[` are left as they are.
#[must_use]
pub fn render(template: &str, values: &BTreeMap<String, String>) -> String {
    let lookup: BTreeMap<String, &str> = values
        .iter()
        .map(|(key, value)| (key.to_uppercase(), value.as_str()))
        .collect();

    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((before, after_open)) = rest.split_once(OPEN) {
        output.push_str(before);

        let replacement = after_open
            .split_once(CLOSE)
            .and_then(|(name, after_close)| Some((*lookup.get(name)?, after_close)));

        match replacement {
            Some((value, after_close)) => {
                output.push_str(value);
                rest = after_close;
            }
            None => {
                output.push_str(OPEN);
                rest = after_open;
            }
        }
    }

    output.push_str(rest);
    output
}

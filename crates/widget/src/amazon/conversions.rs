//! Mapping between API responses and domain types.

use std::collections::BTreeMap;

use amazon_product_widget_core::{Asin, ImageVariant, ProductRecord};

use super::{AmazonError, XmlElement};

/// Response group with titles, authors and image sets.
pub const RESPONSE_GROUP_MEDIUM: &str = "Medium";

/// Smallest response group, used for credential checks.
pub const RESPONSE_GROUP_SMALL: &str = "Small";

const ITEM: [&str; 2] = ["Items", "Item"];
const IMAGE_SET: [&str; 2] = ["ImageSets", "ImageSet"];

/// Parameters of an `ItemLookup` operation.
#[must_use]
pub fn item_lookup_parameters(asin: &Asin, response_group: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Operation".to_string(), "ItemLookup".to_string()),
        ("ItemId".to_string(), asin.to_string()),
        ("ResponseGroup".to_string(), response_group.to_string()),
    ])
}

/// Returns `true` if the service flagged the request as valid.
#[must_use]
pub fn request_is_valid(response: &XmlElement) -> bool {
    response.text_at(&["Items", "Request", "IsValid"]) == "True"
}

/// First error message in the response, if any.
///
/// Errors appear either at the top level of an `*ErrorResponse` document or
/// inside `Items/Request/Errors`.
#[must_use]
pub fn upstream_error(response: &XmlElement) -> Option<String> {
    let error = response
        .path(&["Error"])
        .or_else(|| response.path(&["Items", "Request", "Errors", "Error"]))?;

    let code = error.text_at(&["Code"]);
    let message = error.text_at(&["Message"]);
    Some(match (code.is_empty(), message.is_empty()) {
        (false, false) => format!("{code}: {message}"),
        (false, true) => code.to_string(),
        (true, false) => message.to_string(),
        (true, true) => "unspecified error".to_string(),
    })
}

/// Map an `ItemLookup` response into a product record.
///
/// # Errors
///
/// Returns `AmazonError::UpstreamInvalid` if the response carries an error,
/// even alongside an item, and `AmazonError::ItemNotFound` if it carries no
/// item.
pub fn product_record_from_response(
    asin: &Asin,
    response: &XmlElement,
) -> Result<ProductRecord, AmazonError> {
    if let Some(error) = upstream_error(response) {
        return Err(AmazonError::UpstreamInvalid(error));
    }

    let item = response
        .path(&ITEM)
        .ok_or_else(|| AmazonError::ItemNotFound(asin.clone()))?;

    let image = |size: &str| {
        item.path(&IMAGE_SET)
            .and_then(|set| set.child(size))
            .map(|image| ImageVariant {
                url: image.text_at(&["URL"]).to_string(),
                width: image.text_at(&["Width"]).to_string(),
                height: image.text_at(&["Height"]).to_string(),
            })
            .unwrap_or_default()
    };

    Ok(ProductRecord {
        asin: asin.clone(),
        author: item.text_at(&["ItemAttributes", "Author"]).to_string(),
        description: item.text_at(&["ItemAttributes", "Title"]).to_string(),
        small: image("SmallImage"),
        tiny: image("TinyImage"),
        medium: image("MediumImage"),
        large: image("LargeImage"),
    })
}

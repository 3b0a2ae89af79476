//! Product attribute records.
//!
//! A [`ProductRecord`] is the flat set of attributes the widget displays for
//! one ASIN. Records are produced whole from a single upstream lookup and are
//! never patched field by field.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::asin::Asin;

/// One image size returned for a product.
///
/// Dimensions are kept as the strings the upstream service returned so they
/// can be dropped straight into `width="..."` attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageVariant {
    /// Image location.
    pub url: String,
    /// Width in pixels.
    pub width: String,
    /// Height in pixels.
    pub height: String,
}

impl ImageVariant {
    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.url.is_empty() && self.width.is_empty() && self.height.is_empty()
    }
}

/// Image sizes in the order the placeholders are emitted.
pub const IMAGE_SIZES: [&str; 4] = ["small", "tiny", "medium", "large"];

/// Attributes of a single product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// The identifier this record was requested for.
    pub asin: Asin,
    /// Author (or artist, brand) of the product.
    #[serde(default)]
    pub author: String,
    /// Product title.
    #[serde(default)]
    pub description: String,
    /// Small image.
    #[serde(default)]
    pub small: ImageVariant,
    /// Thumbnail used by the stock template.
    #[serde(default)]
    pub tiny: ImageVariant,
    /// Medium image.
    #[serde(default)]
    pub medium: ImageVariant,
    /// Large image.
    #[serde(default)]
    pub large: ImageVariant,
}

impl ProductRecord {
    /// Create a record that carries only the identifier.
    ///
    /// Used when no product data could be obtained, so templates can still
    /// reference `[[ASIN]]`.
    #[must_use]
    pub fn empty(asin: Asin) -> Self {
        Self {
            asin,
            author: String::new(),
            description: String::new(),
            small: ImageVariant::default(),
            tiny: ImageVariant::default(),
            medium: ImageVariant::default(),
            large: ImageVariant::default(),
        }
    }

    /// Returns `true` if no attribute besides the identifier is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.author.is_empty()
            && self.description.is_empty()
            && self.images().iter().all(|(_, image)| image.is_empty())
    }

    /// Image variants paired with their size name.
    #[must_use]
    pub const fn images(&self) -> [(&'static str, &ImageVariant); 4] {
        [
            ("small", &self.small),
            ("tiny", &self.tiny),
            ("medium", &self.medium),
            ("large", &self.large),
        ]
    }

    /// Flatten the record into template placeholder values.
    ///
    /// Keys are lower-case (`image-tiny-url`); the template renderer
    /// upper-cases them to match `[[IMAGE-TINY-URL]]`.
    #[must_use]
    pub fn placeholders(&self) -> BTreeMap<String, String> {
        let mut values = BTreeMap::new();
        values.insert("asin".to_string(), self.asin.to_string());
        values.insert("author".to_string(), self.author.clone());
        values.insert("description".to_string(), self.description.clone());

        for (size, image) in self.images() {
            values.insert(format!("image-{size}-url"), image.url.clone());
            values.insert(format!("image-{size}-width"), image.width.clone());
            values.insert(format!("image-{size}-height"), image.height.clone());
        }

        values
    }
}

//! Regional Amazon storefronts.
//!
//! The widget links every product to the storefront of the configured region
//! and embeds the associate tracking pixel for that storefront. The URL
//! templates use the same `[[TOKEN]]` syntax as widget templates.

use super::asin::Asin;

/// Template for product detail links.
const PRODUCT_URL: &str = "http://www.amazon.[[TLD]]/dp/[[ASIN]]/?tag=[[ASSOCIATE-ID]]";

/// Template for the associate tracking pixel.
const TRACKING_URL: &str =
    "http://www.assoc-amazon.[[TLD]]/e/ir?t=[[ASSOCIATE-ID]]&l=as2&o=3&a=[[ASIN]]";

/// A regional Amazon storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marketplace {
    /// Short key used in configuration (`de`, `us`, ...).
    pub key: &'static str,
    /// Locale of the storefront.
    pub lang_iso_code: &'static str,
    /// Marketplace code as used by the associate program.
    pub marketplace: &'static str,
    /// Human readable name.
    pub name: &'static str,
    /// Suffix of associate tags registered for this storefront.
    pub suffix: &'static str,
    /// Top level domain of the storefront (`de`, `co.uk`, `com`).
    pub tld: &'static str,
    /// Associate program sign-up page.
    pub affiliate_url: &'static str,
}

/// All supported storefronts.
pub const MARKETPLACES: [Marketplace; 9] = [
    Marketplace {
        key: "ca",
        lang_iso_code: "en_CA",
        marketplace: "CA",
        name: "Amazon Canada",
        suffix: "-20",
        tld: "ca",
        affiliate_url: "https://associates.amazon.ca/",
    },
    Marketplace {
        key: "cn",
        lang_iso_code: "zh_CN",
        marketplace: "CN",
        name: "Amazon China",
        suffix: "-23",
        tld: "cn",
        affiliate_url: "https://associates.amazon.cn/",
    },
    Marketplace {
        key: "de",
        lang_iso_code: "de_DE",
        marketplace: "DE",
        name: "Amazon Germany",
        suffix: "-21",
        tld: "de",
        affiliate_url: "https://partnernet.amazon.de/",
    },
    Marketplace {
        key: "es",
        lang_iso_code: "es_ES",
        marketplace: "ES",
        name: "Amazon Spain",
        suffix: "-21",
        tld: "es",
        affiliate_url: "https://afiliados.amazon.es/",
    },
    Marketplace {
        key: "fr",
        lang_iso_code: "fr_FR",
        marketplace: "FR",
        name: "Amazon France",
        suffix: "-21",
        tld: "fr",
        affiliate_url: "https://partenaires.amazon.fr/",
    },
    Marketplace {
        key: "it",
        lang_iso_code: "it_IT",
        marketplace: "IT",
        name: "Amazon Italia",
        suffix: "-21",
        tld: "it",
        affiliate_url: "https://programma-affiliazione.amazon.it/",
    },
    Marketplace {
        key: "jp",
        lang_iso_code: "ja_JP",
        marketplace: "JP",
        name: "Amazon Japan",
        suffix: "-22",
        tld: "co.jp",
        affiliate_url: "https://affiliate.amazon.co.jp/",
    },
    Marketplace {
        key: "uk",
        lang_iso_code: "en_UK",
        marketplace: "UK",
        name: "Amazon United Kingdom",
        suffix: "-21",
        tld: "co.uk",
        affiliate_url: "https://affiliate-program.amazon.co.uk/",
    },
    Marketplace {
        key: "us",
        lang_iso_code: "en_US",
        marketplace: "US",
        name: "Amazon USA",
        suffix: "-20",
        tld: "com",
        affiliate_url: "https://affiliate-program.amazon.com/",
    },
];

impl Marketplace {
    /// Find the storefront for a configured region.
    ///
    /// Accepts either the storefront key (`uk`) or its top level domain
    /// (`co.uk`), case-insensitively.
    #[must_use]
    pub fn for_region(region: &str) -> Option<Self> {
        let region = region.trim();
        MARKETPLACES
            .iter()
            .find(|m| m.key.eq_ignore_ascii_case(region) || m.tld.eq_ignore_ascii_case(region))
            .copied()
    }

    /// Storefront home page.
    #[must_use]
    pub fn site_url(&self) -> String {
        format!("http://www.amazon.{}/", self.tld)
    }

    /// Product detail link carrying the associate tag.
    #[must_use]
    pub fn product_url(&self, asin: &Asin, associate_tag: &str) -> String {
        self.expand(PRODUCT_URL, asin, associate_tag)
    }

    /// Associate tracking pixel URL.
    #[must_use]
    pub fn tracking_url(&self, asin: &Asin, associate_tag: &str) -> String {
        self.expand(TRACKING_URL, asin, associate_tag)
    }

    fn expand(&self, template: &str, asin: &Asin, associate_tag: &str) -> String {
        template
            .replace("[[TLD]]", self.tld)
            .replace("[[ASSOCIATE-ID]]", associate_tag)
            .replace("[[ASIN]]", asin.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_for_region_by_key_and_tld() {
        assert_eq!(Marketplace::for_region("uk").unwrap().tld, "co.uk");
        assert_eq!(Marketplace::for_region("co.uk").unwrap().key, "uk");
        assert_eq!(Marketplace::for_region("com").unwrap().key, "us");
        assert_eq!(Marketplace::for_region("DE").unwrap().name, "Amazon Germany");
        assert!(Marketplace::for_region("xx").is_none());
    }

    #[test]
    fn test_product_url() {
        let de = Marketplace::for_region("de").unwrap();
        let asin = Asin::parse("0132350882").unwrap();
        assert_eq!(
            de.product_url(&asin, "shop-21"),
            "http://www.amazon.de/dp/0132350882/?tag=shop-21"
        );
    }

    #[test]
    fn test_tracking_url() {
        let jp = Marketplace::for_region("jp").unwrap();
        let asin = Asin::parse("0132350882").unwrap();
        assert_eq!(
            jp.tracking_url(&asin, "shop-22"),
            "http://www.assoc-amazon.co.jp/e/ir?t=shop-22&l=as2&o=3&a=0132350882"
        );
    }

    #[test]
    fn test_site_url() {
        let ca = Marketplace::for_region("ca").unwrap();
        assert_eq!(ca.site_url(), "http://www.amazon.ca/");
    }
}

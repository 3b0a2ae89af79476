//! Amazon Product Advertising API client.
//!
//! # Architecture
//!
//! - Requests are signed with HMAC-SHA256 over a canonical, sorted query
//!   (see [`signing`]); the canonical form must match the service byte for
//!   byte or every request is rejected
//! - Responses are parsed once into an owned [`XmlElement`] tree
//! - The client does not interpret API-level error fields and never retries;
//!   [`conversions`] maps responses into product records
//!
//! # Example
//!
//! ```rust,ignore
//! use amazon_product_widget::amazon::{ClientOptions, Credentials, ProductAdvertisingClient};
//!
//! let client = ProductAdvertisingClient::new(credentials, &ClientOptions::default())?;
//!
//! let record = client.lookup_item(&asin, "Medium").await?;
//! println!("{}", record.description);
//! ```

mod client;
pub mod conversions;
mod credentials;
pub mod signing;
mod xml;

pub use client::{ClientOptions, ProductAdvertisingClient};
pub use credentials::Credentials;
pub use signing::SignedRequest;
pub use xml::XmlElement;

use amazon_product_widget_core::Asin;
use thiserror::Error;

/// Errors that can occur when talking to the Product Advertising API.
#[derive(Debug, Error)]
pub enum AmazonError {
    /// The HTTP request could not be completed.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP status {status}: {body}")]
    Status {
        /// Response status code.
        status: u16,
        /// Beginning of the response body.
        body: String,
    },

    /// The response body is not well-formed XML.
    #[error("XML parse error: {0}")]
    Parse(#[from] roxmltree::Error),

    /// The response is well-formed but the service rejected the request.
    #[error("Upstream rejected request: {0}")]
    UpstreamInvalid(String),

    /// The response contains no item for the requested identifier.
    #[error("Item not found: {0}")]
    ItemNotFound(Asin),

    /// The caller supplied a parameter the signer injects itself.
    #[error("Reserved parameter supplied by caller: {0}")]
    ReservedParameter(String),

    /// The signing key was rejected by the MAC implementation.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl AmazonError {
    /// Returns `true` for failures of the HTTP exchange itself.
    ///
    /// Non-success statuses count as transport failures: the request never
    /// produced a document to inspect.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_amazon_error_display() {
        let err = AmazonError::ItemNotFound(Asin::parse("0439136369").unwrap());
        assert_eq!(err.to_string(), "Item not found: 0439136369");

        let err = AmazonError::ReservedParameter("Timestamp".to_string());
        assert_eq!(
            err.to_string(),
            "Reserved parameter supplied by caller: Timestamp"
        );
    }

    #[test]
    fn test_status_error_is_transport() {
        let err = AmazonError::Status {
            status: 503,
            body: "Service Unavailable".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.to_string(), "HTTP status 503: Service Unavailable");
    }

    #[test]
    fn test_parse_error_is_not_transport() {
        let err = AmazonError::from(roxmltree::Document::parse("<a>").unwrap_err());
        assert!(!err.is_transport());
        assert!(err.to_string().starts_with("XML parse error:"));
    }
}

//! Crate-level error type.
//!
//! Each module has its own error enum; `Error` unifies them for callers
//! that drive several modules at once, such as the CLI.

use amazon_product_widget_core::AsinError;
use thiserror::Error;

use crate::amazon::AmazonError;
use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Product Advertising API failure.
    #[error("Amazon error: {0}")]
    Amazon(#[from] AmazonError),

    /// Option store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Item cache failure.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Invalid or incomplete configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Credentials were rejected.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed product identifier.
    #[error("Invalid ASIN: {0}")]
    Asin(#[from] AsinError),
}

impl Error {
    /// Returns `true` for errors the operator fixes through configuration
    /// rather than errors worth reporting to error tracking.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Asin(_)
                | Self::Validation(
                    ValidationError::Incomplete | ValidationError::UpstreamInvalid(_)
                )
        )
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_wraps_source() {
        let err = Error::from(ValidationError::Incomplete);
        assert_eq!(
            err.to_string(),
            "Validation error: AWS credentials incomplete: public and private key are required"
        );
    }

    #[test]
    fn test_is_configuration() {
        assert!(Error::from(ValidationError::Incomplete).is_configuration());
        assert!(Error::from(AsinError::Empty).is_configuration());
        assert!(
            !Error::from(AmazonError::Status {
                status: 500,
                body: String::new(),
            })
            .is_configuration()
        );
    }
}

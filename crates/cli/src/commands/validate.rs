//! Credential check command.
//!
//! # Usage
//!
//! ```bash
//! apw-cli validate
//! ```
//!
//! # Environment Variables
//!
//! - `APW_AWS_ACCESS_KEY_ID` - Access key to check
//! - `APW_AWS_SECRET_ACCESS_KEY` - Secret key to check

use amazon_product_widget::Result;
use amazon_product_widget::config::WidgetConfig;
use amazon_product_widget::store::OptionBackend;
use amazon_product_widget::validation::{CredentialValidator, ValidationOutcome};

use super::client;

/// Validate the configured key pair against the live API.
pub async fn run(config: &WidgetConfig) -> Result<()> {
    let store = OptionBackend::connect(&config.storage).await?;
    let validator = CredentialValidator::new(client(config)?, store);

    match validator.validate(&config.amazon.credentials()).await? {
        ValidationOutcome::Verified => tracing::info!(
            marketplace = config.amazon.marketplace.name,
            "Credentials verified"
        ),
        ValidationOutcome::Cached => {
            tracing::info!("Credentials unchanged since the last successful check");
        }
    }

    Ok(())
}

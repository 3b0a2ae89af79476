//! Credential validation against the live API.
//!
//! A key pair is checked by looking up a known item with the smallest
//! response group. Once a pair passes, its fingerprint is stored under
//! `aws_last_valid_credentials` and the pair is not checked again until
//! either key changes.

use amazon_product_widget_core::{Asin, AsinError};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::amazon::conversions::{
    RESPONSE_GROUP_SMALL, item_lookup_parameters, request_is_valid, upstream_error,
};
use crate::amazon::{AmazonError, Credentials, ProductAdvertisingClient};
use crate::store::{OptionStore, StoreError, option_keys};

/// Item looked up to prove a key pair works.
pub const PROBE_ASIN: &str = "0439136369";

/// Result of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The API accepted a probe request signed with the credentials.
    Verified,
    /// The same key pair passed before; no request was sent.
    Cached,
}

/// Reasons a key pair is rejected.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Public or private key is missing.
    #[error("AWS credentials incomplete: public and private key are required")]
    Incomplete,

    /// The API rejected the credentials.
    #[error("AWS credentials rejected: {0}")]
    UpstreamInvalid(String),

    /// The probe request failed for another reason.
    #[error("validation request failed: {0}")]
    Amazon(#[from] AmazonError),

    /// The built-in probe ASIN failed to parse. Not a credential problem.
    #[error("probe ASIN is invalid: {0}")]
    InvalidProbe(#[from] AsinError),

    /// The fingerprint could not be read or stored.
    #[error("option store error: {0}")]
    Store(#[from] StoreError),
}

/// Checks key pairs and remembers the last one that passed.
#[derive(Debug)]
pub struct CredentialValidator<S> {
    client: ProductAdvertisingClient,
    store: S,
}

impl<S: OptionStore> CredentialValidator<S> {
    /// Create a validator sending probes through `client`.
    #[must_use]
    pub const fn new(client: ProductAdvertisingClient, store: S) -> Self {
        Self { client, store }
    }

    /// The client probes are sent through.
    #[must_use]
    pub const fn client(&self) -> &ProductAdvertisingClient {
        &self.client
    }

    /// The store holding the last valid fingerprint.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Validate `credentials`.
    ///
    /// On success the credentials become the client's active credentials.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Incomplete` if a key is missing,
    /// `ValidationError::UpstreamInvalid` if the API rejects the pair, and
    /// `ValidationError::Amazon` if the probe cannot be completed.
    #[instrument(skip(self, credentials), fields(region = %credentials.region, public_key = %credentials.public_key))]
    pub async fn validate(
        &self,
        credentials: &Credentials,
    ) -> Result<ValidationOutcome, ValidationError> {
        if !credentials.is_complete() {
            return Err(ValidationError::Incomplete);
        }

        let fingerprint = credentials.fingerprint();
        let last_valid = self.store.get(option_keys::LAST_VALID_CREDENTIALS).await?;
        if last_valid.as_deref() == Some(fingerprint.as_str()) {
            info!("Credentials unchanged since last validation");
            self.client.set_credentials(credentials.clone());
            return Ok(ValidationOutcome::Cached);
        }

        let probe = Asin::parse(PROBE_ASIN)?;
        let response = self
            .client
            .send_as(credentials, &item_lookup_parameters(&probe, RESPONSE_GROUP_SMALL))
            .await
            .map_err(|e| match e {
                AmazonError::Status {
                    status: status @ (400 | 401 | 403),
                    body,
                } => ValidationError::UpstreamInvalid(format!("HTTP {status}: {body}")),
                other => ValidationError::Amazon(other),
            })?;

        if !request_is_valid(&response) {
            let reason =
                upstream_error(&response).unwrap_or_else(|| "request flagged invalid".to_string());
            warn!(reason = %reason, "Credentials rejected");
            return Err(ValidationError::UpstreamInvalid(reason));
        }

        self.store
            .set(option_keys::LAST_VALID_CREDENTIALS, &fingerprint)
            .await?;
        self.client.set_credentials(credentials.clone());
        info!("Credentials verified");

        Ok(ValidationOutcome::Verified)
    }
}

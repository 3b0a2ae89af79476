//! HTTP client for the Product Advertising API.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use amazon_product_widget_core::{Asin, ProductRecord};
use chrono::Utc;
use tracing::{debug, error, instrument};
use url::Url;

use super::conversions::{
    RESPONSE_GROUP_MEDIUM, item_lookup_parameters, product_record_from_response,
};
use super::{AmazonError, Credentials, SignedRequest, XmlElement};
use crate::cache::ItemFetcher;

/// Transport settings for [`ProductAdvertisingClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Total request timeout.
    pub timeout: Duration,
    /// Send requests here instead of the regional host.
    ///
    /// The signature still covers the regional host, so this is only
    /// useful against test servers.
    pub endpoint_override: Option<Url>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            endpoint_override: None,
        }
    }
}

/// Client for the Product Advertising API.
///
/// Cheap to clone; clones share the connection pool and credentials.
#[derive(Clone)]
pub struct ProductAdvertisingClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: reqwest::Client,
    credentials: RwLock<Credentials>,
    endpoint_override: Option<Url>,
}

impl std::fmt::Debug for ProductAdvertisingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductAdvertisingClient")
            .field("credentials", &self.credentials())
            .field("endpoint_override", &self.inner.endpoint_override)
            .finish_non_exhaustive()
    }
}

impl ProductAdvertisingClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `AmazonError::Transport` if the HTTP client cannot be built.
    pub fn new(credentials: Credentials, options: &ClientOptions) -> Result<Self, AmazonError> {
        let mut builder = reqwest::Client::builder().timeout(options.timeout);
        if options.endpoint_override.is_some() {
            builder = builder.no_proxy();
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                client: builder.build()?,
                credentials: RwLock::new(credentials),
                endpoint_override: options.endpoint_override.clone(),
            }),
        })
    }

    /// Current credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.inner
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the credentials used for subsequent requests.
    ///
    /// Requests already in flight keep the credentials they were signed with.
    pub fn set_credentials(&self, credentials: Credentials) {
        *self
            .inner
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    /// Sign and send `parameters` with the current credentials.
    ///
    /// # Errors
    ///
    /// See [`Self::send_as`].
    pub async fn send(
        &self,
        parameters: &BTreeMap<String, String>,
    ) -> Result<XmlElement, AmazonError> {
        let credentials = self.credentials();
        self.send_as(&credentials, parameters).await
    }

    /// Sign `parameters` with `credentials`, send them, and parse the response.
    ///
    /// API-level error fields in the document are not inspected.
    ///
    /// # Errors
    ///
    /// Returns `AmazonError::ReservedParameter` for caller-supplied signer
    /// keys, `AmazonError::Transport` or `AmazonError::Status` if the exchange
    /// fails, and `AmazonError::Parse` if the body is not XML.
    #[instrument(skip(self, credentials, parameters), fields(operation = parameters.get("Operation").map_or("", String::as_str)))]
    pub async fn send_as(
        &self,
        credentials: &Credentials,
        parameters: &BTreeMap<String, String>,
    ) -> Result<XmlElement, AmazonError> {
        let request = SignedRequest::build(credentials, parameters, Utc::now())?;

        let url = match &self.inner.endpoint_override {
            Some(endpoint) => format!(
                "{}{}",
                endpoint.as_str().trim_end_matches('/'),
                request.path_and_query()
            ),
            None => request.url(),
        };

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Product Advertising API returned non-success status"
            );
            return Err(AmazonError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        XmlElement::parse(&body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Product Advertising API response"
            );
            AmazonError::Parse(e)
        })
    }

    /// Look up a single item.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Self::send`], plus
    /// `AmazonError::UpstreamInvalid` or `AmazonError::ItemNotFound` if the
    /// response carries no usable item.
    #[instrument(skip(self), fields(asin = %asin))]
    pub async fn lookup_item(
        &self,
        asin: &Asin,
        response_group: &str,
    ) -> Result<ProductRecord, AmazonError> {
        let response = self
            .send(&item_lookup_parameters(asin, response_group))
            .await?;
        let record = product_record_from_response(asin, &response)?;

        debug!(description = %record.description, "Item looked up");

        Ok(record)
    }
}

impl ItemFetcher for ProductAdvertisingClient {
    async fn fetch_item(&self, asin: &Asin) -> Result<ProductRecord, AmazonError> {
        self.lookup_item(asin, RESPONSE_GROUP_MEDIUM).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> ProductAdvertisingClient {
        ProductAdvertisingClient::new(
            Credentials::new("de", "public", "private", "tag-21"),
            &ClientOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_default_options() {
        let options = ClientOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert!(options.endpoint_override.is_none());
    }

    #[test]
    fn test_set_credentials_is_shared_by_clones() {
        let client = client();
        let clone = client.clone();

        client.set_credentials(Credentials::new("com", "rotated", "secret", "other-20"));

        assert_eq!(clone.credentials().public_key, "rotated");
        assert_eq!(clone.credentials().host(), "ecs.amazonaws.com");
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let debug_output = format!("{:?}", client());
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("\"private\""));
    }

    #[tokio::test]
    async fn test_reserved_parameter_fails_before_sending() {
        let params = BTreeMap::from([("Timestamp".to_string(), "now".to_string())]);
        let err = client().send(&params).await.unwrap_err();
        assert!(matches!(err, AmazonError::ReservedParameter(key) if key == "Timestamp"));
    }
}

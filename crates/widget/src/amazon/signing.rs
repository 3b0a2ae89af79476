//! Request signing for the Product Advertising API.
//!
//! # Algorithm
//!
//! 1. Inject `Service`, `AWSAccessKeyId`, `AssociateTag`, `Timestamp` and
//!    `Version` into the caller's parameters
//! 2. Sort all parameters by key (byte order)
//! 3. Percent-encode keys and values with the RFC 3986 unreserved set
//!    (space becomes `%20`, `~` stays literal) and join as `k=v&k=v`
//! 4. Sign `GET\n<host>\n/onca/xml\n<query>` with HMAC-SHA256 keyed by the
//!    private key, base64 the MAC and percent-encode it again
//!
//! See: <https://docs.aws.amazon.com/AWSECommerceService/latest/DG/rest-signature.html>

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::ExposeSecret;
use sha2::Sha256;

use super::{AmazonError, Credentials};

type HmacSha256 = Hmac<Sha256>;

/// Service name sent with every request.
pub const SERVICE: &str = "AWSECommerceService";

/// API version sent with every request.
pub const API_VERSION: &str = "2009-03-31";

/// Request path of the REST endpoint.
pub const REQUEST_URI: &str = "/onca/xml";

const METHOD: &str = "GET";

/// Parameters the signer owns. Callers may not supply them.
pub const RESERVED_PARAMETERS: [&str; 6] = [
    "AWSAccessKeyId",
    "AssociateTag",
    "Service",
    "Signature",
    "Timestamp",
    "Version",
];

/// A fully signed request, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    host: String,
    canonical_query: String,
    signature: String,
}

impl SignedRequest {
    /// Sign `parameters` with `credentials` as of `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns `AmazonError::ReservedParameter` if the caller supplied a key
    /// the signer injects, or `AmazonError::Signing` if the MAC cannot be
    /// keyed.
    pub fn build(
        credentials: &Credentials,
        parameters: &BTreeMap<String, String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, AmazonError> {
        if let Some(reserved) = parameters
            .keys()
            .find(|key| RESERVED_PARAMETERS.contains(&key.as_str()))
        {
            return Err(AmazonError::ReservedParameter(reserved.clone()));
        }

        let mut parameters = parameters.clone();
        parameters.insert("Service".to_string(), SERVICE.to_string());
        parameters.insert(
            "AWSAccessKeyId".to_string(),
            credentials.public_key.clone(),
        );
        parameters.insert(
            "AssociateTag".to_string(),
            credentials.associate_tag.clone(),
        );
        parameters.insert("Timestamp".to_string(), format_timestamp(timestamp));
        parameters.insert("Version".to_string(), API_VERSION.to_string());

        let host = credentials.host();
        let canonical_query = canonical_query(&parameters);
        let string_to_sign = string_to_sign(&host, &canonical_query);
        let signature = encode(&sign(
            &string_to_sign,
            credentials.private_key.expose_secret(),
        )?);

        Ok(Self {
            host,
            canonical_query,
            signature,
        })
    }

    /// API host the request was signed for.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Sorted, encoded query without the signature.
    #[must_use]
    pub fn canonical_query(&self) -> &str {
        &self.canonical_query
    }

    /// The exact string that was signed.
    #[must_use]
    pub fn string_to_sign(&self) -> String {
        string_to_sign(&self.host, &self.canonical_query)
    }

    /// Percent-encoded base64 signature.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Path and query including the signature, e.g. `/onca/xml?...&Signature=...`.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        format!(
            "{REQUEST_URI}?{}&Signature={}",
            self.canonical_query, self.signature
        )
    }

    /// Complete request URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}{}", self.host, self.path_and_query())
    }
}

/// Percent-encode a key or value.
///
/// Everything outside `A-Z a-z 0-9 - _ . ~` is escaped; this is the
/// encoding the service canonicalizes with, not form encoding.
#[must_use]
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Build the canonical query from already-sorted parameters.
#[must_use]
pub fn canonical_query(parameters: &BTreeMap<String, String>) -> String {
    parameters
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compose the string to sign for `host` and `canonical_query`.
#[must_use]
pub fn string_to_sign(host: &str, canonical_query: &str) -> String {
    format!("{METHOD}\n{host}\n{REQUEST_URI}\n{canonical_query}")
}

/// Base64 HMAC-SHA256 of `message` keyed by `secret`.
///
/// # Errors
///
/// Returns `AmazonError::Signing` if the key is rejected.
pub fn sign(message: &str, secret: &str) -> Result<String, AmazonError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AmazonError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// UTC timestamp with second precision, e.g. `2020-01-01T00:00:00Z`.
#[must_use]
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

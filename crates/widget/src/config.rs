//! Widget configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `APW_AWS_ASSOCIATE_TAG` - Associate tag credited for product links
//!
//! ## Optional
//! - `APW_AWS_REGION` - Storefront key or top level domain (default: de)
//! - `APW_AWS_ACCESS_KEY_ID` - Product Advertising API access key
//! - `APW_AWS_SECRET_ACCESS_KEY` - Product Advertising API secret key (high entropy)
//! - `APW_HTTP_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `APW_DATABASE_URL` - `PostgreSQL` connection string; selects the database option store
//! - `APW_OPTIONS_FILE` - Options file used without a database (default: .apw/options.json);
//!   `:memory:` keeps options in memory for dry runs
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! Without both AWS keys the widget still renders, but every lookup misses
//! and produces an empty record.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use amazon_product_widget_core::Marketplace;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::amazon::{ClientOptions, Credentials};

const DEFAULT_REGION: &str = "de";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_OPTIONS_FILE: &str = ".apw/options.json";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "enter-",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    /// A variable is set but cannot be used.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    /// A secret looks like a placeholder or is too predictable.
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Complete widget configuration.
#[derive(Debug, Clone)]
pub struct WidgetConfig {
    /// Product Advertising API settings
    pub amazon: AmazonConfig,
    /// Option store settings
    pub storage: StorageConfig,
    /// HTTP request timeout
    pub http_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Product Advertising API configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct AmazonConfig {
    /// Storefront the widget links to
    pub marketplace: Marketplace,
    /// Access key id, if configured
    pub access_key_id: Option<String>,
    /// Secret access key, if configured
    pub secret_access_key: Option<SecretString>,
    /// Associate tag
    pub associate_tag: String,
}

impl std::fmt::Debug for AmazonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmazonConfig")
            .field("marketplace", &self.marketplace.key)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("associate_tag", &self.associate_tag)
            .finish()
    }
}

/// Where options (and the item cache) are persisted.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// `PostgreSQL` connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// JSON options file, used when no database is configured
    pub options_file: PathBuf,
}

impl WidgetConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the secret key fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&source);

        let timeout_secs = vars
            .or_default("APW_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("APW_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            amazon: AmazonConfig::from_vars(&vars)?,
            storage: StorageConfig {
                database_url: vars.optional("APW_DATABASE_URL").map(SecretString::from),
                options_file: PathBuf::from(
                    vars.or_default("APW_OPTIONS_FILE", DEFAULT_OPTIONS_FILE),
                ),
            },
            http_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: vars.optional("SENTRY_DSN"),
        })
    }

    /// Returns `true` if both AWS keys are configured.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.amazon.is_complete()
    }

    /// HTTP client options for the configured timeout.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.http_timeout,
            ..ClientOptions::default()
        }
    }
}

impl AmazonConfig {
    fn from_vars(vars: &Vars<'_, impl Fn(&str) -> Option<String>>) -> Result<Self, ConfigError> {
        let region = vars.or_default("APW_AWS_REGION", DEFAULT_REGION);
        let marketplace = Marketplace::for_region(&region).ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "APW_AWS_REGION".to_string(),
                format!("unknown region '{region}'"),
            )
        })?;

        let secret_access_key = match vars.optional("APW_AWS_SECRET_ACCESS_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "APW_AWS_SECRET_ACCESS_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            marketplace,
            access_key_id: vars.optional("APW_AWS_ACCESS_KEY_ID"),
            secret_access_key,
            associate_tag: vars.required("APW_AWS_ASSOCIATE_TAG")?,
        })
    }

    /// Returns `true` if both keys are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Signing credentials. Missing keys become empty strings.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.marketplace.tld,
            self.access_key_id.clone().unwrap_or_default(),
            self.secret_access_key
                .as_ref()
                .map(|secret| secret.expose_secret().to_string())
                .unwrap_or_default(),
            self.associate_tag.clone(),
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup that treats blank values as unset.
struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // key lengths are tiny
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy secrets.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

//! Product Advertising API credentials.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Credentials and region used to sign a request.
///
/// Implements `Debug` manually to redact the private key.
#[derive(Clone)]
pub struct Credentials {
    /// Region suffix of the API host (`de`, `com`, `co.uk`).
    pub region: String,
    /// AWS access key id.
    pub public_key: String,
    /// AWS secret access key.
    pub private_key: SecretString,
    /// Associate tag credited for generated links.
    pub associate_tag: String,
}

impl Credentials {
    /// Create a new set of credentials.
    #[must_use]
    pub fn new(
        region: impl Into<String>,
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        associate_tag: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            public_key: public_key.into(),
            private_key: SecretString::from(private_key.into()),
            associate_tag: associate_tag.into(),
        }
    }

    /// API host for the configured region, e.g. `ecs.amazonaws.de`.
    #[must_use]
    pub fn host(&self) -> String {
        format!("ecs.amazonaws.{}", self.region.to_lowercase())
    }

    /// Returns `true` if both keys and the region are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.region.is_empty()
            && !self.public_key.is_empty()
            && !self.private_key.expose_secret().is_empty()
    }

    /// Hex SHA-256 of the key pair.
    ///
    /// Stored after a successful validation so unchanged keys are not
    /// re-validated against the API.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.public_key.as_bytes());
        hasher.update(self.private_key.expose_secret().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("region", &self.region)
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .field("associate_tag", &self.associate_tag)
            .finish()
    }
}

//! Configuration for Images client instances.
//!
//! A client is constructed from two required values: the account identifier
//! and the long-lived API token. The base hosts default to the production
//! endpoints and are overridable, which is how the test suite points a
//! client at a mock server. Configuration is immutable once the client is
//! built.

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Default standard per-account API host.
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default dedicated batch host.
pub const DEFAULT_BATCH_BASE: &str = "https://batch.imagedelivery.net";

const fn default_request_timeout_secs() -> u64 {
    30
}

/// Configuration for an Images client instance.
#[derive(Debug, Clone, Validate)]
pub struct ImagesConfig {
    /// Account identifier used in the per-account URL path
    #[validate(length(min = 1, message = "account id must not be empty"))]
    pub account_id: String,

    /// Long-lived API token presented as the standard bearer credential
    pub api_token: SecretString,

    /// Standard per-account API host
    #[validate(url)]
    pub api_base: String,

    /// Dedicated batch host used while a batch token is held
    #[validate(url)]
    pub batch_base: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
}

impl ImagesConfig {
    /// Create a new configuration with the required parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the account identifier is empty or the
    /// default hosts fail validation.
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> Result<Self> {
        let config = Self {
            account_id: account_id.into(),
            api_token: SecretString::from(api_token.into()),
            api_base: DEFAULT_API_BASE.to_string(),
            batch_base: DEFAULT_BATCH_BASE.to_string(),
            request_timeout_secs: default_request_timeout_secs(),
        };

        config
            .validate()
            .map_err(|e| Error::Config(format!("invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Override the standard API host.
    #[must_use]
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Override the batch host.
    #[must_use]
    pub fn with_batch_base(mut self, base: impl Into<String>) -> Self {
        self.batch_base = base.into();
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolve the per-account images base URL:
    /// `{api_base}/accounts/{account_id}/images/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the configured host cannot be
    /// parsed.
    pub fn account_images_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidEndpoint(self.api_base.clone()))?
            .pop_if_empty()
            .extend(["accounts", self.account_id.as_str(), "images", "v1"]);
        Ok(url)
    }

    /// Resolve the batch images base URL: `{batch_base}/images/v1`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the configured host cannot be
    /// parsed.
    pub fn batch_images_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.batch_base)?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidEndpoint(self.batch_base.clone()))?
            .pop_if_empty()
            .extend(["images", "v1"]);
        Ok(url)
    }
}

//! Data models for the Images API.
//!
//! Remote entities are parse-only: the client deserializes them from
//! response envelopes and never constructs them itself.

use cfimages_core::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Smallest accepted list page size.
pub const MIN_PER_PAGE: u32 = 10;

/// Largest accepted list page size.
pub const MAX_PER_PAGE: u32 = 10000;

/// An image record as returned by the service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Image {
    /// Image identifier (a custom identifier or a service-assigned one)
    pub id: String,
    /// Original filename, when known
    #[serde(default)]
    pub filename: Option<String>,
    /// Free-form metadata attached at upload or update time
    #[serde(default)]
    pub meta: Option<HashMap<String, Value>>,
    /// Upload timestamp
    pub uploaded: DateTime<Utc>,
    /// Whether variant URLs require a signed token
    #[serde(default, rename = "requireSignedURLs")]
    pub require_signed_urls: Option<bool>,
    /// Delivery URLs, one per configured variant
    #[serde(default)]
    pub variants: Vec<String>,
}

/// Payload of the list endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImageList {
    /// Images on this page
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Account-level usage counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UsageCount {
    /// Images the plan allows
    pub allowed: u64,
    /// Images currently stored
    pub current: u64,
}

/// Payload of the usage statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UsageStats {
    /// Usage counters
    pub count: UsageCount,
}

/// Payload of the batch-token endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchTokenGrant {
    /// Short-lived bearer token for the batch host
    pub token: String,
    /// Absolute deadline after which the token is invalid
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

/// Pagination parameters for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListImagesParams {
    /// 1-based page number
    pub page: u32,
    /// Images per page, within [`MIN_PER_PAGE`]..=[`MAX_PER_PAGE`]
    pub per_page: u32,
}

impl Default for ListImagesParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 1000,
        }
    }
}

impl ListImagesParams {
    /// Create parameters for a specific page and page size.
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Check the page size against the accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPerPage`] when `per_page` falls outside
    /// [10, 10000]. The check runs before any network call.
    pub const fn validate(&self) -> Result<()> {
        if self.per_page < MIN_PER_PAGE || self.per_page > MAX_PER_PAGE {
            return Err(Error::InvalidPerPage(self.per_page));
        }
        Ok(())
    }

    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Optional attributes accompanying an upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOptions {
    /// Caller-supplied identifier, validated before dispatch
    pub custom_id: Option<String>,
    /// Free-form metadata, serialized to a JSON string in the form payload
    pub metadata: Option<HashMap<String, Value>>,
    /// Whether delivery requires signed variant URLs
    pub require_signed_urls: bool,
}

impl UploadOptions {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the custom identifier.
    #[must_use]
    pub fn with_custom_id(mut self, id: impl Into<String>) -> Self {
        self.custom_id = Some(id.into());
        self
    }

    /// Set the metadata mapping.
    #[must_use]
    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set the signed-URL requirement flag.
    #[must_use]
    pub const fn with_require_signed_urls(mut self, required: bool) -> Self {
        self.require_signed_urls = required;
        self
    }
}

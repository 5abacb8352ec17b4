//! Images API client and data models.
//!
//! Provides strongly typed models and an asynchronous client for the
//! Cloudflare Images API, including the batch-token lifecycle that routes
//! eligible operations through the dedicated batch host.
//!
//! Network and remote failures never cross the public operation boundary:
//! each public method logs the failure and yields an absent value, while
//! identifier-validation failures are returned to the caller directly.

#![deny(missing_docs)]

pub mod batch;
pub mod client;
pub mod models;

pub use batch::BatchTokenManager;
pub use client::{ImagesClient, ImagesClientBuilder};
pub use models::{
    BatchTokenGrant, Image, ImageList, ListImagesParams, UploadOptions, UsageCount, UsageStats,
};

/// Convenient result alias using the shared error type.
pub type Result<T> = cfimages_core::Result<T>;

//! Asynchronous Images API client implementation.

use crate::batch::BatchTokenManager;
use crate::models::{
    BatchTokenGrant, Image, ImageList, ListImagesParams, UploadOptions, UsageStats, MAX_PER_PAGE,
};
use crate::Result;
use bytes::Bytes;
use cfimages_core::config::ImagesConfig;
use cfimages_core::envelope::ApiEnvelope;
use cfimages_core::{id, Error};
use chrono::Utc;
use futures::future;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!("cfimages/", env!("CARGO_PKG_VERSION"));

/// Builder for [`ImagesClient`].
#[derive(Debug, Clone)]
pub struct ImagesClientBuilder {
    config: ImagesConfig,
}

impl ImagesClientBuilder {
    /// Create a builder from a validated configuration.
    #[must_use]
    pub const fn new(config: ImagesConfig) -> Self {
        Self { config }
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured host cannot be parsed or the HTTP
    /// client cannot be constructed.
    pub fn build(self) -> Result<ImagesClient> {
        let account_base = self.config.account_images_url()?;
        let batch_base = self.config.batch_images_url()?;

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(Error::from)?;

        Ok(ImagesClient {
            http,
            config: self.config,
            account_base,
            batch_base,
            batch: BatchTokenManager::new(),
        })
    }
}

/// Resolved destination for one outgoing request.
struct RouteTarget {
    url: Url,
    bearer: String,
    /// True when the request was routed through the batch host, which
    /// obliges post-call bookkeeping.
    batched: bool,
}

/// Asynchronous Images API client.
///
/// One instance owns one batch-token state; instances are not shared.
/// Public operations follow the never-throw convention: network and remote
/// failures are logged and surface as an absent value, while identifier
/// validation failures are returned as errors.
#[derive(Debug)]
pub struct ImagesClient {
    http: reqwest::Client,
    config: ImagesConfig,
    account_base: Url,
    batch_base: Url,
    batch: BatchTokenManager,
}

impl ImagesClient {
    /// Construct a client directly from a configuration.
    ///
    /// # Errors
    ///
    /// See [`ImagesClientBuilder::build`].
    pub fn new(config: ImagesConfig) -> Result<Self> {
        ImagesClientBuilder::new(config).build()
    }

    /// The per-account images base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.account_base
    }

    /// Whether a batch token is currently held.
    #[must_use]
    pub fn batch_token_active(&self) -> bool {
        self.batch.is_active()
    }

    /// Calls recorded against the current batch token.
    #[must_use]
    pub fn batch_request_count(&self) -> u32 {
        self.batch.request_count()
    }

    /// Upload an image the service fetches from a URL.
    ///
    /// # Errors
    ///
    /// Returns an identifier-validation error if `custom_id` is invalid;
    /// network and remote failures yield `Ok(None)`.
    pub async fn upload_image_from_url(
        &self,
        source_url: &str,
        options: UploadOptions,
    ) -> Result<Option<Image>> {
        let form = Self::base_upload_form(&options)?.text("url", source_url.to_string());
        Ok(self.dispatch_upload(form).await)
    }

    /// Upload an image from a local file.
    ///
    /// # Errors
    ///
    /// Returns an identifier-validation error if `custom_id` is invalid;
    /// unreadable files and network failures yield `Ok(None)`.
    pub async fn upload_image_from_file(
        &self,
        path: impl AsRef<Path>,
        options: UploadOptions,
    ) -> Result<Option<Image>> {
        let base_form = Self::base_upload_form(&options)?;

        let path = path.as_ref();
        let data = match tokio::fs::read(path).await {
            Ok(data) => data,
            Err(error) => {
                warn!(%error, path = %path.display(), "failed to read upload source file");
                return Ok(None);
            }
        };
        let filename = path.file_name().map_or_else(
            || "upload".to_string(),
            |name| name.to_string_lossy().into_owned(),
        );

        let form = base_form.part("file", Part::bytes(data).file_name(filename));
        Ok(self.dispatch_upload(form).await)
    }

    /// Upload an image from an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an identifier-validation error if `custom_id` is invalid;
    /// network and remote failures yield `Ok(None)`.
    pub async fn upload_image_from_bytes(
        &self,
        data: Vec<u8>,
        filename: impl Into<String>,
        options: UploadOptions,
    ) -> Result<Option<Image>> {
        let form = Self::base_upload_form(&options)?
            .part("file", Part::bytes(data).file_name(filename.into()));
        Ok(self.dispatch_upload(form).await)
    }

    /// List one page of images.
    ///
    /// A page size outside [10, 10000] yields `None` before any network
    /// call is made. The list path never routes through the batch host.
    pub async fn list_images(&self, params: ListImagesParams) -> Option<ImageList> {
        match self.try_list_images(params).await {
            Ok(list) => Some(list),
            Err(error) => {
                warn!(%error, page = params.page, "list_images failed");
                None
            }
        }
    }

    /// Fetch every image in the account.
    ///
    /// Reads the usage statistics to size the fetch, then requests all
    /// pages concurrently at the maximum page size and concatenates them in
    /// page order. Any single failure aborts the whole aggregate; partial
    /// results are never returned.
    pub async fn get_full_list_images(&self) -> Option<Vec<Image>> {
        match self.try_get_full_list_images().await {
            Ok(images) => Some(images),
            Err(error) => {
                warn!(%error, "get_full_list_images failed");
                None
            }
        }
    }

    /// Fetch the details of one image.
    pub async fn get_image_details(&self, image_id: &str) -> Option<Image> {
        let outcome = self.send_batched::<Image>(Method::GET, &[image_id], None).await;
        match outcome.and_then(ApiEnvelope::into_result) {
            Ok(image) => Some(image),
            Err(error) => {
                warn!(%error, image_id, "get_image_details failed");
                None
            }
        }
    }

    /// Update an image's metadata and signed-URL requirement.
    pub async fn update_image(
        &self,
        image_id: &str,
        metadata: Option<HashMap<String, Value>>,
        require_signed_urls: Option<bool>,
    ) -> Option<Image> {
        match self
            .try_update_image(image_id, metadata, require_signed_urls)
            .await
        {
            Ok(image) => Some(image),
            Err(error) => {
                warn!(%error, image_id, "update_image failed");
                None
            }
        }
    }

    /// Delete an image.
    pub async fn delete_image(&self, image_id: &str) -> Option<()> {
        let outcome = self
            .send_batched::<Value>(Method::DELETE, &[image_id], None)
            .await;
        match outcome.and_then(ApiEnvelope::into_unit) {
            Ok(()) => Some(()),
            Err(error) => {
                warn!(%error, image_id, "delete_image failed");
                None
            }
        }
    }

    /// Fetch the raw stored bytes of an image (not an envelope).
    pub async fn get_base_image(&self, image_id: &str) -> Option<Bytes> {
        match self.try_get_base_image(image_id).await {
            Ok(bytes) => Some(bytes),
            Err(error) => {
                warn!(%error, image_id, "get_base_image failed");
                None
            }
        }
    }

    /// Fetch account-level usage statistics.
    pub async fn get_usage_stats(&self) -> Option<UsageStats> {
        match self.try_get_usage_stats().await {
            Ok(stats) => Some(stats),
            Err(error) => {
                warn!(%error, "get_usage_stats failed");
                None
            }
        }
    }

    /// Request a fresh batch token and store it on success.
    ///
    /// Always issued against the standard host with the standard
    /// credential. Returns false on any failure, leaving the current state
    /// untouched; batch mode is an optional optimization, so failure is a
    /// diagnostic rather than an error.
    pub async fn refresh_batch_token(&self) -> bool {
        match self.try_refresh_batch_token().await {
            Ok(grant) => {
                self.batch.grant(grant.token, grant.expires_at);
                true
            }
            Err(error) => {
                warn!(%error, "batch token refresh failed");
                false
            }
        }
    }

    // Internal Result-returning layer.

    async fn try_list_images(&self, params: ListImagesParams) -> Result<ImageList> {
        params.validate()?;
        let url = self.account_url(&[]);
        self.send_envelope::<ImageList>(Method::GET, url, self.api_token(), &params.to_pairs(), None)
            .await?
            .into_result()
    }

    async fn try_get_full_list_images(&self) -> Result<Vec<Image>> {
        let stats = self.try_get_usage_stats().await?;
        let total = stats.count.current;
        let pages = u32::try_from(total.div_ceil(u64::from(MAX_PER_PAGE))).unwrap_or(u32::MAX);

        let fetches: Vec<_> = (1..=pages)
            .map(|page| self.try_list_images(ListImagesParams::new(page, MAX_PER_PAGE)))
            .collect();
        let page_lists = future::try_join_all(fetches).await?;

        Ok(page_lists
            .into_iter()
            .flat_map(|list| list.images)
            .collect())
    }

    async fn try_update_image(
        &self,
        image_id: &str,
        metadata: Option<HashMap<String, Value>>,
        require_signed_urls: Option<bool>,
    ) -> Result<Image> {
        let mut form = Form::new();
        if let Some(metadata) = &metadata {
            form = form.text("metadata", serde_json::to_string(metadata)?);
        }
        if let Some(required) = require_signed_urls {
            form = form.text("requireSignedURLs", required.to_string());
        }

        self.send_batched::<Image>(Method::PATCH, &[image_id], Some(form))
            .await?
            .into_result()
    }

    async fn try_get_base_image(&self, image_id: &str) -> Result<Bytes> {
        let url = self.account_url(&[image_id, "blob"]);
        debug!(%url, "fetching raw image bytes");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.api_token())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(status.to_string()));
        }
        response.bytes().await.map_err(Error::from)
    }

    async fn try_get_usage_stats(&self) -> Result<UsageStats> {
        let url = self.account_url(&["stats"]);
        self.send_envelope::<UsageStats>(Method::GET, url, self.api_token(), &[], None)
            .await?
            .into_result()
    }

    async fn try_refresh_batch_token(&self) -> Result<BatchTokenGrant> {
        let url = self.account_url(&["batch_token"]);
        self.send_envelope::<BatchTokenGrant>(Method::GET, url, self.api_token(), &[], None)
            .await?
            .into_result()
    }

    /// Dispatch a batch-eligible request and run post-call bookkeeping when
    /// it was routed through the batch host, success or failure alike.
    async fn send_batched<T>(
        &self,
        method: Method,
        segments: &[&str],
        form: Option<Form>,
    ) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        let target = self.route(segments, true);
        let outcome = self
            .send_envelope(method, target.url, &target.bearer, &[], form)
            .await;
        if target.batched {
            self.batch.record_call(Utc::now());
        }
        outcome
    }

    /// Issue one HTTP request and parse the response envelope.
    ///
    /// No retries: a transport error or schema mismatch is terminal for the
    /// call and propagates to the operation layer.
    async fn send_envelope<T>(
        &self,
        method: Method,
        url: Url,
        bearer: &str,
        query: &[(&'static str, String)],
        form: Option<Form>,
    ) -> Result<ApiEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        debug!(%method, %url, "dispatching images request");

        let mut request = self.http.request(method, url).bearer_auth(bearer);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport(status.to_string()));
        }
        response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| Error::Schema(e.to_string()))
    }

    /// Select host and credential for one request.
    ///
    /// The batch host and token apply only when the call is batch-eligible
    /// and a token is held; every other combination uses the standard
    /// per-account host with the long-lived credential. Both choices are
    /// made against a single read of the token state.
    fn route(&self, segments: &[&str], batch_eligible: bool) -> RouteTarget {
        let token = if batch_eligible {
            self.batch.current_token()
        } else {
            None
        };
        match token {
            Some(bearer) => RouteTarget {
                url: join_segments(&self.batch_base, segments),
                bearer,
                batched: true,
            },
            None => RouteTarget {
                url: join_segments(&self.account_base, segments),
                bearer: self.api_token().to_string(),
                batched: false,
            },
        }
    }

    fn account_url(&self, segments: &[&str]) -> Url {
        join_segments(&self.account_base, segments)
    }

    fn api_token(&self) -> &str {
        self.config.api_token.expose_secret()
    }

    async fn dispatch_upload(&self, form: Form) -> Option<Image> {
        let outcome = self.send_batched::<Image>(Method::POST, &[], Some(form)).await;
        match outcome.and_then(ApiEnvelope::into_result) {
            Ok(image) => Some(image),
            Err(error) => {
                warn!(%error, "image upload failed");
                None
            }
        }
    }

    /// Build the multipart fields shared by every upload variant,
    /// validating the custom identifier first.
    fn base_upload_form(options: &UploadOptions) -> Result<Form> {
        if let Some(custom_id) = options.custom_id.as_deref() {
            id::validate_custom_id(custom_id)?;
        }

        let mut form = Form::new();
        if let Some(metadata) = &options.metadata {
            form = form.text("metadata", serde_json::to_string(metadata)?);
        }
        form = form.text("requireSignedURLs", options.require_signed_urls.to_string());
        if let Some(custom_id) = &options.custom_id {
            form = form.text("id", custom_id.clone());
        }
        Ok(form)
    }
}

fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if !segments.is_empty() {
        // http(s) URLs always support path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments.iter().copied());
        }
    }
    url
}

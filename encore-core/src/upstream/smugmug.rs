//! SmugMug API v2 client.
//!
//! Every request is a single GET carrying the static `APIKey` query parameter
//! and JSON accept headers. Non-2xx responses become
//! [`EncoreError::Upstream`] with a truncated body snippet; transport failures
//! become [`EncoreError::Network`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::PhotoSource;
use crate::error::{snippet, EncoreError, Result};

/// Default SmugMug API base URL.
pub const DEFAULT_API_URL: &str = "https://api.smugmug.com/api/v2";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request.
const USER_AGENT: &str = concat!("encore/", env!("CARGO_PKG_VERSION"));

/// Configuration for the SmugMug client.
#[derive(Clone)]
pub struct SmugMugConfig {
    /// API base URL (no trailing `!` endpoints).
    pub api_url: String,
    /// Static API key sent as the `APIKey` query parameter.
    pub api_key: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for SmugMugConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmugMugConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SmugMugConfig {
    /// Configuration with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Required: `SMUGMUG_API_KEY`
    /// Optional: `SMUGMUG_API_URL`, `UPSTREAM_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("SMUGMUG_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                EncoreError::Config("SMUGMUG_API_KEY environment variable not set".into())
            })?;

        let api_url =
            std::env::var("SMUGMUG_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let timeout = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);

        Ok(Self {
            api_url,
            api_key,
            timeout,
        })
    }
}

/// HTTP client for the SmugMug API.
pub struct SmugMugClient {
    client: Client,
    config: SmugMugConfig,
    base: Url,
}

impl SmugMugClient {
    /// Create a new client. Fails on an unparseable base URL.
    #[instrument(level = "debug", skip_all, fields(
        api_url = %config.api_url,
        timeout_ms = config.timeout.as_millis() as u64
    ))]
    pub fn new(config: SmugMugConfig) -> Result<Self> {
        let base = Url::parse(&config.api_url)
            .map_err(|e| EncoreError::Config(format!("Invalid SmugMug API URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(EncoreError::Config(format!(
                "SmugMug API URL cannot be a base: {}",
                config.api_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to create HTTP client");
                EncoreError::Config(format!("Failed to create HTTP client: {e}"))
            })?;

        info!("SmugMug client created");
        Ok(Self {
            client,
            config,
            base,
        })
    }

    /// Create a client from `SMUGMUG_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(SmugMugConfig::from_env()?)
    }

    /// Build an endpoint URL by appending percent-encoded path segments.
    fn endpoint<I, S>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment.as_ref());
            }
        }
        url
    }

    /// Perform one GET and decode the JSON body.
    #[instrument(level = "debug", skip(self, query), fields(path = %url.path()))]
    async fn get_json(&self, url: Url, query: &[(&str, &str)]) -> Result<Value> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .query(&[("APIKey", self.config.api_key.as_str())])
            .query(query)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(
                    error = %e,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "SmugMug request failed"
                );
                EncoreError::Network(e.to_string())
            })?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response.text().await.map_err(|e| {
            warn!(error = %e, "Failed to read response body");
            EncoreError::Network(format!("Failed to read response body: {e}"))
        })?;

        let latency_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(
                status = %status,
                latency_ms,
                body = %snippet(&body),
                "SmugMug returned error status"
            );
            return Err(EncoreError::upstream(status.as_u16(), &body));
        }

        debug!(latency_ms, "Request completed successfully");

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "Failed to parse JSON response");
            EncoreError::InvalidResponse(format!("{e}; body: {}", snippet(&body)))
        })
    }
}

#[async_trait]
impl PhotoSource for SmugMugClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_album_meta(&self, album_id: &str) -> Result<Value> {
        let url = self.endpoint(["album", album_id]);
        self.get_json(url, &[("_expand", "Keywords"), ("_expand", "KeywordArray")])
            .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_album_images_page(
        &self,
        album_id: &str,
        page_size: usize,
        start: usize,
    ) -> Result<Value> {
        let url = self.endpoint(["album".to_string(), format!("{album_id}!images")]);
        let count = page_size.to_string();
        let start = start.to_string();
        self.get_json(
            url,
            &[
                ("count", count.as_str()),
                ("start", start.as_str()),
                ("_accept", "application/json"),
                ("_expand", "Image"),
            ],
        )
        .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_image_detail(&self, image_id: &str) -> Result<Value> {
        let url = self.endpoint(["image".to_string(), format!("{image_id}-0")]);
        self.get_json(
            url,
            &[
                ("_accept", "application/json"),
                ("_verbosity", "1"),
                ("_expand", "Image"),
                ("_expand", "Image.Keywords"),
                ("_expand", "KeywordArray"),
            ],
        )
        .await
    }

    #[instrument(level = "debug", skip(self))]
    async fn fetch_folder_albums(&self, parent: &str, name: &str) -> Result<Value> {
        let segments: Vec<String> = std::iter::once("folder".to_string())
            .chain(
                parent
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            )
            .chain(std::iter::once(format!("{name}!albums")))
            .collect();
        let url = self.endpoint(segments);
        self.get_json(url, &[]).await
    }

    fn source_name(&self) -> &'static str {
        "smugmug"
    }
}

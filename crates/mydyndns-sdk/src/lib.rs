// # MyDynDNS SDK
//
// HTTP client for the MyDynDNS web service.
//
// ## Endpoints
//
// - `GET  {base}/my-ip`: apparent IP of the caller (read-only)
// - `POST {base}/dns-alias`: point the managed alias at the apparent IP
//
// Both answer `200 OK` with the IP address as a `text/plain` body and
// authenticate with the `x-api-key` header.
//
// ## Response Handling
//
// - Any status other than 200 is an error carrying the URL and status
// - Bodies are read against a 48-byte budget (longest textual IPv6 form);
//   larger bodies are rejected rather than truncated
// - Surrounding whitespace is ignored, anything else must parse as an IP

use async_trait::async_trait;
use mydyndns_core::traits::ApiClient;
use mydyndns_core::{Error, Result};
use reqwest::header::ACCEPT;
use reqwest::{Method, Response, StatusCode};
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Maximum number of characters in a textual IP (v6) address
pub const MAX_IP_STR_LEN: usize = 48;

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const MY_IP_PATH: &str = "my-ip";
const UPDATE_ALIAS_PATH: &str = "dns-alias";
const API_KEY_HEADER: &str = "x-api-key";

/// Client for the MyDynDNS API
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose the API key.
pub struct Client {
    /// Base URL without a trailing slash
    base_url: String,

    /// API key sent with every request
    /// ⚠️ NEVER log this value
    api_key: String,

    /// HTTP client for API requests
    http: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"<REDACTED>")
            .finish()
    }
}

impl Client {
    /// Create a client for the service hosted at `base_url`
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(base_url, api_key, http))
    }

    /// Create a client that sends requests through `http`
    pub fn with_http_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
            http,
        }
    }

    /// The base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retrieve the apparent IP address of this host
    ///
    /// Does not modify the DNS alias.
    pub async fn my_ip(&self) -> Result<IpAddr> {
        self.fetch_ip(Method::GET, MY_IP_PATH).await
    }

    /// Point the DNS alias at this host's apparent IP address
    ///
    /// Returns the address the alias was set to.
    pub async fn update_alias(&self) -> Result<IpAddr> {
        self.fetch_ip(Method::POST, UPDATE_ALIAS_PATH).await
    }

    async fn fetch_ip(&self, method: Method, path: &str) -> Result<IpAddr> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%method, %url, "Sending API request");

        let response = self
            .http
            .request(method, &url)
            .header(ACCEPT, "text/plain")
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| Error::http(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::unexpected_status(
                url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }

        let body = read_limited(response, MAX_IP_STR_LEN).await?;
        parse_ip(&body)
    }
}

#[async_trait]
impl ApiClient for Client {
    async fn my_ip(&self) -> Result<IpAddr> {
        Client::my_ip(self).await
    }

    async fn update_alias(&self) -> Result<IpAddr> {
        Client::update_alias(self).await
    }
}

/// Read the whole body, failing once it exceeds `limit` bytes
async fn read_limited(mut response: Response, limit: usize) -> Result<Vec<u8>> {
    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(Error::ResponseTooLarge { limit });
    }

    let mut body = Vec::with_capacity(limit);
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::http(format!("failed to read response body: {e}")))?
    {
        if body.len() + chunk.len() > limit {
            return Err(Error::ResponseTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

fn parse_ip(body: &[u8]) -> Result<IpAddr> {
    let text = std::str::from_utf8(body)
        .map_err(|_| Error::invalid_address(String::from_utf8_lossy(body)))?
        .trim();

    text.parse().map_err(|_| Error::invalid_address(text))
}

//! Rate-limited HTTP fetcher.
//!
//! Every oracle talks to the network through the [`Fetch`] trait. The
//! production implementation issues one GET per call, bounded by the
//! configured timeout, and always sleeps the fixed rate-limit delay before
//! handing control back, whether the request succeeded or not.

use crate::config::Config;
use crate::{Result, ScanError};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::str::FromStr;
use std::time::Duration;

/// Status, headers and body text of one completed GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub url: String,
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(url: &str, status: u16, body: &str) -> Self {
        Self {
            url: url.to_string(),
            status,
            headers: HeaderMap::new(),
            body: body.to_string(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::from_str(name), HeaderValue::from_str(value)) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Case-insensitive lookup. `None` only when the header is absent;
    /// non-ASCII bytes are decoded lossily rather than dropped.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    }
}

#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse>;

    async fn fetch(&self, url: &str) -> Result<HttpResponse> {
        self.fetch_with_headers(url, &[]).await
    }
}

pub struct RateLimitedFetcher {
    client: Client,
    delay: Duration,
}

impl RateLimitedFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.http.custom_headers {
            let name = HeaderName::from_str(name)
                .map_err(|e| ScanError::InvalidInput(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScanError::InvalidInput(format!("Invalid header value: {}", e)))?;
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(!config.http.verify_ssl)
            .redirect(if config.http.follow_redirects {
                reqwest::redirect::Policy::limited(config.http.max_redirects as usize)
            } else {
                reqwest::redirect::Policy::none()
            })
            .user_agent(&config.scan.user_agent)
            .default_headers(default_headers)
            .build()
            .map_err(|e| ScanError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            delay: config.rate_limit_delay(),
        })
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    async fn send(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| classify(url, e))?;
        let status = response.status().as_u16();
        let response_headers = response.headers().clone();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(HttpResponse {
            url: url.to_string(),
            status,
            headers: response_headers,
            body,
        })
    }
}

fn classify(url: &str, err: reqwest::Error) -> ScanError {
    if err.is_timeout() {
        ScanError::Timeout {
            operation: format!("GET {}", url),
        }
    } else {
        ScanError::Http(err)
    }
}

#[async_trait]
impl Fetch for RateLimitedFetcher {
    async fn fetch_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let result = self.send(url, headers).await;

        match &result {
            Ok(response) => debug!("GET {} -> {} ({} bytes)", url, response.status, response.body.len()),
            Err(e) => warn!("GET {} failed: {}", url, e),
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        result
    }
}

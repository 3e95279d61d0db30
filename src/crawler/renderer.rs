//! Page renderer boundary and the HTTP-backed implementation
//!
//! The crawl driver only ever sees the [`Renderer`] trait. [`HttpRenderer`]
//! fetches server-rendered HTML with reqwest; a JavaScript-capable browser
//! renderer can be substituted without touching the driver.

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Proxy};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Fully rendered page content
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the content was finally served from (after redirects)
    pub final_url: Url,

    /// Rendered HTML
    pub html: String,
}

/// Reasons a single render can fail
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render timed out for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Expected HTML from {url}, got {content_type}")]
    ContentMismatch { url: String, content_type: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The rendering capability itself is gone; the session cannot continue
    #[error("Renderer unavailable: {0}")]
    Unavailable(String),
}

impl RenderError {
    /// Returns true when the error is scoped to one page
    pub fn is_page_scoped(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

/// Capability that turns a URL into rendered HTML
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Renders one page within the given timeout
    async fn render(&self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError>;
}

/// Renderer that fetches pages over HTTP without executing scripts
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Wraps an already-configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a renderer from crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(crawler, user_agent)?))
    }
}

/// Builds an HTTP client with proper configuration
///
/// The user agent follows `Name/Version (+ContactURL; ContactEmail)`. The
/// per-render timeout is applied per request, so the client itself only
/// bounds connection setup.
///
/// # Example
///
/// ```no_run
/// use esg_scout::config::{CrawlerConfig, UserAgentConfig};
/// use esg_scout::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy_url) = &crawler.proxy_url {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }

    builder.build()
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, url: &Url, timeout: Duration) -> Result<RenderedPage, RenderError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html(&content_type) {
            return Err(RenderError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        Ok(RenderedPage { final_url, html })
    }
}

/// Accepts HTML and XHTML; a missing header is treated as HTML
fn is_html(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

fn classify_request_error(url: &Url, error: reqwest::Error) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
        }
    } else {
        RenderError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

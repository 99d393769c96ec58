//! HTTP fetch client
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the shared HTTP client with the configured user agent
//! - GET requests with redirect and size limits
//! - Error classification into typed fetch outcomes
//!
//! Fetch failures are data, not errors: every outcome maps to a queue
//! entry transition, so the orchestrator never aborts a run over a single
//! bad URL.

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum number of redirect hops followed per request
pub const MAX_REDIRECTS: usize = 3;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Normalized media type (no parameters, lowercase)
        content_type: String,
        /// Response body, truncated to the configured cap
        body: Vec<u8>,
    },

    /// Server answered with a non-success status
    HttpStatus(u16),

    /// Declared Content-Length exceeds the configured cap
    TooLarge {
        /// The declared size in bytes
        content_length: u64,
    },

    /// Request timed out
    Timeout,

    /// Transport-level failure (DNS, connection, TLS, redirect loop)
    Network(String),
}

impl FetchOutcome {
    /// Failure description for queue entry records, None for success
    pub fn error_message(&self) -> Option<String> {
        match self {
            FetchOutcome::Success { .. } => None,
            FetchOutcome::HttpStatus(code) => Some(format!("HTTP {}", code)),
            FetchOutcome::TooLarge { content_length } => {
                Some(format!("Content too large: {} bytes", content_length))
            }
            FetchOutcome::Timeout => Some("Request timeout".to_string()),
            FetchOutcome::Network(error) => Some(error.clone()),
        }
    }
}

/// Builds the HTTP client shared by a crawl run
///
/// Certificate verification is disabled: the crawler targets private and
/// intranet sites where self-signed certificates are the norm.
///
/// # Arguments
///
/// * `crawler` - Crawler behavior configuration (timeout)
/// * `user_agent` - User agent identification
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use loupe::config::Config;
/// use loupe::crawler::build_http_client;
///
/// let config = Config::default();
/// let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.agent_string())
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Strips parameters from a Content-Type header value
///
/// `text/html; charset=utf-8` becomes `text/html`.
fn normalize_content_type(value: &str) -> String {
    value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Fetches a URL and classifies the result
///
/// # Request Flow
///
/// 1. Send GET request (redirects followed automatically, max 3 hops)
/// 2. Non-success status → `HttpStatus`
/// 3. Declared Content-Length above the cap → `TooLarge`
/// 4. Read body, truncating to the cap
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `max_content_length` - Body size cap in bytes
///
/// # Returns
///
/// A FetchOutcome indicating success or the type of failure
pub async fn fetch_url(client: &Client, url: &str, max_content_length: usize) -> FetchOutcome {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::HttpStatus(status.as_u16());
    }

    if let Some(declared) = response.content_length() {
        if declared > max_content_length as u64 {
            return FetchOutcome::TooLarge {
                content_length: declared,
            };
        }
    }

    let final_url = response.url().to_string();
    let content_type = normalize_content_type(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or(""),
    );

    match response.bytes().await {
        Ok(bytes) => {
            let mut body = bytes.to_vec();
            // Servers that omit Content-Length can still exceed the cap
            if body.len() > max_content_length {
                body.truncate(max_content_length);
            }
            FetchOutcome::Success {
                final_url,
                status_code: status.as_u16(),
                content_type,
                body,
            }
        }
        Err(e) => classify_error(e),
    }
}

/// Classifies a reqwest error into a typed outcome
fn classify_error(e: reqwest::Error) -> FetchOutcome {
    if e.is_timeout() {
        FetchOutcome::Timeout
    } else if e.is_connect() {
        FetchOutcome::Network("Connection refused".to_string())
    } else if e.is_redirect() {
        FetchOutcome::Network("Redirect limit exceeded".to_string())
    } else {
        FetchOutcome::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_build_http_client() {
        let config = Config::default();
        let client = build_http_client(&config.crawler, &config.user_agent);
        assert!(client.is_ok());
    }

    #[test]
    fn test_normalize_content_type() {
        assert_eq!(normalize_content_type("text/html"), "text/html");
        assert_eq!(
            normalize_content_type("text/HTML; charset=utf-8"),
            "text/html"
        );
        assert_eq!(normalize_content_type(" image/PNG "), "image/png");
        assert_eq!(normalize_content_type(""), "");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchOutcome::HttpStatus(503).error_message().as_deref(),
            Some("HTTP 503")
        );
        assert_eq!(
            FetchOutcome::TooLarge {
                content_length: 5_000_000
            }
            .error_message()
            .as_deref(),
            Some("Content too large: 5000000 bytes")
        );
        assert_eq!(
            FetchOutcome::Timeout.error_message().as_deref(),
            Some("Request timeout")
        );
        let success = FetchOutcome::Success {
            final_url: "https://example.com/".to_string(),
            status_code: 200,
            content_type: "text/html".to_string(),
            body: Vec::new(),
        };
        assert!(success.error_message().is_none());
    }

    // Fetch behavior against live responses is covered by the wiremock
    // integration tests under tests/.
}

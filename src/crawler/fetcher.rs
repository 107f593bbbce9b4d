//! HTTP page fetcher
//!
//! Retrieves raw page content with a short per-request timeout and a
//! browser-like User-Agent. Only responses that declare an HTML content type
//! yield a body; every other status, content type, or transport error is a
//! logged "no content" outcome, never an error the caller must handle.

use reqwest::Client;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of a page fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The response was HTML; body is the decoded text
    Html { body: String },

    /// The response carried a non-HTML content type
    NotHtml { content_type: String },

    /// Non-success terminal status
    HttpError { status: u16 },

    /// Timeout, connection failure, or body decode failure
    TransportError { error: String },
}

impl FetchOutcome {
    /// The body, when the fetch produced usable HTML
    pub fn into_body(self) -> Option<String> {
        match self {
            FetchOutcome::Html { body } => Some(body),
            _ => None,
        }
    }
}

/// Builds the HTTP client shared by page fetches and file downloads
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(FETCH_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page URL
///
/// Redirects are followed by the client; the terminal response decides the
/// outcome. The caller marks the URL crawled regardless of outcome, so a
/// failed fetch is not retried within the same run.
pub async fn fetch_page(client: &Client, url: &str) -> FetchOutcome {
    tracing::debug!("Fetching: {}", url);

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Request error for {}: {}", url, e);
            return FetchOutcome::TransportError {
                error: e.to_string(),
            };
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::info!("Non-success status {} for {}", status, url);
        return FetchOutcome::HttpError {
            status: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        tracing::info!("Content is not text/html for {}: '{}'", url, content_type);
        return FetchOutcome::NotHtml { content_type };
    }

    match response.text().await {
        Ok(body) => FetchOutcome::Html { body },
        Err(e) => {
            tracing::error!("Failed to read body for {}: {}", url, e);
            FetchOutcome::TransportError {
                error: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client().is_ok());
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>hi</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let outcome = fetch_page(&client, &format!("{}/page", server.uri())).await;
        let body = outcome.into_body().unwrap();
        assert!(body.contains("hi"));
    }

    #[tokio::test]
    async fn test_non_html_content_type_yields_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
            )
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let outcome = fetch_page(&client, &format!("{}/data", server.uri())).await;
        assert!(matches!(outcome, FetchOutcome::NotHtml { .. }));
    }

    #[tokio::test]
    async fn test_error_status_yields_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client().unwrap();
        let outcome = fetch_page(&client, &format!("{}/missing", server.uri())).await;
        assert!(matches!(outcome, FetchOutcome::HttpError { status: 404 }));
    }

    #[tokio::test]
    async fn test_connection_failure_yields_transport_error() {
        let client = build_http_client().unwrap();
        // Reserved TEST-NET address, nothing listens there
        let outcome = fetch_page(&client, "http://192.0.2.1:9/").await;
        assert!(matches!(outcome, FetchOutcome::TransportError { .. }));
    }
}

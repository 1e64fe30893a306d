//! Shared reqwest client for the directory REST API.
//!
//! Owns the base URL, the request timeout and the helpers both HTTP adapters
//! use: endpoint construction, request execution and body previews for
//! error messages.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = concat!("employee-directory/", env!("CARGO_PKG_VERSION"));

/// Failures while building a [`RestClient`].
#[derive(Debug, Error)]
pub enum RestClientError {
    /// The base URL cannot carry a path (e.g. `mailto:`).
    #[error("base URL {url} cannot be used for REST endpoints")]
    InvalidBaseUrl {
        /// Rejected URL.
        url: String,
    },
    /// reqwest could not construct the client.
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Status and body of a completed request.
pub(super) struct RawResponse {
    pub(super) status: StatusCode,
    pub(super) body: Vec<u8>,
}

/// Cheaply cloneable handle to the REST backend.
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
}

impl RestClient {
    /// Build a client rooted at `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`RestClientError`] when the URL cannot hold a path or the
    /// reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, RestClientError> {
        if base_url.cannot_be_a_base() {
            return Err(RestClientError::InvalidBaseUrl {
                url: base_url.to_string(),
            });
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Base URL every endpoint is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint for `segments` below the base path, with a trailing slash.
    ///
    /// Segments are percent-encoded, so identifiers and e-mail addresses
    /// cannot escape their path position.
    pub(super) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    pub(super) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    pub(super) async fn execute(
        &self,
        request: RequestBuilder,
    ) -> Result<RawResponse, reqwest::Error> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}

/// Whitespace-collapsed prefix of a response body for error messages.
pub(super) fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

/// `status N` or `status N: preview`.
pub(super) fn status_message(status: StatusCode, body: &[u8]) -> String {
    let preview = body_preview(body);
    if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    }
}

/// Whether `status` reports an upstream deadline.
pub(super) fn is_timeout_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(Url::parse(base).expect("url"), Duration::from_secs(1))
            .expect("client builds")
    }

    #[rstest]
    #[case("http://127.0.0.1:8000/", &["api", "employees"], "http://127.0.0.1:8000/api/employees/")]
    #[case("http://127.0.0.1:8000", &["api", "skills", "7"], "http://127.0.0.1:8000/api/skills/7/")]
    #[case("https://hr.example.com/v2/", &["api", "employees", "AB1234"], "https://hr.example.com/v2/api/employees/AB1234/")]
    #[case("http://localhost/?debug=1", &["api", "employees"], "http://localhost/api/employees/")]
    fn endpoints_resolve_below_the_base_path(
        #[case] base: &str,
        #[case] segments: &[&str],
        #[case] expected: &str,
    ) {
        assert_eq!(client(base).endpoint(segments).as_str(), expected);
    }

    #[test]
    fn endpoint_segments_are_encoded() {
        let url = client("http://localhost/").endpoint(&["api", "check-email", "a/b?c@example.com"]);
        assert_eq!(url.as_str(), "http://localhost/api/check-email/a%2Fb%3Fc@example.com/");
    }

    #[test]
    fn opaque_base_urls_are_rejected() {
        let error = RestClient::new(
            Url::parse("mailto:hr@example.com").expect("url"),
            Duration::from_secs(1),
        )
        .expect_err("opaque URL");
        assert!(matches!(error, RestClientError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn previews_are_compacted_and_truncated() {
        assert_eq!(body_preview(b"  {\n  \"detail\":   \"x\" }"), "{ \"detail\": \"x\" }");
        let long = "a".repeat(200);
        let preview = body_preview(long.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn status_messages_include_previews_when_present() {
        assert_eq!(status_message(StatusCode::NOT_FOUND, b""), "status 404");
        assert_eq!(
            status_message(StatusCode::BAD_GATEWAY, b"upstream down"),
            "status 502: upstream down"
        );
    }
}

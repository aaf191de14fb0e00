//
//  bitbucket-server-client
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # HTTP Client Wrapper for Bitbucket Server
//!
//! This module provides the core HTTP client for interacting with the
//! Bitbucket Server/Data Center REST API. It handles URL composition,
//! authentication and request/response serialization. The endpoint methods
//! themselves live next to their payload types in the sibling modules.
//!
//! ## Features
//!
//! - Base URL composition with optional context path (`https://host/bitbucket`)
//! - Per-segment percent-encoding of path parameters
//! - Bearer authentication header injection
//! - JSON and plain-text response handling
//! - Error extraction from Bitbucket's `{"errors": [...]}` envelope
//! - Custom User-Agent header

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::common::{ApiError, Result};
use crate::auth::AuthCredential;
use crate::config::ClientConfig;

/// Extracts a human-readable message from a Bitbucket error response body.
///
/// Bitbucket Server returns errors in the format:
/// ```json
/// {"errors": [{"context": null, "message": "Human readable message", "exceptionName": "..."}]}
/// ```
///
/// Some plugin endpoints answer with a bare `{"message": "..."}` instead.
/// If neither shape matches, the trimmed raw body is returned, or the
/// status's canonical reason when the body is empty.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_client::api::client::parse_error_message;
/// use reqwest::StatusCode;
///
/// let body = r#"{"errors": [{"message": "Repository PROJ/missing does not exist."}]}"#;
/// assert_eq!(
///     parse_error_message(StatusCode::NOT_FOUND, body),
///     "Repository PROJ/missing does not exist."
/// );
/// ```
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        // Server format: {"errors": [{"message": "..."}, ...]}
        if let Some(errors) = json.get("errors").and_then(|e| e.as_array()) {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }

        // Simple message format: {"message": "..."}
        if let Some(message) = json.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string()
    } else {
        body.to_string()
    }
}

/// REST base path an endpoint lives under.
///
/// Almost every endpoint uses [`ApiBase::Core`]. Branch creation and
/// deletion are served by the branch-utils plugin, which sits beside the
/// core API rather than under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiBase {
    /// `/rest/api/1.0`
    Core,
    /// `/rest/branch-utils/1.0`
    BranchUtils,
    /// The server root, for servlets outside `/rest`.
    Root,
}

impl ApiBase {
    fn segments(self) -> &'static [&'static str] {
        match self {
            Self::Core => &["rest", "api", "1.0"],
            Self::BranchUtils => &["rest", "branch-utils", "1.0"],
            Self::Root => &[],
        }
    }
}

/// The HTTP client for the Bitbucket Server REST API.
///
/// Every endpoint method issues a single request (review-status updates and
/// the write-permission check are the documented exceptions), returns the
/// decoded body, and surfaces any failure as an [`ApiError`] without retrying.
///
/// The client is cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use bitbucket_server_client::{BitbucketClient, ClientConfig};
///
/// # async fn example() -> bitbucket_server_client::api::common::Result<()> {
/// let client = BitbucketClient::new(ClientConfig::new(
///     "https://bitbucket.example.com",
///     "my-personal-access-token",
/// ))?;
///
/// let repo = client
///     .get_repository(&"PROJ/my-repo".parse().unwrap())
///     .await?;
/// println!("Repository: {}", repo.name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    /// The underlying HTTP client
    http: Client,
    /// Server root, including any context path
    base_url: Url,
    /// Optional authentication credentials
    auth: Option<AuthCredential>,
}

impl BitbucketClient {
    /// Creates a client from a configuration object.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL, or [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let mut builder = Client::builder().user_agent(
            config
                .user_agent
                .clone()
                .unwrap_or_else(|| format!("{}/{}", crate::APP_NAME, crate::VERSION)),
        );
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
            auth: config.token.map(AuthCredential::bearer),
        })
    }

    /// Replaces the authentication credentials for this client.
    ///
    /// Useful for servers that only accept HTTP Basic authentication.
    pub fn with_auth(mut self, auth: AuthCredential) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Returns the configured server root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the full URL for an endpoint.
    ///
    /// Each segment is percent-encoded on its own, so values containing `/`,
    /// `?` or `#` cannot escape their position in the path.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_server_client::{BitbucketClient, ClientConfig};
    /// use bitbucket_server_client::api::client::ApiBase;
    ///
    /// let client = BitbucketClient::new(ClientConfig::new("https://bb.example.com/bitbucket/", "t")).unwrap();
    /// let url = client.endpoint(ApiBase::Core, ["projects", "PROJ"]).unwrap();
    /// assert_eq!(url.as_str(), "https://bb.example.com/bitbucket/rest/api/1.0/projects/PROJ");
    /// ```
    pub fn endpoint<I>(&self, base: ApiBase, segments: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(base.segments())
            .extend(segments);
        Ok(url)
    }

    /// Starts a request against an endpoint with authentication applied.
    pub(crate) fn request<I>(&self, method: Method, base: ApiBase, segments: I) -> Result<RequestBuilder>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let url = self.endpoint(base, segments)?;
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(auth) = &self.auth {
            request = auth.apply_to_request(request);
        }
        Ok(request)
    }

    /// Sends a request and turns non-success statuses into [`ApiError`]s.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("Response status {}", status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, parse_error_message(status, &text)));
        }

        Ok(response)
    }

    /// Sends a request and decodes the JSON response body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self
            .send(request.header(ACCEPT, HeaderValue::from_static("application/json")))
            .await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Sends a request negotiating a plain-text response.
    pub(crate) async fn send_text(&self, request: RequestBuilder) -> Result<String> {
        let response = self
            .send(request.header(ACCEPT, HeaderValue::from_static("text/plain")))
            .await?;
        Ok(response.text().await?)
    }

    /// Sends a request whose response body is irrelevant (usually 204).
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> BitbucketClient {
        BitbucketClient::new(ClientConfig::new(base, "token")).unwrap()
    }

    #[test]
    fn test_parse_error_message_joins_server_errors() {
        let body = r#"{"errors": [{"message": "first"}, {"message": "second"}]}"#;
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, body),
            "first; second"
        );
    }

    #[test]
    fn test_parse_error_message_fallbacks() {
        assert_eq!(
            parse_error_message(StatusCode::BAD_REQUEST, r#"{"message": "plain"}"#),
            "plain"
        );
        assert_eq!(
            parse_error_message(StatusCode::BAD_GATEWAY, "  upstream down \n"),
            "upstream down"
        );
        assert_eq!(parse_error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn test_endpoint_bases() {
        let client = client("https://bb.example.com");

        assert_eq!(
            client.endpoint(ApiBase::Core, ["users"]).unwrap().as_str(),
            "https://bb.example.com/rest/api/1.0/users"
        );
        assert_eq!(
            client
                .endpoint(ApiBase::BranchUtils, ["projects", "P", "repos", "r", "branches"])
                .unwrap()
                .as_str(),
            "https://bb.example.com/rest/branch-utils/1.0/projects/P/repos/r/branches"
        );
        assert_eq!(
            client
                .endpoint(ApiBase::Root, ["plugins", "servlet", "applinks", "whoami"])
                .unwrap()
                .as_str(),
            "https://bb.example.com/plugins/servlet/applinks/whoami"
        );
    }

    #[test]
    fn test_endpoint_keeps_context_path_and_encodes_segments() {
        let client = client("https://bb.example.com/bitbucket");
        let url = client
            .endpoint(ApiBase::Core, ["users", "first last/#x"])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://bb.example.com/bitbucket/rest/api/1.0/users/first%20last%2F%23x"
        );
    }

    #[tokio::test]
    async fn test_sub_second_timeout_still_reaches_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/P")
            .with_status(200)
            .with_body(r#"{"key": "P", "id": 1, "name": "P"}"#)
            .create_async()
            .await;

        let config = ClientConfig::new(server.url(), "t").with_timeout(std::time::Duration::from_millis(500));
        let project = BitbucketClient::new(config).unwrap().get_project("P").await.unwrap();

        mock.assert_async().await;
        assert_eq!(project.key, "P");
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        assert!(matches!(
            BitbucketClient::new(ClientConfig::new("not a url", "t")),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(matches!(
            BitbucketClient::new(ClientConfig::new("ftp://bb.example.com", "t")),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}

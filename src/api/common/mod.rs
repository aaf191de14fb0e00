//
//  bitbucket-server-client
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for Bitbucket Server
//!
//! Shared types used by every endpoint module: the error type, pagination
//! envelopes, and the link records embedded in most resources.
//!
//! # Overview
//!
//! - [`ApiError`] - Unified error type for all API operations
//! - [`Result`] - Alias for `std::result::Result<T, ApiError>`
//! - [`Link`] / [`Links`] - HATEOAS-style links
//! - Pagination types (re-exported from [`pagination`] submodule)
//!
//! # Example
//!
//! ```rust
//! use bitbucket_server_client::api::common::ApiError;
//!
//! fn describe(err: &ApiError) -> String {
//!     match err {
//!         ApiError::Unauthorized(_) => "please check your token".to_string(),
//!         ApiError::NotFound(message) => format!("not found: {}", message),
//!         other => other.to_string(),
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod pagination;

pub use pagination::*;

/// Result alias used by every client operation.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Unified error type for all Bitbucket Server API operations.
///
/// Non-success responses are mapped onto a variant by status code and carry
/// the message the server reported. Nothing is retried or recovered locally;
/// the caller sees exactly what the server or transport said.
///
/// # Variants
///
/// | Variant | Description | HTTP Status |
/// |---------|-------------|-------------|
/// | `BadRequest` | Validation failure | 400 |
/// | `Unauthorized` | Missing or invalid credentials | 401 |
/// | `Forbidden` | Insufficient permissions | 403 |
/// | `NotFound` | Resource does not exist | 404 |
/// | `Conflict` | Stale version or state conflict | 409 |
/// | `RateLimited` | Too many requests | 429 |
/// | `Server` | Server-side failure | 5xx |
/// | `Unexpected` | Any other non-success status | other |
/// | `Network` | Transport failure | N/A |
/// | `Decode` | Body did not match the expected shape | N/A |
/// | `InvalidUrl` | Base URL could not be parsed | N/A |
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was rejected by server-side validation.
    ///
    /// Bitbucket reports missing required fields and invalid values this way.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Authentication failed or was not provided.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The authenticated user lacks the permission for this operation.
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource changed since the supplied version, or is in a state
    /// that does not allow the operation (e.g. merging a declined PR).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// API rate limit has been exceeded.
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// An internal server error occurred (HTTP 5xx).
    #[error("Server error ({status}): {message}")]
    Server {
        /// The HTTP status returned.
        status: StatusCode,
        /// Message extracted from the response body.
        message: String,
    },

    /// A non-success status that has no dedicated variant.
    #[error("API error ({status}): {message}")]
    Unexpected {
        /// The HTTP status returned.
        status: StatusCode,
        /// Message extracted from the response body.
        message: String,
    },

    /// A network-level error occurred during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body could not be decoded into the expected type.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Maps a non-success status and its already-extracted message onto a variant.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_server_client::api::common::ApiError;
    /// use reqwest::StatusCode;
    ///
    /// let err = ApiError::from_status(StatusCode::NOT_FOUND, "Repository does not exist".into());
    /// assert!(matches!(err, ApiError::NotFound(_)));
    /// assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    /// ```
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(message),
            s if s.is_server_error() => Self::Server { status, message },
            _ => Self::Unexpected { status, message },
        }
    }

    /// Returns the HTTP status behind this error, if it came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            Self::Unauthorized(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Conflict(_) => Some(StatusCode::CONFLICT),
            Self::RateLimited(_) => Some(StatusCode::TOO_MANY_REQUESTS),
            Self::Server { status, .. } | Self::Unexpected { status, .. } => Some(*status),
            Self::Network(e) => e.status(),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Returns the server-reported message for response errors.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::RateLimited(m) => Some(m),
            Self::Server { message, .. } | Self::Unexpected { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// HATEOAS-style link for API resource navigation.
///
/// Bitbucket Server wraps links in arrays keyed by relation, so a single
/// relation (`self`, `clone`) may carry several entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    /// The URL of the linked resource.
    pub href: String,

    /// Optional link name. Clone links use `http` / `ssh`.
    #[serde(default)]
    pub name: Option<String>,
}

/// Link collection attached to projects, repositories, users and pull requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    /// Browser URLs for the resource.
    #[serde(default, rename = "self")]
    pub self_link: Vec<Link>,

    /// Clone URLs (repositories only).
    #[serde(default)]
    pub clone: Vec<Link>,
}

impl Links {
    /// Returns the first browser URL, if any.
    pub fn web_url(&self) -> Option<&str> {
        self.self_link.first().map(|l| l.href.as_str())
    }

    /// Returns the clone URL with the given name (`http` or `ssh`).
    pub fn clone_url(&self, name: &str) -> Option<&str> {
        self.clone
            .iter()
            .find(|l| l.name.as_deref() == Some(name))
            .map(|l| l.href.as_str())
    }
}

/// Converts a Bitbucket epoch-milliseconds timestamp into a UTC datetime.
///
/// Returns `None` for values outside chrono's representable range.
pub fn datetime_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

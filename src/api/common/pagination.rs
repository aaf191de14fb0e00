//
//  bitbucket-server-client
//  api/common/pagination.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pagination Types for Bitbucket Server Responses
//!
//! Bitbucket Server/Data Center uses offset-based pagination: every list
//! endpoint accepts `start` and `limit` query parameters and answers with a
//! page envelope carrying `isLastPage` and `nextPageStart`.
//!
//! The client never walks pages on its own. Callers pass [`PageParams`]
//! through and decide whether to request the next page using
//! [`ServerPaginatedResponse::next_start`].
//!
//! # Example
//!
//! ```rust
//! use bitbucket_server_client::api::common::ServerPaginatedResponse;
//!
//! let json = r#"{
//!     "values": ["a", "b"],
//!     "size": 2,
//!     "limit": 2,
//!     "isLastPage": false,
//!     "nextPageStart": 2,
//!     "start": 0
//! }"#;
//!
//! let page: ServerPaginatedResponse<String> = serde_json::from_str(json).unwrap();
//! assert!(page.has_next());
//! assert_eq!(page.next_start(), Some(2));
//! ```

use serde::{Deserialize, Serialize};

/// Paginated response from the Bitbucket Server API.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `values` | `Vec<T>` | Items in the current page |
/// | `size` | `u32` | Number of items in this page |
/// | `limit` | `u32` | Requested page size |
/// | `is_last_page` | `bool` | Whether this is the final page |
/// | `next_page_start` | `Option<u32>` | Offset of the next page |
/// | `start` | `u32` | Offset of the current page |
///
/// # Notes
///
/// - `size` is the count of the current page, not the grand total
/// - `next_page_start` is absent on the last page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerPaginatedResponse<T> {
    /// Array of items in the current page.
    pub values: Vec<T>,

    /// Number of items in the current page.
    #[serde(default)]
    pub size: u32,

    /// Maximum number of items requested for this page.
    #[serde(default)]
    pub limit: u32,

    /// Whether this is the last page of results.
    #[serde(default, rename = "isLastPage")]
    pub is_last_page: bool,

    /// Start index for the next page.
    #[serde(default, rename = "nextPageStart")]
    pub next_page_start: Option<u32>,

    /// Start index of the current page (0-indexed).
    #[serde(default)]
    pub start: u32,
}

impl<T> ServerPaginatedResponse<T> {
    /// Returns `true` when another page can be requested.
    pub fn has_next(&self) -> bool {
        !self.is_last_page
    }

    /// Returns the `start` value to pass for the next page.
    pub fn next_start(&self) -> Option<u32> {
        self.next_page_start
    }
}

/// Offset pagination parameters passed straight through as query parameters.
///
/// Both fields are optional; the server applies its own defaults
/// (`start=0`, `limit=25`) when they are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PageParams {
    /// Offset of the first item to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    /// Maximum number of items to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PageParams {
    /// Creates page parameters for the given offset and page size.
    pub fn new(start: u32, limit: u32) -> Self {
        Self {
            start: Some(start),
            limit: Some(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_has_no_next() {
        let json = r#"{"values": [1, 2, 3], "size": 3, "limit": 25, "isLastPage": true, "start": 0}"#;
        let page: ServerPaginatedResponse<u32> = serde_json::from_str(json).unwrap();

        assert!(!page.has_next());
        assert_eq!(page.next_start(), None);
        assert_eq!(page.values, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_envelope_fields_default() {
        let page: ServerPaginatedResponse<u32> = serde_json::from_str(r#"{"values": []}"#).unwrap();

        assert_eq!(page.size, 0);
        assert_eq!(page.start, 0);
        assert!(page.has_next());
    }

    #[test]
    fn test_page_params_skip_unset_fields() {
        let query = serde_json::to_value(PageParams {
            start: None,
            limit: Some(50),
        })
        .unwrap();

        assert_eq!(query, serde_json::json!({"limit": 50}));
    }
}

//
//  bitbucket-server-client
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # API Client Layer
//!
//! Typed access to the Bitbucket Server/Data Center REST API (v1.0).
//!
//! ## Architecture
//!
//! - [`client`]: Core HTTP client with authentication and request handling
//! - [`common`]: Shared types (errors, pagination, links)
//! - One module per resource, each adding its endpoints to
//!   [`BitbucketClient`] through an `impl` block
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_server_client::api::pullrequests::{ListPullRequestsParams, PullRequestState};
//! use bitbucket_server_client::api::repositories::RepoPath;
//! use bitbucket_server_client::{BitbucketClient, ClientConfig};
//!
//! # async fn example() -> bitbucket_server_client::api::Result<()> {
//! let client = BitbucketClient::new(ClientConfig::new("https://bitbucket.example.com", "your-pat"))?;
//!
//! let mut params = ListPullRequestsParams::new(RepoPath::new("PROJ", "my-repo"));
//! params.state = Some(PullRequestState::Open);
//!
//! for pr in client.list_pull_requests(&params).await?.values {
//!     println!("#{} {}", pr.id, pr.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result`]; non-success responses become
//! [`ApiError`] variants keyed by HTTP status and carrying the server's message.

/// Core HTTP client wrapper.
///
/// Provides the [`BitbucketClient`] struct which handles:
/// - Base path composition (core API, branch-utils plugin, server root)
/// - Authentication header injection
/// - Content negotiation and error status mapping
pub mod client;

/// Shared types: [`ApiError`], [`Result`], pagination and links.
pub mod common;

/// Project listing and lookup.
pub mod projects;

/// Repositories, files, raw content and commits.
pub mod repositories;

/// Branches, including create/delete through the branch-utils plugin.
pub mod branches;

/// Pull request lifecycle and review status.
pub mod pullrequests;

/// Pull request diffs (text and structured) and changed files.
pub mod diff;

/// Pull request comments.
pub mod comments;

/// Pull request activity stream.
pub mod activities;

/// Users and the authenticated caller.
pub mod users;

/// Write-permission check.
pub mod permissions;

pub use client::BitbucketClient;

pub use common::{ApiError, Result};

//
//  bitbucket-server-client
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server Client
//!
//! An async, typed client for the Bitbucket Server and Data Center REST API.
//!
//! ## Overview
//!
//! Every REST endpoint is exposed as one async method on [`BitbucketClient`]
//! that takes a parameter record, issues the HTTP call and returns the
//! decoded response. The client holds no state beyond its configuration and
//! is cheap to clone.
//!
//! ## Features
//!
//! - **Projects and Repositories**: list, inspect, browse files and commits
//! - **Branches**: list, create and delete (via the branch-utils plugin)
//! - **Pull Requests**: full lifecycle, diffs, changes, comments, activities
//!   and review status
//! - **Users**: lookup and current-user resolution
//! - **Permissions**: infer write access to a repository
//!
//! ## Module Structure
//!
//! - [`api`]: the client and one module per resource
//! - [`auth`]: credentials attached to every request
//! - [`config`]: client configuration from code, a TOML file or the environment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bitbucket_server_client::api::repositories::RepoPath;
//! use bitbucket_server_client::{BitbucketClient, ClientConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let client = BitbucketClient::new(config)?;
//!
//! let repo = RepoPath::new("PROJ", "my-repo");
//! if client.check_write_permission(&repo).await? {
//!     println!("You can push to {}", repo);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! Requests and response statuses are logged with [`tracing`] at `debug`
//! level. The library never installs a subscriber.

/// Bitbucket Server REST API client.
pub mod api;

/// Authentication credentials.
///
/// Bearer tokens (personal access tokens, HTTP access tokens) and basic
/// authentication, applied to each outgoing request.
pub mod auth;

/// Client configuration.
///
/// [`ClientConfig`] can be built in code, loaded from
/// `<config dir>/bitbucket-server-client/config.toml`, or taken from the
/// `BITBUCKET_URL` / `BITBUCKET_TOKEN` environment variables.
pub mod config;

pub use api::BitbucketClient;

pub use config::ClientConfig;

/// Crate name, used for the default user agent and the config directory.
pub const APP_NAME: &str = "bitbucket-server-client";

/// Crate version, derived from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
//  bitbucket-server-client
//  api/repositories.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Repository API
//!
//! Repositories always belong to a project, so every repository-scoped
//! endpoint is addressed by a [`RepoPath`] (project key + repository slug).
//!
//! ## API Endpoints
//!
//! ```text
//! GET /rest/api/1.0/repos
//! GET /rest/api/1.0/projects/{projectKey}/repos
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/default-branch
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/files/{path}
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/raw/{path}
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/commits
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_server_client::api::repositories::{GetRawContentParams, RepoPath};
//! use bitbucket_server_client::{BitbucketClient, ClientConfig};
//!
//! # async fn example() -> bitbucket_server_client::api::common::Result<()> {
//! let client = BitbucketClient::new(ClientConfig::new("https://bb.example.com", "token"))?;
//! let readme = client
//!     .get_raw_content(&GetRawContentParams {
//!         repo: RepoPath::new("PROJ", "my-repo"),
//!         path: "README.md".to_string(),
//!         at: Some("refs/heads/main".to_string()),
//!     })
//!     .await?;
//! println!("{}", readme);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::branches::Branch;
use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{datetime_from_millis, Links, Result, ServerPaginatedResponse};
use crate::api::projects::Project;

/// Identifies a repository by project key and repository slug.
///
/// Parses from and displays as `PROJECT/slug`.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_client::api::repositories::RepoPath;
///
/// let repo: RepoPath = "PROJ/my-repo".parse().unwrap();
/// assert_eq!(repo.project, "PROJ");
/// assert_eq!(repo.repository, "my-repo");
/// assert_eq!(repo.to_string(), "PROJ/my-repo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoPath {
    /// Project key, e.g. `PROJ` or `~jsmith`.
    pub project: String,
    /// Repository slug.
    pub repository: String,
}

impl RepoPath {
    /// Creates a repository path.
    pub fn new(project: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            repository: repository.into(),
        }
    }

    /// Path segments for this repository followed by `tail`.
    pub(crate) fn segments(&self, tail: &[&str]) -> Vec<String> {
        let mut segments = vec![
            "projects".to_string(),
            self.project.clone(),
            "repos".to_string(),
            self.repository.clone(),
        ];
        segments.extend(tail.iter().map(|s| s.to_string()));
        segments
    }
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.repository)
    }
}

impl FromStr for RepoPath {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((project, repo))
                if !project.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok(Self::new(project, repo))
            }
            _ => Err(format!("expected PROJECT/repository, got '{}'", s)),
        }
    }
}

/// Splits a repository file path into non-empty segments.
pub(crate) fn file_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Represents a repository in Bitbucket Server/Data Center.
///
/// # Notes
///
/// - The `slug` is derived from the name but may differ (lowercase, hyphenated)
/// - The `state` field indicates if the repository is ready for use
/// - `origin` is present on forks and points at the upstream repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Unique numeric identifier assigned by Bitbucket Server.
    #[serde(default)]
    pub id: u64,

    /// URL-safe identifier used in API endpoints and clone URLs.
    pub slug: String,

    /// Human-readable display name of the repository.
    #[serde(default)]
    pub name: String,

    /// Optional description explaining the repository's purpose.
    #[serde(default)]
    pub description: Option<String>,

    /// The project that contains this repository.
    pub project: Project,

    /// Source control management identifier (typically "git").
    #[serde(rename = "scmId", default)]
    pub scm_id: Option<String>,

    /// Common values: "AVAILABLE", "INITIALISING", "INITIALISATION_FAILED".
    #[serde(default)]
    pub state: Option<String>,

    #[serde(rename = "statusMessage", default)]
    pub status_message: Option<String>,

    /// Whether the repository allows forking.
    #[serde(default)]
    pub forkable: bool,

    /// Whether the repository is publicly accessible.
    #[serde(rename = "public", default)]
    pub is_public: bool,

    /// Upstream repository when this repository is a fork.
    #[serde(default)]
    pub origin: Option<Box<Repository>>,

    /// Clone and browse links.
    #[serde(default)]
    pub links: Links,
}

impl Repository {
    /// Returns the [`RepoPath`] addressing this repository.
    pub fn path(&self) -> RepoPath {
        RepoPath::new(&self.project.key, &self.slug)
    }
}

/// Query parameters for [`BitbucketClient::list_repositories`].
///
/// When `project` is set the project-scoped listing is used; otherwise the
/// global `/repos` search runs with the remaining filters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListRepositoriesParams {
    /// Restrict to one project (path segment, not a query parameter).
    #[serde(skip)]
    pub project: Option<String>,

    /// Repository name filter (global search only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Project name filter (global search only).
    #[serde(rename = "projectname", skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// `REPO_READ`, `REPO_WRITE` or `REPO_ADMIN` (global search only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Parameters for [`BitbucketClient::list_files`].
#[derive(Debug, Clone, Serialize)]
pub struct ListFilesParams {
    #[serde(skip)]
    pub repo: RepoPath,

    /// Directory to list; the repository root when `None`.
    #[serde(skip)]
    pub path: Option<String>,

    /// Commit id or ref to list at; the default branch when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Parameters for [`BitbucketClient::get_raw_content`].
#[derive(Debug, Clone, Serialize)]
pub struct GetRawContentParams {
    #[serde(skip)]
    pub repo: RepoPath,

    /// File path relative to the repository root.
    #[serde(skip)]
    pub path: String,

    /// Commit id or ref to read at; the default branch when `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub at: Option<String>,
}

/// Parameters for [`BitbucketClient::list_commits`].
#[derive(Debug, Clone, Serialize)]
pub struct ListCommitsParams {
    #[serde(skip)]
    pub repo: RepoPath,

    /// Commit id or ref to list back from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,

    /// Commit id or ref to stop at (exclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,

    /// Only commits touching this path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListCommitsParams {
    /// Lists the most recent commits on the default branch.
    pub fn new(repo: RepoPath) -> Self {
        Self {
            repo,
            until: None,
            since: None,
            path: None,
            start: None,
            limit: None,
        }
    }
}

/// Author or committer identity attached to a commit.
///
/// Identities that match a Bitbucket account carry the extra user fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitIdentity {
    pub name: String,

    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,

    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub slug: Option<String>,
}

/// Abbreviated parent commit reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimalCommit {
    pub id: String,

    #[serde(rename = "displayId", default)]
    pub display_id: String,
}

/// A commit as returned by the commit listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    /// Full SHA.
    pub id: String,

    /// Abbreviated SHA.
    #[serde(rename = "displayId", default)]
    pub display_id: String,

    pub author: CommitIdentity,

    /// Epoch milliseconds.
    #[serde(rename = "authorTimestamp", default)]
    pub author_timestamp: i64,

    #[serde(default)]
    pub committer: Option<CommitIdentity>,

    #[serde(rename = "committerTimestamp", default)]
    pub committer_timestamp: Option<i64>,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub parents: Vec<MinimalCommit>,
}

impl Commit {
    /// Author timestamp as a UTC datetime.
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        datetime_from_millis(self.author_timestamp)
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

impl BitbucketClient {
    /// Lists repositories, either within one project or across the instance.
    pub async fn list_repositories(
        &self,
        params: &ListRepositoriesParams,
    ) -> Result<ServerPaginatedResponse<Repository>> {
        let request = match &params.project {
            Some(project) => {
                self.request(Method::GET, ApiBase::Core, ["projects", project.as_str(), "repos"])?
            }
            None => self.request(Method::GET, ApiBase::Core, ["repos"])?,
        };
        self.send_json(request.query(params)).await
    }

    /// Fetches a single repository.
    pub async fn get_repository(&self, repo: &RepoPath) -> Result<Repository> {
        let request = self.request(Method::GET, ApiBase::Core, repo.segments(&[]))?;
        self.send_json(request).await
    }

    /// Fetches the repository's default branch.
    pub async fn get_default_branch(&self, repo: &RepoPath) -> Result<Branch> {
        let request = self.request(Method::GET, ApiBase::Core, repo.segments(&["default-branch"]))?;
        self.send_json(request).await
    }

    /// Lists file paths below a directory, recursively.
    pub async fn list_files(&self, params: &ListFilesParams) -> Result<ServerPaginatedResponse<String>> {
        let mut segments = params.repo.segments(&["files"]);
        if let Some(path) = &params.path {
            segments.extend(file_segments(path).map(str::to_string));
        }
        let request = self
            .request(Method::GET, ApiBase::Core, segments)?
            .query(params);
        self.send_json(request).await
    }

    /// Fetches the raw contents of a file as text.
    pub async fn get_raw_content(&self, params: &GetRawContentParams) -> Result<String> {
        let mut segments = params.repo.segments(&["raw"]);
        segments.extend(file_segments(&params.path).map(str::to_string));
        let request = self
            .request(Method::GET, ApiBase::Core, segments)?
            .query(params);
        self.send_text(request).await
    }

    /// Lists commits reachable from `until` (default branch when unset).
    pub async fn list_commits(&self, params: &ListCommitsParams) -> Result<ServerPaginatedResponse<Commit>> {
        let request = self
            .request(Method::GET, ApiBase::Core, params.repo.segments(&["commits"]))?
            .query(params);
        self.send_json(request).await
    }
}

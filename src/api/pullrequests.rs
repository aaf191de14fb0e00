//
//  bitbucket-server-client
//  api/pullrequests.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Pull Request API
//!
//! Pull request records and the pull request lifecycle endpoints.
//!
//! ## Pull Request Workflow
//!
//! In Bitbucket Server/DC, pull requests:
//! - Propose merging changes from a source branch (`fromRef`) to a target branch (`toRef`)
//! - Support multiple reviewers who can approve or request changes
//! - Track participants (author, reviewers, and other commenters)
//! - Can be merged, declined, reopened or deleted
//! - Carry a `version` that every mutating call must echo back (optimistic locking)
//!
//! ## API Endpoints
//!
//! ```text
//! GET/POST   /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests
//! GET/PUT/DELETE /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}
//! POST /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/merge
//! POST /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/decline
//! POST /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/reopen
//! GET  /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/commits
//! PUT  /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/participants/{userSlug}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use bitbucket_server_client::api::pullrequests::CreatePullRequestParams;
//! use bitbucket_server_client::api::repositories::RepoPath;
//! use bitbucket_server_client::{BitbucketClient, ClientConfig};
//!
//! # async fn example() -> bitbucket_server_client::api::common::Result<()> {
//! let client = BitbucketClient::new(ClientConfig::new("https://bb.example.com", "token"))?;
//!
//! let pr = client
//!     .create_pull_request(&CreatePullRequestParams {
//!         repo: RepoPath::new("PROJ", "my-repo"),
//!         title: "Add user authentication".to_string(),
//!         description: Some("Implements the login flow".to_string()),
//!         from_branch: "feature/auth".to_string(),
//!         to_branch: "main".to_string(),
//!         from_repo: None,
//!         reviewers: vec!["jsmith".to_string()],
//!     })
//!     .await?;
//!
//! println!("Opened PR #{} (version {})", pr.id, pr.version);
//! # Ok(())
//! # }
//! ```
//!
//! ## Notes
//!
//! - Timestamps (`created_date`, `updated_date`) are Unix milliseconds
//! - Branch names are sent as full refs: "refs/heads/branch-name"

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize, Serializer};

use crate::api::branches::normalize_branch_ref;
use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{datetime_from_millis, Links, PageParams, Result, ServerPaginatedResponse};
use crate::api::repositories::{Commit, RepoPath, Repository};
use crate::api::users::User;

/// Identifies a pull request within a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PullRequestPath {
    /// Target repository of the pull request.
    pub repo: RepoPath,
    /// Pull request id, unique within `repo`.
    pub id: u64,
}

impl PullRequestPath {
    /// Creates a pull request path.
    pub fn new(repo: RepoPath, id: u64) -> Self {
        Self { repo, id }
    }

    /// Path segments for this pull request followed by `tail`.
    pub(crate) fn segments(&self, tail: &[&str]) -> Vec<String> {
        let id = self.id.to_string();
        let mut segments = self.repo.segments(&["pull-requests", id.as_str()]);
        segments.extend(tail.iter().map(|s| s.to_string()));
        segments
    }
}

/// Lifecycle state of a pull request.
///
/// `All` is only meaningful as a list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    /// Awaiting review or merge.
    Open,
    /// Closed without merging; can be reopened.
    Declined,
    /// Merged into the target branch.
    Merged,
    /// Any state.
    All,
}

/// A reviewer's verdict on a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    /// The reviewer approved the changes.
    Approved,
    /// The reviewer requested changes.
    NeedsWork,
    /// No verdict, or a previous verdict was withdrawn.
    Unapproved,
}

/// Role a participant plays in a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    /// Opened the pull request.
    Author,
    /// Explicitly asked to review.
    Reviewer,
    /// Took part (e.g. commented) without being a reviewer.
    Participant,
}

/// Represents a pull request in Bitbucket Server/Data Center.
///
/// # Example
///
/// ```rust,ignore
/// let pr = client.get_pull_request(&PullRequestPath::new(repo, 42)).await?;
///
/// println!("PR #{}: {}", pr.id, pr.title);
/// println!("From: {} -> To: {}", pr.from_ref.display_id, pr.to_ref.display_id);
///
/// let approved_count = pr.reviewers.iter().filter(|r| r.approved).count();
/// println!("Approvals: {}/{}", approved_count, pr.reviewers.len());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// Numeric identifier, unique within the target repository.
    pub id: u64,

    /// Optimistic-locking version; echo it back on every update.
    #[serde(default)]
    pub version: u64,

    /// Short summary shown in listings.
    pub title: String,

    /// May contain Markdown formatting.
    #[serde(default)]
    pub description: Option<String>,

    /// Current lifecycle state.
    pub state: PullRequestState,

    /// `true` while the pull request is open.
    #[serde(default)]
    pub open: bool,

    /// `true` once merged or declined.
    #[serde(default)]
    pub closed: bool,

    /// Unix timestamp in milliseconds when the PR was created.
    #[serde(rename = "createdDate", default)]
    pub created_date: i64,

    /// Unix timestamp in milliseconds of the last update.
    #[serde(rename = "updatedDate", default)]
    pub updated_date: i64,

    /// Source branch reference containing the changes to merge.
    #[serde(rename = "fromRef")]
    pub from_ref: PullRequestRef,

    /// Target branch reference where changes will be merged.
    #[serde(rename = "toRef")]
    pub to_ref: PullRequestRef,

    /// Locked pull requests cannot be modified.
    #[serde(default)]
    pub locked: bool,

    /// The user who created this pull request.
    pub author: Participant,

    /// Requested reviewers and their verdicts.
    #[serde(default)]
    pub reviewers: Vec<Participant>,

    /// Non-reviewing participants (commenters).
    #[serde(default)]
    pub participants: Vec<Participant>,

    /// Browser links.
    #[serde(default)]
    pub links: Links,
}

impl PullRequest {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        datetime_from_millis(self.created_date)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        datetime_from_millis(self.updated_date)
    }

    /// Returns the path addressing this pull request in its target repository.
    pub fn path(&self) -> PullRequestPath {
        PullRequestPath::new(self.to_ref.repository.path(), self.id)
    }
}

/// Branch reference within a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// Full Git ref path, e.g. "refs/heads/feature/my-feature".
    pub id: String,

    /// Short name, e.g. "feature/my-feature".
    #[serde(rename = "displayId", default)]
    pub display_id: String,

    /// SHA of the tip commit.
    #[serde(rename = "latestCommit", default)]
    pub latest_commit: Option<String>,

    /// Repository containing this branch; differs from the target on forks.
    pub repository: Repository,
}

/// A user's involvement in a pull request.
///
/// # Notes
///
/// - `approved` is a quick boolean check; `status` provides more detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    /// The participating user.
    pub user: User,

    /// How the user takes part.
    pub role: ParticipantRole,

    /// Whether the user approved.
    #[serde(default)]
    pub approved: bool,

    /// Detailed verdict.
    #[serde(default)]
    pub status: Option<ReviewStatus>,

    /// Commit the reviewer last looked at.
    #[serde(rename = "lastReviewedCommit", default)]
    pub last_reviewed_commit: Option<String>,
}

/// Pull request listing direction relative to the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestDirection {
    /// PRs targeting this repository.
    Incoming,
    /// PRs originating from this repository.
    Outgoing,
}

/// Ordering for pull request listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestOrder {
    /// Oldest first.
    Oldest,
    /// Newest first.
    Newest,
}

fn serialize_branch_ref<S: Serializer>(value: &Option<String>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(name) => serializer.serialize_str(&normalize_branch_ref(name)),
        None => serializer.serialize_none(),
    }
}

/// Parameters for [`BitbucketClient::list_pull_requests`].
#[derive(Debug, Clone, Serialize)]
pub struct ListPullRequestsParams {
    #[serde(skip)]
    pub repo: RepoPath,

    /// Server default is `OPEN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<PullRequestState>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<PullRequestDirection>,

    /// Only PRs whose target (or source, for `OUTGOING`) is this branch.
    /// Normalized to a full ref.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_branch_ref")]
    pub at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<PullRequestOrder>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListPullRequestsParams {
    /// Lists open pull requests of `repo` with server defaults.
    pub fn new(repo: RepoPath) -> Self {
        Self {
            repo,
            state: None,
            direction: None,
            at: None,
            order: None,
            start: None,
            limit: None,
        }
    }
}

/// Parameters for [`BitbucketClient::create_pull_request`].
#[derive(Debug, Clone)]
pub struct CreatePullRequestParams {
    /// Target repository; the PR is created here.
    pub repo: RepoPath,
    pub title: String,
    pub description: Option<String>,
    /// Source branch, short or fully qualified.
    pub from_branch: String,
    /// Target branch, short or fully qualified.
    pub to_branch: String,
    /// Source repository for cross-repository (fork) PRs. Defaults to `repo`.
    pub from_repo: Option<RepoPath>,
    /// Reviewer usernames.
    pub reviewers: Vec<String>,
}

/// Parameters for [`BitbucketClient::update_pull_request`].
///
/// Unset fields are left unchanged on the server.
#[derive(Debug, Clone)]
pub struct UpdatePullRequestParams {
    pub pr: PullRequestPath,
    /// Version the caller last saw.
    pub version: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Replaces the full reviewer list when set.
    pub reviewers: Option<Vec<String>>,
    /// Retargets the pull request.
    pub to_branch: Option<String>,
}

/// Parameters for [`BitbucketClient::merge_pull_request`].
#[derive(Debug, Clone)]
pub struct MergePullRequestParams {
    pub pr: PullRequestPath,
    pub version: u64,
    /// Overrides the default merge commit message.
    pub message: Option<String>,
    /// Merge strategy id, e.g. `no-ff`, `squash`, `rebase-no-ff`.
    pub strategy: Option<String>,
}

/// Parameters for [`BitbucketClient::decline_pull_request`] and
/// [`BitbucketClient::reopen_pull_request`].
#[derive(Debug, Clone)]
pub struct TransitionPullRequestParams {
    pub pr: PullRequestPath,
    pub version: u64,
}

/// Parameters for [`BitbucketClient::set_review_status`].
#[derive(Debug, Clone)]
pub struct ReviewStatusParams {
    pub pr: PullRequestPath,
    pub status: ReviewStatus,
}

#[derive(Serialize)]
struct ProjectSpec<'a> {
    key: &'a str,
}

#[derive(Serialize)]
struct RepositorySpec<'a> {
    slug: &'a str,
    project: ProjectSpec<'a>,
}

#[derive(Serialize)]
struct RefSpec<'a> {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<RepositorySpec<'a>>,
}

impl<'a> RefSpec<'a> {
    fn new(branch: &str, repo: &'a RepoPath) -> Self {
        Self {
            id: normalize_branch_ref(branch),
            repository: Some(RepositorySpec {
                slug: &repo.repository,
                project: ProjectSpec { key: &repo.project },
            }),
        }
    }
}

#[derive(Serialize)]
struct UserName<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct ReviewerSpec<'a> {
    user: UserName<'a>,
}

fn reviewer_specs(names: &[String]) -> Vec<ReviewerSpec<'_>> {
    names
        .iter()
        .map(|name| ReviewerSpec {
            user: UserName { name },
        })
        .collect()
}

#[derive(Serialize)]
struct CreatePullRequestBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    state: PullRequestState,
    open: bool,
    closed: bool,
    #[serde(rename = "fromRef")]
    from_ref: RefSpec<'a>,
    #[serde(rename = "toRef")]
    to_ref: RefSpec<'a>,
    locked: bool,
    reviewers: Vec<ReviewerSpec<'a>>,
}

#[derive(Serialize)]
struct UpdatePullRequestBody<'a> {
    version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reviewers: Option<Vec<ReviewerSpec<'a>>>,
    #[serde(rename = "toRef", skip_serializing_if = "Option::is_none")]
    to_ref: Option<RefSpec<'a>>,
}

#[derive(Serialize)]
struct MergeBody<'a> {
    version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(rename = "strategyId", skip_serializing_if = "Option::is_none")]
    strategy_id: Option<&'a str>,
}

#[derive(Serialize)]
struct VersionBody {
    version: u64,
}

#[derive(Serialize)]
struct ReviewStatusBody<'a> {
    user: UserName<'a>,
    approved: bool,
    status: ReviewStatus,
}

impl BitbucketClient {
    /// Lists pull requests of a repository.
    pub async fn list_pull_requests(
        &self,
        params: &ListPullRequestsParams,
    ) -> Result<ServerPaginatedResponse<PullRequest>> {
        let request = self
            .request(Method::GET, ApiBase::Core, params.repo.segments(&["pull-requests"]))?
            .query(params);
        self.send_json(request).await
    }

    /// Fetches a single pull request.
    pub async fn get_pull_request(&self, pr: &PullRequestPath) -> Result<PullRequest> {
        let request = self.request(Method::GET, ApiBase::Core, pr.segments(&[]))?;
        self.send_json(request).await
    }

    /// Opens a pull request. Branch names are normalized to full refs.
    pub async fn create_pull_request(&self, params: &CreatePullRequestParams) -> Result<PullRequest> {
        let from_repo = params.from_repo.as_ref().unwrap_or(&params.repo);
        let body = CreatePullRequestBody {
            title: &params.title,
            description: params.description.as_deref(),
            state: PullRequestState::Open,
            open: true,
            closed: false,
            from_ref: RefSpec::new(&params.from_branch, from_repo),
            to_ref: RefSpec::new(&params.to_branch, &params.repo),
            locked: false,
            reviewers: reviewer_specs(&params.reviewers),
        };
        let request = self
            .request(Method::POST, ApiBase::Core, params.repo.segments(&["pull-requests"]))?
            .json(&body);
        self.send_json(request).await
    }

    /// Updates title, description, reviewers or target branch.
    pub async fn update_pull_request(&self, params: &UpdatePullRequestParams) -> Result<PullRequest> {
        let body = UpdatePullRequestBody {
            version: params.version,
            title: params.title.as_deref(),
            description: params.description.as_deref(),
            reviewers: params.reviewers.as_deref().map(reviewer_specs),
            to_ref: params.to_branch.as_deref().map(|branch| RefSpec {
                id: normalize_branch_ref(branch),
                repository: None,
            }),
        };
        let request = self
            .request(Method::PUT, ApiBase::Core, params.pr.segments(&[]))?
            .json(&body);
        self.send_json(request).await
    }

    /// Merges a pull request.
    pub async fn merge_pull_request(&self, params: &MergePullRequestParams) -> Result<PullRequest> {
        let body = MergeBody {
            version: params.version,
            message: params.message.as_deref(),
            strategy_id: params.strategy.as_deref(),
        };
        let request = self
            .request(Method::POST, ApiBase::Core, params.pr.segments(&["merge"]))?
            .query(&[("version", params.version)])
            .json(&body);
        self.send_json(request).await
    }

    /// Declines an open pull request.
    pub async fn decline_pull_request(&self, params: &TransitionPullRequestParams) -> Result<PullRequest> {
        self.transition_pull_request(params, "decline").await
    }

    /// Reopens a declined pull request.
    pub async fn reopen_pull_request(&self, params: &TransitionPullRequestParams) -> Result<PullRequest> {
        self.transition_pull_request(params, "reopen").await
    }

    async fn transition_pull_request(
        &self,
        params: &TransitionPullRequestParams,
        action: &str,
    ) -> Result<PullRequest> {
        let request = self
            .request(Method::POST, ApiBase::Core, params.pr.segments(&[action]))?
            .query(&[("version", params.version)])
            .json(&VersionBody {
                version: params.version,
            });
        self.send_json(request).await
    }

    /// Deletes a pull request permanently.
    pub async fn delete_pull_request(&self, pr: &PullRequestPath, version: u64) -> Result<()> {
        let request = self
            .request(Method::DELETE, ApiBase::Core, pr.segments(&[]))?
            .json(&VersionBody { version });
        self.send_empty(request).await
    }

    /// Lists the commits a pull request would merge.
    pub async fn get_pull_request_commits(
        &self,
        pr: &PullRequestPath,
        page: &PageParams,
    ) -> Result<ServerPaginatedResponse<Commit>> {
        let request = self
            .request(Method::GET, ApiBase::Core, pr.segments(&["commits"]))?
            .query(page);
        self.send_json(request).await
    }

    /// Sets the caller's review status on a pull request.
    ///
    /// The participants endpoint is keyed by user slug, so the current user
    /// is resolved first.
    pub async fn set_review_status(&self, params: &ReviewStatusParams) -> Result<Participant> {
        let me = self.get_current_user().await?;
        tracing::debug!("Setting review status {:?} as {}", params.status, me.name);

        let body = ReviewStatusBody {
            user: UserName { name: &me.name },
            approved: params.status == ReviewStatus::Approved,
            status: params.status,
        };
        let request = self
            .request(
                Method::PUT,
                ApiBase::Core,
                params.pr.segments(&["participants", me.path_slug()]),
            )?
            .json(&body);
        self.send_json(request).await
    }
}

//
//  bitbucket-server-client
//  api/branches.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Branch API
//!
//! Branch listing lives in the core API. Creating and deleting branches is
//! handled by the branch-utils plugin, which is mounted beside the core API:
//!
//! ```text
//! GET    /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/branches
//! POST   /rest/branch-utils/1.0/projects/{projectKey}/repos/{repoSlug}/branches
//! DELETE /rest/branch-utils/1.0/projects/{projectKey}/repos/{repoSlug}/branches
//! ```
//!
//! Bitbucket identifies branches by full ref (`refs/heads/main`). Use
//! [`normalize_branch_ref`] to turn a short branch name into that form.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{Result, ServerPaginatedResponse};
use crate::api::repositories::RepoPath;

/// Prefix every branch ref carries.
pub const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Normalizes a branch name to its fully qualified ref.
///
/// Names already starting with `refs/` (branches, tags, or any other
/// namespace) are returned unchanged.
///
/// # Example
///
/// ```rust
/// use bitbucket_server_client::api::branches::normalize_branch_ref;
///
/// assert_eq!(normalize_branch_ref("main"), "refs/heads/main");
/// assert_eq!(normalize_branch_ref("feature/login"), "refs/heads/feature/login");
/// assert_eq!(normalize_branch_ref("refs/heads/main"), "refs/heads/main");
/// assert_eq!(normalize_branch_ref("refs/tags/v1.0"), "refs/tags/v1.0");
/// ```
pub fn normalize_branch_ref(name: &str) -> String {
    if name.starts_with("refs/") {
        name.to_string()
    } else {
        format!("{}{}", BRANCH_REF_PREFIX, name)
    }
}

/// A branch in a Bitbucket Server repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    /// Full ref, e.g. `refs/heads/main`.
    pub id: String,

    /// Short name, e.g. `main`.
    #[serde(rename = "displayId", default)]
    pub display_id: String,

    /// `BRANCH` or `TAG`.
    #[serde(rename = "type", default)]
    pub ref_type: Option<String>,

    /// SHA at the tip of the branch.
    #[serde(rename = "latestCommit", default)]
    pub latest_commit: Option<String>,

    /// Whether this is the repository's default branch.
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
}

/// Sort order for [`ListBranchesParams::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BranchOrder {
    /// By name.
    Alphabetical,
    /// Most recently changed first.
    Modification,
}

/// Parameters for [`BitbucketClient::list_branches`].
#[derive(Debug, Clone, Serialize)]
pub struct ListBranchesParams {
    #[serde(skip)]
    pub repo: RepoPath,

    /// Only branches whose name contains this text.
    #[serde(rename = "filterText", skip_serializing_if = "Option::is_none")]
    pub filter_text: Option<String>,

    #[serde(rename = "orderBy", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<BranchOrder>,

    /// Ask the server to include plugin metadata (ahead/behind, PR info).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListBranchesParams {
    /// Lists every branch of `repo` with server defaults.
    pub fn new(repo: RepoPath) -> Self {
        Self {
            repo,
            filter_text: None,
            order_by: None,
            details: None,
            start: None,
            limit: None,
        }
    }
}

/// Parameters for [`BitbucketClient::create_branch`].
#[derive(Debug, Clone)]
pub struct CreateBranchParams {
    /// Repository to create the branch in.
    pub repo: RepoPath,
    /// New branch name; the plugin accepts the short form.
    pub name: String,
    /// Commit id or ref the branch starts from.
    pub start_point: String,
}

/// Parameters for [`BitbucketClient::delete_branch`].
#[derive(Debug, Clone)]
pub struct DeleteBranchParams {
    /// Repository to delete the branch from.
    pub repo: RepoPath,
    /// Branch to delete; normalized to a full ref.
    pub name: String,
    /// Expected tip commit. The delete is refused if the branch moved.
    pub end_point: Option<String>,
    /// Validate without deleting.
    pub dry_run: bool,
}

#[derive(Serialize)]
struct CreateBranchBody<'a> {
    name: &'a str,
    #[serde(rename = "startPoint")]
    start_point: &'a str,
}

#[derive(Serialize)]
struct DeleteBranchBody<'a> {
    name: String,
    #[serde(rename = "endPoint", skip_serializing_if = "Option::is_none")]
    end_point: Option<&'a str>,
    #[serde(rename = "dryRun")]
    dry_run: bool,
}

impl BitbucketClient {
    /// Lists branches of a repository.
    pub async fn list_branches(&self, params: &ListBranchesParams) -> Result<ServerPaginatedResponse<Branch>> {
        let request = self
            .request(Method::GET, ApiBase::Core, params.repo.segments(&["branches"]))?
            .query(params);
        self.send_json(request).await
    }

    /// Creates a branch via the branch-utils plugin.
    pub async fn create_branch(&self, params: &CreateBranchParams) -> Result<Branch> {
        let body = CreateBranchBody {
            name: &params.name,
            start_point: &params.start_point,
        };
        let request = self
            .request(Method::POST, ApiBase::BranchUtils, params.repo.segments(&["branches"]))?
            .json(&body);
        self.send_json(request).await
    }

    /// Deletes a branch via the branch-utils plugin.
    pub async fn delete_branch(&self, params: &DeleteBranchParams) -> Result<()> {
        let body = DeleteBranchBody {
            name: normalize_branch_ref(&params.name),
            end_point: params.end_point.as_deref(),
            dry_run: params.dry_run,
        };
        let request = self
            .request(Method::DELETE, ApiBase::BranchUtils, params.repo.segments(&["branches"]))?
            .json(&body);
        self.send_empty(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: String) -> BitbucketClient {
        BitbucketClient::new(ClientConfig::new(url, "token")).unwrap()
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_branch_ref("release/1.x");
        assert_eq!(normalize_branch_ref(&once), once);
    }

    #[tokio::test]
    async fn test_list_branches_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/PRJ/repos/my-repo/branches")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filterText".into(), "feat".into()),
                Matcher::UrlEncoded("orderBy".into(), "MODIFICATION".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"values": [{"id": "refs/heads/feature-x", "displayId": "feature-x", "type": "BRANCH",
                    "latestCommit": "8d51122def5632836d1cb1026e879069e10a1e13", "isDefault": false}],
                    "size": 1, "limit": 25, "isLastPage": true, "start": 0}"#,
            )
            .create_async()
            .await;

        let mut params = ListBranchesParams::new(RepoPath::new("PRJ", "my-repo"));
        params.filter_text = Some("feat".to_string());
        params.order_by = Some(BranchOrder::Modification);

        let page = client(server.url()).list_branches(&params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.values[0].display_id, "feature-x");
        assert!(!page.values[0].is_default);
    }

    #[tokio::test]
    async fn test_create_branch_uses_branch_utils_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/branch-utils/1.0/projects/PRJ/repos/my-repo/branches")
            .match_body(Matcher::Json(json!({"name": "hotfix", "startPoint": "refs/heads/main"})))
            .with_status(200)
            .with_body(
                r#"{"id": "refs/heads/hotfix", "displayId": "hotfix", "latestCommit": "8d51122def56", "isDefault": false}"#,
            )
            .create_async()
            .await;

        let branch = client(server.url())
            .create_branch(&CreateBranchParams {
                repo: RepoPath::new("PRJ", "my-repo"),
                name: "hotfix".to_string(),
                start_point: "refs/heads/main".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(branch.id, "refs/heads/hotfix");
    }

    #[tokio::test]
    async fn test_delete_branch_normalizes_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/rest/branch-utils/1.0/projects/PRJ/repos/my-repo/branches")
            .match_body(Matcher::Json(json!({"name": "refs/heads/old", "dryRun": false})))
            .with_status(204)
            .create_async()
            .await;

        client(server.url())
            .delete_branch(&DeleteBranchParams {
                repo: RepoPath::new("PRJ", "my-repo"),
                name: "old".to_string(),
                end_point: None,
                dry_run: false,
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_branch_dry_run_with_end_point() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/rest/branch-utils/1.0/projects/PRJ/repos/my-repo/branches")
            .match_body(Matcher::Json(json!({
                "name": "refs/heads/release/1.x",
                "endPoint": "8d51122def5632836d1cb1026e879069e10a1e13",
                "dryRun": true
            })))
            .with_status(204)
            .create_async()
            .await;

        client(server.url())
            .delete_branch(&DeleteBranchParams {
                repo: RepoPath::new("PRJ", "my-repo"),
                name: "refs/heads/release/1.x".to_string(),
                end_point: Some("8d51122def5632836d1cb1026e879069e10a1e13".to_string()),
                dry_run: true,
            })
            .await
            .unwrap();

        mock.assert_async().await;
    }
}

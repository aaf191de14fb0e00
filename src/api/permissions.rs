//
//  bitbucket-server-client
//  api/permissions.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Write Permission Check
//!
//! Bitbucket Server has no endpoint that answers "may I write to this
//! repository?" for an arbitrary token. The check infers it instead:
//!
//! 1. Read the repository. Failures here propagate, so a missing repository
//!    or missing read access is reported as an error, not as `false`.
//! 2. Attempt to create a pull request with an empty body. The server checks
//!    permissions before validating the payload, so:
//!    - `400` complaining about a missing or required field means the caller
//!      got past the permission check: write access is granted
//!    - `401` / `403` means it did not
//!    - anything else propagates unchanged
//!
//! This depends on the wording of server validation messages and may need
//! adjusting for future server versions.

use reqwest::Method;

use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{ApiError, Result};
use crate::api::repositories::RepoPath;

/// Fragments of validation messages that indicate a missing field.
const MISSING_FIELD_MARKERS: &[&str] = &[
    "required",
    "missing",
    "must be specified",
    "must be provided",
    "may not be null",
    "must not be null",
    "please enter",
];

/// Returns `true` if a 400 message reports a missing or required field.
pub fn is_missing_field_message(message: &str) -> bool {
    let message = message.to_lowercase();
    MISSING_FIELD_MARKERS.iter().any(|marker| message.contains(marker))
}

impl BitbucketClient {
    /// Checks whether the caller may write to `repo`.
    ///
    /// Issues up to two requests; see the module documentation.
    pub async fn check_write_permission(&self, repo: &RepoPath) -> Result<bool> {
        self.get_repository(repo).await?;

        let request = self
            .request(Method::POST, ApiBase::Core, repo.segments(&["pull-requests"]))?
            .json(&serde_json::json!({}));

        match self.send_empty(request).await {
            Ok(()) => {
                tracing::debug!("Empty pull request accepted for {}; treating as writable", repo);
                Ok(true)
            }
            Err(ApiError::BadRequest(message)) if is_missing_field_message(&message) => {
                tracing::debug!("Validation reached for {}: {}", repo, message);
                Ok(true)
            }
            Err(ApiError::Unauthorized(message)) | Err(ApiError::Forbidden(message)) => {
                tracing::debug!("Write denied for {}: {}", repo, message);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use mockito::{Matcher, Mock, ServerGuard};

    const REPO_JSON: &str = r#"{"slug": "my-repo", "id": 1, "name": "My repo", "project": {"key": "PRJ"}}"#;
    const REPO_PATH: &str = "/rest/api/1.0/projects/PRJ/repos/my-repo";
    const PR_PATH: &str = "/rest/api/1.0/projects/PRJ/repos/my-repo/pull-requests";

    async fn repo_mock(server: &mut ServerGuard) -> Mock {
        server
            .mock("GET", REPO_PATH)
            .with_status(200)
            .with_body(REPO_JSON)
            .expect(1)
            .create_async()
            .await
    }

    async fn create_attempt_mock(server: &mut ServerGuard, status: usize, body: &str) -> Mock {
        server
            .mock("POST", PR_PATH)
            .match_body(Matcher::Json(serde_json::json!({})))
            .with_status(status)
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    async fn check(server: &ServerGuard) -> Result<bool> {
        BitbucketClient::new(ClientConfig::new(server.url(), "token"))
            .unwrap()
            .check_write_permission(&RepoPath::new("PRJ", "my-repo"))
            .await
    }

    #[test]
    fn test_missing_field_messages() {
        assert!(is_missing_field_message("fromRef: This field is required."));
        assert!(is_missing_field_message("Please enter a non-blank title"));
        assert!(!is_missing_field_message("Only one pull request may be open for a given source and target branch"));
    }

    #[tokio::test]
    async fn test_missing_field_means_writable() {
        let mut server = mockito::Server::new_async().await;
        let repo = repo_mock(&mut server).await;
        let attempt = create_attempt_mock(
            &mut server,
            400,
            r#"{"errors": [{"context": "title", "message": "A title is required.", "exceptionName": null}]}"#,
        )
        .await;

        assert!(check(&server).await.unwrap());
        repo.assert_async().await;
        attempt.assert_async().await;
    }

    #[tokio::test]
    async fn test_unexpected_success_means_writable() {
        let mut server = mockito::Server::new_async().await;
        let repo = repo_mock(&mut server).await;
        let attempt = create_attempt_mock(&mut server, 201, "{}").await;

        assert!(check(&server).await.unwrap());
        repo.assert_async().await;
        attempt.assert_async().await;
    }

    #[tokio::test]
    async fn test_forbidden_means_read_only() {
        let mut server = mockito::Server::new_async().await;
        let repo = repo_mock(&mut server).await;
        let attempt = create_attempt_mock(
            &mut server,
            403,
            r#"{"errors": [{"message": "You are not permitted to access this resource"}]}"#,
        )
        .await;

        assert!(!check(&server).await.unwrap());
        repo.assert_async().await;
        attempt.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_means_read_only() {
        let mut server = mockito::Server::new_async().await;
        let _repo = repo_mock(&mut server).await;
        let _attempt = create_attempt_mock(&mut server, 401, "").await;

        assert!(!check(&server).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_bad_request_propagates() {
        let mut server = mockito::Server::new_async().await;
        let _repo = repo_mock(&mut server).await;
        let _attempt = create_attempt_mock(
            &mut server,
            400,
            r#"{"errors": [{"message": "Repository is archived"}]}"#,
        )
        .await;

        let err = check(&server).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == "Repository is archived"));
    }

    #[tokio::test]
    async fn test_missing_repository_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _repo = server
            .mock("GET", REPO_PATH)
            .with_status(404)
            .with_body(r#"{"errors": [{"message": "Repository PRJ/my-repo does not exist."}]}"#)
            .create_async()
            .await;
        let attempt = server.mock("POST", PR_PATH).expect(0).create_async().await;

        let err = check(&server).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        attempt.assert_async().await;
    }
}

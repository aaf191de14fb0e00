//
//  bitbucket-server-client
//  api/diff.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Pull Request Diffs and Changes
//!
//! The diff endpoint serves two representations of the same comparison,
//! selected by the `Accept` header:
//!
//! - `text/plain` - a unified diff, as produced by `git diff`
//! - `application/json` - the structured [`Diffs`] model (files, hunks,
//!   segments, lines) that Bitbucket's own UI renders
//!
//! ```text
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/diff[/{path}]
//! GET /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/changes
//! ```

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{PageParams, Result, ServerPaginatedResponse};
use crate::api::pullrequests::PullRequestPath;
use crate::api::repositories::file_segments;

/// Path of a file as Bitbucket reports it in changes and diffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePath {
    #[serde(default)]
    pub components: Vec<String>,

    #[serde(default)]
    pub parent: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub extension: Option<String>,

    /// Full path joined with `/`.
    #[serde(rename = "toString")]
    pub full_path: String,
}

/// Kind of change applied to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Add,
    Modify,
    Delete,
    Move,
    Copy,
    #[serde(other)]
    Unknown,
}

/// A file touched by a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "contentId", default)]
    pub content_id: Option<String>,

    #[serde(rename = "fromContentId", default)]
    pub from_content_id: Option<String>,

    pub path: ChangePath,

    /// Previous path for moves and copies.
    #[serde(rename = "srcPath", default)]
    pub src_path: Option<ChangePath>,

    #[serde(default)]
    pub executable: bool,

    #[serde(rename = "percentUnchanged", default)]
    pub percent_unchanged: Option<i32>,

    #[serde(rename = "type")]
    pub change_type: ChangeType,

    /// `FILE` or `SUBMODULE`.
    #[serde(rename = "nodeType", default)]
    pub node_type: Option<String>,
}

/// Structured diff response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diffs {
    #[serde(rename = "fromHash", default)]
    pub from_hash: Option<String>,

    #[serde(rename = "toHash", default)]
    pub to_hash: Option<String>,

    #[serde(rename = "contextLines", default)]
    pub context_lines: Option<u32>,

    #[serde(default)]
    pub whitespace: Option<String>,

    #[serde(default)]
    pub diffs: Vec<Diff>,

    #[serde(default)]
    pub truncated: bool,
}

/// Comparison of a single file.
///
/// `source` is absent for added files, `destination` for deleted ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diff {
    #[serde(default)]
    pub source: Option<ChangePath>,

    #[serde(default)]
    pub destination: Option<ChangePath>,

    #[serde(default)]
    pub hunks: Vec<DiffHunk>,

    #[serde(default)]
    pub binary: bool,

    #[serde(default)]
    pub truncated: bool,
}

impl Diff {
    /// Path to show for this file: the destination, or the source for deletions.
    pub fn display_path(&self) -> Option<&str> {
        self.destination
            .as_ref()
            .or(self.source.as_ref())
            .map(|p| p.full_path.as_str())
    }
}

/// A contiguous region of a file comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffHunk {
    #[serde(rename = "sourceLine", default)]
    pub source_line: u32,

    #[serde(rename = "sourceSpan", default)]
    pub source_span: u32,

    #[serde(rename = "destinationLine", default)]
    pub destination_line: u32,

    #[serde(rename = "destinationSpan", default)]
    pub destination_span: u32,

    /// Enclosing function or class signature, when detected.
    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub segments: Vec<DiffSegment>,

    #[serde(default)]
    pub truncated: bool,
}

/// Whether lines were added, removed or left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineType {
    Added,
    Removed,
    Context,
}

/// A run of lines sharing the same [`LineType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffSegment {
    #[serde(rename = "type")]
    pub segment_type: LineType,

    #[serde(default)]
    pub lines: Vec<DiffLine>,

    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    /// Line number in the source file (0 for added lines).
    #[serde(default)]
    pub source: u32,

    /// Line number in the destination file (0 for removed lines).
    #[serde(default)]
    pub destination: u32,

    pub line: String,

    #[serde(default)]
    pub truncated: bool,

    /// Ids of comments anchored to this line.
    #[serde(rename = "commentIds", default)]
    pub comment_ids: Vec<u64>,
}

/// Parameters for [`BitbucketClient::get_pull_request_diff`] and
/// [`BitbucketClient::get_pull_request_diff_json`].
#[derive(Debug, Clone, Serialize)]
pub struct GetDiffParams {
    #[serde(skip)]
    pub pr: PullRequestPath,

    /// Restrict the diff to a single file.
    #[serde(skip)]
    pub path: Option<String>,

    #[serde(rename = "contextLines", skip_serializing_if = "Option::is_none")]
    pub context_lines: Option<u32>,

    /// `ignore-all` to ignore whitespace changes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whitespace: Option<String>,
}

impl GetDiffParams {
    /// Full diff of `pr` with server defaults.
    pub fn new(pr: PullRequestPath) -> Self {
        Self {
            pr,
            path: None,
            context_lines: None,
            whitespace: None,
        }
    }

    fn segments(&self) -> Vec<String> {
        let mut segments = self.pr.segments(&["diff"]);
        if let Some(path) = &self.path {
            segments.extend(file_segments(path).map(str::to_string));
        }
        segments
    }
}

impl BitbucketClient {
    /// Lists the files a pull request changes.
    pub async fn get_pull_request_changes(
        &self,
        pr: &PullRequestPath,
        page: &PageParams,
    ) -> Result<ServerPaginatedResponse<Change>> {
        let request = self
            .request(Method::GET, ApiBase::Core, pr.segments(&["changes"]))?
            .query(page);
        self.send_json(request).await
    }

    /// Fetches the pull request diff as unified diff text.
    pub async fn get_pull_request_diff(&self, params: &GetDiffParams) -> Result<String> {
        let request = self
            .request(Method::GET, ApiBase::Core, params.segments())?
            .query(params);
        self.send_text(request).await
    }

    /// Fetches the pull request diff as the structured model.
    pub async fn get_pull_request_diff_json(&self, params: &GetDiffParams) -> Result<Diffs> {
        let request = self
            .request(Method::GET, ApiBase::Core, params.segments())?
            .query(params);
        self.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::repositories::RepoPath;
    use crate::config::ClientConfig;
    use mockito::Matcher;

    const DIFF_TEXT: &str = "diff --git a/src/lib.rs b/src/lib.rs\n\
        --- a/src/lib.rs\n\
        +++ b/src/lib.rs\n\
        @@ -1,2 +1,2 @@\n\
        -pub fn old() {}\n\
        +pub fn new() {}\n";

    const DIFF_JSON: &str = r#"{
        "fromHash": "abc", "toHash": "def", "contextLines": 3, "whitespace": "SHOW",
        "diffs": [{
            "source": {"components": ["src", "lib.rs"], "parent": "src", "name": "lib.rs",
                       "extension": "rs", "toString": "src/lib.rs"},
            "destination": {"components": ["src", "lib.rs"], "parent": "src", "name": "lib.rs",
                            "extension": "rs", "toString": "src/lib.rs"},
            "hunks": [{
                "sourceLine": 1, "sourceSpan": 2, "destinationLine": 1, "destinationSpan": 2,
                "segments": [
                    {"type": "REMOVED", "lines": [{"source": 1, "destination": 1, "line": "pub fn old() {}"}]},
                    {"type": "ADDED", "lines": [{"source": 1, "destination": 1, "line": "pub fn new() {}", "commentIds": [7]}]}
                ]
            }]
        }, {
            "source": {"components": ["OLD.md"], "parent": "", "name": "OLD.md", "toString": "OLD.md"},
            "hunks": []
        }],
        "truncated": false
    }"#;

    fn pr() -> PullRequestPath {
        PullRequestPath::new(RepoPath::new("PRJ", "my-repo"), 7)
    }

    fn client(url: String) -> BitbucketClient {
        BitbucketClient::new(ClientConfig::new(url, "token")).unwrap()
    }

    #[tokio::test]
    async fn test_text_diff_negotiates_plain_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/PRJ/repos/my-repo/pull-requests/7/diff")
            .match_header("accept", "text/plain")
            .match_query(Matcher::UrlEncoded("contextLines".into(), "10".into()))
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body(DIFF_TEXT)
            .create_async()
            .await;

        let mut params = GetDiffParams::new(pr());
        params.context_lines = Some(10);
        let diff = client(server.url()).get_pull_request_diff(&params).await.unwrap();

        mock.assert_async().await;
        assert_eq!(diff, DIFF_TEXT);
    }

    #[tokio::test]
    async fn test_json_diff_for_single_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/PRJ/repos/my-repo/pull-requests/7/diff/src/lib.rs")
            .match_header("accept", "application/json")
            .match_query(Matcher::UrlEncoded("whitespace".into(), "ignore-all".into()))
            .with_status(200)
            .with_body(DIFF_JSON)
            .create_async()
            .await;

        let mut params = GetDiffParams::new(pr());
        params.path = Some("src/lib.rs".to_string());
        params.whitespace = Some("ignore-all".to_string());
        let diffs = client(server.url()).get_pull_request_diff_json(&params).await.unwrap();

        mock.assert_async().await;
        let hunk = &diffs.diffs[0].hunks[0];
        assert_eq!(hunk.segments[0].segment_type, LineType::Removed);
        assert_eq!(hunk.segments[1].lines[0].comment_ids, vec![7]);
        assert_eq!(diffs.diffs[1].display_path(), Some("OLD.md"));
    }

    #[tokio::test]
    async fn test_changes_decode_types() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/PRJ/repos/my-repo/pull-requests/7/changes")
            .with_status(200)
            .with_body(
                r#"{"values": [
                    {"contentId": "abc", "path": {"components": ["a.txt"], "name": "a.txt", "toString": "a.txt"},
                     "type": "ADD", "nodeType": "FILE"},
                    {"contentId": "def", "path": {"components": ["b.txt"], "name": "b.txt", "toString": "b.txt"},
                     "srcPath": {"components": ["c.txt"], "name": "c.txt", "toString": "c.txt"},
                     "type": "MOVE", "percentUnchanged": 98},
                    {"path": {"toString": "d.txt"}, "type": "UNKNOWN_FUTURE"}
                ], "size": 3, "limit": 25, "isLastPage": true, "start": 0}"#,
            )
            .create_async()
            .await;

        let page = client(server.url())
            .get_pull_request_changes(&pr(), &PageParams::default())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.values[0].change_type, ChangeType::Add);
        assert_eq!(page.values[1].src_path.as_ref().unwrap().full_path, "c.txt");
        assert_eq!(page.values[2].change_type, ChangeType::Unknown);
    }
}

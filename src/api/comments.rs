//
//  bitbucket-server-client
//  api/comments.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Pull Request Comments
//!
//! Comments are either general (attached to the pull request as a whole),
//! replies (carrying a parent id), or inline (carrying a [`CommentAnchor`]
//! that pins them to a file and optionally a line of the diff).
//!
//! Like pull requests, comments are versioned: updates and deletes must
//! echo the version the caller last saw or the server answers 409.
//!
//! ```text
//! POST          /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/comments
//! GET/PUT       /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/comments/{commentId}
//! DELETE        /rest/api/1.0/projects/{projectKey}/repos/{repoSlug}/pull-requests/{pullRequestId}/comments/{commentId}?version={version}
//! ```

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{datetime_from_millis, Result};
use crate::api::diff::LineType;
use crate::api::pullrequests::PullRequestPath;
use crate::api::users::User;

/// A comment on a pull request, with its replies nested under `comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,

    #[serde(default)]
    pub version: u64,

    #[serde(default)]
    pub text: String,

    pub author: User,

    #[serde(rename = "createdDate", default)]
    pub created_date: i64,

    #[serde(rename = "updatedDate", default)]
    pub updated_date: i64,

    /// Replies, oldest first.
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// `NORMAL` or `BLOCKER` (tasks).
    #[serde(default)]
    pub severity: Option<String>,

    /// `OPEN` or `RESOLVED`.
    #[serde(default)]
    pub state: Option<String>,

    /// Present on inline comments only.
    #[serde(default)]
    pub anchor: Option<CommentAnchor>,
}

impl Comment {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        datetime_from_millis(self.created_date)
    }

    /// Counts this comment and all of its nested replies.
    pub fn thread_len(&self) -> usize {
        1 + self.comments.iter().map(Comment::thread_len).sum::<usize>()
    }
}

/// Which side of the diff a line anchor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileType {
    /// The source (old) side.
    From,
    /// The destination (new) side.
    To,
}

/// Places a comment on a file, and optionally a line, of the diff.
///
/// A file-level comment sets only `path`. A line comment also sets
/// `line`, `line_type` and `file_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentAnchor {
    pub path: String,

    /// Previous path when the file was moved.
    #[serde(rename = "srcPath", skip_serializing_if = "Option::is_none", default)]
    pub src_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line: Option<u32>,

    #[serde(rename = "lineType", skip_serializing_if = "Option::is_none", default)]
    pub line_type: Option<LineType>,

    #[serde(rename = "fileType", skip_serializing_if = "Option::is_none", default)]
    pub file_type: Option<FileType>,

    /// `EFFECTIVE`, `COMMIT` or `RANGE`.
    #[serde(rename = "diffType", skip_serializing_if = "Option::is_none", default)]
    pub diff_type: Option<String>,

    #[serde(rename = "fromHash", skip_serializing_if = "Option::is_none", default)]
    pub from_hash: Option<String>,

    #[serde(rename = "toHash", skip_serializing_if = "Option::is_none", default)]
    pub to_hash: Option<String>,
}

impl CommentAnchor {
    /// Anchors to a line on the destination side of the diff.
    pub fn added_line(path: impl Into<String>, line: u32) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
            line_type: Some(LineType::Added),
            file_type: Some(FileType::To),
            ..Default::default()
        }
    }
}

/// Parameters for [`BitbucketClient::add_comment`].
#[derive(Debug, Clone)]
pub struct AddCommentParams {
    pub pr: PullRequestPath,
    pub text: String,
    /// Reply to this comment.
    pub parent_id: Option<u64>,
    pub anchor: Option<CommentAnchor>,
}

/// Parameters for [`BitbucketClient::update_comment`].
#[derive(Debug, Clone)]
pub struct UpdateCommentParams {
    pub pr: PullRequestPath,
    pub comment_id: u64,
    pub version: u64,
    pub text: String,
}

#[derive(Serialize)]
struct ParentRef {
    id: u64,
}

#[derive(Serialize)]
struct AddCommentBody<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<ParentRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<&'a CommentAnchor>,
}

#[derive(Serialize)]
struct UpdateCommentBody<'a> {
    text: &'a str,
    version: u64,
}

impl BitbucketClient {
    /// Adds a general, reply or inline comment.
    pub async fn add_comment(&self, params: &AddCommentParams) -> Result<Comment> {
        let body = AddCommentBody {
            text: &params.text,
            parent: params.parent_id.map(|id| ParentRef { id }),
            anchor: params.anchor.as_ref(),
        };
        let request = self
            .request(Method::POST, ApiBase::Core, params.pr.segments(&["comments"]))?
            .json(&body);
        self.send_json(request).await
    }

    /// Fetches a comment with its replies.
    pub async fn get_comment(&self, pr: &PullRequestPath, comment_id: u64) -> Result<Comment> {
        let id = comment_id.to_string();
        let request = self.request(Method::GET, ApiBase::Core, pr.segments(&["comments", id.as_str()]))?;
        self.send_json(request).await
    }

    /// Replaces the text of a comment.
    pub async fn update_comment(&self, params: &UpdateCommentParams) -> Result<Comment> {
        let id = params.comment_id.to_string();
        let body = UpdateCommentBody {
            text: &params.text,
            version: params.version,
        };
        let request = self
            .request(Method::PUT, ApiBase::Core, params.pr.segments(&["comments", id.as_str()]))?
            .json(&body);
        self.send_json(request).await
    }

    /// Deletes a comment. Comments with replies cannot be deleted.
    pub async fn delete_comment(&self, pr: &PullRequestPath, comment_id: u64, version: u64) -> Result<()> {
        let id = comment_id.to_string();
        let request = self
            .request(Method::DELETE, ApiBase::Core, pr.segments(&["comments", id.as_str()]))?
            .query(&[("version", version)]);
        self.send_empty(request).await
    }
}

//
//  bitbucket-server-client
//  api/activities.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Pull request activity stream: comments, reviews, rescopes and state
//! transitions, newest first.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::comments::{Comment, CommentAnchor};
use crate::api::common::{datetime_from_millis, Result, ServerPaginatedResponse};
use crate::api::pullrequests::PullRequestPath;
use crate::api::users::User;

/// What happened in an [`Activity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Approved,
    Commented,
    Declined,
    Deleted,
    Merged,
    Opened,
    Reopened,
    Rescoped,
    Reviewed,
    Unapproved,
    Updated,
    #[serde(other)]
    Other,
}

/// A single entry of the activity stream.
///
/// Which optional fields are present depends on `action`: comment
/// activities carry `comment` (and `comment_anchor` when inline), rescopes
/// carry the hash fields and the added/removed commits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,

    #[serde(rename = "createdDate", default)]
    pub created_date: i64,

    pub user: User,

    pub action: ActivityAction,

    /// `ADDED`, `EDITED`, `REPLIED` or `DELETED`.
    #[serde(rename = "commentAction", default)]
    pub comment_action: Option<String>,

    #[serde(default)]
    pub comment: Option<Comment>,

    #[serde(rename = "commentAnchor", default)]
    pub comment_anchor: Option<CommentAnchor>,

    #[serde(rename = "fromHash", default)]
    pub from_hash: Option<String>,

    #[serde(rename = "previousFromHash", default)]
    pub previous_from_hash: Option<String>,

    #[serde(rename = "toHash", default)]
    pub to_hash: Option<String>,

    #[serde(rename = "previousToHash", default)]
    pub previous_to_hash: Option<String>,
}

impl Activity {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        datetime_from_millis(self.created_date)
    }

    /// True for approvals, unapprovals and needs-work reviews.
    pub fn is_review(&self) -> bool {
        matches!(
            self.action,
            ActivityAction::Approved | ActivityAction::Unapproved | ActivityAction::Reviewed
        )
    }
}

/// Kind of item `from_id` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityFromType {
    Comment,
    Activity,
}

/// Parameters for [`BitbucketClient::list_activities`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListActivitiesParams {
    /// Start the stream at this comment or activity id.
    #[serde(rename = "fromId", skip_serializing_if = "Option::is_none")]
    pub from_id: Option<u64>,

    /// Required whenever `from_id` is set.
    #[serde(rename = "fromType", skip_serializing_if = "Option::is_none")]
    pub from_type: Option<ActivityFromType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl BitbucketClient {
    /// Lists the activity stream of a pull request.
    pub async fn list_activities(
        &self,
        pr: &PullRequestPath,
        params: &ListActivitiesParams,
    ) -> Result<ServerPaginatedResponse<Activity>> {
        let request = self
            .request(Method::GET, ApiBase::Core, pr.segments(&["activities"]))?
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

    #[tokio::test]
    async fn test_list_activities_mixed_stream() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/PRJ/repos/my-repo/pull-requests/101/activities")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("fromId".into(), "9".into()),
                Matcher::UrlEncoded("fromType".into(), "COMMENT".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"values": [
                    {"id": 12, "createdDate": 1359075920000, "user": {"name": "jcitizen"},
                     "action": "COMMENTED", "commentAction": "ADDED",
                     "comment": {"id": 9, "version": 0, "text": "Nice", "author": {"name": "jcitizen"}},
                     "commentAnchor": {"path": "src/lib.rs", "line": 3, "lineType": "CONTEXT", "fileType": "FROM"}},
                    {"id": 11, "createdDate": 1359075910000, "user": {"name": "tom"}, "action": "APPROVED"},
                    {"id": 10, "createdDate": 1359075900000, "user": {"name": "tom"}, "action": "RESCOPED",
                     "fromHash": "abc", "previousFromHash": "aaa", "toHash": "def", "previousToHash": "def"},
                    {"id": 8, "createdDate": 1359075800000, "user": {"name": "bot"}, "action": "AUTO_MERGE_CANCELLED"}
                ], "size": 4, "limit": 25, "isLastPage": false, "nextPageStart": 4, "start": 0}"#,
            )
            .create_async()
            .await;

        let client = BitbucketClient::new(ClientConfig::new(server.url(), "token")).unwrap();
        let page = client
            .list_activities(
                &PullRequestPath::new(RepoPath::new("PRJ", "my-repo"), 101),
                &ListActivitiesParams {
                    from_id: Some(9),
                    from_type: Some(ActivityFromType::Comment),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.next_start(), Some(4));

        let commented = &page.values[0];
        assert_eq!(commented.action, ActivityAction::Commented);
        assert_eq!(commented.comment.as_ref().unwrap().text, "Nice");
        assert_eq!(commented.comment_anchor.as_ref().unwrap().line, Some(3));

        assert!(page.values[1].is_review());
        assert_eq!(page.values[2].previous_from_hash.as_deref(), Some("aaa"));
        assert_eq!(page.values[3].action, ActivityAction::Other);
    }
}

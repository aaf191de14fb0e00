//
//  bitbucket-server-client
//  api/users.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC User API
//!
//! User records and the user endpoints.
//!
//! ## API Endpoints
//!
//! ```text
//! GET /rest/api/1.0/users
//! GET /rest/api/1.0/users/{userSlug}
//! GET /plugins/servlet/applinks/whoami
//! ```
//!
//! The REST API has no "who am I" resource. The current user is resolved via
//! the applinks `whoami` servlet, which answers with the plain-text username
//! of the authenticated caller, followed by a regular user lookup.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{ApiError, Links, Result, ServerPaginatedResponse};

/// Represents a user in Bitbucket Server/Data Center.
///
/// Used throughout the API to represent authors, reviewers, and other
/// participants.
///
/// # Fields
///
/// * `id` - Unique numeric identifier for the user
/// * `name` - Username (login name)
/// * `display_name` - Full display name
/// * `email_address` - Email address (may be hidden by privacy settings)
/// * `slug` - URL-safe version of the username, used in paths
/// * `active` - Whether the account is enabled
/// * `user_type` - `NORMAL` or `SERVICE`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique numeric identifier for the user.
    #[serde(default)]
    pub id: u64,

    /// Username (login name) for the user.
    pub name: String,

    /// Full display name of the user.
    #[serde(rename = "displayName", default)]
    pub display_name: String,

    /// Email address of the user.
    /// May be `None` if hidden by privacy settings.
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,

    /// URL-safe version of the username.
    #[serde(default)]
    pub slug: Option<String>,

    /// Whether the user account is active.
    #[serde(default)]
    pub active: bool,

    /// Account type: `NORMAL` or `SERVICE`.
    #[serde(rename = "type", default)]
    pub user_type: Option<String>,

    /// Links to the user's profile.
    #[serde(default)]
    pub links: Links,
}

impl User {
    /// Returns the slug used in user paths, falling back to the login name.
    pub fn path_slug(&self) -> &str {
        self.slug.as_deref().unwrap_or(&self.name)
    }
}

/// Query parameters for [`BitbucketClient::list_users`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListUsersParams {
    /// Matches username, display name or email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl BitbucketClient {
    /// Returns the username of the authenticated caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the server treats the caller
    /// as anonymous.
    pub async fn whoami(&self) -> Result<String> {
        let request = self.request(
            Method::GET,
            ApiBase::Root,
            ["plugins", "servlet", "applinks", "whoami"],
        )?;
        let username = self.send_text(request).await?;
        let username = username.trim();

        if username.is_empty() || username == "anonymous" {
            return Err(ApiError::Unauthorized(
                "request was treated as anonymous".to_string(),
            ));
        }

        Ok(username.to_string())
    }

    /// Fetches the full record of the authenticated caller.
    ///
    /// Issues two requests: the identity lookup and a user lookup.
    pub async fn get_current_user(&self) -> Result<User> {
        let username = self.whoami().await?;
        self.get_user(&username).await
    }

    /// Fetches a user by slug.
    pub async fn get_user(&self, slug: &str) -> Result<User> {
        let request = self.request(Method::GET, ApiBase::Core, ["users", slug])?;
        self.send_json(request).await
    }

    /// Lists users visible to the caller.
    pub async fn list_users(&self, params: &ListUsersParams) -> Result<ServerPaginatedResponse<User>> {
        let request = self.request(Method::GET, ApiBase::Core, ["users"])?.query(params);
        self.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use mockito::Matcher;

    fn client(url: &str) -> BitbucketClient {
        BitbucketClient::new(ClientConfig::new(url, "token")).unwrap()
    }

    const USER_JSON: &str = r#"{
        "name": "jsmith",
        "emailAddress": "jsmith@example.com",
        "id": 101,
        "displayName": "Jane Smith",
        "active": true,
        "slug": "jsmith",
        "type": "NORMAL",
        "links": {"self": [{"href": "https://bb.example.com/users/jsmith"}]}
    }"#;

    #[test]
    fn test_path_slug_falls_back_to_name() {
        let user: User = serde_json::from_str(r#"{"name": "svc-bot"}"#).unwrap();
        assert_eq!(user.path_slug(), "svc-bot");
        assert_eq!(user.display_name, "");
    }

    #[tokio::test]
    async fn test_get_current_user_resolves_whoami() {
        let mut server = mockito::Server::new_async().await;

        let whoami = server
            .mock("GET", "/plugins/servlet/applinks/whoami")
            .match_header("authorization", "Bearer token")
            .with_status(200)
            .with_body("jsmith\n")
            .create_async()
            .await;
        let user = server
            .mock("GET", "/rest/api/1.0/users/jsmith")
            .match_header("authorization", "Bearer token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(USER_JSON)
            .create_async()
            .await;

        let result = client(&server.url()).get_current_user().await.unwrap();

        whoami.assert_async().await;
        user.assert_async().await;
        assert_eq!(result.id, 101);
        assert_eq!(result.display_name, "Jane Smith");
        assert_eq!(result.email_address.as_deref(), Some("jsmith@example.com"));
    }

    #[tokio::test]
    async fn test_whoami_anonymous_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/plugins/servlet/applinks/whoami")
            .with_status(200)
            .with_body("anonymous")
            .create_async()
            .await;

        let err = client(&server.url()).whoami().await.unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_list_users_passes_filter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/users")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter".into(), "jane".into()),
                Matcher::UrlEncoded("limit".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(format!(
                r#"{{"values": [{}], "size": 1, "limit": 10, "isLastPage": true, "start": 0}}"#,
                USER_JSON
            ))
            .create_async()
            .await;

        let page = client(&server.url())
            .list_users(&ListUsersParams {
                filter: Some("jane".to_string()),
                limit: Some(10),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.values.len(), 1);
        assert_eq!(page.values[0].name, "jsmith");
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/users/ghost")
            .with_status(404)
            .with_body(r#"{"errors": [{"message": "User ghost does not exist."}]}"#)
            .create_async()
            .await;

        let err = client(&server.url()).get_user("ghost").await.unwrap_err();

        mock.assert_async().await;
        match err {
            ApiError::NotFound(message) => assert_eq!(message, "User ghost does not exist."),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

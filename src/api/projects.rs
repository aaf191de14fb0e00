//
//  bitbucket-server-client
//  api/projects.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bitbucket Server/DC Project API
//!
//! Projects are the top-level organizational unit in Bitbucket Server/DC.
//! Every repository belongs to exactly one project, identified by a short
//! uppercase key such as `PROJ`. Personal projects use `~username` keys.
//!
//! ## API Endpoints
//!
//! ```text
//! GET /rest/api/1.0/projects
//! GET /rest/api/1.0/projects/{projectKey}
//! ```

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{ApiBase, BitbucketClient};
use crate::api::common::{Links, Result, ServerPaginatedResponse};

/// Represents a project in Bitbucket Server/Data Center.
///
/// # Fields
///
/// * `id` - Unique numeric identifier for the project
/// * `key` - Short uppercase key used in URLs
/// * `name` - Human-readable display name
/// * `description` - Optional description
/// * `is_public` - Whether the project is publicly accessible
/// * `project_type` - `NORMAL` or `PERSONAL`
/// * `links` - Navigation links
///
/// # Example
///
/// ```rust
/// use bitbucket_server_client::api::projects::Project;
///
/// let json = r#"{"key": "PRJ", "id": 1, "name": "My Cool Project", "public": true, "type": "NORMAL"}"#;
/// let project: Project = serde_json::from_str(json).unwrap();
/// assert_eq!(project.key, "PRJ");
/// assert!(project.is_public);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique numeric identifier assigned by Bitbucket Server.
    #[serde(default)]
    pub id: u64,

    /// Short uppercase key used in URLs and API paths.
    pub key: String,

    /// Human-readable display name of the project.
    #[serde(default)]
    pub name: String,

    /// Optional description of the project's purpose.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the project is publicly accessible.
    #[serde(rename = "public", default)]
    pub is_public: bool,

    /// Type of project: `NORMAL` or `PERSONAL`.
    #[serde(rename = "type", default)]
    pub project_type: Option<String>,

    /// Navigation links for the project.
    #[serde(default)]
    pub links: Links,
}

/// Query parameters for [`BitbucketClient::list_projects`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListProjectsParams {
    /// Only projects whose name contains this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Only projects the caller holds this permission on
    /// (e.g. `PROJECT_READ`, `PROJECT_WRITE`, `PROJECT_ADMIN`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,

    /// Page offset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,

    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl BitbucketClient {
    /// Lists projects visible to the caller.
    pub async fn list_projects(
        &self,
        params: &ListProjectsParams,
    ) -> Result<ServerPaginatedResponse<Project>> {
        let request = self
            .request(Method::GET, ApiBase::Core, ["projects"])?
            .query(params);
        self.send_json(request).await
    }

    /// Fetches a single project by key.
    pub async fn get_project(&self, key: &str) -> Result<Project> {
        let request = self.request(Method::GET, ApiBase::Core, ["projects", key])?;
        self.send_json(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_list_projects_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "core".into()),
                Matcher::UrlEncoded("permission".into(), "PROJECT_WRITE".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"{"values": [{"key": "CORE", "id": 3, "name": "Core Platform", "type": "NORMAL"}],
                    "size": 1, "limit": 25, "isLastPage": true, "start": 0}"#,
            )
            .create_async()
            .await;

        let client = BitbucketClient::new(ClientConfig::new(server.url(), "token")).unwrap();
        let page = client
            .list_projects(&ListProjectsParams {
                name: Some("core".to_string()),
                permission: Some("PROJECT_WRITE".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(page.values[0].key, "CORE");
        assert_eq!(page.values[0].project_type.as_deref(), Some("NORMAL"));
    }

    #[tokio::test]
    async fn test_get_personal_project_encodes_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/api/1.0/projects/~jsmith")
            .with_status(200)
            .with_body(r#"{"key": "~JSMITH", "id": 9, "name": "Jane Smith", "type": "PERSONAL"}"#)
            .create_async()
            .await;

        let client = BitbucketClient::new(ClientConfig::new(server.url(), "token")).unwrap();
        let project = client.get_project("~jsmith").await.unwrap();

        mock.assert_async().await;
        assert_eq!(project.key, "~JSMITH");
    }
}

//
//  bitbucket-server-client
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Credentials attached to every outgoing request.
//!
//! ## Supported Authentication Methods
//!
//! - **Bearer token**: Personal Access Tokens and HTTP access tokens issued
//!   by Bitbucket Server/Data Center. This is what
//!   [`ClientConfig::token`](crate::config::ClientConfig::token) produces.
//! - **Basic Authentication**: Username/password, for instances that still
//!   have basic auth enabled.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_server_client::auth::AuthCredential;
//!
//! let credential = AuthCredential::bearer("NjM0NTY3ODkw");
//! assert!(credential.is_bearer());
//!
//! // Secrets never show up in debug output
//! assert!(!format!("{:?}", credential).contains("NjM0NTY3ODkw"));
//! ```

use std::fmt;

use reqwest::RequestBuilder;

/// Authentication credentials for Bitbucket Server/Data Center.
///
/// # Variants
///
/// - `Bearer`: token sent as `Authorization: Bearer <token>`.
/// - `Basic`: standard HTTP Basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthCredential {
    /// Personal access token or HTTP access token.
    Bearer {
        /// The token string.
        token: String,
    },
    /// Basic HTTP authentication with username and password.
    Basic {
        /// The username for authentication.
        username: String,
        /// The password for authentication.
        password: String,
    },
}

impl AuthCredential {
    /// Creates a bearer token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates a basic authentication credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns `true` for bearer credentials.
    pub fn is_bearer(&self) -> bool {
        matches!(self, Self::Bearer { .. })
    }

    /// Applies the credential to an HTTP request.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bitbucket_server_client::auth::AuthCredential;
    /// use reqwest::Client;
    ///
    /// let request = Client::new().get("https://bitbucket.example.com/rest/api/1.0/users");
    /// let request = AuthCredential::bearer("token").apply_to_request(request);
    /// let built = request.build().unwrap();
    /// assert_eq!(built.headers()["authorization"], "Bearer token");
    /// ```
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Bearer { token } => request.bearer_auth(token),
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }
}

impl fmt::Debug for AuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { .. } => f.debug_struct("Bearer").field("token", &"***").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

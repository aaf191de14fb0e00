//
//  bitbucket-server-client
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! [`ClientConfig`] is the parameter object handed to
//! [`BitbucketClient::new`](crate::BitbucketClient::new). It can be built in
//! code, read from a TOML file, or overridden from the environment.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bitbucket-server-client/config.toml`
//! - **macOS**: `~/Library/Application Support/bitbucket-server-client/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\bitbucket-server-client\config\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! base_url = "https://bitbucket.example.com"
//! token = "NjM0NTY3ODkw"
//! timeout_secs = 30
//! # or, for sub-second precision:
//! # timeout_ms = 2500
//! user_agent = "release-bot/1.2"
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BITBUCKET_URL` | `base_url` |
//! | `BITBUCKET_TOKEN` | `token` |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bitbucket_server_client::config::ClientConfig;
//!
//! let config = ClientConfig::load()?.with_env_overrides();
//! println!("Talking to {}", config.base_url);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ClientConfig::base_url`].
pub const ENV_URL: &str = "BITBUCKET_URL";

/// Environment variable overriding [`ClientConfig::token`].
pub const ENV_TOKEN: &str = "BITBUCKET_TOKEN";

/// Connection settings for a Bitbucket Server/Data Center instance.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server root URL, including any context path.
    ///
    /// Example: `https://bitbucket.example.com` or
    /// `https://example.com/bitbucket`. The `/rest/...` prefix is added by
    /// the client.
    #[serde(default)]
    pub base_url: String,

    /// Personal access token sent as a bearer credential.
    ///
    /// Requests are sent anonymously when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Whole-request timeout in seconds. No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Whole-request timeout in milliseconds. Takes precedence over
    /// `timeout_secs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Custom User-Agent header. Defaults to `bitbucket-server-client/<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Creates a configuration for the given server and token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Sets the request timeout with millisecond precision.
    ///
    /// Non-zero durations below one millisecond round up to one millisecond.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let mut millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        if millis == 0 && !timeout.is_zero() {
            millis = 1;
        }
        self.timeout_ms = Some(millis);
        self.timeout_secs = None;
        self
    }

    /// Sets a custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the configured timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms
            .map(Duration::from_millis)
            .or_else(|| self.timeout_secs.map(Duration::from_secs))
    }

    /// Loads configuration from the default location.
    ///
    /// A missing file yields the default (empty) configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Builds a configuration purely from `BITBUCKET_URL` / `BITBUCKET_TOKEN`.
    pub fn from_env() -> Result<Self> {
        let config = Self::default().with_env_overrides();
        if config.base_url.is_empty() {
            anyhow::bail!("{} is not set", ENV_URL);
        }
        Ok(config)
    }

    /// Applies `BITBUCKET_URL` / `BITBUCKET_TOKEN` on top of this configuration.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var(ENV_URL).ok(), std::env::var(ENV_TOKEN).ok())
    }

    fn with_overrides(mut self, url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Returns the path to the default configuration file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", crate::APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

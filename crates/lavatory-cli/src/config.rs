//! Config file - `~/.lavatory/config.toml`
//!
//! ```toml
//! [server]
//! url = "https://artifactory.example.com/artifactory"
//! username = "svc"
//! password = "secret"
//! timeout_secs = 30
//!
//! [default_policy]
//! depth = 3
//! count = 5
//!
//! [[policies]]
//! repo = "yum-local"
//! project = "myapp"
//! depth = 2
//! weeks = 4
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::UserDirs;
use serde::Deserialize;

use lavatory_core::app::SweepTarget;
use lavatory_core::domain::{RetentionPolicy, Term};
use lavatory_core::impls::{DEFAULT_TIMEOUT, HttpClientConfig};

/// Folder depth of projects when a policy does not say otherwise.
pub const DEFAULT_DEPTH: u32 = 3;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub default_policy: Option<PolicyConfig>,
    pub policies: Vec<PolicyConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// One retention rule. `repo` is ignored for `[default_policy]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub repo: Option<String>,
    pub project: Option<String>,
    #[serde(default = "default_depth")]
    pub depth: u32,
    pub count: Option<u32>,
    pub weeks: Option<u32>,
    pub terms: Option<Vec<Term>>,
}

fn default_depth() -> u32 {
    DEFAULT_DEPTH
}

impl PolicyConfig {
    pub fn policy(&self) -> Result<RetentionPolicy> {
        let policy = RetentionPolicy::from_options(self.terms.clone(), self.count, self.weeks)?;
        Ok(policy)
    }

    pub fn target(&self, repo: &str) -> Result<SweepTarget> {
        Ok(SweepTarget {
            repo: repo.to_string(),
            project: self.project.clone(),
            depth: self.depth,
            policy: self
                .policy()
                .with_context(|| format!("invalid retention policy for {repo}"))?,
        })
    }
}

impl FileConfig {
    /// Reads `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file yields an empty config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            tracing::debug!(path = %path.display(), "no config file");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        for policy in config.default_policy.iter().chain(&config.policies) {
            policy.policy()?;
        }
        Ok(config)
    }

    /// Policy for `repo`: the first `[[policies]]` entry naming it, else
    /// `[default_policy]`.
    pub fn policy_for(&self, repo: &str) -> Option<&PolicyConfig> {
        self.policies
            .iter()
            .find(|p| p.repo.as_deref() == Some(repo))
            .or(self.default_policy.as_ref())
    }

    /// Repositories named by `[[policies]]`, in file order.
    pub fn policy_repos(&self) -> Vec<String> {
        let mut repos: Vec<String> = Vec::new();
        for repo in self.policies.iter().filter_map(|p| p.repo.as_ref()) {
            if !repos.contains(repo) {
                repos.push(repo.clone());
            }
        }
        repos
    }
}

/// Flag / env values that take precedence over `[server]`.
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ServerConfig {
    pub fn resolve(&self, overrides: &ServerOverrides) -> Result<HttpClientConfig> {
        let url = overrides
            .url
            .clone()
            .or_else(|| self.url.clone())
            .context("Server URL is required. Set ARTIFACTORY_URL, use --url, or add [server] url")?;

        let mut config = HttpClientConfig::new(url);
        config.username = overrides.username.clone().or_else(|| self.username.clone());
        config.password = overrides.password.clone().or_else(|| self.password.clone());
        config.timeout = self.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        Ok(config)
    }
}

pub fn default_path() -> Option<PathBuf> {
    UserDirs::new().map(|u| u.home_dir().join(".lavatory").join("config.toml"))
}

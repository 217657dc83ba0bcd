//! HttpRepositoryClient - Artifactory REST API への実装（reqwest）
//!
//! | port               | endpoint                                            |
//! |--------------------|-----------------------------------------------------|
//! | `request`          | `{base}/{path}` (GET / DELETE)                      |
//! | `find_by_pattern`  | `GET {base}/api/search/pattern?pattern=repo:glob`   |
//! | `find_by_aql`      | `POST {base}/api/search/aql` (text/plain)           |
//! | `get_properties`   | `GET {base}/api/storage/{path}?properties`          |

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{AqlResponse, LavatoryError, Properties};
use crate::ports::{Method, RepositoryClient};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpRepositoryClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Server base URL, e.g. `https://repo.example.com/artifactory`.
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct PatternSearchResponse {
    #[serde(default)]
    files: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PropertiesResponse {
    #[serde(default)]
    properties: Properties,
}

pub struct HttpRepositoryClient {
    client: Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpRepositoryClient {
    pub fn new(config: &HttpClientConfig) -> Result<Self, LavatoryError> {
        if config.base_url.trim().is_empty() {
            return Err(LavatoryError::Config("server URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LavatoryError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(user) => req.basic_auth(user, self.password.as_deref()),
            None => req,
        }
    }

    /// Sends the request and returns the status with the body text.
    async fn send(&self, url: &str, req: RequestBuilder) -> Result<(StatusCode, String), LavatoryError> {
        let response = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| LavatoryError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| LavatoryError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(%url, status = status.as_u16(), "response");
        Ok((status, body))
    }

    async fn send_ok(&self, url: &str, req: RequestBuilder) -> Result<String, LavatoryError> {
        let (status, body) = self.send(url, req).await?;
        if !status.is_success() {
            return Err(LavatoryError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, LavatoryError> {
    serde_json::from_str(body).map_err(|e| LavatoryError::Decode(format!("{url}: {e}")))
}

#[async_trait]
impl RepositoryClient for HttpRepositoryClient {
    async fn request(&self, path: &str, method: Method) -> Result<serde_json::Value, LavatoryError> {
        let url = self.url(path);
        let req = match method {
            Method::Get => self.client.get(&url),
            Method::Delete => self.client.delete(&url),
        };

        let body = self.send_ok(&url, req).await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        decode(&url, &body)
    }

    async fn find_by_pattern(
        &self,
        filename: &str,
        repo: &str,
        max_depth: u32,
    ) -> Result<Vec<String>, LavatoryError> {
        let url = self.url("api/search/pattern");
        let mut found = BTreeSet::new();

        for level in 0..max_depth as usize {
            let pattern = format!("{repo}:{}{filename}", "*/".repeat(level));
            let req = self.client.get(&url).query(&[("pattern", pattern.as_str())]);
            let body = self.send_ok(&url, req).await?;
            let response: PatternSearchResponse = decode(&url, &body)?;
            found.extend(response.files.into_iter().map(|f| format!("{repo}/{f}")));
        }

        Ok(found.into_iter().collect())
    }

    async fn find_by_aql(&self, criteria: &str) -> Result<AqlResponse, LavatoryError> {
        let url = self.url("api/search/aql");
        let req = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(criteria.to_string());
        let body = self.send_ok(&url, req).await?;
        decode(&url, &body)
    }

    async fn get_properties(&self, path: &str) -> Result<Properties, LavatoryError> {
        let url = self.url(&format!("api/storage/{}", path.trim_start_matches('/')));
        let req = self.client.get(format!("{url}?properties"));
        let (status, body) = self.send(&url, req).await?;

        // 404: プロパティが 1 つも無い
        if status == StatusCode::NOT_FOUND {
            return Ok(Properties::new());
        }
        if !status.is_success() {
            return Err(LavatoryError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }
        let response: PropertiesResponse = decode(&url, &body)?;
        Ok(response.properties)
    }
}

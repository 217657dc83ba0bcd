//! InMemoryRepositoryClient - 開発・テスト用のリポジトリサーバー
//!
//! # 実装詳細
//! - storage-info、フォルダ（AQL の対象）、ファイル（pattern 検索の対象）をメモリに保持
//! - AQL は `aql_eval` で解釈する
//! - すべての呼び出しを `Call` として記録し、テストから検査できる
//! - 指定したパスの delete を失敗させられる
//!
//! # 使用例
//! ```ignore
//! let client = InMemoryRepositoryClient::new()
//!     .with_repo(RepoSummary::new("yum-local"))
//!     .with_item(ItemRecord::new("yum-local", ".", "app").with_type("folder"));
//! ```

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;

use super::aql_eval;
use crate::domain::{
    AqlResponse, ItemRecord, LavatoryError, Properties, RepoSummary, STORAGE_INFO_PATH, TOTAL_KEY,
};
use crate::ports::{Method, RepositoryClient};

/// A recorded call against the in-memory server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Request { path: String, method: Method },
    FindByPattern { filename: String, repo: String, max_depth: u32 },
    FindByAql(String),
    GetProperties(String),
}

#[derive(Default)]
struct InMemoryState {
    repos: Vec<RepoSummary>,
    items: Vec<ItemRecord>,
    /// `{repo}/{path}` -> properties
    files: BTreeMap<String, Properties>,
    failing_deletes: BTreeSet<String>,
    aql_failure: Option<String>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct InMemoryRepositoryClient {
    state: Mutex<InMemoryState>,
}

impl InMemoryRepositoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, repo: RepoSummary) -> Self {
        self.state.get_mut().repos.push(repo);
        self
    }

    pub fn with_item(mut self, item: ItemRecord) -> Self {
        self.state.get_mut().items.push(item);
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemRecord>) -> Self {
        self.state.get_mut().items.extend(items);
        self
    }

    /// Registers a file at `{repo}/{path}` for pattern searches.
    pub fn with_file(mut self, full_path: impl Into<String>, properties: Properties) -> Self {
        self.state.get_mut().files.insert(full_path.into(), properties);
        self
    }

    /// Deleting `path` will fail with a server error.
    pub fn with_failing_delete(mut self, path: impl Into<String>) -> Self {
        self.state.get_mut().failing_deletes.insert(path.into());
        self
    }

    /// Every structured query will fail with a transport error.
    pub fn with_aql_failure(mut self, message: impl Into<String>) -> Self {
        self.state.get_mut().aql_failure = Some(message.into());
        self
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.state.lock().await.calls.clone()
    }

    pub async fn aql_queries(&self) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::FindByAql(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    pub async fn delete_requests(&self) -> Vec<String> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|c| match c {
                Call::Request {
                    path,
                    method: Method::Delete,
                } => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Items still present, as `{repo}/{path}/{name}`.
    pub async fn remaining_items(&self) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .items
            .iter()
            .map(|i| format!("{}/{}", i.repo, i.full_path()))
            .collect()
    }
}

fn not_found(path: &str) -> LavatoryError {
    LavatoryError::Status {
        url: path.to_string(),
        status: 404,
        body: "Not Found".to_string(),
    }
}

fn storage_info(repos: &[RepoSummary]) -> Value {
    let mut rows: Vec<Value> = repos.iter().map(|r| json!(r)).collect();
    rows.push(json!({ "repoKey": TOTAL_KEY, "repoType": "NA" }));
    json!({ "repositoriesSummaryList": rows })
}

fn is_under(candidate: &str, path: &str) -> bool {
    candidate == path || candidate.starts_with(&format!("{path}/"))
}

#[async_trait]
impl RepositoryClient for InMemoryRepositoryClient {
    async fn request(&self, path: &str, method: Method) -> Result<Value, LavatoryError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::Request {
            path: path.to_string(),
            method,
        });
        let path = path.trim_matches('/');

        match method {
            Method::Get if path == STORAGE_INFO_PATH => Ok(storage_info(&state.repos)),
            Method::Get => state
                .items
                .iter()
                .find(|i| format!("{}/{}", i.repo, i.full_path()) == path)
                .map(|i| json!(i))
                .ok_or_else(|| not_found(path)),
            Method::Delete => {
                if state.failing_deletes.contains(path) {
                    return Err(LavatoryError::Status {
                        url: path.to_string(),
                        status: 500,
                        body: "delete rejected".to_string(),
                    });
                }

                let before = state.items.len() + state.files.len();
                state
                    .items
                    .retain(|i| !is_under(&format!("{}/{}", i.repo, i.full_path()), path));
                state.files.retain(|f, _| !is_under(f, path));
                if state.items.len() + state.files.len() == before {
                    return Err(not_found(path));
                }
                Ok(Value::Null)
            }
        }
    }

    async fn find_by_pattern(
        &self,
        filename: &str,
        repo: &str,
        max_depth: u32,
    ) -> Result<Vec<String>, LavatoryError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::FindByPattern {
            filename: filename.to_string(),
            repo: repo.to_string(),
            max_depth,
        });

        let prefix = format!("{repo}/");
        let found = state
            .files
            .keys()
            .filter_map(|full| full.strip_prefix(&prefix).map(|rel| (full, rel)))
            .filter(|(_, rel)| {
                let segments: Vec<&str> = rel.split('/').collect();
                let folders = segments.len() - 1;
                let name = segments.last().copied().unwrap_or_default();
                folders < max_depth as usize && aql_eval::glob_match(filename, name)
            })
            .map(|(full, _)| full.clone())
            .collect();
        Ok(found)
    }

    async fn find_by_aql(&self, criteria: &str) -> Result<AqlResponse, LavatoryError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::FindByAql(criteria.to_string()));

        if let Some(message) = &state.aql_failure {
            return Err(LavatoryError::Transport {
                url: "api/search/aql".to_string(),
                message: message.clone(),
            });
        }

        let query = aql_eval::parse(criteria)?;
        let results = aql_eval::evaluate(&query, &state.items)?;
        Ok(AqlResponse {
            results,
            range: None,
        })
    }

    async fn get_properties(&self, path: &str) -> Result<Properties, LavatoryError> {
        let mut state = self.state.lock().await;
        state.calls.push(Call::GetProperties(path.to_string()));
        Ok(state.files.get(path).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_info_includes_total_row() {
        let client = InMemoryRepositoryClient::new().with_repo(RepoSummary::new("yum-local"));
        let body = client.request(STORAGE_INFO_PATH, Method::Get).await.unwrap();
        let rows = body["repositoriesSummaryList"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["repoKey"], TOTAL_KEY);
    }

    #[tokio::test]
    async fn delete_removes_folder_and_children_once() {
        let client = InMemoryRepositoryClient::new().with_items([
            ItemRecord::new("yum-local", "app", "1.0").with_type("folder"),
            ItemRecord::new("yum-local", "app/1.0", "app.rpm").with_type("file"),
            ItemRecord::new("yum-local", "app", "1.1").with_type("folder"),
        ]);

        client
            .request("yum-local/app/1.0", Method::Delete)
            .await
            .unwrap();
        assert_eq!(client.remaining_items().await, vec!["yum-local/app/1.1"]);

        let err = client
            .request("yum-local/app/1.0", Method::Delete)
            .await
            .unwrap_err();
        assert!(matches!(err, LavatoryError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn pattern_search_respects_depth_and_glob() {
        let client = InMemoryRepositoryClient::new()
            .with_file("libs/app.jar", Properties::new())
            .with_file("libs/com/acme/app.jar", Properties::new())
            .with_file("libs/com/acme/app.pom", Properties::new())
            .with_file("other/app.jar", Properties::new());

        let shallow = client.find_by_pattern("*.jar", "libs", 1).await.unwrap();
        assert_eq!(shallow, vec!["libs/app.jar"]);

        let deep = client.find_by_pattern("*.jar", "libs", 3).await.unwrap();
        assert_eq!(deep, vec!["libs/app.jar", "libs/com/acme/app.jar"]);
    }

    #[tokio::test]
    async fn aql_failure_is_reported_as_transport_error() {
        let client = InMemoryRepositoryClient::new().with_aql_failure("connection reset");
        let err = client.find_by_aql("items.find({})").await.unwrap_err();
        assert!(matches!(err, LavatoryError::Transport { .. }));
        assert_eq!(client.aql_queries().await.len(), 1);
    }
}

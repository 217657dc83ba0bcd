//! RepositoryClient port - リポジトリサーバーとの境界
//!
//! HTTP、認証、レスポンスのパースはすべてこの trait の実装側に閉じ込める。
//!
//! # 実装
//! - `impls::HttpRepositoryClient`: Artifactory REST API（reqwest）
//! - `impls::InMemoryRepositoryClient`: テスト・開発用

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AqlResponse, LavatoryError, Properties};

/// HTTP method for raw requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Delete => f.write_str("DELETE"),
        }
    }
}

/// RepositoryClient はリポジトリサーバーへの操作を提供
///
/// # 設計原則
/// - 1 回の呼び出し = 1 回（または有限回）のリクエスト。リトライはしない
/// - エラーは `LavatoryError` で返し、呼び出し側がそのまま伝播する
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    /// Raw request relative to the server base URL. Returns the JSON body,
    /// or `Value::Null` when the body is empty.
    async fn request(&self, path: &str, method: Method)
    -> Result<serde_json::Value, LavatoryError>;

    /// Full paths (`{repo}/{path}`) of files matching the `filename` glob
    /// within `max_depth` folder levels of `repo`.
    async fn find_by_pattern(
        &self,
        filename: &str,
        repo: &str,
        max_depth: u32,
    ) -> Result<Vec<String>, LavatoryError>;

    /// Executes a textual structured query.
    async fn find_by_aql(&self, criteria: &str) -> Result<AqlResponse, LavatoryError>;

    async fn get_properties(&self, path: &str) -> Result<Properties, LavatoryError>;
}

#[async_trait]
impl<T: RepositoryClient + ?Sized> RepositoryClient for Arc<T> {
    async fn request(
        &self,
        path: &str,
        method: Method,
    ) -> Result<serde_json::Value, LavatoryError> {
        (**self).request(path, method).await
    }

    async fn find_by_pattern(
        &self,
        filename: &str,
        repo: &str,
        max_depth: u32,
    ) -> Result<Vec<String>, LavatoryError> {
        (**self).find_by_pattern(filename, repo, max_depth).await
    }

    async fn find_by_aql(&self, criteria: &str) -> Result<AqlResponse, LavatoryError> {
        (**self).find_by_aql(criteria).await
    }

    async fn get_properties(&self, path: &str) -> Result<Properties, LavatoryError> {
        (**self).get_properties(path).await
    }
}

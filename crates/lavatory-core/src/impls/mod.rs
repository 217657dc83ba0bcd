//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpRepositoryClient**: Artifactory REST API（本番用）
//! - **InMemoryRepositoryClient**: 開発・テスト用のサーバー

mod aql_eval;
pub mod http_client;
pub mod inmem_client;

// 主要な型を再エクスポート
pub use self::http_client::{DEFAULT_TIMEOUT, HttpClientConfig, HttpRepositoryClient};
pub use self::inmem_client::{Call, InMemoryRepositoryClient};

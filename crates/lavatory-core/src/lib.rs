//! lavatory-core
//!
//! Retention and cleanup for artifact repositories.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（repository, item, query, policy, outcome, errors）
//! - **ports**: 抽象化レイヤー（RepositoryClient, Clock）
//! - **app**: アプリケーションロジック（list, all_artifacts, filter, purge, retain, sweep）
//! - **impls**: 実装（HttpRepositoryClient、開発用の InMemoryRepositoryClient）
//!
//! # 使用例
//! ```no_run
//! use lavatory_core::app::Lavatory;
//! use lavatory_core::domain::RetentionPolicy;
//! use lavatory_core::impls::{HttpClientConfig, HttpRepositoryClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpClientConfig::new("https://artifactory.example.com/artifactory")
//!     .with_credentials("svc", "secret");
//! let lavatory = Lavatory::new(HttpRepositoryClient::new(&config)?);
//!
//! let purgable = lavatory
//!     .retain("yum-local", None, 2, &RetentionPolicy::KeepLastN(5))
//!     .await?;
//! let report = lavatory.purge("yum-local", true, &purgable).await;
//! println!("{} artifacts would be purged", report.purged());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

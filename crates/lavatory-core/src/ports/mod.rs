//! Ports - 抽象化レイヤー
//!
//! 外部システム（リポジトリサーバー、時計）へのインターフェースを定義し、
//! 実装の詳細を隠蔽します。

pub mod clock;
pub mod repository_client;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::repository_client::{Method, RepositoryClient};

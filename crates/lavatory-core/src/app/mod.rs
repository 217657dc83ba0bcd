//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **LavatoryBuilder**: client / clock のワイヤリング
//! - **list**: リポジトリ一覧（Repository Lister）
//! - **all_artifacts**: パターン検索とプロパティ収集（Artifact Finder）
//! - **filter**: AQL の組み立てと実行（Query Builder）
//! - **purge**: artifact の削除（Purger）
//! - **retain**: ポリシーから purge 対象を計算（Retention Policy Engine）
//! - **sweep**: retain → purge を 1 リポジトリ分回して RunStats にまとめる

pub mod builder;
pub mod filter;
pub mod finder;
pub mod lister;
pub mod purger;
pub mod retention;
pub mod status;
pub mod sweep;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, Lavatory, LavatoryBuilder};
pub use self::retention::CUTOFF_FORMAT;
pub use self::status::RunStats;
pub use self::sweep::SweepTarget;

//! Domain model (repositories, items, queries, policies, outcomes, errors).
//!
//! サーバーとのやり取りに依存しない型だけを置く。
//! - repository: storage-info の集計行
//! - item: AQL の結果行と short name
//! - query: AQL テキストの組み立て
//! - policy: retention ポリシー
//! - outcome: purge 結果

pub mod errors;
pub mod item;
pub mod outcome;
pub mod policy;
pub mod query;
pub mod repository;

pub use self::errors::{ErrorKind, LavatoryError};
pub use self::item::{AqlResponse, ItemRecord, Properties, short_name};
pub use self::outcome::{PurgeItem, PurgeMode, PurgeOutcome, PurgeReport};
pub use self::policy::RetentionPolicy;
pub use self::query::{FOLDER_TYPE, ItemQuery, Sort, SortOrder, Term};
pub use self::repository::{RepoSummary, STORAGE_INFO_PATH, StorageInfo, TOTAL_KEY};

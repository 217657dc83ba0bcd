//! Status - 1 リポジトリ分の実行結果サマリ
//!
//! CLI の最後にログ / JSON として出す。

use serde::{Deserialize, Serialize};

use crate::domain::{PurgeMode, PurgeReport};

/// 1 回の retain → purge の集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub repo: String,
    pub policy: String,
    pub dry_run: bool,
    /// retention が返した件数
    pub candidates: usize,
    /// 削除できた件数（dry run では「削除したことにした」件数）
    pub purged: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<String>,
}

impl RunStats {
    pub fn from_report(policy: impl Into<String>, report: &PurgeReport) -> Self {
        Self {
            repo: report.repo.clone(),
            policy: policy.into(),
            dry_run: report.mode == PurgeMode::DryRun,
            candidates: report.attempted(),
            purged: report.purged(),
            failed: report.failed(),
            failures: report.failures().map(|item| item.artifact.clone()).collect(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

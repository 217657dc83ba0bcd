//! Sweep - retention と purge を 1 リポジトリ分まとめて回す
//!
//! # フロー
//! 1. `retain` で purge 対象を計算（失敗したらそのまま返す）
//! 2. 対象を `purge` に渡す（dry run / live）
//! 3. `PurgeReport` を `RunStats` に畳む

use tracing::{info, warn};

use super::builder::Lavatory;
use super::status::RunStats;
use crate::domain::{LavatoryError, RetentionPolicy};
use crate::ports::{Clock, RepositoryClient};

/// One repository's retention target.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepTarget {
    pub repo: String,
    pub project: Option<String>,
    pub depth: u32,
    pub policy: RetentionPolicy,
}

impl<C: RepositoryClient, K: Clock> Lavatory<C, K> {
    pub async fn sweep(&self, target: &SweepTarget, dry_run: bool) -> Result<RunStats, LavatoryError> {
        info!(repo = %target.repo, policy = %target.policy, dry_run, "sweeping");

        let purgable = self
            .retain(&target.repo, target.project.as_deref(), target.depth, &target.policy)
            .await?;
        let report = self.purge(&target.repo, dry_run, &purgable).await;
        let stats = RunStats::from_report(target.policy.to_string(), &report);

        if stats.is_clean() {
            info!(repo = %stats.repo, purged = stats.purged, "Purged {} artifacts.", stats.purged);
        } else {
            warn!(
                repo = %stats.repo,
                purged = stats.purged,
                failed = stats.failed,
                "purge finished with failures"
            );
        }
        Ok(stats)
    }
}

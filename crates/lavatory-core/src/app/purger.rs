//! Purger - artifact を 1 件ずつ削除する
//!
//! # フロー
//! 1. artifact ごとに DRYRUN / LIVE をログに出す
//! 2. dry run なら何もせず DryRun として記録
//! 3. live なら `{repo}/{artifact}` に DELETE を送る
//! 4. 失敗はログに出して Failed として記録し、次へ進む（中断・リトライしない）

use tracing::{error, info};

use super::builder::Lavatory;
use crate::domain::{PurgeMode, PurgeOutcome, PurgeReport};
use crate::ports::{Clock, Method, RepositoryClient};

impl<C: RepositoryClient, K: Clock> Lavatory<C, K> {
    /// Purges `artifacts` (repository-relative paths) from `repo`.
    pub async fn purge<S: AsRef<str>>(&self, repo: &str, dry_run: bool, artifacts: &[S]) -> PurgeReport {
        let mode = PurgeMode::from_dry_run(dry_run);
        let mut report = PurgeReport::new(repo, mode);

        for artifact in artifacts {
            let artifact = artifact.as_ref();
            info!("  {} purge {}:{}", mode.tag(), repo, artifact);

            let outcome = match mode {
                PurgeMode::DryRun => PurgeOutcome::DryRun,
                PurgeMode::Live => {
                    let path = format!("{repo}/{}", artifact.trim_start_matches('/'));
                    match self.client.request(&path, Method::Delete).await {
                        Ok(_) => PurgeOutcome::Purged,
                        Err(e) => {
                            error!("{e}");
                            PurgeOutcome::failed(e.to_string())
                        }
                    }
                }
            };
            report.record(artifact, outcome);
        }

        report
    }
}

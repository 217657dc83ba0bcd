//! Outcome model: per-item purge results and their aggregate.
//!
//! A purge never aborts on a single failed delete. Each artifact gets its own
//! `PurgeOutcome`, and the caller reads the `PurgeReport` to see what happened.

use serde::{Deserialize, Serialize};

/// Purge mode, serialized as the tag used in log lines (DRYRUN / LIVE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurgeMode {
    #[serde(rename = "DRYRUN")]
    DryRun,
    Live,
}

impl PurgeMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Live }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::DryRun => "DRYRUN",
            Self::Live => "LIVE",
        }
    }
}

/// Result for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurgeOutcome {
    /// Would have been deleted.
    DryRun,

    /// Delete request succeeded.
    Purged,

    /// Delete request failed; the batch continued.
    Failed { reason: String },
}

impl PurgeOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Counted toward the purge total (dry-run items count as purged).
    pub fn is_counted(&self) -> bool {
        matches!(self, Self::DryRun | Self::Purged)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeItem {
    pub artifact: String,
    pub outcome: PurgeOutcome,
}

/// Aggregate of one purge call over a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeReport {
    pub repo: String,
    pub mode: PurgeMode,
    pub items: Vec<PurgeItem>,
}

impl PurgeReport {
    pub fn new(repo: impl Into<String>, mode: PurgeMode) -> Self {
        Self {
            repo: repo.into(),
            mode,
            items: Vec::new(),
        }
    }

    pub fn record(&mut self, artifact: impl Into<String>, outcome: PurgeOutcome) {
        self.items.push(PurgeItem {
            artifact: artifact.into(),
            outcome,
        });
    }

    /// Items processed (dry run) or actually deleted (live).
    pub fn purged(&self) -> usize {
        self.items.iter().filter(|i| i.outcome.is_counted()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.purged()
    }

    pub fn failures(&self) -> impl Iterator<Item = &PurgeItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, PurgeOutcome::Failed { .. }))
    }

    pub fn attempted(&self) -> usize {
        self.items.len()
    }
}

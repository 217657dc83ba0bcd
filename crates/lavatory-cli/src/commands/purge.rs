//! Purge command - apply retention policies.
//!
//! A policy given on the command line applies to every selected repository.
//! Otherwise each repository uses its `[[policies]]` entry or
//! `[default_policy]`; repositories with neither are skipped.

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use lavatory_core::app::{Lavatory, RunStats, SweepTarget};
use lavatory_core::domain::{RetentionPolicy, Term};
use lavatory_core::ports::{Clock, RepositoryClient};

use crate::commands::print_json;
use crate::config::{DEFAULT_DEPTH, FileConfig};
use crate::{OutputFormat, Session};

/// Arguments for the purge command.
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Repositories to purge (default: every repository on the server).
    #[arg(long = "repo")]
    pub repos: Vec<String>,

    /// Only this project folder.
    #[arg(long)]
    pub project: Option<String>,

    /// Folder depth of projects.
    #[arg(long)]
    pub depth: Option<u32>,

    /// Keep the N newest artifacts of each project.
    #[arg(long, conflicts_with_all = ["weeks", "terms"])]
    pub count: Option<u32>,

    /// Keep artifacts newer than W weeks.
    #[arg(long, conflicts_with = "terms")]
    pub weeks: Option<u32>,

    /// Purge artifacts matching this JSON term.
    #[arg(long = "term")]
    pub terms: Vec<Term>,

    /// Actually delete. Without it the run is a dry run.
    #[arg(long)]
    pub live: bool,
}

impl PurgeArgs {
    /// Policy given by flags, if any.
    pub fn policy(&self) -> Result<Option<RetentionPolicy>> {
        let terms = (!self.terms.is_empty()).then(|| self.terms.clone());
        if terms.is_none() && self.count.is_none() && self.weeks.is_none() {
            return Ok(None);
        }
        Ok(Some(RetentionPolicy::from_options(terms, self.count, self.weeks)?))
    }

    /// Resolves a target for each repository, dropping those without a policy.
    pub fn targets(&self, file: &FileConfig, repos: &[String]) -> Result<Vec<SweepTarget>> {
        let flagged = self.policy()?;
        let mut targets = Vec::new();

        for repo in repos {
            let mut target = match (&flagged, file.policy_for(repo)) {
                (Some(policy), _) => SweepTarget {
                    repo: repo.clone(),
                    project: None,
                    depth: DEFAULT_DEPTH,
                    policy: policy.clone(),
                },
                (None, Some(configured)) => configured.target(repo)?,
                (None, None) => {
                    warn!("{repo}: no retention policy, skipping");
                    continue;
                }
            };

            if let Some(project) = &self.project {
                target.project = Some(project.clone());
            }
            if let Some(depth) = self.depth {
                target.depth = depth;
            }
            targets.push(target);
        }
        Ok(targets)
    }
}

/// Sweeps every selected repository in turn.
pub async fn sweep_all<C: RepositoryClient, K: Clock>(
    lavatory: &Lavatory<C, K>,
    args: &PurgeArgs,
    file: &FileConfig,
) -> Result<Vec<RunStats>> {
    let repos = if args.repos.is_empty() {
        let all = lavatory.list(None).await.context("Failed to list repositories")?;
        all.into_keys().collect()
    } else {
        args.repos.clone()
    };

    let mut stats = Vec::new();
    for target in args.targets(file, &repos)? {
        let run = lavatory
            .sweep(&target, !args.live)
            .await
            .with_context(|| format!("Retention failed for {}", target.repo))?;
        stats.push(run);
    }
    Ok(stats)
}

/// Execute the purge command.
pub async fn execute(args: PurgeArgs, session: &Session) -> Result<()> {
    let stats = sweep_all(&session.lavatory, &args, &session.file).await?;
    let purged: usize = stats.iter().map(|s| s.purged).sum();
    let failed: usize = stats.iter().map(|s| s.failed).sum();

    match session.format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Text => {
            for run in &stats {
                println!(
                    "  {} [{}]: {} purged, {} failed",
                    run.repo, run.policy, run.purged, run.failed
                );
                for failure in &run.failures {
                    println!("      failed: {failure}");
                }
            }
        }
    }

    if args.live {
        info!("Purged {purged} artifacts ({failed} failed).");
    } else {
        info!("Dry run: {purged} artifacts would be purged. Use --live to delete.");
    }
    Ok(())
}

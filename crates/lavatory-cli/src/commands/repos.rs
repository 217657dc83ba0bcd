//! Repos command - list repositories.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::print_json;
use crate::{OutputFormat, Session};

/// Arguments for the repos command.
#[derive(Debug, Args)]
pub struct ReposArgs {
    /// Only this repository.
    #[arg(long)]
    pub repo: Option<String>,
}

/// Execute the repos command.
pub async fn execute(args: ReposArgs, session: &Session) -> Result<()> {
    let repos = session
        .lavatory
        .list(args.repo.as_deref())
        .await
        .context("Failed to list repositories")?;

    match session.format {
        OutputFormat::Json => print_json(&repos)?,
        OutputFormat::Text => {
            if repos.is_empty() {
                println!("No repositories found");
                return Ok(());
            }
            for (key, summary) in &repos {
                println!(
                    "  {key} ({}, {} files, {})",
                    summary.package_type.as_deref().unwrap_or("-"),
                    summary.files_count.unwrap_or(0),
                    summary.used_space.as_deref().unwrap_or("-"),
                );
            }
        }
    }
    Ok(())
}

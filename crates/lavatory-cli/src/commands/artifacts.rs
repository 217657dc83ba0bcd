//! Artifacts command - find artifacts by file name and show their properties.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::print_json;
use crate::config::DEFAULT_DEPTH;
use crate::{OutputFormat, Session};

/// Arguments for the artifacts command.
#[derive(Debug, Args)]
pub struct ArtifactsArgs {
    /// Repository to search.
    #[arg(long)]
    pub repo: String,

    /// File name glob.
    #[arg(long, default_value = "*")]
    pub search: String,

    /// Number of folder levels to search.
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    pub depth: u32,
}

/// Execute the artifacts command.
pub async fn execute(args: ArtifactsArgs, session: &Session) -> Result<()> {
    let artifacts = session
        .lavatory
        .all_artifacts(&args.search, &args.repo, args.depth)
        .await
        .with_context(|| format!("Failed to search {}", args.repo))?;

    match session.format {
        OutputFormat::Json => print_json(&artifacts)?,
        OutputFormat::Text => {
            for (name, properties) in &artifacts {
                println!("{name}");
                for (key, values) in properties {
                    println!("    {key} = {}", values.join(", "));
                }
            }
        }
    }
    Ok(())
}

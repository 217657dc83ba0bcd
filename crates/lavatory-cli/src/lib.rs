//! # lavatory-cli
//!
//! Command-line interface for artifact retention.
//!
//! ## Commands
//!
//! - `lavatory repos` - List repositories
//! - `lavatory artifacts` - Find artifacts by file name and show their properties
//! - `lavatory query` - Run a folder query
//! - `lavatory purge` - Apply retention policies (dry run unless `--live`)
//!
//! ## Configuration
//!
//! Server settings come from flags, environment variables, or the `[server]`
//! section of the config file, in that order:
//!
//! - `ARTIFACTORY_URL` - Server base URL
//! - `ARTIFACTORY_USERNAME` / `ARTIFACTORY_PASSWORD` - Basic auth
//! - `LAVATORY_CONFIG` - Config file (default: `~/.lavatory/config.toml`)

// CLI uses print! macros intentionally
#![allow(clippy::print_stdout)]

pub mod commands;
pub mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use lavatory_core::app::Lavatory;
use lavatory_core::impls::HttpRepositoryClient;

use crate::config::{FileConfig, ServerOverrides};

/// Lavatory - retention for artifact repositories.
#[derive(Debug, Parser)]
#[command(name = "lavatory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file.
    #[arg(long, env = "LAVATORY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Server base URL.
    #[arg(long, env = "ARTIFACTORY_URL")]
    pub url: Option<String>,

    /// Basic auth user.
    #[arg(long, env = "ARTIFACTORY_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "ARTIFACTORY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Debug logging.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List repositories.
    Repos(commands::repos::ReposArgs),
    /// Find artifacts by file name.
    Artifacts(commands::artifacts::ArtifactsArgs),
    /// Run a folder query.
    Query(commands::query::QueryArgs),
    /// Apply retention policies.
    Purge(commands::purge::PurgeArgs),
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// Everything a command needs besides its own arguments.
pub struct Session {
    pub lavatory: Lavatory<HttpRepositoryClient>,
    pub file: FileConfig,
    pub format: OutputFormat,
}

impl Cli {
    pub fn overrides(&self) -> ServerOverrides {
        ServerOverrides {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Loads the config file and connects the HTTP client.
    pub fn session(&self) -> Result<Session> {
        let file = FileConfig::load(self.config.as_deref())?;
        let http = file.server.resolve(&self.overrides())?;
        let client = HttpRepositoryClient::new(&http)?;

        Ok(Session {
            lavatory: Lavatory::new(client),
            file,
            format: self.format,
        })
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Runs the parsed command.
pub async fn run(cli: Cli) -> Result<()> {
    let session = cli.session()?;

    match cli.command {
        Commands::Repos(args) => commands::repos::execute(args, &session).await,
        Commands::Artifacts(args) => commands::artifacts::execute(args, &session).await,
        Commands::Query(args) => commands::query::execute(args, &session).await,
        Commands::Purge(args) => commands::purge::execute(args, &session).await,
    }
}

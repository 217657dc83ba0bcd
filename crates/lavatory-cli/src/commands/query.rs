//! Query command - run a folder query and print the matches.

use anyhow::{Context, Result};
use clap::Args;

use lavatory_core::domain::{ItemQuery, Sort, Term};

use crate::commands::print_json;
use crate::{OutputFormat, Session};

/// Arguments for the query command.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Repository to query.
    #[arg(long)]
    pub repo: String,

    /// Folder depth to match.
    #[arg(long, default_value_t = 1)]
    pub depth: u32,

    /// Extra filter term as JSON, e.g. '{"name":{"$match":"1.*"}}'.
    #[arg(long = "term")]
    pub terms: Vec<Term>,

    /// Sort descending by these fields.
    #[arg(long)]
    pub sort_desc: Vec<String>,

    /// Skip this many results.
    #[arg(long)]
    pub offset: Option<u32>,

    /// Return at most this many results.
    #[arg(long)]
    pub limit: Option<u32>,
}

impl QueryArgs {
    pub fn query(&self) -> ItemQuery {
        ItemQuery::new(self.repo.clone(), self.depth)
            .with_terms(self.terms.iter().cloned())
            .with_sort(Some(Sort::desc(self.sort_desc.iter().cloned())))
            .with_offset(self.offset)
            .with_limit(self.limit)
    }
}

/// Execute the query command.
pub async fn execute(args: QueryArgs, session: &Session) -> Result<()> {
    let items = session
        .lavatory
        .filter(&args.query())
        .await
        .context("Query failed")?;

    match session.format {
        OutputFormat::Json => print_json(&items)?,
        OutputFormat::Text => {
            for item in &items {
                println!("{}  {}", item.created.as_deref().unwrap_or("-"), item.full_path());
            }
            println!("{} folders", items.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use clap::Parser;

    fn parse(args: &[&str]) -> QueryArgs {
        let mut argv = vec!["lavatory", "query"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Query(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_build_the_query() {
        let args = parse(&[
            "--repo",
            "yum-local",
            "--depth",
            "2",
            "--term",
            r#"{"path":{"$eq":"app"}}"#,
            "--sort-desc",
            "created",
            "--offset",
            "3",
        ]);

        let expected = ItemQuery::new("yum-local", 2)
            .with_terms([Term::eq("path", "app")])
            .with_sort(Some(Sort::desc(["created"])))
            .with_offset(Some(3));
        assert_eq!(args.query().to_aql(), expected.to_aql());
    }

    #[test]
    fn without_sort_flags_no_sort_is_emitted() {
        let args = parse(&["--repo", "yum-local"]);
        assert!(!args.query().to_aql().contains(".sort("));
    }

    #[test]
    fn malformed_term_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "lavatory", "query", "--repo", "yum-local", "--term", "[1,2]",
        ]);
        assert!(result.is_err());
    }
}

//! CLI command implementations.

pub mod artifacts;
pub mod purge;
pub mod query;
pub mod repos;

use anyhow::Result;
use serde::Serialize;

/// Pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

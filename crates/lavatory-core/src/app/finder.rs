//! Artifact Finder - ファイル名パターンで artifact を探し、プロパティを集める

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::builder::Lavatory;
use crate::domain::{LavatoryError, Properties, short_name};
use crate::ports::{Clock, RepositoryClient};

impl<C: RepositoryClient, K: Clock> Lavatory<C, K> {
    /// Artifacts matching the `search` glob in `repo`, searched down to
    /// `depth` folder levels, keyed by their canonical short name.
    ///
    /// Two paths sharing the same last four segments collapse into one
    /// entry; the later path in sorted order wins.
    pub async fn all_artifacts(
        &self,
        search: &str,
        repo: &str,
        depth: u32,
    ) -> Result<BTreeMap<String, Properties>, LavatoryError> {
        debug!(search, repo, depth, "finding all artifacts");

        let mut found = self.client.find_by_pattern(search, repo, depth).await?;
        found.sort();

        let mut artifacts = BTreeMap::new();
        for path in found {
            let name = short_name(&path);
            debug!(artifact = %name, "found");
            let properties = self.client.get_properties(&path).await?;
            artifacts.insert(name, properties);
        }

        info!("Found {} artifacts in total.", artifacts.len());
        Ok(artifacts)
    }
}

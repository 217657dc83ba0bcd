//! Repository Lister - storage-info からリポジトリ一覧を作る

use std::collections::BTreeMap;

use tracing::debug;

use super::builder::Lavatory;
use crate::domain::{LavatoryError, RepoSummary, STORAGE_INFO_PATH, StorageInfo};
use crate::ports::{Clock, Method, RepositoryClient};

impl<C: RepositoryClient, K: Clock> Lavatory<C, K> {
    /// Repositories with their summary rows, keyed by repo key.
    ///
    /// The synthetic `TOTAL` row is never returned. With `repo_name` the
    /// result is restricted to that key, and is empty when it does not exist.
    pub async fn list(
        &self,
        repo_name: Option<&str>,
    ) -> Result<BTreeMap<String, RepoSummary>, LavatoryError> {
        let body = self.client.request(STORAGE_INFO_PATH, Method::Get).await?;
        let info: StorageInfo = serde_json::from_value(body)?;
        let wanted = repo_name.filter(|name| !name.is_empty());

        let repos: BTreeMap<String, RepoSummary> = info
            .repositories_summary_list
            .into_iter()
            .filter(|repo| !repo.is_total())
            .filter(|repo| wanted.is_none_or(|name| name == repo.repo_key))
            .map(|repo| (repo.repo_key.clone(), repo))
            .collect();

        debug!(count = repos.len(), filter = ?wanted, "listed repositories");
        Ok(repos)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::app::Lavatory;
    use crate::domain::{AqlResponse, LavatoryError, Properties, RepoSummary, TOTAL_KEY};
    use crate::impls::InMemoryRepositoryClient;
    use crate::ports::{Method, RepositoryClient};

    fn lavatory() -> Lavatory<InMemoryRepositoryClient> {
        Lavatory::new(
            InMemoryRepositoryClient::new()
                .with_repo(RepoSummary::new("docker-local"))
                .with_repo(RepoSummary::new("yum-local")),
        )
    }

    #[tokio::test]
    async fn total_row_is_never_listed() {
        let repos = lavatory().list(None).await.unwrap();
        assert_eq!(repos.len(), 2);
        assert!(!repos.contains_key(TOTAL_KEY));
    }

    #[tokio::test]
    async fn asking_for_total_returns_nothing() {
        let repos = lavatory().list(Some(TOTAL_KEY)).await.unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn existing_name_returns_exactly_one_entry() {
        let repos = lavatory().list(Some("yum-local")).await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos["yum-local"].repo_key, "yum-local");
    }

    #[tokio::test]
    async fn unknown_name_returns_empty_map() {
        let repos = lavatory().list(Some("npm-remote")).await.unwrap();
        assert!(repos.is_empty());
    }

    #[tokio::test]
    async fn empty_name_means_no_filter() {
        let repos = lavatory().list(Some("")).await.unwrap();
        assert_eq!(repos.len(), 2);
    }

    /// repositoriesSummaryList を含まないレスポンスを返すサーバー
    struct NoSummaryList;

    #[async_trait]
    impl RepositoryClient for NoSummaryList {
        async fn request(&self, _path: &str, _method: Method) -> Result<Value, LavatoryError> {
            Ok(json!({"binariesSummary": {}}))
        }

        async fn find_by_pattern(&self, _: &str, _: &str, _: u32) -> Result<Vec<String>, LavatoryError> {
            Ok(Vec::new())
        }

        async fn find_by_aql(&self, _: &str) -> Result<AqlResponse, LavatoryError> {
            Ok(AqlResponse::default())
        }

        async fn get_properties(&self, _: &str) -> Result<Properties, LavatoryError> {
            Ok(Properties::new())
        }
    }

    #[tokio::test]
    async fn body_without_summary_list_is_a_decode_error() {
        let err = Lavatory::new(NoSummaryList).list(None).await.unwrap_err();
        assert!(matches!(err, LavatoryError::Decode(_)));
    }
}

//! Retention Policy Engine - ポリシーから purge 対象を計算する
//!
//! # フロー
//! 1. `depth` のフォルダ（プロジェクト）を列挙
//! 2. project 指定があれば名前が一致しないものを飛ばす
//! 3. プロジェクト配下 `depth + 1` の artifact をポリシーに応じて問い合わせる
//! 4. 結果を `{path}/{name}` として順に積む（重複排除はしない）

use chrono::TimeDelta;
use tracing::{debug, info};

use super::builder::Lavatory;
use crate::domain::{ItemQuery, LavatoryError, RetentionPolicy, Sort, Term};
use crate::ports::{Clock, RepositoryClient};

/// Timestamp format of the `created` cutoff.
pub const CUTOFF_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

impl<C: RepositoryClient, K: Clock> Lavatory<C, K> {
    /// Paths (repository-relative) that `policy` marks as purgable.
    pub async fn retain(
        &self,
        repo: &str,
        project: Option<&str>,
        depth: u32,
        policy: &RetentionPolicy,
    ) -> Result<Vec<String>, LavatoryError> {
        let mut purgable = Vec::new();
        let projects = self.filter(&ItemQuery::new(repo, depth)).await?;

        for candidate in projects {
            if project.is_some_and(|name| name != candidate.name) {
                continue;
            }

            let path = candidate.full_path();
            let query = self.artifact_query(repo, &path, depth, policy)?;
            let artifacts = self.filter(&query).await?;
            debug!(project = %path, purgable = artifacts.len(), "evaluated project");

            purgable.extend(artifacts.iter().map(|a| a.full_path()));
        }

        info!(repo, %policy, count = purgable.len(), "retention evaluated");
        Ok(purgable)
    }

    /// Same as [`retain`](Self::retain), choosing the policy from the three
    /// optional knobs. Fails before any query unless exactly one is given.
    pub async fn retain_with(
        &self,
        repo: &str,
        project: Option<&str>,
        depth: u32,
        terms: Option<Vec<Term>>,
        count: Option<u32>,
        weeks: Option<u32>,
    ) -> Result<Vec<String>, LavatoryError> {
        let policy = RetentionPolicy::from_options(terms, count, weeks)?;
        self.retain(repo, project, depth, &policy).await
    }

    /// Artifact query for one project under `policy`.
    fn artifact_query(
        &self,
        repo: &str,
        path: &str,
        depth: u32,
        policy: &RetentionPolicy,
    ) -> Result<ItemQuery, LavatoryError> {
        let query = ItemQuery::new(repo, depth + 1).with_terms([Term::eq("path", path)]);

        let query = match policy {
            RetentionPolicy::KeepLastN(count) => query
                .with_sort(Some(Sort::desc(["created"])))
                .with_offset(Some(*count)),
            RetentionPolicy::KeepNewerThan { weeks } => {
                query.with_terms([Term::lt("created", self.cutoff(*weeks)?)])
            }
            RetentionPolicy::Explicit(terms) => query.with_terms(terms.iter().cloned()),
        };
        Ok(query)
    }

    /// `now - weeks`, formatted for the `created` comparison.
    pub fn cutoff(&self, weeks: u32) -> Result<String, LavatoryError> {
        let before = TimeDelta::try_weeks(i64::from(weeks))
            .and_then(|delta| self.clock.now().checked_sub_signed(delta))
            .ok_or_else(|| LavatoryError::invalid_argument(format!("{weeks} weeks is out of range")))?;
        Ok(before.format(CUTOFF_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::app::{Lavatory, LavatoryBuilder};
    use crate::domain::{ItemQuery, ItemRecord, LavatoryError, RetentionPolicy, Sort, Term};
    use crate::impls::InMemoryRepositoryClient;
    use crate::ports::FixedClock;

    const REPO: &str = "yum-local";

    /// `app` と `lib` の 2 プロジェクト。app は 10 ビルド（1 日おき）、lib は 2 ビルド
    fn client() -> InMemoryRepositoryClient {
        let mut items = vec![
            ItemRecord::new(REPO, ".", "app").with_type("folder"),
            ItemRecord::new(REPO, ".", "lib").with_type("folder"),
        ];
        for day in 1..=10 {
            items.push(
                ItemRecord::new(REPO, "app", format!("build-{day:02}"))
                    .with_type("folder")
                    .with_created(format!("2024-01-{day:02}T12:00:00.000Z")),
            );
        }
        items.push(
            ItemRecord::new(REPO, "lib", "old")
                .with_type("folder")
                .with_created("2023-06-01T00:00:00.000Z"),
        );
        items.push(
            ItemRecord::new(REPO, "lib", "new")
                .with_type("folder")
                .with_created("2024-01-09T00:00:00.000Z"),
        );
        InMemoryRepositoryClient::new().with_items(items)
    }

    fn lavatory_at(y: i32, m: u32, d: u32) -> Lavatory<InMemoryRepositoryClient, FixedClock> {
        let at = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        LavatoryBuilder::new()
            .client(client())
            .clock(FixedClock::new(at))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn keep_last_n_purges_everything_but_the_newest() {
        let lavatory = lavatory_at(2024, 1, 15);

        let purgable = lavatory
            .retain(REPO, Some("app"), 1, &RetentionPolicy::KeepLastN(3))
            .await
            .unwrap();

        // 新しい 3 件（build-10, 09, 08）以外の 7 件、新しい順
        let expected: Vec<String> = (1..=7).rev().map(|d| format!("app/build-{d:02}")).collect();
        assert_eq!(purgable, expected);
    }

    #[tokio::test]
    async fn keep_last_n_queries_sorted_with_offset() {
        let lavatory = lavatory_at(2024, 1, 15);

        lavatory
            .retain(REPO, Some("app"), 1, &RetentionPolicy::KeepLastN(3))
            .await
            .unwrap();

        let expected = ItemQuery::new(REPO, 2)
            .with_terms([Term::eq("path", "app")])
            .with_sort(Some(Sort::desc(["created"])))
            .with_offset(Some(3))
            .to_aql();
        let queries = lavatory.client().aql_queries().await;
        assert_eq!(queries, vec![ItemQuery::new(REPO, 1).to_aql(), expected]);
    }

    #[tokio::test]
    async fn project_filter_skips_other_projects() {
        let lavatory = lavatory_at(2024, 1, 15);

        let purgable = lavatory
            .retain(REPO, Some("lib"), 1, &RetentionPolicy::KeepLastN(1))
            .await
            .unwrap();

        assert_eq!(purgable, vec!["lib/old"]);
        // プロジェクト列挙 + lib の 1 回だけ
        assert_eq!(lavatory.client().aql_queries().await.len(), 2);
    }

    #[tokio::test]
    async fn without_project_filter_every_project_contributes() {
        let lavatory = lavatory_at(2024, 1, 15);

        let purgable = lavatory
            .retain(REPO, None, 1, &RetentionPolicy::KeepLastN(9))
            .await
            .unwrap();

        assert_eq!(purgable, vec!["app/build-01"]);

        let purgable = lavatory
            .retain(REPO, None, 1, &RetentionPolicy::KeepLastN(1))
            .await
            .unwrap();
        assert_eq!(purgable.len(), 9 + 1);
        assert_eq!(purgable.last().map(String::as_str), Some("lib/old"));
    }

    #[tokio::test]
    async fn keep_newer_than_uses_clock_cutoff() {
        // 2024-01-15 12:00 の 1 週間前 = 2024-01-08 12:00
        let lavatory = lavatory_at(2024, 1, 15);

        let mut purgable = lavatory
            .retain(REPO, None, 1, &RetentionPolicy::KeepNewerThan { weeks: 1 })
            .await
            .unwrap();
        purgable.sort();

        let mut expected: Vec<String> = (1..=7).map(|d| format!("app/build-{d:02}")).collect();
        expected.push("lib/old".to_string());
        assert_eq!(purgable, expected);

        let queries = lavatory.client().aql_queries().await;
        assert!(queries[1].contains(r#"{"created":{"$lt":"2024-01-08T12:00:00Z"}}"#));
        assert!(!queries[1].contains(".offset("));
        assert!(!queries[1].contains(".sort("));
    }

    #[tokio::test]
    async fn explicit_terms_select_the_purge_set() {
        let lavatory = lavatory_at(2024, 1, 15);
        let policy = RetentionPolicy::Explicit(vec![Term::op("name", "$match", "build-0?")]);

        let purgable = lavatory.retain(REPO, Some("app"), 1, &policy).await.unwrap();

        assert_eq!(purgable.len(), 9);
        assert!(!purgable.contains(&"app/build-10".to_string()));
    }

    #[tokio::test]
    async fn more_than_one_knob_fails_before_any_query() {
        let lavatory = lavatory_at(2024, 1, 15);

        let err = lavatory
            .retain_with(REPO, None, 1, None, Some(3), Some(2))
            .await
            .unwrap_err();
        assert!(matches!(err, LavatoryError::InvalidArgument(_)));

        let err = lavatory
            .retain_with(REPO, None, 1, Some(vec![Term::eq("name", "x")]), Some(3), Some(2))
            .await
            .unwrap_err();
        assert!(matches!(err, LavatoryError::InvalidArgument(_)));

        let err = lavatory
            .retain_with(REPO, None, 1, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LavatoryError::InvalidArgument(_)));

        assert!(lavatory.client().calls().await.is_empty());
    }

    #[tokio::test]
    async fn retain_with_single_knob_matches_retain() {
        let lavatory = lavatory_at(2024, 1, 15);
        let purgable = lavatory
            .retain_with(REPO, Some("app"), 1, None, Some(8), None)
            .await
            .unwrap();
        assert_eq!(purgable, vec!["app/build-02", "app/build-01"]);
    }

    #[tokio::test]
    async fn query_failures_propagate() {
        let lavatory = Lavatory::new(client().with_aql_failure("timeout"));
        let err = lavatory
            .retain(REPO, None, 1, &RetentionPolicy::KeepLastN(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LavatoryError::Transport { .. }));
    }

    #[test]
    fn cutoff_is_formatted_in_utc_seconds() {
        let lavatory = lavatory_at(2024, 3, 1);
        assert_eq!(lavatory.cutoff(2).unwrap(), "2024-02-16T12:00:00Z");
    }

    #[test]
    fn absurd_cutoff_is_rejected() {
        let lavatory = lavatory_at(2024, 3, 1);
        assert!(lavatory.cutoff(u32::MAX).is_err());
    }
}

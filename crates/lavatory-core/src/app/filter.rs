//! Query Builder - ItemQuery を AQL にしてサーバーで実行する
//!
//! ページングはしない。1 ページで足りない場合は呼び出し側が offset を変えて呼ぶ。

use tracing::debug;

use super::builder::Lavatory;
use crate::domain::{ItemQuery, ItemRecord, LavatoryError};
use crate::ports::{Clock, RepositoryClient};

impl<C: RepositoryClient, K: Clock> Lavatory<C, K> {
    /// Folders of `query.repo` at `query.depth` matching the query terms.
    pub async fn filter(&self, query: &ItemQuery) -> Result<Vec<ItemRecord>, LavatoryError> {
        let aql = query.to_aql();
        debug!(%aql, "AQL");

        let response = self.client.find_by_aql(&aql).await?;
        Ok(response.results)
    }
}

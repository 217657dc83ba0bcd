//! LavatoryBuilder - サービスの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - client が設定されていなければ build() で BuildError を返す
//! - clock は省略時 SystemClock

use crate::ports::{Clock, RepositoryClient, SystemClock};

/// Lavatory はリポジトリの一覧・検索・retention・purge を提供するサービス
///
/// 各操作は `app` 配下のモジュールに分かれている。
/// - lister: `list`
/// - finder: `all_artifacts`
/// - filter: `filter`
/// - purger: `purge`
/// - retention: `retain` / `retain_with`
/// - sweep: `sweep`（retain → purge）
pub struct Lavatory<C, K = SystemClock> {
    pub(crate) client: C,
    pub(crate) clock: K,
}

impl<C: RepositoryClient> Lavatory<C, SystemClock> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            clock: SystemClock,
        }
    }
}

impl<C: RepositoryClient, K: Clock> Lavatory<C, K> {
    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }
}

/// BuildError はサービス構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no repository client configured")]
    MissingClient,
}

/// LavatoryBuilder は Lavatory を構築
///
/// # 使用例
/// ```ignore
/// let lavatory = LavatoryBuilder::new()
///     .client(HttpRepositoryClient::new(&config)?)
///     .clock(FixedClock::new(at))
///     .build()?;
/// ```
pub struct LavatoryBuilder<C, K = SystemClock> {
    client: Option<C>,
    clock: K,
}

impl<C: RepositoryClient> LavatoryBuilder<C, SystemClock> {
    pub fn new() -> Self {
        Self {
            client: None,
            clock: SystemClock,
        }
    }
}

impl<C: RepositoryClient> Default for LavatoryBuilder<C, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: RepositoryClient, K: Clock> LavatoryBuilder<C, K> {
    pub fn client(mut self, client: C) -> Self {
        self.client = Some(client);
        self
    }

    /// 時計を差し替える（weeks ポリシーの cutoff 計算に使う）
    pub fn clock<K2: Clock>(self, clock: K2) -> LavatoryBuilder<C, K2> {
        LavatoryBuilder {
            client: self.client,
            clock,
        }
    }

    pub fn build(self) -> Result<Lavatory<C, K>, BuildError> {
        let client = self.client.ok_or(BuildError::MissingClient)?;
        Ok(Lavatory {
            client,
            clock: self.clock,
        })
    }
}

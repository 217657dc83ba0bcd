//! Item records returned by the structured query endpoint.
//!
//! # 設計原則
//! - サーバーが返すフィールドのうち、retention 判定に使うものだけ型を付ける
//! - 残りは `extra` に保持して、表示やデバッグで使えるようにする

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Properties attached to an artifact (`key -> values`).
pub type Properties = BTreeMap<String, Vec<String>>;

/// One entry of the `results` array of `api/search/aql`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub repo: String,

    pub path: String,

    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// ISO-8601 creation timestamp as the server formats it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ItemRecord {
    pub fn new(repo: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            path: path.into(),
            name: name.into(),
            item_type: None,
            size: None,
            created: None,
            modified: None,
            updated: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    pub fn with_created(mut self, created: impl Into<String>) -> Self {
        self.created = Some(created.into());
        self
    }

    /// Repository-relative path of the item: `{path}/{name}`.
    ///
    /// Items at the repository root carry the path `.`; their full path is
    /// just the name.
    pub fn full_path(&self) -> String {
        if self.path.is_empty() || self.path == "." {
            self.name.clone()
        } else {
            format!("{}/{}", self.path, self.name)
        }
    }

    /// Number of `/`-separated segments in the full path, the way the
    /// server counts `depth` (a top-level item has depth 1).
    pub fn depth(&self) -> usize {
        self.full_path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .count()
    }
}

/// Response body of the structured query endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AqlResponse {
    #[serde(default)]
    pub results: Vec<ItemRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<serde_json::Value>,
}

/// Canonical short name of an artifact path: its last four segments.
///
/// Paths with fewer than four segments are returned whole.
pub fn short_name(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let start = segments.len().saturating_sub(4);
    segments[start..].join("/")
}

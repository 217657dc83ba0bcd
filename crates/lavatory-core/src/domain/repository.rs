//! Repository summaries as reported by the server's storage-info listing.

use serde::{Deserialize, Serialize};

/// Path of the storage-info listing, relative to the server base URL.
pub const STORAGE_INFO_PATH: &str = "api/storageinfo";

/// Key of the synthetic aggregate row in the storage-info listing.
pub const TOTAL_KEY: &str = "TOTAL";

/// Summary row for one repository.
///
/// Only `repo_key` is interpreted; the remaining fields are carried through
/// for reporting and may be absent depending on server version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub repo_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_count: Option<u64>,

    /// Human-readable size as the server formats it (e.g. "1.2 GB").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_space: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,

    /// Anything else the server reports.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RepoSummary {
    pub fn new(repo_key: impl Into<String>) -> Self {
        Self {
            repo_key: repo_key.into(),
            repo_type: None,
            package_type: None,
            folders_count: None,
            files_count: None,
            items_count: None,
            used_space: None,
            percentage: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_total(&self) -> bool {
        self.repo_key == TOTAL_KEY
    }
}

/// Body of `GET api/storageinfo`, reduced to what the lister reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub repositories_summary_list: Vec<RepoSummary>,
}

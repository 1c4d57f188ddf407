//! Repository-related DTOs.
//!
//! - `RepositoryInfo`: Repo metadata (CLI header, repository endpoint)
//! - `BranchInfo`: Local or remote branch with its tip commit

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
    pub path: String,
    pub head_branch: Option<String>,
    pub is_bare: bool,
    pub is_empty: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub is_current: bool,
    pub is_remote: bool,
    pub last_commit_id: Option<String>,
}

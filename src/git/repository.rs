use git2::{BranchType, Repository};
use std::path::Path;
use std::sync::Mutex;

use crate::error::{BlameError, Result};
use crate::models::{BranchInfo, RepositoryInfo};

/// Read-only view of the repository the session works in.
pub struct GitRepository {
    pub repo: Mutex<Repository>,
    pub path: String,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let repo = Repository::discover(&path).map_err(|_| BlameError::RepoNotFound(path_str.clone()))?;

        Ok(Self {
            repo: Mutex::new(repo),
            path: path_str,
        })
    }

    pub fn info(&self) -> Result<RepositoryInfo> {
        self.with_repo(|repo| {
            let name = Path::new(&self.path)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "Unknown".to_string());

            Ok(RepositoryInfo {
                name,
                path: self.path.clone(),
                head_branch: head_branch(repo),
                is_bare: repo.is_bare(),
                is_empty: repo.is_empty().unwrap_or(true),
            })
        })
    }

    /// Local and remote branches, the checked-out one first.
    pub fn list_branches(&self) -> Result<Vec<BranchInfo>> {
        self.with_repo(|repo| {
            let mut branches = Vec::new();

            for entry in repo.branches(None)? {
                let (branch, kind) = entry?;
                let Some(name) = branch.name()?.map(str::to_string) else {
                    continue;
                };
                // origin/HEAD is a pointer, not a branch
                if name.ends_with("/HEAD") {
                    continue;
                }

                branches.push(BranchInfo {
                    name,
                    is_current: branch.is_head(),
                    is_remote: kind == BranchType::Remote,
                    last_commit_id: branch.get().target().map(|oid| oid.to_string()),
                });
            }

            branches.sort_by(|a, b| {
                b.is_current.cmp(&a.is_current).then_with(|| a.name.cmp(&b.name))
            });

            Ok(branches)
        })
    }

    pub fn with_repo<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Repository) -> Result<T>,
    {
        let repo = self.repo.lock().map_err(|_| BlameError::Internal("Lock poisoned".to_string()))?;
        f(&repo)
    }
}

fn head_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if head.is_branch() {
        head.shorthand().map(|s| s.to_string())
    } else {
        None
    }
}

//! Git access.
//!
//! - `shell`: command sessions that run git and capture its output
//! - `log`: history dump → commits
//! - `hunk`: patch text → hunks with aligned original/modified blocks
//! - `attribution`: which commits changed a given line
//! - `admin`: branch switching, stash and pull through the session
//! - `repository`: read-only repository metadata through libgit2

pub mod admin;
pub mod attribution;
pub mod hunk;
pub mod log;
pub mod repository;
pub mod shell;

use std::sync::{Arc, Mutex};

pub use admin::RepositoryAdmin;
pub use attribution::{LineAttributor, MANUAL_REVIEW};
pub use repository::GitRepository;
pub use shell::{CommandRunner, ReplayRunner, ShellSession};

/// Session shared between request handlers; commands run one at a time.
pub type SharedSession = Arc<Mutex<Box<dyn CommandRunner + Send>>>;

pub fn share<R: CommandRunner + Send + 'static>(runner: R) -> SharedSession {
    Arc::new(Mutex::new(Box::new(runner)))
}

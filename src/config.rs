//! Runtime configuration shared by every subcommand.
//!
//! Each option can be given on the command line or through a `GIT_BLAMER_*`
//! environment variable. Nothing is persisted.

use clap::Args;
use std::path::PathBuf;

use crate::error::Result;
use crate::git::{CommandRunner, RepositoryAdmin, ShellSession};
use crate::trace::StackFrameResolver;

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Working directory of the git session
    #[arg(long, env = "GIT_BLAMER_REPO", default_value = ".", global = true)]
    pub repo: PathBuf,

    /// Directory name where repository-relative paths start in stack traces
    #[arg(long, env = "GIT_BLAMER_ROOT_MARKER", default_value = "root", global = true)]
    pub root_marker: String,

    /// Switch to this branch (forced) before attributing
    #[arg(long, env = "GIT_BLAMER_BRANCH", global = true)]
    pub branch: Option<String>,

    /// Run `git stash` before attributing
    #[arg(long, global = true)]
    pub stash: bool,

    /// Run `git pull` before attributing
    #[arg(long, global = true)]
    pub pull: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo: PathBuf::from("."),
            root_marker: "root".to_string(),
            branch: None,
            stash: false,
            pull: false,
        }
    }
}

impl Config {
    pub fn resolver(&self) -> Result<StackFrameResolver> {
        StackFrameResolver::new(&self.root_marker)
    }

    /// Open a session on `repo` with the housekeeping steps already applied.
    pub fn open_session(&self) -> Result<ShellSession> {
        let mut session = ShellSession::open(&self.repo)?;
        self.prepare(&mut session)?;
        Ok(session)
    }

    /// Stash, switch branch, then pull, as configured.
    pub fn prepare<R: CommandRunner + ?Sized>(&self, runner: &mut R) -> Result<()> {
        let mut admin = RepositoryAdmin::new(runner);

        if self.stash {
            admin.stash()?;
        }
        if let Some(branch) = &self.branch {
            admin.switch_branch(branch)?;
        }
        if self.pull {
            admin.pull()?;
        }

        Ok(())
    }
}

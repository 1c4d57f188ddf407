//! Working-copy housekeeping run before attribution.
//!
//! Branch switching, stashing and pulling all go through the same
//! `CommandRunner` the attributor uses, so the history dump reflects whatever
//! state these leave behind.

use crate::error::{BlameError, Result};
use crate::git::shell::{quote_arg, CommandRunner};

const CURRENT_MARKER: &str = "*";

pub struct RepositoryAdmin<'a, R: CommandRunner + ?Sized> {
    runner: &'a mut R,
}

impl<'a, R: CommandRunner + ?Sized> RepositoryAdmin<'a, R> {
    pub fn new(runner: &'a mut R) -> Self {
        Self { runner }
    }

    /// Name of the checked-out branch, from the `*` line of `git branch`.
    pub fn current_branch(&mut self) -> Result<String> {
        let lines = self.runner.run("git branch")?;

        lines
            .iter()
            .find_map(|line| line.trim_start().strip_prefix(CURRENT_MARKER))
            .map(|name| name.trim().to_string())
            .ok_or_else(|| BlameError::NotFound("current branch in 'git branch' output".to_string()))
    }

    /// Force-switch to `name` unless it is already checked out.
    pub fn switch_branch(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BlameError::InvalidArgument("branch name must not be empty".to_string()));
        }

        if self.current_branch()? == name {
            tracing::debug!(branch = name, "already on branch");
            return Ok(());
        }

        self.runner.run(&format!("git switch {} -f", quote_arg(name)))?;

        let current = self.current_branch()?;
        if current != name {
            return Err(BlameError::ExternalCommand(format!(
                "Git was not able to switch to branch '{}'. Current branch is '{}'",
                name, current
            )));
        }

        tracing::info!(branch = name, "switched branch");
        Ok(())
    }

    pub fn stash(&mut self) -> Result<Vec<String>> {
        let output = self.runner.run("git stash")?;
        tracing::info!(lines = output.len(), "stashed local changes");
        Ok(output)
    }

    pub fn pull(&mut self) -> Result<Vec<String>> {
        let output = self.runner.run("git pull")?;
        tracing::info!(lines = output.len(), "pulled from upstream");
        Ok(output)
    }
}

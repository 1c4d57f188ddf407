//! Command sessions.
//!
//! Everything the attribution engine learns about history comes from running
//! git through a `CommandRunner`: a stateful session that executes one command
//! text at a time and hands back its output as ordered lines. Output and error
//! state from the previous command is cleared before every new one.
//!
//! - `ShellSession`: runs commands through the platform shell, scoped to a
//!   repository directory
//! - `ReplayRunner`: answers commands from recorded output (saved log dumps,
//!   tests)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{BlameError, Result};

pub trait CommandRunner {
    /// Forget output and errors left behind by the previous command.
    fn clear(&mut self);

    /// Run `command` and return its standard output as lines.
    fn run(&mut self, command: &str) -> Result<Vec<String>>;

    /// Error stream of the last command.
    fn errors(&self) -> &[String];
}

/// A shell session bound to a working directory inside a git repository.
pub struct ShellSession {
    directory: PathBuf,
    output: Vec<String>,
    errors: Vec<String>,
}

impl ShellSession {
    pub fn open<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();

        if !directory.is_dir() {
            return Err(BlameError::ExternalCommand(format!(
                "Cannot find path '{}' because it does not exist.",
                directory.display()
            )));
        }

        git2::Repository::discover(directory).map_err(|_| {
            BlameError::ExternalCommand(format!(
                "'{}' does not contain a repository.",
                directory.display()
            ))
        })?;

        tracing::debug!(directory = %directory.display(), "opened command session");

        Ok(Self {
            directory: directory.to_path_buf(),
            output: Vec::new(),
            errors: Vec::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Output of the last command.
    pub fn output(&self) -> &[String] {
        &self.output
    }
}

impl CommandRunner for ShellSession {
    fn clear(&mut self) {
        self.output.clear();
        self.errors.clear();
    }

    fn run(&mut self, command: &str) -> Result<Vec<String>> {
        self.clear();

        tracing::debug!(command, directory = %self.directory.display(), "running command");
        let start = std::time::Instant::now();

        let output = shell_command(command)
            .current_dir(&self.directory)
            .env("GIT_PAGER", "cat")
            .output()
            .map_err(|e| BlameError::ExternalCommand(format!("failed to run '{}': {}", command, e)))?;

        self.output = to_lines(&output.stdout);
        self.errors = to_lines(&output.stderr);

        tracing::debug!(
            command,
            lines = self.output.len(),
            elapsed = ?start.elapsed(),
            "command finished"
        );

        if !output.status.success() {
            return Err(BlameError::ExternalCommand(format!(
                "'{}' failed ({}): {}",
                command,
                output.status,
                self.errors.join("\n").trim()
            )));
        }

        Ok(self.output.clone())
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

fn to_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(|line| line.to_string())
        .collect()
}

/// Quote a command argument for the shell when it needs it.
pub fn quote_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '\\' | ':'));

    if plain {
        arg.to_string()
    } else {
        format!("\"{}\"", arg.replace('"', "\\\""))
    }
}

/// Answers commands from recorded output instead of running them.
#[derive(Debug, Default)]
pub struct ReplayRunner {
    responses: HashMap<String, Vec<String>>,
    fallback: Option<Vec<String>>,
    issued: Vec<String>,
    output: Vec<String>,
    errors: Vec<String>,
}

impl ReplayRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the output `command` should produce.
    pub fn respond<S: Into<String>>(mut self, command: &str, lines: Vec<S>) -> Self {
        self.responses
            .insert(command.to_string(), lines.into_iter().map(Into::into).collect());
        self
    }

    /// Record output returned for any command without its own response.
    pub fn respond_to_all<S: Into<String>>(mut self, lines: Vec<S>) -> Self {
        self.fallback = Some(lines.into_iter().map(Into::into).collect());
        self
    }

    /// Record `text` split into lines as the output of `command`.
    pub fn respond_text(self, command: &str, text: &str) -> Self {
        self.respond(command, text.lines().collect::<Vec<&str>>())
    }

    /// Commands issued so far, oldest first.
    pub fn issued(&self) -> &[String] {
        &self.issued
    }
}

impl CommandRunner for ReplayRunner {
    fn clear(&mut self) {
        self.output.clear();
        self.errors.clear();
    }

    fn run(&mut self, command: &str) -> Result<Vec<String>> {
        self.clear();
        self.issued.push(command.to_string());

        match self.responses.get(command).or(self.fallback.as_ref()) {
            Some(lines) => {
                self.output = lines.clone();
                Ok(lines.clone())
            }
            None => {
                self.errors = vec![format!("no recorded output for '{}'", command)];
                Err(BlameError::ExternalCommand(self.errors[0].clone()))
            }
        }
    }

    fn errors(&self) -> &[String] {
        &self.errors
    }
}

//! `git log -p` dump parsing.
//!
//! Splits the line-oriented output of a patch-history command into commits and
//! reads each commit's labeled header lines:
//!
//! ```text
//! commit 3f2a…c9 (from 81be…02)
//! Author: Ann Lee <ann@example.com>
//! Date:   Tue Mar 5 10:00:00 2024 +0000
//!
//!     Fix rounding in invoice totals
//!
//! diff --git a/… b/…
//! ```
//!
//! The patch text of a commit stays attached as raw lines; `git::hunk` turns
//! it into hunks on demand.

use chrono::{DateTime, FixedOffset};

use crate::error::{BlameError, Result};
use crate::git::hunk::{parse_hunks, Hunk};
use crate::pattern::extract_between;

const COMMIT_LABEL: &str = "commit ";
const AUTHOR_LABEL: &str = "Author:";
const DATE_LABEL: &str = "Date:";
const DIFF_LABEL: &str = "diff ";

/// Date layouts accepted on the `Date:` line, git's default first.
const DATE_FORMATS: &[&str] = &["%a %b %e %H:%M:%S %Y %z", "%Y-%m-%d %H:%M:%S %z"];

/// One revision of the file, as printed in the history dump.
#[derive(Debug, Clone)]
pub struct Commit {
    pub id: String,
    /// Parent named by a `(from <id>)` suffix on merge diffs
    pub merge_parent: Option<String>,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub short_description: String,
    pub long_description: String,
    /// Every line of the commit segment, header included
    pub lines: Vec<String>,
}

impl Commit {
    pub fn hunks(&self) -> Result<Vec<Hunk>> {
        parse_hunks(&self.lines)
    }
}

/// Parse a whole history dump, newest commit first (dump order).
pub fn parse_log<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Commit>> {
    split_commits(lines)
        .into_iter()
        .map(parse_commit)
        .collect()
}

pub fn parse_log_text(text: &str) -> Result<Vec<Commit>> {
    let lines: Vec<&str> = text.lines().collect();
    parse_log(&lines)
}

/// Cut a dump into per-commit segments at every `commit ` line.
///
/// Leading blank lines are skipped. When the first segment has lost its
/// `commit ` label it is given one back.
pub fn split_commits<S: AsRef<str>>(lines: &[S]) -> Vec<Vec<String>> {
    let mut segments: Vec<Vec<String>> = Vec::new();
    let mut current: Option<Vec<String>> = None;

    for line in lines.iter().map(AsRef::as_ref) {
        if line.starts_with(COMMIT_LABEL) {
            if let Some(segment) = current.take() {
                segments.push(segment);
            }
            current = Some(vec![line.to_string()]);
        } else if let Some(segment) = current.as_mut() {
            segment.push(line.to_string());
        } else if !line.trim().is_empty() {
            current = Some(vec![format!("{}{}", COMMIT_LABEL, line.trim_start())]);
        }
    }

    if let Some(segment) = current {
        segments.push(segment);
    }

    segments
}

pub fn parse_commit(lines: Vec<String>) -> Result<Commit> {
    let first = lines
        .first()
        .ok_or_else(|| BlameError::InvalidArgument("empty commit segment".to_string()))?;

    let header = extract_between(first, &format!("^{}", COMMIT_LABEL), "", false)?;
    let header = header.trim();

    let id = header.split_whitespace().next().unwrap_or("").to_string();
    if id.is_empty() {
        return Err(BlameError::NotFound(format!("commit id in '{}'", first)));
    }

    let merge_parent = if header.contains("(from ") {
        Some(extract_between(header, r"\(from ", r"\)", false)?.trim().to_string())
            .filter(|parent| !parent.is_empty())
    } else {
        None
    };

    let author = labeled_value(&lines, AUTHOR_LABEL)
        .ok_or_else(|| BlameError::NotFound(format!("'{}' line in commit {}", AUTHOR_LABEL, id)))?;
    let author = author_name(author);

    let date = labeled_value(&lines, DATE_LABEL)
        .ok_or_else(|| BlameError::NotFound(format!("'{}' line in commit {}", DATE_LABEL, id)))?;
    let date = parse_git_date(date)?;

    let long_description = description(&lines);
    let short_description = long_description.lines().next().unwrap_or("").trim().to_string();

    Ok(Commit {
        id,
        merge_parent,
        author,
        date,
        short_description,
        long_description,
        lines,
    })
}

fn labeled_value<'a>(lines: &'a [String], label: &str) -> Option<&'a str> {
    lines
        .iter()
        .find_map(|line| line.strip_prefix(label))
        .map(str::trim)
}

/// Name part of an `Author:` value, without the `<email>`.
fn author_name(value: &str) -> String {
    if !value.contains('<') {
        return value.trim().to_string();
    }

    match extract_between(value, "", "<", false) {
        Ok(name) => name.trim().to_string(),
        Err(_) => value.trim().to_string(),
    }
}

/// Commit message: the lines strictly between `Date:` and the first `diff `
/// line (or the end of the segment), trimmed and newline-joined.
fn description(lines: &[String]) -> String {
    let Some(date_index) = lines.iter().position(|line| line.starts_with(DATE_LABEL)) else {
        return String::new();
    };

    let message: Vec<&str> = lines[date_index + 1..]
        .iter()
        .take_while(|line| !line.starts_with(DIFF_LABEL))
        .map(|line| line.trim())
        .collect();

    message.join("\n").trim().to_string()
}

pub fn parse_git_date(raw: &str) -> Result<DateTime<FixedOffset>> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        .or_else(|| DateTime::parse_from_rfc2822(raw).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok())
        .ok_or_else(|| BlameError::InvalidArgument(format!("unrecognized commit date '{}'", raw)))
}

//! Line attribution over a file's patch history.
//!
//! For a file and a line number, the attributor dumps the file's full history
//! (`git log -p -m <path>`, with color and date layout pinned), walks every commit and asks each commit's hunks
//! what occupied that line position before and after the change. Each commit
//! is checked against the caller's line number as given; the number is never
//! shifted to follow the line through older revisions.
//!
//! Used by: the `blame`/`line` CLI commands and the offenders endpoints

use crate::error::{BlameError, Result};
use crate::git::hunk::{is_removed, Hunk};
use crate::git::log::{parse_log, Commit};
use crate::git::shell::{quote_arg, CommandRunner};
use crate::models::{Offender, TraceReport};
use crate::trace::StackFrameResolver;

/// Placeholder for an original line whose position fell outside its hunk.
pub const MANUAL_REVIEW: &str = "*** Manual review required. ***";

/// Before/after content of the target line for one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineAttribution {
    pub original_line: String,
    pub modified_line: String,
}

/// Full patch history of `file_path`, following merges.
///
/// Color, header layout and date format are fixed so user git config cannot
/// change what the log parser sees.
pub fn history_command(file_path: &str) -> String {
    format!(
        "git log -p -m --no-color --pretty=medium --date=default {}",
        quote_arg(file_path)
    )
}

pub struct LineAttributor<'a, R: CommandRunner + ?Sized> {
    runner: &'a mut R,
}

impl<'a, R: CommandRunner + ?Sized> LineAttributor<'a, R> {
    pub fn new(runner: &'a mut R) -> Self {
        Self { runner }
    }

    /// Every informative commit for `line_number` of `file_path`, newest first.
    pub fn attribute(&mut self, file_path: &str, line_number: u32) -> Result<Vec<Offender>> {
        if file_path.trim().is_empty() {
            return Err(BlameError::InvalidArgument("file path must not be empty".to_string()));
        }
        if line_number == 0 {
            return Err(BlameError::InvalidArgument("line numbers start at 1".to_string()));
        }

        let command = history_command(file_path);

        self.runner.clear();
        let output = self.runner.run(&command)?;

        if output.is_empty() {
            tracing::info!(file_path, "no history returned");
            return Ok(Vec::new());
        }

        attribute_log(file_path, line_number, &command, &output)
    }

    /// Resolve the frames of `stack_trace` and attribute each one in order.
    pub fn attribute_stack_trace(
        &mut self,
        resolver: &StackFrameResolver,
        stack_trace: &str,
    ) -> Result<Vec<TraceReport>> {
        let frames = resolver.resolve_frames(stack_trace)?;
        tracing::info!(frames = frames.len(), "resolved stack trace");

        let mut reports = Vec::with_capacity(frames.len());
        for frame in frames {
            let offenders = self.attribute(&frame.file_path, frame.line_number)?;
            reports.push(TraceReport { frame, offenders });
        }

        Ok(reports)
    }
}

/// Attribute `line_number` against an already captured history dump.
pub fn attribute_log<S: AsRef<str>>(
    file_path: &str,
    line_number: u32,
    command: &str,
    lines: &[S],
) -> Result<Vec<Offender>> {
    let commits = parse_log(lines)?;
    let total = commits.len();
    let mut offenders = Vec::new();

    for commit in commits {
        let hunks = commit.hunks()?;
        let attribution = attribute_hunks(&hunks, line_number);

        tracing::debug!(
            commit = %commit.id,
            hunks = hunks.len(),
            original = %attribution.original_line,
            modified = %attribution.modified_line,
            "evaluated commit"
        );

        let offender = to_offender(commit, file_path, line_number, command, attribution);
        if offender.is_informative() {
            offenders.push(offender);
        }
    }

    tracing::info!(
        file_path,
        line_number,
        commits = total,
        offenders = offenders.len(),
        "attributed line"
    );

    Ok(offenders)
}

fn to_offender(
    commit: Commit,
    file_path: &str,
    line_number: u32,
    command: &str,
    attribution: LineAttribution,
) -> Offender {
    Offender {
        file_path: file_path.to_string(),
        line_number,
        commit_id: commit.id,
        merge_parent: commit.merge_parent,
        author: commit.author,
        date: commit.date,
        short_description: commit.short_description,
        long_description: commit.long_description,
        original_line: attribution.original_line,
        modified_line: attribution.modified_line,
        command: command.to_string(),
    }
}

/// What one commit's hunks say about `line_number`.
///
/// Only hunks whose modified range strictly contains the line take part; when
/// several do, the last one decides.
pub fn attribute_hunks(hunks: &[Hunk], line_number: u32) -> LineAttribution {
    let in_range: Vec<&Hunk> = hunks.iter().filter(|hunk| hunk.covers(line_number)).collect();

    let modified_line = in_range
        .last()
        .map(|hunk| modified_line(hunk, line_number))
        .unwrap_or_default();

    let original_line = in_range
        .iter()
        .filter(|hunk| !hunk.original.code_block.is_empty())
        .last()
        .map(|hunk| {
            let index = original_index(hunk, line_number, &modified_line);
            original_line(hunk, index)
        })
        .unwrap_or_default();

    LineAttribution {
        original_line,
        modified_line,
    }
}

fn modified_line(hunk: &Hunk, line_number: u32) -> String {
    let index = (line_number - hunk.modified.start_line) as usize;

    hunk.modified
        .code_block
        .get(index)
        .map(|line| strip_marker(line, '+'))
        .unwrap_or_default()
}

/// Position of the target line inside the original code block.
fn original_index(hunk: &Hunk, line_number: u32, modified_line: &str) -> isize {
    let direct = (line_number - hunk.modified.start_line) as isize;
    let line_count_diff =
        i64::from(hunk.modified.total_lines) - i64::from(hunk.original.total_lines);

    if line_count_diff == 0 {
        return direct;
    }

    let removed = hunk.original.removed_count;
    let added = hunk.modified.added_count;
    let one_sided = (removed == 0 && added > 0) || (removed > 0 && added == 0);

    if one_sided {
        direct
    } else {
        realigned_index(&hunk.body, modified_line)
    }
}

/// Walk the body up to the first surviving line containing `modified_line`,
/// then pull the offset back by the imbalance of added and removed lines seen.
fn realigned_index(body: &[String], modified_line: &str) -> isize {
    let mut offset: isize = 0;
    let mut added: isize = 0;
    let mut removed: isize = 0;

    for line in body {
        let removed_line = is_removed(line);

        if !removed_line && line.contains(modified_line) {
            break;
        }

        if removed_line {
            removed += 1;
        } else if line.starts_with('+') {
            added += 1;
        }

        offset += 1;
    }

    offset - (added - removed).abs()
}

/// Original-side content at `index`, marker stripped; blank content becomes
/// an `Index: N` placeholder.
fn original_line(hunk: &Hunk, index: isize) -> String {
    match hunk.original.line_at(index).map(|line| strip_marker(line, '-')) {
        Ok(line) if line.is_empty() => format!("Index: {}", index),
        Ok(line) => line,
        Err(e) => {
            tracing::warn!(header = %hunk.header, error = %e, "original line needs manual review");
            MANUAL_REVIEW.to_string()
        }
    }
}

fn strip_marker(line: &str, marker: char) -> String {
    line.strip_prefix(marker).unwrap_or(line).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::hunk::parse_hunks;
    use crate::git::shell::ReplayRunner;

    fn attribution(diff: &str, line_number: u32) -> LineAttribution {
        let lines: Vec<&str> = diff.lines().collect();
        attribute_hunks(&parse_hunks(&lines).unwrap(), line_number)
    }

    #[test]
    fn test_substitution() {
        let result = attribution("@@ -4,3 +4,3 @@\n keep\n-foo\n+bar\n keep", 5);
        assert_eq!(result.original_line, "foo");
        assert_eq!(result.modified_line, "bar");
    }

    #[test]
    fn test_first_hunk_line_not_attributed() {
        let result = attribution("@@ -5,2 +5,2 @@\n-foo\n+bar\n context", 5);
        assert_eq!(result, LineAttribution::default());
    }

    #[test]
    fn test_pure_insertion_uses_placeholder() {
        let result = attribution("@@ -5,3 +5,4 @@\n a\n+inserted\n b\n c", 6);
        assert_eq!(result.modified_line, "inserted");
        assert_eq!(result.original_line, "Index: 1");
    }

    #[test]
    fn test_pure_deletion_indexes_directly() {
        let result = attribution("@@ -5,4 +5,3 @@\n a\n-gone\n b\n c", 6);
        assert_eq!(result.original_line, "gone");
        assert_eq!(result.modified_line, "b");
    }

    #[test]
    fn test_mixed_hunk_realigns() {
        let diff = "@@ -10,4 +10,5 @@\n a\n-old1\n+new1\n+new2\n b\n c";

        let result = attribution(diff, 11);
        assert_eq!(result.modified_line, "new1");
        assert_eq!(result.original_line, "old1");

        let result = attribution(diff, 12);
        assert_eq!(result.modified_line, "new2");
        assert_eq!(result.original_line, "Index: 3");
    }

    #[test]
    fn test_index_out_of_range_needs_review() {
        // the modified text is never found, so the scan runs off the body
        let diff = "@@ -1,2 +1,4 @@\n x\n-y\n+p\n+q\n+r";
        let hunks = parse_hunks(&diff.lines().collect::<Vec<_>>()).unwrap();

        assert_eq!(realigned_index(&hunks[0].body, "zzz"), 3);
        assert_eq!(original_line(&hunks[0], 7), MANUAL_REVIEW);
        assert_eq!(original_line(&hunks[0], -1), MANUAL_REVIEW);
    }

    #[test]
    fn test_removed_blank_line_placeholder() {
        let result = attribution("@@ -1,3 +1,3 @@\n a\n-\n+x\n c", 2);
        assert_eq!(result.original_line, "Index: 1");
        assert_eq!(result.modified_line, "x");
    }

    #[test]
    fn test_removed_whitespace_line_placeholder() {
        let result = attribution("@@ -1,3 +1,3 @@\n a\n-    \n+x\n c", 2);
        assert_eq!(result.original_line, "Index: 1");
    }

    #[test]
    fn test_last_covering_hunk_wins() {
        let diff = "@@ -1,3 +1,3 @@\n a\n-b\n+B\n c\n@@ -1,3 +1,3 @@\n a\n-x\n+X\n c";
        let result = attribution(diff, 2);
        assert_eq!(result.original_line, "x");
        assert_eq!(result.modified_line, "X");
    }

    #[test]
    fn test_only_one_leading_marker_stripped() {
        let result = attribution("@@ -1,3 +1,3 @@\n a\n--x\n+-y\n c", 2);
        assert_eq!(result.original_line, "-x");
        assert_eq!(result.modified_line, "-y");
    }

    const LOG: &str = "commit aaaa
Author: Ann Lee <ann@example.com>
Date:   Tue Mar 5 10:00:00 2024 +0000

    Round invoice totals

diff --git a/root/Billing/InvoiceService.cs b/root/Billing/InvoiceService.cs
@@ -40,4 +40,4 @@
     var subtotal = Sum(lines);
-    return subtotal;
+    return Math.Round(subtotal, 2);
 }
 }

commit bbbb
Author: Bob Stone <bob@example.com>
Date:   Mon Jan 15 14:30:00 2024 +0100

    Blank out the return

diff --git a/root/Billing/InvoiceService.cs b/root/Billing/InvoiceService.cs
@@ -40,4 +40,4 @@
     var subtotal = Sum(lines);
-    return total;
+
 }
 }

commit cccc
Author: Cy <cy@example.com>
Date:   Mon Jan 1 08:00:00 2024 +0000

    Add using

diff --git a/root/Billing/InvoiceService.cs b/root/Billing/InvoiceService.cs
@@ -1,2 +1,3 @@
 using System;
+using System.Linq;
 namespace Billing;
";

    #[test]
    fn test_attribute_log_applies_suppression() {
        let lines: Vec<&str> = LOG.lines().collect();
        let offenders = attribute_log("root/Billing/InvoiceService.cs", 41, "cmd", &lines).unwrap();

        // bbbb deleted the line content and cccc never reached line 41
        assert_eq!(offenders.len(), 1);
        assert_eq!(offenders[0].commit_id, "aaaa");
        assert_eq!(offenders[0].author, "Ann Lee");
        assert_eq!(offenders[0].original_line, "return subtotal;");
        assert_eq!(offenders[0].modified_line, "return Math.Round(subtotal, 2);");
        assert_eq!(offenders[0].command, "cmd");
    }

    #[test]
    fn test_attributor_issues_history_command() {
        let mut runner = ReplayRunner::new().respond_text(
            &history_command("root/Billing/InvoiceService.cs"),
            LOG,
        );

        let offenders = LineAttributor::new(&mut runner)
            .attribute("root/Billing/InvoiceService.cs", 41)
            .unwrap();

        assert_eq!(offenders.len(), 1);
        assert_eq!(
            offenders[0].command,
            "git log -p -m --no-color --pretty=medium --date=default root/Billing/InvoiceService.cs"
        );
        assert_eq!(runner.issued(), [offenders[0].command.as_str()]);
    }

    #[test]
    fn test_empty_history() {
        let mut runner = ReplayRunner::new().respond_to_all(Vec::<String>::new());
        let offenders = LineAttributor::new(&mut runner).attribute("root/a.cs", 3).unwrap();
        assert!(offenders.is_empty());
    }

    #[test]
    fn test_rejects_line_zero() {
        let mut runner = ReplayRunner::new();
        let err = LineAttributor::new(&mut runner).attribute("root/a.cs", 0).unwrap_err();
        assert!(matches!(err, BlameError::InvalidArgument(_)));
        assert!(runner.issued().is_empty());
    }

    #[test]
    fn test_history_command_quotes_paths() {
        assert!(history_command("root/My App/a.cs").ends_with(" \"root/My App/a.cs\""));
    }
}

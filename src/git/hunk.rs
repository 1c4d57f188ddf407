//! Unified-diff hunk parsing.
//!
//! A hunk starts at an `@@ -O,OC +M,MC @@` header and owns the body lines that
//! follow it. Each hunk is reconstructed into two aligned code blocks:
//!
//! - `modified`: context and `+` lines, i.e. the file after the commit
//! - `original`: context and `-` lines, with every `+` line replaced by an
//!   empty placeholder so positions still line up with the body
//!
//! Block lines keep their marker character; callers strip it when reading a
//! line out.

use crate::error::{BlameError, Result};
use crate::pattern::extract_between;

const HUNK_LABEL: &str = "@@";
const DIFF_LABEL: &str = "diff ";
const ADDED: char = '+';
const REMOVED: char = '-';
const NO_NEWLINE: char = '\\';

/// One side of a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// 1-based first line in this side's version of the file
    pub start_line: u32,
    /// Line count from the hunk header
    pub total_lines: u32,
    pub added_count: usize,
    pub removed_count: usize,
    pub code_block: Vec<String>,
}

impl Block {
    fn new(start_line: u32, total_lines: u32, code_block: Vec<String>) -> Self {
        let added_count = code_block.iter().filter(|line| is_added(line)).count();
        let removed_count = code_block.iter().filter(|line| is_removed(line)).count();

        Self {
            start_line,
            total_lines,
            added_count,
            removed_count,
            code_block,
        }
    }

    /// Raw block line at `index`.
    pub fn line_at(&self, index: isize) -> Result<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.code_block.get(i))
            .map(String::as_str)
            .ok_or(BlameError::AttributionIndex {
                index,
                len: self.code_block.len(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub header: String,
    /// Body lines after the header, markers included
    pub body: Vec<String>,
    pub original: Block,
    pub modified: Block,
}

impl Hunk {
    /// Whether `line_number` lies strictly inside the modified side's range.
    ///
    /// The first line of the range and the line just past it do not count.
    pub fn covers(&self, line_number: u32) -> bool {
        let start = u64::from(self.modified.start_line);
        let end = start + u64::from(self.modified.total_lines);
        let line = u64::from(line_number);

        start < line && line < end
    }
}

pub fn is_added(line: &str) -> bool {
    line.starts_with(ADDED)
}

pub fn is_removed(line: &str) -> bool {
    line.starts_with(REMOVED)
}

fn is_marker(line: &str) -> bool {
    line.starts_with(NO_NEWLINE)
}

/// Coordinates of both sides, as `((start, count), (start, count))`.
pub fn parse_header(header: &str) -> Result<((u32, u32), (u32, u32))> {
    let malformed = || BlameError::NotFound(format!("malformed hunk header '{}'", header));

    if !header.starts_with("@@ -") {
        return Err(malformed());
    }

    let original = extract_between(header, "-", r" \+", false).map_err(|_| malformed())?;
    let modified = extract_between(header, r" \+", " @@", false).map_err(|_| malformed())?;

    let original = parse_range(&original).ok_or_else(malformed)?;
    let modified = parse_range(&modified).ok_or_else(malformed)?;

    Ok((original, modified))
}

/// `start,count`, or a bare `start` meaning one line.
fn parse_range(range: &str) -> Option<(u32, u32)> {
    let range = range.trim();

    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Hunk being collected, with the lines each side still expects.
struct OpenHunk {
    header: String,
    original: (u32, u32),
    modified: (u32, u32),
    original_left: u32,
    modified_left: u32,
    body: Vec<String>,
}

impl OpenHunk {
    fn start(header: &str) -> Result<Self> {
        let (original, modified) = parse_header(header)?;

        Ok(Self {
            header: header.to_string(),
            original,
            modified,
            original_left: original.1,
            modified_left: modified.1,
            body: Vec::new(),
        })
    }

    fn is_complete(&self) -> bool {
        self.original_left == 0 && self.modified_left == 0
    }

    fn push(&mut self, line: &str) {
        if is_added(line) {
            self.modified_left = self.modified_left.saturating_sub(1);
        } else if is_removed(line) {
            self.original_left = self.original_left.saturating_sub(1);
        } else if !is_marker(line) {
            self.original_left = self.original_left.saturating_sub(1);
            self.modified_left = self.modified_left.saturating_sub(1);
        }

        self.body.push(line.to_string());
    }

    fn finish(self) -> Hunk {
        if !self.is_complete() {
            tracing::warn!(
                header = %self.header,
                original_missing = self.original_left,
                modified_missing = self.modified_left,
                "hunk body ended early"
            );
        }

        let original_block = self
            .body
            .iter()
            .filter(|line| !is_marker(line))
            .map(|line| if is_added(line) { String::new() } else { line.clone() })
            .collect();

        let modified_block = self
            .body
            .iter()
            .filter(|line| !is_marker(line) && !is_removed(line))
            .cloned()
            .collect();

        Hunk {
            original: Block::new(self.original.0, self.original.1, original_block),
            modified: Block::new(self.modified.0, self.modified.1, modified_block),
            header: self.header,
            body: self.body,
        }
    }
}

/// Parse every hunk in one commit's patch text.
///
/// Lines outside hunks (commit header, message, `diff`/`index`/`---`/`+++`
/// lines) are skipped. A hunk body ends when both sides have received the
/// number of lines announced in the header; a trailing
/// `\ No newline at end of file` still belongs to it.
pub fn parse_hunks<S: AsRef<str>>(lines: &[S]) -> Result<Vec<Hunk>> {
    let mut hunks = Vec::new();
    let mut open: Option<OpenHunk> = None;

    for line in lines.iter().map(AsRef::as_ref) {
        if line.starts_with(HUNK_LABEL) {
            if let Some(hunk) = open.take() {
                hunks.push(hunk.finish());
            }
            open = Some(OpenHunk::start(line)?);
            continue;
        }

        let Some(hunk) = open.as_mut() else {
            continue;
        };

        let body_over = if hunk.is_complete() {
            !is_marker(line)
        } else {
            line.starts_with(DIFF_LABEL)
        };

        if body_over {
            if let Some(hunk) = open.take() {
                hunks.push(hunk.finish());
            }
        } else {
            hunk.push(line);
        }
    }

    if let Some(hunk) = open {
        hunks.push(hunk.finish());
    }

    Ok(hunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hunks(text: &str) -> Vec<Hunk> {
        let lines: Vec<&str> = text.lines().collect();
        parse_hunks(&lines).unwrap()
    }

    #[test]
    fn test_parse_header() {
        let ((o, oc), (m, mc)) = parse_header("@@ -10,3 +10,5 @@ fn main() {").unwrap();
        assert_eq!((o, oc, m, mc), (10, 3, 10, 5));
    }

    #[test]
    fn test_header_counts_default_to_one() {
        let parsed = parse_header("@@ -3 +4 @@").unwrap();
        assert_eq!(parsed, ((3, 1), (4, 1)));
    }

    #[test]
    fn test_malformed_header() {
        assert!(matches!(parse_header("@@ nonsense @@"), Err(BlameError::NotFound(_))));
        assert!(matches!(parse_header("@@ -a,b +c,d @@"), Err(BlameError::NotFound(_))));
    }

    #[test]
    fn test_block_reconstruction() {
        let parsed = hunks("@@ -10,3 +10,5 @@\n a\n-old\n+new1\n+new2\n+new3\n b");
        let hunk = &parsed[0];

        assert_eq!(hunk.original.start_line, 10);
        assert_eq!(hunk.original.total_lines, 3);
        assert_eq!(hunk.modified.start_line, 10);
        assert_eq!(hunk.modified.total_lines, 5);

        assert_eq!(hunk.original.code_block, vec![" a", "-old", "", "", "", " b"]);
        assert_eq!(hunk.modified.code_block, vec![" a", "+new1", "+new2", "+new3", " b"]);

        assert_eq!(hunk.original.removed_count, 1);
        assert_eq!(hunk.original.added_count, 0);
        assert_eq!(hunk.modified.added_count, 3);
        assert_eq!(hunk.modified.removed_count, 0);
    }

    #[test]
    fn test_insert_only_block_matches_header_count() {
        let parsed = hunks("@@ -7,2 +7,4 @@\n x\n+y\n+z\n w");
        assert_eq!(parsed[0].modified.code_block.len(), parsed[0].modified.total_lines as usize);
    }

    #[test]
    fn test_segments_and_trailing_lines() {
        let text = "commit abc\n\
                    Author: A <a@b>\n\
                    \n\
                    diff --git a/f b/f\n\
                    --- a/f\n\
                    +++ b/f\n\
                    @@ -1,2 +1,2 @@\n\
                    -one\n\
                    +uno\n \
                    two\n\
                    @@ -20,1 +20,2 @@\n \
                    last\n\
                    +tail\n\
                    \\ No newline at end of file\n\
                    \n\
                    diff --git a/g b/g\n\
                    --- a/g\n\
                    +++ b/g\n";
        let parsed = hunks(text);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].body, vec!["-one", "+uno", " two"]);
        assert_eq!(parsed[1].body, vec![" last", "+tail", "\\ No newline at end of file"]);
        assert_eq!(parsed[1].modified.code_block, vec![" last", "+tail"]);
        assert_eq!(parsed[1].original.code_block, vec![" last", ""]);
    }

    #[test]
    fn test_truncated_body_is_kept() {
        let parsed = hunks("@@ -1,5 +1,5 @@\n a\n-b\n+c\ndiff --git a/x b/x\n--- a/x");
        assert_eq!(parsed[0].body, vec![" a", "-b", "+c"]);
    }

    #[test]
    fn test_blank_line_counts_as_context() {
        let parsed = hunks("@@ -1,3 +1,3 @@\n a\n\n-b\n+c");
        assert_eq!(parsed[0].body, vec![" a", "", "-b", "+c"]);
    }

    #[test]
    fn test_covers_is_exclusive() {
        let parsed = hunks("@@ -5,2 +5,2 @@\n-foo\n+bar\n context");
        let hunk = &parsed[0];
        assert!(!hunk.covers(5));
        assert!(hunk.covers(6));
        assert!(!hunk.covers(7));
    }

    #[test]
    fn test_line_at_out_of_range() {
        let parsed = hunks("@@ -1,1 +1,1 @@\n-a\n+b");
        let hunk = &parsed[0];

        assert_eq!(hunk.original.line_at(0).unwrap(), "-a");
        assert!(matches!(
            hunk.original.line_at(5),
            Err(BlameError::AttributionIndex { index: 5, len: 2 })
        ));
        assert!(hunk.original.line_at(-1).is_err());
    }

    #[test]
    fn test_no_hunks() {
        assert!(hunks("commit abc\nAuthor: A <a@b>").is_empty());
    }
}

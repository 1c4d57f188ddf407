//! Attribution result DTOs.
//!
//! - `Offender`: one commit's before/after content for a target line
//! - `TraceReport`: a frame together with the offenders found for it
//!
//! Used by: the offenders endpoints and the `blame`/`line` CLI commands

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::FrameReference;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offender {
    pub file_path: String,
    pub line_number: u32,
    pub commit_id: String,
    /// Parent the diff was taken against, for `-m` merge diffs
    pub merge_parent: Option<String>,
    pub author: String,
    pub date: DateTime<FixedOffset>,
    pub short_description: String,
    pub long_description: String,
    /// Line content before the commit
    pub original_line: String,
    /// Line content after the commit
    pub modified_line: String,
    /// Command whose output produced this record
    pub command: String,
}

impl Offender {
    /// Whether this record says anything about where the current line came from.
    ///
    /// Records with no content on either side are dropped, as are pure
    /// deletions (content before, nothing after).
    pub fn is_informative(&self) -> bool {
        let original_empty = self.original_line.trim().is_empty();
        let modified_empty = self.modified_line.trim().is_empty();

        !(original_empty && modified_empty) && !(!original_empty && modified_empty)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceReport {
    pub frame: FrameReference,
    pub offenders: Vec<Offender>,
}

//! Stack-trace frame resolution.
//!
//! Turns the text of a managed-runtime exception dump into the ordered list of
//! frames that carry source line information:
//!
//! ```text
//!    at Contoso.Billing.InvoiceService.Calculate(Invoice i) in C:\s\root\Billing\InvoiceService.cs:line 42
//! ```
//!
//! becomes `root/Billing/InvoiceService.cs`, line `42`, method `Calculate(`.
//! Frames without `:line N` (framework code, lambdas) are skipped.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{BlameError, Result};
use crate::models::FrameReference;
use crate::pattern::extract_between;

const FRAME_SEPARATOR: &str = " at ";
const LINE_TOKEN: &str = ":line";

static LINE_RE: OnceLock<Regex> = OnceLock::new();

fn line_re() -> &'static Regex {
    LINE_RE.get_or_init(|| Regex::new(r":line \d+").unwrap())
}

pub struct StackFrameResolver {
    marker_pattern: String,
    marker: Regex,
}

impl StackFrameResolver {
    /// Build a resolver for paths rooted at `root_marker` (a directory name).
    pub fn new(root_marker: &str) -> Result<Self> {
        let root_marker = root_marker.trim();
        if root_marker.is_empty() {
            return Err(BlameError::InvalidArgument("root marker must not be empty".to_string()));
        }

        let marker_pattern = format!(r"{}[\\/]", regex::escape(root_marker));
        let marker = Regex::new(&marker_pattern)
            .map_err(|e| BlameError::InvalidArgument(format!("invalid root marker: {}", e)))?;

        Ok(Self {
            marker_pattern,
            marker,
        })
    }

    /// Resolve every source frame of `stack_trace`, outermost call first.
    pub fn resolve_frames(&self, stack_trace: &str) -> Result<Vec<FrameReference>> {
        source_frames(stack_trace)
            .map(|segment| self.resolve_frame(segment))
            .collect()
    }

    pub fn resolve_frame(&self, segment: &str) -> Result<FrameReference> {
        Ok(FrameReference {
            file_path: self.file_path(segment)?,
            line_number: line_number(segment)?,
            method_name: method_name(segment)?,
        })
    }

    fn file_path(&self, segment: &str) -> Result<String> {
        if !self.marker.is_match(segment) {
            return Err(BlameError::NotFound(format!(
                "root marker not found in frame '{}'",
                segment
            )));
        }

        let path = extract_between(segment, &self.marker_pattern, LINE_TOKEN, true)?;
        let path = path.strip_suffix(LINE_TOKEN).unwrap_or(&path);

        Ok(path.replace('\\', "/"))
    }
}

/// Split a trace into its frame segments and keep the ones with line info.
///
/// Each kept segment is cut at its first line break and trimmed.
pub fn source_frames(stack_trace: &str) -> impl Iterator<Item = &str> {
    stack_trace
        .split(FRAME_SEPARATOR)
        .filter_map(|segment| segment.lines().next())
        .map(str::trim)
        .filter(|segment| line_re().is_match(segment))
}

/// Bare method name of a frame with `(` re-appended, e.g. `Calculate(`.
pub fn method_name(segment: &str) -> Result<String> {
    let qualified = extract_between(segment, "", r"\(", false)?;
    let method = qualified.rsplit('.').next().unwrap_or("").trim();

    Ok(format!("{}(", method))
}

pub fn line_number(segment: &str) -> Result<u32> {
    let token = extract_between(segment, ":line ", r"\d+", true)?;
    let digits = token.trim_start_matches(":line ");

    let line = digits
        .parse::<u32>()
        .map_err(|e| BlameError::InvalidArgument(format!("bad line number '{}': {}", digits, e)))?;

    if line == 0 {
        return Err(BlameError::InvalidArgument(format!(
            "line numbers start at 1 in frame '{}'",
            segment
        )));
    }

    Ok(line)
}

impl Default for StackFrameResolver {
    fn default() -> Self {
        Self::new("root").expect("default root marker is valid")
    }
}

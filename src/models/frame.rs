//! Stack-trace frame DTO.
//!
//! - `FrameReference`: one source frame (file, line, method) parsed from a
//!   managed-runtime exception dump
//!
//! Used by: the frames endpoint and as the key of every `TraceReport`

use serde::{Deserialize, Serialize};

/// One stack-trace entry that points at project source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReference {
    /// Forward-slash path starting at the root marker
    pub file_path: String,
    /// 1-based line number reported by the runtime
    pub line_number: u32,
    /// Bare method name with a trailing `(`
    pub method_name: String,
}

//! Data transfer objects (DTOs) for API responses and CLI output.
//!
//! These structs are serialized to JSON by the HTTP API and `--json` output.
//! - `frame`: FrameReference parsed from a stack trace
//! - `offender`: Offender, TraceReport attribution results
//! - `repository`: RepositoryInfo, BranchInfo

pub mod frame;
pub mod offender;
pub mod repository;

pub use frame::*;
pub use offender::*;
pub use repository::*;

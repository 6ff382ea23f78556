//! Turning API records into export files
//!
//! Records are flattened to a single level, then written as pretty JSON or
//! CSV. Nothing here talks to the network.

pub mod flatten;
pub mod severity;
pub mod writer;

pub use flatten::{flatten_nested, flatten_shallow};
pub use severity::{
    SEVERITY_LEVELS, count_by_severity, group_by_severity, severity_rank, sort_by_severity,
};
pub use writer::{
    ExportPlan, ExportTarget, timestamp_filename, timestamp_filename_at, write_csv, write_json,
};

//! Display model implementations for table output
//!
//! Each display type picks the few columns worth a terminal row; JSON output
//! always shows the full underlying data instead.

mod app;
mod record;
mod scan;

pub use app::{AppDisplay, AppUrlDisplay};
pub use record::{
    FailureDisplay, FindingDisplay, FolderDisplay, NoteDisplay, PluginDisplay, TemplateDisplay,
    UserDisplay, VulnDisplay,
};
pub use scan::ScanDisplay;

/// Placeholder for an empty cell.
pub(crate) const BLANK: &str = "--";

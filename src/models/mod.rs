//! Display models for CLI output
//!
//! Table rows built from API models and raw records.

pub mod display;

pub use display::{
    AppDisplay, AppUrlDisplay, FailureDisplay, FindingDisplay, FolderDisplay, NoteDisplay,
    PluginDisplay, ScanDisplay, TemplateDisplay, UserDisplay, VulnDisplay,
};

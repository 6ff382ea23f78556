//! Shared CLI argument types
//!
//! Reusable argument structs flattened into commands with `#[command(flatten)]`.

mod common;
mod export;
mod global;
mod pagination;

pub use common::OutputFormat;
pub use export::ExportArgs;
pub use global::GlobalOptions;
pub use pagination::PaginationArgs;

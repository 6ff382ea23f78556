//! Shared command handler patterns

mod batch;
mod export;
mod list;

pub use batch::{collect_ids, report_batch, warn_failures};
pub use export::write_export;
pub use list::run_list_command;

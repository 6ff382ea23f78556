//! Output formatting for CLI results

pub mod formatters;
pub mod json;
pub mod table;

use serde::Serialize;
use tabled::Tabled;

use crate::cli::OutputFormat;
use crate::error::Result;

/// Print rows as a table, or the underlying data as a JSON envelope.
///
/// `data` is what JSON output shows; `rows` is its table rendering.
pub fn print_rows<D, R>(data: &D, rows: &[R], format: OutputFormat) -> Result<()>
where
    D: Serialize + ?Sized,
    R: Tabled,
{
    let output = match format {
        OutputFormat::Table => table::format_table(rows),
        OutputFormat::Json => json::format_json(data)?,
    };
    println!("{}", output);
    Ok(())
}

/// Print a single resource: key/value table or JSON envelope.
pub fn print_value<T: Serialize + ?Sized>(data: &T, format: OutputFormat) -> Result<()> {
    let output = match format {
        OutputFormat::Table => table::format_key_values(&serde_json::to_value(data)?),
        OutputFormat::Json => json::format_json(data)?,
    };
    println!("{}", output);
    Ok(())
}

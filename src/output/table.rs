//! Table output formatting

use serde_json::Value;
use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use crate::export::flatten::display_scalar;
use crate::export::flatten_nested;

/// Format data as a table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return "No results found.".to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Two-column FIELD/VALUE table for one resource; nested keys are dot-joined.
pub fn format_key_values(value: &Value) -> String {
    let Value::Object(record) = value else {
        return serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    };
    if record.is_empty() {
        return "No results found.".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(["FIELD", "VALUE"]);
    for (key, field) in flatten_nested(record) {
        builder.push_record([key, display_scalar(&field)]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

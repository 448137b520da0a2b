//! Plain-text rendering of the mapping table.

use std::fmt::Write;

use api::Mapping;
use api::MappingTable;
use serde_json::Value;

/// Renders every origin, or only `origin` when given.
pub fn table(table: &MappingTable, origin: Option<&str>) -> String {
    let mut out = String::new();
    for (name, mappings) in table {
        if origin.is_some_and(|o| o != name) {
            continue;
        }
        group(&mut out, name, mappings);
    }
    if out.is_empty() {
        out.push_str("no mappings\n");
    }
    out
}

/// Appends one origin header and its mappings.
pub fn group(out: &mut String, origin: &str, mappings: &[Mapping]) {
    let _ = writeln!(out, "{}", origin);
    for mapping in mappings {
        let _ = writeln!(out, "  {}", line(mapping));
    }
}

fn line(mapping: &Mapping) -> String {
    let mut line = format!(
        "[{}] {}",
        if mapping.active { "on " } else { "off" },
        mapping.mapping_id
    );
    for (key, value) in &mapping.extra {
        // strings print unquoted
        let _ = match value {
            Value::String(s) => write!(line, " {}={}", key, s),
            other => write!(line, " {}={}", key, other),
        };
    }
    line
}

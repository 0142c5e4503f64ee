//! CLI presentation: text and JSON formatters for command results.

use crate::error::GroveError;
use crate::types::{ObjectId, ObjectKind};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

/// One ref with the kind of object it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefRow {
    pub name: String,
    pub target: String,
    pub kind: Option<String>,
}

impl RefRow {
    pub fn new(name: impl Into<String>, target: &ObjectId, kind: Option<ObjectKind>) -> Self {
        Self {
            name: name.into(),
            target: target.to_hex(),
            kind: kind.map(|k| k.to_string()),
        }
    }
}

pub fn format_import_summary(dir: &Path, ref_name: &str, commit: &ObjectId, color: bool) -> String {
    let id = commit.to_hex();
    if color {
        format!(
            "Imported {} into {}\n  commit {}",
            dir.display(),
            ref_name.bold(),
            id.yellow()
        )
    } else {
        format!("Imported {} into {}\n  commit {}", dir.display(), ref_name, id)
    }
}

pub fn format_refs(rows: &[RefRow], format: &str) -> Result<String, GroveError> {
    match format {
        "json" => serde_json::to_string_pretty(rows)
            .map_err(|e| GroveError::ConfigError(format!("Failed to encode refs: {}", e))),
        "text" => {
            if rows.is_empty() {
                return Ok("No refs.".to_string());
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec!["Ref", "Target", "Kind"]);
            for row in rows {
                table.add_row(vec![
                    row.name.as_str(),
                    row.target.as_str(),
                    row.kind.as_deref().unwrap_or("missing"),
                ]);
            }
            Ok(table.to_string())
        }
        other => Err(GroveError::ConfigError(format!(
            "Invalid format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

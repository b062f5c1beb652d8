//! Pattern-table configuration: typed schema, validation, fuzzy primitive.

pub mod builtin;
pub mod fuzzy;
pub mod schema;

use std::path::Path;

pub use schema::{CompiledPattern, CompiledTable, PatternDef, PatternKind, PatternTable, Role};

use crate::error::{HokenError, Result};

/// Load and validate a pattern table from a JSON file.
pub fn load_table(path: &Path) -> Result<PatternTable> {
    let content = std::fs::read_to_string(path).map_err(|e| HokenError::TableLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let table: PatternTable =
        serde_json::from_str(&content).map_err(|e| HokenError::TableLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    table.compile()?;
    Ok(table)
}

/// Parse and validate a pattern table from a JSON string.
pub fn parse_table(json: &str) -> Result<PatternTable> {
    let table: PatternTable = serde_json::from_str(json)?;
    table.compile()?;
    Ok(table)
}

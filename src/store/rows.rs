//! Converts store rows into column-name → JSON-value mappings.

use super::types::{ResultSet, Row};
use rusqlite::types::ValueRef;
use rusqlite::{Params, Statement};
use serde_json::{Number, Value};

/// Columns stored as 0/1 integers but exposed as booleans.
pub const FLAG_COLUMNS: &[&str] = &["is_discontinued", "available"];

pub fn shape_row(row: &rusqlite::Row<'_>, columns: &[String]) -> rusqlite::Result<Row> {
    let mut shaped = Row::new();

    for (idx, column) in columns.iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(value) if FLAG_COLUMNS.contains(&column.as_str()) => {
                Value::Bool(value != 0)
            }
            ValueRef::Integer(value) => Value::from(value),
            ValueRef::Real(value) => Number::from_f64(value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        };
        shaped.insert(column.clone(), value);
    }

    Ok(shaped)
}

/// Runs a prepared statement and shapes every row it yields.
pub fn collect_rows<P: Params>(
    stmt: &mut Statement<'_>,
    params: P,
) -> rusqlite::Result<ResultSet> {
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();

    let rows = stmt.query_map(params, |row| shape_row(row, &columns))?;
    rows.collect()
}

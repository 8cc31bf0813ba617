use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier assigned by the source data. The catalog mixes numeric and
/// textual identifiers, so both are kept as-is.
///
/// Numbers that do not fit an `i64` are still accepted: an integral float such
/// as `12345.0` becomes `Int(12345)`, and any other number (a fraction or an
/// integer above `i64::MAX`) keeps its decimal text. Booleans, arrays and
/// objects are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecordId {
    Int(i64),
    Unsigned(u64),
    Real(f64),
    Text(String),
}

impl From<RawRecordId> for RecordId {
    fn from(raw: RawRecordId) -> Self {
        match raw {
            RawRecordId::Int(value) => RecordId::Int(value),
            RawRecordId::Unsigned(value) => RecordId::Text(value.to_string()),
            RawRecordId::Real(value) => integral(value)
                .map(RecordId::Int)
                .unwrap_or_else(|| RecordId::Text(value.to_string())),
            RawRecordId::Text(value) => RecordId::Text(value),
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawRecordId::deserialize(deserializer).map(RecordId::from)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(value) => write!(f, "{}", value),
            RecordId::Text(value) => write!(f, "{}", value),
        }
    }
}

impl ToSql for RecordId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            RecordId::Int(value) => ToSqlOutput::from(*value),
            RecordId::Text(value) => ToSqlOutput::from(value.as_str()),
        })
    }
}

/// One result row: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Ordered rows returned for one request.
pub type ResultSet = Vec<Row>;

/// A record in the store's insertion format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicineRow {
    pub id: Option<RecordId>,
    pub sku_id: Option<RecordId>,
    pub name: Option<String>,
    /// Normalized copy of `name` matched by the fuzzy strategy.
    pub search_name: Option<String>,
    pub manufacturer_name: Option<String>,
    pub marketer_name: Option<String>,
    pub kind: Option<String>,
    pub price: Option<f64>,
    pub pack_size_label: Option<String>,
    pub short_composition: Option<String>,
    pub is_discontinued: Option<bool>,
    pub available: Option<bool>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
}

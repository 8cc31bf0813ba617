//! Ingestion Data Types
//!
//! Source records as they appear in the import files, the policy for records
//! without an identifier, and the report returned by a load run.

use crate::search::tokenizer::normalize_search_text;
use crate::store::types::{MedicineRow, RecordId};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// One object of a source file's top-level array.
///
/// Every field is optional: a missing or `null` field becomes NULL in the store
/// instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceRecord {
    pub id: Option<RecordId>,
    pub sku_id: Option<RecordId>,
    pub name: Option<String>,
    pub manufacturer_name: Option<String>,
    pub marketer_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_price")]
    pub price: Option<f64>,
    pub pack_size_label: Option<String>,
    pub short_composition: Option<String>,
    #[serde(deserialize_with = "lenient_flag")]
    pub is_discontinued: Option<bool>,
    #[serde(deserialize_with = "lenient_flag")]
    pub available: Option<bool>,
    pub slug: Option<String>,
    pub image_url: Option<String>,
}

impl SourceRecord {
    /// Converts into the store's insertion format, deriving `search_name` from `name`.
    pub fn into_row(self) -> MedicineRow {
        let search_name = self.name.as_deref().map(normalize_search_text);
        MedicineRow {
            id: self.id,
            sku_id: self.sku_id,
            name: self.name,
            search_name,
            manufacturer_name: self.manufacturer_name,
            marketer_name: self.marketer_name,
            kind: self.kind,
            price: self.price,
            pack_size_label: self.pack_size_label,
            short_composition: self.short_composition,
            is_discontinued: self.is_discontinued,
            available: self.available,
            slug: self.slug,
            image_url: self.image_url,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Prices arrive as numbers or numeric strings; anything else is NULL.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<PriceValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(PriceValue::Number(price)) => Some(price),
        Some(PriceValue::Text(raw)) => raw.trim().parse().ok(),
        Some(PriceValue::Other(_)) | None => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Int(i64),
    Text(String),
    Other(IgnoredAny),
}

/// Flags arrive as booleans, 0/1 or `"true"`/`"false"`; anything else is NULL.
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlagValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(FlagValue::Bool(flag)) => Some(flag),
        Some(FlagValue::Int(flag)) => Some(flag != 0),
        Some(FlagValue::Text(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Some(FlagValue::Other(_)) | None => None,
    })
}

/// What to do with records that carry no identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum NullIdPolicy {
    /// A missing identifier is tracked like any other value: the first
    /// identifier-less record is imported, every later one is skipped.
    #[default]
    Collapse,
    /// Identifier-less records are never deduplicated.
    AlwaysUnique,
}

/// Outcome of one [`super::loader::BulkLoader::load`] run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped_duplicates: usize,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub imported: usize,
    pub skipped_duplicates: usize,
}

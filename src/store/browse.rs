//! Store Browsing
//!
//! Read-only inspection of catalog entities. Callers name an entity by string,
//! but only names on the allow-list parse into an [`Entity`], and each entity
//! maps to a fixed SQL string. Caller input never becomes part of a query text.

use super::rows::collect_rows;
use super::types::ResultSet;
use crate::error::SearchError;
use rusqlite::Connection;
use std::str::FromStr;

pub const DEFAULT_PREVIEW_LIMIT: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Medicines,
}

impl Entity {
    pub const ALL: [Entity; 1] = [Entity::Medicines];

    pub fn name(self) -> &'static str {
        match self {
            Entity::Medicines => "medicines",
        }
    }

    fn preview_sql(self) -> &'static str {
        match self {
            Entity::Medicines => {
                "SELECT id, sku_id, name, manufacturer_name, marketer_name, type, price,
                        pack_size_label, short_composition, is_discontinued, available,
                        slug, image_url
                 FROM medicines
                 ORDER BY id ASC
                 LIMIT ?1"
            }
        }
    }
}

impl FromStr for Entity {
    type Err = SearchError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .into_iter()
            .find(|entity| entity.name() == name)
            .ok_or_else(|| SearchError::UnknownEntity(name.to_string()))
    }
}

/// Allow-listed entities that actually exist in the connected store.
pub fn browsable_entities(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
    )?;

    let mut names = Vec::new();
    for entity in Entity::ALL {
        let exists: bool = stmt.query_row([entity.name()], |row| row.get(0))?;
        if exists {
            names.push(entity.name().to_string());
        }
    }
    Ok(names)
}

/// First `limit` rows of an entity, ordered by identifier.
pub fn preview_entity(
    conn: &Connection,
    entity: Entity,
    limit: i64,
) -> rusqlite::Result<ResultSet> {
    let mut stmt = conn.prepare_cached(entity.preview_sql())?;
    collect_rows(&mut stmt, [limit])
}

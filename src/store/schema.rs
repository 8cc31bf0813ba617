//! Catalog schema and the insertion statement used by the bulk loader.

use super::types::MedicineRow;
use rusqlite::{Statement, params};

/// Idempotent schema. `id` carries no type affinity so integer and text
/// identifiers keep the type they had in the source files; `UNIQUE` lets the
/// store reject a second copy of an identifier while still admitting NULLs.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS medicines (
    id                UNIQUE,
    sku_id,
    name              TEXT,
    search_name       TEXT,
    manufacturer_name TEXT,
    marketer_name     TEXT,
    type              TEXT,
    price             REAL,
    pack_size_label   TEXT,
    short_composition TEXT,
    is_discontinued   INTEGER,
    available         INTEGER,
    slug              TEXT,
    image_url         TEXT
);

DROP INDEX IF EXISTS medicines_lower_name;
CREATE INDEX IF NOT EXISTS medicines_fold_name ON medicines (fold(name));

CREATE VIRTUAL TABLE IF NOT EXISTS medicines_fts USING fts5(
    name,
    content='medicines',
    content_rowid='rowid',
    tokenize='porter unicode61'
);

CREATE TRIGGER IF NOT EXISTS medicines_fts_insert AFTER INSERT ON medicines BEGIN
    INSERT INTO medicines_fts (rowid, name) VALUES (new.rowid, new.name);
END;

CREATE TRIGGER IF NOT EXISTS medicines_fts_delete AFTER DELETE ON medicines BEGIN
    INSERT INTO medicines_fts (medicines_fts, rowid, name) VALUES ('delete', old.rowid, old.name);
END;

CREATE TRIGGER IF NOT EXISTS medicines_fts_update AFTER UPDATE OF name ON medicines BEGIN
    INSERT INTO medicines_fts (medicines_fts, rowid, name) VALUES ('delete', old.rowid, old.name);
    INSERT INTO medicines_fts (rowid, name) VALUES (new.rowid, new.name);
END;
"#;

pub const INSERT_MEDICINE: &str = r#"
INSERT INTO medicines (
    id, sku_id, name, search_name, manufacturer_name, marketer_name, type,
    price, pack_size_label, short_composition, is_discontinued, available,
    slug, image_url
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
"#;

/// Binds one row to a statement prepared from [`INSERT_MEDICINE`].
pub fn insert_row(stmt: &mut Statement<'_>, row: &MedicineRow) -> rusqlite::Result<usize> {
    stmt.execute(params![
        row.id,
        row.sku_id,
        row.name,
        row.search_name,
        row.manufacturer_name,
        row.marketer_name,
        row.kind,
        row.price,
        row.pack_size_label,
        row.short_composition,
        row.is_discontinued,
        row.available,
        row.slug,
        row.image_url,
    ])
}

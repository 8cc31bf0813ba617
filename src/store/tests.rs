//! Store Module Tests
//!
//! ## Test Scopes
//! - **Trigram**: similarity scores for known pairs, symmetry, case and punctuation handling.
//! - **Schema**: idempotent creation, identifier uniqueness, FTS synchronisation.
//! - **Connections**: reader connections refuse writes.
//! - **Rows & browsing**: JSON shaping and the entity allow-list.

#[cfg(test)]
mod tests {
    use crate::error::SearchError;
    use crate::store::browse::{Entity, browsable_entities, preview_entity};
    use crate::store::database::{Store, count_records};
    use crate::store::rows::collect_rows;
    use crate::store::schema::{INSERT_MEDICINE, insert_row};
    use crate::store::trigram::{fold, similarity, trigrams};
    use crate::store::types::{MedicineRow, RecordId};
    use rusqlite::Connection;
    use serde_json::Value;

    fn temp_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("catalog.db"));
        (dir, store)
    }

    fn row(id: Option<RecordId>, name: &str) -> MedicineRow {
        MedicineRow {
            id,
            name: Some(name.to_string()),
            search_name: Some(name.to_lowercase()),
            ..MedicineRow::default()
        }
    }

    fn insert(conn: &Connection, rows: &[MedicineRow]) -> rusqlite::Result<()> {
        let mut stmt = conn.prepare(INSERT_MEDICINE)?;
        for row in rows {
            insert_row(&mut stmt, row)?;
        }
        Ok(())
    }

    // ============================================================
    // TRIGRAM TESTS
    // ============================================================

    #[test]
    fn test_trigrams_pad_each_word() {
        let grams = trigrams("a");
        assert_eq!(grams.len(), 2);
        assert!(grams.contains(&[' ', ' ', 'a']));
        assert!(grams.contains(&[' ', 'a', ' ']));
    }

    #[test]
    fn test_similarity_known_pairs() {
        // "avastn" and "avastin" share 5 of 10 distinct trigrams.
        assert!((similarity("Avastn", "Avastin") - 0.5).abs() < 1e-9);
        // "avastn" and "avamys" share 3 of 11.
        assert!((similarity("Avastn", "Avamys") - 3.0 / 11.0).abs() < 1e-9);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_similarity_identity_and_symmetry() {
        assert_eq!(similarity("Paracetamol", "Paracetamol"), 1.0);
        assert_eq!(
            similarity("Amoxicillin", "Amoxyclav"),
            similarity("Amoxyclav", "Amoxicillin")
        );
    }

    #[test]
    fn test_similarity_ignores_case_and_punctuation() {
        assert_eq!(similarity("AVASTIN", "avastin"), 1.0);
        assert_eq!(similarity("co-trimoxazole", "co trimoxazole"), 1.0);
    }

    #[test]
    fn test_similarity_of_empty_inputs_is_zero() {
        assert_eq!(similarity("", ""), 0.0);
        assert_eq!(similarity("", "avastin"), 0.0);
        assert_eq!(similarity("---", "!!!"), 0.0);
    }

    #[test]
    fn test_similarity_sql_function() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();

        let score: f64 = conn
            .query_row("SELECT similarity('Avastn', 'Avastin')", [], |row| row.get(0))
            .unwrap();
        assert!((score - 0.5).abs() < 1e-9);

        let null_score: Option<f64> = conn
            .query_row("SELECT similarity(NULL, 'Avastin')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null_score, None);
    }

    #[test]
    fn test_fold_sql_function_lowercases_unicode() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();

        let folded: String = conn
            .query_row("SELECT fold('Lévothyrox ÉLIXIR')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(folded, "lévothyrox élixir");
        assert_eq!(fold("ÉRYTHROMYCIN"), "érythromycin");

        let null_fold: Option<String> = conn
            .query_row("SELECT fold(NULL)", [], |row| row.get(0))
            .unwrap();
        assert_eq!(null_fold, None);

        let index_sql: String = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE name = 'medicines_fold_name'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(index_sql.contains("fold(name)"));
    }

    // ============================================================
    // SCHEMA TESTS
    // ============================================================

    #[test]
    fn test_schema_creation_is_idempotent() {
        let (_dir, store) = temp_store();
        store.initialize().unwrap();
        store.initialize().unwrap();

        let conn = store.open_writer().unwrap();
        assert_eq!(count_records(&conn).unwrap(), 0);
    }

    #[test]
    fn test_duplicate_identifier_is_rejected() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();

        insert(&conn, &[row(Some(RecordId::Int(1)), "Avastin")]).unwrap();
        let err = insert(&conn, &[row(Some(RecordId::Int(1)), "Avamys")]).unwrap_err();

        match err {
            rusqlite::Error::SqliteFailure(code, _) => {
                assert_eq!(code.extended_code, rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
            }
            other => panic!("expected a constraint failure, got {:?}", other),
        }
        assert_eq!(count_records(&conn).unwrap(), 1);
    }

    #[test]
    fn test_null_identifiers_are_not_unique_constrained() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();

        insert(&conn, &[row(None, "Unlabelled A"), row(None, "Unlabelled B")]).unwrap();
        assert_eq!(count_records(&conn).unwrap(), 2);
    }

    #[test]
    fn test_identifiers_keep_their_source_type() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();

        insert(
            &conn,
            &[
                row(Some(RecordId::Int(7)), "Numeric"),
                row(Some(RecordId::Text("7".to_string())), "Textual"),
            ],
        )
        .unwrap();

        let types: Vec<String> = conn
            .prepare("SELECT typeof(id) FROM medicines ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(types, vec!["integer", "text"]);
    }

    #[test]
    fn test_fts_index_follows_inserts() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();

        insert(
            &conn,
            &[
                row(Some(RecordId::Int(1)), "Amoxicillin Antibiotic Capsule"),
                row(Some(RecordId::Int(2)), "Paracetamol Tablet"),
            ],
        )
        .unwrap();

        // Porter stemming: "antibiotics" and "antibiotic" share a stem.
        let hits: i64 = conn
            .query_row(
                "SELECT count(*) FROM medicines_fts WHERE medicines_fts MATCH '\"antibiotics\"'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(hits, 1);
    }

    // ============================================================
    // CONNECTION TESTS
    // ============================================================

    #[test]
    fn test_reader_connection_is_query_only() {
        let (_dir, store) = temp_store();
        store.initialize().unwrap();

        let reader = store.open_reader().unwrap();
        assert!(insert(&reader, &[row(Some(RecordId::Int(1)), "Avastin")]).is_err());
        assert_eq!(count_records(&reader).unwrap(), 0);
    }

    #[test]
    fn test_connect_fn_opens_readers() {
        let (_dir, store) = temp_store();
        store.initialize().unwrap();

        let connect = store.connect_fn();
        let conn = connect().unwrap();
        let score: f64 = conn
            .query_row("SELECT similarity('a', 'a')", [], |row| row.get(0))
            .unwrap();
        assert_eq!(score, 1.0);
    }

    // ============================================================
    // ROW SHAPING & BROWSING TESTS
    // ============================================================

    #[test]
    fn test_rows_map_flags_to_booleans() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();
        insert(
            &conn,
            &[MedicineRow {
                id: Some(RecordId::Int(3)),
                name: Some("Betagon Tablet".to_string()),
                price: Some(42.5),
                is_discontinued: Some(false),
                available: Some(true),
                ..MedicineRow::default()
            }],
        )
        .unwrap();

        let mut stmt = conn
            .prepare("SELECT id, name, price, is_discontinued, available, slug FROM medicines")
            .unwrap();
        let rows = collect_rows(&mut stmt, []).unwrap();

        assert_eq!(rows.len(), 1);
        let shaped = &rows[0];
        assert_eq!(shaped["id"], Value::from(3));
        assert_eq!(shaped["name"], Value::from("Betagon Tablet"));
        assert_eq!(shaped["price"], Value::from(42.5));
        assert_eq!(shaped["is_discontinued"], Value::Bool(false));
        assert_eq!(shaped["available"], Value::Bool(true));
        assert_eq!(shaped["slug"], Value::Null);
    }

    #[test]
    fn test_entity_allow_list() {
        assert_eq!("medicines".parse::<Entity>().unwrap(), Entity::Medicines);

        let err = "sqlite_master".parse::<Entity>().unwrap_err();
        assert!(matches!(err, SearchError::UnknownEntity(name) if name == "sqlite_master"));

        let err = "medicines; DROP TABLE medicines".parse::<Entity>().unwrap_err();
        assert!(matches!(err, SearchError::UnknownEntity(_)));
    }

    #[test]
    fn test_browse_lists_and_previews_entities() {
        let (_dir, store) = temp_store();
        let conn = store.open_writer().unwrap();
        insert(
            &conn,
            &[
                row(Some(RecordId::Int(2)), "Avamys"),
                row(Some(RecordId::Int(1)), "Avastin"),
                row(Some(RecordId::Int(3)), "Betagon"),
            ],
        )
        .unwrap();

        assert_eq!(browsable_entities(&conn).unwrap(), vec!["medicines"]);

        let preview = preview_entity(&conn, Entity::Medicines, 2).unwrap();
        let ids: Vec<&Value> = preview.iter().map(|row| &row["id"]).collect();
        assert_eq!(ids, vec![&Value::from(1), &Value::from(2)]);
        assert!(!preview[0].contains_key("search_name"));
    }

    #[test]
    fn test_browse_on_empty_database_lists_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(browsable_entities(&conn).unwrap().is_empty());
    }
}

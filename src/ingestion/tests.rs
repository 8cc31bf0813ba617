//! Ingestion Module Tests
//!
//! ## Test Scopes
//! - **Seen-set**: First-occurrence-wins deduplication and both null-id policies.
//! - **Source records**: Missing and loosely typed fields.
//! - **Loader**: Cross-file deduplication, counts, file order, failure handling.
//! - **Discovery**: Missing and empty folders abort before the store is created.

#[cfg(test)]
mod tests {
    use crate::error::ImportError;
    use crate::ingestion::loader::{SeenSet, discover_source_files, import_folder};
    use crate::ingestion::types::{NullIdPolicy, SourceRecord};
    use crate::store::database::{Store, count_records};
    use crate::store::types::RecordId;
    use serde_json::{Value, json};
    use std::path::Path;

    fn write_source(dir: &Path, file: &str, records: Value) {
        std::fs::write(dir.join(file), records.to_string()).unwrap();
    }

    fn stored_names(store: &Store) -> Vec<(Value, Value)> {
        let conn = store.open_reader().unwrap();
        let mut stmt = conn
            .prepare("SELECT id, name FROM medicines ORDER BY rowid")
            .unwrap();
        let rows = crate::store::rows::collect_rows(&mut stmt, []).unwrap();
        rows.into_iter()
            .map(|row| (row["id"].clone(), row["name"].clone()))
            .collect()
    }

    fn count(store: &Store) -> i64 {
        count_records(&store.open_reader().unwrap()).unwrap()
    }

    fn setup() -> (tempfile::TempDir, std::path::PathBuf, Store) {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        let store = Store::new(dir.path().join("catalog.db"));
        (dir, data, store)
    }

    // ============================================================
    // SEEN-SET TESTS
    // ============================================================

    #[test]
    fn test_seen_set_admits_each_id_once() {
        let mut seen = SeenSet::new(NullIdPolicy::Collapse);

        assert!(seen.admit(Some(&RecordId::Int(1))));
        assert!(!seen.admit(Some(&RecordId::Int(1))));
        assert!(seen.admit(Some(&RecordId::Text("1".to_string()))));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_seen_set_collapses_null_ids() {
        let mut seen = SeenSet::new(NullIdPolicy::Collapse);

        assert!(seen.admit(None));
        assert!(!seen.admit(None));
        assert!(!seen.admit(None));
    }

    #[test]
    fn test_seen_set_can_keep_every_null_id() {
        let mut seen = SeenSet::new(NullIdPolicy::AlwaysUnique);

        assert!(seen.admit(None));
        assert!(seen.admit(None));
        assert!(seen.is_empty());
    }

    // ============================================================
    // SOURCE RECORD TESTS
    // ============================================================

    #[test]
    fn test_missing_fields_become_null() {
        let record: SourceRecord = serde_json::from_value(json!({ "name": "Avastin 400mg Injection" })).unwrap();
        let row = record.into_row();

        assert_eq!(row.id, None);
        assert_eq!(row.price, None);
        assert_eq!(row.available, None);
        assert_eq!(row.search_name.as_deref(), Some("avastin 400mg injection"));
    }

    #[test]
    fn test_loosely_typed_fields_are_accepted() {
        let record: SourceRecord = serde_json::from_value(json!({
            "id": "A-17",
            "sku_id": 9001,
            "type": "allopathy",
            "price": "129.50",
            "is_discontinued": "FALSE",
            "available": 1,
            "slug": null
        }))
        .unwrap();

        assert_eq!(record.id, Some(RecordId::Text("A-17".to_string())));
        assert_eq!(record.sku_id, Some(RecordId::Int(9001)));
        assert_eq!(record.kind.as_deref(), Some("allopathy"));
        assert_eq!(record.price, Some(129.5));
        assert_eq!(record.is_discontinued, Some(false));
        assert_eq!(record.available, Some(true));
        assert_eq!(record.slug, None);
    }

    #[test]
    fn test_unusable_price_becomes_null() {
        let record: SourceRecord =
            serde_json::from_value(json!({ "id": 1, "price": "n/a", "available": [] })).unwrap();

        assert_eq!(record.price, None);
        assert_eq!(record.available, None);
    }

    #[test]
    fn test_numeric_ids_outside_i64_are_kept() {
        let parse = |raw: &str| serde_json::from_str::<SourceRecord>(raw).map(|record| record.id);

        assert_eq!(parse(r#"{"id": 12345.0}"#).unwrap(), Some(RecordId::Int(12345)));
        assert_eq!(
            parse(r#"{"id": 18446744073709551615}"#).unwrap(),
            Some(RecordId::Text("18446744073709551615".to_string()))
        );
        assert_eq!(parse(r#"{"id": 1.5}"#).unwrap(), Some(RecordId::Text("1.5".to_string())));
        assert!(parse(r#"{"id": true}"#).is_err());
        assert!(parse(r#"{"id": {"value": 1}}"#).is_err());
    }

    // ============================================================
    // LOADER TESTS
    // ============================================================

    #[test]
    fn test_first_occurrence_wins_across_files() {
        let (_dir, data, store) = setup();
        write_source(&data, "file1.json", json!([{ "id": 1, "name": "X" }]));
        write_source(&data, "file2.json", json!([{ "id": 1, "name": "Y" }]));

        let report = import_folder(&store, &data, NullIdPolicy::Collapse).unwrap();

        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped_duplicates, 1);
        assert_eq!(stored_names(&store), vec![(json!(1), json!("X"))]);
    }

    #[test]
    fn test_imports_n_minus_k_records() {
        let (_dir, data, store) = setup();
        // ARRANGE: 7 records, ids 2 and 3 repeat (once across files, once within a file)
        write_source(
            &data,
            "a.json",
            json!([
                { "id": 1, "name": "Avastin" },
                { "id": 2, "name": "Avamys" },
                { "id": 3, "name": "Betagon" },
                { "id": 3, "name": "Betagon copy" }
            ]),
        );
        write_source(
            &data,
            "b.json",
            json!([
                { "id": 2, "name": "Avamys copy" },
                { "id": 4, "name": "Dolo 650" },
                { "id": "4", "name": "Dolo 650 (text id)" }
            ]),
        );

        // ACT
        let report = import_folder(&store, &data, NullIdPolicy::Collapse).unwrap();

        // ASSERT
        assert_eq!(report.imported, 5);
        assert_eq!(report.skipped_duplicates, 2);
        assert_eq!(report.files.len(), 2);
        assert_eq!(report.files[0].imported, 3);
        assert_eq!(report.files[1].imported, 2);
        assert_eq!(count(&store), 5);

        let names: Vec<Value> = stored_names(&store).into_iter().map(|(_, name)| name).collect();
        assert_eq!(
            names,
            vec![
                json!("Avastin"),
                json!("Avamys"),
                json!("Betagon"),
                json!("Dolo 650"),
                json!("Dolo 650 (text id)")
            ]
        );
    }

    #[test]
    fn test_files_are_processed_in_name_order() {
        let (_dir, data, store) = setup();
        write_source(&data, "02-second.json", json!([{ "id": 1, "name": "Second" }]));
        write_source(&data, "01-first.json", json!([{ "id": 1, "name": "First" }]));

        import_folder(&store, &data, NullIdPolicy::Collapse).unwrap();

        assert_eq!(stored_names(&store), vec![(json!(1), json!("First"))]);
    }

    #[test]
    fn test_null_ids_collapse_by_default() {
        let (_dir, data, store) = setup();
        write_source(
            &data,
            "a.json",
            json!([
                { "name": "No id 1" },
                { "id": null, "name": "No id 2" },
                { "id": 5, "name": "Has id" }
            ]),
        );

        let report = import_folder(&store, &data, NullIdPolicy::default()).unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped_duplicates, 1);
        assert_eq!(
            stored_names(&store),
            vec![(Value::Null, json!("No id 1")), (json!(5), json!("Has id"))]
        );
    }

    #[test]
    fn test_null_ids_always_unique() {
        let (_dir, data, store) = setup();
        write_source(
            &data,
            "a.json",
            json!([{ "name": "No id 1" }, { "name": "No id 2" }, { "name": "No id 3" }]),
        );

        let report = import_folder(&store, &data, NullIdPolicy::AlwaysUnique).unwrap();

        assert_eq!(report.imported, 3);
        assert_eq!(count(&store), 3);
    }

    #[test]
    fn test_imported_records_are_searchable() {
        let (_dir, data, store) = setup();
        write_source(
            &data,
            "a.json",
            json!([{ "id": 1, "name": "Co-Trimoxazole Tablet", "available": true }]),
        );

        import_folder(&store, &data, NullIdPolicy::Collapse).unwrap();

        let conn = store.open_reader().unwrap();
        let (search_name, hits): (String, i64) = conn
            .query_row(
                "SELECT search_name,
                        (SELECT count(*) FROM medicines_fts WHERE medicines_fts MATCH '\"tablets\"')
                 FROM medicines",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(search_name, "co trimoxazole tablet");
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_reimport_is_rejected_by_the_store() {
        let (_dir, data, store) = setup();
        write_source(
            &data,
            "a.json",
            json!([{ "id": 1, "name": "Avastin" }, { "id": 2, "name": "Avamys" }]),
        );
        import_folder(&store, &data, NullIdPolicy::Collapse).unwrap();

        // ARRANGE: a second run sees id 3 first, then an id the store already holds
        write_source(
            &data,
            "a.json",
            json!([{ "id": 3, "name": "Betagon" }, { "id": 1, "name": "Avastin" }]),
        );

        // ACT
        let err = import_folder(&store, &data, NullIdPolicy::Collapse).unwrap_err();

        // ASSERT: the failing file left nothing behind
        assert!(err.is_unique_violation());
        assert!(matches!(&err, ImportError::FatalStore { file: Some(path), .. } if path.ends_with("a.json")));
        assert_eq!(count(&store), 2);
    }

    #[test]
    fn test_earlier_files_stay_committed_after_a_failure() {
        let (_dir, data, store) = setup();
        write_source(&data, "a.json", json!([{ "id": 1, "name": "Avastin" }]));
        import_folder(&store, &data, NullIdPolicy::Collapse).unwrap();

        std::fs::remove_file(data.join("a.json")).unwrap();
        write_source(&data, "b.json", json!([{ "id": 2, "name": "Avamys" }]));
        write_source(&data, "c.json", json!([{ "id": 1, "name": "Avastin again" }]));

        let err = import_folder(&store, &data, NullIdPolicy::Collapse).unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(
            stored_names(&store),
            vec![(json!(1), json!("Avastin")), (json!(2), json!("Avamys"))]
        );
    }

    #[test]
    fn test_malformed_file_aborts_before_writing_it() {
        let (_dir, data, store) = setup();
        write_source(&data, "a.json", json!([{ "id": 1, "name": "Avastin" }]));
        std::fs::write(data.join("b.json"), "[{\"id\": 2, \"name\": ").unwrap();

        let err = import_folder(&store, &data, NullIdPolicy::Collapse).unwrap_err();

        assert!(matches!(err, ImportError::Parse { .. }));
        assert_eq!(count(&store), 1);
    }

    #[test]
    fn test_float_and_oversized_ids_import() {
        let (_dir, data, store) = setup();
        write_source(&data, "a.json", json!([{ "id": 12345, "name": "Avastin" }]));
        std::fs::write(
            data.join("b.json"),
            r#"[{"id": 12345.0, "name": "Avastin Copy"},
                {"id": 18446744073709551615, "name": "Avamys"}]"#,
        )
        .unwrap();

        let report = import_folder(&store, &data, NullIdPolicy::Collapse).unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped_duplicates, 1);
        assert_eq!(
            stored_names(&store),
            vec![
                (json!(12345), json!("Avastin")),
                (json!("18446744073709551615"), json!("Avamys")),
            ]
        );
    }

    // ============================================================
    // DISCOVERY TESTS
    // ============================================================

    #[test]
    fn test_discovery_ignores_other_files() {
        let (_dir, data, _store) = setup();
        write_source(&data, "b.json", json!([]));
        write_source(&data, "a.json", json!([]));
        std::fs::write(data.join("notes.txt"), "not a source").unwrap();
        std::fs::create_dir(data.join("nested.json")).unwrap();

        let files = discover_source_files(&data).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_missing_folder_aborts_before_store_creation() {
        let (dir, _data, store) = setup();

        let err = import_folder(&store, &dir.path().join("absent"), NullIdPolicy::Collapse).unwrap_err();

        assert!(matches!(err, ImportError::FatalConfig(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_empty_folder_aborts_before_store_creation() {
        let (_dir, data, store) = setup();
        std::fs::write(data.join("readme.md"), "no data here").unwrap();

        let err = import_folder(&store, &data, NullIdPolicy::Collapse).unwrap_err();

        assert!(matches!(err, ImportError::FatalConfig(_)));
        assert!(!store.path().exists());
    }
}

//! Bulk Loader
//!
//! Streams source files into the record store on a dedicated writer connection.
//!
//! ## Algorithm
//! 1. Source files are discovered and ordered by name before any store access.
//! 2. Each file is read and parsed completely.
//! 3. The file's records are inserted in one transaction through a single
//!    prepared statement. Records whose identifier was already seen earlier in
//!    this run (in this file or a previous one) are skipped.
//! 4. The transaction commits; on a store error it rolls back and the run stops.
//!    Files committed before the failure stay committed.

use super::types::{FileReport, ImportReport, NullIdPolicy, SourceRecord};
use crate::error::ImportError;
use crate::store::database::Store;
use crate::store::schema::{INSERT_MEDICINE, insert_row};
use crate::store::types::RecordId;

use rusqlite::Connection;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Identifiers admitted so far in one load run. Never shared between runs.
#[derive(Debug)]
pub struct SeenSet {
    ids: HashSet<RecordId>,
    null_seen: bool,
    null_ids: NullIdPolicy,
}

impl SeenSet {
    pub fn new(null_ids: NullIdPolicy) -> Self {
        Self {
            ids: HashSet::new(),
            null_seen: false,
            null_ids,
        }
    }

    /// Records `id` and returns true the first time it is offered.
    pub fn admit(&mut self, id: Option<&RecordId>) -> bool {
        match id {
            Some(id) => self.ids.insert(id.clone()),
            None => match self.null_ids {
                NullIdPolicy::AlwaysUnique => true,
                NullIdPolicy::Collapse => !std::mem::replace(&mut self.null_seen, true),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len() + usize::from(self.null_seen)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct BulkLoader {
    conn: Connection,
    null_ids: NullIdPolicy,
}

impl BulkLoader {
    /// `conn` must be a writer connection with the schema in place.
    pub fn new(conn: Connection, null_ids: NullIdPolicy) -> Self {
        Self { conn, null_ids }
    }

    /// Loads `files` in the given order with a fresh seen-set.
    pub fn load(&mut self, files: &[PathBuf]) -> Result<ImportReport, ImportError> {
        let mut seen = SeenSet::new(self.null_ids);
        let mut report = ImportReport::default();

        for path in files {
            tracing::info!("Importing {} ...", display_name(path));
            let file_report = self.load_file(path, &mut seen)?;
            report.imported += file_report.imported;
            report.skipped_duplicates += file_report.skipped_duplicates;
            report.files.push(file_report);
        }

        Ok(report)
    }

    fn load_file(&mut self, path: &Path, seen: &mut SeenSet) -> Result<FileReport, ImportError> {
        let records = read_source_file(path)?;
        let fatal = |source: rusqlite::Error| ImportError::FatalStore {
            file: Some(path.to_path_buf()),
            source,
        };

        let mut imported = 0;
        let mut skipped_duplicates = 0;

        // Dropping the transaction without commit rolls the whole file back.
        let tx = self.conn.transaction().map_err(fatal)?;
        {
            let mut stmt = tx.prepare(INSERT_MEDICINE).map_err(fatal)?;
            for record in records {
                if !seen.admit(record.id.as_ref()) {
                    if record.id.is_none() {
                        tracing::warn!(
                            "Skipping record without id in {} ({:?}): \
                             an id-less record was already imported",
                            display_name(path),
                            record.name
                        );
                    }
                    skipped_duplicates += 1;
                    continue;
                }
                insert_row(&mut stmt, &record.into_row()).map_err(fatal)?;
                imported += 1;
            }
        }
        tx.commit().map_err(fatal)?;

        tracing::info!(
            "Imported {} record(s) from {} ({} duplicate(s) skipped)",
            imported,
            display_name(path),
            skipped_duplicates
        );
        Ok(FileReport {
            path: path.to_path_buf(),
            imported,
            skipped_duplicates,
        })
    }
}

/// Reads one source file: a JSON array of record objects.
pub fn read_source_file(path: &Path) -> Result<Vec<SourceRecord>, ImportError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `*.json` files directly inside `dir`, sorted by file name.
///
/// # Errors
/// [`ImportError::FatalConfig`] if `dir` is not a directory or holds no JSON files.
pub fn discover_source_files(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    if !dir.is_dir() {
        return Err(ImportError::FatalConfig(format!(
            "folder not found: {}",
            dir.display()
        )));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| ImportError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| ImportError::Read {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(ImportError::FatalConfig(format!(
            "no JSON files found in {}",
            dir.display()
        )));
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Imports every source file of `dir` into `store`.
///
/// Files are discovered first, so a missing or empty folder fails before the
/// store is created or touched.
pub fn import_folder(
    store: &Store,
    dir: &Path,
    null_ids: NullIdPolicy,
) -> Result<ImportReport, ImportError> {
    let files = discover_source_files(dir)?;
    tracing::info!("Found {} JSON files to import.", files.len());

    let conn = store
        .open_writer()
        .map_err(|source| ImportError::FatalStore { file: None, source })?;
    let mut loader = BulkLoader::new(conn, null_ids);
    loader.load(&files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

//! Ingestion Module
//!
//! Offline bulk import of catalog records from a folder of JSON files.
//!
//! ## Workflow
//! 1. **Discover**: Collects the folder's `*.json` files in name order; a missing or empty
//!    folder aborts before the store is touched.
//! 2. **Parse**: Reads each file as an array of record objects, mapping missing fields to NULL.
//! 3. **Deduplicate**: Drops every record whose identifier was already seen in this run.
//! 4. **Insert**: Writes each file in one transaction on a dedicated writer connection.

pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

//! Record Store Module
//!
//! The persistent catalog the search strategies run against, backed by an
//! embedded SQLite database.
//!
//! ## Primitives provided to the search layer
//! - **Prefix match**: `fold(name) LIKE ...` with an expression index on `fold(name)`,
//!   where `fold` is a Unicode lowercase registered per connection.
//! - **Similarity**: the `similarity(a, b)` trigram function registered per connection.
//! - **Full-text**: an FTS5 table over `name` with English (Porter) stemming and BM25 ranking.
//! - **Bulk insert**: a prepared insert statement executed inside one transaction per file.
//!
//! ## Submodules
//! - **`database`**: Opening reader/writer connections.
//! - **`schema`**: DDL and the insertion statement.
//! - **`trigram`**: The similarity primitive and `fold`.
//! - **`rows`**: Row → JSON mapping shared by every query.
//! - **`browse`**: Allow-listed entity inspection.
//! - **`handlers`**: HTTP handlers for the browsing endpoints.
//! - **`types`**: Identifiers, rows and the insertion record.

pub mod browse;
pub mod database;
pub mod handlers;
pub mod rows;
pub mod schema;
pub mod trigram;
pub mod types;

#[cfg(test)]
mod tests;

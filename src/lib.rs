//! Medicine Catalog Search Library
//!
//! This library crate defines the modules behind the `medicine-search` binary
//! and is reused by the `medicine-bench` harness.
//!
//! ## Architecture Modules
//! - **`store`**: The SQLite record store: schema, connections, the trigram
//!   `similarity` primitive, row shaping and allow-listed browsing.
//! - **`pool`**: A bounded pool of store connections handing out exclusive leases.
//! - **`search`**: The search dispatcher. Validates `{strategy, query, limit}`, plans one
//!   parameterized statement per request and runs it on a leased connection.
//! - **`ingestion`**: The offline bulk loader with run-scoped identifier deduplication.
//! - **`server`**: The axum HTTP surface.
//! - **`config`**: TOML configuration with defaults for every section.
//! - **`error`**: Error types shared by all of the above.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod pool;
pub mod search;
pub mod server;
pub mod store;

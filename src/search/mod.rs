//! Search Dispatcher Module
//!
//! The core of the service: turns `{strategy, query, limit}` into one
//! parameterized store statement and returns a bounded, deterministically
//! ordered result set.
//!
//! ## Responsibilities
//! - **Validation**: non-empty query text, positive limit, known strategy.
//! - **Planning**: per-strategy SQL with the limit pushed into the statement.
//! - **Execution**: lease a pooled connection, run the statement off the async
//!   runtime, interrupt it when the caller goes away.
//! - **API**: the `GET /search/{strategy}` handler.
//!
//! ## Submodules
//! - **`engine`**: The dispatcher and its cancellation handling.
//! - **`queries`**: Strategy → SQL plans.
//! - **`handlers`**: HTTP request handlers for the Axum web server.
//! - **`tokenizer`**: Full-text term extraction and search-text normalization.
//! - **`types`**: Strategies, validated requests and query parameters.

pub mod engine;
pub mod handlers;
pub mod queries;
pub mod tokenizer;
pub mod types;

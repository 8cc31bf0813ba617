//! Connection Pool Module
//!
//! A bounded set of reusable store connections shared by all in-flight search
//! requests. The pool is an explicitly constructed value handed to the search
//! dispatcher at startup and shut down when the server stops.
//!
//! ## Submodules
//! - **`pool`**: The pool itself and the RAII [`pool::Lease`] handed to each request.
//! - **`types`**: Sizing configuration, acquire-wait policy and status snapshots.

pub mod pool;
pub mod types;

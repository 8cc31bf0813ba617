//! Error Types
//!
//! Every fallible public operation of the library returns one of the enums below.
//! Binaries wrap them in `anyhow` at the top level; the HTTP layer turns
//! [`SearchError`] into a status code through [`axum::response::IntoResponse`].

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures of the connection pool itself.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("connection pool exhausted: no connection became available within {0:?}")]
    Exhausted(Duration),

    #[error("connection pool is shut down")]
    Closed,

    #[error("failed to open store connection: {0}")]
    Connect(#[source] rusqlite::Error),

    #[error("invalid pool bounds: {0}")]
    InvalidBounds(String),
}

/// Store-side failures surfaced by the search dispatcher.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("store query failed: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("connection pool is shut down")]
    PoolClosed,

    #[error("failed to open store connection: {0}")]
    Connect(#[source] rusqlite::Error),

    #[error("store query exceeded {0:?}")]
    Timeout(Duration),

    #[error("store worker failed: {0}")]
    Worker(String),
}

/// Errors returned by [`crate::search::engine::SearchDispatcher`].
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown search strategy `{0}`")]
    UnknownStrategy(String),

    #[error("unknown entity `{0}`")]
    UnknownEntity(String),

    #[error("connection pool exhausted after waiting {0:?}")]
    PoolExhausted(Duration),

    #[error("search backend failure")]
    Backend(#[source] BackendError),
}

impl From<PoolError> for SearchError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::Exhausted(waited) => SearchError::PoolExhausted(waited),
            PoolError::Closed => SearchError::Backend(BackendError::PoolClosed),
            PoolError::Connect(source) => SearchError::Backend(BackendError::Connect(source)),
            PoolError::InvalidBounds(msg) => SearchError::Backend(BackendError::Worker(msg)),
        }
    }
}

impl From<BackendError> for SearchError {
    fn from(err: BackendError) -> Self {
        SearchError::Backend(err)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(err: rusqlite::Error) -> Self {
        SearchError::Backend(BackendError::Store(err))
    }
}

impl SearchError {
    /// Stable machine-readable kind used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::InvalidArgument(_) => "invalid_argument",
            SearchError::UnknownStrategy(_) => "unknown_strategy",
            SearchError::UnknownEntity(_) => "unknown_entity",
            SearchError::PoolExhausted(_) => "pool_exhausted",
            SearchError::Backend(_) => "backend_failure",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            SearchError::UnknownStrategy(_) | SearchError::UnknownEntity(_) => {
                StatusCode::NOT_FOUND
            }
            SearchError::PoolExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            SearchError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body returned for every non-2xx search response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for SearchError {
    fn into_response(self) -> Response {
        let detail = match &self {
            SearchError::Backend(source) => {
                // Store errors stay in the logs, clients only see a generic message.
                tracing::error!("Search backend failure: {}", source);
                "the search backend could not complete the request".to_string()
            }
            SearchError::PoolExhausted(waited) => {
                tracing::warn!("Rejecting request, pool exhausted after {:?}", waited);
                "the service is saturated, retry later".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: self.kind().to_string(),
            detail,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// Errors of a bulk import run. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Missing or empty source folder. Raised before any store mutation.
    #[error("import configuration error: {0}")]
    FatalConfig(String),

    /// The store rejected a write or could not be reached. Files committed
    /// before the failure stay committed.
    #[error("store failure while importing {}: {source}", display_file(.file))]
    FatalStore {
        file: Option<PathBuf>,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn display_file(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => path.display().to_string(),
        None => "<schema>".to_string(),
    }
}

impl ImportError {
    /// True when the store refused a row because its identifier already exists.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            ImportError::FatalStore {
                source: rusqlite::Error::SqliteFailure(err, _),
                ..
            } => err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
            _ => false,
        }
    }
}

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

//! Search Dispatcher
//!
//! Owns the connection pool and runs every store round-trip of the live query
//! path. A request is validated and planned synchronously; only lease
//! acquisition and the statement itself suspend.
//!
//! ## Cancellation
//! The statement runs on a blocking worker that holds the lease. If the awaiting
//! future is dropped (client gone) or the configured `query_timeout` elapses, the
//! running statement is interrupted through the connection's interrupt handle and
//! the worker drops the lease, which returns the connection to the pool. An
//! interrupt is only delivered while the worker is still inside the statement,
//! so a connection that already went back to the pool is never hit.

use super::queries::QueryPlan;
use super::types::{SearchRequest, Strategy};
use crate::config::SearchConfig;
use crate::error::{BackendError, SearchError};
use crate::pool::pool::ConnectionPool;
use crate::store::types::ResultSet;

use parking_lot::Mutex;
use rusqlite::{Connection, InterruptHandle};
use std::sync::Arc;

pub struct SearchDispatcher {
    pool: ConnectionPool,
    config: SearchConfig,
}

impl SearchDispatcher {
    pub fn new(pool: ConnectionPool, config: SearchConfig) -> Self {
        Self { pool, config }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub fn default_limit(&self) -> i64 {
        self.config.default_limit
    }

    /// Runs `query` with the given strategy and returns at most `limit` rows in
    /// the strategy's deterministic order.
    ///
    /// # Errors
    /// * [`SearchError::InvalidArgument`] for empty text or a non-positive limit.
    /// * [`SearchError::PoolExhausted`] if no connection frees up in time.
    /// * [`SearchError::Backend`] for any store-side failure.
    pub async fn search(
        &self,
        strategy: Strategy,
        query: &str,
        limit: i64,
    ) -> Result<ResultSet, SearchError> {
        let request = SearchRequest::new(strategy, query, limit)?;
        self.execute(&request).await
    }

    pub async fn execute(&self, request: &SearchRequest) -> Result<ResultSet, SearchError> {
        let Some(plan) = QueryPlan::build(request, self.config.fuzzy_threshold) else {
            tracing::debug!("No searchable terms in {:?}, skipping store", request.text);
            return Ok(Vec::new());
        };

        let rows = self.with_connection(move |conn| plan.execute(conn)).await?;
        tracing::debug!(
            "{} search for {:?} returned {} row(s)",
            request.strategy,
            request.text,
            rows.len()
        );
        Ok(rows)
    }

    /// Leases a connection and runs `work` on it on a blocking worker.
    pub async fn with_connection<F, T>(&self, work: F) -> Result<T, SearchError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let lease = self.pool.acquire().await?;
        let statement = Arc::new(StatementState::new(lease.interrupt_handle()));
        let mut guard = InterruptOnDrop {
            statement: statement.clone(),
            armed: true,
        };

        let task = tokio::task::spawn_blocking(move || {
            if !statement.start() {
                return Err(BackendError::Worker("request cancelled before start".to_string()));
            }
            let result = work(&lease);
            statement.finish();
            drop(lease);
            result.map_err(BackendError::Store)
        });

        let joined = match self.config.query_timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!("Store statement exceeded {:?}, interrupting", limit);
                    return Err(BackendError::Timeout(limit).into());
                }
            },
            None => task.await,
        };
        guard.armed = false;

        match joined {
            Ok(result) => result.map_err(SearchError::from),
            Err(err) => Err(BackendError::Worker(err.to_string()).into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Running,
    Finished,
    Cancelled,
}

/// Shared between the awaiting future and the blocking worker.
struct StatementState {
    phase: Mutex<Phase>,
    interrupt: InterruptHandle,
}

impl StatementState {
    fn new(interrupt: InterruptHandle) -> Self {
        Self {
            phase: Mutex::new(Phase::Pending),
            interrupt,
        }
    }

    /// False if the request was cancelled before the worker got to run.
    fn start(&self) -> bool {
        let mut phase = self.phase.lock();
        if *phase == Phase::Cancelled {
            return false;
        }
        *phase = Phase::Running;
        true
    }

    fn finish(&self) {
        *self.phase.lock() = Phase::Finished;
    }

    fn cancel(&self) {
        let mut phase = self.phase.lock();
        match *phase {
            Phase::Pending => *phase = Phase::Cancelled,
            // Holding the lock keeps the worker from handing the connection back meanwhile.
            Phase::Running => {
                self.interrupt.interrupt();
                *phase = Phase::Cancelled;
            }
            Phase::Finished | Phase::Cancelled => {}
        }
    }
}

/// Cancels the statement unless disarmed after the worker's result arrived.
struct InterruptOnDrop {
    statement: Arc<StatementState>,
    armed: bool,
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("Search request abandoned, cancelling its statement");
            self.statement.cancel();
        }
    }
}

//! Bounded Connection Pool
//!
//! Hands out exclusive [`Lease`]s over store connections.
//!
//! ## Guarantees
//! - **Exclusivity**: a connection lives either in the idle set or inside exactly one lease.
//! - **Bounded**: a semaphore with `max_size` permits caps the number of live leases.
//! - **Release on every path**: the connection is returned from `Drop`, so an error,
//!   a panic or a cancelled future gives the slot back just like a normal return.
//!   The connection is pushed back *before* the permit is freed, so the next
//!   waiter always finds it in the idle set.

use super::types::{AcquireWait, PoolConfig, PoolStatus};
use crate::error::PoolError;

use parking_lot::Mutex;
use rusqlite::{Connection, InterruptHandle};
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Opens one new store connection. Called eagerly for `min_size` connections
/// and lazily whenever a lease is requested while the idle set is empty.
pub type ConnectFn = Arc<dyn Fn() -> rusqlite::Result<Connection> + Send + Sync>;

/// Shared handle to the pool. Cloning is cheap and every clone sees the same slots.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    connect: ConnectFn,
    config: PoolConfig,
    /// Connections currently open, idle or leased.
    open: AtomicUsize,
    closed: AtomicBool,
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.inner.config)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl ConnectionPool {
    /// Builds the pool and opens `min_size` connections up front.
    ///
    /// # Errors
    /// * [`PoolError::InvalidBounds`] if `min_size > max_size` or `max_size == 0`.
    /// * [`PoolError::Connect`] if one of the eager connections cannot be opened.
    pub fn new(connect: ConnectFn, config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let mut idle = Vec::with_capacity(config.max_size);
        for _ in 0..config.min_size {
            idle.push(connect().map_err(PoolError::Connect)?);
        }

        tracing::info!(
            "Connection pool ready: {} idle connection(s), max {}",
            idle.len(),
            config.max_size
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                open: AtomicUsize::new(idle.len()),
                idle: Mutex::new(idle),
                permits: Arc::new(Semaphore::new(config.max_size)),
                connect,
                config,
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Borrows one connection, waiting according to the configured [`AcquireWait`].
    pub async fn acquire(&self) -> Result<Lease, PoolError> {
        let permits = self.inner.permits.clone();
        let permit = match self.inner.config.acquire_wait {
            AcquireWait::Bounded(limit) => {
                tokio::time::timeout(limit, permits.acquire_owned())
                    .await
                    .map_err(|_| PoolError::Exhausted(limit))?
            }
            AcquireWait::Indefinite => permits.acquire_owned().await,
        }
        // The semaphore only errors once it has been closed by `shutdown`.
        .map_err(|_| PoolError::Closed)?;

        if self.inner.closed.load(Ordering::Acquire) {
            return Err(PoolError::Closed);
        }

        let reused = self.inner.idle.lock().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => {
                let conn = (self.inner.connect)().map_err(PoolError::Connect)?;
                self.inner.open.fetch_add(1, Ordering::AcqRel);
                tracing::debug!("Opened new pooled connection");
                conn
            }
        };

        Ok(Lease {
            conn: Some(conn),
            pool: self.inner.clone(),
            _permit: permit,
        })
    }

    /// Returns a lease to the pool. Equivalent to dropping it.
    pub fn release(&self, lease: Lease) {
        lease.release();
    }

    pub fn status(&self) -> PoolStatus {
        let idle = self.inner.idle.lock().len();
        let open = self.inner.open.load(Ordering::Acquire);
        PoolStatus {
            open,
            idle,
            in_use: open.saturating_sub(idle),
            max_size: self.inner.config.max_size,
            closed: self.inner.closed.load(Ordering::Acquire),
        }
    }

    /// Closes the pool: pending and future `acquire` calls fail with
    /// [`PoolError::Closed`] and every idle connection is closed. Leases still
    /// out close their connection when they are released.
    pub fn shutdown(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.permits.close();

        let drained = std::mem::take(&mut *self.inner.idle.lock());
        self.inner.open.fetch_sub(drained.len(), Ordering::AcqRel);
        tracing::info!(
            "Connection pool shut down, closed {} idle connection(s)",
            drained.len()
        );
        drop(drained);
    }
}

impl PoolInner {
    fn put_back(&self, conn: Connection) {
        // `shutdown` flips `closed` before draining under this lock.
        let mut idle = self.idle.lock();
        if self.closed.load(Ordering::Acquire) {
            drop(idle);
            self.open.fetch_sub(1, Ordering::AcqRel);
            drop(conn);
            return;
        }
        idle.push(conn);
    }
}

/// Exclusive borrow of one pooled connection.
///
/// Dereferences to [`rusqlite::Connection`]. The connection goes back to the idle
/// set when the lease is released or dropped.
pub struct Lease {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    // Dropped after `Drop::drop` has returned the connection.
    _permit: OwnedSemaphorePermit,
}

impl std::fmt::Debug for Lease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lease")
            .field("connected", &self.conn.is_some())
            .finish_non_exhaustive()
    }
}

impl Lease {
    /// Explicitly hands the connection back to the pool.
    pub fn release(self) {
        drop(self);
    }

    /// Closes the connection instead of returning it, e.g. after it was left in
    /// an unknown state. The slot itself is freed.
    pub fn discard(mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.open.fetch_sub(1, Ordering::AcqRel);
            drop(conn);
            tracing::debug!("Discarded pooled connection");
        }
    }

    /// Handle that aborts whatever statement is running on this connection.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.get_interrupt_handle()
    }
}

impl Deref for Lease {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("lease holds its connection until dropped")
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put_back(conn);
        }
    }
}

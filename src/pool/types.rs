use crate::error::PoolError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long `acquire` may wait for a free slot.
///
/// There is no implicit "wait forever": `Indefinite` has to be
/// written down in the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireWait {
    /// Fail with [`PoolError::Exhausted`] once the duration has elapsed.
    Bounded(#[serde(with = "humantime_serde")] Duration),
    /// Queue until a lease is released or the pool shuts down.
    Indefinite,
}

impl Default for AcquireWait {
    fn default() -> Self {
        AcquireWait::Bounded(Duration::from_secs(5))
    }
}

/// Sizing of the connection pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Connections opened eagerly when the pool is built.
    pub min_size: usize,
    /// Hard cap on simultaneously leased connections.
    pub max_size: usize,
    pub acquire_wait: AcquireWait,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 16,
            acquire_wait: AcquireWait::default(),
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::InvalidBounds(
                "pool.max_size must be at least 1".to_string(),
            ));
        }
        if self.min_size > self.max_size {
            return Err(PoolError::InvalidBounds(format!(
                "pool.min_size ({}) exceeds pool.max_size ({})",
                self.min_size, self.max_size
            )));
        }
        Ok(())
    }
}

/// Point-in-time view of the pool, reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Connections currently open (idle + leased).
    pub open: usize,
    pub idle: usize,
    pub in_use: usize,
    pub max_size: usize,
    pub closed: bool,
}

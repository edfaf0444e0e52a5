use crate::logic::pools::PoolWrapper;
use tracing::{debug, warn};

/// Receives every simulator created during a graph build. Implementations
/// must not block and must never fail the build.
pub trait PoolLogSink: Send + Sync {
    fn log_pool_creation(&self, pool: &PoolWrapper, block_number: u64);
}

/// Emits the serialized pool state as one `debug` event per simulator.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPoolLogger;

impl PoolLogSink for TracingPoolLogger {
    fn log_pool_creation(&self, pool: &PoolWrapper, block_number: u64) {
        match serde_json::to_string(pool) {
            Ok(state) => debug!(target: "pool_log", pool = %pool.get_address(), block_number, state = %state, "Pool created"),
            Err(e) => warn!(target: "pool_log", pool = %pool.get_address(), error = %e, "Cannot serialize pool state"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPoolLogger;

impl PoolLogSink for NoopPoolLogger {
    fn log_pool_creation(&self, _pool: &PoolWrapper, _block_number: u64) {}
}

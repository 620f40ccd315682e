//! Worker pool selection for the parallel algorithms.

use rayon::ThreadPoolBuilder;

use crate::{GraphError, Result};

/// Run `op` on the global rayon pool, or on a dedicated pool of
/// `num_threads` workers when one is requested.
pub(crate) fn install<OP, R>(num_threads: Option<usize>, op: OP) -> Result<R>
where
    OP: FnOnce() -> Result<R> + Send,
    R: Send,
{
    match num_threads {
        None => op(),
        Some(n) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(n.max(1))
                .thread_name(|i| format!("pramgraph-worker-{}", i))
                .build()
                .map_err(|e| GraphError::ThreadPool(e.to_string()))?;
            pool.install(op)
        }
    }
}

//! Migration orchestration - the driver and the per-cohort scheduler
//!
//! The driver owns the run: truncate the log once, warn about unmovable
//! objects, fetch the inventory, then walk the fixed cohort ladder strictly
//! in sequence. The scheduler handles one cohort: compute the effective
//! concurrency budget, invoke the mover, and tee its output into the
//! append-only log and the progress tracker.

mod driver;
mod scheduler;

pub use driver::{RebalanceResult, Rebalancer};
pub use scheduler::{batch_size, effective_processes, run_cohort};

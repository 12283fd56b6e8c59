//! resc-rebalance - Adaptive parallel replica migration
//!
//! Rebalances physical file placement across storage resources in a
//! distributed storage federation: every data object with a replica on the
//! source resource and none on the destination is physically moved, in size
//! cohorts with graduated concurrency.
//!
//! # Features
//!
//! - **Size-graduated parallelism**: the mover's per-transfer thread count
//!   grows with file size (one thread per 32 MiB), so the driver runs many
//!   concurrent movers for small files and few for large ones, keeping the
//!   network and storage from being oversubscribed.
//!
//! - **Live progress**: a single overwrite-in-place counter line per cohort,
//!   plus run-wide totals threaded through the whole sequence.
//!
//! - **Append-only audit log**: every mover output line is preserved; the
//!   log is truncated exactly once, at run start, so a crash mid-run keeps
//!   partial history.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Driver                               │
//! │   inventory fetch → size partition → cohorts 1..8 in order   │
//! └───────┬──────────────────────────────────────┬───────────────┘
//!         │                                      │ per cohort
//!         ▼                                      ▼
//! ┌───────────────────┐              ┌──────────────────────────┐
//! │  InventorySource  │              │        Scheduler         │
//! │  (site query      │              │  procs × multiplier,     │
//! │   helper)         │              │  batch = 2·procs²        │
//! └───────────────────┘              └───────────┬──────────────┘
//!                                                │
//!                                                ▼
//!                                    ┌──────────────────────────┐
//!                                    │       MoveExecutor       │
//!                                    │ xargs -0 -n .. -P ..     │
//!                                    │   <mover> -S -R -N       │
//!                                    └───────────┬──────────────┘
//!                                                │ record stream
//!                                                ▼
//!                                    ┌──────────────────────────┐
//!                                    │    CohortTracker (one    │
//!                                    │  consumer) + append log  │
//!                                    └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Drain demoResc into archiveResc
//! resc-rebalance demoResc archiveResc /var/log/rebalance.log
//!
//! # Only one user's collection, doubled process budgets
//! resc-rebalance demoResc archiveResc move.log -c /tempZone/home/alice -m 2
//! ```

pub mod cohort;
pub mod config;
pub mod error;
pub mod executor;
pub mod inventory;
pub mod progress;
pub mod rebalance;

pub use config::{CliArgs, RebalanceConfig};
pub use error::{RebalanceError, Result};
pub use rebalance::{RebalanceResult, Rebalancer};

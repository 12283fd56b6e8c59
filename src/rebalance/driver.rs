//! Migration driver - orchestrates the whole run
//!
//! The driver is responsible for:
//! - The run's single log truncation
//! - The unmovable-replica warning check
//! - Fetching the inventory
//! - Running the cohort ladder strictly in sequence
//! - Threading the accumulated run totals through each cohort
//! - Graceful stop between cohorts on SIGINT

use crate::cohort::{ladder, partition};
use crate::config::RebalanceConfig;
use crate::error::{RebalanceError, Result};
use crate::executor::MoveExecutor;
use crate::inventory::InventorySource;
use crate::progress::{print_cohort, print_header, RunState};
use crate::rebalance::scheduler::{self, effective_processes};
use chrono::{DateTime, Utc};
use console::style;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result of a completed (or interrupted) migration run
#[derive(Debug)]
pub struct RebalanceResult {
    /// Final run totals
    pub run: RunState,

    /// Objects already replicated on both resources (excluded from the run)
    pub unmovable: u64,

    /// Wall-clock time for the run
    pub duration: Duration,

    /// Whether all cohorts ran (vs interrupted between cohorts)
    pub completed: bool,
}

/// Orchestrates the migration
pub struct Rebalancer {
    /// Validated run configuration
    config: RebalanceConfig,

    /// Inventory seam
    inventory: Box<dyn InventorySource>,

    /// Mover seam
    executor: Box<dyn MoveExecutor>,

    /// Stop signal, checked between cohorts
    shutdown: Arc<AtomicBool>,
}

impl Rebalancer {
    /// Create a new driver over the two external seams
    pub fn new(
        config: RebalanceConfig,
        inventory: Box<dyn InventorySource>,
        executor: Box<dyn MoveExecutor>,
    ) -> Self {
        Self {
            config,
            inventory,
            executor,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the migration
    pub fn run(self) -> Result<RebalanceResult> {
        let start = Instant::now();
        let started_at: DateTime<Utc> = Utc::now();

        info!(
            src = %self.config.src_resc,
            dest = %self.config.dest_resc,
            started_at = %started_at.to_rfc3339(),
            "Starting migration run"
        );

        // The run's one and only truncation; everything after appends
        File::create(&self.config.log_path)?;
        let mut log = OpenOptions::new()
            .append(true)
            .open(&self.config.log_path)?;

        // Never move a file whose destination already holds a copy
        let unmovable = self.inventory.replicated_count(
            &self.config.src_resc,
            &self.config.dest_resc,
            self.config.collection.as_deref(),
        )?;
        if unmovable > 0 {
            warn!(
                count = unmovable,
                dest = %self.config.dest_resc,
                "Objects already replicated on destination are excluded"
            );
            eprintln!(
                "{} {} data objects already have a replica on '{}' and will not be moved",
                style("warning:").yellow().bold(),
                unmovable,
                self.config.dest_resc
            );
        }

        let items = self.inventory.pending(
            &self.config.src_resc,
            &self.config.dest_resc,
            self.config.collection.as_deref(),
        )?;

        println!("{} data objects to physically move", items.len());

        if items.is_empty() {
            return Ok(RebalanceResult {
                run: RunState::new(0),
                unmovable,
                duration: start.elapsed(),
                completed: true,
            });
        }

        let total_bytes: u64 = items.iter().map(|i| i.size).sum();
        if !self.config.quiet {
            print_header(
                &self.config.src_resc,
                &self.config.dest_resc,
                &self.config.log_path.display().to_string(),
                total_bytes,
            );
        }

        let mut run = RunState::new(items.len() as u64);
        let mut completed = true;

        for spec in ladder() {
            if self.shutdown.load(Ordering::Relaxed) {
                info!(cohort = spec.index, "Stop requested, skipping remaining cohorts");
                completed = false;
                break;
            }

            let cohort_items = partition(&items, &spec.range);
            if cohort_items.is_empty() {
                debug!(cohort = spec.index, "No items in size range");
                continue;
            }

            if !self.config.quiet {
                print_cohort(
                    &spec,
                    cohort_items.len(),
                    effective_processes(&spec.budget, self.config.multiplier),
                );
            }

            match scheduler::run_cohort(
                self.executor.as_ref(),
                &self.config,
                &spec,
                &cohort_items,
                &mut log,
                run,
            ) {
                Ok(next) => run = next,
                // A broken log file is fatal: the run would lose its history
                Err(RebalanceError::Io(e)) => return Err(e.into()),
                // Anything else stays cohort-local; later cohorts still run
                Err(e) => {
                    warn!(cohort = spec.index, error = %e, "Cohort invocation failed");
                    writeln!(log, "ERROR: cohort {}: {}", spec.index, e)?;
                }
            }
        }

        let duration = start.elapsed();
        info!(
            moved = run.moved,
            failed = run.failed,
            total = run.total_items,
            duration_secs = duration.as_secs(),
            "Migration run finished"
        );

        Ok(RebalanceResult {
            run,
            unmovable,
            duration,
            completed,
        })
    }
}

//! Per-cohort scheduling
//!
//! Turns a cohort's concurrency budget into one mover invocation and drains
//! the resulting record stream through the single-consumer tracker, teeing
//! every raw line into the shared log file. The log is only ever appended
//! to here; the driver performs the run's single truncation up front.

use crate::cohort::{CohortSpec, ConcurrencyBudget};
use crate::config::RebalanceConfig;
use crate::error::Result;
use crate::executor::{MoveExecutor, MoveRequest};
use crate::inventory::WorkItem;
use crate::progress::{CohortTracker, RunState};
use std::io::Write;
use tracing::{debug, info};

/// Effective concurrent transfer processes for a budget
pub fn effective_processes(budget: &ConcurrencyBudget, multiplier: u32) -> u32 {
    budget.max_processes * multiplier
}

/// Paths handed to each process instance at a time
///
/// `2 * max_processes^2`: tiers with higher per-transfer thread counts run
/// fewer concurrent processes, and the quadratic factor keeps each of those
/// processes supplied with enough work to avoid idling between batches.
pub fn batch_size(budget: &ConcurrencyBudget) -> u32 {
    2 * budget.max_processes * budget.max_processes
}

/// Run one cohort through the mover and return the updated run totals
///
/// An empty cohort performs no invocation and forwards the totals
/// unchanged.
pub fn run_cohort<W: Write>(
    executor: &dyn MoveExecutor,
    config: &RebalanceConfig,
    spec: &CohortSpec,
    items: &[WorkItem],
    log: &mut W,
    run: RunState,
) -> Result<RunState> {
    if items.is_empty() {
        debug!(cohort = spec.index, "Cohort empty, skipping invocation");
        return Ok(run);
    }

    let request = MoveRequest {
        src_resc: config.src_resc.clone(),
        dest_resc: config.dest_resc.clone(),
        min_threads: spec.budget.min_threads,
        max_processes: effective_processes(&spec.budget, config.multiplier),
        batch_size: batch_size(&spec.budget),
    };

    info!(
        cohort = spec.index,
        items = items.len(),
        processes = request.max_processes,
        batch = request.batch_size,
        min_threads = request.min_threads,
        "Scheduling cohort"
    );

    let paths: Vec<String> = items.iter().map(|i| i.path.clone()).collect();
    let stream = executor.run(&request, &paths)?;

    let mut tracker = CohortTracker::new(items.len() as u64, run, config.quiet);
    for record in stream {
        writeln!(log, "{}", record.raw)?;
        tracker.record(&record);
    }
    log.flush()?;

    Ok(tracker.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::ladder;
    use crate::error::ExecutorResult;
    use crate::executor::{CompletionRecord, RecordStream};

    struct EchoExecutor;

    impl MoveExecutor for EchoExecutor {
        fn run(&self, _request: &MoveRequest, paths: &[String]) -> ExecutorResult<RecordStream> {
            let records: Vec<CompletionRecord> = paths
                .iter()
                .filter_map(|p| CompletionRecord::parse(p))
                .collect();
            Ok(Box::new(records.into_iter()))
        }
    }

    fn test_config() -> RebalanceConfig {
        RebalanceConfig {
            src_resc: "r1".into(),
            dest_resc: "r2".into(),
            log_path: "/tmp/unused.log".into(),
            collection: None,
            multiplier: 1,
            quiet: true,
            verbose: false,
            mover: "iphymv".into(),
            inventory_cmd: "igrid-inventory".into(),
        }
    }

    #[test]
    fn test_effective_processes_applies_multiplier() {
        let budget = ConcurrencyBudget {
            max_processes: 6,
            min_threads: 2,
            max_threads: Some(3),
        };
        assert_eq!(effective_processes(&budget, 1), 6);
        assert_eq!(effective_processes(&budget, 3), 18);
    }

    #[test]
    fn test_batch_size_is_quadratic() {
        for spec in ladder() {
            let p = spec.budget.max_processes;
            assert_eq!(batch_size(&spec.budget), 2 * p * p);
        }
        // The single-process tier still batches two paths at a time
        let last = ladder().pop().unwrap();
        assert_eq!(batch_size(&last.budget), 2);
    }

    #[test]
    fn test_empty_cohort_skips_invocation() {
        let config = test_config();
        let spec = ladder().remove(0);
        let mut log = Vec::new();
        let run = RunState::new(10);

        let out = run_cohort(&EchoExecutor, &config, &spec, &[], &mut log, run).unwrap();
        assert_eq!(out, run);
        assert!(log.is_empty());
    }

    #[test]
    fn test_cohort_tees_log_and_counts() {
        let config = test_config();
        let spec = ladder().remove(0);
        let items = vec![
            WorkItem::new(0, "/zone/a"),
            WorkItem::new(0, "/zone/b"),
        ];
        let mut log = Vec::new();
        let run = RunState::new(2);

        let out = run_cohort(&EchoExecutor, &config, &spec, &items, &mut log, run).unwrap();
        assert_eq!(out.moved, 2);
        assert_eq!(out.failed, 0);

        let logged = String::from_utf8(log).unwrap();
        assert_eq!(logged, "/zone/a\n/zone/b\n");
    }
}

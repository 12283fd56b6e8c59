//! resc-rebalance - Adaptive Parallel Replica Migration
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use resc_rebalance::config::{CliArgs, RebalanceConfig};
use resc_rebalance::executor::CommandExecutor;
use resc_rebalance::inventory::CommandInventory;
use resc_rebalance::progress::print_summary;
use resc_rebalance::rebalance::{RebalanceResult, Rebalancer};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Argument and option errors exit 1, before any side effects;
    // --help and --version exit 0
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let failed = e.use_stderr();
            let _ = e.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(args) {
        Ok(result) => {
            if !result.completed || result.run.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<RebalanceResult> {
    setup_logging(args.verbose)?;

    let config = RebalanceConfig::from_args(args).context("Invalid configuration")?;

    let inventory = Box::new(CommandInventory::new(&config.inventory_cmd));
    let executor = Box::new(CommandExecutor::new(&config.mover));
    let rebalancer = Rebalancer::new(config.clone(), inventory, executor);

    // Setup signal handler for graceful shutdown between cohorts
    let shutdown_flag = rebalancer.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping after the current cohort...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let result = rebalancer.run().context("Migration failed")?;

    if config.quiet {
        println!("{} data objects processed", result.run.completed());
    } else {
        print_summary(&result.run, result.duration, result.completed);
    }

    if !result.completed {
        info!("Migration was interrupted before all cohorts ran");
    }

    if result.run.failed > 0 {
        info!(
            failed = result.run.failed,
            "Migration completed with transfer failures"
        );
    }

    Ok(result)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("resc_rebalance=debug,warn")
    } else {
        EnvFilter::new("resc_rebalance=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

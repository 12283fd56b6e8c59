//! Configuration types for resc-rebalance
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// Maximum reasonable process multiplier
const MAX_MULTIPLIER: u32 = 16;

/// Processes in the widest cohort tier, before the multiplier
const WIDEST_TIER_PROCESSES: u32 = 16;

/// Move replicas between storage resources with size-graduated parallelism
#[derive(Parser, Debug, Clone)]
#[command(
    name = "resc-rebalance",
    version,
    about = "Move replicas between storage resources with size-graduated parallelism",
    long_about = "Physically moves every data object that has a replica on SRC_RESC and none\n\
                  on DEST_RESC. The work list is split into size cohorts, each driven with\n\
                  its own process budget: many movers in parallel for small files, few (but\n\
                  heavily threaded) movers for large ones.\n\n\
                  Objects already replicated on both resources are never touched.",
    after_help = "EXAMPLES:\n    \
        resc-rebalance demoResc archiveResc /var/log/rebalance.log\n    \
        resc-rebalance demoResc archiveResc move.log -c /tempZone/home/alice\n    \
        resc-rebalance demoResc archiveResc move.log -m 2 -q"
)]
pub struct CliArgs {
    /// Resource to move replicas from
    #[arg(value_name = "SRC_RESC")]
    pub src_resc: String,

    /// Resource to move replicas to
    #[arg(value_name = "DEST_RESC")]
    pub dest_resc: String,

    /// File receiving every mover output line (truncated at start)
    #[arg(value_name = "LOG_FILE")]
    pub log_file: PathBuf,

    /// Restrict the run to objects under this collection
    #[arg(short = 'c', long, value_name = "PATH")]
    pub collection: Option<String>,

    /// Multiply every cohort's process budget
    #[arg(short = 'm', long, default_value = "1", value_name = "NUM")]
    pub multiplier: u32,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (show debug-level logs)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Transfer program fanned out over the work list
    #[arg(long, default_value = "iphymv", value_name = "PROGRAM")]
    pub mover: String,

    /// Site helper queried for the work list
    #[arg(long = "inventory-cmd", default_value = "igrid-inventory", value_name = "PROGRAM")]
    pub inventory_cmd: String,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct RebalanceConfig {
    /// Source resource name
    pub src_resc: String,

    /// Destination resource name
    pub dest_resc: String,

    /// Mover output log path
    pub log_path: PathBuf,

    /// Optional collection scope
    pub collection: Option<String>,

    /// Run-wide process multiplier
    pub multiplier: u32,

    /// Suppress progress output
    pub quiet: bool,

    /// Verbose logging
    pub verbose: bool,

    /// Transfer program
    pub mover: String,

    /// Inventory helper program
    pub inventory_cmd: String,
}

impl RebalanceConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        validate_resource(&args.src_resc)?;
        validate_resource(&args.dest_resc)?;

        if args.src_resc == args.dest_resc {
            return Err(ConfigError::InvalidResource {
                name: args.dest_resc,
                reason: "source and destination are the same resource".into(),
            });
        }

        if args.multiplier == 0 || args.multiplier > MAX_MULTIPLIER {
            return Err(ConfigError::InvalidMultiplier {
                value: args.multiplier,
                max: MAX_MULTIPLIER,
            });
        }

        // The widest tier runs 16 processes; warn when the multiplier pushes
        // that far beyond the machine
        let widest = WIDEST_TIER_PROCESSES * args.multiplier;
        let cores = num_cpus::get() as u32;
        if widest > cores * 8 {
            warn!(
                processes = widest,
                cores = cores,
                "Multiplier may oversubscribe this machine"
            );
        }

        if let Some(ref coll) = args.collection {
            if !coll.starts_with('/') {
                return Err(ConfigError::InvalidCollection {
                    path: coll.clone(),
                    reason: "collection must be an absolute path".into(),
                });
            }
        }

        if let Some(parent) = args.log_file.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(ConfigError::InvalidLogPath {
                    path: args.log_file.clone(),
                    reason: format!("Parent directory '{}' does not exist", parent.display()),
                });
            }
        }

        Ok(Self {
            src_resc: args.src_resc,
            dest_resc: args.dest_resc,
            log_path: args.log_file,
            collection: args.collection.map(|c| c.trim_end_matches('/').to_string()),
            multiplier: args.multiplier,
            quiet: args.quiet,
            verbose: args.verbose,
            mover: args.mover,
            inventory_cmd: args.inventory_cmd,
        })
    }
}

fn validate_resource(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::InvalidResource {
            name: name.to_string(),
            reason: "resource name is empty".into(),
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidResource {
            name: name.to_string(),
            reason: "resource name contains whitespace".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["resc-rebalance", "demoResc", "archiveResc", "move.log"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_from_args_defaults() {
        let config = RebalanceConfig::from_args(args(&[])).unwrap();
        assert_eq!(config.src_resc, "demoResc");
        assert_eq!(config.dest_resc, "archiveResc");
        assert_eq!(config.multiplier, 1);
        assert_eq!(config.mover, "iphymv");
        assert_eq!(config.inventory_cmd, "igrid-inventory");
        assert!(config.collection.is_none());
        assert!(!config.quiet);
    }

    #[test]
    fn test_multiplier_bounds() {
        let err = RebalanceConfig::from_args(args(&["-m", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMultiplier { .. }));

        let err = RebalanceConfig::from_args(args(&["-m", "17"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMultiplier { .. }));

        let config = RebalanceConfig::from_args(args(&["-m", "16"])).unwrap();
        assert_eq!(config.multiplier, 16);
    }

    #[test]
    fn test_collection_must_be_absolute() {
        let err =
            RebalanceConfig::from_args(args(&["-c", "tempZone/home"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCollection { .. }));
    }

    #[test]
    fn test_collection_trailing_slash_stripped() {
        let config =
            RebalanceConfig::from_args(args(&["-c", "/tempZone/home/"])).unwrap();
        assert_eq!(config.collection.as_deref(), Some("/tempZone/home"));
    }

    #[test]
    fn test_same_resource_rejected() {
        let argv = vec!["resc-rebalance", "demoResc", "demoResc", "move.log"];
        let err = RebalanceConfig::from_args(CliArgs::parse_from(argv)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidResource { .. }));
    }

    #[test]
    fn test_missing_log_parent_rejected() {
        let argv = vec![
            "resc-rebalance",
            "demoResc",
            "archiveResc",
            "/definitely/not/a/dir/move.log",
        ];
        let err = RebalanceConfig::from_args(CliArgs::parse_from(argv)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogPath { .. }));
    }
}

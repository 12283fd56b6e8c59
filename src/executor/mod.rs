//! Move executor - the seam around the external transfer tool
//!
//! The scheduler and tracker depend only on the `MoveExecutor` trait: one
//! invocation per cohort, a stream of per-item completion records back. The
//! command-backed implementation composes the actual mover behind `xargs`;
//! tests substitute canned streams.
//!
//! Record grammar: the mover emits one line per attempted item. A line of
//! the form `ERROR: <path>: <reason>` (or any line containing `ERROR`) is a
//! failure; any other non-empty line is a success whose trimmed text is the
//! object path. The untouched line is kept on the record for the log file.

mod command;

pub use command::CommandExecutor;

use crate::error::ExecutorResult;
use regex::Regex;
use std::sync::LazyLock;

/// Matches `ERROR: <path>[: <reason>]` failure lines
static ERROR_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ERROR:\s*(?P<path>[^:]+?)\s*(?::\s*(?P<reason>.*\S))?\s*$")
        .expect("Invalid error line regex")
});

/// One cohort's invocation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Resource the replicas come from
    pub src_resc: String,

    /// Resource the replicas go to
    pub dest_resc: String,

    /// Minimum-thread hint for each transfer
    pub min_threads: u32,

    /// Concurrent transfer processes (multiplier already applied)
    pub max_processes: u32,

    /// Paths handed to each process instance at a time
    pub batch_size: u32,
}

/// Outcome of one attempted move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The replica was moved
    Moved,

    /// The mover reported an error for this item
    Failed { reason: String },
}

impl MoveOutcome {
    /// Returns true for a successful move
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved)
    }
}

/// One per-item completion signal from the mover's output stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Object path the record is about
    pub path: String,

    /// Tagged outcome
    pub outcome: MoveOutcome,

    /// The raw output line, exactly as it goes to the log file
    pub raw: String,
}

impl CompletionRecord {
    /// Parse one mover output line; blank lines yield no record
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(caps) = ERROR_LINE_REGEX.captures(trimmed) {
            let path = caps["path"].to_string();
            let reason = caps
                .name("reason")
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "unspecified".to_string());
            return Some(Self {
                path,
                outcome: MoveOutcome::Failed { reason },
                raw: line.to_string(),
            });
        }

        if trimmed.contains("ERROR") {
            // Error output we cannot attribute to a single path
            return Some(Self {
                path: trimmed.to_string(),
                outcome: MoveOutcome::Failed {
                    reason: "mover reported an error".to_string(),
                },
                raw: line.to_string(),
            });
        }

        Some(Self {
            path: trimmed.to_string(),
            outcome: MoveOutcome::Moved,
            raw: line.to_string(),
        })
    }
}

/// Stream of completion records from one cohort invocation
///
/// Must be drained by a single consumer; counter updates downstream are
/// strictly sequential.
pub type RecordStream = Box<dyn Iterator<Item = CompletionRecord> + Send>;

/// Capability interface around the external transfer tool
pub trait MoveExecutor {
    /// Invoke the mover over one cohort's paths
    ///
    /// Returns the merged output of all of the invocation's concurrent
    /// workers as a stream of discrete records. Interleaving across workers
    /// is non-deterministic; the stream itself is sequential.
    fn run(&self, request: &MoveRequest, paths: &[String]) -> ExecutorResult<RecordStream>;
}

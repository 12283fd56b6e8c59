//! Inventory source - what is on the source resource but not the destination
//!
//! The catalog itself is an external collaborator. This module defines:
//! - The `WorkItem` record the rest of the pipeline operates on
//! - The `InventorySource` seam the driver depends on
//! - Line parsing for the `<size> <path>` inventory wire format
//!
//! The concrete implementation (`CommandInventory`) shells out to a site
//! query helper; tests substitute in-memory sources behind the trait.

mod command;

pub use command::CommandInventory;

use crate::error::{InventoryError, InventoryResult};

/// One data object that needs a physical move
///
/// Immutable once read from the inventory. Identity is the path; paths are
/// expected unique within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Replica size in bytes
    pub size: u64,

    /// Full logical path of the data object
    pub path: String,
}

impl WorkItem {
    /// Create a new work item
    pub fn new(size: u64, path: impl Into<String>) -> Self {
        Self {
            size,
            path: path.into(),
        }
    }
}

/// Source of the migration work list
///
/// `pending` returns the data objects with a replica on `src_resc` and none
/// on `dest_resc`; `replicated_count` counts the objects already on both,
/// which are permanently excluded from migration.
pub trait InventorySource {
    /// Fetch all items to move, optionally scoped to a collection prefix
    fn pending(
        &self,
        src_resc: &str,
        dest_resc: &str,
        collection: Option<&str>,
    ) -> InventoryResult<Vec<WorkItem>>;

    /// Count items already replicated on both resources
    fn replicated_count(
        &self,
        src_resc: &str,
        dest_resc: &str,
        collection: Option<&str>,
    ) -> InventoryResult<u64>;
}

/// Parse a single `<size> <path>` inventory line
///
/// The size and path are separated by the first whitespace run, so paths
/// containing spaces survive. Returns `None` for blank lines.
pub fn parse_line(line: &str) -> InventoryResult<Option<WorkItem>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (size_str, rest) = trimmed
        .split_once(char::is_whitespace)
        .ok_or_else(|| InventoryError::MalformedLine {
            line: line.to_string(),
            reason: "expected '<size> <path>'".into(),
        })?;

    let size = size_str
        .parse::<u64>()
        .map_err(|e| InventoryError::MalformedLine {
            line: line.to_string(),
            reason: format!("bad size '{}': {}", size_str, e),
        })?;

    let path = rest.trim_start();
    if path.is_empty() {
        return Err(InventoryError::MalformedLine {
            line: line.to_string(),
            reason: "empty path".into(),
        });
    }

    Ok(Some(WorkItem::new(size, path)))
}

/// Parse a full inventory listing, skipping blank lines
pub fn parse_listing(output: &str) -> InventoryResult<Vec<WorkItem>> {
    let mut items = Vec::new();
    for line in output.lines() {
        if let Some(item) = parse_line(line)? {
            items.push(item);
        }
    }
    Ok(items)
}
